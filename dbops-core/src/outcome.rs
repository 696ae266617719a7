use serde::{Deserialize, Serialize};

/// 失败时 details 为空的兜底文案，保证失败结果总是可读
const UNSPECIFIED_FAILURE: &str = "unspecified failure";

fn failure_details(details: String) -> String {
    if details.trim().is_empty() {
        UNSPECIFIED_FAILURE.to_string()
    } else {
        details
    }
}

/// 校验类操作的统一结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub details: String,
}

impl ValidationResult {
    pub fn valid(details: impl Into<String>) -> Self {
        Self {
            valid: true,
            details: details.into(),
        }
    }

    pub fn invalid(details: impl Into<String>) -> Self {
        Self {
            valid: false,
            details: failure_details(details.into()),
        }
    }
}

/// 动作类操作的统一结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub details: String,
}

impl OperationResult {
    pub fn success(details: impl Into<String>) -> Self {
        Self {
            success: true,
            details: details.into(),
        }
    }

    pub fn failure(details: impl Into<String>) -> Self {
        Self {
            success: false,
            details: failure_details(details.into()),
        }
    }
}

/// 破坏性变更检查结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestructiveCheck {
    pub has_destructive_changes: bool,
    pub details: String,
}
