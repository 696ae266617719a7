use crate::constants::backup;
use crate::error::{DbOpsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 备份策略配置（JSON，键名与外部脚本共用的 camelCase 格式一致）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupConfig {
    pub backup: BackupSettings,
    pub restore: RestoreSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSettings {
    pub strategies: Strategies,
    pub storage: Storage,
    pub encryption: Encryption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategies {
    pub full: FullStrategy,
    pub incremental: Strategy,
    pub transaction_log: Strategy,
}

/// 全量备份策略，额外带有执行时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullStrategy {
    pub frequency: String,
    pub time: String,
    pub retention_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub frequency: String,
    pub retention_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    pub local: LocalStorage,
    /// 云存储可选，缺省时全部禁用
    #[serde(default)]
    pub cloud: CloudStorage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalStorage {
    pub enabled: bool,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorage {
    #[serde(default)]
    pub aws: AwsBucket,
    #[serde(default)]
    pub gcp: GcpBucket,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsBucket {
    pub enabled: bool,
    pub bucket: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpBucket {
    pub enabled: bool,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encryption {
    pub at_rest: bool,
    pub in_transit: bool,
    pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSettings {
    pub validation: RestoreValidation,
}

/// 恢复前校验选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreValidation {
    pub enabled: bool,
    pub tables_to_check: Vec<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            backup: BackupSettings {
                strategies: Strategies {
                    full: FullStrategy {
                        frequency: "daily".to_string(),
                        time: "02:00".to_string(),
                        retention_days: 30,
                    },
                    incremental: Strategy {
                        frequency: "hourly".to_string(),
                        retention_days: 7,
                    },
                    transaction_log: Strategy {
                        frequency: "every-15-minutes".to_string(),
                        retention_days: 3,
                    },
                },
                storage: Storage {
                    local: LocalStorage {
                        enabled: true,
                        path: backup::DEFAULT_LOCAL_PATH.to_string(),
                    },
                    cloud: CloudStorage::default(),
                },
                encryption: Encryption {
                    at_rest: true,
                    in_transit: true,
                    algorithm: "AES-256".to_string(),
                },
            },
            restore: RestoreSettings {
                validation: RestoreValidation {
                    enabled: true,
                    tables_to_check: vec!["User".to_string(), "Post".to_string()],
                },
            },
        }
    }
}

impl BackupConfig {
    /// 从 JSON 文件加载备份配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DbOpsError::config_not_found(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config: BackupConfig = serde_json::from_str(&content)?;
        config.check()?;

        Ok(config)
    }

    /// 保存为格式化的 JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        let local = &self.backup.storage.local;
        if local.enabled && local.path.trim().is_empty() {
            return Err(DbOpsError::backup("本地存储已启用但未配置路径"));
        }
        Ok(())
    }

    /// 本地存储路径，作为备份/恢复的互斥目标
    pub fn local_storage_path(&self) -> PathBuf {
        PathBuf::from(&self.backup.storage.local.path)
    }

    /// 已启用的存储目标名称
    pub fn enabled_targets(&self) -> Vec<&'static str> {
        let storage = &self.backup.storage;
        let mut targets = Vec::new();
        if storage.local.enabled {
            targets.push("local");
        }
        if storage.cloud.aws.enabled {
            targets.push("aws");
        }
        if storage.cloud.gcp.enabled {
            targets.push("gcp");
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
  "backup": {
    "strategies": {
      "full": { "frequency": "daily", "time": "03:30", "retentionDays": 14 },
      "incremental": { "frequency": "hourly", "retentionDays": 5 },
      "transactionLog": { "frequency": "every-5-minutes", "retentionDays": 2 }
    },
    "storage": {
      "local": { "enabled": true, "path": "/var/backups/db" },
      "cloud": {
        "aws": { "enabled": true, "bucket": "db-backups", "region": "eu-west-1" },
        "gcp": { "enabled": false, "bucket": "" }
      }
    },
    "encryption": { "atRest": true, "inTransit": false, "algorithm": "AES-256-GCM" }
  },
  "restore": {
    "validation": { "enabled": true, "tablesToCheck": ["User", "Post", "Schedule"] }
  }
}"#;

    #[test]
    fn test_parse_camel_case_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backup-config.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = BackupConfig::load_from_file(&path).unwrap();
        assert_eq!(config.backup.strategies.full.time, "03:30");
        assert_eq!(config.backup.strategies.transaction_log.retention_days, 2);
        assert_eq!(config.backup.storage.cloud.aws.region, "eu-west-1");
        assert!(!config.backup.encryption.in_transit);
        assert_eq!(config.restore.validation.tables_to_check.len(), 3);
        assert_eq!(config.enabled_targets(), vec!["local", "aws"]);
    }

    #[test]
    fn test_cloud_storage_is_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backup-config.json");

        let without_cloud = SAMPLE.replace(
            r#""cloud": {
        "aws": { "enabled": true, "bucket": "db-backups", "region": "eu-west-1" },
        "gcp": { "enabled": false, "bucket": "" }
      }"#,
            r#""cloud": {}"#,
        );
        assert_ne!(without_cloud, SAMPLE);
        std::fs::write(&path, &without_cloud).unwrap();
        let config = BackupConfig::load_from_file(&path).unwrap();
        assert_eq!(config.backup.storage.cloud, CloudStorage::default());
        assert_eq!(config.enabled_targets(), vec!["local"]);

        let local_only = r#"{
  "backup": {
    "strategies": {
      "full": { "frequency": "daily", "time": "02:00", "retentionDays": 30 },
      "incremental": { "frequency": "hourly", "retentionDays": 7 },
      "transactionLog": { "frequency": "every-15-minutes", "retentionDays": 3 }
    },
    "storage": { "local": { "enabled": true, "path": "./backups" } },
    "encryption": { "atRest": true, "inTransit": true, "algorithm": "AES-256" }
  },
  "restore": { "validation": { "enabled": false, "tablesToCheck": [] } }
}"#;
        std::fs::write(&path, local_only).unwrap();
        let config = BackupConfig::load_from_file(&path).unwrap();
        assert!(!config.backup.storage.cloud.aws.enabled);
        assert!(!config.backup.storage.cloud.gcp.enabled);
    }

    #[test]
    fn test_enabled_local_storage_requires_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backup-config.json");
        let mut config = BackupConfig::default();
        config.backup.storage.local.path = "  ".to_string();
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let result = BackupConfig::load_from_file(&path);
        assert!(matches!(result, Err(DbOpsError::Backup(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = BackupConfig::load_from_file("/nonexistent/backup-config.json");
        assert!(matches!(result, Err(DbOpsError::ConfigNotFound(_))));
    }
}
