use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbOpsError>;

#[derive(Error, Debug)]
pub enum DbOpsError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("配置文件未找到: {0}")]
    ConfigNotFound(String),

    #[error("外部程序不可用: {program} ({reason})")]
    MissingProgram { program: String, reason: String },

    #[error("命令执行失败: `{command}` 退出码 {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: String,
        stderr: String,
    },

    #[error("超时错误: {operation} 操作超时 ({timeout_seconds}秒)")]
    Timeout {
        operation: String,
        timeout_seconds: u64,
    },

    #[error("备份操作失败: {0}")]
    Backup(String),

    #[error("自定义错误: {0}")]
    Custom(String),
}

impl DbOpsError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn backup(msg: impl Into<String>) -> Self {
        Self::Backup(msg.into())
    }

    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound(path.into())
    }
}
