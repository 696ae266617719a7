mod backup;
mod migrate;
mod monitor;
mod rollback;

use dbops_core::{
    error::{DbOpsError, Result},
    outcome::{OperationResult, ValidationResult},
};
use tracing::{error, info};

// Backup commands
pub use backup::run_backup_command;

// Migrate commands
pub use migrate::run_migrate_command;

// Rollback commands
pub use rollback::run_rollback_command;

// Monitor commands
pub use monitor::run_monitor_command;

/// 把动作类结果转换为命令结果，失败时以非零状态退出
fn report_operation(result: OperationResult) -> Result<()> {
    if result.success {
        info!("✅ {}", result.details);
        Ok(())
    } else {
        error!("❌ {}", result.details);
        Err(DbOpsError::custom(result.details))
    }
}

/// 把校验类结果转换为命令结果
fn report_validation(result: ValidationResult) -> Result<()> {
    if result.valid {
        info!("✅ {}", result.details);
        Ok(())
    } else {
        error!("❌ {}", result.details);
        Err(DbOpsError::custom(result.details))
    }
}
