use crate::app::CliApp;
use crate::cli::RollbackCommand;
use dbops_core::{
    error::{DbOpsError, Result},
    rollback::RollbackService,
};
use std::path::Path;
use tracing::{error, info};

use super::report_operation;

/// 运行回滚相关命令
pub async fn run_rollback_command(app: &CliApp, cmd: RollbackCommand) -> Result<()> {
    let rollback = app.rollback_service()?;
    match cmd {
        RollbackCommand::Migration { name } => {
            report_operation(rollback.rollback_migration(&name).await)
        }
        RollbackCommand::Steps { steps } => report_operation(rollback.rollback_steps(steps).await),
        RollbackCommand::Restore { path } => run_restore(app, &rollback, &path).await,
        RollbackCommand::Create { name } => {
            report_operation(rollback.create_rollback_migration(&name).await)
        }
        RollbackCommand::Recommendations => {
            info!("💡 回滚建议:");
            for (index, line) in rollback.get_rollback_recommendations().iter().enumerate() {
                info!("   {}. {}", index + 1, line);
            }
            Ok(())
        }
    }
}

/// 恢复前按备份配置做预检
async fn run_restore(app: &CliApp, rollback: &RollbackService, path: &Path) -> Result<()> {
    info!("🔄 通过备份回滚数据库: {}", path.display());

    let validation = rollback.backup_config().restore.validation;
    if validation.enabled {
        info!("🔍 恢复前校验备份文件...");
        info!("   需要检查的表: {}", validation.tables_to_check.join(", "));

        let result = app.backup_validator.comprehensive_validation(path).await;
        if !result.valid {
            error!("❌ 备份校验未通过，取消恢复: {}", result.details);
            return Err(DbOpsError::backup(result.details));
        }
        info!("✅ {}", result.details);
    }

    report_operation(rollback.restore_from_backup(path).await)
}
