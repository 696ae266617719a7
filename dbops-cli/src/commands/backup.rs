use crate::app::CliApp;
use crate::cli::BackupCommand;
use dbops_core::{
    backup::{BackupService, BackupStrategy},
    error::{DbOpsError, Result},
};
use std::path::Path;
use tracing::{error, info};

use super::{report_operation, report_validation};

/// 运行备份相关命令
pub async fn run_backup_command(app: &CliApp, cmd: BackupCommand) -> Result<()> {
    match cmd {
        // 恢复测试只需要校验脚本，不依赖备份配置
        BackupCommand::TestRestore { path } => {
            info!("🧪 测试恢复备份: {}", path.display());
            report_operation(app.backup_validator.test_restore(&path).await)
        }
        cmd => {
            let service = app.backup_service()?;
            run_with_service(app, &service, cmd).await
        }
    }
}

async fn run_with_service(app: &CliApp, service: &BackupService, cmd: BackupCommand) -> Result<()> {
    match cmd {
        BackupCommand::Full => run_backup(service, BackupStrategy::Full).await,
        BackupCommand::Incremental => run_backup(service, BackupStrategy::Incremental).await,
        BackupCommand::TransactionLog => run_backup(service, BackupStrategy::TransactionLog).await,
        BackupCommand::Restore { path } => run_restore(service, &path).await,
        BackupCommand::Validate { path, quick } => run_validate(app, service, &path, quick).await,
        BackupCommand::TestRestore { path } => {
            report_operation(app.backup_validator.test_restore(&path).await)
        }
        BackupCommand::Config => show_config(app, service),
    }
}

async fn run_backup(service: &BackupService, strategy: BackupStrategy) -> Result<()> {
    info!("💾 {}", strategy.display_name());
    info!("===============");

    let config = service.get_config();
    info!(
        "存储目标: {} ({})",
        config.enabled_targets().join(", "),
        config.local_storage_path().display()
    );

    service.perform_backup(strategy).await?;
    info!("✅ {}完成", strategy.display_name());
    Ok(())
}

async fn run_restore(service: &BackupService, path: &Path) -> Result<()> {
    info!("🔄 从备份恢复数据库: {}", path.display());
    service.restore_from_backup(path).await?;
    info!("✅ 数据库恢复完成");
    Ok(())
}

async fn run_validate(
    app: &CliApp,
    service: &BackupService,
    path: &Path,
    quick: bool,
) -> Result<()> {
    if quick {
        info!("🔍 快速检查备份文件: {}", path.display());
        return if service.validate_backup(path).await {
            info!("✅ 备份文件存在: {}", path.display());
            Ok(())
        } else {
            error!("❌ 备份文件不可用: {}", path.display());
            Err(DbOpsError::backup(format!("备份文件不可用: {}", path.display())))
        };
    }

    info!("🔍 完整校验备份文件: {}", path.display());
    report_validation(app.backup_validator.comprehensive_validation(path).await)
}

fn show_config(app: &CliApp, service: &BackupService) -> Result<()> {
    let config = service.get_config();
    info!("📋 备份配置 ({})", app.config.backup.config_file);
    info!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
