use crate::app::CliApp;
use crate::cli::MigrateCommand;
use dbops_core::error::Result;
use std::io::{self, Write};
use tracing::{info, warn};

use super::{report_operation, report_validation};

/// 运行迁移相关命令
pub async fn run_migrate_command(app: &CliApp, cmd: MigrateCommand) -> Result<()> {
    match cmd {
        MigrateCommand::Apply => {
            info!("🚀 应用数据库迁移");
            info!("=================");
            report_operation(app.migration_service.apply_migrations().await)
        }
        MigrateCommand::Create { name } => {
            report_operation(app.migration_service.create_migration(&name).await)
        }
        MigrateCommand::Reset { force } => run_reset(app, force).await,
        MigrateCommand::Status => {
            let result = app.migration_service.get_migration_status().await;
            if result.success {
                // 工具输出原样展示
                info!("📊 迁移状态:\n{}", result.details.trim_end());
                Ok(())
            } else {
                report_operation(result)
            }
        }
        MigrateCommand::Validate => {
            report_validation(app.migration_validator.validate_migrations().await)
        }
        MigrateCommand::Test => report_operation(app.migration_validator.test_migrations().await),
        MigrateCommand::CheckDestructive => {
            let check = app.migration_validator.check_destructive_changes().await;
            if check.has_destructive_changes {
                warn!("⚠️  {}", check.details);
            } else {
                info!("✅ {}", check.details);
            }
            Ok(())
        }
    }
}

async fn run_reset(app: &CliApp, force: bool) -> Result<()> {
    if !force {
        warn!("⚠️  重置会删除数据库中的所有数据，且无法撤销");
        print!("输入 'y' 确认重置数据库，其他任意键取消: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            warn!("❌ 用户取消重置操作");
            return Ok(());
        }
    }

    report_operation(app.migration_service.reset_database().await)
}
