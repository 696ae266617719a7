use crate::{
    backup::BackupService,
    backup_config::BackupConfig,
    constants::migration::subcommands,
    migration::MigrationTool,
    outcome::OperationResult,
};
use std::path::Path;
use tracing::{error, info, warn};

/// 回滚服务
///
/// 迁移工具本身不支持回滚，唯一可用的回滚路径是从备份恢复。
/// 所有方法都不返回错误，备份服务的错误在这里转换为失败结果。
#[derive(Clone)]
pub struct RollbackService {
    backup: BackupService,
    tool: MigrationTool,
}

impl RollbackService {
    pub fn new(backup: BackupService, tool: MigrationTool) -> Self {
        Self { backup, tool }
    }

    /// 恢复所用的备份配置
    pub fn backup_config(&self) -> BackupConfig {
        self.backup.get_config()
    }

    fn unsupported(&self) -> OperationResult {
        OperationResult::failure(format!(
            "{} does not support direct rollback. Please use restore from backup.",
            self.tool.name
        ))
    }

    /// 回滚指定迁移（不支持）
    pub async fn rollback_migration(&self, migration_name: &str) -> OperationResult {
        warn!("请求回滚迁移 {}，{} 不支持直接回滚", migration_name, self.tool.name);
        self.unsupported()
    }

    /// 回滚最近 `steps` 个迁移（不支持）
    pub async fn rollback_steps(&self, steps: u32) -> OperationResult {
        warn!("请求回滚 {} 步迁移，{} 不支持直接回滚", steps, self.tool.name);
        self.unsupported()
    }

    /// 从备份恢复数据库
    pub async fn restore_from_backup(&self, backup_file: &Path) -> OperationResult {
        info!("通过备份回滚数据库: {}", backup_file.display());

        match self.backup.restore_from_backup(backup_file).await {
            Ok(()) => OperationResult::success("Database restored successfully from backup"),
            Err(e) => {
                error!("通过备份回滚失败: {}", e);
                OperationResult::failure(format!("Database restore failed: {e}"))
            }
        }
    }

    pub async fn create_rollback_migration(&self, migration_name: &str) -> OperationResult {
        warn!("暂不支持自动生成回滚迁移: {}", migration_name);
        OperationResult::failure(
            "Rollback migration creation not implemented. Please create manually.",
        )
    }

    /// 固定的操作建议
    pub fn get_rollback_recommendations(&self) -> Vec<String> {
        vec![
            format!("{} does not support direct rollback of migrations", self.tool.name),
            "Recommended approach: Restore database from a backup taken before the migration"
                .to_string(),
            format!(
                "For development: Use '{}' to reset the database to its initial state",
                self.tool.command_line(subcommands::RESET)
            ),
            "For production: Always take a backup before applying migrations".to_string(),
            "Create reverse migrations manually if needed for specific use cases".to_string(),
        ]
    }
}
