use crate::app::CliApp;
use crate::cli::MonitorCommand;
use dbops_core::error::Result;
use tracing::info;

/// 运行监控相关命令
pub fn run_monitor_command(app: &CliApp, cmd: MonitorCommand) -> Result<()> {
    match cmd {
        MonitorCommand::Stats => {
            let stats = app.monitoring.get_operation_stats();
            info!("📊 操作统计 ({})", app.monitoring.log_file().display());
            info!("   总计: {}", stats.total);
            info!("   成功: {}", stats.success);
            info!("   失败: {}", stats.failure);
            info!("   警告: {}", stats.warning);
            Ok(())
        }
        MonitorCommand::Recent { limit } => {
            let entries = app.monitoring.get_recent_operations(limit);
            if entries.is_empty() {
                info!("📭 暂无操作记录");
                return Ok(());
            }

            info!("🕒 最近 {} 条操作:", entries.len());
            for entry in &entries {
                info!("{}", serde_json::to_string(entry)?);
            }
            Ok(())
        }
    }
}
