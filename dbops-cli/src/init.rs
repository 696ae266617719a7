use dbops_core::{backup_config::BackupConfig, config::AppConfig, error::Result};
use std::path::Path;
use tracing::{info, warn};

/// 运行独立的初始化流程
pub async fn run_init(force: bool, config_path: &Path) -> Result<()> {
    info!("🗄️  DbOps 初始化");
    info!("================");

    let config = AppConfig::default();
    let backup_config_path = config.get_backup_config_path();

    // 检查是否已经初始化过
    if !force && (config_path.exists() || backup_config_path.exists()) {
        warn!("⚠️  检测到已存在的配置文件");
        info!("如果您要重新初始化，请使用 --force 参数");
        info!("示例: dbops-cli init --force");
        return Ok(());
    }

    info!("📋 步骤 1: 创建配置文件");
    config.save_to_file(config_path)?;
    info!("   ✅ 创建配置文件: {}", config_path.display());

    BackupConfig::default().save_to_file(&backup_config_path)?;
    info!("   ✅ 创建备份配置: {}", backup_config_path.display());

    info!("📋 步骤 2: 创建目录结构");
    let log_file = config.get_log_file();
    if let Some(log_dir) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(log_dir).await?;
        info!("   ✅ 创建日志目录: {}", log_dir.display());
    }

    info!("📋 步骤 3: 检查外部脚本");
    let scripts = [
        &config.scripts.backup,
        &config.scripts.restore,
        &config.scripts.validate_backup,
        &config.scripts.validate_migration,
    ];
    for script in scripts {
        if Path::new(script).exists() {
            info!("   ✅ {}", script);
        } else {
            warn!("   ⚠️  脚本不存在: {} (请在使用前准备好)", script);
        }
    }

    info!("🎉 初始化完成！");
    info!("💡 下一步: 根据环境修改 {} 与 {}", config_path.display(), backup_config_path.display());
    Ok(())
}
