use crate::constants::{backup, config, migration, monitoring, scripts, timeout};
use crate::error::{DbOpsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub scripts: ScriptsConfig,
    pub migrations: MigrationsConfig,
    pub backup: BackupSection,
    pub monitoring: MonitoringConfig,
    pub process: ProcessConfig,
}

/// 外部脚本配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptsConfig {
    pub shell: String,
    pub backup: String,
    pub restore: String,
    pub validate_backup: String,
    pub validate_migration: String,
}

/// 迁移工具配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MigrationsConfig {
    pub dir: String,
    pub tool_name: String,
    pub program: String,
    pub args: Vec<String>,
}

/// 备份相关配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackupSection {
    pub config_file: String,
}

/// 监控相关配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    pub log_file: String,
    pub slow_backup_threshold_ms: u64,
}

/// 外部进程相关配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessConfig {
    pub timeout_secs: u64,
}

fn path_str(path: PathBuf) -> String {
    path.to_string_lossy().to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scripts: ScriptsConfig {
                shell: scripts::DEFAULT_SHELL.to_string(),
                backup: path_str(scripts::get_script_path(scripts::BACKUP_SCRIPT)),
                restore: path_str(scripts::get_script_path(scripts::RESTORE_SCRIPT)),
                validate_backup: path_str(scripts::get_script_path(
                    scripts::VALIDATE_BACKUP_SCRIPT,
                )),
                validate_migration: path_str(scripts::get_script_path(
                    scripts::VALIDATE_MIGRATION_SCRIPT,
                )),
            },
            migrations: MigrationsConfig {
                dir: path_str(migration::get_default_migrations_dir()),
                tool_name: migration::DEFAULT_TOOL_NAME.to_string(),
                program: migration::DEFAULT_TOOL_PROGRAM.to_string(),
                args: migration::DEFAULT_TOOL_ARGS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            backup: BackupSection {
                config_file: path_str(backup::get_default_config_path()),
            },
            monitoring: MonitoringConfig {
                log_file: path_str(monitoring::get_default_log_file()),
                slow_backup_threshold_ms: monitoring::SLOW_BACKUP_THRESHOLD_MS,
            },
            process: ProcessConfig {
                timeout_secs: timeout::DEFAULT_PROCESS_TIMEOUT,
            },
        }
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：dbops.toml -> .dbops.toml，都不存在时使用默认配置
    pub fn find_and_load_config() -> Result<Self> {
        let config_files = [config::CONFIG_FILE_NAME, config::HIDDEN_CONFIG_FILE_NAME];

        for config_file in &config_files {
            if Path::new(config_file).exists() {
                tracing::info!("找到配置文件: {}", config_file);
                return Self::load_from_file(config_file);
            }
        }

        tracing::warn!("未找到配置文件，使用默认配置（可运行 init 生成）");
        Ok(Self::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DbOpsError::config_not_found(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/dbops.toml.template");

        let tool_args = self
            .migrations
            .args
            .iter()
            .map(|arg| format!("\"{arg}\""))
            .collect::<Vec<_>>()
            .join(", ");

        TEMPLATE
            .replace("{shell}", &self.scripts.shell)
            .replace("{backup_script}", &self.scripts.backup)
            .replace("{restore_script}", &self.scripts.restore)
            .replace("{validate_backup_script}", &self.scripts.validate_backup)
            .replace("{validate_migration_script}", &self.scripts.validate_migration)
            .replace("{migrations_dir}", &self.migrations.dir)
            .replace("{tool_name}", &self.migrations.tool_name)
            .replace("{tool_program}", &self.migrations.program)
            .replace("{tool_args}", &tool_args)
            .replace("{backup_config_file}", &self.backup.config_file)
            .replace("{log_file}", &self.monitoring.log_file)
            .replace(
                "{slow_backup_threshold_ms}",
                &self.monitoring.slow_backup_threshold_ms.to_string(),
            )
            .replace("{timeout_secs}", &self.process.timeout_secs.to_string())
    }

    /// 外部命令超时时间
    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process.timeout_secs)
    }

    /// 获取迁移目录路径
    pub fn get_migrations_dir(&self) -> PathBuf {
        PathBuf::from(&self.migrations.dir)
    }

    /// 获取备份配置文件路径
    pub fn get_backup_config_path(&self) -> PathBuf {
        PathBuf::from(&self.backup.config_file)
    }

    /// 获取操作日志路径
    pub fn get_log_file(&self) -> PathBuf {
        PathBuf::from(&self.monitoring.log_file)
    }
}
