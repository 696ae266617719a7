use dbops_core::{
    backup::BackupService,
    backup_validator::BackupValidator,
    config::AppConfig,
    error::{DbOpsError, Result},
    lock::OperationLocks,
    migration::{MigrationService, MigrationTool},
    migration_validator::MigrationValidator,
    monitoring::MonitoringService,
    process::{ProcessRunner, TokioProcessRunner},
    rollback::RollbackService,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::cli::Commands;
use crate::commands;

/// 命令行应用：持有显式构造的服务
///
/// 备份服务依赖备份配置文件，只在备份与回滚命令中按需构造，
/// 迁移与监控命令不需要该文件
#[derive(Clone)]
pub struct CliApp {
    pub config: AppConfig,
    pub monitoring: Arc<MonitoringService>,
    pub backup_validator: BackupValidator,
    pub migration_service: MigrationService,
    pub migration_validator: MigrationValidator,
    runner: Arc<dyn ProcessRunner>,
    // 同一个锁注册表注入所有服务，回滚恢复与备份互斥
    locks: OperationLocks,
}

impl CliApp {
    /// 加载配置并初始化应用；未指定路径时按默认顺序查找配置文件
    pub async fn new_with_config(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from_file(path)?,
            None => AppConfig::find_and_load_config()?,
        };

        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> Result<Self> {
        let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new());
        Self::with_runner(config, runner)
    }

    /// 使用指定的进程执行器装配服务
    pub fn with_runner(config: AppConfig, runner: Arc<dyn ProcessRunner>) -> Result<Self> {
        let monitoring = Arc::new(
            MonitoringService::new(config.get_log_file())
                .with_slow_backup_threshold(config.monitoring.slow_backup_threshold_ms),
        );
        let locks = OperationLocks::new();

        let backup_validator = BackupValidator::from_config(runner.clone(), &config);
        let migration_validator = MigrationValidator::from_config(runner.clone(), &config);
        let migration_service =
            MigrationService::from_config(runner.clone(), monitoring.clone(), locks.clone(), &config);

        debug!("服务装配完成，操作日志: {}", monitoring.log_file().display());

        Ok(Self {
            config,
            monitoring,
            backup_validator,
            migration_service,
            migration_validator,
            runner,
            locks,
        })
    }

    /// 构造备份服务，此时才加载备份配置
    pub fn backup_service(&self) -> Result<BackupService> {
        BackupService::from_config(
            self.runner.clone(),
            self.monitoring.clone(),
            self.locks.clone(),
            &self.config,
        )
    }

    /// 构造回滚服务，与备份服务共享锁注册表
    pub fn rollback_service(&self) -> Result<RollbackService> {
        Ok(RollbackService::new(
            self.backup_service()?,
            MigrationTool::from_config(&self.config),
        ))
    }

    /// 运行应用命令
    pub async fn run_command(&self, command: Commands) -> Result<()> {
        match command {
            // init 不需要配置，已经在 main.rs 中处理
            Commands::Init { .. } => Err(DbOpsError::custom("init 命令不能在已加载配置的应用中运行")),
            Commands::Backup(cmd) => commands::run_backup_command(self, cmd).await,
            Commands::Migrate(cmd) => commands::run_migrate_command(self, cmd).await,
            Commands::Rollback(cmd) => commands::run_rollback_command(self, cmd).await,
            Commands::Monitor(cmd) => commands::run_monitor_command(self, cmd),
        }
    }
}
