use crate::{
    Result,
    backup_config::BackupConfig,
    config::AppConfig,
    constants::{backup, monitoring as monitoring_consts, timeout},
    lock::OperationLocks,
    monitoring::{MonitoringService, OperationStatus},
    process::{CommandSpec, ProcessRunner},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 备份策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStrategy {
    Full,
    Incremental,
    TransactionLog,
}

impl BackupStrategy {
    /// 传给备份脚本的策略关键字
    pub fn keyword(&self) -> &'static str {
        match self {
            BackupStrategy::Full => backup::STRATEGY_FULL,
            BackupStrategy::Incremental => backup::STRATEGY_INCREMENTAL,
            BackupStrategy::TransactionLog => backup::STRATEGY_TRANSACTION_LOG,
        }
    }

    /// 获取策略的中文显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            BackupStrategy::Full => "全量备份",
            BackupStrategy::Incremental => "增量备份",
            BackupStrategy::TransactionLog => "事务日志备份",
        }
    }
}

/// 备份与恢复脚本位置
#[derive(Debug, Clone)]
pub struct BackupScripts {
    pub shell: String,
    pub backup: PathBuf,
    pub restore: PathBuf,
}

impl BackupScripts {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            shell: config.scripts.shell.clone(),
            backup: PathBuf::from(&config.scripts.backup),
            restore: PathBuf::from(&config.scripts.restore),
        }
    }
}

/// 备份服务
///
/// 备份与恢复动作失败时先记录日志再把错误返回给调用方
#[derive(Clone)]
pub struct BackupService {
    runner: Arc<dyn ProcessRunner>,
    monitoring: Arc<MonitoringService>,
    locks: OperationLocks,
    config: BackupConfig,
    scripts: BackupScripts,
    timeout: Duration,
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl BackupService {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        monitoring: Arc<MonitoringService>,
        locks: OperationLocks,
        config: BackupConfig,
        scripts: BackupScripts,
    ) -> Self {
        Self {
            runner,
            monitoring,
            locks,
            config,
            scripts,
            timeout: Duration::from_secs(timeout::DEFAULT_PROCESS_TIMEOUT),
        }
    }

    /// 按应用配置创建，备份配置在此时加载一次
    pub fn from_config(
        runner: Arc<dyn ProcessRunner>,
        monitoring: Arc<MonitoringService>,
        locks: OperationLocks,
        app_config: &AppConfig,
    ) -> Result<Self> {
        let config_path = app_config.get_backup_config_path();
        let config = BackupConfig::load_from_file(&config_path)?;
        info!("加载备份配置: {}", config_path.display());

        Ok(Self::new(
            runner,
            monitoring,
            locks,
            config,
            BackupScripts::from_config(app_config),
        )
        .with_timeout(app_config.process_timeout()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn lock_key(&self) -> String {
        OperationLocks::backup_key(&self.config.backup.storage.local.path)
    }

    /// 全量备份
    pub async fn perform_full_backup(&self) -> Result<()> {
        self.perform_backup(BackupStrategy::Full).await
    }

    /// 增量备份
    pub async fn perform_incremental_backup(&self) -> Result<()> {
        self.perform_backup(BackupStrategy::Incremental).await
    }

    /// 事务日志备份
    pub async fn perform_transaction_log_backup(&self) -> Result<()> {
        self.perform_backup(BackupStrategy::TransactionLog).await
    }

    /// 执行指定策略的备份
    pub async fn perform_backup(&self, strategy: BackupStrategy) -> Result<()> {
        let _guard = self.locks.acquire(&self.lock_key()).await;

        info!("开始{}...", strategy.display_name());
        let start = Instant::now();

        let command = CommandSpec::new(&self.scripts.shell)
            .arg(self.scripts.backup.to_string_lossy())
            .arg(strategy.keyword())
            .timeout(self.timeout);
        let result = self.runner.run_checked(&command).await;
        let duration_ms = elapsed_ms(start);

        match result {
            Ok(output) => {
                if output.has_stderr() {
                    warn!("备份 stderr: {}", output.stderr.trim());
                }
                info!("{}完成，耗时 {} ms", strategy.display_name(), duration_ms);
                debug!("备份输出: {}", output.stdout.trim());

                self.monitoring.monitor_backup(
                    duration_ms,
                    true,
                    &format!("{} backup completed successfully", strategy.keyword()),
                );
                Ok(())
            }
            Err(e) => {
                error!("{}失败: {}", strategy.display_name(), e);
                self.monitoring.monitor_backup(
                    duration_ms,
                    false,
                    &format!("{} backup failed: {e}", strategy.keyword()),
                );
                Err(e)
            }
        }
    }

    /// 从备份文件恢复数据库
    pub async fn restore_from_backup(&self, backup_file: &Path) -> Result<()> {
        let _guard = self.locks.acquire(&self.lock_key()).await;

        info!("开始从备份恢复数据库: {}", backup_file.display());
        let start = Instant::now();

        let command = CommandSpec::new(&self.scripts.shell)
            .arg(self.scripts.restore.to_string_lossy())
            .arg(backup_file.to_string_lossy())
            .timeout(self.timeout);
        let result = self.runner.run_checked(&command).await;
        let duration_ms = elapsed_ms(start);

        match result {
            Ok(output) => {
                if output.has_stderr() {
                    warn!("恢复 stderr: {}", output.stderr.trim());
                }
                info!("数据库恢复完成，耗时 {} ms", duration_ms);
                debug!("恢复输出: {}", output.stdout.trim());

                self.monitoring.log_operation(
                    monitoring_consts::OPERATION_RESTORE,
                    OperationStatus::Success,
                    &format!("Restored from {}", backup_file.display()),
                    Some(duration_ms),
                );
                Ok(())
            }
            Err(e) => {
                error!("数据库恢复失败: {}", e);
                self.monitoring.log_operation(
                    monitoring_consts::OPERATION_RESTORE,
                    OperationStatus::Failure,
                    &format!("Restore from {} failed: {e}", backup_file.display()),
                    Some(duration_ms),
                );
                Err(e)
            }
        }
    }

    /// 获取备份配置副本
    pub fn get_config(&self) -> BackupConfig {
        self.config.clone()
    }

    /// 轻量检查：只确认备份文件存在，任何错误都返回 false
    ///
    /// 需要外部校验与恢复测试时使用 `BackupValidator`
    pub async fn validate_backup(&self, backup_file: &Path) -> bool {
        info!("检查备份文件: {}", backup_file.display());

        match tokio::fs::metadata(backup_file).await {
            Ok(metadata) => {
                debug!(
                    "备份文件存在: {} ({} 字节)",
                    backup_file.display(),
                    metadata.len()
                );
                true
            }
            Err(e) => {
                error!("备份文件检查失败 {}: {}", backup_file.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbOpsError;
    use crate::process::fake::{FakeResponse, FakeRunner};
    use tempfile::{TempDir, tempdir};

    const BACKUP_SCRIPT: &str = "scripts/backup-database.sh";
    const RESTORE_SCRIPT: &str = "scripts/restore-database.sh";

    struct Fixture {
        _dir: TempDir,
        runner: Arc<FakeRunner>,
        monitoring: Arc<MonitoringService>,
        locks: OperationLocks,
        service: BackupService,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        let monitoring = Arc::new(MonitoringService::new(dir.path().join("ops.log")));
        let locks = OperationLocks::new();
        let service = BackupService::new(
            runner.clone(),
            monitoring.clone(),
            locks.clone(),
            BackupConfig::default(),
            BackupScripts {
                shell: "bash".to_string(),
                backup: PathBuf::from(BACKUP_SCRIPT),
                restore: PathBuf::from(RESTORE_SCRIPT),
            },
        );
        Fixture {
            _dir: dir,
            runner,
            monitoring,
            locks,
            service,
        }
    }

    #[tokio::test]
    async fn test_each_strategy_passes_its_keyword() {
        let f = fixture();
        f.service.perform_full_backup().await.unwrap();
        f.service.perform_incremental_backup().await.unwrap();
        f.service.perform_transaction_log_backup().await.unwrap();

        let calls = f.runner.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], vec!["bash", BACKUP_SCRIPT, "full"]);
        assert_eq!(calls[1], vec!["bash", BACKUP_SCRIPT, "incremental"]);
        assert_eq!(calls[2], vec!["bash", BACKUP_SCRIPT, "transaction-log"]);

        let stats = f.monitoring.get_operation_stats();
        assert_eq!(stats.success, 3);
    }

    #[tokio::test]
    async fn test_stderr_alone_does_not_fail_backup() {
        let f = fixture();
        f.runner.respond(
            &["bash", BACKUP_SCRIPT],
            FakeResponse::stderr("pg_dump: warning: no tables matched"),
        );
        assert!(f.service.perform_incremental_backup().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_backup_propagates_error_after_logging() {
        let f = fixture();
        f.runner.respond(
            &["bash", BACKUP_SCRIPT, "full"],
            FakeResponse::exit(2, "pg_dump: connection refused"),
        );

        let err = f.service.perform_full_backup().await.unwrap_err();
        match err {
            DbOpsError::CommandFailed { stderr, .. } => {
                assert_eq!(stderr, "pg_dump: connection refused");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let recent = f.monitoring.get_recent_operations(1);
        assert_eq!(recent[0].operation, "backup");
        assert_eq!(recent[0].status, OperationStatus::Failure);
        assert!(recent[0].details.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_backup_timeout_propagates() {
        let f = fixture();
        f.runner.respond(&["bash", BACKUP_SCRIPT], FakeResponse::Timeout);
        let err = f.service.perform_transaction_log_backup().await.unwrap_err();
        assert!(matches!(err, DbOpsError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_restore_passes_path_and_propagates_failure() {
        let f = fixture();
        f.runner.respond(
            &["bash", RESTORE_SCRIPT],
            FakeResponse::exit(1, "pg_restore: invalid archive"),
        );

        let result = f
            .service
            .restore_from_backup(Path::new("/backups/2024-01-01.dump"))
            .await;
        assert!(matches!(result, Err(DbOpsError::CommandFailed { .. })));
        assert_eq!(
            f.runner.calls()[0],
            vec!["bash", RESTORE_SCRIPT, "/backups/2024-01-01.dump"]
        );

        let recent = f.monitoring.get_recent_operations(1);
        assert_eq!(recent[0].operation, "restore");
        assert_eq!(recent[0].status, OperationStatus::Failure);
    }

    #[tokio::test]
    async fn test_get_config_returns_independent_copy() {
        let f = fixture();
        let mut copy = f.service.get_config();
        copy.backup.storage.local.path = "/tmp/elsewhere".to_string();
        copy.restore.validation.tables_to_check.clear();

        let fresh = f.service.get_config();
        assert_eq!(fresh, BackupConfig::default());
    }

    #[tokio::test]
    async fn test_validate_backup_is_existence_only() {
        let f = fixture();
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.bak");
        std::fs::write(&empty, b"").unwrap();

        // 空文件也视为存在，严格校验由 BackupValidator 负责
        assert!(f.service.validate_backup(&empty).await);
        assert!(!f.service.validate_backup(&dir.path().join("missing.bak")).await);
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_backup_waits_for_target_lock() {
        let f = fixture();
        let key = OperationLocks::backup_key(&BackupConfig::default().backup.storage.local.path);
        let guard = f.locks.acquire(&key).await;

        let service = f.service.clone();
        let pending = tokio::spawn(async move { service.perform_full_backup().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());
        assert!(f.runner.calls().is_empty());

        drop(guard);
        pending.await.unwrap().unwrap();
        assert_eq!(f.runner.calls().len(), 1);
    }
}
