use crate::config::AppConfig;
use crate::constants::{scripts, timeout};
use crate::outcome::{OperationResult, ValidationResult};
use crate::process::{CommandSpec, ProcessRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// 备份文件校验器
///
/// 所有失败都转换为结果返回，调用方无需处理错误
#[derive(Clone)]
pub struct BackupValidator {
    runner: Arc<dyn ProcessRunner>,
    shell: String,
    script: PathBuf,
    timeout: Duration,
}

impl BackupValidator {
    pub fn new(runner: Arc<dyn ProcessRunner>, shell: impl Into<String>, script: PathBuf) -> Self {
        Self {
            runner,
            shell: shell.into(),
            script,
            timeout: Duration::from_secs(timeout::DEFAULT_PROCESS_TIMEOUT),
        }
    }

    pub fn from_config(runner: Arc<dyn ProcessRunner>, config: &AppConfig) -> Self {
        Self::new(
            runner,
            config.scripts.shell.clone(),
            PathBuf::from(&config.scripts.validate_backup),
        )
        .with_timeout(config.process_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, backup_file: &Path) -> CommandSpec {
        CommandSpec::new(&self.shell)
            .arg(self.script.to_string_lossy())
            .arg(backup_file.to_string_lossy())
            .timeout(self.timeout)
    }

    /// 校验备份文件：先检查存在且非空，再调用外部校验脚本
    pub async fn validate_backup_file(&self, backup_file: &Path) -> ValidationResult {
        info!("校验备份文件: {}", backup_file.display());

        match tokio::fs::metadata(backup_file).await {
            Ok(metadata) if metadata.is_file() && metadata.len() == 0 => {
                return ValidationResult::invalid("Backup file is empty");
            }
            Ok(metadata) if metadata.is_file() => {}
            _ => {
                return ValidationResult::invalid(format!(
                    "Backup file not found: {}",
                    backup_file.display()
                ));
            }
        }

        let command = self.command(backup_file);
        match self.runner.run_checked(&command).await {
            Ok(output) if output.has_stderr() => {
                error!("备份校验 stderr: {}", output.stderr.trim());
                ValidationResult::invalid(format!("Validation error: {}", output.stderr.trim()))
            }
            Ok(output) => {
                debug!("备份校验输出: {}", output.stdout.trim());
                ValidationResult::valid("Backup file validation successful")
            }
            Err(e) => {
                error!("备份校验失败: {}", e);
                ValidationResult::invalid(format!("Backup validation failed: {e}"))
            }
        }
    }

    /// 以测试恢复模式调用外部校验脚本
    pub async fn test_restore(&self, backup_file: &Path) -> OperationResult {
        info!("测试从备份恢复: {}", backup_file.display());

        let command = self.command(backup_file).arg(scripts::TEST_RESTORE_FLAG);
        match self.runner.run_checked(&command).await {
            Ok(output) if output.has_stderr() => {
                error!("恢复测试 stderr: {}", output.stderr.trim());
                OperationResult::failure(format!("Restore test error: {}", output.stderr.trim()))
            }
            Ok(output) => {
                debug!("恢复测试输出: {}", output.stdout.trim());
                OperationResult::success("Restore test completed successfully")
            }
            Err(e) => {
                error!("恢复测试失败: {}", e);
                OperationResult::failure(format!("Restore test failed: {e}"))
            }
        }
    }

    /// 完整校验：文件校验通过后才执行恢复测试
    pub async fn comprehensive_validation(&self, backup_file: &Path) -> ValidationResult {
        let file_validation = self.validate_backup_file(backup_file).await;
        if !file_validation.valid {
            return file_validation;
        }

        let restore_test = self.test_restore(backup_file).await;
        if !restore_test.success {
            return ValidationResult::invalid(restore_test.details);
        }

        ValidationResult::valid("Comprehensive backup validation successful")
    }
}
