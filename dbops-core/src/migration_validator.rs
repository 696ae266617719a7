use crate::config::AppConfig;
use crate::constants::{migration, scripts, timeout};
use crate::outcome::{DestructiveCheck, OperationResult, ValidationResult};
use crate::process::{CommandSpec, ProcessRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 迁移定义校验器
#[derive(Clone)]
pub struct MigrationValidator {
    runner: Arc<dyn ProcessRunner>,
    migrations_dir: PathBuf,
    shell: String,
    script: PathBuf,
    timeout: Duration,
}

impl MigrationValidator {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        migrations_dir: PathBuf,
        shell: impl Into<String>,
        script: PathBuf,
    ) -> Self {
        Self {
            runner,
            migrations_dir,
            shell: shell.into(),
            script,
            timeout: Duration::from_secs(timeout::DEFAULT_PROCESS_TIMEOUT),
        }
    }

    pub fn from_config(runner: Arc<dyn ProcessRunner>, config: &AppConfig) -> Self {
        Self::new(
            runner,
            config.get_migrations_dir(),
            config.scripts.shell.clone(),
            PathBuf::from(&config.scripts.validate_migration),
        )
        .with_timeout(config.process_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.shell)
            .arg(self.script.to_string_lossy())
            .arg(self.migrations_dir.to_string_lossy())
            .timeout(self.timeout)
    }

    /// 校验迁移定义：目录必须存在，然后交给外部脚本检查
    pub async fn validate_migrations(&self) -> ValidationResult {
        info!("校验迁移目录: {}", self.migrations_dir.display());

        if !self.migrations_dir.exists() {
            return ValidationResult::invalid(format!(
                "Migration directory not found: {}",
                self.migrations_dir.display()
            ));
        }

        match self.runner.run_checked(&self.command()).await {
            Ok(output) if output.has_stderr() => {
                error!("迁移校验 stderr: {}", output.stderr.trim());
                ValidationResult::invalid(format!("Validation error: {}", output.stderr.trim()))
            }
            Ok(output) => {
                debug!("迁移校验输出: {}", output.stdout.trim());
                ValidationResult::valid("Migration validation successful")
            }
            Err(e) => {
                error!("迁移校验失败: {}", e);
                ValidationResult::invalid(format!("Migration validation failed: {e}"))
            }
        }
    }

    /// 以测试模式调用外部脚本
    pub async fn test_migrations(&self) -> OperationResult {
        info!("测试迁移: {}", self.migrations_dir.display());

        let command = self.command().arg(scripts::TEST_MIGRATIONS_FLAG);
        match self.runner.run_checked(&command).await {
            Ok(output) if output.has_stderr() => {
                error!("迁移测试 stderr: {}", output.stderr.trim());
                OperationResult::failure(format!("Migration test error: {}", output.stderr.trim()))
            }
            Ok(output) => {
                debug!("迁移测试输出: {}", output.stdout.trim());
                OperationResult::success("Migration test completed successfully")
            }
            Err(e) => {
                error!("迁移测试失败: {}", e);
                OperationResult::failure(format!("Migration test failed: {e}"))
            }
        }
    }

    /// 检查破坏性变更：外部脚本 stdout 中出现约定标记即视为存在
    pub async fn check_destructive_changes(&self) -> DestructiveCheck {
        info!("检查破坏性变更...");

        match self.runner.run_checked(&self.command()).await {
            Ok(output) if output.has_stderr() => {
                error!("破坏性变更检查 stderr: {}", output.stderr.trim());
                DestructiveCheck {
                    has_destructive_changes: false,
                    details: format!("Check error: {}", output.stderr.trim()),
                }
            }
            Ok(output) => {
                let has_destructive = output.stdout.contains(migration::DESTRUCTIVE_MARKER);
                debug!("破坏性变更检查输出: {}", output.stdout.trim());
                if has_destructive {
                    warn!("⚠️  迁移中包含潜在的破坏性操作");
                }

                DestructiveCheck {
                    has_destructive_changes: has_destructive,
                    details: if has_destructive {
                        "Destructive changes detected".to_string()
                    } else {
                        "No destructive changes found".to_string()
                    },
                }
            }
            Err(e) => {
                error!("破坏性变更检查失败: {}", e);
                DestructiveCheck {
                    has_destructive_changes: false,
                    details: format!("Destructive change check failed: {e}"),
                }
            }
        }
    }

    /// 完整校验：结构校验失败即返回；破坏性变更只作为提示附加在结果中，不阻断
    pub async fn comprehensive_validation(&self) -> ValidationResult {
        let file_validation = self.validate_migrations().await;
        if !file_validation.valid {
            return file_validation;
        }

        let destructive_check = self.check_destructive_changes().await;

        ValidationResult::valid(format!(
            "Migration validation successful. {}",
            destructive_check.details
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::{FakeResponse, FakeRunner};
    use tempfile::tempdir;

    const SCRIPT: &str = "scripts/validate-migration.sh";

    fn validator(runner: &Arc<FakeRunner>, dir: &Path) -> MigrationValidator {
        MigrationValidator::new(runner.clone(), dir.to_path_buf(), "bash", PathBuf::from(SCRIPT))
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("prisma").join("migrations");
        let runner = Arc::new(FakeRunner::new());

        let result = validator(&runner, &missing).validate_migrations().await;
        assert_eq!(
            result,
            ValidationResult::invalid(format!(
                "Migration directory not found: {}",
                missing.display()
            ))
        );
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_script_receives_directory() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());

        let result = validator(&runner, dir.path()).validate_migrations().await;
        assert!(result.valid);

        let path = dir.path().to_string_lossy().to_string();
        assert_eq!(runner.calls()[0], vec!["bash", SCRIPT, path.as_str()]);
    }

    #[tokio::test]
    async fn test_stderr_fails_validation() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["bash", SCRIPT], FakeResponse::stderr("migration.sql: syntax error"));

        let result = validator(&runner, dir.path()).validate_migrations().await;
        assert!(!result.valid);
        assert_eq!(result.details, "Validation error: migration.sql: syntax error");
    }

    #[tokio::test]
    async fn test_newline_only_stderr_fails_validation() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["bash", SCRIPT], FakeResponse::stderr("\n"));

        let result = validator(&runner, dir.path()).validate_migrations().await;
        assert!(!result.valid);

        let check = validator(&runner, dir.path()).check_destructive_changes().await;
        assert!(!check.has_destructive_changes);
        assert!(check.details.starts_with("Check error:"));
    }

    #[tokio::test]
    async fn test_migrations_mode_flag() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner.respond(&["bash", SCRIPT], FakeResponse::exit(1, "shadow database unavailable"));

        let result = validator(&runner, dir.path()).test_migrations().await;
        assert!(!result.success);
        assert!(result.details.starts_with("Migration test failed: "));
        assert_eq!(runner.count_calls_with("--test-migrations"), 1);
    }

    #[tokio::test]
    async fn test_destructive_marker_detection() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner.respond(
            &["bash", SCRIPT],
            FakeResponse::stdout(
                "Checking 3 migrations...\nWARNING: Potentially destructive operations found\n  DROP TABLE \"Draft\";\n",
            ),
        );

        let check = validator(&runner, dir.path()).check_destructive_changes().await;
        assert!(check.has_destructive_changes);
        assert_eq!(check.details, "Destructive changes detected");
    }

    #[tokio::test]
    async fn test_marker_must_match_exactly() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner.respond(
            &["bash", SCRIPT],
            FakeResponse::stdout("warning: potentially destructive operations found"),
        );

        let check = validator(&runner, dir.path()).check_destructive_changes().await;
        assert!(!check.has_destructive_changes);
        assert_eq!(check.details, "No destructive changes found");
    }

    #[tokio::test]
    async fn test_destructive_findings_do_not_block() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(FakeRunner::new());
        runner.respond(
            &["bash", SCRIPT],
            FakeResponse::stdout("WARNING: Potentially destructive operations found"),
        );

        let result = validator(&runner, dir.path()).comprehensive_validation().await;
        assert!(result.valid);
        assert_eq!(
            result.details,
            "Migration validation successful. Destructive changes detected"
        );
    }

    #[tokio::test]
    async fn test_comprehensive_short_circuits() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");
        let runner = Arc::new(FakeRunner::new());

        let result = validator(&runner, &missing).comprehensive_validation().await;
        assert!(!result.valid);
        assert!(runner.calls().is_empty());
    }
}
