use crate::{
    config::AppConfig,
    constants::{
        migration::{self, subcommands},
        monitoring as monitoring_consts, timeout,
    },
    lock::OperationLocks,
    migration_validator::MigrationValidator,
    monitoring::{MonitoringService, OperationStatus},
    outcome::OperationResult,
    process::{CommandSpec, ProcessRunner},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 外部迁移工具
#[derive(Debug, Clone)]
pub struct MigrationTool {
    /// 显示名称，例如 "Prisma"
    pub name: String,
    pub program: String,
    /// 子命令之前的固定参数，例如 ["prisma", "migrate"]
    pub args: Vec<String>,
}

impl MigrationTool {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            name: config.migrations.tool_name.clone(),
            program: config.migrations.program.clone(),
            args: config.migrations.args.clone(),
        }
    }

    /// 给运维人员看的命令文本，省略包启动器，例如 "prisma migrate reset"
    pub fn command_line(&self, subcommand: &str) -> String {
        let skip_launcher =
            !self.args.is_empty() && migration::PACKAGE_LAUNCHERS.contains(&self.program.as_str());

        std::iter::once(self.program.as_str())
            .skip(usize::from(skip_launcher))
            .chain(self.args.iter().map(String::as_str))
            .chain(std::iter::once(subcommand))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 一次工具调用在日志与结果中使用的文案
struct ToolLabels {
    action: &'static str,
    error: &'static str,
    failed: &'static str,
}

const DEPLOY_LABELS: ToolLabels = ToolLabels {
    action: "应用迁移",
    error: "Migration error",
    failed: "Migration application failed",
};

const CREATE_LABELS: ToolLabels = ToolLabels {
    action: "创建迁移",
    error: "Migration creation error",
    failed: "Migration creation failed",
};

const RESET_LABELS: ToolLabels = ToolLabels {
    action: "重置数据库",
    error: "Database reset error",
    failed: "Database reset failed",
};

const STATUS_LABELS: ToolLabels = ToolLabels {
    action: "查询迁移状态",
    error: "Migration status error",
    failed: "Getting migration status failed",
};

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// 迁移名只允许字母、数字、下划线与连字符
fn is_valid_migration_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// 迁移服务
///
/// 只有 `apply_migrations` 需要先通过校验；所有失败都以结果返回
#[derive(Clone)]
pub struct MigrationService {
    runner: Arc<dyn ProcessRunner>,
    validator: MigrationValidator,
    monitoring: Arc<MonitoringService>,
    locks: OperationLocks,
    tool: MigrationTool,
    timeout: Duration,
}

impl MigrationService {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        validator: MigrationValidator,
        monitoring: Arc<MonitoringService>,
        locks: OperationLocks,
        tool: MigrationTool,
    ) -> Self {
        Self {
            runner,
            validator,
            monitoring,
            locks,
            tool,
            timeout: Duration::from_secs(timeout::DEFAULT_PROCESS_TIMEOUT),
        }
    }

    pub fn from_config(
        runner: Arc<dyn ProcessRunner>,
        monitoring: Arc<MonitoringService>,
        locks: OperationLocks,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            runner.clone(),
            MigrationValidator::from_config(runner, config),
            monitoring,
            locks,
            MigrationTool::from_config(config),
        )
        .with_timeout(config.process_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tool(&self) -> &MigrationTool {
        &self.tool
    }

    fn lock_key(&self) -> String {
        OperationLocks::migration_key(&self.validator.migrations_dir().to_string_lossy())
    }

    /// 调用迁移工具，成功时返回 stdout，失败时返回已组装好的失败结果
    async fn run_tool(
        &self,
        subcommand: &[&str],
        labels: &ToolLabels,
    ) -> std::result::Result<String, OperationResult> {
        let command = CommandSpec::new(&self.tool.program)
            .args(self.tool.args.iter().cloned())
            .args(subcommand.iter().copied())
            .timeout(self.timeout);

        match self.runner.run_checked(&command).await {
            Ok(output) if output.has_stderr() => {
                error!("{} stderr: {}", labels.action, output.stderr.trim());
                Err(OperationResult::failure(format!(
                    "{}: {}",
                    labels.error,
                    output.stderr.trim()
                )))
            }
            Ok(output) => {
                debug!("{}输出: {}", labels.action, output.stdout.trim());
                Ok(output.stdout)
            }
            Err(e) => {
                error!("{}失败: {}", labels.action, e);
                Err(OperationResult::failure(format!("{}: {e}", labels.failed)))
            }
        }
    }

    /// 应用待执行的迁移，校验不通过时不会调用迁移工具
    pub async fn apply_migrations(&self) -> OperationResult {
        let _guard = self.locks.acquire(&self.lock_key()).await;

        info!("应用待执行的迁移...");
        let start = Instant::now();

        let validation = self.validator.comprehensive_validation().await;
        let result = if !validation.valid {
            warn!("迁移校验未通过，跳过部署: {}", validation.details);
            OperationResult::failure(format!("Migration validation failed: {}", validation.details))
        } else {
            info!("{}", validation.details);
            match self.run_tool(&[subcommands::DEPLOY], &DEPLOY_LABELS).await {
                Ok(_) => OperationResult::success("Migrations applied successfully"),
                Err(failure) => failure,
            }
        };

        self.monitoring
            .monitor_migration(elapsed_ms(start), result.success, &result.details);
        result
    }

    /// 创建新迁移（无需预先校验）
    pub async fn create_migration(&self, name: &str) -> OperationResult {
        info!("创建新迁移: {}", name);

        if !is_valid_migration_name(name) {
            return OperationResult::failure(format!(
                "Migration creation failed: invalid migration name '{name}'"
            ));
        }

        let _guard = self.locks.acquire(&self.lock_key()).await;
        let start = Instant::now();

        let result = match self
            .run_tool(
                &[subcommands::DEV, subcommands::NAME_FLAG, name],
                &CREATE_LABELS,
            )
            .await
        {
            Ok(_) => OperationResult::success("Migration created successfully"),
            Err(failure) => failure,
        };

        self.monitoring.log_operation(
            monitoring_consts::OPERATION_MIGRATION_CREATE,
            OperationStatus::from_success(result.success),
            &result.details,
            Some(elapsed_ms(start)),
        );
        result
    }

    /// 强制重置数据库（不可逆，不做二次确认）
    pub async fn reset_database(&self) -> OperationResult {
        let _guard = self.locks.acquire(&self.lock_key()).await;

        warn!("⚠️  正在重置数据库...");
        let start = Instant::now();

        let result = match self
            .run_tool(&[subcommands::RESET, subcommands::FORCE_FLAG], &RESET_LABELS)
            .await
        {
            Ok(_) => OperationResult::success("Database reset successfully"),
            Err(failure) => failure,
        };

        self.monitoring.log_operation(
            monitoring_consts::OPERATION_DATABASE_RESET,
            OperationStatus::from_success(result.success),
            &result.details,
            Some(elapsed_ms(start)),
        );
        result
    }

    /// 查询迁移状态，成功时原样返回工具输出
    pub async fn get_migration_status(&self) -> OperationResult {
        info!("查询迁移状态...");

        match self.run_tool(&[subcommands::STATUS], &STATUS_LABELS).await {
            Ok(stdout) => OperationResult::success(stdout),
            Err(failure) => failure,
        }
    }
}
