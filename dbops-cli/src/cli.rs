use crate::project_info::{metadata, version_info};
use clap::{Parser, Subcommand};
use dbops_core::constants::monitoring;
use std::path::PathBuf;

/// 备份相关命令
#[derive(Subcommand, Debug, PartialEq)]
pub enum BackupCommand {
    /// 执行全量备份
    Full,
    /// 执行增量备份
    Incremental,
    /// 执行事务日志备份
    TransactionLog,
    /// 从备份文件恢复数据库
    Restore {
        /// 备份文件路径
        path: PathBuf,
    },
    /// 校验备份文件
    Validate {
        /// 备份文件路径
        path: PathBuf,
        /// 只检查文件是否存在，不调用外部校验脚本
        #[arg(long)]
        quick: bool,
    },
    /// 以测试模式恢复备份
    TestRestore {
        /// 备份文件路径
        path: PathBuf,
    },
    /// 显示当前备份配置
    Config,
}

/// 迁移相关命令
#[derive(Subcommand, Debug, PartialEq)]
pub enum MigrateCommand {
    /// 校验后应用所有待执行的迁移
    Apply,
    /// 创建新迁移
    Create {
        /// 迁移名称，只允许字母、数字、下划线与连字符
        name: String,
    },
    /// 重置数据库（会清空所有数据）
    Reset {
        /// 跳过确认提示
        #[arg(long)]
        force: bool,
    },
    /// 查看迁移状态
    Status,
    /// 校验迁移定义
    Validate,
    /// 以测试模式运行迁移
    Test,
    /// 检查迁移中的破坏性变更
    CheckDestructive,
}

/// 回滚相关命令
#[derive(Subcommand, Debug, PartialEq)]
pub enum RollbackCommand {
    /// 回滚指定迁移
    Migration {
        /// 迁移名称
        name: String,
    },
    /// 回滚最近若干步迁移
    Steps {
        /// 回滚步数
        steps: u32,
    },
    /// 从备份恢复数据库
    Restore {
        /// 备份文件路径
        path: PathBuf,
    },
    /// 创建回滚迁移
    Create {
        /// 迁移名称
        name: String,
    },
    /// 显示回滚建议
    Recommendations,
}

/// 监控相关命令
#[derive(Subcommand, Debug, PartialEq)]
pub enum MonitorCommand {
    /// 按状态统计操作日志
    Stats,
    /// 显示最近的操作
    Recent {
        /// 显示条数
        #[arg(long, default_value_t = monitoring::DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
}

/// DbOps CLI - 数据库运维工具
#[derive(Parser, Debug)]
#[command(name = "dbops-cli")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径（默认依次查找 dbops.toml、.dbops.toml）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// 首次使用时初始化，创建配置文件与日志目录
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
    },
    /// 备份与恢复
    #[command(subcommand)]
    Backup(BackupCommand),
    /// 数据库迁移
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// 回滚
    #[command(subcommand)]
    Rollback(RollbackCommand),
    /// 操作监控
    #[command(subcommand)]
    Monitor(MonitorCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dbops-cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["-v", "-c", "ops/dbops.toml", "monitor", "stats"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ops/dbops.toml")));
        assert_eq!(cli.command, Commands::Monitor(MonitorCommand::Stats));

        let cli = parse(&["backup", "full"]);
        assert!(!cli.verbose);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_backup_subcommands() {
        assert_eq!(
            parse(&["backup", "transaction-log"]).command,
            Commands::Backup(BackupCommand::TransactionLog)
        );
        assert_eq!(
            parse(&["backup", "validate", "backups/full.dump", "--quick"]).command,
            Commands::Backup(BackupCommand::Validate {
                path: PathBuf::from("backups/full.dump"),
                quick: true,
            })
        );
        assert_eq!(
            parse(&["backup", "test-restore", "a.dump"]).command,
            Commands::Backup(BackupCommand::TestRestore {
                path: PathBuf::from("a.dump"),
            })
        );
    }

    #[test]
    fn test_migrate_subcommands() {
        assert_eq!(
            parse(&["migrate", "create", "add_posts"]).command,
            Commands::Migrate(MigrateCommand::Create {
                name: "add_posts".to_string(),
            })
        );
        assert_eq!(
            parse(&["migrate", "reset"]).command,
            Commands::Migrate(MigrateCommand::Reset { force: false })
        );
        assert_eq!(
            parse(&["migrate", "check-destructive"]).command,
            Commands::Migrate(MigrateCommand::CheckDestructive)
        );
    }

    #[test]
    fn test_rollback_steps_must_be_a_number() {
        assert_eq!(
            parse(&["rollback", "steps", "2"]).command,
            Commands::Rollback(RollbackCommand::Steps { steps: 2 })
        );
        assert!(Cli::try_parse_from(["dbops-cli", "rollback", "steps", "two"]).is_err());
        assert!(Cli::try_parse_from(["dbops-cli", "rollback", "steps", "-1"]).is_err());
    }

    #[test]
    fn test_monitor_recent_default_limit() {
        assert_eq!(
            parse(&["monitor", "recent"]).command,
            Commands::Monitor(MonitorCommand::Recent { limit: 10 })
        );
        assert_eq!(
            parse(&["monitor", "recent", "--limit", "3"]).command,
            Commands::Monitor(MonitorCommand::Recent { limit: 3 })
        );
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["dbops-cli"]).is_err());
        assert!(Cli::try_parse_from(["dbops-cli", "backup"]).is_err());
    }
}
