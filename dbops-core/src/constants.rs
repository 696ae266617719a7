/// 外部脚本相关常量
pub mod scripts {
    use std::path::{Path, PathBuf};

    /// 执行脚本的默认 shell
    pub const DEFAULT_SHELL: &str = "bash";

    /// 脚本目录名
    pub const SCRIPTS_DIR_NAME: &str = "scripts";

    /// 备份脚本文件名
    pub const BACKUP_SCRIPT: &str = "backup-database.sh";

    /// 恢复脚本文件名
    pub const RESTORE_SCRIPT: &str = "restore-database.sh";

    /// 备份校验脚本文件名
    pub const VALIDATE_BACKUP_SCRIPT: &str = "validate-backup.sh";

    /// 迁移校验脚本文件名
    pub const VALIDATE_MIGRATION_SCRIPT: &str = "validate-migration.sh";

    /// 备份校验脚本的"恢复测试"模式开关
    pub const TEST_RESTORE_FLAG: &str = "--test-restore";

    /// 迁移校验脚本的"迁移测试"模式开关
    pub const TEST_MIGRATIONS_FLAG: &str = "--test-migrations";

    /// 获取脚本路径（跨平台）
    pub fn get_script_path(file_name: &str) -> PathBuf {
        Path::new(SCRIPTS_DIR_NAME).join(file_name)
    }
}

/// 备份相关常量
pub mod backup {
    use std::path::{Path, PathBuf};

    /// 全量备份策略关键字
    pub const STRATEGY_FULL: &str = "full";

    /// 增量备份策略关键字
    pub const STRATEGY_INCREMENTAL: &str = "incremental";

    /// 事务日志备份策略关键字
    pub const STRATEGY_TRANSACTION_LOG: &str = "transaction-log";

    /// 备份配置目录名
    pub const CONFIG_DIR_NAME: &str = "config";

    /// 备份配置文件名
    pub const CONFIG_FILE_NAME: &str = "backup-config.json";

    /// 默认本地备份目录
    pub const DEFAULT_LOCAL_PATH: &str = "./backups";

    /// 获取默认备份配置文件路径（跨平台）
    pub fn get_default_config_path() -> PathBuf {
        Path::new(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
    }
}

/// 迁移相关常量
pub mod migration {
    use std::path::{Path, PathBuf};

    /// 外部校验脚本输出中表示存在破坏性操作的标记
    ///
    /// 与外部脚本之间的文本约定，必须逐字保持一致
    pub const DESTRUCTIVE_MARKER: &str = "WARNING: Potentially destructive operations found";

    /// 默认迁移工具名称（用于提示信息）
    pub const DEFAULT_TOOL_NAME: &str = "Prisma";

    /// 默认迁移工具可执行程序
    pub const DEFAULT_TOOL_PROGRAM: &str = "npx";

    /// 默认迁移工具前置参数
    pub const DEFAULT_TOOL_ARGS: [&str; 2] = ["prisma", "migrate"];

    /// 只负责启动工具的包启动器，展示命令时省略
    pub const PACKAGE_LAUNCHERS: [&str; 3] = ["npx", "bunx", "pnpx"];

    /// 迁移工具子命令
    pub mod subcommands {
        pub const DEPLOY: &str = "deploy";
        pub const DEV: &str = "dev";
        pub const RESET: &str = "reset";
        pub const STATUS: &str = "status";
        pub const NAME_FLAG: &str = "--name";
        pub const FORCE_FLAG: &str = "--force";
    }

    /// 获取默认迁移目录（跨平台）
    pub fn get_default_migrations_dir() -> PathBuf {
        Path::new("prisma").join("migrations")
    }
}

/// 监控相关常量
pub mod monitoring {
    use std::path::{Path, PathBuf};

    /// 慢备份告警阈值（毫秒），5 分钟
    pub const SLOW_BACKUP_THRESHOLD_MS: u64 = 300_000;

    /// 最近操作查询的默认条数
    pub const DEFAULT_RECENT_LIMIT: usize = 10;

    /// 日志目录名
    pub const LOG_DIR_NAME: &str = "logs";

    /// 操作日志文件名
    pub const LOG_FILE_NAME: &str = "database-operations.log";

    /// 备份操作名
    pub const OPERATION_BACKUP: &str = "backup";

    /// 迁移操作名
    pub const OPERATION_MIGRATION: &str = "migration";

    /// 恢复操作名
    pub const OPERATION_RESTORE: &str = "restore";

    /// 创建迁移操作名
    pub const OPERATION_MIGRATION_CREATE: &str = "migration-create";

    /// 重置数据库操作名
    pub const OPERATION_DATABASE_RESET: &str = "database-reset";

    /// 获取默认操作日志路径（跨平台）
    pub fn get_default_log_file() -> PathBuf {
        Path::new(LOG_DIR_NAME).join(LOG_FILE_NAME)
    }
}

/// 超时时间常量（秒）
pub mod timeout {
    /// 外部命令默认超时时间（30 分钟，全量备份可能较慢）
    pub const DEFAULT_PROCESS_TIMEOUT: u64 = 1800;
}

/// 应用配置相关常量
pub mod config {
    /// 配置文件名
    pub const CONFIG_FILE_NAME: &str = "dbops.toml";

    /// 隐藏配置文件名
    pub const HIDDEN_CONFIG_FILE_NAME: &str = ".dbops.toml";
}

/// 技术版本信息常量
pub mod version {
    /// 核心库版本（自动同步）
    pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
}
