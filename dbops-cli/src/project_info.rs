/// DbOps CLI 项目信息模块
///
/// dbops-cli 是面向运维人员的主程序，项目元数据统一在这里定义；
/// dbops-core 作为内部库，只提供技术性常量

/// 项目元数据（自动从 dbops-cli 的 Cargo.toml 同步）
pub mod metadata {
    pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    pub const PROJECT_LICENSE: &str = env!("CARGO_PKG_LICENSE");

    /// 用户友好的显示名称（手动维护）
    pub mod display {
        pub const FRIENDLY_NAME: &str = "DbOps";

        /// 比 Cargo.toml 中的描述更详细
        pub const DESCRIPTION_LONG: &str = "数据库运维编排工具：通过外部脚本执行备份与恢复，校验备份与迁移，\
             调用迁移工具应用迁移，并把每次操作写入操作日志供统计与告警";
    }
}

/// 版本信息
pub mod version_info {
    /// CLI 版本（自动从 Cargo.toml 同步）
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// 核心库版本（从 dbops-core 获取）
    pub const CORE_VERSION: &str = dbops_core::constants::version::CORE_VERSION;
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{} (core v{})",
        metadata::display::FRIENDLY_NAME,
        version_info::CLI_VERSION,
        version_info::CORE_VERSION
    )
}
