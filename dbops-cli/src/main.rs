use clap::Parser;
use dbops_cli::{Cli, CliApp, Commands, project_info, run_init, setup_logging};
use dbops_core::{DbOpsError, constants::config};
use std::path::PathBuf;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 设置日志记录
    let log_guard = setup_logging(cli.verbose);
    debug!("{}", project_info::get_version_string());

    let exit_code = run(cli).await;

    // process::exit 不会执行析构，先刷新文件日志
    drop(log_guard);
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> i32 {
    // `init` 命令是特例，它不需要预先加载配置
    if let Commands::Init { force } = cli.command {
        let config_path = cli
            .config
            .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE_NAME));
        if let Err(e) = run_init(force, &config_path).await {
            error!("❌ 初始化失败: {}", e);
            return 1;
        }
        return 0;
    }

    // 对于其他所有命令，需要加载配置并装配服务
    let app = match CliApp::new_with_config(cli.config.as_deref()).await {
        Ok(app) => app,
        Err(DbOpsError::ConfigNotFound(path)) => {
            error!("❌ 配置文件 '{}' 未找到。", path);
            error!("👉 请先运行 'dbops-cli init' 命令来创建配置文件。");
            return 1;
        }
        Err(e) => {
            error!("❌ 应用初始化失败: {}", e);
            return 1;
        }
    };

    // 运行命令
    if let Err(e) = app.run_command(cli.command).await {
        error!("❌ 操作失败: {}", e);
        return 1;
    }
    0
}
