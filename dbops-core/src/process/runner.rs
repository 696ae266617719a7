use super::types::{CommandSpec, ProcessOutput};
use crate::{DbOpsError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// 外部进程执行器
///
/// 所有备份、校验与迁移动作都通过它调用外部脚本/工具，测试中可替换为脚本化实现
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// 执行命令并返回输出，非零退出码不视为错误
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput>;

    /// 执行命令，非零退出码转换为错误
    async fn run_checked(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        self.run(command).await?.ensure_success(command)
    }
}

/// 基于 tokio 的真实进程执行器
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        let program = which::which(&command.program).map_err(|e| DbOpsError::MissingProgram {
            program: command.program.clone(),
            reason: e.to_string(),
        })?;

        debug!("执行外部命令: {}", command);

        // 超时后 future 被丢弃，kill_on_drop 负责结束子进程
        let child = Command::new(program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        match tokio::time::timeout(command.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = ProcessOutput::from(output?);
                debug!(
                    exit_code = ?output.exit_code,
                    stdout_len = output.stdout.len(),
                    stderr_len = output.stderr.len(),
                    "外部命令结束"
                );
                Ok(output)
            }
            Err(_) => Err(DbOpsError::Timeout {
                operation: command.to_string(),
                timeout_seconds: command.timeout.as_secs(),
            }),
        }
    }
}
