//! 测试用脚本化进程执行器

use super::{CommandSpec, ProcessOutput, ProcessRunner};
use crate::{DbOpsError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// 预设的命令响应
#[derive(Debug, Clone)]
pub(crate) enum FakeResponse {
    Output(ProcessOutput),
    Timeout,
}

impl FakeResponse {
    pub(crate) fn stdout(stdout: &str) -> Self {
        Self::Output(ProcessOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }

    pub(crate) fn stderr(stderr: &str) -> Self {
        Self::Output(ProcessOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code: Some(0),
        })
    }

    pub(crate) fn exit(code: i32, stderr: &str) -> Self {
        Self::Output(ProcessOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code: Some(code),
        })
    }
}

/// 按"程序 + 参数"前缀匹配响应，最长前缀优先；未匹配时返回空的成功输出
#[derive(Default)]
pub(crate) struct FakeRunner {
    rules: Mutex<Vec<(Vec<String>, FakeResponse)>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, prefix: &[&str], response: FakeResponse) {
        self.rules
            .lock()
            .unwrap()
            .push((prefix.iter().map(|s| s.to_string()).collect(), response));
    }

    /// 所有调用记录，每条为 [program, args..]
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// 参数中包含 `needle` 的调用次数
    pub(crate) fn count_calls_with(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.iter().any(|part| part == needle))
            .count()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        let mut line = vec![command.program.clone()];
        line.extend(command.args.iter().cloned());
        self.calls.lock().unwrap().push(line.clone());

        let rules = self.rules.lock().unwrap();
        let matched = rules
            .iter()
            .filter(|(prefix, _)| line.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, response)| response.clone());

        match matched {
            Some(FakeResponse::Output(output)) => Ok(output),
            Some(FakeResponse::Timeout) => Err(DbOpsError::Timeout {
                operation: command.to_string(),
                timeout_seconds: command.timeout.as_secs(),
            }),
            None => Ok(ProcessOutput {
                exit_code: Some(0),
                ..ProcessOutput::default()
            }),
        }
    }
}
