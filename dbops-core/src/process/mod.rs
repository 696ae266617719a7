// 模块声明
mod runner;
mod types;

#[cfg(test)]
pub(crate) mod fake;

// 重新导出公共API
pub use runner::{ProcessRunner, TokioProcessRunner};
pub use types::{CommandSpec, ProcessOutput};
