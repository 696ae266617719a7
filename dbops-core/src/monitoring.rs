use crate::constants::monitoring;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 操作状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Failure,
    Warning,
}

impl OperationStatus {
    pub fn from_success(success: bool) -> Self {
        if success { Self::Success } else { Self::Failure }
    }
}

/// 告警级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

/// 操作日志记录，按行以 JSON 追加到日志文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLog {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub status: OperationStatus,
    pub details: String,
    /// 耗时（毫秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// 告警
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub message: String,
    pub severity: AlertSeverity,
}

/// 操作统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
    pub warning: usize,
}

/// 告警通知通道（邮件、IM 等外部集成的扩展点）
pub trait AlertNotifier: Send + Sync {
    fn name(&self) -> &str;

    fn notify(&self, alert: &Alert) -> anyhow::Result<()>;
}

/// 监控服务
///
/// 写日志与发告警都不会向调用方返回错误：日志写入失败只在控制台报告
#[derive(Clone)]
pub struct MonitoringService {
    log_file: PathBuf,
    slow_backup_threshold_ms: u64,
    notifiers: Vec<Arc<dyn AlertNotifier>>,
}

impl std::fmt::Debug for MonitoringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoringService")
            .field("log_file", &self.log_file)
            .field("slow_backup_threshold_ms", &self.slow_backup_threshold_ms)
            .field("notifiers", &self.notifiers.len())
            .finish()
    }
}

fn to_json<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

impl MonitoringService {
    /// 创建监控服务，日志目录不存在时尝试创建
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        let log_file = log_file.into();

        if let Some(parent) = log_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                match fs::create_dir_all(parent) {
                    Ok(_) => debug!("创建日志目录: {}", parent.display()),
                    Err(e) => warn!("无法创建日志目录 {}: {}", parent.display(), e),
                }
            }
        }

        Self {
            log_file,
            slow_backup_threshold_ms: monitoring::SLOW_BACKUP_THRESHOLD_MS,
            notifiers: Vec::new(),
        }
    }

    pub fn with_slow_backup_threshold(mut self, threshold_ms: u64) -> Self {
        self.slow_backup_threshold_ms = threshold_ms;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// 记录一次操作
    pub fn log_operation(
        &self,
        operation: &str,
        status: OperationStatus,
        details: &str,
        duration: Option<u64>,
    ) -> OperationLog {
        let entry = OperationLog {
            timestamp: Utc::now(),
            operation: operation.to_string(),
            status,
            details: details.to_string(),
            duration,
        };

        let line = to_json(&entry);
        info!(target: "dbops::monitoring", "[MONITORING] {}", line);

        if let Err(e) = self.append_line(&line) {
            error!("写入操作日志失败 {}: {}", self.log_file.display(), e);
        }

        entry
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        // 整行一次写入，减少并发写入时的交错
        file.write_all(format!("{line}\n").as_bytes())
    }

    /// 发送告警
    pub fn send_alert(&self, operation: &str, message: &str, severity: AlertSeverity) -> Alert {
        let alert = Alert {
            timestamp: Utc::now(),
            operation: operation.to_string(),
            message: message.to_string(),
            severity,
        };

        info!(target: "dbops::monitoring", "[ALERT] {}", to_json(&alert));

        if severity == AlertSeverity::Critical {
            error!(target: "dbops::monitoring", "CRITICAL ALERT: {} - {}", operation, message);
        }

        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(&alert) {
                warn!("告警通道 {} 发送失败: {}", notifier.name(), e);
            }
        }

        alert
    }

    /// 记录备份结果：失败发严重告警，耗时超过阈值发慢备份告警
    pub fn monitor_backup(&self, duration_ms: u64, success: bool, details: &str) -> Option<Alert> {
        self.log_operation(
            monitoring::OPERATION_BACKUP,
            OperationStatus::from_success(success),
            details,
            Some(duration_ms),
        );

        if !success {
            Some(self.send_alert(
                monitoring::OPERATION_BACKUP,
                &format!("Backup failed: {details}"),
                AlertSeverity::Critical,
            ))
        } else if duration_ms > self.slow_backup_threshold_ms {
            Some(self.send_alert(
                monitoring::OPERATION_BACKUP,
                &format!("Backup took longer than expected: {duration_ms}ms"),
                AlertSeverity::Warning,
            ))
        } else {
            None
        }
    }

    /// 记录迁移结果：只在失败时告警
    pub fn monitor_migration(&self, duration_ms: u64, success: bool, details: &str) -> Option<Alert> {
        self.log_operation(
            monitoring::OPERATION_MIGRATION,
            OperationStatus::from_success(success),
            details,
            Some(duration_ms),
        );

        if success {
            return None;
        }

        Some(self.send_alert(
            monitoring::OPERATION_MIGRATION,
            &format!("Migration failed: {details}"),
            AlertSeverity::Critical,
        ))
    }

    /// 读取日志文件中的全部记录，无法解析的行被跳过
    fn read_entries(&self) -> Vec<OperationLog> {
        let content = match fs::read_to_string(&self.log_file) {
            Ok(content) => content,
            Err(e) => {
                debug!("读取操作日志失败 {}: {}", self.log_file.display(), e);
                return Vec::new();
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<OperationLog>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("跳过无法解析的日志行: {}", e);
                    None
                }
            })
            .collect()
    }

    /// 按状态统计操作日志
    pub fn get_operation_stats(&self) -> OperationStats {
        self.read_entries()
            .iter()
            .fold(OperationStats::default(), |mut stats, entry| {
                stats.total += 1;
                match entry.status {
                    OperationStatus::Success => stats.success += 1,
                    OperationStatus::Failure => stats.failure += 1,
                    OperationStatus::Warning => stats.warning += 1,
                }
                stats
            })
    }

    /// 最近的 `limit` 条操作，最新的在前
    pub fn get_recent_operations(&self, limit: usize) -> Vec<OperationLog> {
        let mut entries = self.read_entries();
        entries.reverse();
        // 稳定排序：时间戳相同的记录保持后写入者在前
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        entries
    }
}
