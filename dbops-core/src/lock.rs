use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// 按目标加锁的注册表
///
/// 同一目标（备份存储、迁移目录）上的备份、恢复与迁移操作串行执行，
/// 不同目标互不影响。克隆后共享同一份锁表。
#[derive(Debug, Clone, Default)]
pub struct OperationLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// 持有期间独占目标，drop 时释放
#[derive(Debug)]
pub struct TargetGuard {
    target: String,
    _guard: OwnedMutexGuard<()>,
}

impl TargetGuard {
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Drop for TargetGuard {
    fn drop(&mut self) {
        debug!("释放目标锁: {}", self.target);
    }
}

impl OperationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 备份存储目标的锁键
    pub fn backup_key(storage: &str) -> String {
        format!("backup:{storage}")
    }

    /// 迁移目录目标的锁键
    pub fn migration_key(dir: &str) -> String {
        format!("migration:{dir}")
    }

    /// 获取目标锁，目标被占用时等待
    pub async fn acquire(&self, target: &str) -> TargetGuard {
        // 先克隆出 Arc，避免在等待期间持有 DashMap 分片锁
        let lock = self
            .locks
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        debug!("等待目标锁: {}", target);
        let guard = lock.lock_owned().await;
        debug!("获得目标锁: {}", target);

        TargetGuard {
            target: target.to_string(),
            _guard: guard,
        }
    }

    /// 目标当前是否被占用
    pub fn is_locked(&self, target: &str) -> bool {
        self.locks
            .get(target)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_target_is_exclusive() {
        let locks = OperationLocks::new();
        let key = OperationLocks::backup_key("./backups");

        let guard = locks.acquire(&key).await;
        assert!(locks.is_locked(&key));

        let contender = locks.clone();
        let contender_key = key.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.acquire(&contender_key).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        waiting.await.unwrap();
        assert!(!locks.is_locked(&key));
    }

    #[tokio::test]
    async fn test_distinct_targets_do_not_block() {
        let locks = OperationLocks::new();
        let _backup = locks.acquire(&OperationLocks::backup_key("./backups")).await;
        let migration = locks
            .acquire(&OperationLocks::migration_key("prisma/migrations"))
            .await;
        assert_eq!(migration.target(), "migration:prisma/migrations");
    }
}
