//! Deferred cleanup tasks.
//!
//! Every artifact with a limited lifetime registers its teardown here under
//! a key. Tasks run on the tokio runtime, remove themselves once they fire
//! and die with the process if it exits first.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct Entry {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
    tasks: Mutex<HashMap<String, Entry>>,
    next_generation: AtomicU64,
    idle: Notify,
}

impl Inner {
    fn tasks(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A panic while holding the lock leaves the map intact
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registry of armed cleanup tasks, cheap to clone.
#[derive(Clone, Default)]
pub struct DeletionScheduler {
    inner: Arc<Inner>,
}

impl DeletionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay` unless disarmed first.
    ///
    /// Arming an already armed key replaces the earlier task.
    pub fn arm<F>(&self, key: impl Into<String>, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();

        // Held across spawn so the task cannot remove itself before it is inserted
        let mut tasks = self.inner.tasks();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;

            let mut tasks = inner.tasks();
            if tasks.get(&task_key).map(|e| e.generation) == Some(generation) {
                tasks.remove(&task_key);
            }
            let now_idle = tasks.is_empty();
            drop(tasks);

            if now_idle {
                inner.idle.notify_waiters();
            }
        });

        log::debug!("Armed cleanup '{}' in {:?}", key, delay);
        if let Some(previous) = tasks.insert(key, Entry { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Cancel a pending task. Returns whether one was armed.
    pub fn disarm(&self, key: &str) -> bool {
        let removed = self.inner.tasks().remove(key);
        let now_idle = self.inner.tasks().is_empty();

        if now_idle {
            self.inner.idle.notify_waiters();
        }

        match removed {
            Some(entry) => {
                entry.handle.abort();
                log::debug!("Disarmed cleanup '{}'", key);
                true
            }
            None => false,
        }
    }

    /// Keys of all tasks that have not fired yet, sorted.
    pub fn pending(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.tasks().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Wait until no task is pending.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.tasks().is_empty() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_fires_and_removes_itself() {
        let scheduler = DeletionScheduler::new();
        let (tx, rx) = oneshot::channel();

        scheduler.arm("gist:1", Duration::from_millis(1), async move {
            let _ = tx.send(());
        });

        rx.await.unwrap();
        scheduler.wait_idle().await;
        assert!(scheduler.pending().is_empty());
    }

    #[tokio::test]
    async fn test_disarm_cancels() {
        let scheduler = DeletionScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        scheduler.arm("gist:2", Duration::from_secs(3600), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(scheduler.pending(), vec!["gist:2".to_string()]);
        assert!(scheduler.disarm("gist:2"));
        assert!(!scheduler.disarm("gist:2"));
        assert!(scheduler.pending().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rearm_replaces_task() {
        let scheduler = DeletionScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let first = Arc::clone(&fired);
        scheduler.arm("file:a", Duration::from_secs(3600), async move {
            first.fetch_add(10, Ordering::SeqCst);
        });

        let (tx, rx) = oneshot::channel();
        let second = Arc::clone(&fired);
        scheduler.arm("file:a", Duration::from_millis(1), async move {
            second.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(());
        });

        rx.await.unwrap();
        scheduler.wait_idle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_when_empty() {
        DeletionScheduler::new().wait_idle().await;
    }
}
