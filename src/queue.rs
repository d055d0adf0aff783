//! Deduplicating queue of pending reloads.
//!
//! Keys are selected and removed under the lock as one step; the reload
//! commands run afterwards, with the lock released, so a slow command never
//! holds up enqueues from the watch sessions or requests from clients.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::executor::Executor;

/// Ordered set of config keys waiting to be reloaded.
pub struct ReloadQueue {
    contents: Mutex<Vec<String>>,
    executor: Arc<dyn Executor>,
}

impl ReloadQueue {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            contents: Mutex::new(Vec::with_capacity(10)),
            executor,
        }
    }

    /// Append a key unless it is already queued.
    ///
    /// Returns `true` when the key was added.
    pub fn enqueue(&self, key: &str) -> bool {
        let mut contents = self.contents.lock();
        if contents.iter().any(|queued| queued == key) {
            return false;
        }
        contents.push(key.to_string());
        true
    }

    /// Snapshot of the queue in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.contents.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.contents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.lock().is_empty()
    }

    /// Drain the queue and run every key that was in it.
    pub fn execute_all(&self) -> Vec<String> {
        let taken = std::mem::take(&mut *self.contents.lock());
        self.run(&taken);
        taken
    }

    /// Remove and run the queued keys named in `keys`.
    ///
    /// Keys run in queue order; names that are not queued are ignored.
    pub fn execute(&self, keys: &[String]) -> Vec<String> {
        let taken = self.take_matching(keys);
        self.run(&taken);
        taken
    }

    /// Empty the queue without running anything.
    pub fn clear_all(&self) -> Vec<String> {
        std::mem::take(&mut *self.contents.lock())
    }

    /// Remove the queued keys named in `keys` without running them.
    pub fn clear(&self, keys: &[String]) -> Vec<String> {
        self.take_matching(keys)
    }

    /// Flush dispatch: an empty `keys` means the whole queue.
    pub fn flush(&self, keys: &[String], clear: bool) -> Vec<String> {
        match (keys.is_empty(), clear) {
            (true, false) => self.execute_all(),
            (true, true) => self.clear_all(),
            (false, false) => self.execute(keys),
            (false, true) => self.clear(keys),
        }
    }

    fn take_matching(&self, keys: &[String]) -> Vec<String> {
        let mut contents = self.contents.lock();
        let mut taken = Vec::new();
        contents.retain(|queued| {
            if keys.contains(queued) {
                taken.push(queued.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    fn run(&self, keys: &[String]) {
        for key in keys {
            self.executor.execute(key);
        }
    }
}
