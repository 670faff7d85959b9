use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use path_clean::PathClean;
use tokio::sync::{Mutex, RwLock};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};

/// Hands out one `RwLock` per normalized path.
/// The bouquet directory and the playlist cache are guarded through it, so an
/// interactive run and a scheduled run never interleave their writes.
#[derive(Clone)]
pub struct FileLockManager {
    locks: Arc<Mutex<HashMap<PathBuf, Weak<RwLock<()>>>>>,
}

impl FileLockManager {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Removes all entries whose `RwLock` has been dropped.
    pub async fn prune_unused_locks(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_key, weak_lock| weak_lock.upgrade().is_some());
    }

    // Acquires a read lock for the specified path and returns a FileReadGuard.
    pub async fn read_lock(&self, path: &Path) -> FileReadGuard {
        let file_lock = self.get_or_create_lock(normalize_path(path)).await;
        let guard = Arc::clone(&file_lock).read_owned().await;
        FileReadGuard::new(guard)
    }

    // Acquires a write lock for the specified path and returns a FileWriteGuard.
    pub async fn write_lock(&self, path: &Path) -> FileWriteGuard {
        let file_lock = self.get_or_create_lock(normalize_path(path)).await;
        let guard = Arc::clone(&file_lock).write_owned().await;
        FileWriteGuard::new(guard)
    }

    async fn get_or_create_lock(&self, lock_key: PathBuf) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().await;

        if let Some(weak_lock) = locks.get(&lock_key) {
            if let Some(strong_lock) = weak_lock.upgrade() {
                return strong_lock;
            }
            locks.remove(&lock_key);
        }

        let file_lock = Arc::new(RwLock::new(()));
        locks.insert(lock_key, Arc::downgrade(&file_lock));
        file_lock
    }
}

impl Default for FileLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FileLockManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLockManager").finish()
    }
}

#[allow(dead_code)]
pub struct FileReadGuard {
    _guard: OwnedRwLockReadGuard<()>,
}

impl FileReadGuard {
    fn new(guard: OwnedRwLockReadGuard<()>) -> Self {
        Self { _guard: guard }
    }
}

#[allow(dead_code)]
pub struct FileWriteGuard {
    _guard: OwnedRwLockWriteGuard<()>,
}

impl FileWriteGuard {
    fn new(guard: OwnedRwLockWriteGuard<()>) -> Self {
        Self { _guard: guard }
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let base = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_else(|_| PathBuf::from("./")).join(path)
    };

    base.clean()
}
