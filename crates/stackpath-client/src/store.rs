use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use stackpath_types::{ChatMessage, Thread};
use tracing::warn;

use crate::error::ClientError;

const THREADS_KEY: &str = "stackpath_threads";
const ACTIVE_THREAD_KEY: &str = "stackpath_active_thread";

fn messages_key(thread_id: &str) -> String {
    format!("stackpath_messages_{thread_id}")
}

/// Raw string-keyed storage underneath [`LocalStore`].
///
/// Mirrors the browser localStorage surface: get, set, remove. Implementations
/// must be safe to share across the controller and UI code.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        (**self).remove(key)
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ClientError::Backend(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ClientError::Backend(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ClientError::Backend(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Durable backend keeping one JSON file per key under a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| ClientError::Backend(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Backend(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        std::fs::write(self.path_for(key), value).map_err(|e| ClientError::Backend(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Backend(e.to_string())),
        }
    }
}

/// Namespaced persistence for threads, per-thread message lists, and the
/// active thread id.
///
/// Reads degrade: missing or corrupt records come back as empty defaults so
/// one bad entry never bricks the conversation list. Writes are surfaced to
/// callers who want them and logged by callers who don't.
pub struct LocalStore {
    backend: Box<dyn StorageBackend>,
}

impl LocalStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!(key, error = %e, "storage read failed, using default");
                return T::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "corrupt record, using default");
                T::default()
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ClientError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    pub fn threads(&self) -> Vec<Thread> {
        self.read_or_default(THREADS_KEY)
    }

    pub fn messages(&self, thread_id: &str) -> Vec<ChatMessage> {
        self.read_or_default(&messages_key(thread_id))
    }

    pub fn save_messages(
        &self,
        thread_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), ClientError> {
        self.write(&messages_key(thread_id), &messages)
    }

    /// Create a thread, persist it, and make it active.
    pub fn create_thread(&self, title: impl Into<String>) -> Result<Thread, ClientError> {
        let thread = Thread::new(title);
        let mut threads = self.threads();
        threads.push(thread.clone());
        self.write(THREADS_KEY, &threads)?;
        self.set_active_thread(Some(&thread.id))?;
        Ok(thread)
    }

    /// Bump a thread's `updated_at`, optionally retitling it.
    pub fn touch_thread(&self, thread_id: &str, title: Option<&str>) -> Result<(), ClientError> {
        let mut threads = self.threads();
        if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
            thread.updated_at = chrono::Utc::now();
            if let Some(title) = title {
                thread.title = title.to_string();
            }
            self.write(THREADS_KEY, &threads)?;
        }
        Ok(())
    }

    /// Delete a thread and its message record.
    pub fn delete_thread(&self, thread_id: &str) -> Result<(), ClientError> {
        let mut threads = self.threads();
        threads.retain(|t| t.id != thread_id);
        self.write(THREADS_KEY, &threads)?;
        self.backend.remove(&messages_key(thread_id))?;
        if self.active_thread().as_deref() == Some(thread_id) {
            self.set_active_thread(None)?;
        }
        Ok(())
    }

    pub fn active_thread(&self) -> Option<String> {
        self.read_or_default::<Option<String>>(ACTIVE_THREAD_KEY)
    }

    pub fn set_active_thread(&self, thread_id: Option<&str>) -> Result<(), ClientError> {
        match thread_id {
            Some(id) => self.write(ACTIVE_THREAD_KEY, &id),
            None => self.backend.remove(ACTIVE_THREAD_KEY),
        }
    }
}
