use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Named string slots. Each call is all-or-nothing.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Returns false when the key did not exist.
    fn delete(&self, key: &str) -> Result<bool>;
}

/// One JSON file per key under a base directory.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read slot: {:?}", path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", self.base_dir))?;

        // Atomic replace
        let path = self.slot_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .with_context(|| format!("Failed to write slot: {:?}", tmp_path))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace slot: {:?}", path))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to delete slot: {:?}", path)),
        }
    }
}

#[cfg(test)]
pub use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use anyhow::Result;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    use super::KeyValueStore;

    /// In-process store for tests.
    #[derive(Default)]
    pub struct MemoryStore {
        slots: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn slots(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
            self.slots
                .lock()
                .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.slots()?.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.slots()?.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<bool> {
            Ok(self.slots()?.remove(key).is_some())
        }
    }
}
