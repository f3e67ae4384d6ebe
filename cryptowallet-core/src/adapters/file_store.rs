//! File-backed key-value store
//!
//! Each key lives in its own `<key>.json` file under the store directory.
//! Writes go to a temp file in the same directory and are renamed into
//! place while holding an exclusive lock, so concurrent CLI invocations
//! never observe a torn record.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

const LOCK_FILE: &str = ".store.lock";

pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::storage(format!("Cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(Error::storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn open_lock(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))
            .map_err(|e| Error::storage(format!("Cannot open store lock: {}", e)))
    }

    fn lock_shared(&self) -> Result<File> {
        let file = self.open_lock()?;
        file.lock_shared()
            .map_err(|e| Error::storage(format!("Cannot lock store: {}", e)))?;
        Ok(file)
    }

    fn lock_exclusive(&self) -> Result<File> {
        let file = self.open_lock()?;
        file.lock_exclusive()
            .map_err(|e| Error::storage(format!("Cannot lock store: {}", e)))?;
        Ok(file)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        let lock = self.lock_shared()?;
        let result = match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(Error::Corrupt(format!("{} is not UTF-8", path.display())))
            }
            Err(e) => Err(Error::storage(format!("Cannot read {}: {}", path.display(), e))),
        };
        let _ = lock.unlock();
        result
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let lock = self.lock_exclusive()?;

        let write = || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&self.dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        };
        let result = write()
            .map_err(|e| Error::storage(format!("Cannot write {}: {}", path.display(), e)));
        let _ = lock.unlock();

        if result.is_ok() {
            debug!(key, "stored record");
        }
        result
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let lock = self.lock_exclusive()?;
        let result = match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "removed record");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!("Cannot remove {}: {}", path.display(), e))),
        };
        let _ = lock.unlock();
        result
    }
}
