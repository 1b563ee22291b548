use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::logging::SESSION;

/// Longest value a session file may hold before it is treated as corrupted
const MAX_VALUE_LEN: usize = 64 * 1024;

/// Persistence for one small session value (a user id, a JSON blob)
pub trait StorageAdapter: Send + Sync {
    fn store(&self, value: &str) -> Result<()>;

    /// `Ok(None)` when nothing usable is stored
    fn load(&self) -> Result<Option<String>>;

    fn clear(&self) -> Result<()>;
}

/// Stores the value in a single file, written atomically with 0600 permissions.
#[derive(Debug, Clone)]
pub struct FileStorageAdapter {
    file_path: PathBuf,
}

impl FileStorageAdapter {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        self.file_path.with_extension("tmp")
    }

    /// Remove a temp file left behind by an interrupted write
    fn cleanup_stale_temp(&self) {
        let temp_path = self.temp_path();
        if temp_path.exists() {
            log::debug!(target: SESSION, "Removing stale temp file: {}", temp_path.display());
            if let Err(e) = fs::remove_file(&temp_path) {
                log::warn!(target: SESSION, "Failed to remove {}: {}", temp_path.display(), e);
            }
        }
    }
}

impl StorageAdapter for FileStorageAdapter {
    fn store(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        self.cleanup_stale_temp();

        // Write to a temporary file, then rename over the real one
        let temp_path = self.temp_path();
        let mut file =
            fs::File::create(&temp_path).context("Failed to create temporary session file")?;
        file.write_all(value.as_bytes())
            .context("Failed to write session value")?;
        file.sync_all()
            .context("Failed to sync session file to disk")?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))
                .context("Failed to set session file permissions")?;
        }

        fs::rename(&temp_path, &self.file_path)
            .context("Failed to rename temporary session file")?;

        log::debug!(target: SESSION, "Saved session value to {}", self.file_path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.file_path).context("Failed to read session file")?;
        let Ok(content) = String::from_utf8(bytes) else {
            log::warn!(target: SESSION, "Session file is not UTF-8, treating as corrupted");
            return Ok(None);
        };

        let value = content.trim();
        if value.is_empty() {
            log::warn!(target: SESSION, "Session file is empty, treating as no session");
            return Ok(None);
        }

        if value.len() > MAX_VALUE_LEN {
            log::warn!(target: SESSION, "Session file is {} bytes, treating as corrupted", value.len());
            return Ok(None);
        }

        if value.chars().any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t') {
            log::warn!(target: SESSION, "Session file contains control characters, treating as corrupted");
            return Ok(None);
        }

        Ok(Some(value.to_string()))
    }

    fn clear(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete session file")?;
            log::debug!(target: SESSION, "Deleted session file at {}", self.file_path.display());
        }
        Ok(())
    }
}

/// Keeps the value in memory only; used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorageAdapter {
    value: Mutex<Option<String>>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageAdapter for MemoryStorageAdapter {
    fn store(&self, value: &str) -> Result<()> {
        *self.slot() = Some(value.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_adapter(temp_dir: &TempDir) -> FileStorageAdapter {
        FileStorageAdapter::new(temp_dir.path().join("nested").join("current_user"))
    }

    #[test]
    fn test_store_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = file_adapter(&temp_dir);

        adapter.store("1001").unwrap();
        assert_eq!(adapter.load().unwrap(), Some("1001".to_string()));

        adapter.store("1002").unwrap();
        assert_eq!(adapter.load().unwrap(), Some("1002".to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(file_adapter(&temp_dir).load().unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = file_adapter(&temp_dir);

        adapter.store("1001").unwrap();
        adapter.clear().unwrap();
        assert!(!adapter.path().exists());
        assert_eq!(adapter.load().unwrap(), None);

        // Clearing twice is fine
        adapter.clear().unwrap();
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = file_adapter(&temp_dir);

        fs::create_dir_all(adapter.path().parent().unwrap()).unwrap();
        fs::write(adapter.temp_path(), "half-written").unwrap();

        adapter.store("1001").unwrap();
        assert!(!adapter.temp_path().exists());
    }

    #[test]
    fn test_corrupted_content_is_treated_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = file_adapter(&temp_dir);
        fs::create_dir_all(adapter.path().parent().unwrap()).unwrap();

        fs::write(adapter.path(), "   \n").unwrap();
        assert_eq!(adapter.load().unwrap(), None);

        fs::write(adapter.path(), b"10\x0001").unwrap();
        assert_eq!(adapter.load().unwrap(), None);

        fs::write(adapter.path(), [0xff, 0xfe, 0x00]).unwrap();
        assert_eq!(adapter.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let adapter = file_adapter(&temp_dir);
        adapter.store("1001").unwrap();

        let mode = fs::metadata(adapter.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_adapter() {
        let adapter = MemoryStorageAdapter::new();
        assert_eq!(adapter.load().unwrap(), None);

        adapter.store("{\"is_logged_in\":true}").unwrap();
        assert_eq!(adapter.load().unwrap().as_deref(), Some("{\"is_logged_in\":true}"));

        adapter.clear().unwrap();
        assert_eq!(adapter.load().unwrap(), None);
    }
}
