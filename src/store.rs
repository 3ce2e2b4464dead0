//! Crash-safe persistence of the sealed token blob.

use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AuthError, Result};

/// Fixed name of the cache file inside the cache directory.
pub const CACHE_FILE_NAME: &str = "AccessToken.json";

/// Owner read/write only.
pub const CACHE_FILE_MODE: u32 = 0o600;

/// File-backed store for the sealed snapshot at a fixed path.
///
/// `save` replaces the file wholesale through an atomic rename, so a reader
/// at any instant observes either the complete previous content or the
/// complete new content, never a torn file. There is no cross-process lock:
/// two processes racing to `save` resolve last-writer-wins, which is
/// acceptable for a single-user credential cache.
///
/// # Example
/// ```no_run
/// use gangway::store::{TokenStore, CACHE_FILE_MODE};
///
/// let store = TokenStore::new_default();
/// store.save(b"sealed-bytes", CACHE_FILE_MODE)?;
/// assert!(store.exists());
/// # Ok::<(), gangway::error::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TokenStore {
    cache_dir: PathBuf,
}

impl TokenStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn new_default() -> Self {
        Self {
            cache_dir: crate::config::default_cache_dir(),
        }
    }

    /// Full path of the cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    /// Non-throwing existence check.
    pub fn exists(&self) -> bool {
        self.cache_path().is_file()
    }

    /// Read the sealed bytes.
    pub fn load(&self) -> Result<Vec<u8>> {
        match fs::read(self.cache_path()) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AuthError::NoCachedToken)
            }
            Err(err) => Err(AuthError::FileSystem {
                op: "read the cache file",
                message: err.to_string(),
            }),
        }
    }

    /// Atomically replace the cache file with `sealed`, then set its
    /// permission bits to `mode`.
    ///
    /// The bytes are written to a uniquely-named temp file in the same
    /// directory, flushed, and renamed over the destination. On any failure
    /// the temp file is removed and the previous cache file is left intact.
    pub fn save(&self, sealed: &[u8], mode: u32) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).map_err(|err| AuthError::FileSystem {
            op: "create the cache directory",
            message: err.to_string(),
        })?;

        let path = self.cache_path();
        let temp_path = temp_sibling(&path);

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(CACHE_FILE_MODE);

        let mut temp_file = options.open(&temp_path).map_err(|err| AuthError::FileSystem {
            op: "create a temporary cache file",
            message: err.to_string(),
        })?;

        let write_result = temp_file
            .write_all(sealed)
            .and_then(|()| temp_file.sync_all());
        drop(temp_file);
        if let Err(err) = write_result {
            let _ = fs::remove_file(&temp_path);
            return Err(AuthError::FileSystem {
                op: "write the temporary cache file",
                message: err.to_string(),
            });
        }

        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(AuthError::FileSystem {
                op: "rename the temporary cache file into place",
                message: err.to_string(),
            });
        }

        #[cfg(unix)]
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).map_err(|err| {
            AuthError::FileSystem {
                op: "set cache file permissions",
                message: err.to_string(),
            }
        })?;
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    /// Delete the cache file. An already-absent file is success.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(self.cache_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::FileSystem {
                op: "remove the cache file",
                message: err.to_string(),
            }),
        }
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_name = format!(
        ".{}.tmp-{}-{nonce}",
        CACHE_FILE_NAME,
        std::process::id()
    );
    path.with_file_name(temp_name)
}
