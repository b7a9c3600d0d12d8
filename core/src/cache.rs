//! On-disk cache for small opaque artifacts (tokens, cursors).
//!
//! One cache holds one byte blob at a deterministic path derived from a
//! (namespace, filename) pair: `$HOME/.<namespace>/<filename>` on POSIX,
//! `<profile>\AppData\Roaming\<namespace>\<filename>` on Windows. Reads
//! and deletes are best-effort; only `put` reports failures.

use std::path::PathBuf;

use crate::env::Environment;
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct FileCache {
    dir_path: PathBuf,
    file_path: PathBuf,
}

impl FileCache {
    /// Resolve the cache location for `(namespace, filename)`.
    ///
    /// Fails with [`Error::HomeNotFound`] when the environment has no home
    /// directory to anchor the path.
    pub fn open(namespace: &str, filename: &str, env: &dyn Environment) -> Result<Self, Error> {
        let dir_path = cache_dir_path(namespace, env)?;
        let file_path = dir_path.join(filename);
        Ok(Self { dir_path, file_path })
    }

    /// The cached content, or `None` if missing or unreadable.
    pub fn get(&self) -> Option<Vec<u8>> {
        std::fs::read(&self.file_path).ok()
    }

    /// Store `content`, creating the cache directory if needed.
    pub fn put(&self, content: &[u8]) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir_path)?;
        std::fs::write(&self.file_path, content)?;
        Ok(())
    }

    /// Best-effort removal of the cached file.
    pub fn delete(&self) {
        let _ = std::fs::remove_file(&self.file_path);
    }
}

fn cache_dir_path(namespace: &str, env: &dyn Environment) -> Result<PathBuf, Error> {
    let home = env.home_dir().ok_or(Error::HomeNotFound)?;
    if cfg!(windows) {
        Ok(home.join("AppData").join("Roaming").join(namespace))
    } else {
        Ok(home.join(format!(".{namespace}")))
    }
}
