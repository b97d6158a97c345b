use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

const AUTH_FILENAME: &str = "auth.txt";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cache directory missing or not writable: {0}")]
    CacheDir(String),
    #[error("no cached token in {0:?}")]
    Empty(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the cache directory exists; create if missing.
pub fn ensure_cache_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::CacheDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
    }
    Ok(())
}

/// Last issued auth token, kept on disk so a restart inside the token's
/// lifetime can reuse it (the token endpoint refuses to reissue early).
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
}

impl TokenCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(AUTH_FILENAME)
    }

    /// Writes through a temp file and a rename, so readers never see half a token.
    pub fn store(&self, token: &str) -> Result<PathBuf, PersistError> {
        ensure_cache_dir(&self.dir)?;

        let target = self.path();
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(token.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// Reads the first line of the cached token file.
    pub fn load(&self) -> Result<String, PersistError> {
        let path = self.path();
        let content = fs::read_to_string(&path)?;
        let token = content.lines().next().unwrap_or_default().trim();
        if token.is_empty() {
            return Err(PersistError::Empty(path));
        }
        Ok(token.to_string())
    }
}
