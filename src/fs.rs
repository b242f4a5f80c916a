use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
#[error("Could not create directory {}: {source}", path.display())]
pub struct FilesystemError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Creates `path` and its parents. Existing directories are left untouched.
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| FilesystemError {
        path: path.to_path_buf(),
        source,
    })
}
