use std::{
    fs::File,
    path::Path,
    time::{Duration, Instant},
};

use fs4::fs_std::FileExt;
use log::{debug, info};
use thiserror::Error;

const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Exclusive advisory lock on a file, released on drop.
pub struct FileLock {
    _file: File,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not lock {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Timed out after {}s waiting for the lock on {path}", .waited.as_secs())]
    Timeout { path: String, waited: Duration },
}

impl FileLock {
    /// Blocks until the lock is taken or `timeout` has elapsed.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, Error> {
        let io_error = |source| Error::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let start = Instant::now();
        let mut announced = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(_) => {
                    debug!("Locked {}", path.display());
                    return Ok(Self { _file: file });
                }
                Err(error)
                    if error.raw_os_error() == fs4::lock_contended_error().raw_os_error() =>
                {
                    if start.elapsed() >= timeout {
                        return Err(Error::Timeout {
                            path: path.display().to_string(),
                            waited: start.elapsed(),
                        });
                    }
                    if !announced {
                        info!(
                            "Waiting for another process to release {}",
                            path.display()
                        );
                        announced = true;
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(error) => return Err(io_error(error)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_can_be_taken_again_after_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry.lock");

        let first = FileLock::acquire(&path, Duration::from_secs(1)).unwrap();
        drop(first);
        let _second = FileLock::acquire(&path, Duration::from_secs(1)).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn missing_parent_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/entry.lock");

        let result = FileLock::acquire(&path, Duration::from_secs(1));

        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
