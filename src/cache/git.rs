use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use dashmap::DashMap;
use log::{debug, info, trace, warn};

use crate::{
    flock::FileLock,
    fs,
    git::{CommandRunner, GitCommand, Invocation},
    model::RepoIdentity,
};

use super::{CacheError, RepositoryCache};

const LOCK_TIMEOUT: Duration = Duration::from_secs(300);

/// Cache of mirror clones laid out as `<location>/<host>/<organization>/<project>`.
pub struct GitRepositoryCache {
    location: PathBuf,
    runner: Arc<dyn CommandRunner>,
    /// Entries resolved during this run, keyed by their relative path.
    entries: DashMap<PathBuf, PathBuf>,
}

impl GitRepositoryCache {
    pub fn new(
        location: PathBuf,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<GitRepositoryCache, CacheError> {
        if location.exists() {
            if !location.is_dir() {
                return Err(CacheError::BadLocation {
                    location: location.display().to_string(),
                });
            }
        } else {
            fs::create_dir_all(&location)?;
        }

        Ok(GitRepositoryCache {
            location,
            runner,
            entries: DashMap::new(),
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        if self.location.exists() {
            info!(
                "Clearing odooup repository cache {}.",
                self.location.display()
            );
            std::fs::remove_dir_all(&self.location)?;
        }
        self.entries.clear();
        Ok(())
    }

    /// Mirrors `url` into a staging directory next to `path` and renames it
    /// into place once git succeeded, so `path` only ever holds complete
    /// entries.
    fn populate(&self, url: &str, identity: &RepoIdentity, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_path = sibling(path, ".lock");
        let _lock = FileLock::acquire(&lock_path, LOCK_TIMEOUT)?;
        if path.exists() {
            debug!(
                "Cache entry {} was created by another process",
                path.display()
            );
            return Ok(());
        }

        let staging = sibling(path, ".tmp");
        if staging.exists() {
            debug!("Removing leftover {}", staging.display());
            std::fs::remove_dir_all(&staging)?;
        }

        info!("Caching {} in {}", identity, path.display());
        let invocation = Invocation::new(GitCommand::Mirror {
            url: url.to_owned(),
            destination: staging.clone(),
        })
        .echoed();

        if let Err(source) = self.runner.run(&invocation) {
            if staging.exists() {
                if let Err(error) = std::fs::remove_dir_all(&staging) {
                    warn!(
                        "Could not remove incomplete cache entry {}: {}",
                        staging.display(),
                        error
                    );
                }
            }
            return Err(CacheError::Populate {
                identity: identity.to_string(),
                source,
            });
        }
        std::fs::rename(&staging, path)?;

        // Later processes find the entry without locking.
        if let Err(error) = std::fs::remove_file(&lock_path) {
            debug!("Could not remove {}: {}", lock_path.display(), error);
        }
        Ok(())
    }
}

impl RepositoryCache for GitRepositoryCache {
    fn resolve(&self, url: &str, identity: &RepoIdentity) -> Result<PathBuf, CacheError> {
        let key = identity.cache_path();
        if let Some(path) = self.entries.get(&key) {
            trace!("Cache entry for {} already resolved", identity);
            return Ok(path.clone());
        }

        let path = self.location.join(&key);
        if path.exists() {
            debug!("Using cached {} at {}", identity, path.display());
        } else {
            self.populate(url, identity, &path)?;
        }

        self.entries.insert(key, path.clone());
        Ok(path)
    }
}

/// `<project><suffix>` next to the entry.
fn sibling(entry: &Path, suffix: &str) -> PathBuf {
    let mut name = entry.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    entry.with_file_name(name)
}
