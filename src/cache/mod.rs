mod git;

use std::path::PathBuf;

use thiserror::Error;

use crate::{fs::FilesystemError, git::CommandError, model::RepoIdentity};

pub use git::GitRepositoryCache;

pub trait RepositoryCache {
    /// Returns the cache entry for `identity`, cloning `url` into it when the
    /// entry does not exist yet. Existing entries are returned as they are.
    fn resolve(&self, url: &str, identity: &RepoIdentity) -> Result<PathBuf, CacheError>;
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache location {location} is not a directory")]
    BadLocation { location: String },
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error("Cache lock cannot be acquired: {0}")]
    Lock(#[from] crate::flock::Error),
    #[error("Could not populate the cache for {identity}: {source}")]
    Populate {
        identity: String,
        #[source]
        source: CommandError,
    },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}
