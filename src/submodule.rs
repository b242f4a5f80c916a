use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::{
    cache::{CacheError, RepositoryCache},
    fs::FilesystemError,
    git::{
        CommandError, CommandRunner, GitCommand, Invocation, RepositoryError, SubmoduleEntry,
        WorkingClone,
    },
    model::{resolve_relative_url, Branch, ParseError, RepoIdentity},
};

/// Why a single submodule could not be brought up to date.
#[derive(Error, Debug)]
pub enum SubmoduleError {
    #[error("No url is configured")]
    MissingUrl,
    #[error("Relative url `{0}` cannot be resolved: the superproject has no origin")]
    NoOrigin(String),
    #[error(transparent)]
    Url(#[from] ParseError),
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Git(#[from] CommandError),
}

#[derive(Error, Debug)]
#[error("Submodule {name} failed: {reason}")]
pub struct SubmoduleFailure {
    pub name: String,
    #[source]
    pub reason: SubmoduleError,
}

#[derive(Error, Debug)]
pub enum WalkError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Could not configure submodule remotes: {0}")]
    RemoteConfigFailed(#[source] CommandError),
    #[error("Could not fetch submodule remotes: {0}")]
    FetchFailed(#[source] CommandError),
}

/// Outcome of a walk. Failed submodules did not stop the walk; whether they
/// matter is up to the caller.
#[derive(Debug, Default)]
pub struct WalkSummary {
    pub updated: Vec<String>,
    pub failed: Vec<SubmoduleFailure>,
}

impl WalkSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Initializes every submodule of the clone at `target` from the cache, then
/// points their origins at `branch` and fetches all their remotes.
pub fn walk_submodules(
    cache: &impl RepositoryCache,
    runner: &dyn CommandRunner,
    branch: &Branch,
    target: &Path,
    dissociate: bool,
) -> Result<WalkSummary, WalkError> {
    let clone = WorkingClone::open(target)?;
    let origin = match clone.origin_url() {
        Ok(origin) => Some(origin),
        Err(error) => {
            warn!("{}", error);
            None
        }
    };

    let mut summary = WalkSummary::default();
    for entry in clone.submodules()? {
        match update_submodule(cache, runner, target, origin.as_deref(), &entry, dissociate) {
            Ok(()) => summary.updated.push(entry.name),
            Err(reason) => {
                warn!("Failed to update submodule {}: {}", entry.name, reason);
                summary.failed.push(SubmoduleFailure {
                    name: entry.name,
                    reason,
                });
            }
        }
    }

    runner
        .run(
            &Invocation::new(GitCommand::TrackBranch {
                branch: branch.clone(),
            })
            .in_dir(target),
        )
        .map_err(WalkError::RemoteConfigFailed)?;
    runner
        .run(&Invocation::new(GitCommand::FetchAll).in_dir(target))
        .map_err(WalkError::FetchFailed)?;

    info!(
        "{} submodules updated, {} failed",
        summary.updated.len(),
        summary.failed.len()
    );
    Ok(summary)
}

fn update_submodule(
    cache: &impl RepositoryCache,
    runner: &dyn CommandRunner,
    target: &Path,
    origin: Option<&str>,
    entry: &SubmoduleEntry,
    dissociate: bool,
) -> Result<(), SubmoduleError> {
    let url = entry.url.as_deref().ok_or(SubmoduleError::MissingUrl)?;
    let url = absolute_url(origin, url)?;
    let identity = RepoIdentity::parse(&url)?;
    let reference = cache.resolve(&url, &identity)?;

    runner.run(
        &Invocation::new(GitCommand::SubmoduleUpdate {
            path: entry.path.clone(),
            reference,
            dissociate,
        })
        .in_dir(target)
        .echoed(),
    )?;
    Ok(())
}

/// Only urls starting with `.` are relative. Anything else, scp shorthand
/// included, is taken as absolute and must parse as a repository url.
fn absolute_url(origin: Option<&str>, url: &str) -> Result<String, SubmoduleError> {
    if url.starts_with('.') {
        let origin = origin.ok_or_else(|| SubmoduleError::NoOrigin(url.to_owned()))?;
        Ok(resolve_relative_url(origin, url)?)
    } else {
        Ok(url.to_owned())
    }
}

/// Registers `url` as a new submodule at `path` of the repository in `cwd`,
/// borrowing objects from the cache. The new submodule is always dissociated.
pub fn add_submodule(
    cache: &impl RepositoryCache,
    runner: &dyn CommandRunner,
    branch: &Branch,
    url: &str,
    path: &Path,
    cwd: &Path,
) -> Result<PathBuf, SubmoduleFailure> {
    let failure = |reason: SubmoduleError| SubmoduleFailure {
        name: path.display().to_string(),
        reason,
    };

    let identity = RepoIdentity::parse(url).map_err(|e| failure(e.into()))?;
    let reference = cache
        .resolve(url, &identity)
        .map_err(|e| failure(e.into()))?;
    runner
        .run(
            &Invocation::new(GitCommand::SubmoduleAdd {
                branch: branch.clone(),
                url: url.to_owned(),
                path: path.to_path_buf(),
                reference,
            })
            .in_dir(cwd)
            .echoed(),
        )
        .map_err(|e| failure(e.into()))?;
    Ok(path.to_path_buf())
}
