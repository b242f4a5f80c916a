use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::{
    cache::{CacheError, RepositoryCache},
    fs::{self, FilesystemError},
    git::{CommandError, CommandRunner, GitCommand, Invocation},
    model::{Branch, ParseError, RepoIdentity},
    submodule::{walk_submodules, WalkError, WalkSummary},
    whitelist::Whitelist,
};

/// Where working clones are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// `<workspace>/<organization>/<project>`
    #[default]
    Workspace,
    /// `<vendor>/<organization>/<project>`
    Vendor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub workspace: PathBuf,
    pub vendor: PathBuf,
}

impl Layout {
    pub fn target(&self, identity: &RepoIdentity, placement: Placement) -> PathBuf {
        let root = match placement {
            Placement::Workspace => &self.workspace,
            Placement::Vendor => &self.vendor,
        };
        root.join(identity.workspace_path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOptions {
    /// Enable sparse-checkout whitelisting once everything is cloned.
    pub whitelist: bool,
    /// Dissociate submodules from their cache entries.
    pub dissociate: bool,
    /// Keep the primary clone linked to its cache entry instead of copying objects.
    pub shared: bool,
    pub placement: Placement,
}

impl Default for CloneOptions {
    fn default() -> Self {
        CloneOptions {
            whitelist: true,
            dissociate: false,
            shared: false,
            placement: Placement::Workspace,
        }
    }
}

#[derive(Debug)]
pub struct CloneReport {
    pub target: PathBuf,
    pub submodules: WalkSummary,
}

#[derive(Error, Debug)]
pub enum CloneError {
    #[error(transparent)]
    InvalidUrl(#[from] ParseError),
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("Cloning {url} failed: {source}")]
    CloneFailed {
        url: String,
        #[source]
        source: CommandError,
    },
    #[error(transparent)]
    Submodules(#[from] WalkError),
    #[error("Could not enable whitelisting in {target}: {error:#}")]
    Whitelist { target: String, error: anyhow::Error },
}

impl CloneError {
    /// Process exit status for this error: git's own status when the clone
    /// itself failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CloneError::CloneFailed { source, .. } => source.code().unwrap_or(1),
            _ => 1,
        }
    }
}

/// Clones `url` at `branch` next to its cache entry, then its submodules.
///
/// A failing clone stops everything; nothing is walked and the partial
/// target is left for the user to inspect.
pub fn clone_repository(
    cache: &impl RepositoryCache,
    runner: &dyn CommandRunner,
    whitelist: &dyn Whitelist,
    layout: &Layout,
    branch: &Branch,
    url: &str,
    options: &CloneOptions,
) -> Result<CloneReport, CloneError> {
    let identity = RepoIdentity::parse(url)?;
    let reference = cache.resolve(url, &identity)?;

    let target = layout.target(&identity, options.placement);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    info!("Cloning {} ({}) into {}", identity, branch, target.display());
    runner
        .run(
            &Invocation::new(GitCommand::Clone {
                branch: branch.clone(),
                url: url.to_owned(),
                destination: target.clone(),
                reference,
                dissociate: !options.shared,
            })
            .echoed(),
        )
        .map_err(|source| CloneError::CloneFailed {
            url: url.to_owned(),
            source,
        })?;

    let submodules = walk_submodules(cache, runner, branch, &target, options.dissociate)?;

    if options.whitelist {
        whitelist
            .enable(&target)
            .map_err(|error| CloneError::Whitelist {
                target: target.display().to_string(),
                error,
            })?;
    }

    Ok(CloneReport { target, submodules })
}
