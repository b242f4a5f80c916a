use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::info;

use crate::{
    cache::{CacheError, GitRepositoryCache},
    clone::{self, CloneError, CloneOptions, CloneReport, Layout, Placement},
    fs,
    git::CommandRunner,
    model::{Branch, RepoIdentity},
    submodule::{self, SubmoduleError, SubmoduleFailure},
    whitelist::Whitelist,
};

mod builder;

pub use builder::OdooupBuilder;

pub struct Odooup {
    runner: Arc<dyn CommandRunner>,
    cache: GitRepositoryCache,
    whitelist: Box<dyn Whitelist>,
    layout: Layout,
    root: PathBuf,
}

impl Odooup {
    pub fn builder() -> OdooupBuilder {
        OdooupBuilder::default()
    }

    /// Clones a repository and its submodules through the cache
    pub fn clone_repository(
        &self,
        branch: &Branch,
        url: &str,
        options: &CloneOptions,
    ) -> Result<CloneReport, CloneError> {
        clone::clone_repository(
            &self.cache,
            self.runner.as_ref(),
            self.whitelist.as_ref(),
            &self.layout,
            branch,
            url,
            options,
        )
    }

    /// Adds every url as a submodule of the repository at the root, under the
    /// vendor directory. Keeps going when one of them fails.
    pub fn add_submodules(
        &self,
        branch: &Branch,
        urls: &[String],
    ) -> Vec<Result<PathBuf, SubmoduleFailure>> {
        urls.iter()
            .map(|url| self.add_submodule(branch, url))
            .collect()
    }

    fn add_submodule(&self, branch: &Branch, url: &str) -> Result<PathBuf, SubmoduleFailure> {
        let failure = |reason: SubmoduleError| SubmoduleFailure {
            name: url.to_owned(),
            reason,
        };
        let identity = RepoIdentity::parse(url).map_err(|e| failure(e.into()))?;
        let target = self.layout.target(&identity, Placement::Vendor);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| failure(e.into()))?;
        }
        // git wants the submodule path relative to the superproject
        let path = target.strip_prefix(&self.root).unwrap_or(&target);

        info!("Adding {} as submodule {}", url, path.display());
        submodule::add_submodule(
            &self.cache,
            self.runner.as_ref(),
            branch,
            url,
            path,
            &self.root,
        )
    }

    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear()
    }

    pub fn cache_location(&self) -> &Path {
        self.cache.location()
    }
}
