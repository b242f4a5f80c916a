use std::{env, error::Error, path::PathBuf, sync::Arc};

use home::home_dir;

use crate::{
    cache::GitRepositoryCache,
    clone::Layout,
    git::{CommandRunner, GitCli},
    whitelist::{SparseCheckout, Whitelist},
    Odooup,
};

#[derive(Default)]
pub struct OdooupBuilder {
    // Relative paths are resolved against `root`
    root: Option<PathBuf>,
    cache_directory_path: Option<PathBuf>,
    workspace_directory_path: Option<PathBuf>,
    vendor_directory_path: Option<PathBuf>,
    runner: Option<Arc<dyn CommandRunner>>,
    whitelist: Option<Box<dyn Whitelist>>,
}

impl OdooupBuilder {
    /// Repository the `add` operation works in.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Location of the repository cache.
    ///
    /// Defaults to `$HOME/.odooup/cache`.
    pub fn cache_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_directory_path = Some(path.into());
        self
    }

    /// Root under which clones are placed as `<organization>/<project>`.
    ///
    /// Defaults to `$HOME/odoo`.
    pub fn workspace_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.workspace_directory_path = Some(path.into());
        self
    }

    /// Directory, relative to `root`, receiving vendored repositories.
    ///
    /// Defaults to `vendor`.
    pub fn vendor_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.vendor_directory_path = Some(path.into());
        self
    }

    /// Replaces the system `git` program.
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Replaces the sparse-checkout whitelisting step.
    pub fn whitelist(mut self, whitelist: Box<dyn Whitelist>) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    pub fn try_build(self) -> Result<Odooup, Box<dyn Error>> {
        let Self {
            root,
            cache_directory_path,
            workspace_directory_path,
            vendor_directory_path,
            runner,
            whitelist,
        } = self;
        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let cache_directory = match cache_directory_path {
            Some(path) => root.join(path),
            None => home()?.join(".odooup/cache"),
        };
        let workspace = match workspace_directory_path {
            Some(path) => root.join(path),
            None => home()?.join("odoo"),
        };
        let vendor = root.join(vendor_directory_path.unwrap_or_else(|| PathBuf::from("vendor")));

        let runner = runner.unwrap_or_else(|| Arc::new(GitCli::new()));
        let whitelist =
            whitelist.unwrap_or_else(|| Box::new(SparseCheckout::new(runner.clone())));
        let cache = GitRepositoryCache::new(cache_directory, runner.clone())?;

        Ok(Odooup {
            runner,
            cache,
            whitelist,
            layout: Layout { workspace, vendor },
            root,
        })
    }
}

fn home() -> Result<PathBuf, Box<dyn Error>> {
    home_dir().ok_or_else(|| "Could not find home dir. Please define $HOME env variable.".into())
}
