use clap::{ArgAction, Parser};

use crate::model::Branch;

/// Clones repositories and their submodules through a local repository cache.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Location of the repository cache [default: ~/.odooup/cache]
    #[clap(short, long)]
    pub cache_directory: Option<String>,
    /// Directory receiving clones as <organization>/<project> [default: ~/odoo]
    #[clap(short, long)]
    pub workspace_directory: Option<String>,
}

#[derive(Debug, Parser)]
pub enum Command {
    ///Clones a repository and its submodules, borrowing objects from the cache
    Clone {
        branch: Branch,
        url: String,
        /// Initialize sparse checkout module whitelisting
        #[clap(
            long,
            action = ArgAction::Set,
            default_value_t = true,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true"
        )]
        whitelist: bool,
        /// Dissociate cloned submodules from the cache
        #[clap(long)]
        dissociate: bool,
        /// Keep the main clone linked to the cache instead of copying its objects
        #[clap(long)]
        shared: bool,
        /// Clone under the vendor directory instead of the workspace
        #[clap(long)]
        vendor: bool,
        /// Exit with an error if any submodule could not be updated
        #[clap(long)]
        strict: bool,
    },
    ///Adds repositories as submodules of the current repository under vendor/
    Add {
        branch: Branch,
        #[clap(required = true)]
        urls: Vec<String>,
    },
    ///Deletes the repository cache
    ClearCache,
}
