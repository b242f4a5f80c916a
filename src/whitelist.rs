use std::{path::Path, sync::Arc};

use log::info;

use crate::git::{CommandRunner, GitCommand, Invocation};

/// Prepares a fresh clone for module whitelisting.
pub trait Whitelist {
    fn enable(&self, target: &Path) -> anyhow::Result<()>;
}

/// Turns on non-cone sparse checkout with every path still checked out, so
/// the set of materialized modules can be narrowed afterwards.
pub struct SparseCheckout {
    runner: Arc<dyn CommandRunner>,
}

impl SparseCheckout {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        SparseCheckout { runner }
    }
}

impl Whitelist for SparseCheckout {
    fn enable(&self, target: &Path) -> anyhow::Result<()> {
        info!("Enabling sparse checkout in {}", target.display());
        self.runner
            .run(&Invocation::new(GitCommand::SparseCheckoutAll).in_dir(target))?;
        Ok(())
    }
}
