//! Git access is split in two: libgit2 reads repository state, while every
//! operation that writes or talks to a remote runs the `git` program so that
//! reference clones, dissociation and the user's credential setup behave
//! exactly as on the command line.

pub mod command;
pub mod repository;
pub mod runner;

pub use command::{GitCommand, Invocation};
pub use repository::{RepositoryError, SubmoduleEntry, WorkingClone};
pub use runner::{CommandError, CommandRunner, GitCli};
