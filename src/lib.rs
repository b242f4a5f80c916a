pub mod cache;
pub mod cli;
pub mod clone;
pub mod config;
pub mod fs;
pub mod git;
pub mod model;
pub mod submodule;
pub mod whitelist;

mod api;
mod flock;
#[cfg(test)]
mod testing;

pub use api::{Odooup, OdooupBuilder};
