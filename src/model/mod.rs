use std::{fmt::Display, str::FromStr};

use thiserror::Error;

pub mod identity;

pub use identity::{resolve_relative_url, RepoIdentity};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid repository url `{0}`: expected an organization and a project path")]
    InvalidUrlFormat(String),
    #[error("Cannot resolve relative url `{relative}` against `{base}`")]
    InvalidRelativeUrl { base: String, relative: String },
    #[error("Invalid branch name `{0}`: {1}")]
    InvalidBranch(String, &'static str),
}

/// A branch name that is safe to hand to git as an argument value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Branch(String);

impl Branch {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Branch {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let reason = if value.is_empty() {
            Some("cannot be empty")
        } else if value.starts_with('-') {
            Some("cannot start with '-'")
        } else if value.contains("..") {
            Some("cannot contain '..'")
        } else if value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ':')
        {
            Some("cannot contain whitespace, control characters or ':'")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ParseError::InvalidBranch(value.to_owned(), reason)),
            None => Ok(Branch(value.to_owned())),
        }
    }
}

impl Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
