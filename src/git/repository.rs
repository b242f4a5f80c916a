use std::path::{Path, PathBuf};

use git2::Repository;
use log::{trace, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Could not open repository at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: git2::Error,
    },
    #[error("Repository at {0} has no origin url")]
    MissingOrigin(String),
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

/// A submodule as registered in the superproject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleEntry {
    pub name: String,
    pub path: PathBuf,
    /// The url as configured, possibly relative to the superproject's origin.
    pub url: Option<String>,
}

/// Read-only view of a working clone.
pub struct WorkingClone {
    path: PathBuf,
    git_repo: Repository,
}

impl WorkingClone {
    pub fn open(path: &Path) -> Result<WorkingClone, RepositoryError> {
        trace!("Opening working clone at {}", path.display());
        let git_repo = Repository::open(path).map_err(|source| RepositoryError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(WorkingClone {
            path: path.to_path_buf(),
            git_repo,
        })
    }

    pub fn origin_url(&self) -> Result<String, RepositoryError> {
        let remote = self.git_repo.find_remote("origin")?;
        remote
            .url()
            .map(str::to_owned)
            .ok_or_else(|| RepositoryError::MissingOrigin(self.path.display().to_string()))
    }

    /// Submodules currently registered on disk, ordered by path.
    pub fn submodules(
        &self,
    ) -> Result<impl Iterator<Item = SubmoduleEntry> + '_, RepositoryError> {
        let mut submodules = self.git_repo.submodules()?;
        submodules.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(submodules.into_iter().filter_map(|submodule| {
            let Some(name) = submodule.name() else {
                warn!(
                    "Skipping submodule at {} with a non UTF-8 name",
                    submodule.path().display()
                );
                return None;
            };
            Some(SubmoduleEntry {
                name: name.to_owned(),
                path: submodule.path().to_path_buf(),
                url: submodule.url().map(str::to_owned),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::testing::init_superproject;

    #[test]
    fn reads_origin_and_submodules_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        init_superproject(
            dir.path(),
            "https://example.com/acme/widgets.git",
            &[
                ("web", "addons/web", "../web.git"),
                ("base", "addons/base", "https://example.com/oca/base.git"),
            ],
        );

        let clone = WorkingClone::open(dir.path()).unwrap();

        assert_eq!(
            clone.origin_url().unwrap(),
            "https://example.com/acme/widgets.git"
        );
        let submodules: Vec<_> = clone.submodules().unwrap().collect();
        assert_eq!(
            submodules,
            vec![
                SubmoduleEntry {
                    name: "base".to_owned(),
                    path: PathBuf::from("addons/base"),
                    url: Some("https://example.com/oca/base.git".to_owned()),
                },
                SubmoduleEntry {
                    name: "web".to_owned(),
                    path: PathBuf::from("addons/web"),
                    url: Some("../web.git".to_owned()),
                },
            ]
        );
    }

    #[test]
    fn opening_a_plain_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            WorkingClone::open(dir.path()),
            Err(RepositoryError::Open { .. })
        ));
    }
}
