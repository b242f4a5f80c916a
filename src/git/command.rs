use std::{
    ffi::OsString,
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::model::Branch;

/// A git operation with its arguments kept structured until it is run.
///
/// Values that come from users or from repository configuration (urls,
/// branches, paths) are always placed after option values or behind `--`,
/// so they cannot be interpreted as options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    /// Full mirror clone used to populate a cache entry.
    Mirror { url: String, destination: PathBuf },
    /// Working clone borrowing objects from a cache entry.
    Clone {
        branch: Branch,
        url: String,
        destination: PathBuf,
        reference: PathBuf,
        dissociate: bool,
    },
    SubmoduleUpdate {
        path: PathBuf,
        reference: PathBuf,
        dissociate: bool,
    },
    SubmoduleAdd {
        branch: Branch,
        url: String,
        path: PathBuf,
        reference: PathBuf,
    },
    /// Makes every submodule's origin fetch `branch` into its remote-tracking ref.
    TrackBranch { branch: Branch },
    /// Fetches all remotes of every submodule, pruning stale refs.
    FetchAll,
    /// Enables non-cone sparse checkout with every path still included.
    SparseCheckoutAll,
}

impl GitCommand {
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Args::default();
        match self {
            GitCommand::Mirror { url, destination } => {
                args.push("clone").push("--mirror").push("--");
                args.push(url).path(destination);
            }
            GitCommand::Clone {
                branch,
                url,
                destination,
                reference,
                dissociate,
            } => {
                args.push("clone").push("--branch").push(branch.as_str());
                args.push("--reference").path(reference);
                if *dissociate {
                    args.push("--dissociate");
                }
                args.push("--").push(url).path(destination);
            }
            GitCommand::SubmoduleUpdate {
                path,
                reference,
                dissociate,
            } => {
                args.push("submodule").push("update").push("--init");
                args.push("--reference").path(reference);
                if *dissociate {
                    args.push("--dissociate");
                }
                args.push("--").path(path);
            }
            GitCommand::SubmoduleAdd {
                branch,
                url,
                path,
                reference,
            } => {
                args.push("submodule").push("add");
                args.push("-b").push(branch.as_str());
                args.push("--reference").path(reference);
                args.push("--dissociate").push("--");
                args.push(url).path(path);
            }
            GitCommand::TrackBranch { branch } => {
                args.push("submodule").push("foreach");
                args.push("git").push("config").push("remote.origin.fetch");
                args.push(format!("+refs/heads/{branch}:refs/remotes/origin/{branch}"));
            }
            GitCommand::FetchAll => {
                args.push("submodule").push("foreach");
                args.push("git").push("fetch").push("--all").push("--prune");
            }
            GitCommand::SparseCheckoutAll => {
                args.push("sparse-checkout").push("set").push("--no-cone");
                args.push("/*");
            }
        }
        args.0
    }
}

impl Display for GitCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("git")?;
        for arg in self.args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Args(Vec<OsString>);

impl Args {
    fn push(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.0.push(arg.into());
        self
    }

    fn path(&mut self, path: &Path) -> &mut Self {
        self.0.push(path.as_os_str().to_owned());
        self
    }
}

/// A command together with where and how it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: GitCommand,
    pub cwd: Option<PathBuf>,
    /// Echoed invocations are logged at info level and inherit the terminal.
    pub echo: bool,
}

impl Invocation {
    pub fn new(command: GitCommand) -> Self {
        Invocation {
            command,
            cwd: None,
            echo: false,
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn echoed(mut self) -> Self {
        self.echo = true;
        self
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cwd {
            Some(cwd) => write!(f, "[{}] {}", cwd.display(), self.command),
            None => write!(f, "{}", self.command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn branch(name: &str) -> Branch {
        name.parse().unwrap()
    }

    fn rendered(command: GitCommand) -> String {
        command.to_string()
    }

    #[test]
    fn clone_with_reference() {
        let command = GitCommand::Clone {
            branch: branch("16.0"),
            url: "git@example.com:acme/widgets.git".to_owned(),
            destination: PathBuf::from("/home/dev/odoo/acme/widgets"),
            reference: PathBuf::from("/cache/example.com/acme/widgets"),
            dissociate: true,
        };
        assert_eq!(
            rendered(command),
            "git clone --branch 16.0 --reference /cache/example.com/acme/widgets --dissociate \
             -- git@example.com:acme/widgets.git /home/dev/odoo/acme/widgets"
        );
    }

    #[test]
    fn shared_clone_omits_dissociate() {
        let command = GitCommand::Clone {
            branch: branch("main"),
            url: "https://example.com/acme/widgets.git".to_owned(),
            destination: PathBuf::from("w"),
            reference: PathBuf::from("c"),
            dissociate: false,
        };
        assert!(!command.args().contains(&OsString::from("--dissociate")));
    }

    #[test]
    fn url_that_looks_like_an_option_stays_positional() {
        let command = GitCommand::Mirror {
            url: "--upload-pack=touch /tmp/pwned".to_owned(),
            destination: PathBuf::from("/cache/x"),
        };
        let args = command.args();
        let separator = args.iter().position(|a| a == "--").unwrap();
        let url = args
            .iter()
            .position(|a| a == "--upload-pack=touch /tmp/pwned")
            .unwrap();
        assert!(separator < url);
    }

    #[test]
    fn submodule_commands() {
        assert_eq!(
            rendered(GitCommand::SubmoduleUpdate {
                path: PathBuf::from("addons/web"),
                reference: PathBuf::from("/cache/web"),
                dissociate: false,
            }),
            "git submodule update --init --reference /cache/web -- addons/web"
        );
        assert_eq!(
            rendered(GitCommand::SubmoduleAdd {
                branch: branch("16.0"),
                url: "https://example.com/oca/web.git".to_owned(),
                path: PathBuf::from("vendor/oca/web"),
                reference: PathBuf::from("/cache/web"),
            }),
            "git submodule add -b 16.0 --reference /cache/web --dissociate \
             -- https://example.com/oca/web.git vendor/oca/web"
        );
        assert_eq!(
            rendered(GitCommand::TrackBranch {
                branch: branch("16.0")
            }),
            "git submodule foreach git config remote.origin.fetch \
             +refs/heads/16.0:refs/remotes/origin/16.0"
        );
        assert_eq!(
            rendered(GitCommand::FetchAll),
            "git submodule foreach git fetch --all --prune"
        );
    }

    #[test]
    fn invocation_display_includes_directory() {
        let invocation = Invocation::new(GitCommand::FetchAll)
            .in_dir("/work")
            .echoed();
        assert!(invocation.echo);
        assert_eq!(
            invocation.to_string(),
            "[/work] git submodule foreach git fetch --all --prune"
        );
    }
}
