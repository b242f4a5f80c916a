use std::process::{Command, Stdio};

use log::{debug, info};
use thiserror::Error;

use super::command::Invocation;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Could not run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed with {}{}", status_text(.code), stderr_text(.stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// Exit code of the failed process, if it exited normally.
    pub fn code(&self) -> Option<i32> {
        match self {
            CommandError::Spawn { .. } => None,
            CommandError::Failed { code, .. } => *code,
        }
    }
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "a signal".to_owned(),
    }
}

fn stderr_text(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Runs git invocations. Implementations block until the process exits.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError>;
}

/// Runs the system `git` program.
pub struct GitCli {
    git_path: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            git_path: "git".into(),
        }
    }

    pub fn with_program(git_path: impl Into<String>) -> Self {
        Self {
            git_path: git_path.into(),
        }
    }
}

impl CommandRunner for GitCli {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        let mut command = Command::new(&self.git_path);
        command.args(invocation.command.args());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let spawn_error = |source| CommandError::Spawn {
            command: invocation.to_string(),
            source,
        };

        // Echoed commands stream their progress to the terminal, silent ones
        // are captured so their stderr can be reported on failure.
        let (status, stderr) = if invocation.echo {
            info!("{}", invocation);
            let status = command.status().map_err(spawn_error)?;
            (status, String::new())
        } else {
            debug!("{}", invocation);
            let output = command
                .stdin(Stdio::null())
                .output()
                .map_err(spawn_error)?;
            (
                output.status,
                String::from_utf8_lossy(&output.stderr).into_owned(),
            )
        };

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                command: invocation.to_string(),
                code: status.code(),
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::git::command::GitCommand;

    #[test]
    fn missing_program_is_a_spawn_error() {
        let runner = GitCli::with_program("/nonexistent/odooup-git");
        let result = runner.run(&Invocation::new(GitCommand::FetchAll));
        assert!(matches!(result, Err(CommandError::Spawn { .. })));
    }

    #[test]
    fn failure_message_carries_status_and_stderr() {
        let error = CommandError::Failed {
            command: "git fetch".to_owned(),
            code: Some(128),
            stderr: "fatal: not a git repository\n".to_owned(),
        };
        assert_eq!(error.code(), Some(128));
        assert_eq!(
            error.to_string(),
            "`git fetch` failed with exit status 128: fatal: not a git repository"
        );
    }
}
