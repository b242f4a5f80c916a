//! Test doubles shared by the unit tests.

use std::{
    fmt::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use git2::{Repository, Signature};

use crate::{
    git::{CommandError, CommandRunner, GitCommand, Invocation},
    whitelist::Whitelist,
};

type Predicate = Box<dyn Fn(&GitCommand) -> bool>;
type Effect = Box<dyn Fn(&Invocation)>;

/// Records invocations instead of running git.
pub struct FakeRunner {
    calls: Mutex<Vec<Invocation>>,
    failing: Predicate,
    effect: Effect,
}

impl FakeRunner {
    pub fn new() -> Self {
        FakeRunner {
            calls: Mutex::new(Vec::new()),
            failing: Box::new(|_| false),
            effect: Box::new(|_| {}),
        }
    }

    /// Commands matching `predicate` exit with status 128.
    pub fn failing_when(mut self, predicate: impl Fn(&GitCommand) -> bool + 'static) -> Self {
        self.failing = Box::new(predicate);
        self
    }

    /// Runs `effect` for every successful invocation, to fake what git would
    /// leave on disk.
    pub fn with_effect(mut self, effect: impl Fn(&Invocation) + 'static) -> Self {
        self.effect = Box::new(effect);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<GitCommand> {
        self.calls().into_iter().map(|call| call.command).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push(invocation.clone());
        if (self.failing)(&invocation.command) {
            return Err(CommandError::Failed {
                command: invocation.to_string(),
                code: Some(128),
                stderr: "fatal: simulated failure".to_owned(),
            });
        }
        (self.effect)(invocation);
        Ok(())
    }
}

/// Creates a repository at `path` with an `origin` remote and a committed
/// `.gitmodules` listing `(name, path, url)` submodules.
pub fn init_superproject(path: &Path, origin: &str, submodules: &[(&str, &str, &str)]) {
    let repo = Repository::init(path).unwrap();
    repo.remote("origin", origin).unwrap();

    let mut gitmodules = String::new();
    for (name, submodule_path, url) in submodules {
        writeln!(
            gitmodules,
            "[submodule \"{name}\"]\n\tpath = {submodule_path}\n\turl = {url}"
        )
        .unwrap();
    }
    std::fs::write(path.join(".gitmodules"), gitmodules).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(".gitmodules")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("odooup", "odooup@example.com").unwrap();
    repo.commit(Some("HEAD"), &signature, &signature, "init", &tree, &[])
        .unwrap();
}

/// Effect that mimics git: mirror clones create their destination and
/// working clones become a superproject with the given submodules.
pub fn git_like(
    submodules: Vec<(&'static str, &'static str, &'static str)>,
) -> impl Fn(&Invocation) {
    move |invocation| match &invocation.command {
        GitCommand::Mirror { destination, .. } => {
            std::fs::create_dir_all(destination).unwrap();
        }
        GitCommand::Clone {
            url, destination, ..
        } => init_superproject(destination, url, &submodules),
        _ => {}
    }
}

/// Remembers the targets it was asked to whitelist.
#[derive(Default)]
pub struct RecordingWhitelist {
    targets: Mutex<Vec<PathBuf>>,
}

impl RecordingWhitelist {
    pub fn targets(&self) -> Vec<PathBuf> {
        self.targets.lock().unwrap().clone()
    }
}

impl Whitelist for RecordingWhitelist {
    fn enable(&self, target: &Path) -> anyhow::Result<()> {
        self.targets.lock().unwrap().push(target.to_path_buf());
        Ok(())
    }
}
