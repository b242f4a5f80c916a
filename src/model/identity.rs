use std::{fmt::Display, path::PathBuf, sync::LazyLock};

use regex_lite::Regex;

use super::ParseError;

static URL_WITH_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*)://(?:[^/]*@)?(?P<host>[^/:]*)(?::[0-9]*)?(?:/(?P<path>.*))?$",
    )
    .unwrap()
});

static SCP_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^@/:]+@)?(?P<host>[^/:]+):(?P<path>.*)$").unwrap());

/// Where a repository lives, independent of the protocol used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentity {
    pub scheme: String,
    pub host: String,
    pub organization: String,
    pub project: String,
}

impl RepoIdentity {
    pub fn parse(url: &str) -> Result<RepoIdentity, ParseError> {
        let invalid = || ParseError::InvalidUrlFormat(url.to_owned());

        let (scheme, host, path) = if let Some(captures) = URL_WITH_SCHEME.captures(url) {
            // file:///srv/git/acme/widgets.git has an empty host
            let host = match &captures["host"] {
                "" => "localhost",
                host => host,
            };
            (
                captures["scheme"].to_ascii_lowercase(),
                host.to_owned(),
                captures.name("path").map(|m| m.as_str()).unwrap_or(""),
            )
        } else if url.contains("://") {
            return Err(invalid());
        } else if let Some(captures) = SCP_LIKE.captures(url) {
            (
                "ssh".to_owned(),
                captures["host"].to_owned(),
                captures.name("path").map(|m| m.as_str()).unwrap_or(""),
            )
        } else {
            return Err(invalid());
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(invalid());
        }
        let project = match segments.pop() {
            Some(project) if !segments.is_empty() => project.to_owned(),
            _ => return Err(invalid()),
        };

        Ok(RepoIdentity {
            scheme,
            host: host.to_ascii_lowercase(),
            organization: segments.join("/"),
            project,
        })
    }

    /// Location of the cache entry, relative to the cache root.
    pub fn cache_path(&self) -> PathBuf {
        let mut result = PathBuf::new();
        result.push(&self.host);
        result.extend(self.organization.split('/'));
        result.push(&self.project);
        result
    }

    /// Location of a working clone, relative to the workspace or vendor root.
    pub fn workspace_path(&self) -> PathBuf {
        let mut result = PathBuf::new();
        result.extend(self.organization.split('/'));
        result.push(&self.project);
        result
    }
}

impl Display for RepoIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.organization, self.project)
    }
}

/// Resolves a submodule url such as `../shared/lib.git` against the url of the
/// superproject's origin, the same way git does: the base url acts as a
/// directory, `./` is dropped and every `../` removes one trailing segment.
pub fn resolve_relative_url(base: &str, relative: &str) -> Result<String, ParseError> {
    let invalid = || ParseError::InvalidRelativeUrl {
        base: base.to_owned(),
        relative: relative.to_owned(),
    };

    let base = base.trim_end_matches('/');
    let root_len = root_length(base);
    let (root, path) = base.split_at(root_len);
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut rest = relative;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            segments.pop().ok_or_else(invalid)?;
            rest = stripped;
        } else if rest == "." {
            rest = "";
        } else if rest == ".." {
            segments.pop().ok_or_else(invalid)?;
            rest = "";
        } else {
            break;
        }
    }

    let rest = rest.trim_start_matches('/');
    let mut resolved = root.to_owned();
    resolved.push_str(&segments.join("/"));
    if !rest.is_empty() {
        if !segments.is_empty() {
            resolved.push('/');
        }
        resolved.push_str(rest);
    }
    Ok(resolved)
}

/// Length of the part of `url` that `../` can never remove: `scheme://host/`,
/// `user@host:` or a leading `/`.
fn root_length(url: &str) -> usize {
    if let Some(index) = url.find("://") {
        let authority = index + 3;
        return match url[authority..].find('/') {
            Some(slash) => authority + slash + 1,
            None => url.len(),
        };
    }
    if let Some(colon) = url.find(':') {
        if !url[..colon].contains('/') {
            return colon + 1;
        }
    }
    if url.starts_with('/') {
        1
    } else {
        0
    }
}
