use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use home::home_dir;
use serde::Deserialize;

const CONFIG_FILE: &str = ".config/odooup/config.toml";

/// Settings read from `~/.config/odooup/config.toml` and `ODOOUP_*`
/// environment variables, the latter taking precedence.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OdooupConfig {
    pub cache_dir: Option<PathBuf>,
    pub workspace_dir: Option<PathBuf>,
    pub vendor_dir: Option<PathBuf>,
}

impl OdooupConfig {
    pub fn load() -> anyhow::Result<Self> {
        let file = home_dir().map(|home| home.join(CONFIG_FILE));
        let raw_config = RawConfig::load(file.as_deref(), None)?;
        Ok(raw_config.into())
    }
}

impl From<RawConfig> for OdooupConfig {
    fn from(raw: RawConfig) -> Self {
        OdooupConfig {
            cache_dir: raw.cache.dir,
            workspace_dir: raw.workspace.dir,
            vendor_dir: raw.vendor.dir,
        }
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    cache: DirConfig,
    #[serde(default)]
    workspace: DirConfig,
    #[serde(default)]
    vendor: DirConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct DirConfig {
    dir: Option<PathBuf>,
}

impl RawConfig {
    fn load(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(
                File::from(file)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        builder
            .add_source(
                Environment::with_prefix("ODOOUP")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let config = RawConfig::load(None, Some(HashMap::new())).unwrap();
        assert_eq!(config, RawConfig::default());
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            ("ODOOUP_CACHE_DIR".to_owned(), "/cache".to_owned()),
            ("ODOOUP_WORKSPACE_DIR".to_owned(), "/work".to_owned()),
        ]);
        let config = OdooupConfig::from(RawConfig::load(None, Some(env)).unwrap());
        assert_eq!(
            config,
            OdooupConfig {
                cache_dir: Some("/cache".into()),
                workspace_dir: Some("/work".into()),
                vendor_dir: None,
            }
        )
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(
            &file,
            r#"
                [cache]
                dir = "/from/file"
                [vendor]
                dir = "third_party"
            "#,
        )
        .unwrap();
        let env = HashMap::from([("ODOOUP_CACHE_DIR".to_owned(), "/from/env".to_owned())]);

        let config = OdooupConfig::from(RawConfig::load(Some(&file), Some(env)).unwrap());

        assert_eq!(
            config,
            OdooupConfig {
                cache_dir: Some("/from/env".into()),
                workspace_dir: None,
                vendor_dir: Some("third_party".into()),
            }
        )
    }

    #[test]
    fn missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            RawConfig::load(Some(&dir.path().join("absent.toml")), Some(HashMap::new())).unwrap();
        assert_eq!(config, RawConfig::default());
    }
}
