//! Layered configuration for recall.
//!
//! Values are merged in order, later sources winning:
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, picked by extension), either
//!    given explicitly or `config.toml` in the platform config directory,
//! 3. `RECALL_`-prefixed environment variables (`RECALL_CACHE_DIR`,
//!    `RECALL_DRY_RUN`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "RECALL_";
const FALLBACK_CACHE_DIR: &str = ".recall-cache";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "recall", "recall")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one artifact per cached document.
    pub cache_dir: PathBuf,
    /// Report what would be written without touching the cache directory.
    pub dry_run: bool,
}
impl Default for Config {
    fn default() -> Self {
        let cache_dir = project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR));
        Self { cache_dir, dry_run: false }
    }
}

impl Config {
    /// Default location of the configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from all sources.
    ///
    /// An explicit `path` must exist. The default path is only used if it
    /// does.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "Reading configuration file");
            figment = Self::merge_file(figment, file)?;
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    /// Extract a config from a prepared figment.
    pub fn extract(figment: Figment) -> Result<Self> {
        figment.extract().or_raise(|| ErrorKind::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = Config::extract(Figment::from(Serialized::defaults(Config::default()))).unwrap();
        assert!(!config.dry_run);
        assert!(!config.cache_dir.as_os_str().is_empty());
    }

    #[rstest]
    #[case("config.toml", "cache_dir = \"/tmp/recall\"\ndry_run = true\n")]
    #[case("config.yaml", "cache_dir: /tmp/recall\ndry_run: true\n")]
    #[case("config.json", r#"{"cache_dir": "/tmp/recall", "dry_run": true}"#)]
    fn test_file_formats(#[case] name: &str, #[case] contents: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(name);
        fs::write(&path, contents).unwrap();
        let figment = Config::merge_file(Figment::from(Serialized::defaults(Config::default())), &path).unwrap();
        let config = Config::extract(figment).unwrap();
        assert_eq!(config, Config { cache_dir: PathBuf::from("/tmp/recall"), dry_run: true });
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "dry_run = true\n").unwrap();
        let figment = Config::merge_file(Figment::from(Serialized::defaults(Config::default())), &path).unwrap();
        let config = Config::extract(figment).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.cache_dir, Config::default().cache_dir);
    }

    #[test]
    fn test_invalid_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "dry_run = \"sometimes\"\n").unwrap();
        let figment = Config::merge_file(Figment::from(Serialized::defaults(Config::default())), &path).unwrap();
        let err = Config::extract(figment).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.ini");
        fs::write(&path, "dry_run=true").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_environment_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "cache_dir = \"/from/file\"\ndry_run = false\n")?;
            jail.set_env("RECALL_CACHE_DIR", "/from/env");
            jail.set_env("RECALL_DRY_RUN", "true");
            let config = Config::load(Some(Path::new("config.toml"))).map_err(|err| format!("{err:?}"))?;
            assert_eq!(config, Config { cache_dir: PathBuf::from("/from/env"), dry_run: true });
            Ok(())
        });
    }

    #[test]
    fn test_environment_alone() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RECALL_DRY_RUN", "true");
            let config = Config::extract(
                Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX)),
            )
            .map_err(|err| format!("{err:?}"))?;
            assert!(config.dry_run);
            assert_eq!(config.cache_dir, Config::default().cache_dir);
            Ok(())
        });
    }
}
