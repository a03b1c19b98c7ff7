//! Process configuration, read once from the environment at startup.
//!
//! Every value has a default so the service boots with no configuration at all;
//! only publishing needs `GITHUB_USER` and `GITHUB_TOKEN`.

use crate::error::CatalogError;
use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const BACKUP_FILE_NAME: &str = "backup_cursos.json";
const DEFAULT_REPO: &str = "Docker_Ruby_MongoDB";

/// Settings of the publish workflow. Credentials stay `None` when unset.
#[derive(Clone)]
pub struct PublishSettings {
    pub username: Option<String>,
    pub token: Option<String>,
    pub host: String,
    pub repository: String,
    pub branch: String,
    pub step_timeout: Duration,
}

impl std::fmt::Debug for PublishSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishSettings")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "******"))
            .field("host", &self.host)
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("step_timeout", &self.step_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub project_root: PathBuf,
    pub database_path: PathBuf,
    pub backup_file: PathBuf,
    pub uploads_dir: PathBuf,
    pub publish: PublishSettings,
}

impl Config {
    pub fn load() -> Result<Self, CatalogError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `env::var` in production.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CatalogError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = match lookup("PROJECT_ROOT") {
            Some(root) => PathBuf::from(root),
            None => env::current_dir()
                .map_err(|e| CatalogError::Config(format!("cannot resolve current dir: {e}")))?,
        };
        let path_or = |key: &str, default: PathBuf| {
            lookup(key).map(PathBuf::from).unwrap_or_else(|| {
                info!("{key} not set, using default: {}", default.display());
                default
            })
        };

        let database_path = path_or("DATABASE_PATH", project_root.join("cursos.sqlite"));
        let backup_file = path_or("BACKUP_FILE", project_root.join(BACKUP_FILE_NAME));
        let public_dir = path_or("PUBLIC_DIR", project_root.join("public"));
        let uploads_dir = public_dir.join("uploads");

        let publish = PublishSettings {
            username: non_empty(lookup("GITHUB_USER")),
            token: non_empty(lookup("GITHUB_TOKEN")),
            host: lookup("GITHUB_HOST").unwrap_or_else(|| "github.com".to_string()),
            repository: lookup("GITHUB_REPO").unwrap_or_else(|| DEFAULT_REPO.to_string()),
            branch: lookup("PUBLISH_BRANCH").unwrap_or_else(|| "main".to_string()),
            step_timeout: Duration::from_secs(try_load(&lookup, "PUBLISH_TIMEOUT_SECS", 120)?),
        };
        if publish.token.is_none() {
            warn!("GITHUB_TOKEN not set, publishing will be refused");
        }

        Ok(Config {
            host: lookup("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: try_load(&lookup, "PORT", 3000)?,
            project_root,
            database_path,
            backup_file,
            uploads_dir,
            publish,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CatalogError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            CatalogError::Config(format!("{key}={raw}: {e}"))
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, CatalogError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| map.get(key).cloned())
    }

    #[test]
    fn defaults_hang_off_the_project_root() {
        let config = load(&[("PROJECT_ROOT", "/srv/cursos")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.backup_file, PathBuf::from("/srv/cursos/backup_cursos.json"));
        assert_eq!(config.uploads_dir, PathBuf::from("/srv/cursos/public/uploads"));
        assert_eq!(config.publish.branch, "main");
        assert_eq!(config.publish.repository, DEFAULT_REPO);
        assert_eq!(config.publish.step_timeout, Duration::from_secs(120));
        assert!(config.publish.token.is_none());
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let config = load(&[("PROJECT_ROOT", "/app"), ("GITHUB_TOKEN", "  ")]).unwrap();
        assert!(config.publish.token.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        let err = load(&[("PROJECT_ROOT", "/app"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = load(&[("PROJECT_ROOT", "/app"), ("GITHUB_TOKEN", "ghp_secret")]).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("******"));
    }
}
