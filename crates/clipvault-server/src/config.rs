use clipvault_core::EngineLimits;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Process configuration: deployment knobs plus the engine limits.
///
/// Loaded from a TOML file; a handful of deployment-relevant keys can be
/// overridden from the environment (`CLIPVAULT_DATABASE_URL`,
/// `CLIPVAULT_REDIS_URL`, `CLIPVAULT_BIND_ADDR`) so containers need no file
/// edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    /// Absent means the in-process recency queue.
    pub redis_url: Option<String>,
    pub scheduler_queue_depth: usize,
    pub queue_op_timeout_ms: u64,
    pub engine: EngineLimits,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: "sqlite::memory:".to_string(),
            redis_url: None,
            scheduler_queue_depth: 256,
            queue_op_timeout_ms: 2000,
            engine: EngineLimits::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// The static development token table. Production deployments swap in a
/// real verifier and leave this empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// bearer token -> account it authenticates.
    pub tokens: HashMap<String, SeedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub elevated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl ServerConfig {
    /// Load from `path` when given (or when `clipvault.toml` exists in the
    /// working directory), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new("clipvault.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CLIPVAULT_DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(url) = std::env::var("CLIPVAULT_REDIS_URL") {
            self.redis_url = if url.is_empty() { None } else { Some(url) };
        }
        if let Ok(addr) = std::env::var("CLIPVAULT_BIND_ADDR") {
            self.bind_addr = addr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_self_contained() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(config.redis_url.is_none());
        assert_eq!(config.scheduler_queue_depth, 256);
        assert_eq!(config.queue_op_timeout_ms, 2000);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            bind_addr = "0.0.0.0:9999"

            [engine]
            recency_cap = 10

            [auth.tokens.dev-token]
            id = 1
            email = "dev@example.com"
            "#
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9999");
        assert_eq!(config.engine.recency_cap, 10);
        // Unnamed keys keep their defaults.
        assert_eq!(config.engine.chunk_size_bytes, 65_536);
        assert_eq!(config.auth.tokens["dev-token"].id, 1);
        assert!(!config.auth.tokens["dev-token"].elevated);
    }
}
