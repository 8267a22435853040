//! Configuration for the store and its backends.
//!
//! Configuration is read from YAML. `${VAR}` and `$VAR` references in the file text are
//! expanded from the environment before parsing, and `DOCGATE_*` variables override
//! individual values afterwards:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `DOCGATE_BACKEND` | `backend.kind` (`memory` or `mongodb`) |
//! | `DOCGATE_MONGODB_DSN` | `backend.dsn` |
//! | `DOCGATE_MONGODB_DATABASE` | `backend.database` |
//! | `DOCGATE_MAX_IN_VALUES` | `query.max_in_values` |
//! | `DOCGATE_BUCKET` | `object_store.bucket` |
//! | `DOCGATE_SIGNED_URL_TTL_SECS` | `object_store.signed_url_ttl_secs` |
//! | `DOCGATE_LOG` | `logging.filter` |
//!
//! ```yaml
//! backend:
//!   kind: mongodb
//!   dsn: ${MONGODB_URI}
//!   database: blueprints
//! query:
//!   max_in_values: 30
//! ```

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::DEFAULT_MAX_IN_VALUES,
};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocgateConfig {
    pub backend: BackendConfig,
    pub query: QueryConfig,
    pub object_store: ObjectStoreConfig,
    pub logging: LoggingConfig,
}

/// Which document database to talk to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    Mongodb {
        dsn: String,
        database: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Upper bound on the number of values in an `in` / `not-in` filter.
    pub max_in_values: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_in_values: DEFAULT_MAX_IN_VALUES }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    /// Lifetime of generated download URLs.
    pub signed_url_ttl_secs: u64,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self { bucket: "default".to_string(), signed_url_ttl_secs: 3600 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl DocgateConfig {
    /// Reads a YAML file, expanding environment references and applying `DOCGATE_*`
    /// overrides.
    pub fn from_file(path: impl AsRef<Path>) -> DocumentStoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocumentStoreError::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "loading configuration");

        let mut config = Self::from_yaml_str(&expand_env_vars(&content, env_lookup))?;
        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Parses YAML text as-is. No expansion and no overrides.
    pub fn from_yaml_str(yaml: &str) -> DocumentStoreResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(yaml).map_err(|e| DocumentStoreError::Config(e.to_string()))
    }

    /// Applies `DOCGATE_*` overrides read from the process environment.
    pub fn apply_env_overrides(&mut self) -> DocumentStoreResult<()> {
        self.apply_overrides(env_lookup)
    }

    /// Applies `DOCGATE_*` overrides using `lookup` to resolve variables.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> DocumentStoreResult<()> {
        if let Some(kind) = lookup("DOCGATE_BACKEND") {
            let is_mongodb = matches!(self.backend, BackendConfig::Mongodb { .. });

            match kind.as_str() {
                "memory" => self.backend = BackendConfig::Memory,
                "mongodb" if is_mongodb => {}
                "mongodb" => {
                    self.backend =
                        BackendConfig::Mongodb { dsn: String::new(), database: String::new() };
                }
                other => {
                    return Err(DocumentStoreError::Config(format!(
                        "unknown backend kind `{other}`"
                    )));
                }
            }
        }

        if let BackendConfig::Mongodb { dsn, database } = &mut self.backend {
            if let Some(value) = lookup("DOCGATE_MONGODB_DSN") {
                *dsn = value;
            }
            if let Some(value) = lookup("DOCGATE_MONGODB_DATABASE") {
                *database = value;
            }
        }

        if let Some(value) = lookup("DOCGATE_MAX_IN_VALUES") {
            self.query.max_in_values = parse_override("DOCGATE_MAX_IN_VALUES", &value)?;
        }
        if let Some(value) = lookup("DOCGATE_BUCKET") {
            self.object_store.bucket = value;
        }
        if let Some(value) = lookup("DOCGATE_SIGNED_URL_TTL_SECS") {
            self.object_store.signed_url_ttl_secs =
                parse_override("DOCGATE_SIGNED_URL_TTL_SECS", &value)?;
        }
        if let Some(value) = lookup("DOCGATE_LOG") {
            self.logging.filter = value;
        }

        Ok(())
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_override<T: FromStr>(name: &str, value: &str) -> DocumentStoreResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DocumentStoreError::Config(format!("{name}={value}: {e}")))
}

/// Expands `${VAR}` and `$VAR` references. Unset variables expand to an empty string.
pub fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('$') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => {
                    result.push_str(&lookup(&braced[..end]).unwrap_or_default());
                    rest = &braced[end + 1..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
            continue;
        }

        let name_len = after
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .count();

        if name_len == 0 {
            result.push('$');
        } else {
            result.push_str(&lookup(&after[..name_len]).unwrap_or_default());
        }
        rest = &after[name_len..];
    }

    result.push_str(rest);
    result
}
