//! Runtime configuration loaded once at startup via OrthoConfig.
//!
//! Each concern has its own settings struct with an environment prefix. The
//! structs are merged into an immutable [`AppConfig`] that the server threads
//! through its builders. Secrets move into [`Secret`] as soon as they are read
//! so they are wiped on drop and never printed.

use std::ffi::OsString;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{DEFAULT_ROW_LIMIT, DEFAULT_SCHEMA, Identifier, resolve_schema_name};
use crate::outbound::snapshot_file::DEFAULT_SNAPSHOT_PATH;

const DEFAULT_POOL_MAX_SIZE: u32 = 8;
const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_COMPLETION_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_REPORT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// String wiped from memory on drop and redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Copy into a fresh zeroizing buffer for adapters that keep their own.
    pub fn to_zeroizing(&self) -> Zeroizing<String> {
        self.0.clone()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Database connection settings (`DATABASE_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DATABASE")]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL.
    pub url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
}

/// Schema selection (`PG_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PG")]
pub struct SchemaSettings {
    /// Explicit schema override.
    pub schema: Option<String>,
    /// Search path; its first element is the default schema.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub search_path: Option<Vec<String>>,
    /// Schema used when neither an override nor a search path is set.
    #[ortho_config(default = String::from(DEFAULT_SCHEMA))]
    pub fallback_schema: String,
}

/// Snapshot storage (`SNAPSHOT_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SNAPSHOT")]
pub struct SnapshotSettings {
    #[ortho_config(default = PathBuf::from(DEFAULT_SNAPSHOT_PATH))]
    pub path: PathBuf,
    /// Table allowlist.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub only_tables: Option<Vec<String>>,
}

/// Completion service (`AI_*`).
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AI")]
pub struct CompletionSettings {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
    #[ortho_config(default = DEFAULT_COMPLETION_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

impl fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Report execution (`REPORT_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REPORT")]
pub struct ReportSettings {
    /// Row cap requested in prompts and appended to statements without a `LIMIT`.
    #[ortho_config(default = DEFAULT_ROW_LIMIT)]
    pub row_limit: u32,
    /// Server-side statement timeout for report queries.
    #[ortho_config(default = DEFAULT_REPORT_TIMEOUT_MS)]
    pub statement_timeout_ms: u64,
}

/// Admin gate (`ADMIN_*`).
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN")]
pub struct AdminSettings {
    /// Serve admin endpoints; `false` disables them even with a token set.
    #[ortho_config(default = true)]
    pub enabled: bool,
    pub token: Option<String>,
}

impl fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSettings")
            .field("enabled", &self.enabled)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Listener (`HTTP_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HTTP")]
pub struct HttpSettings {
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListValue {
    One(String),
    Many(Vec<String>),
}

/// Accept a list as a sequence or as one comma-separated string.
fn deserialize_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<ListValue>::deserialize(deserializer)?;
    let items = match raw {
        None => return Ok(None),
        Some(ListValue::One(single)) => single.split(',').map(str::to_owned).collect(),
        Some(ListValue::Many(items)) => items,
    };
    Ok(Some(items))
}

/// Errors raised while assembling [`AppConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load {section} settings: {message}")]
    Load {
        section: &'static str,
        message: String,
    },
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl fmt::Display) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Database settings after defaults and validation.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret,
    pub pool_max_size: u32,
    pub run_migrations: bool,
}

/// Completion settings when an API key is configured.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Secret,
    pub api_url: Url,
    pub model: String,
    pub timeout: Duration,
}

/// Immutable configuration assembled at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` when `DATABASE_URL` is unset; the server then runs with fixtures.
    pub database: Option<DatabaseConfig>,
    /// `PG_SCHEMA` override, kept separately so explicit arguments can win.
    pub schema_override: Option<String>,
    /// Head of `PG_SEARCH_PATH`, or `PG_FALLBACK_SCHEMA` when no path is set.
    pub search_path: Option<String>,
    /// Schema that DDL targets, resolved from override and search path.
    pub active_schema: Identifier,
    pub snapshot_path: PathBuf,
    pub only_tables: Vec<String>,
    /// `None` leaves translation wired to an unconfigured source.
    pub completion: Option<CompletionConfig>,
    pub row_limit: u32,
    pub report_timeout: Duration,
    /// `None` disables every admin endpoint, as does `ADMIN_ENABLED=false`.
    pub admin_token: Option<Secret>,
    pub bind_addr: SocketAddr,
}

fn program_args() -> [OsString; 1] {
    [OsString::from("inventory-admin")]
}

fn load_error(section: &'static str, err: &impl fmt::Display) -> ConfigError {
    ConfigError::Load {
        section,
        message: err.to_string(),
    }
}

fn clean_list(items: Option<Vec<String>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| non_blank(Some(item)))
        .collect()
}

impl AppConfig {
    /// Load every section from the environment and configuration files.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a section fails to load or a value is
    /// malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_settings(
            DatabaseSettings::load_from_iter(program_args())
                .map_err(|err| load_error("database", &err))?,
            SchemaSettings::load_from_iter(program_args())
                .map_err(|err| load_error("schema", &err))?,
            SnapshotSettings::load_from_iter(program_args())
                .map_err(|err| load_error("snapshot", &err))?,
            CompletionSettings::load_from_iter(program_args())
                .map_err(|err| load_error("completion", &err))?,
            ReportSettings::load_from_iter(program_args())
                .map_err(|err| load_error("report", &err))?,
            AdminSettings::load_from_iter(program_args())
                .map_err(|err| load_error("admin", &err))?,
            HttpSettings::load_from_iter(program_args())
                .map_err(|err| load_error("http", &err))?,
        )
    }

    /// Apply defaults and validation to already-loaded sections.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for malformed values.
    pub fn from_settings(
        database: DatabaseSettings,
        schema: SchemaSettings,
        snapshot: SnapshotSettings,
        completion: CompletionSettings,
        report: ReportSettings,
        admin: AdminSettings,
        http: HttpSettings,
    ) -> Result<Self, ConfigError> {
        let schema_override = non_blank(schema.schema);
        let search_path = clean_list(schema.search_path)
            .into_iter()
            .next()
            .or_else(|| non_blank(Some(schema.fallback_schema)));
        let active_schema = Identifier::parse(resolve_schema_name(
            None,
            schema_override.as_deref(),
            search_path.as_deref(),
        ))
        .map_err(|err| ConfigError::invalid("PG_SCHEMA", err))?;

        let database = non_blank(database.url).map(|url| DatabaseConfig {
            url: Secret::new(url),
            pool_max_size: database.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE),
            run_migrations: database.run_migrations,
        });

        let completion = match non_blank(completion.api_key) {
            Some(api_key) => {
                let raw_url = non_blank(completion.api_url)
                    .unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_owned());
                let api_url =
                    Url::parse(&raw_url).map_err(|err| ConfigError::invalid("AI_API_URL", err))?;
                Some(CompletionConfig {
                    api_key: Secret::new(api_key),
                    api_url,
                    model: non_blank(completion.model)
                        .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_owned()),
                    timeout: Duration::from_millis(completion.timeout_ms),
                })
            }
            None => None,
        };

        if report.row_limit == 0 {
            return Err(ConfigError::invalid("REPORT_ROW_LIMIT", "must be positive"));
        }

        let bind_addr = http
            .bind_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::invalid("HTTP_BIND_ADDR", err))?;

        Ok(Self {
            database,
            schema_override,
            search_path,
            active_schema,
            snapshot_path: snapshot.path,
            only_tables: clean_list(snapshot.only_tables),
            completion,
            row_limit: report.row_limit,
            report_timeout: Duration::from_millis(report.statement_timeout_ms),
            admin_token: non_blank(admin.token)
                .filter(|_| admin.enabled)
                .map(Secret::new),
            bind_addr,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
