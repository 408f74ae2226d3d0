//! Run configuration loaded from the environment.

use std::io::ErrorKind;
use std::path::Path;

use reqwest::Url;
use thiserror::Error;
use tracing::debug;

/// Env files read before the process environment. Earlier files win.
pub const ENV_FILES: &[&str] = &[".env.local", ".env"];

const DATABASE_URL: &str = "DATABASE_URL";
const REST_URL_VARS: &[&str] = &["NEXT_PUBLIC_SUPABASE_URL", "SUPABASE_URL"];
const REST_KEY_VARS: &[&str] = &["SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable(s): {0}")]
    Missing(String),
    #[error("Invalid database endpoint URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Failed to load env file {file}: {source}")]
    EnvFile {
        file: String,
        #[source]
        source: dotenvy::Error,
    },
    #[error("Service key is not a valid HTTP header value")]
    InvalidKey,
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),
}

/// Where seeded rows are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Hosted REST endpoint authenticated with a service-role key.
    Rest { url: Url, service_key: String },
    /// Direct Postgres connection.
    Postgres { database_url: String },
}

/// Configuration for a seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub backend: Backend,
}

impl SeedConfig {
    /// Loads env files (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        for file in ENV_FILES {
            load_env_file(Path::new(file))?;
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
        };

        let backend = if let Some(database_url) = first_set(&[DATABASE_URL]) {
            Backend::Postgres { database_url }
        } else {
            match (first_set(REST_URL_VARS), first_set(REST_KEY_VARS)) {
                (Some(url), Some(service_key)) => Backend::Rest {
                    url: parse_endpoint(&url)?,
                    service_key,
                },
                (url, key) => {
                    let mut missing = Vec::new();
                    if url.is_none() {
                        missing.push(REST_URL_VARS[0]);
                    }
                    if key.is_none() {
                        missing.push(REST_KEY_VARS[0]);
                    }
                    return Err(ConfigError::Missing(format!(
                        "{} (or {DATABASE_URL})",
                        missing.join(", ")
                    )));
                }
            }
        };

        Ok(Self { backend })
    }
}

/// Loads one env file. A missing file is skipped; a malformed one is an error.
///
/// Variables already set in the process environment are never overridden.
pub fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    match dotenvy::from_filename(path) {
        Ok(loaded) => {
            debug!("Loaded environment from {}", loaded.display());
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConfigError::EnvFile {
            file: path.display().to_string(),
            source,
        }),
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    Ok(url)
}
