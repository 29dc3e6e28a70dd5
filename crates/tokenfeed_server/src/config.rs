//! Layered configuration for the feed server.
//!
//! Sources, later ones winning:
//! 1. Bundled defaults (include_str! from tokenfeed.toml)
//! 2. `./tokenfeed.toml`, or the file passed explicitly
//! 3. `TOKENFEED__<SECTION>__<KEY>` environment variables
//! 4. `DATABASE_URL` (only when no database URL is set) and `PORT`
//!
//! Leaving `storage.backend` unset selects postgres whenever a database URL
//! is configured, from any source, and memory otherwise.

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tokenfeed_error::{ConfigError, TokenfeedResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../tokenfeed.toml");

/// Which feed store the server runs on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; the feed is lost on restart
    Memory,
    /// PostgreSQL through a connection pool
    Postgres,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address to listen on
    pub bind: SocketAddr,
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Backend chosen explicitly, if any. See [`StorageSettings::effective_backend`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<StorageBackend>,
    /// Maximum posts retained
    pub capacity: usize,
    /// Connection pool size for the postgres backend
    pub pool_size: u32,
    /// Seconds to wait for a database connection
    pub connect_timeout_secs: u64,
    /// Connection string for the postgres backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

impl StorageSettings {
    /// The backend the server will open.
    ///
    /// An explicit choice always wins. Without one, a configured database
    /// URL means postgres.
    pub fn effective_backend(&self) -> StorageBackend {
        match self.backend {
            Some(backend) => backend,
            None if self.has_database_url() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        }
    }

    /// Whether a non-empty database URL is configured.
    pub fn has_database_url(&self) -> bool {
        self.database_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// `[feed]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Nickname used when a submission leaves it blank
    pub default_nickname: String,
    /// Feed snapshots buffered per observer before it counts as lagging
    pub broadcast_buffer: usize,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenfeedConfig {
    /// Listener settings
    pub server: ServerSettings,
    /// Feed store settings
    pub storage: StorageSettings,
    /// Pipeline and broadcast settings
    pub feed: FeedSettings,
    /// Log output settings
    pub logging: LoggingSettings,
}

impl TokenfeedConfig {
    /// Load configuration from every source and validate it.
    ///
    /// When `path` is given that file must exist. Otherwise
    /// `./tokenfeed.toml` is read if present.
    #[instrument]
    pub fn load(path: Option<&Path>) -> TokenfeedResult<Self> {
        let builder = match path {
            Some(path) => {
                debug!(path = %path.display(), "Reading configuration file");
                bundled().add_source(File::from(path))
            }
            None => bundled().add_source(File::with_name("tokenfeed").required(false)),
        };
        let builder = builder.add_source(
            Environment::with_prefix("TOKENFEED")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config = build(builder)?;
        config.apply_deployment_overrides(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("PORT").ok(),
        )?;
        config.validate()?;

        debug!(
            backend = %config.storage.effective_backend(),
            capacity = config.storage.capacity,
            bind = %config.server.bind,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// The bundled defaults alone.
    pub fn bundled() -> TokenfeedResult<Self> {
        build(bundled())
    }

    /// Bundled defaults overlaid with a TOML document, validated.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokenfeed_server::{StorageBackend, TokenfeedConfig};
    ///
    /// let config = TokenfeedConfig::from_toml("[storage]\ncapacity = 20").unwrap();
    /// assert_eq!(config.storage.capacity, 20);
    /// assert_eq!(config.storage.effective_backend(), StorageBackend::Memory);
    /// ```
    pub fn from_toml(toml: &str) -> TokenfeedResult<Self> {
        let config = build(bundled().add_source(File::from_str(toml, FileFormat::Toml)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the `DATABASE_URL` and `PORT` conventions of hosted deployments.
    ///
    /// `database_url` only fills an unset value; with no backend chosen it
    /// also switches the server to postgres. `port` always replaces the
    /// configured port.
    pub fn apply_deployment_overrides(
        &mut self,
        database_url: Option<String>,
        port: Option<String>,
    ) -> Result<(), ConfigError> {
        if self.storage.database_url.is_none() {
            self.storage.database_url = database_url.filter(|url| !url.trim().is_empty());
        }

        if let Some(port) = port {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PORT {:?}: {}", port, e)))?;
            self.server.bind.set_port(port);
        }

        Ok(())
    }

    /// Check values the types alone cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.capacity == 0 {
            return Err(ConfigError::new("storage.capacity must be at least 1"));
        }
        if self.feed.broadcast_buffer == 0 {
            return Err(ConfigError::new("feed.broadcast_buffer must be at least 1"));
        }
        if self.storage.pool_size == 0 {
            return Err(ConfigError::new("storage.pool_size must be at least 1"));
        }
        if self.storage.effective_backend() == StorageBackend::Postgres
            && !self.storage.has_database_url()
        {
            return Err(ConfigError::new(
                "storage.database_url (or DATABASE_URL) is required for the postgres backend",
            ));
        }
        Ok(())
    }
}

fn bundled() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

fn build(builder: ConfigBuilder<DefaultState>) -> TokenfeedResult<TokenfeedConfig> {
    let config = builder
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
        .try_deserialize()
        .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
    Ok(config)
}
