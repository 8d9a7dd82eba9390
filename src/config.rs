//! Configuration for kvfacade
//!
//! Centralized connection configuration with sensible defaults, plus the
//! mapping-based construction used by the connection factory and the
//! TOML settings files read by the CLI.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{FacadeError, Result};

/// Main configuration for one store connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Store host name or address
    pub host: String,

    /// Store TCP port
    pub port: u16,

    /// Logical database index selected after connecting
    pub db: u32,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    /// Raw password, if the store requires AUTH
    pub password: Option<String>,

    /// Digest applied to the password before AUTH
    pub algo: Option<PasswordDigest>,

    // -------------------------------------------------------------------------
    // Key Namespace
    // -------------------------------------------------------------------------
    /// Prefix prepended by the session to every key argument
    pub prefix: String,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Reply read timeout (milliseconds, 0 = blocking)
    pub read_timeout_ms: u64,

    /// Request write timeout (milliseconds, 0 = blocking)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            password: None,
            algo: None,
            prefix: String::new(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Fields that must be present in a settings mapping
    pub const REQUIRED_FIELDS: [&'static str; 3] = ["host", "port", "db"];

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from a flat settings mapping
    ///
    /// `host`, `port` and `db` are required; `port` and `db` are coerced
    /// to integers. `password`, `algo`, `prefix` and the timeouts are
    /// optional. Nothing here touches the network.
    pub fn from_settings(settings: &HashMap<String, String>) -> Result<Self> {
        for field in Self::REQUIRED_FIELDS {
            if !settings.contains_key(field) {
                return Err(FacadeError::MissingField(field));
            }
        }

        let mut config = Config {
            host: settings["host"].clone(),
            port: parse_field(settings, "port")?,
            db: parse_field(settings, "db")?,
            password: settings.get("password").cloned(),
            algo: settings
                .get("algo")
                .map(|algo| algo.parse::<PasswordDigest>())
                .transpose()?,
            ..Config::default()
        };

        if let Some(prefix) = settings.get("prefix") {
            config.prefix = prefix.clone();
        }
        if settings.contains_key("connect_timeout_ms") {
            config.connect_timeout_ms = parse_field(settings, "connect_timeout_ms")?;
        }
        if settings.contains_key("read_timeout_ms") {
            config.read_timeout_ms = parse_field(settings, "read_timeout_ms")?;
        }
        if settings.contains_key("write_timeout_ms") {
            config.write_timeout_ms = parse_field(settings, "write_timeout_ms")?;
        }

        Ok(config)
    }

    /// Parse a TOML settings document into a config
    ///
    /// Top-level scalars are flattened into the settings mapping, so
    /// `port = 6379` and `port = "6379"` are equivalent.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let table: HashMap<String, SettingValue> = toml::from_str(source)
            .map_err(|e| FacadeError::Config(e.message().trim().to_string()))?;

        let settings: HashMap<String, String> = table
            .into_iter()
            .map(|(key, value)| (key, value.into_text()))
            .collect();
        Self::from_settings(&settings)
    }

    /// Read and parse a TOML settings file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// The password to send with AUTH, if any
    ///
    /// Digested under `algo` when one is configured, raw otherwise. An
    /// empty raw password means no AUTH.
    pub fn auth_password(&self) -> Option<String> {
        let password = self.password.as_ref()?;
        match self.algo {
            Some(algo) => Some(algo.digest(password)),
            None if password.is_empty() => None,
            None => Some(password.clone()),
        }
    }

    /// `host:port` for connecting and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A scalar setting as written in a TOML file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SettingValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl SettingValue {
    fn into_text(self) -> String {
        match self {
            SettingValue::Text(s) => s,
            SettingValue::Integer(n) => n.to_string(),
            SettingValue::Float(f) => f.to_string(),
            SettingValue::Boolean(b) => b.to_string(),
        }
    }
}

fn parse_field<T: FromStr>(settings: &HashMap<String, String>, field: &'static str) -> Result<T> {
    let raw = settings.get(field).ok_or(FacadeError::MissingField(field))?;
    raw.trim().parse::<T>().map_err(|_| {
        FacadeError::Config(format!("Field '{}' must be an integer, got '{}'", field, raw))
    })
}

/// Hash algorithm applied to the configured password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordDigest {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl PasswordDigest {
    /// Lowercase hex digest of `password`
    pub fn digest(self, password: &str) -> String {
        match self {
            PasswordDigest::Md5 => to_hex(&Md5::digest(password.as_bytes())),
            PasswordDigest::Sha1 => to_hex(&Sha1::digest(password.as_bytes())),
            PasswordDigest::Sha256 => to_hex(&Sha256::digest(password.as_bytes())),
            PasswordDigest::Sha384 => to_hex(&Sha384::digest(password.as_bytes())),
            PasswordDigest::Sha512 => to_hex(&Sha512::digest(password.as_bytes())),
        }
    }
}

impl FromStr for PasswordDigest {
    type Err = FacadeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(PasswordDigest::Md5),
            "sha1" => Ok(PasswordDigest::Sha1),
            "sha256" => Ok(PasswordDigest::Sha256),
            "sha384" => Ok(PasswordDigest::Sha384),
            "sha512" => Ok(PasswordDigest::Sha512),
            other => Err(FacadeError::Config(format!(
                "Unsupported password algorithm: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PasswordDigest::Md5 => "md5",
            PasswordDigest::Sha1 => "sha1",
            PasswordDigest::Sha256 => "sha256",
            PasswordDigest::Sha384 => "sha384",
            PasswordDigest::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

/// Lowercase hex encoding
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the store port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the database index
    pub fn db(mut self, db: u32) -> Self {
        self.config.db = db;
        self
    }

    /// Set the AUTH password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Digest the password under `algo` before AUTH
    pub fn algo(mut self, algo: PasswordDigest) -> Self {
        self.config.algo = Some(algo);
        self
    }

    /// Set the key prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
