//! Connection Factory
//!
//! Turns a configuration into a ready facade: connect, authenticate,
//! select the database, then register the facade's server scripts.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::Result;
use crate::facade::Facade;

use super::RespSession;

/// Builds connected sessions and facades
pub struct ConnectionFactory;

impl ConnectionFactory {
    /// Connect, AUTH (when a password is configured) and SELECT
    pub fn create_session(config: &Config) -> Result<RespSession> {
        tracing::info!("Connecting to {} (db {})", config.addr(), config.db);

        let mut session = RespSession::connect(config)?;
        if let Some(password) = config.auth_password() {
            session.auth(&password)?;
        }
        session.select(config.db)?;

        Ok(session)
    }

    /// Full handshake plus script registration
    pub fn open(config: &Config) -> Result<Facade<RespSession>> {
        let session = Self::create_session(config)?;
        let mut facade = Facade::new(session);
        facade.load_scripts()?;
        Ok(facade)
    }

    /// Build from a flat settings mapping
    ///
    /// Configuration errors surface before any connection attempt.
    pub fn create_connection(settings: &HashMap<String, String>) -> Result<Facade<RespSession>> {
        let config = Config::from_settings(settings)?;
        Self::open(&config)
    }
}
