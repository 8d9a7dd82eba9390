//! Error types for kvfacade
//!
//! Provides a unified error type for all facade, session and
//! configuration operations.

use thiserror::Error;

use crate::session::BatchKind;

/// Result type alias using FacadeError
pub type Result<T> = std::result::Result<T, FacadeError>;

/// Unified error type for kvfacade operations
#[derive(Debug, Error)]
pub enum FacadeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors (passed through from the session)
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The store answered with an error reply
    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Batch Errors
    // -------------------------------------------------------------------------
    /// A batch of one kind was requested while the other kind is open
    #[error("Cannot open a {requested} while a {open} is in progress")]
    MixedMode { open: BatchKind, requested: BatchKind },

    #[error("No batch is open")]
    NoBatch,

    // -------------------------------------------------------------------------
    // Facade Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A direct-only command was issued inside an open transaction
    #[error("{0} cannot run inside an open transaction")]
    DirectOnly(&'static str),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required configuration field: {0}")]
    MissingField(&'static str),
}

impl FacadeError {
    /// True for errors raised by configuration validation
    pub fn is_config(&self) -> bool {
        matches!(self, FacadeError::Config(_) | FacadeError::MissingField(_))
    }
}
