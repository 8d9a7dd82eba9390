//! # kvfacade
//!
//! A typed command facade over a remote key-value store speaking RESP:
//! - One method per store command with a fixed result truth table
//! - Transactions (MULTI/EXEC) and pipelines behind one batch-mode switch
//! - Conditional sorted-set updates through a registered server script
//! - Connection factory with hashed-password authentication
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Facade<S>                             │
//! │        typed commands · truth tables · batch mode            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Command / Reply
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  StoreSession (trait)                        │
//! │          call · start/execute/discard batch                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ RespSession │          │ test doubles│
//!   │ (TCP/RESP)  │          │             │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ RESP codec  │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod facade;
pub mod network;
pub mod protocol;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, PasswordDigest};
pub use error::{FacadeError, Result};
pub use facade::{Batch, BatchMode, Facade, ZAddMode};
pub use network::{ConnectionFactory, RespSession};
pub use protocol::{Command, InsertPosition, RangeLimit, Reply};
pub use session::{BatchKind, StoreSession};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvfacade
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
