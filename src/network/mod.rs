//! Network Module
//!
//! TCP connection to the store.
//!
//! ## Architecture
//! - One blocking connection per session, no pool
//! - Transactions queue server-side (MULTI ... EXEC)
//! - Pipelines queue client-side and flush in one write

mod connection;
mod factory;

pub use connection::RespSession;
pub use factory::ConnectionFactory;
