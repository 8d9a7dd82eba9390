//! Store Session
//!
//! The seam between the facade and a connected store. A session issues
//! one typed command and hands back the raw reply; it also owns the
//! store's batching primitive.
//!
//! ## Batch contract
//! - `start_batch(kind)` opens the one batch a connection can hold
//! - while open, `call` queues the command and returns a queued marker
//!   (commands with `Command::bypasses_batch` excepted)
//! - `execute_batch` returns one reply per queued command, in issue order
//! - `discard_batch` drops the queue without executing it
//!
//! A failure while a batch is open aborts it; the session is back in
//! direct mode afterwards.

use std::fmt;

use crate::error::{FacadeError, Result};
use crate::protocol::{Command, Reply};

/// The two batch kinds a connection supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    /// MULTI/EXEC: queued server-side, executed atomically
    Transaction,

    /// Client-side queue sent in one write, no atomicity
    Pipeline,
}

impl BatchKind {
    pub fn name(self) -> &'static str {
        match self {
            BatchKind::Transaction => "transaction",
            BatchKind::Pipeline => "pipeline",
        }
    }

    /// Whether a batch of `requested` kind may nest inside this one
    ///
    /// Only the same kind nests; a connection cannot interleave the two.
    pub fn admits(self, requested: BatchKind) -> Result<()> {
        if self == requested {
            Ok(())
        } else {
            Err(FacadeError::MixedMode {
                open: self,
                requested,
            })
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A connected store handle
pub trait StoreSession {
    /// Issue one command and return its raw reply
    ///
    /// Error replies are returned as `Reply::Error`, not as `Err`; `Err`
    /// is reserved for transport and framing failures.
    fn call(&mut self, command: Command) -> Result<Reply>;

    /// Open a batch of the given kind
    fn start_batch(&mut self, kind: BatchKind) -> Result<()>;

    /// Execute the open batch and return its replies in issue order
    fn execute_batch(&mut self) -> Result<Vec<Reply>>;

    /// Abandon the open batch
    fn discard_batch(&mut self) -> Result<()>;

    /// Prefix applied to key arguments
    fn prefix(&self) -> &str {
        ""
    }

    /// `key` as the store sees it
    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }
}

impl<S: StoreSession + ?Sized> StoreSession for Box<S> {
    fn call(&mut self, command: Command) -> Result<Reply> {
        (**self).call(command)
    }

    fn start_batch(&mut self, kind: BatchKind) -> Result<()> {
        (**self).start_batch(kind)
    }

    fn execute_batch(&mut self) -> Result<Vec<Reply>> {
        (**self).execute_batch()
    }

    fn discard_batch(&mut self) -> Result<()> {
        (**self).discard_batch()
    }

    fn prefix(&self) -> &str {
        (**self).prefix()
    }
}
