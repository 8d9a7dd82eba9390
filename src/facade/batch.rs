//! Batch Sessions
//!
//! ## State Machine
//! ```text
//!              multi()                      pipeline()
//!   Direct ─────────────► Transacting(1)   Direct ─────────────► Pipelining(1)
//!                          │  multi()  → level + 1                 │  pipeline() → level + 1
//!                          │  pipeline() → MixedMode               │  multi()    → MixedMode
//!                          └─ exec() ──► Direct                    └─ exec() ──► Direct
//! ```
//!
//! `exec()` flushes unconditionally, whatever the nesting level. A command
//! that fails at the transport level aborts the batch and returns the
//! facade to `Direct`; the next `multi()`/`pipeline()` opens a fresh one.

use std::ops::{Deref, DerefMut};

use crate::error::{FacadeError, Result};
use crate::protocol::Reply;
use crate::session::{BatchKind, StoreSession};

use super::Facade;

/// The facade's batch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Commands execute immediately and return real results
    #[default]
    Direct,

    /// Inside MULTI; `level` counts nested `multi()` calls
    Transacting { level: usize },

    /// Inside a pipeline; `level` counts nested `pipeline()` calls
    Pipelining { level: usize },
}

impl BatchMode {
    /// Mode right after opening a batch of `kind`
    pub fn opened(kind: BatchKind) -> Self {
        match kind {
            BatchKind::Transaction => BatchMode::Transacting { level: 1 },
            BatchKind::Pipeline => BatchMode::Pipelining { level: 1 },
        }
    }

    /// Kind of the open batch, `None` when direct
    pub fn kind(&self) -> Option<BatchKind> {
        match self {
            BatchMode::Direct => None,
            BatchMode::Transacting { .. } => Some(BatchKind::Transaction),
            BatchMode::Pipelining { .. } => Some(BatchKind::Pipeline),
        }
    }

    pub fn is_batch(&self) -> bool {
        !matches!(self, BatchMode::Direct)
    }

    /// Nesting level, 0 when direct
    pub fn level(&self) -> usize {
        match self {
            BatchMode::Direct => 0,
            BatchMode::Transacting { level } | BatchMode::Pipelining { level } => *level,
        }
    }

    /// No-op when direct
    pub fn increase_level(&mut self) {
        match self {
            BatchMode::Direct => {}
            BatchMode::Transacting { level } | BatchMode::Pipelining { level } => *level += 1,
        }
    }
}

/// An open batch scope bound to one facade
///
/// Dereferences to the facade, so every command can be queued through
/// the handle. The handle borrows the facade mutably and is consumed by
/// `exec()` or `discard()`.
pub struct Batch<'a, S: StoreSession> {
    facade: &'a mut Facade<S>,
    kind: BatchKind,
}

impl<'a, S: StoreSession> Batch<'a, S> {
    pub(super) fn new(facade: &'a mut Facade<S>, kind: BatchKind) -> Self {
        Self { facade, kind }
    }

    /// Kind fixed when the batch was opened
    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    /// How many times this scope has been (re)entered
    pub fn nesting_level(&self) -> usize {
        self.facade.mode().level()
    }

    /// Record one more nested entry into the scope
    pub fn increase_level(&mut self) {
        self.facade.mode.increase_level();
    }

    /// Nest a transaction
    ///
    /// Same session when a transaction is open; `MixedMode` with no state
    /// change when a pipeline is open.
    pub fn multi(&mut self) -> Result<&mut Self> {
        self.nest(BatchKind::Transaction)
    }

    /// Nest a pipeline
    ///
    /// Same session when a pipeline is open; `MixedMode` with no state
    /// change when a transaction is open.
    pub fn pipeline(&mut self) -> Result<&mut Self> {
        self.nest(BatchKind::Pipeline)
    }

    fn nest(&mut self, requested: BatchKind) -> Result<&mut Self> {
        // The batch is gone once a failed command aborted it
        if !self.facade.in_batch() {
            return Err(FacadeError::NoBatch);
        }
        self.kind.admits(requested)?;
        self.increase_level();
        tracing::debug!(
            "Nested {} (level {})",
            requested,
            self.nesting_level()
        );
        Ok(self)
    }

    /// Flush the batch and return the raw replies in issue order
    pub fn exec(self) -> Result<Vec<Reply>> {
        self.facade.exec()
    }

    /// Abandon the batch without executing it
    pub fn discard(self) -> Result<()> {
        self.facade.discard()
    }
}

impl<S: StoreSession> Deref for Batch<'_, S> {
    type Target = Facade<S>;

    fn deref(&self) -> &Self::Target {
        self.facade
    }
}

impl<S: StoreSession> DerefMut for Batch<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.facade
    }
}
