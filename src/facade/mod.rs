//! Command Facade
//!
//! One typed method per store command. Each method sends its command to
//! the session and, when no batch is open, interprets the raw reply with
//! that command's fixed truth table.
//!
//! ## Batch mode
//! While a batch is open every command is still issued (the session
//! queues it) but the method returns a placeholder instead of a result:
//!
//! | result type  | placeholder      |
//! |--------------|------------------|
//! | `bool`       | `true`           |
//! | `i64`        | `0`              |
//! | `f64`        | `0.0`            |
//! | bytes        | empty            |
//! | sequences    | empty            |
//! | `Option<T>`  | `Some(T's placeholder)` |
//!
//! The real results come back positionally from `exec()`. Failures are
//! always returned as `Err`, never as a placeholder.

mod batch;
mod hashes;
mod lists;
mod placeholder;
mod scripts;
mod sets;
mod sorted_sets;
mod strings;

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::{FacadeError, Result};
use crate::protocol::{Command, Reply};
use crate::session::{BatchKind, StoreSession};

pub use batch::{Batch, BatchMode};
pub use placeholder::Placeholder;
pub use scripts::{Script, ZAddMode, SCRIPTS, ZADD_XX_NX};

/// Typed command facade over one store session
pub struct Facade<S: StoreSession> {
    /// Exclusively owned store session
    session: S,

    /// Direct, or the open batch and its nesting level
    mode: BatchMode,
}

impl<S: StoreSession> Facade<S> {
    /// Wrap a connected session; starts in direct mode
    pub fn new(session: S) -> Self {
        Self {
            session,
            mode: BatchMode::Direct,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    /// True while a batch opened through this facade is unflushed
    pub fn in_batch(&self) -> bool {
        self.mode.is_batch()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Give the session back
    pub fn into_session(self) -> S {
        self.session
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Issue `command`; placeholder while batching, else `interpret` it
    fn dispatch<T, F>(&mut self, command: Command, interpret: F) -> Result<T>
    where
        T: Placeholder,
        F: FnOnce(Reply) -> Result<T>,
    {
        tracing::trace!("{} ({:?})", command.name(), self.mode);
        let reply = self.call(command)?.into_result()?;

        if self.mode.is_batch() {
            return Ok(T::placeholder());
        }
        interpret(reply)
    }

    /// Issue `command` on the session
    ///
    /// A failed call aborts the session's open batch, so the facade drops
    /// back to direct mode with it; the caller re-opens a batch to retry.
    fn call(&mut self, command: Command) -> Result<Reply> {
        self.session.call(command).map_err(|e| {
            if self.mode.is_batch() {
                tracing::warn!("Batch {:?} aborted: {}", self.mode, e);
                self.mode = BatchMode::Direct;
            }
            e
        })
    }

    // =========================================================================
    // Batch Control
    // =========================================================================

    /// Open (or nest into) a pipeline
    pub fn pipeline(&mut self) -> Result<Batch<'_, S>> {
        self.open_batch(BatchKind::Pipeline)
    }

    /// Open (or nest into) a transaction
    pub fn multi(&mut self) -> Result<Batch<'_, S>> {
        self.open_batch(BatchKind::Transaction)
    }

    /// Start the session's batch primitive, or reconcile with the open one
    fn open_batch(&mut self, requested: BatchKind) -> Result<Batch<'_, S>> {
        match self.mode.kind() {
            None => {
                self.session.start_batch(requested)?;
                self.mode = BatchMode::opened(requested);
                tracing::debug!("Opened {}", requested);
            }
            Some(open) => {
                open.admits(requested)?;
                self.mode.increase_level();
                tracing::debug!("Re-entered {} (level {})", open, self.mode.level());
            }
        }

        Ok(Batch::new(self, requested))
    }

    /// Flush the open batch
    ///
    /// Returns to direct mode first, whatever the nesting level, then
    /// returns the session's raw replies unmodified and in issue order.
    pub fn exec(&mut self) -> Result<Vec<Reply>> {
        let flushed = std::mem::take(&mut self.mode);
        tracing::debug!("Executing {:?}", flushed);

        let replies = self.session.execute_batch()?;
        tracing::debug!("Batch returned {} replies", replies.len());
        Ok(replies)
    }

    /// Abandon the open batch and return to direct mode
    pub fn discard(&mut self) -> Result<()> {
        let discarded = std::mem::take(&mut self.mode);
        tracing::debug!("Discarding {:?}", discarded);
        self.session.discard_batch()
    }

    // =========================================================================
    // Administrative
    // =========================================================================

    /// Mark `key` for optimistic locking by the next transaction
    pub fn watch(&mut self, key: &str) -> Result<()> {
        self.dispatch(
            Command::Watch {
                key: key.to_string(),
            },
            |_| Ok(()),
        )
    }

    /// Forget all watched keys
    pub fn unwatch(&mut self) -> Result<()> {
        self.dispatch(Command::Unwatch, |_| Ok(()))
    }

    /// Remove every key of the selected database
    pub fn flush(&mut self) -> Result<()> {
        self.dispatch(Command::FlushDb, |_| Ok(()))
    }

    /// Server metadata as `field → value`
    ///
    /// Always answered directly, never a placeholder. Inside a pipeline it
    /// bypasses the buffer. Inside a transaction the server would queue
    /// it, so it fails with `DirectOnly` and nothing is sent.
    pub fn info(&mut self) -> Result<BTreeMap<String, String>> {
        if let Some(BatchKind::Transaction) = self.mode.kind() {
            return Err(FacadeError::DirectOnly("INFO"));
        }

        let text = self.call(Command::Info)?.into_result()?.into_bytes()?;
        Ok(parse_info(&String::from_utf8_lossy(&text)))
    }

    /// Register every server-side script the facade relies on
    pub fn load_scripts(&mut self) -> Result<()> {
        for script in SCRIPTS {
            let reply = self
                .call(Command::ScriptLoad {
                    script: script.body.to_string(),
                })?
                .into_result()?;

            let expected = script.sha1();
            if !self.mode.is_batch() {
                let registered = reply.into_bytes()?;
                if registered != expected.as_bytes() {
                    return Err(FacadeError::Protocol(format!(
                        "Script {} registered under unexpected hash {:?}",
                        script.name, registered
                    )));
                }
            }
            tracing::debug!("Loaded script {} ({})", script.name, expected);
        }
        Ok(())
    }

    /// Generic parametrized queries have no equivalent on this store
    pub fn run_query(&mut self, _query: &str, _params: &[&str]) -> Result<Vec<Reply>> {
        Err(FacadeError::Unsupported("run_query"))
    }
}

// =============================================================================
// Truth-table helpers
// =============================================================================

/// `true` iff the reply is exactly the integer 1
fn is_one(reply: Reply) -> Result<bool> {
    Ok(matches!(reply, Reply::Integer(1)))
}

/// `true` unless the reply is the failure sentinel
fn not_nil(reply: Reply) -> Result<bool> {
    Ok(!reply.is_nil())
}

fn to_bool(reply: Reply) -> Result<bool> {
    reply.into_bool()
}

fn to_int(reply: Reply) -> Result<i64> {
    reply.into_integer()
}

/// Integer, with the nil sentinel read as 0
fn to_int_or_zero(reply: Reply) -> Result<i64> {
    Ok(reply.into_opt_integer()?.unwrap_or(0))
}

/// Parse INFO text: `field:value` lines, `#` section headers skipped
fn parse_info(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

fn to_bytes(value: impl AsRef<[u8]>) -> Bytes {
    Bytes::copy_from_slice(value.as_ref())
}
