//! Keys and string values

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Command, Reply};
use crate::session::StoreSession;

use super::{is_one, owned, to_bool, to_bytes, to_int, Facade};

impl<S: StoreSession> Facade<S> {
    /// SET, expiring after `ttl` seconds (0 = never)
    pub fn set(&mut self, key: &str, value: impl AsRef<[u8]>, ttl: u64) -> Result<bool> {
        self.dispatch(
            Command::Set {
                key: key.to_string(),
                value: to_bytes(value),
                ttl,
            },
            to_bool,
        )
    }

    /// SET without expiry
    pub fn p_set(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.set(key, value, 0)
    }

    pub fn set_ex(&mut self, key: &str, value: impl AsRef<[u8]>, ttl: u64) -> Result<bool> {
        self.dispatch(
            Command::SetEx {
                key: key.to_string(),
                value: to_bytes(value),
                ttl,
            },
            to_bool,
        )
    }

    /// SET only if the key does not exist yet
    pub fn set_nx(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::SetNx {
                key: key.to_string(),
                value: to_bytes(value),
            },
            to_bool,
        )
    }

    /// Value of `key`, `None` when missing
    pub fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.dispatch(
            Command::Get {
                key: key.to_string(),
            },
            Reply::into_opt_bytes,
        )
    }

    /// `true` iff exactly one key was removed
    pub fn del(&mut self, key: &str) -> Result<bool> {
        self.dispatch(
            Command::Del {
                key: key.to_string(),
            },
            is_one,
        )
    }

    pub fn has(&mut self, key: &str) -> Result<bool> {
        self.dispatch(
            Command::Exists {
                key: key.to_string(),
            },
            to_bool,
        )
    }

    /// Remaining time to live in seconds
    ///
    /// 0 for a missing key; -1 passes through for a key without expiry.
    pub fn ttl(&mut self, key: &str) -> Result<i64> {
        self.dispatch(
            Command::Ttl {
                key: key.to_string(),
            },
            |reply| match reply.into_opt_integer()? {
                None | Some(-2) => Ok(0),
                Some(ttl) => Ok(ttl),
            },
        )
    }

    pub fn expire(&mut self, key: &str, seconds: i64) -> Result<bool> {
        self.dispatch(
            Command::Expire {
                key: key.to_string(),
                seconds,
            },
            to_bool,
        )
    }

    /// Expire at a unix timestamp (seconds)
    pub fn expire_at(&mut self, key: &str, timestamp: i64) -> Result<bool> {
        self.dispatch(
            Command::ExpireAt {
                key: key.to_string(),
                timestamp,
            },
            to_bool,
        )
    }

    /// Set-if-absent with expiry
    ///
    /// `true` iff the SETNX took effect. In direct mode both commands run
    /// in their own transaction. Inside an already open batch they join
    /// that batch and the placeholder `true` is returned; the open batch
    /// is not flushed. Atomicity then holds only if that batch is a
    /// transaction, not a pipeline.
    pub fn add(&mut self, key: &str, value: impl AsRef<[u8]>, ttl: i64) -> Result<bool> {
        if self.in_batch() {
            self.set_nx(key, value)?;
            self.expire(key, ttl)?;
            return Ok(true);
        }

        let mut tx = self.multi()?;
        let queued = tx.set_nx(key, value).and_then(|_| tx.expire(key, ttl));
        if let Err(e) = queued {
            // A transport failure has already aborted the batch
            if tx.in_batch() {
                if let Err(discard_err) = tx.discard() {
                    tracing::warn!("Discarding add() transaction failed: {}", discard_err);
                }
            }
            return Err(e);
        }

        let replies = tx.exec()?;
        Ok(replies.first().is_some_and(Reply::is_truthy))
    }

    /// Values of `keys`, `None` for each missing key
    pub fn m_get(&mut self, keys: &[&str]) -> Result<Vec<Option<Bytes>>> {
        self.dispatch(Command::MGet { keys: owned(keys) }, Reply::into_opt_bytes_list)
    }

    pub fn m_set<K, V>(&mut self, pairs: &[(K, V)]) -> Result<bool>
    where
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let pairs = pairs
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), to_bytes(v)))
            .collect();
        self.dispatch(Command::MSet { pairs }, to_bool)
    }

    /// `true` iff the resulting value is non-empty
    pub fn append(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::Append {
                key: key.to_string(),
                value: to_bytes(value),
            },
            |reply| Ok(reply.into_integer()? > 0),
        )
    }

    pub fn incr(&mut self, key: &str) -> Result<i64> {
        self.dispatch(
            Command::Incr {
                key: key.to_string(),
            },
            to_int,
        )
    }

    pub fn incr_by(&mut self, key: &str, delta: i64) -> Result<i64> {
        self.dispatch(
            Command::IncrBy {
                key: key.to_string(),
                delta,
            },
            to_int,
        )
    }

    pub fn decr(&mut self, key: &str) -> Result<i64> {
        self.dispatch(
            Command::Decr {
                key: key.to_string(),
            },
            to_int,
        )
    }

    pub fn decr_by(&mut self, key: &str, delta: i64) -> Result<i64> {
        self.dispatch(
            Command::DecrBy {
                key: key.to_string(),
                delta,
            },
            to_int,
        )
    }

    /// Substring by inclusive byte offsets
    pub fn get_range(&mut self, key: &str, start: i64, end: i64) -> Result<Bytes> {
        self.dispatch(
            Command::GetRange {
                key: key.to_string(),
                start,
                end,
            },
            Reply::into_bytes,
        )
    }

    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<bool> {
        self.dispatch(
            Command::Rename {
                from: old_name.to_string(),
                to: new_name.to_string(),
            },
            to_bool,
        )
    }
}
