//! Hashes

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Command, Reply};
use crate::session::StoreSession;

use super::{is_one, to_bool, to_bytes, to_int, Facade};

impl<S: StoreSession> Facade<S> {
    /// Value of `field`, `None` when missing
    pub fn h_get(&mut self, key: &str, field: &str) -> Result<Option<Bytes>> {
        self.dispatch(
            Command::HGet {
                key: key.to_string(),
                field: field.to_string(),
            },
            Reply::into_opt_bytes,
        )
    }

    /// `true` iff `field` is new; overwriting an existing field is `false`
    pub fn h_set(&mut self, key: &str, field: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::HSet {
                key: key.to_string(),
                field: field.to_string(),
                value: to_bytes(value),
            },
            is_one,
        )
    }

    pub fn h_set_nx(&mut self, key: &str, field: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::HSetNx {
                key: key.to_string(),
                field: field.to_string(),
                value: to_bytes(value),
            },
            to_bool,
        )
    }

    /// Set several fields at once (HMSET)
    pub fn h_set_all<F, V>(&mut self, key: &str, fields: &[(F, V)]) -> Result<bool>
    where
        F: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let fields = fields
            .iter()
            .map(|(f, v)| (f.as_ref().to_string(), to_bytes(v)))
            .collect();
        self.dispatch(
            Command::HMSet {
                key: key.to_string(),
                fields,
            },
            to_bool,
        )
    }

    /// `true` iff `field` was removed
    pub fn h_del(&mut self, key: &str, field: &str) -> Result<bool> {
        self.dispatch(
            Command::HDel {
                key: key.to_string(),
                field: field.to_string(),
            },
            is_one,
        )
    }

    pub fn h_exists(&mut self, key: &str, field: &str) -> Result<bool> {
        self.dispatch(
            Command::HExists {
                key: key.to_string(),
                field: field.to_string(),
            },
            to_bool,
        )
    }

    pub fn h_incr_by(&mut self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.dispatch(
            Command::HIncrBy {
                key: key.to_string(),
                field: field.to_string(),
                delta,
            },
            to_int,
        )
    }

    pub fn h_incr_by_float(&mut self, key: &str, field: &str, delta: f64) -> Result<f64> {
        self.dispatch(
            Command::HIncrByFloat {
                key: key.to_string(),
                field: field.to_string(),
                delta,
            },
            Reply::into_float,
        )
    }

    pub fn h_vals(&mut self, key: &str) -> Result<Vec<Bytes>> {
        self.dispatch(
            Command::HVals {
                key: key.to_string(),
            },
            Reply::into_bytes_list,
        )
    }

    /// All `(field, value)` pairs in server order
    pub fn h_get_all(&mut self, key: &str) -> Result<Vec<(Bytes, Bytes)>> {
        self.dispatch(
            Command::HGetAll {
                key: key.to_string(),
            },
            Reply::into_pairs,
        )
    }
}
