//! Lists

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Command, InsertPosition, Reply};
use crate::session::StoreSession;

use super::{not_nil, to_bool, to_bytes, to_int, to_int_or_zero, Facade};

impl<S: StoreSession> Facade<S> {
    /// Element at `index`, `None` when out of range
    pub fn l_index(&mut self, key: &str, index: i64) -> Result<Option<Bytes>> {
        self.dispatch(
            Command::LIndex {
                key: key.to_string(),
                index,
            },
            Reply::into_opt_bytes,
        )
    }

    /// `true` unless `pivot` was not found
    pub fn l_insert(
        &mut self,
        key: &str,
        position: InsertPosition,
        pivot: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<bool> {
        self.dispatch(
            Command::LInsert {
                key: key.to_string(),
                position,
                pivot: to_bytes(pivot),
                value: to_bytes(value),
            },
            |reply| Ok(reply.into_integer()? != -1),
        )
    }

    pub fn l_len(&mut self, key: &str) -> Result<i64> {
        self.dispatch(
            Command::LLen {
                key: key.to_string(),
            },
            to_int,
        )
    }

    /// Remove and return the head, `None` when empty
    pub fn l_pop(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.dispatch(
            Command::LPop {
                key: key.to_string(),
            },
            Reply::into_opt_bytes,
        )
    }

    pub fn l_push(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::LPush {
                key: key.to_string(),
                value: to_bytes(value),
            },
            not_nil,
        )
    }

    /// LPUSHX: push only onto an existing list
    pub fn l_push_nx(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::LPushX {
                key: key.to_string(),
                value: to_bytes(value),
            },
            not_nil,
        )
    }

    pub fn l_range(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.dispatch(
            Command::LRange {
                key: key.to_string(),
                start,
                stop,
            },
            Reply::into_bytes_list,
        )
    }

    /// Remove up to `count` occurrences of `value` (0 = all, negative =
    /// from the tail); number removed
    pub fn l_rem(&mut self, key: &str, value: impl AsRef<[u8]>, count: i64) -> Result<i64> {
        self.dispatch(
            Command::LRem {
                key: key.to_string(),
                value: to_bytes(value),
                count,
            },
            to_int_or_zero,
        )
    }

    pub fn l_set(&mut self, key: &str, index: i64, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::LSet {
                key: key.to_string(),
                index,
                value: to_bytes(value),
            },
            to_bool,
        )
    }

    /// Keep only the elements in `start..=stop`
    pub fn l_trim(&mut self, key: &str, start: i64, stop: i64) -> Result<bool> {
        self.dispatch(
            Command::LTrim {
                key: key.to_string(),
                start,
                stop,
            },
            to_bool,
        )
    }

    /// Remove and return the tail, `None` when empty
    pub fn r_pop(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.dispatch(
            Command::RPop {
                key: key.to_string(),
            },
            Reply::into_opt_bytes,
        )
    }

    pub fn r_push(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::RPush {
                key: key.to_string(),
                value: to_bytes(value),
            },
            not_nil,
        )
    }

    /// RPUSHX: push only onto an existing list
    pub fn r_push_nx(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::RPushX {
                key: key.to_string(),
                value: to_bytes(value),
            },
            not_nil,
        )
    }
}
