//! Sets

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Command, Reply};
use crate::session::StoreSession;

use super::{is_one, owned, to_bool, to_bytes, to_int, Facade};

impl<S: StoreSession> Facade<S> {
    /// `true` iff `member` was newly added
    pub fn s_add(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::SAdd {
                key: key.to_string(),
                member: to_bytes(member),
            },
            is_one,
        )
    }

    /// `true` iff `member` was removed
    pub fn s_rem(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::SRem {
                key: key.to_string(),
                member: to_bytes(member),
            },
            is_one,
        )
    }

    pub fn s_card(&mut self, key: &str) -> Result<i64> {
        self.dispatch(
            Command::SCard {
                key: key.to_string(),
            },
            to_int,
        )
    }

    /// Members of the first set absent from all the others
    pub fn s_diff(&mut self, keys: &[&str]) -> Result<Vec<Bytes>> {
        self.dispatch(Command::SDiff { keys: owned(keys) }, Reply::into_bytes_list)
    }

    pub fn s_inter(&mut self, keys: &[&str]) -> Result<Vec<Bytes>> {
        self.dispatch(Command::SInter { keys: owned(keys) }, Reply::into_bytes_list)
    }

    pub fn s_union(&mut self, keys: &[&str]) -> Result<Vec<Bytes>> {
        self.dispatch(Command::SUnion { keys: owned(keys) }, Reply::into_bytes_list)
    }

    pub fn s_is_member(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<bool> {
        self.dispatch(
            Command::SIsMember {
                key: key.to_string(),
                member: to_bytes(member),
            },
            to_bool,
        )
    }

    pub fn s_members(&mut self, key: &str) -> Result<Vec<Bytes>> {
        self.dispatch(
            Command::SMembers {
                key: key.to_string(),
            },
            Reply::into_bytes_list,
        )
    }
}
