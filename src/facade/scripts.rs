//! Server-side scripts
//!
//! Scripts are invoked by the SHA-1 of their body (EVALSHA), so the body
//! text is part of the contract: changing it changes the hash.

use std::fmt;

use sha1::{Digest, Sha1};

use crate::config::to_hex;

/// A script registered with the store
#[derive(Debug, Clone, Copy)]
pub struct Script {
    pub name: &'static str,
    pub body: &'static str,
}

impl Script {
    /// Lowercase hex SHA-1 of the body, as EVALSHA expects it
    pub fn sha1(&self) -> String {
        to_hex(&Sha1::digest(self.body.as_bytes()))
    }
}

/// Conditional ZADD
///
/// KEYS[1] = sorted set, ARGV = mode, score, member. `XX` only updates
/// members that already exist, `NX` only adds new ones. Returns false
/// (nil) when the condition fails.
pub const ZADD_XX_NX: Script = Script {
    name: "zadd_xx_nx",
    body: r#"local current = redis.call('ZSCORE', KEYS[1], ARGV[3])
if ARGV[1] == 'XX' then
    if not current then return false end
elseif ARGV[1] == 'NX' then
    if current then return false end
else
    return redis.error_reply('ERR zadd mode must be XX or NX')
end
redis.call('ZADD', KEYS[1], ARGV[2], ARGV[3])
return 1
"#,
};

/// Every script loaded on connect
pub const SCRIPTS: [Script; 1] = [ZADD_XX_NX];

/// Condition for `z_add_mod`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZAddMode {
    /// Only update existing members
    Xx,

    /// Only add new members
    Nx,
}

impl ZAddMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ZAddMode::Xx => "XX",
            ZAddMode::Nx => "NX",
        }
    }
}

impl fmt::Display for ZAddMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
