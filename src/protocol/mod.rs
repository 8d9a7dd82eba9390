//! Protocol Module
//!
//! Defines the wire protocol spoken with the store (RESP2).
//!
//! ## Request Format
//! ```text
//! ┌──────────────┬───────────────────────────────────────────┐
//! │ *<argc>\r\n  │  $<len>\r\n<arg>\r\n   (× argc)           │
//! └──────────────┴───────────────────────────────────────────┘
//! ```
//!
//! ## Reply Types
//! - `+` status        (`+OK`, `+QUEUED`)
//! - `-` error         (`-ERR unknown command`)
//! - `:` integer       (`:1`)
//! - `$` bulk string   (`$-1` is nil)
//! - `*` array         (`*-1` is nil)
//!
//! Commands are typed (`Command`); the session frames them with
//! `encode_command`, applying the configured key prefix.

mod codec;
mod command;
mod reply;

pub use codec::{
    decode_command, decode_reply, encode_args, encode_command, encode_reply, read_command,
    read_reply, write_command, write_reply, MAX_BULK_SIZE,
};
pub use command::{Command, InsertPosition, RangeLimit};
pub use reply::Reply;
