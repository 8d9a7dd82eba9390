//! Protocol codec
//!
//! Encoding and decoding functions for the RESP2 wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! Every request is an array of bulk strings:
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<arg bytes>\r\n     (repeated argc times)
//! ```
//!
//! ### Reply Format
//! ```text
//! +<status>\r\n                 status
//! -<message>\r\n                error
//! :<integer>\r\n                integer
//! $<len>\r\n<bytes>\r\n         bulk string ($-1 = nil)
//! *<count>\r\n<replies...>      array (*-1 = nil)
//! ```

use std::io::{BufRead, Cursor, ErrorKind, Read, Write};

use bytes::BytesMut;

use super::{Command, Reply};
use crate::error::{FacadeError, Result};

/// Maximum bulk string size (512 MB, the store's own default)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum number of elements in one array reply
pub const MAX_ARRAY_LEN: usize = 16 * 1024 * 1024;

/// Maximum length of a single header/status line
pub const MAX_LINE_LEN: usize = 64 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a raw argument vector as a request frame
pub fn encode_args(args: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = args.iter().map(|a| a.len() + 16).sum();
    let mut message = Vec::with_capacity(16 + payload_len);

    message.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        message.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        message.extend_from_slice(arg);
        message.extend_from_slice(b"\r\n");
    }

    message
}

/// Encode a command, prefixing its key arguments
pub fn encode_command(command: &Command, prefix: &str) -> Vec<u8> {
    encode_args(&command.to_args(prefix))
}

/// Decode a request frame into its argument vector
///
/// Returns the arguments and the number of bytes consumed
pub fn decode_command(bytes: &[u8]) -> Result<(Vec<Vec<u8>>, usize)> {
    let mut cursor = Cursor::new(bytes);
    let args = read_command(&mut cursor).map_err(incomplete_as_protocol)?;
    Ok((args, cursor.position() as usize))
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply to bytes
pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    let mut message = Vec::new();
    encode_reply_into(reply, &mut message);
    message
}

fn encode_reply_into(reply: &Reply, out: &mut Vec<u8>) {
    match reply {
        Reply::Status(s) => out.extend_from_slice(format!("+{}\r\n", s).as_bytes()),
        Reply::Error(s) => out.extend_from_slice(format!("-{}\r\n", s).as_bytes()),
        Reply::Integer(n) => out.extend_from_slice(format!(":{}\r\n", n).as_bytes()),
        Reply::Bulk(None) => out.extend_from_slice(b"$-1\r\n"),
        Reply::Bulk(Some(data)) => {
            out.extend_from_slice(format!("${}\r\n", data.len()).as_bytes());
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        Reply::Array(None) => out.extend_from_slice(b"*-1\r\n"),
        Reply::Array(Some(items)) => {
            out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
            for item in items {
                encode_reply_into(item, out);
            }
        }
    }
}

/// Decode one reply from bytes
///
/// Returns the reply and the number of bytes consumed
pub fn decode_reply(bytes: &[u8]) -> Result<(Reply, usize)> {
    let mut cursor = Cursor::new(bytes);
    let reply = read_reply(&mut cursor).map_err(incomplete_as_protocol)?;
    Ok((reply, cursor.position() as usize))
}

fn incomplete_as_protocol(err: FacadeError) -> FacadeError {
    match err {
        FacadeError::Io(ref e) if e.kind() == ErrorKind::UnexpectedEof => {
            FacadeError::Protocol("Incomplete frame".to_string())
        }
        other => other,
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete reply from a stream
///
/// Blocks until a complete reply is received or an error occurs. A
/// stream that ends mid-frame yields an `UnexpectedEof` I/O error.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let line = read_line(reader)?;
    let (marker, body) = line
        .split_first()
        .ok_or_else(|| FacadeError::Protocol("Empty reply line".to_string()))?;

    match *marker {
        b'+' => Ok(Reply::Status(String::from_utf8_lossy(body).into_owned())),
        b'-' => Ok(Reply::Error(String::from_utf8_lossy(body).into_owned())),
        b':' => Ok(Reply::Integer(parse_int(body)?)),
        b'$' => {
            let len = parse_int(body)?;
            if len < 0 {
                return Ok(Reply::Bulk(None));
            }
            let len = len as usize;
            if len > MAX_BULK_SIZE {
                return Err(FacadeError::Protocol(format!(
                    "Bulk string too large: {} bytes (max {})",
                    len, MAX_BULK_SIZE
                )));
            }

            // Payload plus trailing CRLF
            let mut payload = BytesMut::zeroed(len + 2);
            reader.read_exact(&mut payload)?;
            if &payload[len..] != b"\r\n" {
                return Err(FacadeError::Protocol(
                    "Bulk string not terminated by CRLF".to_string(),
                ));
            }
            payload.truncate(len);
            Ok(Reply::Bulk(Some(payload.freeze())))
        }
        b'*' => {
            let count = parse_int(body)?;
            if count < 0 {
                return Ok(Reply::Array(None));
            }
            let count = count as usize;
            if count > MAX_ARRAY_LEN {
                return Err(FacadeError::Protocol(format!(
                    "Array too large: {} elements (max {})",
                    count, MAX_ARRAY_LEN
                )));
            }

            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(read_reply(reader)?);
            }
            Ok(Reply::Array(Some(items)))
        }
        other => Err(FacadeError::Protocol(format!(
            "Unknown reply type: 0x{:02x}",
            other
        ))),
    }
}

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    writer.write_all(&encode_reply(reply))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete request frame from a stream
pub fn read_command<R: BufRead>(reader: &mut R) -> Result<Vec<Vec<u8>>> {
    match read_reply(reader)? {
        Reply::Array(Some(items)) => items
            .into_iter()
            .map(|item| match item {
                Reply::Bulk(Some(arg)) => Ok(arg.to_vec()),
                other => Err(FacadeError::Protocol(format!(
                    "Request arguments must be bulk strings, got {:?}",
                    other
                ))),
            })
            .collect(),
        other => Err(FacadeError::Protocol(format!(
            "Request must be an array, got {:?}",
            other
        ))),
    }
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command, prefix: &str) -> Result<()> {
    writer.write_all(&encode_command(command, prefix))?;
    writer.flush()?;
    Ok(())
}

/// Read one CRLF-terminated line, without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut line)?;

    if read == 0 {
        return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
    }
    if !line.ends_with(b"\r\n") {
        if line.len() >= MAX_LINE_LEN {
            return Err(FacadeError::Protocol(format!(
                "Reply line exceeds {} bytes",
                MAX_LINE_LEN
            )));
        }
        return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
    }

    line.truncate(line.len() - 2);
    Ok(line)
}

fn parse_int(body: &[u8]) -> Result<i64> {
    std::str::from_utf8(body)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            FacadeError::Protocol(format!(
                "Invalid integer: {:?}",
                String::from_utf8_lossy(body)
            ))
        })
}

