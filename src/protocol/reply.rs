//! Reply definitions
//!
//! A raw reply from the store, plus the conversions the facade's truth
//! tables are built from. Conversions fail with a protocol error when the
//! reply has a shape the command never produces.

use bytes::Bytes;

use crate::error::{FacadeError, Result};

/// A raw store reply (RESP2)
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `+OK`, `+QUEUED`, ...
    Status(String),

    /// `-ERR ...`
    Error(String),

    /// `:42`
    Integer(i64),

    /// `$3\r\nfoo`, or nil as `$-1`
    Bulk(Option<Bytes>),

    /// `*2\r\n...`, or nil as `*-1`
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// Create an OK status reply
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    /// Create a QUEUED status reply
    pub fn queued() -> Self {
        Reply::Status("QUEUED".to_string())
    }

    /// Create a nil bulk reply
    pub fn nil() -> Self {
        Reply::Bulk(None)
    }

    /// Create a bulk reply from anything byte-like
    pub fn bulk(value: impl Into<Bytes>) -> Self {
        Reply::Bulk(Some(value.into()))
    }

    /// Create an array reply
    pub fn array(items: Vec<Reply>) -> Self {
        Reply::Array(Some(items))
    }

    /// Nil bulk or nil array (the store's "missing" / "false" sentinel)
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Bulk(None) | Reply::Array(None))
    }

    /// True for error replies
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Truthiness of a reply as a loosely typed client would see it
    ///
    /// Nil, errors, zero, empty and "0" are falsy; everything else is
    /// truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Reply::Status(_) => true,
            Reply::Error(_) => false,
            Reply::Integer(n) => *n != 0,
            Reply::Bulk(None) | Reply::Array(None) => false,
            Reply::Bulk(Some(b)) => !b.is_empty() && &b[..] != b"0",
            Reply::Array(Some(items)) => !items.is_empty(),
        }
    }

    /// Turn an error reply into `FacadeError::Server`
    pub fn into_result(self) -> Result<Reply> {
        match self {
            Reply::Error(message) => Err(FacadeError::Server(message)),
            other => Ok(other),
        }
    }

    // =========================================================================
    // Scalar conversions
    // =========================================================================

    /// OK status or a non-zero integer
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Reply::Status(_) => Ok(true),
            Reply::Integer(n) => Ok(n != 0),
            Reply::Bulk(None) | Reply::Array(None) => Ok(false),
            Reply::Bulk(Some(b)) => Ok(!b.is_empty() && &b[..] != b"0"),
            other => Err(unexpected("boolean", &other)),
        }
    }

    pub fn into_integer(self) -> Result<i64> {
        match self {
            Reply::Integer(n) => Ok(n),
            Reply::Bulk(Some(ref b)) => parse_text(b, "integer"),
            other => Err(unexpected("integer", &other)),
        }
    }

    /// Integer, or `None` for nil
    pub fn into_opt_integer(self) -> Result<Option<i64>> {
        if self.is_nil() {
            return Ok(None);
        }
        self.into_integer().map(Some)
    }

    /// Floats arrive as bulk strings
    pub fn into_float(self) -> Result<f64> {
        match self {
            Reply::Integer(n) => Ok(n as f64),
            Reply::Bulk(Some(ref b)) => parse_text(b, "float"),
            other => Err(unexpected("float", &other)),
        }
    }

    /// Float, or `None` for nil
    pub fn into_opt_float(self) -> Result<Option<f64>> {
        if self.is_nil() {
            return Ok(None);
        }
        self.into_float().map(Some)
    }

    /// Value bytes, or `None` for nil
    pub fn into_opt_bytes(self) -> Result<Option<Bytes>> {
        match self {
            Reply::Bulk(value) => Ok(value),
            Reply::Array(None) => Ok(None),
            Reply::Status(s) => Ok(Some(Bytes::from(s))),
            Reply::Integer(n) => Ok(Some(Bytes::from(n.to_string()))),
            other => Err(unexpected("bulk string", &other)),
        }
    }

    /// Value bytes, empty for nil
    pub fn into_bytes(self) -> Result<Bytes> {
        self.into_opt_bytes().map(Option::unwrap_or_default)
    }

    // =========================================================================
    // Sequence conversions
    // =========================================================================

    /// Array elements, empty for nil
    pub fn into_array(self) -> Result<Vec<Reply>> {
        match self {
            Reply::Array(Some(items)) => Ok(items),
            Reply::Array(None) | Reply::Bulk(None) => Ok(Vec::new()),
            other => Err(unexpected("array", &other)),
        }
    }

    /// Array of values; nil elements become empty values
    pub fn into_bytes_list(self) -> Result<Vec<Bytes>> {
        self.into_array()?.into_iter().map(Reply::into_bytes).collect()
    }

    /// Array of values keeping nil elements (MGET)
    pub fn into_opt_bytes_list(self) -> Result<Vec<Option<Bytes>>> {
        self.into_array()?
            .into_iter()
            .map(Reply::into_opt_bytes)
            .collect()
    }

    /// Flat `[k1, v1, k2, v2, ...]` array folded into pairs
    pub fn into_pairs(self) -> Result<Vec<(Bytes, Bytes)>> {
        let items = self.into_array()?;
        if items.len() % 2 != 0 {
            return Err(FacadeError::Protocol(format!(
                "Expected an even number of elements, got {}",
                items.len()
            )));
        }

        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            pairs.push((k.into_bytes()?, v.into_bytes()?));
        }
        Ok(pairs)
    }

    /// Flat `[member, score, ...]` array folded into scored members
    pub fn into_scored(self) -> Result<Vec<(Bytes, f64)>> {
        self.into_pairs()?
            .into_iter()
            .map(|(member, score)| -> Result<(Bytes, f64)> {
                Ok((member, parse_text::<f64>(&score, "float")?))
            })
            .collect()
    }
}

fn parse_text<T: std::str::FromStr>(raw: &[u8], what: &str) -> Result<T> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .ok_or_else(|| {
            FacadeError::Protocol(format!(
                "Expected {} text, got {:?}",
                what,
                String::from_utf8_lossy(raw)
            ))
        })
}

fn unexpected(expected: &str, got: &Reply) -> FacadeError {
    FacadeError::Protocol(format!("Expected {} reply, got {:?}", expected, got))
}
