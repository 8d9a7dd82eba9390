//! Placeholder results
//!
//! While a batch is open a command's real reply is not known yet, so the
//! facade answers with a success-shaped default instead. The value only
//! depends on the result type, never on the batch kind.

use bytes::Bytes;

/// A result type with a batch-mode placeholder
pub trait Placeholder {
    fn placeholder() -> Self;
}

impl Placeholder for () {
    fn placeholder() -> Self {}
}

impl Placeholder for bool {
    fn placeholder() -> Self {
        true
    }
}

impl Placeholder for i64 {
    fn placeholder() -> Self {
        0
    }
}

impl Placeholder for f64 {
    fn placeholder() -> Self {
        0.0
    }
}

impl Placeholder for Bytes {
    fn placeholder() -> Self {
        Bytes::new()
    }
}

impl<T> Placeholder for Vec<T> {
    fn placeholder() -> Self {
        Vec::new()
    }
}

/// Nullable results are present-but-empty while batching
impl<T: Placeholder> Placeholder for Option<T> {
    fn placeholder() -> Self {
        Some(T::placeholder())
    }
}
