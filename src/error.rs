//! Error definitions.
use thiserror::Error;

/// Errors reported by table construction and keyed lookups.
///
/// Membership tests never fail; they answer with a `bool`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// A negative size hint was passed at construction. The table is not built.
    #[error("invalid size hint {0}: must not be negative")]
    InvalidSize(isize),
    /// No stored element is equal to the probe value.
    #[error("value not found")]
    NotFound,
}
