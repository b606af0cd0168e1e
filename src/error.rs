//! Error types for table, configuration, and text operations.

use thiserror::Error;

/// Returned by `AssociativeTable::try_insert` when the key is already present.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum InsertError {
    #[error("key already present in table")]
    DuplicateKey,
}

/// Returned by `try_reserve` when the requested size cannot be indexed.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReserveError {
    /// The bucket count needed for the request overflows `usize` or exceeds
    /// the maximum allocation size.
    #[error("capacity overflow while reserving table storage")]
    CapacityOverflow,
}

/// Rejected `TableConfig` parameters.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ConfigError {
    /// The maximum load factor must lie strictly between 0 and 1.
    #[error("max load factor {0} is outside (0, 1)")]
    InvalidLoadFactor(f64),
}

/// Errors constructing an `OwnedText`.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextError {
    #[error("text is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the longest valid UTF-8 prefix
        valid_up_to: usize,
    },
}
