//! Error types for compact vector operations.

use thiserror::Error;

/// Errors that can occur while building, reading or mutating a compact vector.
#[derive(Debug, Error)]
pub enum CompactError {
    /// Invalid precision value (must be >= 0).
    #[error("invalid precision: {0} (must be >= 0)")]
    InvalidPrecision(i32),

    /// The requested field width is not one of the supported widths.
    #[error("invalid field width: {0} (must be one of 8, 16, 32, 64)")]
    InvalidFieldWidth(u32),

    /// The field width cannot hold the requested number of decimal digits.
    #[error("precision {precision} does not fit in a {width}-bit field")]
    PrecisionExceedsWidth {
        /// Requested number of decimal digits.
        precision: u32,
        /// Configured field width in bits.
        width: u32,
    },

    /// The input data is empty.
    #[error("input data is empty")]
    EmptyInput,

    /// The vector has been constructed but `create` was never called.
    #[error("vector fields have not been created")]
    NotCreated,

    /// The vector was destroyed and can no longer be accessed.
    #[error("vector has been destroyed")]
    Destroyed,

    /// A value cannot be encoded within the configured field width.
    #[error("value {value} cannot be encoded in a {width}-bit field")]
    Capacity {
        /// The value that failed to encode.
        value: f64,
        /// Configured field width in bits.
        width: u32,
    },

    /// An index or range fell outside the vector after normalization.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The offending index, as supplied by the caller.
        index: isize,
        /// The length it was checked against.
        len: usize,
    },

    /// The selector cannot be applied to this vector.
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// Buffer overflow during bit packing operations.
    #[error("buffer overflow: attempted to access {attempted} bits, only {available} available")]
    BufferOverflow {
        /// The number of bits that were attempted to be read or written.
        attempted: usize,
        /// The number of bits available in the buffer.
        available: usize,
    },

    /// The bit width exceeds the maximum supported (64 bits).
    #[error("bit width {0} exceeds maximum of 64")]
    BitWidthExceeded(usize),

    /// Reading a text source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompactError {
    /// Returns `true` for errors caused by using a vector in the wrong lifecycle state.
    pub fn is_state_error(&self) -> bool {
        matches!(self, CompactError::NotCreated | CompactError::Destroyed)
    }

    /// Returns `true` for errors raised while validating construction parameters.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            CompactError::InvalidPrecision(_)
                | CompactError::InvalidFieldWidth(_)
                | CompactError::PrecisionExceedsWidth { .. }
        )
    }
}
