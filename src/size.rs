//! Memory footprint accounting.
//!
//! The footprint of a compact vector depends only on its length and field
//! width, never on the stored values, so it can be computed before a single
//! value has been encoded.

use crate::planner::FieldWidth;

/// Number of fields per vector (sign, integer, fractional).
pub const FIELD_COUNT: usize = 3;

/// Fixed bytes of metadata carried by every vector: length (8), precision
/// (4), field width (4), decode mode (4) and lifecycle state (4).
pub const METADATA_OVERHEAD: usize = 24;

/// Bytes needed by one field of `len` slots: `ceil(len * width / 8)`.
#[inline]
pub fn bytes_per_field(len: usize, width: FieldWidth) -> usize {
    (len * width.bits() as usize).div_ceil(8)
}

/// Total footprint of a vector with `len` elements in `width`-bit fields.
///
/// # Example
/// ```
/// use compact_float_rs::{size::{footprint, METADATA_OVERHEAD}, FieldWidth};
///
/// assert_eq!(footprint(1000, FieldWidth::W16), 2000 * 3 + METADATA_OVERHEAD);
/// ```
#[inline]
pub fn footprint(len: usize, width: FieldWidth) -> usize {
    FIELD_COUNT * bytes_per_field(len, width) + METADATA_OVERHEAD
}

/// Summary of a vector's layout and memory use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorMetadata {
    /// Number of elements.
    pub len: usize,
    /// Decimal digits retained.
    pub precision: u32,
    /// Width of every field slot.
    pub width: FieldWidth,
    /// Footprint in bytes, metadata included.
    pub total_bytes: usize,
}

impl VectorMetadata {
    /// Describe a vector of `len` elements.
    pub fn new(len: usize, precision: u32, width: FieldWidth) -> Self {
        VectorMetadata {
            len,
            precision,
            width,
            total_bytes: footprint(len, width),
        }
    }

    /// Bytes the same values would take as native `f64` storage.
    pub fn native_bytes(&self) -> usize {
        self.len * std::mem::size_of::<f64>()
    }

    /// Compression ratio (compact size / native size).
    pub fn compression_ratio(&self) -> f64 {
        let native = self.native_bytes();
        if native == 0 {
            return 0.0;
        }
        self.total_bytes as f64 / native as f64
    }
}
