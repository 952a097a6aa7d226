//! # compact-float-rs
//!
//! Memory-compact storage for large sequences of floating-point values.
//!
//! ## Overview
//!
//! Many real-world series (sensor readings, prices, time-series exports) only
//! carry a few meaningful decimal digits, yet are held as 8-byte `f64`s.
//! A [`CompactVector`] instead splits every value into three fixed-width
//! unsigned fields:
//!
//! 1. **Sign**: `0` negative, `1` non-negative, `2` NaN
//! 2. **Integer part**: `floor(|v|)`
//! 3. **Fractional part**: the fraction rounded to `P` digits, scaled by `10^P`
//!
//! All three fields share one width `W` of 8, 16, 32 or 64 bits. Values whose
//! integer part does not fit are rejected with [`CompactError::Capacity`];
//! nothing is silently truncated.
//!
//! ## Quick Start
//!
//! ```rust
//! use compact_float_rs::{CompactVector, DecodeMode, FieldWidth, Selection};
//!
//! // Two decimal digits in 16-bit fields
//! let mut vector = CompactVector::new(2, FieldWidth::W16).unwrap();
//! vector.create(5).unwrap();
//! vector.fill_from_slice(&[-12.56, 0.01, 98.43, -42.0, 0.99]).unwrap();
//!
//! // Scalar access, negative indices count from the end
//! assert_eq!(vector.get(-2).unwrap(), -42.0);
//!
//! // Eager selection decodes immediately
//! let values = vector.get_range([0isize, 1, 2]).unwrap().into_values().unwrap();
//! assert_eq!(values.len(), 3);
//!
//! // Lazy selection keeps the fields compact
//! vector.set_decode_mode(DecodeMode::Lazy);
//! assert!(matches!(vector.get_range(1usize..4).unwrap(), Selection::Compact(_)));
//!
//! vector.destroy();
//! assert!(vector.get(0).is_err());
//! ```
//!
//! ## Choosing a Width
//!
//! The width must hold both the largest integer part and `10^P - 1`:
//!
//! | Width | Max precision | Max integer part |
//! |-------|---------------|------------------|
//! | 8 | 2 | 255 |
//! | 16 | 4 | 65 535 |
//! | 32 | 9 | 4 294 967 295 |
//! | 64 | 19 | 2^64 - 1 |
//!
//! [`CompactVector::from_values_auto`] and [`planner::plan`] pick the
//! narrowest width for a data set.
//!
//! ## Memory Footprint
//!
//! The footprint depends only on length and width:
//! `3 * ceil(N * W / 8) + METADATA_OVERHEAD` bytes (see [`size`]). An 8-bit
//! vector takes a little over 3/8 of the native `f64` size.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bitpack;
mod codec;
mod error;
mod ingest;
pub mod planner;
pub mod selector;
mod sequence;
pub mod size;
mod vector;

pub use codec::{EncodedValue, FieldCodec, Sign, NAN_SENTINEL};
pub use error::CompactError;
pub use ingest::{TextSource, DEFAULT_COLUMN, DEFAULT_DELIMITER};
pub use planner::{FieldWidth, WidthPlan};
pub use selector::{Selector, Slice};
pub use sequence::{ElementType, NumericSequence, Series};
pub use size::{VectorMetadata, METADATA_OVERHEAD};
pub use vector::{CompactVector, DecodeMode, Iter, Selection, PROGRESS_INTERVAL};

/// Convenience type alias for Results with CompactError.
pub type Result<T> = std::result::Result<T, CompactError>;
