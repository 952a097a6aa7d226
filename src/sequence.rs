//! A common read interface over plain and compact float sequences.
//!
//! Downstream code written against [`NumericSequence`] works the same whether
//! it is handed a `Vec<f64>` or a [`CompactVector`]. [`Series`] holds either
//! one when the choice is made at runtime.

use crate::error::CompactError;
use crate::vector::CompactVector;

/// Element type reported by a numeric sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 64-bit IEEE 754 float.
    Float64,
}

impl ElementType {
    /// Size of one decoded element in bytes.
    pub fn size_of(self) -> usize {
        match self {
            ElementType::Float64 => std::mem::size_of::<f64>(),
        }
    }
}

/// Read access to a one-dimensional sequence of floats.
pub trait NumericSequence {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`. Negative indices count from the end.
    fn value_at(&self, index: isize) -> Result<f64, CompactError>;

    /// Iterate over all values in order.
    fn values(&self) -> Result<Box<dyn Iterator<Item = f64> + '_>, CompactError>;

    /// Element type of the decoded values.
    fn dtype(&self) -> ElementType {
        ElementType::Float64
    }

    /// Dimensions. Always one-dimensional.
    fn shape(&self) -> (usize,) {
        (self.len(),)
    }

    /// Total number of elements.
    fn size(&self) -> usize {
        self.len()
    }

    /// Whether the decoded values sit contiguously in memory.
    fn is_contiguous(&self) -> bool;
}

impl NumericSequence for [f64] {
    fn len(&self) -> usize {
        <[f64]>::len(self)
    }

    fn value_at(&self, index: isize) -> Result<f64, CompactError> {
        let pos = crate::selector::normalize_index(index, <[f64]>::len(self))?;
        Ok(self[pos])
    }

    fn values(&self) -> Result<Box<dyn Iterator<Item = f64> + '_>, CompactError> {
        Ok(Box::new(self.iter().copied()))
    }

    fn is_contiguous(&self) -> bool {
        true
    }
}

impl NumericSequence for Vec<f64> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn value_at(&self, index: isize) -> Result<f64, CompactError> {
        self.as_slice().value_at(index)
    }

    fn values(&self) -> Result<Box<dyn Iterator<Item = f64> + '_>, CompactError> {
        self.as_slice().values()
    }

    fn is_contiguous(&self) -> bool {
        true
    }
}

impl NumericSequence for CompactVector {
    fn len(&self) -> usize {
        CompactVector::len(self)
    }

    fn value_at(&self, index: isize) -> Result<f64, CompactError> {
        self.get(index)
    }

    fn values(&self) -> Result<Box<dyn Iterator<Item = f64> + '_>, CompactError> {
        Ok(Box::new(self.iter()?))
    }

    fn is_contiguous(&self) -> bool {
        false
    }
}

/// A float sequence in either plain or compact storage.
///
/// # Example
/// ```
/// use compact_float_rs::{CompactVector, FieldWidth, NumericSequence, Series};
///
/// let plain = Series::from(vec![1.5, 2.5]);
/// let compact = Series::from(CompactVector::from_values(&[1.5, 2.5], 1, FieldWidth::W8).unwrap());
///
/// assert_eq!(plain.shape(), compact.shape());
/// assert!(plain.is_contiguous());
/// assert!(!compact.is_contiguous());
/// assert_eq!(compact.value_at(-1).unwrap(), 2.5);
/// ```
#[derive(Debug, Clone)]
pub enum Series {
    /// Native `f64` storage.
    Plain(Vec<f64>),
    /// Compact field storage.
    Compact(CompactVector),
}

impl Series {
    fn inner(&self) -> &dyn NumericSequence {
        match self {
            Series::Plain(values) => values,
            Series::Compact(vector) => vector,
        }
    }

    /// Whether this series uses compact storage.
    pub fn is_compact(&self) -> bool {
        matches!(self, Series::Compact(_))
    }

    /// Decode into native storage.
    pub fn to_vec(&self) -> Result<Vec<f64>, CompactError> {
        match self {
            Series::Plain(values) => Ok(values.clone()),
            Series::Compact(vector) => vector.to_vec(),
        }
    }
}

impl NumericSequence for Series {
    fn len(&self) -> usize {
        self.inner().len()
    }

    fn value_at(&self, index: isize) -> Result<f64, CompactError> {
        self.inner().value_at(index)
    }

    fn values(&self) -> Result<Box<dyn Iterator<Item = f64> + '_>, CompactError> {
        self.inner().values()
    }

    fn is_contiguous(&self) -> bool {
        self.inner().is_contiguous()
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Series::Plain(values)
    }
}

impl From<CompactVector> for Series {
    fn from(vector: CompactVector) -> Self {
        Series::Compact(vector)
    }
}
