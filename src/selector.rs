//! Element selection for compact vectors.
//!
//! A [`Selector`] picks a subset of a vector's elements. Every kind resolves
//! to an explicit list of in-bounds positions before any field is touched.

use std::ops::{Range, RangeFull};

use crate::error::CompactError;

/// Convert a possibly negative index into a position in `[0, len)`.
///
/// Negative indices count from the end.
pub fn normalize_index(index: isize, len: usize) -> Result<usize, CompactError> {
    let out_of_bounds = CompactError::IndexOutOfBounds { index, len };
    if index < 0 {
        let back = index.unsigned_abs();
        if back > len {
            return Err(out_of_bounds);
        }
        Ok(len - back)
    } else {
        let pos = index as usize;
        if pos >= len {
            return Err(out_of_bounds);
        }
        Ok(pos)
    }
}

/// A strided slice with optional bounds.
///
/// Bounds are normalized like sequence slicing in dynamic languages:
/// negative values count from the end and out-of-range bounds are clamped,
/// so a slice never fails on bounds. A step of zero is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slice {
    /// First position, inclusive. Defaults to the start (or end for negative steps).
    pub start: Option<isize>,
    /// Last position, exclusive. Defaults to the end (or start for negative steps).
    pub stop: Option<isize>,
    /// Stride. Defaults to 1.
    pub step: Option<isize>,
}

impl Slice {
    /// Create a slice.
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Slice { start, stop, step }
    }

    /// Positions selected from a sequence of `len` elements.
    pub fn indices(&self, len: usize) -> Result<Vec<usize>, CompactError> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(CompactError::UnsupportedSelector(
                "slice step cannot be zero".into(),
            ));
        }

        let len = len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };

        let start = self
            .start
            .map(clamp)
            .unwrap_or(if step < 0 { upper } else { lower });
        let stop = self
            .stop
            .map(clamp)
            .unwrap_or(if step < 0 { lower } else { upper });

        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(out)
    }
}

/// The kinds of selection accepted by
/// [`CompactVector::get_range`](crate::CompactVector::get_range).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single element; negative indices count from the end.
    Index(isize),
    /// A contiguous half-open range. Must lie within the vector.
    Range(Range<usize>),
    /// A strided slice with clamped bounds.
    Slice(Slice),
    /// An explicit list of indices, possibly negative or repeated.
    List(Vec<isize>),
    /// A boolean mask with one entry per element.
    Mask(Vec<bool>),
}

impl Selector {
    /// Resolve to in-bounds positions for a sequence of `len` elements.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, CompactError> {
        match self {
            Selector::Index(index) => Ok(vec![normalize_index(*index, len)?]),
            Selector::Range(range) => {
                if range.start > range.end {
                    return Err(CompactError::IndexOutOfBounds {
                        index: range.start as isize,
                        len,
                    });
                }
                if range.end > len {
                    return Err(CompactError::IndexOutOfBounds {
                        index: range.end as isize,
                        len,
                    });
                }
                Ok(range.clone().collect())
            }
            Selector::Slice(slice) => slice.indices(len),
            Selector::List(indices) => indices
                .iter()
                .map(|&i| normalize_index(i, len))
                .collect(),
            Selector::Mask(mask) => {
                if mask.len() != len {
                    return Err(CompactError::UnsupportedSelector(format!(
                        "mask of length {} for vector of length {}",
                        mask.len(),
                        len
                    )));
                }
                Ok(mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &keep)| keep.then_some(i))
                    .collect())
            }
        }
    }
}

impl From<isize> for Selector {
    fn from(index: isize) -> Self {
        Selector::Index(index)
    }
}

impl From<Range<usize>> for Selector {
    fn from(range: Range<usize>) -> Self {
        Selector::Range(range)
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::Slice(Slice::default())
    }
}

impl From<Slice> for Selector {
    fn from(slice: Slice) -> Self {
        Selector::Slice(slice)
    }
}

impl From<Vec<isize>> for Selector {
    fn from(indices: Vec<isize>) -> Self {
        Selector::List(indices)
    }
}

impl From<&[isize]> for Selector {
    fn from(indices: &[isize]) -> Self {
        Selector::List(indices.to_vec())
    }
}

impl<const N: usize> From<[isize; N]> for Selector {
    fn from(indices: [isize; N]) -> Self {
        Selector::List(indices.to_vec())
    }
}

impl From<Vec<bool>> for Selector {
    fn from(mask: Vec<bool>) -> Self {
        Selector::Mask(mask)
    }
}
