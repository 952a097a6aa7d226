//! The compact vector: three fixed-width integer fields standing in for `f64` storage.
//!
//! A [`CompactVector`] goes through an explicit lifecycle:
//!
//! 1. **Construct** with a precision and field width ([`CompactVector::new`]).
//! 2. **Create** the fields for `N` elements ([`CompactVector::create`]).
//! 3. **Fill** them from a slice ([`CompactVector::fill_from_sequence`]) or a
//!    delimited text file ([`CompactVector::fill_from_text_records`]), or
//!    element by element with [`CompactVector::set`].
//! 4. **Read** with [`get`](CompactVector::get),
//!    [`get_range`](CompactVector::get_range) and
//!    [`iter`](CompactVector::iter).
//! 5. **Destroy** ([`CompactVector::destroy`]). Every later access fails with
//!    [`CompactError::Destroyed`].
//!
//! ## Decode modes
//!
//! Range selection either decodes to a plain `Vec<f64>` ([`DecodeMode::Eager`])
//! or copies the selected raw fields into a new compact vector
//! ([`DecodeMode::Lazy`]), so chained selections never expand to `f64`.

use std::iter::FusedIterator;

use tracing::debug;

use crate::bitpack::PackedField;
use crate::codec::{EncodedValue, FieldCodec, Sign};
use crate::error::CompactError;
use crate::planner::{plan, FieldWidth};
use crate::selector::{normalize_index, Selector};
use crate::size::{footprint, VectorMetadata};

/// How often bulk fills report progress, in elements.
pub const PROGRESS_INTERVAL: usize = 65_536;

/// What [`CompactVector::get_range`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Decode selected elements to `f64` immediately.
    #[default]
    Eager,
    /// Return a new compact vector holding the selected raw fields.
    Lazy,
}

/// The result of a range selection.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Decoded values (eager mode).
    Decoded(Vec<f64>),
    /// Selected fields, still encoded (lazy mode).
    Compact(CompactVector),
}

impl Selection {
    /// Number of selected elements.
    pub fn len(&self) -> usize {
        match self {
            Selection::Decoded(values) => values.len(),
            Selection::Compact(vector) => vector.len(),
        }
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode the selection into plain values.
    pub fn into_values(self) -> Result<Vec<f64>, CompactError> {
        match self {
            Selection::Decoded(values) => Ok(values),
            Selection::Compact(vector) => vector.to_vec(),
        }
    }

    /// The compact vector, if this selection was made in lazy mode.
    pub fn into_compact(self) -> Option<CompactVector> {
        match self {
            Selection::Compact(vector) => Some(vector),
            Selection::Decoded(_) => None,
        }
    }
}

/// The three parallel fields. Always the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fields {
    sign: PackedField,
    integer: PackedField,
    fractional: PackedField,
}

impl Fields {
    fn zeroed(width: FieldWidth, len: usize) -> Self {
        Fields {
            sign: PackedField::zeroed(width, len),
            integer: PackedField::zeroed(width, len),
            fractional: PackedField::zeroed(width, len),
        }
    }

    fn with_capacity(width: FieldWidth, capacity: usize) -> Self {
        Fields {
            sign: PackedField::with_capacity(width, capacity),
            integer: PackedField::with_capacity(width, capacity),
            fractional: PackedField::with_capacity(width, capacity),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.sign.len()
    }

    fn byte_len(&self) -> usize {
        self.sign.byte_len() + self.integer.byte_len() + self.fractional.byte_len()
    }

    #[inline]
    fn read(&self, index: usize) -> Option<(u64, u64, u64)> {
        Some((
            self.sign.get(index)?,
            self.integer.get(index)?,
            self.fractional.get(index)?,
        ))
    }

    fn write(&mut self, index: usize, encoded: EncodedValue) -> Result<(), CompactError> {
        self.sign.set(index, encoded.sign.to_raw())?;
        self.integer.set(index, encoded.integer)?;
        self.fractional.set(index, encoded.fractional)
    }

    fn push(&mut self, encoded: EncodedValue) -> Result<(), CompactError> {
        self.sign.push(encoded.sign.to_raw())?;
        self.integer.push(encoded.integer)?;
        self.fractional.push(encoded.fractional)
    }

    fn gather(&self, indices: &[usize]) -> Option<Fields> {
        Some(Fields {
            sign: self.sign.gather(indices)?,
            integer: self.integer.gather(indices)?,
            fractional: self.fractional.gather(indices)?,
        })
    }
}

#[derive(Debug, Clone)]
enum State {
    Constructed,
    Created(Fields),
    Destroyed,
}

/// A sequence of floats stored as fixed-width (sign, integer, fractional) fields.
///
/// # Example
/// ```
/// use compact_float_rs::{CompactVector, FieldWidth};
///
/// let mut vector = CompactVector::new(2, FieldWidth::W16).unwrap();
/// vector.create(3).unwrap();
/// vector.fill_from_slice(&[-12.56, 0.01, 98.43]).unwrap();
///
/// assert_eq!(vector.len(), 3);
/// assert!((vector.get(-1).unwrap() - 98.43).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct CompactVector {
    codec: FieldCodec,
    mode: DecodeMode,
    state: State,
}

impl CompactVector {
    /// Construct an empty vector retaining `precision` decimal digits in
    /// `width`-bit fields.
    ///
    /// Fails with a construction error if `precision` is negative or does
    /// not fit the width. Fields are allocated later by [`create`](Self::create).
    pub fn new(precision: i32, width: FieldWidth) -> Result<Self, CompactError> {
        Ok(CompactVector {
            codec: FieldCodec::new(precision, width)?,
            mode: DecodeMode::default(),
            state: State::Constructed,
        })
    }

    /// Like [`new`](Self::new), with the width given in bits (8, 16, 32 or 64).
    pub fn with_field_bits(precision: i32, bits: u32) -> Result<Self, CompactError> {
        Self::new(precision, FieldWidth::from_bits(bits)?)
    }

    /// Construct, create and fill a vector from `values` in one step.
    pub fn from_values(
        values: &[f64],
        precision: i32,
        width: FieldWidth,
    ) -> Result<Self, CompactError> {
        let mut vector = Self::new(precision, width)?;
        vector.create(values.len())?;
        vector.fill_from_slice(values)?;
        Ok(vector)
    }

    /// Build a vector from `values`, choosing the narrowest field width that
    /// holds every value.
    ///
    /// With `precision: None` the precision is detected from the data.
    ///
    /// # Example
    /// ```
    /// use compact_float_rs::{CompactVector, FieldWidth};
    ///
    /// let vector = CompactVector::from_values_auto(&[1.5, -300.25, 7.0], None).unwrap();
    /// assert_eq!(vector.precision(), 2);
    /// assert_eq!(vector.width(), FieldWidth::W16);
    /// ```
    pub fn from_values_auto(values: &[f64], precision: Option<u32>) -> Result<Self, CompactError> {
        let plan = plan(values, precision)?;
        debug!(
            precision = plan.precision,
            integer_bits = plan.integer_bits,
            fractional_bits = plan.fractional_bits,
            width = plan.width.bits(),
            "planned field widths"
        );
        Self::from_values(values, plan.precision as i32, plan.width)
    }

    /// Set the decode mode, builder style.
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the decode mode used by [`get_range`](Self::get_range).
    pub fn set_decode_mode(&mut self, mode: DecodeMode) {
        self.mode = mode;
    }

    /// The current decode mode.
    pub fn decode_mode(&self) -> DecodeMode {
        self.mode
    }

    /// Decimal digits retained.
    pub fn precision(&self) -> u32 {
        self.codec.precision()
    }

    /// Width of every field slot.
    pub fn width(&self) -> FieldWidth {
        self.codec.width()
    }

    /// The codec used to encode and decode elements.
    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    /// Whether [`create`](Self::create) has been called and the vector is live.
    pub fn is_created(&self) -> bool {
        matches!(self.state, State::Created(_))
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, State::Destroyed)
    }

    fn fields(&self) -> Result<&Fields, CompactError> {
        match &self.state {
            State::Created(fields) => Ok(fields),
            State::Constructed => Err(CompactError::NotCreated),
            State::Destroyed => Err(CompactError::Destroyed),
        }
    }

    fn fields_mut(&mut self) -> Result<&mut Fields, CompactError> {
        match &mut self.state {
            State::Created(fields) => Ok(fields),
            State::Constructed => Err(CompactError::NotCreated),
            State::Destroyed => Err(CompactError::Destroyed),
        }
    }

    /// Install freshly built fields, replacing any existing ones.
    pub(crate) fn replace_fields_from(&mut self, other: CompactVector) -> Result<(), CompactError> {
        if self.is_destroyed() {
            return Err(CompactError::Destroyed);
        }
        debug_assert_eq!(self.codec, other.codec);
        self.state = other.state;
        Ok(())
    }

    /// A created, empty vector with room for `capacity` pushes.
    pub(crate) fn growable(codec: FieldCodec, capacity: usize) -> Self {
        CompactVector {
            codec,
            mode: DecodeMode::default(),
            state: State::Created(Fields::with_capacity(codec.width(), capacity)),
        }
    }

    /// Append one value. Only used while building a vector.
    pub(crate) fn push(&mut self, value: f64) -> Result<(), CompactError> {
        let encoded = self.codec.encode(value)?;
        self.fields_mut()?.push(encoded)
    }

    /// Allocate three zero-initialized fields of `len` elements.
    ///
    /// Calling `create` again discards the existing contents. Fails with
    /// [`CompactError::Destroyed`] after [`destroy`](Self::destroy).
    pub fn create(&mut self, len: usize) -> Result<(), CompactError> {
        if self.is_destroyed() {
            return Err(CompactError::Destroyed);
        }
        self.state = State::Created(Fields::zeroed(self.width(), len));
        debug!(len, width = self.width().bits(), "created compact vector fields");
        Ok(())
    }

    /// Encode `source[start..end]` into the fields, starting at index 0.
    ///
    /// Returns the number of elements written. On a capacity error every
    /// element before the failing one has already been written and stays
    /// valid; the failing element and everything after it are untouched.
    pub fn fill_from_sequence(
        &mut self,
        source: &[f64],
        start: usize,
        end: usize,
    ) -> Result<usize, CompactError> {
        self.fill_from_sequence_with_progress(source, start, end, |_, _| {})
    }

    /// Encode all of `source` into the fields, starting at index 0.
    pub fn fill_from_slice(&mut self, source: &[f64]) -> Result<usize, CompactError> {
        self.fill_from_sequence(source, 0, source.len())
    }

    /// [`fill_from_sequence`](Self::fill_from_sequence), calling
    /// `progress(written, total)` every [`PROGRESS_INTERVAL`] elements and
    /// once at the end.
    pub fn fill_from_sequence_with_progress<F>(
        &mut self,
        source: &[f64],
        start: usize,
        end: usize,
        mut progress: F,
    ) -> Result<usize, CompactError>
    where
        F: FnMut(usize, usize),
    {
        let codec = self.codec;
        let fields = self.fields_mut()?;

        if start > end {
            return Err(CompactError::IndexOutOfBounds {
                index: start as isize,
                len: source.len(),
            });
        }
        if end > source.len() {
            return Err(CompactError::IndexOutOfBounds {
                index: end as isize,
                len: source.len(),
            });
        }
        let total = end - start;
        if total > fields.len() {
            return Err(CompactError::IndexOutOfBounds {
                index: total as isize,
                len: fields.len(),
            });
        }

        for (index, &value) in source[start..end].iter().enumerate() {
            let encoded = match codec.encode(value) {
                Ok(encoded) => encoded,
                Err(e) => {
                    debug!(index, value, "bulk fill stopped on unencodable value");
                    return Err(e);
                }
            };
            fields.write(index, encoded)?;

            let written = index + 1;
            if written % PROGRESS_INTERVAL == 0 {
                progress(written, total);
            }
        }
        progress(total, total);

        debug!(written = total, "filled compact vector from sequence");
        Ok(total)
    }

    /// Decode the element at `index`. Negative indices count from the end.
    pub fn get(&self, index: isize) -> Result<f64, CompactError> {
        let fields = self.fields()?;
        let pos = normalize_index(index, fields.len())?;
        let (sign, integer, fractional) = fields
            .read(pos)
            .ok_or(CompactError::IndexOutOfBounds {
                index,
                len: fields.len(),
            })?;
        Ok(self.codec.decode_raw(sign, integer, fractional))
    }

    /// The raw field triple stored at `index`.
    pub fn encoded_at(&self, index: isize) -> Result<EncodedValue, CompactError> {
        let fields = self.fields()?;
        let pos = normalize_index(index, fields.len())?;
        let out_of_bounds = CompactError::IndexOutOfBounds {
            index,
            len: fields.len(),
        };
        let (sign, integer, fractional) = fields.read(pos).ok_or(out_of_bounds)?;
        let sign = Sign::from_raw(sign).unwrap_or(Sign::Negative);
        Ok(EncodedValue {
            sign,
            integer,
            fractional,
        })
    }

    /// Select elements according to the vector's [`DecodeMode`].
    ///
    /// # Example
    /// ```
    /// use compact_float_rs::{CompactVector, DecodeMode, FieldWidth, Selection};
    ///
    /// let data = [-12.56, 0.01, 98.43, -42.0, 0.99];
    /// let mut vector = CompactVector::from_values(&data, 2, FieldWidth::W16).unwrap();
    ///
    /// let eager = vector.get_range(1usize..3).unwrap();
    /// assert!(matches!(eager, Selection::Decoded(ref v) if v.len() == 2));
    ///
    /// vector.set_decode_mode(DecodeMode::Lazy);
    /// let lazy = vector.get_range(vec![0isize, -1]).unwrap();
    /// assert!(matches!(lazy, Selection::Compact(_)));
    /// ```
    pub fn get_range(&self, selector: impl Into<Selector>) -> Result<Selection, CompactError> {
        let fields = self.fields()?;
        let indices = selector.into().resolve(fields.len())?;

        match self.mode {
            DecodeMode::Eager => {
                let mut values = Vec::with_capacity(indices.len());
                for &pos in &indices {
                    let (sign, integer, fractional) =
                        fields.read(pos).ok_or(CompactError::IndexOutOfBounds {
                            index: pos as isize,
                            len: fields.len(),
                        })?;
                    values.push(self.codec.decode_raw(sign, integer, fractional));
                }
                Ok(Selection::Decoded(values))
            }
            DecodeMode::Lazy => {
                let selected = fields
                    .gather(&indices)
                    .ok_or(CompactError::IndexOutOfBounds {
                        index: indices.iter().copied().max().unwrap_or(0) as isize,
                        len: fields.len(),
                    })?;
                Ok(Selection::Compact(CompactVector {
                    codec: self.codec,
                    mode: self.mode,
                    state: State::Created(selected),
                }))
            }
        }
    }

    /// Re-encode the element at `index` in place.
    ///
    /// A capacity error leaves the element unchanged.
    pub fn set(&mut self, index: isize, value: f64) -> Result<(), CompactError> {
        let codec = self.codec;
        let fields = self.fields_mut()?;
        let pos = normalize_index(index, fields.len())?;
        let encoded = codec.encode(value)?;
        fields.write(pos, encoded)
    }

    /// Number of elements. Zero before `create` and after `destroy`.
    pub fn len(&self) -> usize {
        match &self.state {
            State::Created(fields) => fields.len(),
            _ => 0,
        }
    }

    /// Whether the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the decoded values.
    ///
    /// Each iterator keeps its own position, so several passes can run side
    /// by side over the same vector.
    pub fn iter(&self) -> Result<Iter<'_>, CompactError> {
        let fields = self.fields()?;
        Ok(Iter {
            codec: &self.codec,
            fields,
            front: 0,
            back: fields.len(),
        })
    }

    /// Decode every element into a `Vec<f64>`.
    pub fn to_vec(&self) -> Result<Vec<f64>, CompactError> {
        Ok(self.iter()?.collect())
    }

    /// Memory footprint in bytes. Depends only on the length and field width.
    pub fn size_in_bytes(&self) -> usize {
        footprint(self.len(), self.width())
    }

    /// Bytes currently held by the three field buffers.
    pub fn allocated_bytes(&self) -> usize {
        match &self.state {
            State::Created(fields) => fields.byte_len(),
            _ => 0,
        }
    }

    /// Layout and memory summary.
    pub fn metadata(&self) -> VectorMetadata {
        VectorMetadata::new(self.len(), self.precision(), self.width())
    }

    /// Release all three fields and reset the length to zero.
    ///
    /// Any later access fails with [`CompactError::Destroyed`].
    pub fn destroy(&mut self) {
        let released = self.len();
        self.state = State::Destroyed;
        debug!(released, "destroyed compact vector");
    }
}

/// Forward iterator over a vector's decoded values.
///
/// Created by [`CompactVector::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    codec: &'a FieldCodec,
    fields: &'a Fields,
    front: usize,
    back: usize,
}

impl Iterator for Iter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        let (sign, integer, fractional) = self.fields.read(self.front)?;
        self.front += 1;
        Some(self.codec.decode_raw(sign, integer, fractional))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        let (sign, integer, fractional) = self.fields.read(self.back - 1)?;
        self.back -= 1;
        Some(self.codec.decode_raw(sign, integer, fractional))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
