//! Bit packing utilities for fixed-width integer fields.
//!
//! This module provides a `BitPack` cursor for reading and writing
//! fixed-width integers at arbitrary bit offsets of a byte buffer, and
//! `PackedField`, the fixed-width unsigned integer array backing each of the
//! three fields of a [`CompactVector`](crate::CompactVector).

use crate::error::CompactError;
use crate::planner::FieldWidth;
use crate::size::bytes_per_field;

/// Maximum number of bits that can be read or written in a single operation.
pub const MAX_BITS: usize = 64;

/// Number of bits in a byte.
const BYTE_BITS: usize = 8;

/// Mask with the lowest `bits` bits set, for `bits <= 8`.
#[inline]
fn byte_mask(bits: usize) -> u8 {
    ((1u16 << bits) - 1) as u8
}

/// A bit cursor over a byte buffer.
///
/// Values are stored little-endian: the least significant bits of a value
/// land in the lowest bits of the first byte touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitPack<B> {
    buff: B,
    cursor: usize,
    bits: usize,
}

impl<B> BitPack<B> {
    /// Create a new BitPack positioned at the start of `buff`.
    #[inline]
    pub fn new(buff: B) -> Self {
        BitPack {
            buff,
            cursor: 0,
            bits: 0,
        }
    }

    /// Get the total number of bits processed so far.
    #[inline]
    pub fn sum_bits(&self) -> usize {
        self.cursor * BYTE_BITS + self.bits
    }

    /// Set the cursor position.
    #[inline]
    pub fn with_cursor(&mut self, cursor: usize) -> &mut Self {
        self.cursor = cursor;
        self
    }

    /// Set the bit position within the current byte.
    #[inline]
    pub fn with_bits(&mut self, bits: usize) -> &mut Self {
        self.bits = bits;
        self
    }

    /// Move the cursor to an absolute bit offset.
    #[inline]
    pub fn seek(&mut self, bit_offset: usize) -> &mut Self {
        self.with_cursor(bit_offset / BYTE_BITS)
            .with_bits(bit_offset % BYTE_BITS)
    }
}

impl<B: AsRef<[u8]>> BitPack<B> {
    fn check_room(&self, bits: usize) -> Result<(), CompactError> {
        if bits > MAX_BITS {
            return Err(CompactError::BitWidthExceeded(bits));
        }
        let total = self.buff.as_ref().len() * BYTE_BITS;
        if total < self.sum_bits() + bits {
            return Err(CompactError::BufferOverflow {
                attempted: bits,
                available: total.saturating_sub(self.sum_bits()),
            });
        }
        Ok(())
    }
}

// Reading operations for byte slices
impl BitPack<&[u8]> {
    /// Read `bits` bits from the buffer and return them as a u64.
    ///
    /// # Arguments
    /// * `bits` - Number of bits to read (max 64)
    ///
    /// # Returns
    /// The value read, or an error if there are not enough bits available.
    pub fn read(&mut self, mut bits: usize) -> Result<u64, CompactError> {
        self.check_room(bits)?;

        let mut bits_read = 0usize;
        let mut output = 0u64;

        while bits > 0 {
            let byte_left = BYTE_BITS - self.bits;
            let take = bits.min(byte_left);

            let bb = (self.buff[self.cursor] >> self.bits) & byte_mask(take);
            output |= (bb as u64) << bits_read;

            self.bits += take;
            bits_read += take;
            bits -= take;

            if self.bits >= BYTE_BITS {
                self.cursor += 1;
                self.bits = 0;
            }
        }

        Ok(output)
    }
}

// Writing operations for mutable byte slices
impl BitPack<&mut [u8]> {
    /// Write the low `bits` bits of `value` to the buffer.
    ///
    /// Existing bits under the cursor are overwritten, so the same slot can
    /// be rewritten in place.
    pub fn write(&mut self, mut value: u64, mut bits: usize) -> Result<(), CompactError> {
        self.check_room(bits)?;

        if bits < MAX_BITS {
            value &= (1u64 << bits) - 1;
        }

        while bits > 0 {
            let bits_left = BYTE_BITS - self.bits;
            let take = bits.min(bits_left);

            let mask = byte_mask(take) << self.bits;
            let chunk = ((value as u8) & byte_mask(take)) << self.bits;
            self.buff[self.cursor] = (self.buff[self.cursor] & !mask) | chunk;

            self.bits += take;
            value >>= take;
            bits -= take;

            if self.bits >= BYTE_BITS {
                self.cursor += 1;
                self.bits = 0;
            }
        }

        Ok(())
    }
}

// Writing operations for growable Vec
impl BitPack<Vec<u8>> {
    /// Write `bits` bits of `value` to the buffer.
    ///
    /// The buffer will grow as needed.
    #[inline]
    pub fn write(&mut self, value: u64, bits: usize) -> Result<(), CompactError> {
        if bits > MAX_BITS {
            return Err(CompactError::BitWidthExceeded(bits));
        }

        let len = self.buff.len();
        if let Some(bits_needed) = (self.sum_bits() + bits).checked_sub(len * BYTE_BITS) {
            self.buff.resize(len + bits_needed.div_ceil(BYTE_BITS), 0x0);
        }

        let mut bitpack = BitPack {
            buff: self.buff.as_mut_slice(),
            cursor: self.cursor,
            bits: self.bits,
        };

        bitpack.write(value, bits)?;

        self.bits = bitpack.bits;
        self.cursor = bitpack.cursor;

        Ok(())
    }

    /// Consume the BitPack and return the underlying buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.buff
    }
}

/// A fixed-width array of unsigned integers packed into a byte buffer.
///
/// Every slot occupies exactly `width.bits()` bits, so the buffer holds
/// `ceil(len * width / 8)` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedField {
    width: FieldWidth,
    len: usize,
    bytes: Vec<u8>,
}

impl PackedField {
    /// Allocate `len` zero-initialized slots.
    pub fn zeroed(width: FieldWidth, len: usize) -> Self {
        PackedField {
            width,
            len,
            bytes: vec![0; bytes_per_field(len, width)],
        }
    }

    /// Create an empty field with room for `capacity` slots.
    pub fn with_capacity(width: FieldWidth, capacity: usize) -> Self {
        PackedField {
            width,
            len: 0,
            bytes: Vec::with_capacity(bytes_per_field(capacity, width)),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Size of the backing buffer in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    fn bit_offset(&self, index: usize) -> usize {
        index * self.width.bits() as usize
    }

    /// Returns the `index`-th integer, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<u64> {
        if index >= self.len {
            return None;
        }
        let mut bitpack = BitPack::<&[u8]>::new(&self.bytes);
        bitpack.seek(self.bit_offset(index));
        bitpack.read(self.width.bits() as usize).ok()
    }

    /// Overwrite the `index`-th integer.
    ///
    /// `value` must fit the field width; excess high bits are discarded.
    pub fn set(&mut self, index: usize, value: u64) -> Result<(), CompactError> {
        if index >= self.len {
            return Err(CompactError::IndexOutOfBounds {
                index: index as isize,
                len: self.len,
            });
        }
        debug_assert!(value <= self.width.max_value());

        let offset = self.bit_offset(index);
        let bits = self.width.bits() as usize;
        let mut bitpack = BitPack::<&mut [u8]>::new(self.bytes.as_mut_slice());
        bitpack.seek(offset);
        bitpack.write(value, bits)
    }

    /// Append an integer, growing the buffer as needed.
    pub fn push(&mut self, value: u64) -> Result<(), CompactError> {
        debug_assert!(value <= self.width.max_value());

        let offset = self.bit_offset(self.len);
        let mut bitpack = BitPack::new(std::mem::take(&mut self.bytes));
        bitpack.seek(offset);
        let written = bitpack.write(value, self.width.bits() as usize);
        self.bytes = bitpack.into_vec();
        written?;

        self.len += 1;
        Ok(())
    }

    /// Copy the slots at `indices` into a new field of the same width.
    ///
    /// Returns `None` if any index is out of bounds.
    pub fn gather(&self, indices: &[usize]) -> Option<PackedField> {
        let mut out = PackedField::zeroed(self.width, indices.len());
        for (slot, &index) in indices.iter().enumerate() {
            let value = self.get(index)?;
            out.set(slot, value).ok()?;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let mut bitpack_vec = BitPack::new(Vec::with_capacity(8));
        bitpack_vec.write(10, 4).unwrap();
        bitpack_vec.write(1021, 10).unwrap();
        bitpack_vec.write(3, 2).unwrap();
        let bytes = bitpack_vec.into_vec();

        let mut bitpack = BitPack::<&[u8]>::new(&bytes);
        assert_eq!(bitpack.read(4).unwrap(), 10);
        assert_eq!(bitpack.read(10).unwrap(), 1021);
        assert_eq!(bitpack.read(2).unwrap(), 3);
    }

    #[test]
    fn test_full_64_bits() {
        let mut bitpack_vec = BitPack::new(Vec::new());
        bitpack_vec.write(u64::MAX, 64).unwrap();
        bitpack_vec.write(0x0123_4567_89AB_CDEF, 64).unwrap();
        let bytes = bitpack_vec.into_vec();
        assert_eq!(bytes.len(), 16);

        let mut bitpack = BitPack::<&[u8]>::new(&bytes);
        assert_eq!(bitpack.read(64).unwrap(), u64::MAX);
        assert_eq!(bitpack.read(64).unwrap(), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut buf = vec![0xFFu8; 4];
        {
            let mut bitpack = BitPack::<&mut [u8]>::new(buf.as_mut_slice());
            bitpack.seek(4);
            bitpack.write(0, 16).unwrap();
        }
        assert_eq!(buf, vec![0x0F, 0x00, 0xF0, 0xFF]);

        let mut bitpack = BitPack::<&[u8]>::new(&buf);
        bitpack.seek(4);
        assert_eq!(bitpack.read(16).unwrap(), 0);
        assert_eq!(bitpack.read(4).unwrap(), 0xF);
    }

    #[test]
    fn test_read_past_end() {
        let buf = [0u8; 2];
        let mut bitpack = BitPack::<&[u8]>::new(&buf);
        bitpack.seek(8);
        let result = bitpack.read(16);
        assert!(matches!(
            result,
            Err(CompactError::BufferOverflow {
                attempted: 16,
                available: 8
            })
        ));
    }

    #[test]
    fn test_bit_width_exceeded() {
        let mut bitpack_vec = BitPack::new(Vec::new());
        let result = bitpack_vec.write(0, 65);
        assert!(matches!(result, Err(CompactError::BitWidthExceeded(65))));
    }

    #[test]
    fn test_packed_field_zeroed() {
        let field = PackedField::zeroed(FieldWidth::W16, 5);
        assert_eq!(field.len(), 5);
        assert_eq!(field.byte_len(), 10);
        assert!((0..5).all(|i| field.get(i) == Some(0)));
        assert_eq!(field.get(5), None);
    }

    #[test]
    fn test_packed_field_set_get() {
        for width in FieldWidth::ALL {
            let mut field = PackedField::zeroed(width, 4);
            field.set(0, 1).unwrap();
            field.set(1, width.max_value()).unwrap();
            field.set(3, 7).unwrap();
            field.set(1, width.max_value() - 1).unwrap();

            assert_eq!(field.get(0), Some(1));
            assert_eq!(field.get(1), Some(width.max_value() - 1));
            assert_eq!(field.get(2), Some(0));
            assert_eq!(field.get(3), Some(7));
        }
    }

    #[test]
    fn test_packed_field_set_out_of_bounds() {
        let mut field = PackedField::zeroed(FieldWidth::W8, 2);
        let result = field.set(2, 1);
        assert!(matches!(
            result,
            Err(CompactError::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_packed_field_push_matches_zeroed_layout() {
        let mut pushed = PackedField::with_capacity(FieldWidth::W32, 3);
        let mut preset = PackedField::zeroed(FieldWidth::W32, 3);
        for (i, v) in [42u64, 0, 4_000_000_000].into_iter().enumerate() {
            pushed.push(v).unwrap();
            preset.set(i, v).unwrap();
        }
        assert_eq!(pushed, preset);
        assert_eq!(pushed.byte_len(), 12);
    }

    #[test]
    fn test_packed_field_gather() {
        let mut field = PackedField::zeroed(FieldWidth::W8, 5);
        for i in 0..5 {
            field.set(i, (i * 10) as u64).unwrap();
        }
        let picked = field.gather(&[4, 0, 2]).unwrap();
        assert_eq!(picked.len(), 3);
        assert_eq!(
            [picked.get(0), picked.get(1), picked.get(2)],
            [Some(40), Some(0), Some(20)]
        );
        assert!(field.gather(&[1, 5]).is_none());
    }
}
