//! Field codec for splitting floats into (sign, integer, fractional) triples.
//!
//! A value `v` at precision `P` is stored as three unsigned integers:
//!
//! - sign: `0` for negative, `1` for non-negative, `2` for NaN
//! - integer: `floor(|v|)`
//! - fractional: `round(|v| - floor(|v|), P) * 10^P`
//!
//! Rounding may push the fractional part up to `10^P` (e.g. `0.999` at
//! `P = 2`). That carry is folded into the integer part before the triple is
//! returned, so the fractional part is always `< 10^P`.
//!
//! Both parts must fit the configured [`FieldWidth`]; values that do not are
//! rejected rather than truncated.

use crate::error::CompactError;
use crate::planner::{decimal_scale, validate, FieldWidth};

/// Raw sign field value for negative numbers.
const SIGN_NEGATIVE: u64 = 0;

/// Raw sign field value for non-negative numbers.
const SIGN_NON_NEGATIVE: u64 = 1;

/// Raw sign field value reserved for NaN.
pub const NAN_SENTINEL: u64 = 2;

/// Contents of the sign field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// The value is negative.
    Negative,
    /// The value is zero or positive.
    NonNegative,
    /// Not a Number. Integer and fractional parts are zero.
    NaN,
}

impl Sign {
    /// The integer stored in the sign field.
    pub fn to_raw(self) -> u64 {
        match self {
            Sign::Negative => SIGN_NEGATIVE,
            Sign::NonNegative => SIGN_NON_NEGATIVE,
            Sign::NaN => NAN_SENTINEL,
        }
    }

    /// Interpret a stored sign field integer.
    pub fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            SIGN_NEGATIVE => Some(Sign::Negative),
            SIGN_NON_NEGATIVE => Some(Sign::NonNegative),
            NAN_SENTINEL => Some(Sign::NaN),
            _ => None,
        }
    }
}

/// One value split into its three field integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedValue {
    /// Sign field.
    pub sign: Sign,
    /// Integer magnitude, `floor(|v|)` after carry.
    pub integer: u64,
    /// Fractional magnitude scaled by `10^P`.
    pub fractional: u64,
}

impl EncodedValue {
    /// The encoding of NaN.
    pub const NAN: EncodedValue = EncodedValue {
        sign: Sign::NaN,
        integer: 0,
        fractional: 0,
    };
}

/// Encoder/decoder for one (precision, field width) pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldCodec {
    precision: u32,
    width: FieldWidth,
    /// `10^precision`.
    scale: u64,
}

impl FieldCodec {
    /// Create a codec retaining `precision` decimal digits in `width`-bit fields.
    ///
    /// Fails with a construction error if `precision` is negative or the
    /// width cannot hold `10^precision - 1`.
    ///
    /// # Example
    /// ```
    /// use compact_float_rs::{FieldCodec, FieldWidth};
    ///
    /// let codec = FieldCodec::new(2, FieldWidth::W16).unwrap();
    /// let encoded = codec.encode(-12.56).unwrap();
    /// assert_eq!(encoded.integer, 12);
    /// assert_eq!(encoded.fractional, 56);
    /// assert!((codec.decode(encoded) + 12.56).abs() < 1e-9);
    /// ```
    pub fn new(precision: i32, width: FieldWidth) -> Result<Self, CompactError> {
        let precision = validate(precision, width)?;
        Ok(FieldCodec {
            precision,
            width,
            scale: decimal_scale(precision),
        })
    }

    /// Number of decimal digits retained.
    #[inline]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Width of every field slot.
    #[inline]
    pub fn width(&self) -> FieldWidth {
        self.width
    }

    /// `10^precision`.
    #[inline]
    pub fn scale(&self) -> u64 {
        self.scale
    }

    fn capacity_error(&self, value: f64) -> CompactError {
        CompactError::Capacity {
            value,
            width: self.width.bits(),
        }
    }

    /// Split `value` into its field triple.
    pub fn encode(&self, value: f64) -> Result<EncodedValue, CompactError> {
        if value.is_nan() {
            return Ok(EncodedValue::NAN);
        }

        let sign = if value >= 0.0 {
            Sign::NonNegative
        } else {
            Sign::Negative
        };
        let magnitude = value.abs();

        let int_part = magnitude.floor();
        if !int_part.is_finite() || int_part >= 2f64.powi(self.width.bits() as i32) {
            return Err(self.capacity_error(value));
        }

        let mut integer = int_part as u64;
        let mut fractional = ((magnitude - int_part) * self.scale as f64).round() as u64;

        if fractional >= self.scale {
            fractional = 0;
            integer = integer
                .checked_add(1)
                .ok_or_else(|| self.capacity_error(value))?;
        }

        let max = self.width.max_value();
        if integer > max || fractional > max {
            return Err(self.capacity_error(value));
        }

        Ok(EncodedValue {
            sign,
            integer,
            fractional,
        })
    }

    /// Reassemble a value from its field triple.
    pub fn decode(&self, encoded: EncodedValue) -> f64 {
        if encoded.sign == Sign::NaN {
            return f64::NAN;
        }
        let magnitude = encoded.integer as f64 + encoded.fractional as f64 / self.scale as f64;
        match encoded.sign {
            Sign::NonNegative => magnitude,
            _ => -magnitude,
        }
    }

    /// Reassemble a value from raw field integers as read from storage.
    #[inline]
    pub fn decode_raw(&self, sign: u64, integer: u64, fractional: u64) -> f64 {
        if sign == NAN_SENTINEL {
            return f64::NAN;
        }
        let magnitude = integer as f64 + fractional as f64 / self.scale as f64;
        if sign == SIGN_NON_NEGATIVE {
            magnitude
        } else {
            -magnitude
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_to(v: f64, precision: u32) -> f64 {
        let scale = 10f64.powi(precision as i32);
        (v * scale).round() / scale
    }

    #[test]
    fn test_sign_raw_values() {
        assert_eq!(Sign::Negative.to_raw(), 0);
        assert_eq!(Sign::NonNegative.to_raw(), 1);
        assert_eq!(Sign::NaN.to_raw(), 2);
        assert_eq!(Sign::from_raw(2), Some(Sign::NaN));
        assert_eq!(Sign::from_raw(3), None);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = FieldCodec::new(3, FieldWidth::W32).unwrap();
        let data = [1.234, 5.678, 9.012, -3.456, 0.0, 123456.789];

        for v in data {
            let decoded = codec.decode(codec.encode(v).unwrap());
            assert!((decoded - round_to(v, 3)).abs() < 1e-3, "v={}, decoded={}", v, decoded);
        }
    }

    #[test]
    fn test_roundtrip_high_precision() {
        let codec = FieldCodec::new(8, FieldWidth::W32).unwrap();
        let data = [1234.5678, 0.00012345, 98765.4321, 42.0, 0.99999999];

        for v in data {
            let decoded = codec.decode(codec.encode(v).unwrap());
            assert!((decoded - v).abs() < 1e-8, "v={}, decoded={}", v, decoded);
        }
    }

    #[test]
    fn test_encode_components() {
        let codec = FieldCodec::new(2, FieldWidth::W16).unwrap();
        let encoded = codec.encode(-12.56).unwrap();
        assert_eq!(
            encoded,
            EncodedValue {
                sign: Sign::Negative,
                integer: 12,
                fractional: 56
            }
        );

        let encoded = codec.encode(0.01).unwrap();
        assert_eq!(encoded.sign, Sign::NonNegative);
        assert_eq!(encoded.integer, 0);
        assert_eq!(encoded.fractional, 1);
    }

    #[test]
    fn test_nan_uses_sentinel() {
        let codec = FieldCodec::new(2, FieldWidth::W8).unwrap();
        let encoded = codec.encode(f64::NAN).unwrap();
        assert_eq!(encoded, EncodedValue::NAN);
        assert_eq!(encoded.sign.to_raw(), NAN_SENTINEL);
        assert!(codec.decode(encoded).is_nan());
        assert!(codec.decode_raw(NAN_SENTINEL, 7, 7).is_nan());
    }

    #[test]
    fn test_carry_into_integer() {
        let codec = FieldCodec::new(2, FieldWidth::W8).unwrap();
        let encoded = codec.encode(0.999).unwrap();
        assert_eq!(encoded.sign, Sign::NonNegative);
        assert_eq!(encoded.integer, 1);
        assert_eq!(encoded.fractional, 0);

        let encoded = codec.encode(-41.996).unwrap();
        assert_eq!(encoded.sign, Sign::Negative);
        assert_eq!(encoded.integer, 42);
        assert_eq!(encoded.fractional, 0);
    }

    #[test]
    fn test_carry_overflows_width() {
        let codec = FieldCodec::new(2, FieldWidth::W8).unwrap();
        assert_eq!(codec.encode(255.99).unwrap().integer, 255);
        let result = codec.encode(255.999);
        assert!(matches!(result, Err(CompactError::Capacity { width: 8, .. })));
    }

    #[test]
    fn test_capacity_error() {
        let codec = FieldCodec::new(2, FieldWidth::W8).unwrap();
        let result = codec.encode(256.0);
        assert!(matches!(
            result,
            Err(CompactError::Capacity { value, width: 8 }) if value == 256.0
        ));
        assert!(codec.encode(-300.5).is_err());
        assert!(codec.encode(f64::INFINITY).is_err());
        assert!(codec.encode(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_wide_field_large_values() {
        let codec = FieldCodec::new(4, FieldWidth::W64).unwrap();
        let encoded = codec.encode(-4_000_000_000.5).unwrap();
        assert_eq!(encoded.integer, 4_000_000_000);
        assert_eq!(encoded.fractional, 5000);
        assert!(codec.encode(2f64.powi(64)).is_err());
    }

    #[test]
    fn test_zero_precision_rounds_half_up() {
        let codec = FieldCodec::new(0, FieldWidth::W16).unwrap();
        assert_eq!(codec.encode(2.5).unwrap().integer, 3);
        assert_eq!(codec.encode(2.4).unwrap().integer, 2);
        assert_eq!(codec.encode(-2.5).unwrap().integer, 3);
        assert_eq!(codec.encode(2.5).unwrap().fractional, 0);
    }

    #[test]
    fn test_negative_zero_is_non_negative() {
        let codec = FieldCodec::new(2, FieldWidth::W8).unwrap();
        assert_eq!(codec.encode(-0.0).unwrap().sign, Sign::NonNegative);
        // Rounds to zero but keeps its sign.
        let tiny = codec.encode(-0.001).unwrap();
        assert_eq!(tiny.sign, Sign::Negative);
        assert_eq!(codec.decode(tiny), 0.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(
            FieldCodec::new(-1, FieldWidth::W8),
            Err(CompactError::InvalidPrecision(-1))
        ));
        assert!(matches!(
            FieldCodec::new(5, FieldWidth::W16),
            Err(CompactError::PrecisionExceedsWidth { .. })
        ));
        assert_eq!(FieldCodec::new(4, FieldWidth::W16).unwrap().scale(), 10_000);
    }

    #[test]
    fn test_decode_raw_matches_decode() {
        let codec = FieldCodec::new(4, FieldWidth::W32).unwrap();
        for v in [-7.1234, 0.5, 99.9999] {
            let e = codec.encode(v).unwrap();
            assert_eq!(
                codec.decode(e),
                codec.decode_raw(e.sign.to_raw(), e.integer, e.fractional)
            );
        }
    }
}
