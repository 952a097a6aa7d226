//! Field width planning for compact vectors.
//!
//! This module determines how many bits each of the three fields needs,
//! either to validate an explicitly requested [`FieldWidth`] against a
//! precision, or to auto-size a vector from a full pass over its data.

use std::fmt;

use crate::error::CompactError;

/// Largest precision (decimal digits) whose fractional field fits in 64 bits.
pub const MAX_PRECISION: u32 = 19;

/// Smallest number of bits the sign field needs (values 0, 1 and the NaN sentinel 2).
pub const SIGN_BITS: u32 = 2;

/// Bit width of one field slot. Uniform across all elements of a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldWidth {
    /// 8-bit slots.
    W8,
    /// 16-bit slots.
    W16,
    /// 32-bit slots.
    W32,
    /// 64-bit slots.
    W64,
}

impl FieldWidth {
    /// All supported widths, narrowest first.
    pub const ALL: [FieldWidth; 4] = [
        FieldWidth::W8,
        FieldWidth::W16,
        FieldWidth::W32,
        FieldWidth::W64,
    ];

    /// Number of bits in one slot.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            FieldWidth::W8 => 8,
            FieldWidth::W16 => 16,
            FieldWidth::W32 => 32,
            FieldWidth::W64 => 64,
        }
    }

    /// Largest integer one slot can hold.
    #[inline]
    pub const fn max_value(self) -> u64 {
        match self {
            FieldWidth::W8 => u8::MAX as u64,
            FieldWidth::W16 => u16::MAX as u64,
            FieldWidth::W32 => u32::MAX as u64,
            FieldWidth::W64 => u64::MAX,
        }
    }

    /// Parse a width given in bits.
    pub fn from_bits(bits: u32) -> Result<Self, CompactError> {
        match bits {
            8 => Ok(FieldWidth::W8),
            16 => Ok(FieldWidth::W16),
            32 => Ok(FieldWidth::W32),
            64 => Ok(FieldWidth::W64),
            other => Err(CompactError::InvalidFieldWidth(other)),
        }
    }

    /// The narrowest width with at least `bits` bits, if any.
    pub fn smallest_holding(bits: u32) -> Option<Self> {
        FieldWidth::ALL.into_iter().find(|w| w.bits() >= bits)
    }
}

impl TryFrom<u32> for FieldWidth {
    type Error = CompactError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        FieldWidth::from_bits(bits)
    }
}

impl fmt::Display for FieldWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Precomputed fractional field widths.
///
/// Maps precision (decimal places) to the number of bits needed to hold
/// `10^P - 1`.
pub const PRECISION_MAP: [(u32, u32); 20] = [
    (0, 0),
    (1, 4),
    (2, 7),
    (3, 10),
    (4, 14),
    (5, 17),
    (6, 20),
    (7, 24),
    (8, 27),
    (9, 30),
    (10, 34),
    (11, 37),
    (12, 40),
    (13, 44),
    (14, 47),
    (15, 50),
    (16, 54),
    (17, 57),
    (18, 60),
    (19, 64),
];

/// `10^precision` as an integer, for precisions a 64-bit field can hold.
#[inline]
pub(crate) fn decimal_scale(precision: u32) -> u64 {
    10u64.pow(precision.min(MAX_PRECISION))
}

/// Smallest bit width `w` with `2^w - 1 >= floor(max_abs_value)`, minimum 1.
///
/// Non-finite inputs need an unbounded width and return `u32::MAX`.
pub fn compute_integer_width(max_abs_value: f64) -> u32 {
    if !max_abs_value.is_finite() {
        return u32::MAX;
    }
    let int_part = max_abs_value.abs().floor();
    if int_part < 1.0 {
        return 1;
    }
    if int_part < 2f64.powi(64) {
        let v = int_part as u64;
        (u64::BITS - v.leading_zeros()).max(1)
    } else {
        int_part.log2().floor() as u32 + 1
    }
}

/// Smallest bit width `w` with `2^w - 1 >= 10^precision - 1`.
pub fn compute_fractional_width(precision: u32) -> u32 {
    if let Some(&(_, bits)) = PRECISION_MAP.iter().find(|(p, _)| *p == precision) {
        return bits;
    }
    match 10u128.checked_pow(precision) {
        Some(scale) => u128::BITS - (scale - 1).leading_zeros(),
        None => u128::BITS + 1,
    }
}

/// Validate that an explicit `width` can hold `precision` decimal digits.
///
/// Returns the precision as an unsigned digit count.
pub fn validate(precision: i32, width: FieldWidth) -> Result<u32, CompactError> {
    if precision < 0 {
        return Err(CompactError::InvalidPrecision(precision));
    }
    let precision = precision as u32;
    if precision > width.bits() || compute_fractional_width(precision) > width.bits() {
        return Err(CompactError::PrecisionExceedsWidth {
            precision,
            width: width.bits(),
        });
    }
    Ok(precision)
}

/// Number of digits after the decimal point in the shortest round-trip
/// representation of `value`.
fn decimal_digits(value: f64) -> u32 {
    let repr = value.abs().to_string();
    repr.split_once('.')
        .map(|(_, frac)| frac.len() as u32)
        .unwrap_or(0)
}

/// Field widths chosen for a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthPlan {
    /// Decimal digits retained after the decimal point.
    pub precision: u32,
    /// Bits needed for the largest integer part (after rounding carry).
    pub integer_bits: u32,
    /// Bits needed for the fractional part at `precision`.
    pub fractional_bits: u32,
    /// The narrowest standard width holding every field.
    pub width: FieldWidth,
}

/// Accumulates the statistics needed to auto-size a compact vector.
///
/// Feed every value through [`observe`](Self::observe), then call
/// [`finish`](Self::finish). Non-finite values are ignored: NaN is encoded
/// through the sign sentinel and infinities can never be encoded.
#[derive(Debug, Clone, Default)]
pub struct BitWidthPlanner {
    precision: Option<u32>,
    max_magnitude: f64,
    max_decimals: u32,
    observed: usize,
    finite: usize,
}

impl BitWidthPlanner {
    /// Create a planner. `None` detects the precision from the data.
    pub fn new(precision: Option<u32>) -> Self {
        BitWidthPlanner {
            precision,
            ..Default::default()
        }
    }

    /// Update the running statistics with one value.
    pub fn observe(&mut self, value: f64) {
        self.observed += 1;
        if !value.is_finite() {
            return;
        }
        self.finite += 1;

        let magnitude = value.abs();
        if magnitude > self.max_magnitude {
            self.max_magnitude = magnitude;
        }
        if self.precision.is_none() {
            let digits = decimal_digits(value).min(MAX_PRECISION);
            if digits > self.max_decimals {
                self.max_decimals = digits;
            }
        }
    }

    /// Number of values observed so far, finite or not.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Compute the field widths for everything observed.
    pub fn finish(&self) -> Result<WidthPlan, CompactError> {
        if self.observed == 0 {
            return Err(CompactError::EmptyInput);
        }
        let precision = match self.precision {
            Some(p) => p,
            None if self.finite == 0 => return Err(CompactError::EmptyInput),
            None => self.max_decimals,
        };
        if precision > MAX_PRECISION {
            return Err(CompactError::PrecisionExceedsWidth {
                precision,
                width: FieldWidth::W64.bits(),
            });
        }

        // Rounding may carry the largest magnitude into the next integer.
        let scale = decimal_scale(precision) as f64;
        let floor = self.max_magnitude.floor();
        let carried = if ((self.max_magnitude - floor) * scale).round() >= scale {
            floor + 1.0
        } else {
            floor
        };

        let integer_bits = compute_integer_width(carried);
        let fractional_bits = compute_fractional_width(precision);
        let needed = integer_bits.max(fractional_bits).max(SIGN_BITS);

        let width =
            FieldWidth::smallest_holding(needed).ok_or_else(|| CompactError::Capacity {
                value: self.max_magnitude,
                width: FieldWidth::W64.bits(),
            })?;

        Ok(WidthPlan {
            precision,
            integer_bits,
            fractional_bits,
            width,
        })
    }
}

/// Plan field widths from a full pass over `values`.
///
/// # Example
/// ```
/// use compact_float_rs::planner::{plan, FieldWidth};
///
/// let plan = plan(&[1.5, -300.25, 7.0], None).unwrap();
/// assert_eq!(plan.precision, 2);
/// assert_eq!(plan.integer_bits, 9);
/// assert_eq!(plan.width, FieldWidth::W16);
/// ```
pub fn plan(values: &[f64], precision: Option<u32>) -> Result<WidthPlan, CompactError> {
    let mut planner = BitWidthPlanner::new(precision);
    for &v in values {
        planner.observe(v);
    }
    planner.finish()
}
