//! Mantissa/exponent quantity arithmetic
//!
//! Genesis quantities, flat charges and transfer "float" quantities are all
//! stored as `mantissa * 10^exponent`. These helpers convert between that
//! form and plain integers under a chosen rounding mode.

use serde::{Deserialize, Serialize};

/// Rounding applied when a quantity has to lose precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    Down,
    #[default]
    Nearest,
    Up,
}

impl Rounding {
    /// Offset added before each division by ten
    fn offset(self) -> u64 {
        match self {
            Rounding::Down => 0,
            Rounding::Nearest => 4,
            Rounding::Up => 9,
        }
    }

    /// Map a signed direction (-1, 0, +1) onto a rounding mode
    pub fn from_sign(sign: i32) -> Self {
        match sign.signum() {
            -1 => Rounding::Down,
            1 => Rounding::Up,
            _ => Rounding::Nearest,
        }
    }
}

/// Mantissa/exponent pair together with the quantity it represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MantissaExponent {
    pub mantissa: u64,
    pub exponent: u32,
    pub qty: u64,
}

/// Expand `mantissa * 10^exponent`, saturating on overflow.
///
/// # Examples
/// ```
/// use coinspark_metadata::utils::math::mantissa_exponent_to_qty;
///
/// assert_eq!(mantissa_exponent_to_qty(5, 3), 5000);
/// assert_eq!(mantissa_exponent_to_qty(0, 11), 0);
/// ```
#[inline]
pub fn mantissa_exponent_to_qty(mantissa: u64, exponent: u32) -> u64 {
    mantissa.saturating_mul(10u64.saturating_pow(exponent))
}

/// Find the mantissa/exponent pair closest to `qty` under `rounding`.
///
/// The quantity is repeatedly divided by ten (after adding the rounding
/// offset) until it fits `mantissa_max`; the exponent is then capped at
/// `exponent_max`.
///
/// # Examples
/// ```
/// use coinspark_metadata::utils::math::{qty_to_mantissa_exponent, Rounding};
///
/// let result = qty_to_mantissa_exponent(123_456, Rounding::Nearest, 1000, 11);
/// assert_eq!((result.mantissa, result.exponent), (123, 3));
/// assert_eq!(result.qty, 123_000);
///
/// let result = qty_to_mantissa_exponent(123_456, Rounding::Up, 1000, 11);
/// assert_eq!(result.qty, 124_000);
/// ```
pub fn qty_to_mantissa_exponent(
    qty: u64,
    rounding: Rounding,
    mantissa_max: u64,
    exponent_max: u32,
) -> MantissaExponent {
    let offset = rounding.offset();
    let mut mantissa = qty;
    let mut exponent = 0u32;

    while mantissa > mantissa_max {
        mantissa = mantissa.saturating_add(offset) / 10;
        exponent += 1;
    }

    let exponent = exponent.min(exponent_max);

    MantissaExponent {
        mantissa,
        exponent,
        qty: mantissa_exponent_to_qty(mantissa, exponent),
    }
}
