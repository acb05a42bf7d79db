//! Fixed-point Currency
//!
//! VBScript Currency is a 64-bit integer counting ten-thousandths, giving four
//! implied decimal places and a range of roughly ±922 trillion.

use std::fmt;

const SCALE: i64 = 10_000;

/// Fixed-point currency value (ten-thousandths of a unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Currency(i64);

impl Currency {
    /// `MaxCurrencyValue`: 922,337,203,685,477.5807
    pub const MAX: Currency = Currency(i64::MAX);
    /// `MinCurrencyValue`: -922,337,203,685,477.5808
    pub const MIN: Currency = Currency(i64::MIN);
    pub const ZERO: Currency = Currency(0);

    /// Build from the raw count of ten-thousandths
    pub const fn from_scaled(scaled: i64) -> Self {
        Currency(scaled)
    }

    /// Raw count of ten-thousandths
    pub const fn scaled(self) -> i64 {
        self.0
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        value.checked_mul(SCALE).map(Currency)
    }

    /// Convert from a double, rounding half-to-even at the fourth decimal.
    ///
    /// Returns `None` when the value is not finite or outside the range.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * SCALE as f64).round_ties_even();
        // i64::MAX is not representable as f64; 2^63 is the first value past it
        if scaled >= 9_223_372_036_854_775_808.0 || scaled < -9_223_372_036_854_775_808.0 {
            return None;
        }
        Some(Currency(scaled as i64))
    }

    /// Convert an exact decimal `mantissa * 10^-scale`.
    ///
    /// The range check is applied to the exact value before rounding, so a
    /// value a millionth above `MAX` is rejected even though it would round
    /// down onto it.
    pub fn from_decimal(mantissa: i128, scale: u32) -> Option<Self> {
        if scale <= 4 {
            let factor = 10i128.checked_pow(4 - scale)?;
            return narrow(mantissa.checked_mul(factor)?);
        }

        let divisor = 10i128.checked_pow(scale - 4)?;
        let upper = (i64::MAX as i128).checked_mul(divisor);
        let lower = (i64::MIN as i128).checked_mul(divisor);
        if let (Some(upper), Some(lower)) = (upper, lower) {
            if mantissa > upper || mantissa < lower {
                return None;
            }
        }
        narrow(div_round_half_even(mantissa, divisor))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Round to a whole number, half-to-even
    pub fn round_to_integer(self) -> i64 {
        div_round_half_even(self.0 as i128, SCALE as i128) as i64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Currency) -> Option<Currency> {
        self.0.checked_add(rhs.0).map(Currency)
    }

    pub fn checked_sub(self, rhs: Currency) -> Option<Currency> {
        self.0.checked_sub(rhs.0).map(Currency)
    }

    pub fn checked_mul(self, rhs: Currency) -> Option<Currency> {
        let product = (self.0 as i128).checked_mul(rhs.0 as i128)?;
        narrow(div_round_half_even(product, SCALE as i128))
    }

    /// Divide, returning `None` on overflow or a zero divisor
    pub fn checked_div(self, rhs: Currency) -> Option<Currency> {
        if rhs.0 == 0 {
            return None;
        }
        let numerator = (self.0 as i128).checked_mul(SCALE as i128)?;
        narrow(div_round_half_even(numerator, rhs.0 as i128))
    }

    pub fn checked_neg(self) -> Option<Currency> {
        self.0.checked_neg().map(Currency)
    }
}

fn narrow(value: i128) -> Option<Currency> {
    i64::try_from(value).ok().map(Currency)
}

/// Integer division rounding the quotient half-to-even
fn div_round_half_even(numerator: i128, divisor: i128) -> i128 {
    let quotient = numerator / divisor;
    let remainder = numerator % divisor;
    if remainder == 0 {
        return quotient;
    }
    let twice = remainder.abs() * 2;
    let step = if (numerator < 0) != (divisor < 0) { -1 } else { 1 };
    match twice.cmp(&divisor.abs()) {
        std::cmp::Ordering::Greater => quotient + step,
        std::cmp::Ordering::Equal if quotient % 2 != 0 => quotient + step,
        _ => quotient,
    }
}

impl fmt::Display for Currency {
    /// Plain decimal with trailing fractional zeros removed: `1.5`, `-0.0001`, `3`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = (self.0 as i128).abs();
        let whole = magnitude / SCALE as i128;
        let fraction = magnitude % SCALE as i128;
        let sign = if self.0 < 0 { "-" } else { "" };
        if fraction == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:04}", fraction);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}
