use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Amount of money counted in the smallest currency denomination (cents).
pub type MinorUnits = i64;

const MINOR_DIGITS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("invalid decimal number `{0}`")]
    InvalidFormat(String),
    #[error("amount `{0}` is out of range")]
    OutOfRange(String),
}

/// Most significant digits (and fractional digits) a [`Decimal`] can hold.
const MAX_PRECISION: usize = 28;

/// Fractional digits kept when the input is too precise for a [`Decimal`].
/// Digits past the third never change half-up rounding to two places.
const KEPT_SCALE: usize = MINOR_DIGITS as usize + 1;

/// Parses `text` as a decimal number.
///
/// Plain notation (`12.34`), scientific notation (`1.5e2`) and surrounding
/// whitespace are accepted. The fractional scale is preserved, so `1.230`
/// reports three digits. Input more precise than a [`Decimal`] is cut down
/// to three fractional digits, which still rounds correctly and
/// still reports more than two fractional digits.
pub fn parse_decimal(text: &str) -> Result<Decimal, MoneyError> {
    let invalid = || MoneyError::InvalidFormat(text.to_owned());
    let out_of_range = || MoneyError::OutOfRange(text.to_owned());

    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i64>().map_err(|_| invalid())?;
            (mantissa, exponent)
        }
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if (int_part.is_empty() && frac_part.is_empty())
        || !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let mut digits = format!("{int_part}{frac_part}");
    let mut scale = (frac_part.len() as i64).saturating_sub(exponent);
    if scale < 0 {
        if digits.bytes().any(|b| b != b'0') {
            let shift = usize::try_from(scale.unsigned_abs()).map_err(|_| out_of_range())?;
            if shift > MAX_PRECISION {
                return Err(out_of_range());
            }
            digits.push_str(&"0".repeat(shift));
        }
        scale = 0;
    }
    let mut scale = usize::try_from(scale).map_err(|_| out_of_range())?;

    let mut significant = digits.trim_start_matches('0');
    if significant.len() > MAX_PRECISION || scale > MAX_PRECISION {
        if scale <= KEPT_SCALE {
            return Err(out_of_range());
        }
        let dropped = scale - KEPT_SCALE;
        significant = &significant[..significant.len().saturating_sub(dropped)];
        scale = KEPT_SCALE;
    }
    if significant.len() > MAX_PRECISION {
        return Err(out_of_range());
    }

    let magnitude: i128 = if significant.is_empty() {
        0
    } else {
        significant.parse().map_err(|_| out_of_range())?
    };
    let signed = if negative { -magnitude } else { magnitude };
    Decimal::try_from_i128_with_scale(signed, scale as u32).map_err(|_| out_of_range())
}

/// Converts a decimal into minor units, rounding half-up (away from zero)
/// to two fractional digits first.
pub fn to_minor_units(amount: Decimal) -> Result<MinorUnits, MoneyError> {
    amount
        .round_dp_with_strategy(MINOR_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| MoneyError::OutOfRange(amount.to_string()))
}

/// Parses human-entered decimal text into minor units.
///
/// No sign policy is applied here: `-1.50` yields `-150`.
pub fn parse_to_minor_units(text: &str) -> Result<MinorUnits, MoneyError> {
    to_minor_units(parse_decimal(text)?)
}

/// Renders minor units with exactly two fractional digits, e.g. `-150` as `-1.50`.
pub fn format_from_minor_units(amount: MinorUnits) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
