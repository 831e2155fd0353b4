//! Display formatting for dates, money, quantities and tax rates.
//!
//! Parsing helpers live here too so that every malformed value surfaces as a
//! [`FormatError`] before layout starts.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FormatError;
use crate::model::Money;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// ============================================================================
// Dates
// ============================================================================

/// Parse a timestamp or calendar date into its UTC calendar date.
///
/// Offsets are normalised to UTC first, so `2024-01-05T01:00:00+09:00`
/// lands on 2024-01-04. Timestamps without an offset are read as UTC.
pub fn parse_date(value: &str) -> Result<NaiveDate, FormatError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt.and_utc().date_naive());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| FormatError::InvalidDate(value.to_string()))
}

/// `YYYY-MM-DD` rendering of a timestamp or date string.
pub fn format_date(value: &str) -> Result<String, FormatError> {
    parse_date(value).map(format_naive_date)
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ============================================================================
// Amounts
// ============================================================================

/// Parse a plain or scientific decimal string into [`Money`].
pub fn parse_amount(raw: &str) -> Result<Money, FormatError> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| FormatError::InvalidAmount(raw.to_string()))
}

/// Two fractional digits, integer part grouped in thousands with `,`.
///
/// Halves round away from zero. Negative amounts keep a leading `-`.
pub fn format_currency(amount: Money) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(2);

    let fixed = rounded.to_string();
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// [`format_currency`] over unparsed input.
pub fn format_currency_str(raw: &str) -> Result<String, FormatError> {
    parse_amount(raw).map(format_currency)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// Quantities and rates
// ============================================================================

/// Quantities are whole, non-negative numbers. `3.0` is accepted, `2.5` is not.
pub fn parse_quantity(raw: &str) -> Result<u64, FormatError> {
    let raw = raw.trim();
    let invalid = || FormatError::InvalidQuantity(raw.to_string());

    let value = parse_amount(raw).map_err(|_| invalid())?;
    if (value.is_sign_negative() && !value.is_zero()) || !value.fract().is_zero() {
        return Err(invalid());
    }
    u64::try_from(value.trunc()).map_err(|_| invalid())
}

pub fn parse_rate(raw: &str) -> Result<Decimal, FormatError> {
    let raw = raw.trim();
    match parse_amount(raw) {
        Ok(rate) if !rate.is_sign_negative() || rate.is_zero() => Ok(rate),
        _ => Err(FormatError::InvalidRate(raw.to_string())),
    }
}

pub fn format_quantity(quantity: u64) -> String {
    quantity.to_string()
}

/// Shortest decimal form followed by `%`: `10%`, `8.5%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}
