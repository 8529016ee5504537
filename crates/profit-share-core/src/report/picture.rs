//! Edited numeric fields in the style of COBOL `PIC` clauses.
//!
//! Amounts print as `Z,ZZZ,ZZ9.99-`: leading zeros and their commas are
//! suppressed to spaces, at least one integer digit is kept, and the sign
//! trails the number (a space when non-negative). Values wider than the field
//! lose their high-order digits, as a MOVE into a shorter picture would.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::{round_money, Money, Points};

/// Width of an edited field with `int_digits` integer digits, optional
/// two-place fraction and a trailing sign position.
pub fn field_width(int_digits: usize, decimals: bool) -> usize {
    let commas = int_digits.saturating_sub(1) / 3;
    let fraction = if decimals { 3 } else { 0 };
    int_digits + commas + fraction + 1
}

fn group_and_suppress(value: u64, int_digits: usize) -> String {
    let digits = format!("{:0width$}", value, width = int_digits);
    let mut grouped = String::with_capacity(int_digits + int_digits / 3);
    for (i, c) in digits.chars().enumerate() {
        let remaining = int_digits - i;
        if i > 0 && remaining % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    // Suppress up to, but not including, the units digit.
    let last = grouped.len() - 1;
    let mut out = String::with_capacity(grouped.len());
    let mut suppressing = true;
    for (i, c) in grouped.chars().enumerate() {
        if suppressing && i < last && (c == '0' || c == ',') {
            out.push(' ');
        } else {
            suppressing = false;
            out.push(c);
        }
    }
    out
}

fn truncate_high_order(value: u64, int_digits: usize) -> u64 {
    match 10u64.checked_pow(int_digits as u32) {
        Some(modulus) => value % modulus,
        None => value,
    }
}

fn sign(negative: bool) -> char {
    if negative {
        '-'
    } else {
        ' '
    }
}

/// Edit a money amount into `int_digits` integer positions plus `.99-`.
pub fn edit_amount(value: Money, int_digits: usize) -> String {
    let rounded = round_money(value);
    let negative = rounded < Decimal::ZERO;
    let magnitude = rounded.abs();
    let whole = magnitude.trunc();
    let cents = ((magnitude - whole) * Decimal::ONE_HUNDRED).to_u64().unwrap_or(0);

    let modulus = Decimal::from(10u64.saturating_pow(int_digits as u32));
    let whole = (whole % modulus).to_u64().unwrap_or(0);

    format!(
        "{}.{:02}{}",
        group_and_suppress(whole, int_digits),
        cents,
        sign(negative)
    )
}

/// Edit a whole-number quantity as `ZZZ,ZZ9-`.
pub fn edit_points(value: Points, int_digits: usize) -> String {
    let magnitude = truncate_high_order(value.unsigned_abs(), int_digits);
    format!("{}{}", group_and_suppress(magnitude, int_digits), sign(value < 0))
}

/// Edit an unsigned count as `ZZZ,ZZ9` (no sign position).
pub fn edit_count(value: usize, int_digits: usize) -> String {
    group_and_suppress(truncate_high_order(value as u64, int_digits), int_digits)
}

/// Blank field of the same width as an edited amount.
pub fn blank_amount(int_digits: usize) -> String {
    " ".repeat(field_width(int_digits, true))
}
