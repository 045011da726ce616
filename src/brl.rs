use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::AddAssign,
    str::FromStr,
};

/// Represents an amount of money in BRL (Brazilian real).
///
/// The amount is stored as a floating-point number of reais, matching the
/// ledger's decimal strings. The [`Display`] implementation formats it with
/// `,` as the thousands separator and 2 decimal places, and honours the
/// caller's width, fill and alignment:
///
/// ```
/// # use vendas_cli::Brl;
/// let amount: Brl = "1234.5".parse().unwrap();
/// assert_eq!(amount.to_string(), "1,234.50");
/// assert_eq!(format!("{amount:>10}"), "  1,234.50");
/// ```
#[derive(Clone, Copy, Default, Deserialize, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Brl(f64);

impl Brl {
    /// No money at all.
    pub const ZERO: Brl = Brl(0.0);

    /// Creates an amount of `amount` reais.
    #[must_use]
    pub fn new(amount: f64) -> Self {
        Self(amount)
    }

    /// Returns the amount in reais.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Debug for Brl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Brl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fixed = format!("{:.2}", self.0.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
        if self.0 < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            grouped.push('-');
        }
        for (i, digit) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        grouped.push('.');
        grouped.push_str(frac_part);
        f.pad(&grouped)
    }
}

impl FromStr for Brl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let amount: f64 = s
            .trim()
            .parse()
            .with_context(|| format!("invalid amount {s:?}"))?;
        if !amount.is_finite() {
            bail!("invalid amount {s:?}: not a finite number");
        }
        Ok(Self(amount))
    }
}

impl AddAssign for Brl {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Brl {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |mut acc, x| {
            acc += x;
            acc
        })
    }
}

impl<'a> Sum<&'a Brl> for Brl {
    fn sum<I: Iterator<Item = &'a Brl>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
