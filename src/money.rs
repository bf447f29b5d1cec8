//! Money Module
//!
//! Fixed-point currency amounts with two implied decimal digits.
//! `Money::from_cents(22315)` is `223.15`.
//!
//! ## Design Principles
//! 1. Explicit Error Handling: arithmetic never wraps, overflow is an error
//! 2. Strict Parsing: no silent truncation of extra decimals
//! 3. Type Safety: balances and amounts never travel as bare integers
//!
//! ## Range
//! Values live inside a signed 31-bit magnitude envelope,
//! `-(2^31 - 1) ..= 2^31 - 1` cents, which is the `INTEGER` column the
//! balances are stored in (minus `i32::MIN`). Sums are computed in 64 bits
//! and checked against the envelope before narrowing.
//!
//! ## Usage
//! ```rust
//! use funds_ledger::money::Money;
//!
//! let balance: Money = "223.15".parse().unwrap();
//! assert_eq!(balance.cents(), 22315);
//! assert_eq!(balance.to_string(), "223.15");
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of implied decimal digits
pub const DECIMALS: u32 = 2;

/// Largest representable magnitude in cents (2^31 - 1)
pub const MAX_CENTS: i64 = (1 << 31) - 1;

// ============================================================================
// Error Types
// ============================================================================

/// Money arithmetic and parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Result would be negative")]
    Negative,

    #[error("Precision overflow: provided {provided} decimals, max allowed 2")]
    PrecisionOverflow { provided: u32 },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Money
// ============================================================================

/// Currency amount in hundredths of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i32);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build from a raw cent count. `i32::MIN` is outside the envelope.
    pub fn from_cents(cents: i32) -> Result<Self, MoneyError> {
        Self::from_wide(cents as i64)
    }

    /// Raw cent count
    #[inline]
    pub const fn cents(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Overflow-checked addition.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        Self::from_wide(self.0 as i64 + other.0 as i64)
    }

    /// Subtraction for balances. Callers validate sufficiency first; a
    /// negative result is still refused.
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        let diff = self.0 as i64 - other.0 as i64;
        if diff < 0 {
            return Err(MoneyError::Negative);
        }
        Self::from_wide(diff)
    }

    /// Render as `<whole>.<tens><ones>`
    pub fn format(self) -> String {
        self.to_string()
    }

    /// Exact decimal view (scale 2)
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0 as i64, DECIMALS)
    }

    /// Convert a decimal value, rejecting more than two fractional digits.
    pub fn from_decimal(decimal: Decimal) -> Result<Self, MoneyError> {
        let normalized = decimal.normalize();
        if normalized.scale() > DECIMALS {
            return Err(MoneyError::PrecisionOverflow {
                provided: normalized.scale(),
            });
        }

        let cents = normalized
            .checked_mul(Decimal::from(100))
            .and_then(|v| v.to_i64())
            .ok_or(MoneyError::Overflow)?;
        Self::from_wide(cents)
    }

    fn from_wide(value: i64) -> Result<Self, MoneyError> {
        if value.unsigned_abs() > MAX_CENTS as u64 {
            return Err(MoneyError::Overflow);
        }
        Ok(Money(value as i32))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Scale is fixed at 2, so trailing zeros are kept ("5.00")
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Strict parse of a client amount such as `"223.15"`, `"100"` or
    /// `"-0.50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }

        let unsigned = s.strip_prefix('-').unwrap_or(s);

        if unsigned.starts_with('.') {
            return Err(MoneyError::InvalidFormat(
                "missing leading zero (e.g., use 0.5 instead of .5)".into(),
            ));
        }
        if unsigned.ends_with('.') {
            return Err(MoneyError::InvalidFormat(
                "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
            ));
        }
        if !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(MoneyError::InvalidFormat(format!("invalid character in {}", s)));
        }
        if unsigned.matches('.').count() > 1 {
            return Err(MoneyError::InvalidFormat("multiple decimal points".into()));
        }

        // Check the digits as written; Decimal rounds beyond 28 places
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let significant = fraction.trim_end_matches('0');
        if significant.len() > DECIMALS as usize {
            return Err(MoneyError::PrecisionOverflow {
                provided: significant.len() as u32,
            });
        }

        let sign = if s.starts_with('-') { "-" } else { "" };
        let exact = if significant.is_empty() {
            format!("{}{}", sign, whole)
        } else {
            format!("{}{}.{}", sign, whole, significant)
        };
        let decimal = Decimal::from_str_exact(&exact)
            .map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;

        Self::from_decimal(decimal)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // String form keeps the two decimals exact for any client
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Accepts JSON numbers (`223.15`, `100`) and strings (`"223.15"`).
struct MoneyVisitor;

impl serde::de::Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an amount with at most two decimal places")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .ok_or(MoneyError::Overflow)
            .and_then(Money::from_wide)
            .map_err(E::custom)
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Money, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(MoneyError::Overflow))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom(MoneyError::InvalidFormat("not a finite number".into())));
        }
        // Display of f64 is the shortest round-trip form, so 223.15 prints as "223.15"
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
