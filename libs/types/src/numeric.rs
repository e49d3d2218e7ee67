//! Fixed-point decimal types for prices and sizes
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point
//! errors). Both types are strictly positive by construction: invalid
//! values are rejected at the boundary so downstream code never defends
//! against zero or negative magnitudes.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::NumericError;

/// A strictly positive price.
///
/// Total order over the inner decimal, so prices can key sorted ladders.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Try to create a Price, returning None unless the value is positive.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a Price from a whole number of quote units.
    ///
    /// # Panics
    /// Panics if `value` is zero.
    pub fn from_u64(value: u64) -> Self {
        assert!(value > 0, "Price must be strictly positive");
        Self(Decimal::from(value))
    }

    /// Parse a Price from its decimal string representation.
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value = parse_decimal(s)?;
        Self::try_new(value).ok_or_else(|| NumericError::NotPositive {
            value: s.to_string(),
        })
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A strictly positive resting size.
///
/// A level with zero size does not exist: removal is a distinct book
/// operation, never a zero-sized write.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Size(Decimal);

impl Size {
    /// Try to create a Size, returning None unless the value is positive.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a Size from a whole number of base units.
    ///
    /// # Panics
    /// Panics if `value` is zero.
    pub fn from_u64(value: u64) -> Self {
        assert!(value > 0, "Size must be strictly positive");
        Self(Decimal::from(value))
    }

    /// Parse a Size from its decimal string representation.
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value = parse_decimal(s)?;
        Self::try_new(value).ok_or_else(|| NumericError::NotPositive {
            value: s.to_string(),
        })
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, NumericError> {
    s.parse::<Decimal>().map_err(|_| NumericError::Unparseable {
        input: s.to_string(),
    })
}
