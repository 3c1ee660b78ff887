use super::{CurrencyId, Date, RateId};
use crate::failure::ValidationError;
use std::fmt::Display;

/// An ISO-4217 style currency code: exactly three ASCII uppercase letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Validate and wrap a currency code
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(ValidationError::CurrencyCode(code))
        }
    }

    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A currency known to the store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Currency {
    /// Identifier
    pub id: CurrencyId,
    /// Unique three-letter code
    pub code: CurrencyCode,
    /// Display name, e.g. "US Dollar"
    pub name: String,
}

/// The rate for converting one unit of `from` into `to`, valid as of `date`.
///
/// At most one rate exists per (from, to, date).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExchangeRate {
    /// Identifier
    pub id: RateId,
    /// Source currency
    pub from: CurrencyCode,
    /// Target currency
    pub to: CurrencyCode,
    /// The day this rate was published
    pub date: Date,
    /// Units of `to` per unit of `from`
    pub rate: f64,
}

impl ExchangeRate {
    /// Check that the rate is a positive, finite number
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.rate.is_finite() {
            Err(ValidationError::NonFinite("rate"))
        } else if self.rate <= 0.0 {
            Err(ValidationError::NonPositiveRate(self.rate))
        } else {
            Ok(())
        }
    }

    /// Whether this rate may be applied to a conversion `from -> to` made on `date`
    pub fn applies_to(&self, from: &CurrencyCode, to: &CurrencyCode, date: Date) -> bool {
        &self.from == from && &self.to == to && self.date <= date
    }
}
