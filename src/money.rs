// Money and billing-interval primitives.
//
// The gateway works in integer minor units (kopecks, cents) and bills plans
// on a whole-month cadence, so amounts and intervals are validated up front
// and carried as plain integers from there on.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid currency code `{0}`: expected three ASCII uppercase letters")]
    InvalidCurrency(String),

    #[error("donation amount must be positive, got {0} minor units")]
    NonPositiveAmount(i64),

    #[error("invalid payment interval `{0}`: expected an ISO-8601 month period like `P1M`")]
    InvalidInterval(String),

    #[error("payment interval `{0}` must cover at least one month")]
    ZeroInterval(String),
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// ISO-4217 alpha currency code (`BYN`, `EUR`, ...). Always three ASCII
/// uppercase letters; anything else is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let valid = code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase());
        if valid {
            Ok(Self(code.to_string()))
        } else {
            Err(MoneyError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A positive amount in integer minor units of a currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Build an amount from minor units. Zero and negative amounts are
    /// rejected; the gateway has no meaningful use for either.
    pub fn from_minor_units(minor_units: i64, currency: Currency) -> Result<Self, MoneyError> {
        if minor_units <= 0 {
            return Err(MoneyError::NonPositiveAmount(minor_units));
        }
        Ok(Self {
            minor_units,
            currency,
        })
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.minor_units)
    }
}

// ---------------------------------------------------------------------------
// PaymentInterval
// ---------------------------------------------------------------------------

/// Billing cadence parsed from an ISO-8601 period string (`P1M`, `P3M`,
/// `P1Y`...). The gateway only supports month-based plans, so year
/// components normalize to 12x months and any other unit (weeks, days,
/// time components) is rejected rather than silently truncated.
///
/// The raw source string is kept verbatim for persistence, so a record
/// created from `P1Y` round-trips as `P1Y`, not `P12M`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInterval {
    source: String,
    months: u32,
}

impl PaymentInterval {
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let invalid = || MoneyError::InvalidInterval(input.to_string());

        let rest = input.strip_prefix('P').ok_or_else(invalid)?;
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut months: u32 = 0;
        let mut digits = String::new();
        let mut components = 0usize;

        for ch in rest.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                'Y' | 'M' => {
                    if digits.is_empty() {
                        return Err(invalid());
                    }
                    let value: u32 = digits.parse().map_err(|_| invalid())?;
                    let scaled = match ch {
                        'Y' => value.checked_mul(12),
                        _ => Some(value),
                    }
                    .ok_or_else(invalid)?;
                    months = months.checked_add(scaled).ok_or_else(invalid)?;
                    digits.clear();
                    components += 1;
                }
                // 'T' starts a time component, 'W'/'D' are sub-month units.
                _ => return Err(invalid()),
            }
        }

        if !digits.is_empty() || components == 0 {
            return Err(invalid());
        }
        if months == 0 {
            return Err(MoneyError::ZeroInterval(input.to_string()));
        }

        Ok(Self {
            source: input.to_string(),
            months,
        })
    }

    /// Total number of months covered by this interval.
    pub fn months(&self) -> u32 {
        self.months
    }

    /// The original period string, as persisted alongside the record.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PaymentInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Currency --

    #[test]
    fn currency_accepts_uppercase_alpha3() {
        let c = Currency::new("BYN").unwrap();
        assert_eq!(c.as_str(), "BYN");
        assert_eq!(c.to_string(), "BYN");
    }

    #[test]
    fn currency_rejects_lowercase() {
        assert_eq!(
            Currency::new("byn"),
            Err(MoneyError::InvalidCurrency("byn".to_string()))
        );
    }

    #[test]
    fn currency_rejects_wrong_length() {
        assert!(Currency::new("BY").is_err());
        assert!(Currency::new("BYNN").is_err());
        assert!(Currency::new("").is_err());
    }

    #[test]
    fn currency_rejects_digits() {
        assert!(Currency::new("B1N").is_err());
    }

    // -- Money --

    #[test]
    fn money_accepts_positive_minor_units() {
        let m = Money::from_minor_units(500, Currency::new("EUR").unwrap()).unwrap();
        assert_eq!(m.minor_units(), 500);
        assert_eq!(m.currency().as_str(), "EUR");
        assert_eq!(m.to_string(), "EUR 500");
    }

    #[test]
    fn money_rejects_zero() {
        let err = Money::from_minor_units(0, Currency::new("EUR").unwrap()).unwrap_err();
        assert_eq!(err, MoneyError::NonPositiveAmount(0));
    }

    #[test]
    fn money_rejects_negative() {
        let err = Money::from_minor_units(-100, Currency::new("EUR").unwrap()).unwrap_err();
        assert_eq!(err, MoneyError::NonPositiveAmount(-100));
    }

    // -- PaymentInterval --

    #[test]
    fn interval_parses_single_month() {
        let i = PaymentInterval::parse("P1M").unwrap();
        assert_eq!(i.months(), 1);
        assert_eq!(i.as_str(), "P1M");
    }

    #[test]
    fn interval_parses_quarterly() {
        assert_eq!(PaymentInterval::parse("P3M").unwrap().months(), 3);
    }

    #[test]
    fn interval_parses_years_as_months() {
        assert_eq!(PaymentInterval::parse("P1Y").unwrap().months(), 12);
        assert_eq!(PaymentInterval::parse("P2Y").unwrap().months(), 24);
    }

    #[test]
    fn interval_parses_combined_years_and_months() {
        let i = PaymentInterval::parse("P1Y6M").unwrap();
        assert_eq!(i.months(), 18);
        // Source string survives verbatim.
        assert_eq!(i.as_str(), "P1Y6M");
    }

    #[test]
    fn interval_rejects_zero_months() {
        assert_eq!(
            PaymentInterval::parse("P0M"),
            Err(MoneyError::ZeroInterval("P0M".to_string()))
        );
        assert_eq!(
            PaymentInterval::parse("P0Y0M"),
            Err(MoneyError::ZeroInterval("P0Y0M".to_string()))
        );
    }

    #[test]
    fn interval_rejects_missing_prefix() {
        assert_eq!(
            PaymentInterval::parse("1M"),
            Err(MoneyError::InvalidInterval("1M".to_string()))
        );
    }

    #[test]
    fn interval_rejects_bare_p() {
        assert!(PaymentInterval::parse("P").is_err());
    }

    #[test]
    fn interval_rejects_sub_month_units() {
        assert!(PaymentInterval::parse("P1W").is_err());
        assert!(PaymentInterval::parse("P30D").is_err());
        assert!(PaymentInterval::parse("PT1M").is_err());
    }

    #[test]
    fn interval_rejects_trailing_digits() {
        assert!(PaymentInterval::parse("P1M2").is_err());
    }

    #[test]
    fn interval_rejects_lowercase() {
        assert!(PaymentInterval::parse("p1m").is_err());
    }

    #[test]
    fn interval_rejects_empty() {
        assert!(PaymentInterval::parse("").is_err());
    }
}
