//! Currency-tagged money values.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Fractional digits kept by every price.
pub const DECIMAL_PLACES: u32 = 2;

static CURRENCY_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

/// A decimal amount in one currency.
///
/// Comparison and arithmetic between two prices require the same currency.
/// Arithmetic with a bare number keeps the price's currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Price {
    currency: String,
    value: Decimal,
}

impl Price {
    /// Create a price from an ISO 4217 style code and an amount with at most
    /// two fractional digits.
    pub fn new(value: impl Into<Decimal>, currency: &str) -> Result<Self> {
        if !CURRENCY_CODE.is_match(currency) {
            return Err(Error::Validation(format!(
                "Invalid currency code '{}': expected three uppercase letters",
                currency
            )));
        }

        let value = value.into();
        if value.normalize().scale() > DECIMAL_PLACES {
            return Err(Error::Validation(format!(
                "Price value {} has more than {} decimal places",
                value, DECIMAL_PLACES
            )));
        }

        Ok(Self {
            currency: currency.to_string(),
            value: fixed_scale(value),
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    fn ensure_same_currency(&self, other: &Price) -> Result<()> {
        if self.currency != other.currency {
            return Err(Error::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }

    fn with_value(&self, value: Decimal) -> Price {
        Price {
            currency: self.currency.clone(),
            value: fixed_scale(value),
        }
    }

    /// Compare two prices of the same currency.
    pub fn try_cmp(&self, other: &Price) -> Result<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.value.cmp(&other.value))
    }

    pub fn try_add(&self, other: &Price) -> Result<Price> {
        self.ensure_same_currency(other)?;
        Ok(self.with_value(self.value + other.value))
    }

    pub fn try_sub(&self, other: &Price) -> Result<Price> {
        self.ensure_same_currency(other)?;
        Ok(self.with_value(self.value - other.value))
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl Add<Decimal> for Price {
    type Output = Price;

    fn add(self, rhs: Decimal) -> Price {
        self.with_value(self.value + rhs)
    }
}

impl Add<i64> for Price {
    type Output = Price;

    fn add(self, rhs: i64) -> Price {
        self + Decimal::from(rhs)
    }
}

impl Add<Price> for Decimal {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        rhs + self
    }
}

impl Sub<Decimal> for Price {
    type Output = Price;

    fn sub(self, rhs: Decimal) -> Price {
        self.with_value(self.value - rhs)
    }
}

impl Sub<i64> for Price {
    type Output = Price;

    fn sub(self, rhs: i64) -> Price {
        self - Decimal::from(rhs)
    }
}

impl Sub<Price> for Decimal {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        rhs.with_value(self - rhs.value)
    }
}

impl AddAssign<Decimal> for Price {
    fn add_assign(&mut self, rhs: Decimal) {
        self.value = fixed_scale(self.value + rhs);
    }
}

impl AddAssign<i64> for Price {
    fn add_assign(&mut self, rhs: i64) {
        *self += Decimal::from(rhs);
    }
}

impl SubAssign<Decimal> for Price {
    fn sub_assign(&mut self, rhs: Decimal) {
        self.value = fixed_scale(self.value - rhs);
    }
}

impl SubAssign<i64> for Price {
    fn sub_assign(&mut self, rhs: i64) {
        *self -= Decimal::from(rhs);
    }
}

/// Round to, and pad out to, exactly two fractional digits.
fn fixed_scale(value: Decimal) -> Decimal {
    let mut value = value.round_dp(DECIMAL_PLACES);
    value.rescale(DECIMAL_PLACES);
    value
}

/// Symbol and displayed fraction digits for well-known currencies.
fn currency_format(code: &str) -> Option<(&'static str, u32)> {
    match code {
        "JPY" => Some(("¥", 0)),
        "KRW" => Some(("₩", 0)),
        "USD" => Some(("$", 2)),
        "EUR" => Some(("€", 2)),
        "GBP" => Some(("£", 2)),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_amount(value: Decimal, fraction_digits: u32) -> String {
    let text = format!(
        "{:.*}",
        fraction_digits as usize,
        value.abs().round_dp(fraction_digits)
    );
    match text.split_once('.') {
        Some((int, frac)) => format!("{}.{}", group_thousands(int), frac),
        None => group_thousands(&text),
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value.is_sign_negative() && !self.value.is_zero() {
            "-"
        } else {
            ""
        };
        match currency_format(&self.currency) {
            Some((symbol, digits)) => {
                write!(f, "{}{}{}", sign, symbol, format_amount(self.value, digits))
            }
            None => write!(
                f,
                "{}{} {}",
                sign,
                format_amount(self.value, DECIMAL_PLACES),
                self.currency
            ),
        }
    }
}
