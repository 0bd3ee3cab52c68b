// Utilitários para manipulação de valores monetários

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Currencies the gateway settles in whole units.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

const THREE_DECIMAL_CURRENCIES: &[&str] = &["bhd", "jod", "kwd", "omr", "tnd"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("amount {0} is out of range")]
    Overflow(Decimal),
}

/// Lowercase ISO 4217 code, the form the gateway expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn parse(code: &str) -> Result<Self, MoneyError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal places between the major and the minor unit.
    pub fn minor_unit_exponent(&self) -> u32 {
        if ZERO_DECIMAL_CURRENCIES.contains(&self.as_str()) {
            0
        } else if THREE_DECIMAL_CURRENCIES.contains(&self.as_str()) {
            3
        } else {
            2
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("aud".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gross amount split between the platform and the freelancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub gross: Decimal,
    pub platform_fee: Decimal,
    pub freelancer_amount: Decimal,
}

/// Splits `amount` into the platform commission and the freelancer's share.
///
/// The fee is `amount * rate` rounded half away from zero to a whole unit of
/// whatever unit `amount` is expressed in; the freelancer keeps the rest, so
/// `platform_fee + freelancer_amount == amount` always holds.
pub fn split_platform_fee(amount: Decimal, rate: Decimal) -> Result<FeeSplit, MoneyError> {
    let platform_fee = amount
        .checked_mul(rate)
        .ok_or(MoneyError::Overflow(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    Ok(FeeSplit {
        gross: amount,
        platform_fee,
        freelancer_amount: (amount - platform_fee).normalize(),
    })
}

/// Same split for an amount already in minor units, as the gateway reports it.
pub fn split_minor_units(minor: i64, rate: Decimal) -> Result<(i64, i64), MoneyError> {
    let split = split_platform_fee(Decimal::from(minor), rate)?;
    let fee = split
        .platform_fee
        .to_i64()
        .ok_or(MoneyError::Overflow(split.platform_fee))?;
    Ok((fee, minor - fee))
}

pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::NegativeAmount);
    }
    let scale = Decimal::from(10_i64.pow(currency.minor_unit_exponent()));
    amount
        .checked_mul(scale)
        .ok_or(MoneyError::Overflow(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::Overflow(amount))
}

pub fn from_minor_units(minor: i64, currency: &Currency) -> Decimal {
    Decimal::new(minor, currency.minor_unit_exponent())
}

pub fn format_currency(minor: i64, currency: &Currency) -> String {
    format!(
        "{} {}",
        currency.as_str().to_ascii_uppercase(),
        from_minor_units(minor, currency)
    )
}
