//! Price estimates and their display formatting

use serde::Serialize;
use std::fmt;

/// A single predicted price in US dollars
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEstimate {
    pub usd: f64,
}

impl PriceEstimate {
    pub fn new(usd: f64) -> Self {
        Self { usd }
    }
}

impl fmt::Display for PriceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Estimated Price (USD): {}", format_usd(self.usd))
    }
}

/// Format an amount as `$1,234,567.89`.
///
/// Negative amounts keep the sign after the dollar sign (`$-12.50`).
/// Non-finite amounts render as `$nan`, `$inf` or `$-inf`.
pub fn format_usd(amount: f64) -> String {
    if amount.is_nan() {
        return "$nan".to_string();
    }
    if amount.is_infinite() {
        return if amount > 0.0 { "$inf" } else { "$-inf" }.to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    format!("${}{}.{}", sign, grouped, cents)
}
