use crate::error::{FaretabError, Result};

/// Display symbol for a recognized ISO 4217 code.
///
/// Amounts are never converted; the code is only formatted and labeled.
/// Unrecognized codes fail; whether to fall back to printing the raw
/// code is the caller's decision.
pub fn symbol_for(code: &str) -> Result<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "¥",
        "KRW" => "₩",
        "INR" => "₹",
        "BRL" => "R$",
        "CHF" => "CHF ",
        "CAD" => "CA$",
        "AUD" => "A$",
        "SEK" => "kr ",
        "NOK" => "kr ",
        "DKK" => "kr ",
        "PLN" => "zł",
        "CZK" => "Kč ",
        "TRY" => "₺",
        "THB" => "฿",
        "MXN" => "MX$",
        "ZAR" => "R ",
        _ => return Err(FaretabError::UnknownCurrency(code.to_string())),
    };
    Ok(symbol)
}

/// Number formatting rules for amount labels.
pub struct CurrencyFormat {
    pub code: String,
    pub symbol: String,
}

impl CurrencyFormat {
    /// Resolve a code into its display symbol. Case-insensitive on the
    /// way in; fails with `UnknownCurrency` for codes outside the
    /// recognized set.
    pub fn resolve(code: &str) -> Result<Self> {
        let code = code.to_uppercase();
        let symbol = symbol_for(&code)?.to_string();
        Ok(Self { code, symbol })
    }

    /// Fallback used after a failed resolve: label with the raw code.
    pub fn raw(code: &str) -> Self {
        let code = code.to_uppercase();
        Self {
            symbol: format!("{code} "),
            code,
        }
    }

    pub fn format(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol, amount)
    }
}
