//! Fixed enumeration of the markets, instruments, units and currencies this
//! service tracks. Loaded once at startup and immutable for the process
//! lifetime; every code here must exist in the reference tables (checked by
//! `services::seed_check` before the server starts).

pub const HELLOLINKER_BASE_URL: &str = "https://hellolinker.net";

/// A tracked foreign currency plus the ordered list of source page slugs
/// known to serve it. Alternates exist because the upstream site aliases
/// some currencies (e.g. `won`/`krw`).
pub struct FxCurrency {
    pub code: &'static str,
    pub slugs: &'static [&'static str],
}

pub const FX_MARKET_CODE: &str = "MARKET_FX";

pub const FX_CURRENCIES: &[FxCurrency] = &[
    FxCurrency { code: "USD", slugs: &["usd"] },
    FxCurrency { code: "EUR", slugs: &["eur"] },
    FxCurrency { code: "SGD", slugs: &["sgd"] },
    FxCurrency { code: "THB", slugs: &["thb"] },
    FxCurrency { code: "MYR", slugs: &["myr"] },
    FxCurrency { code: "JPY", slugs: &["jpy"] },
    FxCurrency { code: "CNY", slugs: &["cny"] },
    FxCurrency { code: "WON", slugs: &["won", "krw"] },
    FxCurrency { code: "GBP", slugs: &["gbp"] },
    FxCurrency { code: "AUD", slugs: &["aud"] },
    FxCurrency { code: "CAD", slugs: &["cad"] },
    FxCurrency { code: "NTD", slugs: &["ntd", "twd"] },
    FxCurrency { code: "AED", slugs: &["aed"] },
    FxCurrency { code: "INR", slugs: &["inr"] },
    FxCurrency { code: "HKD", slugs: &["hkd"] },
    FxCurrency { code: "MOP", slugs: &["mop"] },
];

/// Instrument code for a currency pair quoted against MMK.
pub fn fx_pair_code(currency_code: &str) -> String {
    format!("{currency_code}MMK")
}

pub fn fx_pair_codes() -> Vec<String> {
    FX_CURRENCIES.iter().map(|c| fx_pair_code(c.code)).collect()
}

pub const BANK_MARKET_CODES: &[&str] = &["AYA", "KBZ", "YOMA", "CB", "MCB"];

pub const WORLD_GOLD_MARKET_CODE: &str = "WORLD_GOLD";
pub const WORLD_GOLD_INSTRUMENTS: &[&str] =
    &["GOLD_24K", "GOLD_22K", "GOLD_21K", "GOLD_18K"];

pub const MM_GOLD_MARKET_CODE: &str = "MM_GOLD";
pub const MM_GOLD_INSTRUMENTS: &[&str] = &[
    "MM_GOLD_24K",
    "MM_GOLD_23K",
    "MM_GOLD_22K",
    "MM_GOLD_21K",
    "MM_GOLD_20K",
    "MM_GOLD_18K",
    "MM_GOLD_16K",
    "MM_GOLD_14K",
];

pub const FUEL_MARKET_CODE: &str = "MM_FUEL";
pub const FUEL_INSTRUMENTS: &[&str] = &[
    "FUEL_DIESEL",
    "FUEL_PREMIUM_DIESEL",
    "FUEL_OCTANE_92",
    "FUEL_OCTANE_95",
];

// Units & currencies
pub const MMK_CODE: &str = "MMK";
pub const USD_CODE: &str = "USD";
/// One unit of the quote currency; used for plain exchange rates.
pub const UNIT_BASE_CURRENCY: &str = "UNIT_1_BASE";
pub const UNIT_OUNCE: &str = "OZ";
pub const UNIT_KYAT_THA: &str = "KYAT_THA";
pub const UNIT_LITRE: &str = "LITRE";
