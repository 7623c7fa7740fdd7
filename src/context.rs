// Application context: selected country, price formatting and theme
//
// Preferences are read once when the context is loaded and written back
// explicitly on every change. No global state; callers pass the context
// around (or share it behind an `Arc`).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const COUNTRY_KEY: &str = "selectedCountry";
pub const THEME_KEY: &str = "theme";
pub const DEFAULT_COUNTRY_CODE: &str = "NG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub name: &'static str,
    pub code: &'static str,
    pub currency: &'static str,
    pub flag: &'static str,
    pub language: &'static str,
}

const fn country(
    name: &'static str,
    code: &'static str,
    currency: &'static str,
    flag: &'static str,
    language: &'static str,
) -> Country {
    Country {
        name,
        code,
        currency,
        flag,
        language,
    }
}

pub static COUNTRIES: [Country; 10] = [
    country("United States", "US", "USD", "🇺🇸", "en"),
    country("United Kingdom", "UK", "GBP", "🇬🇧", "en"),
    country("Canada", "CA", "CAD", "🇨🇦", "en"),
    country("Australia", "AU", "AUD", "🇦🇺", "en"),
    country("Germany", "DE", "EUR", "🇩🇪", "de"),
    country("France", "FR", "EUR", "🇫🇷", "fr"),
    country("Japan", "JP", "JPY", "🇯🇵", "ja"),
    country("India", "IN", "INR", "🇮🇳", "hi"),
    country("Nigeria", "NG", "NGN", "🇳🇬", "en"),
    country("Brazil", "BR", "BRL", "🇧🇷", "pt"),
];

pub fn find_country(code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.code == code)
}

pub fn default_country() -> &'static Country {
    &COUNTRIES[8]
}

/// Units of `currency` per naira; unknown currencies convert 1:1.
pub fn exchange_rate(currency: &str) -> f64 {
    match currency {
        "USD" => 0.0013,
        "GBP" => 0.0010,
        "CAD" => 0.0017,
        "AUD" => 0.0019,
        "EUR" => 0.0011,
        "JPY" => 0.15,
        "INR" => 0.10,
        "BRL" => 0.0063,
        _ => 1.0,
    }
}

fn currency_symbol(currency: &str) -> String {
    match currency {
        "USD" => "$".to_string(),
        "GBP" => "£".to_string(),
        "CAD" => "CA$".to_string(),
        "AUD" => "A$".to_string(),
        "EUR" => "€".to_string(),
        "JPY" => "¥".to_string(),
        "INR" => "₹".to_string(),
        "BRL" => "R$".to_string(),
        other => format!("{other} "),
    }
}

/// Convert a naira amount into `currency` and format it en-US style,
/// e.g. `$1,234.56`, `¥1,500`, `NGN 50,000.00`.
pub fn format_price(amount: f64, currency: &str) -> String {
    let converted = amount * exchange_rate(currency);
    let decimals: usize = if currency == "JPY" { 0 } else { 2 };
    // half-way amounts round away from zero, as en-US currency formatting does
    let factor = 10f64.powi(decimals as i32);
    let rounded = (converted.abs() * factor).round() / factor;
    let fixed = format!("{:.*}", decimals, rounded);

    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if converted < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{}{grouped}.{fraction}", currency_symbol(currency)),
        None => format!("{sign}{}{grouped}", currency_symbol(currency)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value persistence for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as one flat JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self.lock.lock();
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Country and theme selection, backed by a [`PreferenceStore`].
pub struct AppContext {
    store: Arc<dyn PreferenceStore>,
    country: &'static Country,
    theme: Theme,
}

impl AppContext {
    /// Read saved preferences once. Unreadable or unknown values fall back
    /// to Nigeria and the light theme.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let country = match store.get(COUNTRY_KEY) {
            Ok(Some(code)) => find_country(&code).unwrap_or_else(|| {
                debug!(code = %code, "ignoring unknown saved country");
                default_country()
            }),
            Ok(None) => default_country(),
            Err(e) => {
                warn!(error = %e, "could not read saved country");
                default_country()
            }
        };

        let theme = match store.get(THEME_KEY) {
            Ok(saved) => saved.as_deref().and_then(Theme::parse).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "could not read saved theme");
                Theme::default()
            }
        };

        Self {
            store,
            country,
            theme,
        }
    }

    pub fn country(&self) -> &'static Country {
        self.country
    }

    pub fn countries(&self) -> &'static [Country] {
        &COUNTRIES
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Select a country by code and persist it. Unknown codes leave the
    /// selection unchanged and return `Ok(false)`.
    pub fn set_country(&mut self, code: &str) -> Result<bool, PreferenceError> {
        let Some(country) = find_country(code) else {
            return Ok(false);
        };
        self.country = country;
        self.store.set(COUNTRY_KEY, country.code)?;
        Ok(true)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), PreferenceError> {
        self.theme = theme;
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PreferenceError> {
        let theme = self.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Format a naira amount in the selected country's currency.
    pub fn format_price(&self, amount: f64) -> String {
        format_price(amount, self.country.currency)
    }
}
