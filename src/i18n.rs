// ==========================================
// Localization (i18n)
// ==========================================
// Backed by rust-i18n (locales/es.yml, locales/en.yml)
// Spanish is the default; English is available for reports
// ==========================================
// Note: rust_i18n::i18n! is initialized in lib.rs
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display locale
///
/// Passed explicitly into presentation functions; the KPI formulas never
/// look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Locale code as used by the locales/*.yml files
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    /// Parse a locale code ("es", "es-ES", "en", "en-US", ...)
    pub fn from_code(code: &str) -> Option<Self> {
        let lang = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_lowercase();
        match lang.as_str() {
            "es" => Some(Locale::Es),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Thousands separator
    pub fn group_separator(&self) -> char {
        match self {
            Locale::Es => '.',
            Locale::En => ',',
        }
    }

    /// Decimal separator
    pub fn decimal_separator(&self) -> char {
        match self {
            Locale::Es => ',',
            Locale::En => '.',
        }
    }

    /// Minimum number of integer digits before grouping kicks in
    ///
    /// es-ES leaves four-digit numbers ungrouped ("1000", "10.000").
    pub fn min_grouping_digits(&self) -> usize {
        match self {
            Locale::Es => 5,
            Locale::En => 4,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Translate a message (no arguments)
///
/// # Example
/// ```no_run
/// use poultry_metrics::i18n::{t, Locale};
/// let msg = t(Locale::Es, "relative.today");
/// ```
pub fn t(locale: Locale, key: &str) -> String {
    rust_i18n::t!(key, locale = locale.code()).to_string()
}

/// Translate a message with `%{name}` placeholders
///
/// # Example
/// ```no_run
/// use poultry_metrics::i18n::{t_with_args, Locale};
/// let msg = t_with_args(Locale::Es, "relative.days", &[("count", "3")]);
/// ```
pub fn t_with_args(locale: Locale, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
