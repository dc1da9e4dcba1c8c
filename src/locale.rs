//! Supported interface languages and date formatting.
//!
//! Formatting always takes the language as an argument; nothing here keeps a
//! process-wide default.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(String);

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    pub fn chrono_locale(&self) -> chrono::Locale {
        match self {
            Language::En => chrono::Locale::en_GB,
            Language::Ru => chrono::Locale::ru_RU,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-gb" | "english" => Ok(Language::En),
            "ru" | "ru-ru" | "russian" => Ok(Language::Ru),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Long form, e.g. "1 January 2024".
pub fn format_date(date: NaiveDate, language: Language) -> String {
    format_with(date, "%-d %B %Y", language)
}

/// Russian month names in the nominative case. chrono's `%B` gives the
/// genitive ("января"), which only reads right after a day number.
const RU_MONTHS_NOMINATIVE: [&str; 12] = [
    "январь",
    "февраль",
    "март",
    "апрель",
    "май",
    "июнь",
    "июль",
    "август",
    "сентябрь",
    "октябрь",
    "ноябрь",
    "декабрь",
];

/// Month heading, e.g. "January 2024" or "январь 2024".
pub fn format_month(date: NaiveDate, language: Language) -> String {
    match language {
        Language::Ru => {
            let month = RU_MONTHS_NOMINATIVE[date.month0() as usize];
            format!("{month} {}", date.year())
        }
        Language::En => format_with(date, "%B %Y", language),
    }
}

fn format_with(date: NaiveDate, pattern: &str, language: Language) -> String {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .format_localized(pattern, language.chrono_locale())
        .to_string()
}
