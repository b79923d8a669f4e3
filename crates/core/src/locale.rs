//! Currency locales supported by the report formatter.

use std::fmt;
use std::str::FromStr;

/// Where the currency glyph sits relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphPosition {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyLocale {
    KoKr,
    EnUs,
    JaJp,
    DeDe,
}

impl CurrencyLocale {
    pub const SUPPORTED: [&'static str; 4] = ["ko-KR", "en-US", "ja-JP", "de-DE"];

    pub fn tag(self) -> &'static str {
        match self {
            CurrencyLocale::KoKr => "ko-KR",
            CurrencyLocale::EnUs => "en-US",
            CurrencyLocale::JaJp => "ja-JP",
            CurrencyLocale::DeDe => "de-DE",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            CurrencyLocale::KoKr => "₩",
            CurrencyLocale::EnUs => "$",
            CurrencyLocale::JaJp => "¥",
            CurrencyLocale::DeDe => "€",
        }
    }

    pub fn glyph_position(self) -> GlyphPosition {
        match self {
            CurrencyLocale::DeDe => GlyphPosition::Suffix,
            _ => GlyphPosition::Prefix,
        }
    }

    pub fn group_separator(self) -> char {
        match self {
            CurrencyLocale::DeDe => '.',
            _ => ',',
        }
    }

    pub fn decimal_separator(self) -> char {
        match self {
            CurrencyLocale::DeDe => ',',
            _ => '.',
        }
    }

    /// Digits after the decimal separator for currency amounts.
    pub fn fraction_digits(self) -> usize {
        match self {
            CurrencyLocale::KoKr | CurrencyLocale::JaJp => 0,
            CurrencyLocale::EnUs | CurrencyLocale::DeDe => 2,
        }
    }
}

impl fmt::Display for CurrencyLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CurrencyLocale {
    type Err = String;

    /// Accepts BCP-47 style tags case-insensitively, with `-` or `_`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "ko-kr" => Ok(CurrencyLocale::KoKr),
            "en-us" => Ok(CurrencyLocale::EnUs),
            "ja-jp" => Ok(CurrencyLocale::JaJp),
            "de-de" => Ok(CurrencyLocale::DeDe),
            _ => Err(format!("unsupported currency locale: '{}'", s)),
        }
    }
}
