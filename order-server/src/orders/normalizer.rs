//! Attribute normalizer
//!
//! Maps free-text / localized labels to canonical codes with static lookup
//! tables. Unmatched input never fails: it is replaced by a fixed default
//! and reported as an [`AttributeFallback`] so the caller can log it.
//!
//! | Attribute | Default |
//! |-----------|---------|
//! | sugar | `half` |
//! | ice | `iced` |
//! | size | `SMALL` |

use shared::order::{IceLevel, OrderLine, Size, SugarLevel};
use std::fmt;

pub const DEFAULT_SUGAR: SugarLevel = SugarLevel::Half;
pub const DEFAULT_ICE: IceLevel = IceLevel::Iced;
pub const DEFAULT_SIZE: Size = Size::Small;

const SUGAR_TABLE: &[(&str, SugarLevel)] = &[
    ("全糖", SugarLevel::Full),
    ("正常糖", SugarLevel::Full),
    ("七分糖", SugarLevel::Seventy),
    ("半糖", SugarLevel::Half),
    ("五分糖", SugarLevel::Half),
    ("三分糖", SugarLevel::Light),
    ("微糖", SugarLevel::Light),
    ("一分糖", SugarLevel::Light),
    ("無糖", SugarLevel::Free),
    ("无糖", SugarLevel::Free),
    ("不加糖", SugarLevel::Free),
];

const ICE_TABLE: &[(&str, IceLevel)] = &[
    ("正常冰", IceLevel::Iced),
    ("全冰", IceLevel::Iced),
    ("少冰", IceLevel::Less),
    ("微冰", IceLevel::Light),
    ("去冰", IceLevel::NoIce),
    ("熱", IceLevel::Hot),
    ("热", IceLevel::Hot),
    ("熱飲", IceLevel::Hot),
    ("热饮", IceLevel::Hot),
    ("溫", IceLevel::Room),
    ("温", IceLevel::Room),
    ("常溫", IceLevel::Room),
    ("常温", IceLevel::Room),
];

const SIZE_TABLE: &[(&str, Size)] = &[
    ("大杯", Size::Large),
    ("大", Size::Large),
    ("large", Size::Large),
    ("l", Size::Large),
    ("小杯", Size::Small),
    ("小", Size::Small),
    ("small", Size::Small),
    ("s", Size::Small),
];

/// Which attribute fell back to its default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Size,
    Ice,
    Sugar,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Size => "size",
            Attribute::Ice => "ice",
            Attribute::Sugar => "sugar",
        })
    }
}

/// A substituted default (not an error)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFallback {
    pub attribute: Attribute,
    /// `None` when the attribute was absent or blank
    pub raw: Option<String>,
    pub substituted: &'static str,
}

/// Canonical attributes of one order line
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAttributes {
    pub size: Size,
    pub ice: IceLevel,
    pub sugar: SugarLevel,
    pub fallbacks: Vec<AttributeFallback>,
}

fn clean(token: &str) -> String {
    token.trim().to_lowercase()
}

fn lookup<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(label, _)| *label == token)
        .map(|(_, value)| *value)
}

/// Look up a sugar label; canonical codes pass through unchanged
pub fn lookup_sugar(token: &str) -> Option<SugarLevel> {
    let token = clean(token);
    SugarLevel::from_code(&token).or_else(|| lookup(SUGAR_TABLE, &token))
}

/// Look up an ice label; canonical codes pass through unchanged
pub fn lookup_ice(token: &str) -> Option<IceLevel> {
    let token = clean(token);
    IceLevel::from_code(&token).or_else(|| lookup(ICE_TABLE, &token))
}

/// Look up a size label; `LARGE` / `SMALL` pass through unchanged
pub fn lookup_size(token: &str) -> Option<Size> {
    lookup(SIZE_TABLE, &clean(token))
}

fn resolve<T: Copy>(
    attribute: Attribute,
    raw: Option<&str>,
    default: T,
    code: fn(&T) -> &'static str,
    lookup: fn(&str) -> Option<T>,
    fallbacks: &mut Vec<AttributeFallback>,
) -> T {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    match raw.and_then(lookup) {
        Some(value) => value,
        None => {
            fallbacks.push(AttributeFallback {
                attribute,
                raw: raw.map(str::to_string),
                substituted: code(&default),
            });
            default
        }
    }
}

/// Normalize the attributes of one order line
///
/// Pure: fallbacks are returned, not logged.
pub fn normalize_line(line: &OrderLine) -> NormalizedAttributes {
    let mut fallbacks = Vec::new();

    let size = resolve(
        Attribute::Size,
        line.size.as_deref(),
        DEFAULT_SIZE,
        Size::code,
        lookup_size,
        &mut fallbacks,
    );
    let ice = resolve(
        Attribute::Ice,
        line.ice.as_deref(),
        DEFAULT_ICE,
        IceLevel::code,
        lookup_ice,
        &mut fallbacks,
    );
    let sugar = resolve(
        Attribute::Sugar,
        line.sugar.as_deref(),
        DEFAULT_SUGAR,
        SugarLevel::code,
        lookup_sugar,
        &mut fallbacks,
    );

    NormalizedAttributes {
        size,
        ice,
        sugar,
        fallbacks,
    }
}
