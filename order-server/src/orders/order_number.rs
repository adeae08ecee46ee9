//! Order number codec
//!
//! Wire format: `{date prefix}{letter}{digit}-{n}`
//!
//! - date prefix: `MMDD` (default) or `YYYYMMDD`
//! - letter: `A`..=`Z`, digit: `1`..=`9` (234 slots per day)
//! - `{letter}{digit}` is the ticket number called out at the counter
//! - `n` is the 1-based cup index inside one checkout
//!
//! Slot sequence: `A1 .. A9, B1 .. Z9`, then wraps back to `A1`.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ticket slots available per day
pub const SLOT_COUNT: u16 = 26 * 9;

/// `{letter}{digit}` ticket slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketSlot {
    letter: char,
    digit: u8,
}

impl TicketSlot {
    pub const FIRST: TicketSlot = TicketSlot {
        letter: 'A',
        digit: 1,
    };

    pub fn new(letter: char, digit: u8) -> Option<Self> {
        if letter.is_ascii_uppercase() && (1..=9).contains(&digit) {
            Some(Self { letter, digit })
        } else {
            None
        }
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn digit(&self) -> u8 {
        self.digit
    }

    /// Position in the daily sequence, `A1` = 0, `Z9` = 233
    pub fn index(&self) -> u16 {
        (self.letter as u16 - 'A' as u16) * 9 + (self.digit as u16 - 1)
    }

    /// Inverse of [`TicketSlot::index`]; indices wrap modulo [`SLOT_COUNT`]
    pub fn from_index(index: u16) -> Self {
        let index = index % SLOT_COUNT;
        Self {
            letter: (b'A' + (index / 9) as u8) as char,
            digit: (index % 9) as u8 + 1,
        }
    }

    /// Parse a `{letter}{digit}` ticket such as `B7`
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(letter), Some(digit), None) => {
                TicketSlot::new(letter, digit.to_digit(10)? as u8)
            }
            _ => None,
        }
    }

    /// Successor slot; `Z9` wraps to `A1`
    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

impl fmt::Display for TicketSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.digit)
    }
}

/// Date prefix layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePrefix {
    /// `MMDD`
    #[default]
    MonthDay,
    /// `YYYYMMDD`
    YearMonthDay,
}

impl DatePrefix {
    pub fn format(&self, date: NaiveDate) -> String {
        match self {
            DatePrefix::MonthDay => date.format("%m%d").to_string(),
            DatePrefix::YearMonthDay => date.format("%Y%m%d").to_string(),
        }
    }
}

/// Checkout-level number shared by every cup: `{prefix}{slot}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseNumber {
    prefix: String,
    slot: TicketSlot,
}

impl BaseNumber {
    pub fn new(date: NaiveDate, layout: DatePrefix, slot: TicketSlot) -> Self {
        Self {
            prefix: layout.format(date),
            slot,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn slot(&self) -> TicketSlot {
        self.slot
    }

    /// Ticket number shown to the customer, e.g. `A5`
    pub fn ticket(&self) -> String {
        self.slot.to_string()
    }

    /// Full order number of the `n`-th cup (1-based)
    pub fn unit(&self, n: usize) -> String {
        format!("{}-{}", self, n)
    }

    /// Order numbers for `count` cups: `-1` ..= `-count`
    pub fn units(&self, count: usize) -> Vec<String> {
        (1..=count).map(|n| self.unit(n)).collect()
    }
}

impl fmt::Display for BaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberParseError {
    #[error("Order number missing unit suffix: {0}")]
    MissingUnit(String),

    #[error("Invalid unit index in order number: {0}")]
    InvalidUnit(String),

    #[error("Invalid date prefix in order number: {0}")]
    InvalidPrefix(String),

    #[error("Invalid ticket slot in order number: {0}")]
    InvalidSlot(String),
}

/// Parsed per-cup order number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumber {
    pub base: BaseNumber,
    pub unit: usize,
}

impl OrderNumber {
    pub fn parse(s: &str) -> Result<Self, OrderNumberParseError> {
        let (base, unit) = s
            .rsplit_once('-')
            .ok_or_else(|| OrderNumberParseError::MissingUnit(s.to_string()))?;

        let unit = unit
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| OrderNumberParseError::InvalidUnit(s.to_string()))?;

        if !base.is_ascii() || base.len() < 2 {
            return Err(OrderNumberParseError::InvalidSlot(s.to_string()));
        }
        let (prefix, slot) = base.split_at(base.len() - 2);
        if !matches!(prefix.len(), 4 | 8) || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberParseError::InvalidPrefix(s.to_string()));
        }

        let slot = TicketSlot::parse(slot)
            .ok_or_else(|| OrderNumberParseError::InvalidSlot(s.to_string()))?;

        Ok(Self {
            base: BaseNumber {
                prefix: prefix.to_string(),
                slot,
            },
            unit,
        })
    }

    pub fn ticket(&self) -> String {
        self.base.ticket()
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_slot_sequence() {
        let mut slot = TicketSlot::FIRST;
        let mut seen = vec![slot.to_string()];
        for _ in 0..9 {
            slot = slot.next();
            seen.push(slot.to_string());
        }
        assert_eq!(
            seen,
            ["A1", "A2", "A3", "A4", "A5", "A6", "A7", "A8", "A9", "B1"]
        );
    }

    #[test]
    fn test_slot_wraps_after_z9() {
        let z9 = TicketSlot::new('Z', 9).unwrap();
        assert_eq!(z9.index(), SLOT_COUNT - 1);
        assert_eq!(z9.next(), TicketSlot::FIRST);
    }

    #[test]
    fn test_slot_index_is_bijective() {
        for i in 0..SLOT_COUNT {
            assert_eq!(TicketSlot::from_index(i).index(), i);
        }
    }

    #[test]
    fn test_slot_rejects_out_of_range() {
        assert!(TicketSlot::new('a', 1).is_none());
        assert!(TicketSlot::new('A', 0).is_none());
        assert!(TicketSlot::new('A', 10).is_none());
    }

    #[test]
    fn test_slot_parse() {
        assert_eq!(TicketSlot::parse("B7"), TicketSlot::new('B', 7));
        assert!(TicketSlot::parse("B0").is_none());
        assert!(TicketSlot::parse("b7").is_none());
        assert!(TicketSlot::parse("B77").is_none());
        assert!(TicketSlot::parse("").is_none());
    }

    #[test]
    fn test_base_number_format() {
        let slot = TicketSlot::new('A', 5).unwrap();
        let base = BaseNumber::new(date(2025, 9, 18), DatePrefix::MonthDay, slot);

        assert_eq!(base.to_string(), "0918A5");
        assert_eq!(base.ticket(), "A5");
        assert_eq!(base.units(2), ["0918A5-1", "0918A5-2"]);

        let base = BaseNumber::new(date(2025, 9, 18), DatePrefix::YearMonthDay, slot);
        assert_eq!(base.unit(1), "20250918A5-1");
    }

    #[test]
    fn test_parse_order_number() {
        let parsed = OrderNumber::parse("0918A5-2").unwrap();
        assert_eq!(parsed.base.prefix(), "0918");
        assert_eq!(parsed.ticket(), "A5");
        assert_eq!(parsed.unit, 2);
        assert_eq!(parsed.to_string(), "0918A5-2");

        let parsed: OrderNumber = "20250918Z9-12".parse().unwrap();
        assert_eq!(parsed.base.prefix(), "20250918");
        assert_eq!(parsed.unit, 12);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            OrderNumber::parse("0918A5"),
            Err(OrderNumberParseError::MissingUnit(_))
        ));
        assert!(matches!(
            OrderNumber::parse("0918A5-0"),
            Err(OrderNumberParseError::InvalidUnit(_))
        ));
        assert!(matches!(
            OrderNumber::parse("918A5-1"),
            Err(OrderNumberParseError::InvalidPrefix(_))
        ));
        assert!(matches!(
            OrderNumber::parse("0918A0-1"),
            Err(OrderNumberParseError::InvalidSlot(_))
        ));
        assert!(OrderNumber::parse("0918甲5-1").is_err());
    }
}
