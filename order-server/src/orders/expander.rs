//! Order expander
//!
//! Turns the drink lines of one checkout into one draft per physical cup.
//! Output order is input line order, then replication order within a line;
//! the allocator assigns unit suffixes `-1`, `-2`, ... in exactly this order.

use super::error::{CheckoutError, CheckoutResult};
use super::normalizer::{AttributeFallback, normalize_line};
use serde_json::Value;
use shared::order::{IceLevel, OrderLine, Size, SugarLevel};

/// Upper bound on cups for a single line
///
/// A quantity above it coerces fine but is rejected with
/// `QuantityTooLarge` instead of being expanded.
pub const MAX_QUANTITY_PER_LINE: u32 = 999;

/// One cup, before an order number is attached
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDraft {
    /// Index of the source line in the checkout
    pub line_index: usize,
    pub drink_name: String,
    pub size: Size,
    pub ice: IceLevel,
    pub sugar: SugarLevel,
}

/// Expanded checkout
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub units: Vec<UnitDraft>,
    /// Substituted defaults, tagged with their line index
    pub fallbacks: Vec<(usize, AttributeFallback)>,
}

/// Coerce a raw quantity to a positive cup count
///
/// Accepts integers, integral floats and numeric strings. A missing or
/// `null` quantity means one cup.
pub fn coerce_quantity(raw: Option<&Value>) -> Option<u32> {
    let quantity = match raw {
        None | Some(Value::Null) => return Some(1),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) => v,
            None => integral_f64(n.as_f64()?)?,
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(v) => v,
                Err(_) => integral_f64(s.parse::<f64>().ok()?)?,
            }
        }
        Some(_) => return None,
    };

    u32::try_from(quantity).ok().filter(|q| *q >= 1)
}

fn integral_f64(v: f64) -> Option<u64> {
    if v.is_finite() && v.fract() == 0.0 && v >= 1.0 && v <= u32::MAX as f64 {
        Some(v as u64)
    } else {
        None
    }
}

fn raw_quantity_text(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Expand a checkout into per-cup drafts
///
/// Every line is validated before anything is produced, so an error means
/// no cup of this checkout reaches the allocator.
pub fn expand(lines: &[OrderLine]) -> CheckoutResult<Expansion> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCheckout);
    }

    let mut quantities = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if line.drink_name.trim().is_empty() {
            return Err(CheckoutError::MissingDrinkName { line: idx });
        }
        let quantity = coerce_quantity(line.quantity.as_ref()).ok_or_else(|| {
            CheckoutError::InvalidQuantity {
                line: idx,
                raw: raw_quantity_text(line.quantity.as_ref()),
            }
        })?;
        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CheckoutError::QuantityTooLarge {
                line: idx,
                quantity,
                max: MAX_QUANTITY_PER_LINE,
            });
        }
        quantities.push(quantity);
    }

    let total: usize = quantities.iter().map(|q| *q as usize).sum();
    let mut expansion = Expansion {
        units: Vec::with_capacity(total),
        fallbacks: Vec::new(),
    };

    for (idx, (line, quantity)) in lines.iter().zip(quantities).enumerate() {
        let attrs = normalize_line(line);
        let draft = UnitDraft {
            line_index: idx,
            drink_name: line.drink_name.trim().to_string(),
            size: attrs.size,
            ice: attrs.ice,
            sugar: attrs.sugar,
        };
        expansion
            .units
            .extend(std::iter::repeat_n(draft, quantity as usize));
        expansion
            .fallbacks
            .extend(attrs.fallbacks.into_iter().map(|f| (idx, f)));
    }

    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_quantity_accepts_numeric_forms() {
        assert_eq!(coerce_quantity(None), Some(1));
        assert_eq!(coerce_quantity(Some(&Value::Null)), Some(1));
        assert_eq!(coerce_quantity(Some(&json!(2))), Some(2));
        assert_eq!(coerce_quantity(Some(&json!(3.0))), Some(3));
        assert_eq!(coerce_quantity(Some(&json!("4"))), Some(4));
        assert_eq!(coerce_quantity(Some(&json!(" 5 "))), Some(5));
        assert_eq!(coerce_quantity(Some(&json!("6.0"))), Some(6));
    }

    #[test]
    fn test_coerce_quantity_rejects_non_positive_and_garbage() {
        assert_eq!(coerce_quantity(Some(&json!("abc"))), None);
        assert_eq!(coerce_quantity(Some(&json!(0))), None);
        assert_eq!(coerce_quantity(Some(&json!(-1))), None);
        assert_eq!(coerce_quantity(Some(&json!(1.5))), None);
        assert_eq!(coerce_quantity(Some(&json!(""))), None);
        assert_eq!(coerce_quantity(Some(&json!(true))), None);
        assert_eq!(coerce_quantity(Some(&json!([2]))), None);
        assert_eq!(coerce_quantity(Some(&json!(u64::MAX))), None);
    }

    #[test]
    fn test_quantity_above_limit_is_its_own_error() {
        assert_eq!(coerce_quantity(Some(&json!(1000))), Some(1000));

        let lines = vec![
            OrderLine::new("紅茶"),
            OrderLine::new("綠茶").with_quantity(MAX_QUANTITY_PER_LINE + 1),
        ];
        match expand(&lines).unwrap_err() {
            CheckoutError::QuantityTooLarge {
                line,
                quantity,
                max,
            } => {
                assert_eq!(line, 1);
                assert_eq!(quantity, 1000);
                assert_eq!(max, MAX_QUANTITY_PER_LINE);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let lines = vec![OrderLine::new("紅茶").with_quantity(MAX_QUANTITY_PER_LINE)];
        assert_eq!(expand(&lines).unwrap().units.len(), 999);
    }

    #[test]
    fn test_expand_replicates_quantity() {
        let lines = vec![
            OrderLine::new("珍珠奶茶")
                .with_size("大杯")
                .with_ice("少冰")
                .with_sugar("半糖")
                .with_quantity(2),
        ];
        let expansion = expand(&lines).unwrap();

        assert_eq!(expansion.units.len(), 2);
        assert_eq!(expansion.units[0], expansion.units[1]);
        let unit = &expansion.units[0];
        assert_eq!(unit.drink_name, "珍珠奶茶");
        assert_eq!(unit.size, Size::Large);
        assert_eq!(unit.ice, IceLevel::Less);
        assert_eq!(unit.sugar, SugarLevel::Half);
    }

    #[test]
    fn test_expand_preserves_line_order() {
        let lines = vec![
            OrderLine::new("紅茶").with_quantity(2),
            OrderLine::new("綠茶"),
            OrderLine::new("奶茶").with_quantity("3"),
        ];
        let expansion = expand(&lines).unwrap();

        let names: Vec<&str> = expansion
            .units
            .iter()
            .map(|u| u.drink_name.as_str())
            .collect();
        assert_eq!(names, ["紅茶", "紅茶", "綠茶", "奶茶", "奶茶", "奶茶"]);
        let indices: Vec<usize> = expansion.units.iter().map(|u| u.line_index).collect();
        assert_eq!(indices, [0, 0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_expand_exact_count_for_each_quantity() {
        for n in 1..=20u32 {
            let expansion = expand(&[OrderLine::new("紅茶").with_quantity(n)]).unwrap();
            assert_eq!(expansion.units.len(), n as usize);
        }
    }

    #[test]
    fn test_invalid_quantity_rejects_whole_checkout() {
        let lines = vec![
            OrderLine::new("紅茶").with_quantity(2),
            OrderLine::new("綠茶").with_quantity("abc"),
        ];
        match expand(&lines) {
            Err(CheckoutError::InvalidQuantity { line, raw }) => {
                assert_eq!(line, 1);
                assert_eq!(raw, "abc");
            }
            other => panic!("expected InvalidQuantity, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_checkout_and_missing_name() {
        assert!(matches!(expand(&[]), Err(CheckoutError::EmptyCheckout)));
        assert!(matches!(
            expand(&[OrderLine::new("  ")]),
            Err(CheckoutError::MissingDrinkName { line: 0 })
        ));
    }

    #[test]
    fn test_fallbacks_are_tagged_with_line() {
        let lines = vec![
            OrderLine::new("紅茶")
                .with_size("小杯")
                .with_ice("去冰")
                .with_sugar("無糖"),
            OrderLine::new("綠茶")
                .with_size("小杯")
                .with_ice("去冰")
                .with_sugar("少糖"),
        ];
        let expansion = expand(&lines).unwrap();

        assert_eq!(expansion.fallbacks.len(), 1);
        assert_eq!(expansion.fallbacks[0].0, 1);
        assert_eq!(expansion.units[1].sugar, SugarLevel::Half);
    }
}
