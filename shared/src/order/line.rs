//! Parsed order line - the input shape produced by the text/voice analyzer

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One drink line of a checkout, as parsed from customer input
///
/// Every attribute except the drink name is optional and free-text; the
/// order server normalizes them. `quantity` stays a raw JSON value because
/// analyzers emit `2`, `"2"` or `2.0` interchangeably.
///
/// ```json
/// { "drink_name": "珍珠奶茶", "size": "大杯", "ice": "少冰", "sugar": "半糖", "quantity": 2 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderLine {
    #[serde(default)]
    pub drink_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
}

impl OrderLine {
    pub fn new(drink_name: impl Into<String>) -> Self {
        Self {
            drink_name: drink_name.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_ice(mut self, ice: impl Into<String>) -> Self {
        self.ice = Some(ice.into());
        self
    }

    pub fn with_sugar(mut self, sugar: impl Into<String>) -> Self {
        self.sugar = Some(sugar.into());
        self
    }

    pub fn with_quantity(mut self, quantity: impl Into<Value>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }
}
