//! Drink order types
//!
//! - [`OrderLine`]: parsed, not yet normalized input line
//! - [`NormalizedUnitOrder`]: persisted record, one per cup
//! - [`CheckoutReceipt`]: what a checkout hands back to the caller

pub mod line;
pub mod receipt;
pub mod types;
pub mod unit;

// Re-exports
pub use line::OrderLine;
pub use receipt::{CheckoutReceipt, CheckoutRequest, OrderStats, StatusUpdateRequest};
pub use types::{IceLevel, OrderStatus, Size, SugarLevel, WeatherStatus};
pub use unit::NormalizedUnitOrder;
