//! Shared types for the drink ordering system
//!
//! Types that cross the boundary between the order server, the admin backend
//! and the customer frontend: order lines, persisted unit orders, the unified
//! error system and the API response envelope.

pub mod error;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
