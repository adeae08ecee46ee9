//! Checkout error taxonomy
//!
//! | Error | Class | Retry |
//! |-------|-------|-------|
//! | `InvalidQuantity` / `QuantityTooLarge` / `EmptyCheckout` / `MissingDrinkName` | Rejected | no |
//! | `OrderNumberAllocationFailed` | Retryable | whole checkout, later |
//! | `OrderNumberAllocationExhausted` | OperatorAlert | no |
//! | `PersistenceBatchFailed` | Retryable | whole checkout, later |
//! | `OrderNotFound` / `InvalidStatusTransition` | Rejected | no |
//! | `StorageUnavailable` / `Storage` | Retryable | yes |

use super::gateway::GatewayCallError;
use super::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::order::OrderStatus;
use thiserror::Error;

/// Message shown to customers for any failure after validation
pub const CHECKOUT_FAILED_MESSAGE: &str = "Order failed, please retry";

/// How the calling layer should react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input; retrying the same request fails again
    Rejected,
    /// Transient; the whole checkout may be retried later
    Retryable,
    /// Cursor or storage is likely corrupted
    OperatorAlert,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Invalid quantity on line {line}: {raw}")]
    InvalidQuantity { line: usize, raw: String },

    #[error("Quantity {quantity} on line {line} exceeds the limit of {max}")]
    QuantityTooLarge { line: usize, quantity: u32, max: u32 },

    #[error("Checkout contains no drink lines")]
    EmptyCheckout,

    #[error("Drink name missing on line {line}")]
    MissingDrinkName { line: usize },

    #[error("Order number allocation failed: {0}")]
    OrderNumberAllocationFailed(String),

    #[error("Order number allocation exhausted after {attempts} attempts (last base {last_base})")]
    OrderNumberAllocationExhausted { attempts: u32, last_base: String },

    #[error("Persisting order batch failed: {0}")]
    PersistenceBatchFailed(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid status transition for {order_number}: {from} -> {to}")]
    InvalidStatusTransition {
        order_number: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

impl CheckoutError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CheckoutError::InvalidQuantity { .. }
            | CheckoutError::QuantityTooLarge { .. }
            | CheckoutError::EmptyCheckout
            | CheckoutError::MissingDrinkName { .. }
            | CheckoutError::OrderNotFound(_)
            | CheckoutError::InvalidStatusTransition { .. } => ErrorClass::Rejected,
            CheckoutError::OrderNumberAllocationFailed(_)
            | CheckoutError::PersistenceBatchFailed(_)
            | CheckoutError::StorageUnavailable(_)
            | CheckoutError::Storage(_) => ErrorClass::Retryable,
            CheckoutError::OrderNumberAllocationExhausted { .. } => ErrorClass::OperatorAlert,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
            CheckoutError::QuantityTooLarge { .. } => ErrorCode::QuantityTooLarge,
            CheckoutError::EmptyCheckout => ErrorCode::OrderEmpty,
            CheckoutError::MissingDrinkName { .. } => ErrorCode::MissingDrinkName,
            CheckoutError::OrderNumberAllocationFailed(_) => {
                ErrorCode::OrderNumberAllocationFailed
            }
            CheckoutError::OrderNumberAllocationExhausted { .. } => {
                ErrorCode::OrderNumberAllocationExhausted
            }
            CheckoutError::PersistenceBatchFailed(_) => ErrorCode::PersistenceBatchFailed,
            CheckoutError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            CheckoutError::InvalidStatusTransition { .. } => ErrorCode::InvalidStatusTransition,
            CheckoutError::StorageUnavailable(_) => ErrorCode::TimeoutError,
            CheckoutError::Storage(e) => e.code(),
        }
    }
}

impl From<GatewayCallError> for CheckoutError {
    fn from(err: GatewayCallError) -> Self {
        match err {
            GatewayCallError::Storage(StorageError::OrderNotFound(number)) => {
                CheckoutError::OrderNotFound(number)
            }
            GatewayCallError::Storage(StorageError::InvalidTransition {
                order_number,
                from,
                to,
            }) => CheckoutError::InvalidStatusTransition {
                order_number,
                from,
                to,
            },
            GatewayCallError::Storage(e) => CheckoutError::Storage(e),
            other => CheckoutError::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        let code = err.code();
        match &err {
            // 输入错误：把原因返回给调用方
            CheckoutError::InvalidQuantity { line, raw } => {
                AppError::with_message(code, err.to_string())
                    .with_detail("line", *line)
                    .with_detail("quantity", raw.clone())
            }
            CheckoutError::QuantityTooLarge {
                line,
                quantity,
                max,
            } => AppError::with_message(code, err.to_string())
                .with_detail("line", *line)
                .with_detail("quantity", *quantity)
                .with_detail("max", *max),
            CheckoutError::MissingDrinkName { line } => {
                AppError::with_message(code, err.to_string()).with_detail("line", *line)
            }
            CheckoutError::EmptyCheckout
            | CheckoutError::OrderNotFound(_)
            | CheckoutError::InvalidStatusTransition { .. } => {
                AppError::with_message(code, err.to_string())
            }
            // 内部错误：分类只进日志，用户只看到通用提示
            _ => AppError::with_message(code, CHECKOUT_FAILED_MESSAGE),
        }
    }
}
