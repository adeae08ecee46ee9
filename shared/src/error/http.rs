//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::InvalidStatusTransition => StatusCode::CONFLICT,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::OrderNumberAllocationFailed | Self::TimeoutError | Self::SystemBusy => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::Unknown
            | Self::OrderNumberAllocationExhausted
            | Self::PersistenceBatchFailed
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageFull
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_status() {
        assert_eq!(ErrorCode::InvalidQuantity.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MissingDrinkName.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::QuantityTooLarge.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_allocation_statuses() {
        // retryable
        assert_eq!(
            ErrorCode::OrderNumberAllocationFailed.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        // operator attention
        assert_eq!(
            ErrorCode::OrderNumberAllocationExhausted.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::PersistenceBatchFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::InvalidStatusTransition.http_status(),
            StatusCode::CONFLICT
        );
    }
}
