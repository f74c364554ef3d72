use thiserror::Error;

/// Errors that can occur when interacting with a cart store.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// Quantities added to a cart must be positive.
    #[error("Invalid quantity {quantity}: must be a positive integer")]
    InvalidQuantity { quantity: u32 },

    /// The backing store could not be reached or returned data that could
    /// not be (de)serialized.
    #[error("Cart store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<redis::RedisError> for CartStoreError {
    fn from(err: redis::RedisError) -> Self {
        CartStoreError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for CartStoreError {
    fn from(err: serde_json::Error) -> Self {
        CartStoreError::StoreUnavailable(format!("malformed cart payload: {err}"))
    }
}

/// Result type for cart store operations.
pub type Result<T> = std::result::Result<T, CartStoreError>;
