//! Library error types.
//!
//! The converter functions themselves are total and never fail; errors
//! only arise when decoding or encoding the stored JSON form of a
//! document.

use thiserror::Error;

/// Errors from loading or storing a block document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid block document JSON")]
    Json(#[from] serde_json::Error),
}
