//! Custom error types for the application.
//!
//! This module defines the primary error type, `AssetError`, for the entire
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failures the registry and
//! pipeline can produce.
//!
//! ## Error Hierarchy
//!
//! - **`DuplicateAsset`**: `add` was called with an id that is already
//!   registered. The registry is left unchanged.
//! - **`AssetNotFound`**: a lookup or removal referenced a name or id that is
//!   not present. Absence is always signalled explicitly, never reported as a
//!   null-equivalent value.
//! - **`InvalidAsset`**: an asset definition was malformed (missing required
//!   fields or an unrecognized kind tag) and was rejected before insertion.
//! - **`Persistence`**: the persistence collaborator failed for one record.
//!   Inside a batch this is carried on the record's outcome instead.
//! - **`Cancelled`**: a batch was cancelled before the record started.
//! - **`Config`** / **`Configuration`**: wraps figment load errors and
//!   semantic errors caught by the validation step, respectively.
//! - **`Io`**: wraps standard `std::io::Error`.

use crate::asset::AssetId;
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, AssetError>;

/// Central error enum for registry and pipeline operations.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset with id {0} already exists")]
    DuplicateAsset(AssetId),

    #[error("Asset '{0}' not found")]
    AssetNotFound(String),

    #[error("Invalid asset definition: {0}")]
    InvalidAsset(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Batch cancelled before record was processed")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn duplicate_error_names_the_id() {
        let id = Uuid::new_v4();
        let err = AssetError::DuplicateAsset(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn not_found_error_names_the_key() {
        let err = AssetError::AssetNotFound("West Ridge Turbine".into());
        assert!(err.to_string().contains("West Ridge Turbine"));
    }
}
