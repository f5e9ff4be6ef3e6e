use crate::types::DbId;

/// Domain errors shared by the backend crates.
///
/// Resources owned by another user are reported as not found, so there is no
/// separate forbidden case.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by a non-numeric key such as a session key.
    #[error("{entity} '{key}' not found")]
    NotFoundByKey { entity: &'static str, key: String },

    /// Input the caller can fix. The message is shown to the user.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
