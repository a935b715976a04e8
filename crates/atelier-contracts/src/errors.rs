use thiserror::Error;

/// Failure modes of the profile store and its backing service.
///
/// Capacity rejections are deliberately absent: running into the tag budget
/// is a silent no-op at the surface, reported as a
/// [`SelectionChange::Rejected`](crate::style::SelectionChange) outcome
/// rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("profile service unavailable: {0}")]
    Transient(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}
