use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Rejected locally, no request was sent.
    #[error("{0}")]
    Validation(String),

    /// An identical mutation is still waiting for the server.
    #[error("{0} is already in progress")]
    InProgress(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SyncError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }
}
