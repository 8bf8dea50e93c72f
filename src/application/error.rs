//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::services::StopReason;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add search-level outcomes.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no feasible merge order: all {evaluated} evaluated candidates were disqualified")]
    NoFeasibleTree { evaluated: u64 },

    #[error("search stopped early ({reason}) after {evaluated} candidates, none of them feasible")]
    SearchStopped { reason: StopReason, evaluated: u64 },

    #[error("invalid item file: {message}")]
    Input { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
