//! CLI-level errors (wraps application errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                crate::exitcode::NOINPUT
            }
            CliError::Io { .. } => crate::exitcode::IOERR,
            CliError::Application(e) => match e {
                ApplicationError::Domain(_) | ApplicationError::Input { .. } => {
                    crate::exitcode::DATAERR
                }
                ApplicationError::NoFeasibleTree { .. } => crate::exitcode::INFEASIBLE,
                ApplicationError::SearchStopped { .. } => crate::exitcode::TEMPFAIL,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_errors_when_mapping_exit_codes_then_sysexits_values() {
        let infeasible = CliError::from(ApplicationError::NoFeasibleTree { evaluated: 3 });
        assert_eq!(infeasible.exit_code(), crate::exitcode::INFEASIBLE);

        let stopped = CliError::from(ApplicationError::SearchStopped {
            reason: crate::application::services::StopReason::TimeLimit,
            evaluated: 0,
        });
        assert_eq!(stopped.exit_code(), crate::exitcode::TEMPFAIL);

        let invalid = CliError::from(DomainError::InvalidInputCount { count: 0, max: 9 });
        assert_eq!(invalid.exit_code(), crate::exitcode::DATAERR);

        let missing = CliError::io(
            "items.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);

        assert_eq!(CliError::Usage("x".into()).exit_code(), crate::exitcode::USAGE);
    }
}
