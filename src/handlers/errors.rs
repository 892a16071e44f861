use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NoticeKind;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandError {
    #[error("{message}")]
    ValidationError { message: String },

    #[error("{message}")]
    RemoteError { message: String },

    #[error("{message}")]
    NetworkError { message: String },

    #[error("{message}")]
    CapacityError { message: String },

    #[error("Busy: {message}")]
    BusyError { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteError {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    pub fn capacity(message: impl Into<String>) -> Self {
        Self::CapacityError {
            message: message.into(),
        }
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::BusyError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// How the error is presented to the user.
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            Self::ValidationError { .. } | Self::BusyError { .. } => NoticeKind::Alert,
            Self::CapacityError { .. } => NoticeKind::Info,
            Self::RemoteError { .. }
            | Self::NetworkError { .. }
            | Self::NotFound { .. }
            | Self::InternalError { .. } => NoticeKind::Error,
        }
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(error: anyhow::Error) -> Self {
        // Service errors keep their typed form when they carry one.
        match error.downcast::<CommandError>() {
            Ok(command_error) => command_error,
            Err(other) => Self::InternalError {
                message: other.to_string(),
            },
        }
    }
}

impl From<CommandError> for String {
    fn from(error: CommandError) -> Self {
        error.to_string()
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
