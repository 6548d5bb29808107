// Error types for the core components.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickemError {
    /// A record was structurally invalid. `field` names the offending field
    /// using the backend's JSON spelling (e.g. `week`, `user.firstName`).
    #[error("invalid input for field `{field}`: {message}")]
    InvalidInput { field: String, message: String },

    #[error("selection {nickname} does not match a game in the pick set")]
    UnknownSelection { nickname: String },

    #[error("{matchup} has already started - pick locked")]
    GameLocked { matchup: String },
}

impl PickemError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        PickemError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Tag an `InvalidInput` with the position of the record it came from.
    pub(crate) fn at_record(self, index: usize) -> Self {
        match self {
            PickemError::InvalidInput { field, message } => PickemError::InvalidInput {
                field,
                message: format!("record {index}: {message}"),
            },
            other => other,
        }
    }

    /// The offending field name, for `InvalidInput` errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            PickemError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PickemError>;
