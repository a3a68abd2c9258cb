use crate::Timestamp;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The repeat rule could not be parsed or contradicts its definition.
    #[error("invalid repeat rule {rule:?}: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("invalid window: {to} is earlier than {from}")]
    InvalidWindow { from: Timestamp, to: Timestamp },

    #[error("invalid definition: {0}")]
    InvalidDefinition(&'static str),

    /// The rule text is not one of the configured repeat choices.
    #[error("repeat rule {0:?} is not an allowed choice")]
    RepeatNotAllowed(String),
}

impl Error {
    pub(crate) fn invalid_rule(rule: &str, reason: impl ToString) -> Self {
        Error::InvalidRule {
            rule: rule.to_owned(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
