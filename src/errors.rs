/*!
 * Error types for the polyglot library.
 *
 * Resolution outcomes (a null value, a fallback cycle) and deletion vetoes
 * are ordinary results and never show up here. These types only cover
 * storage failures and invalid configuration, using the thiserror crate
 * for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by a translation storage collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying query could not be executed
    #[error("Storage query failed: {0}")]
    QueryFailed(String),

    /// The row was refused by validation or a storage constraint
    #[error("Translation rejected: {0}")]
    Rejected(String),

    /// An update or delete was attempted on a record that was never stored
    #[error("Translation for language '{language}' has not been stored yet")]
    NotPersisted {
        /// Language of the offending record
        language: String,
    },

    /// The base record does not provide a value for a link field
    #[error("Base record has no value for link field '{0}'")]
    MissingLinkValue(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Rejected(message.unwrap_or_else(|| code.to_string()))
            }
            other => Self::QueryFailed(other.to_string()),
        }
    }
}

/// Errors found while validating configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// No translatable attribute was configured
    #[error("At least one translation attribute is required")]
    NoAttributes,

    /// The same attribute was listed twice
    #[error("Translation attribute '{0}' is listed more than once")]
    DuplicateAttribute(String),

    /// A translatable attribute shadows the language field or a link field
    #[error("Translation attribute '{0}' collides with a reserved field")]
    ReservedAttribute(String),

    /// A language tag was empty or blank
    #[error("Empty language tag in {0}")]
    EmptyLanguage(&'static str),

    /// The relation has no link fields
    #[error("Relation '{0}' must link at least one field")]
    EmptyRelation(String),

    /// A name used in generated SQL is not a plain identifier
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),
}
