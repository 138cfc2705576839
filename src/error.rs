//! Contains the error-related types for the `indexed_bson` crate.

use thiserror::Error;

use crate::spec::ElementType;

/// The result type for all methods that can return an error in the `indexed_bson` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `indexed_bson` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key associated with the error, if any.
    pub key: Option<String>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        }

        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur in the `indexed_bson` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A key could not be written as a BSON cstring.
    #[error("Invalid key: {message}")]
    #[non_exhaustive]
    InvalidKey { message: String },

    /// A byte range fell outside the used region of a document's storage.
    #[error("Range {offset}..{offset}+{length} is out of bounds for {used} used bytes")]
    #[non_exhaustive]
    OutOfBounds {
        offset: usize,
        length: usize,
        used: usize,
    },

    /// A value or document is longer than a BSON length field can describe.
    #[error("Length {length} exceeds the maximum BSON length of {}", i32::MAX)]
    #[non_exhaustive]
    TooLarge { length: usize },

    /// Malformed BSON bytes were encountered.
    #[error("Malformed BSON bytes: {message}")]
    #[non_exhaustive]
    MalformedBytes { message: String },

    /// An error occurred when attempting to access a value in a document.
    #[error("An error occurred when attempting to access a document value: {kind}")]
    #[non_exhaustive]
    ValueAccess {
        /// The kind of error that occurred.
        kind: ValueAccessErrorKind,
    },

    /// A string could not be parsed into the requested value type.
    #[error("Could not parse value: {message}")]
    #[non_exhaustive]
    Parse { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, key: None }
    }
}

/// The types of errors that can occur when attempting to access a value in a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValueAccessErrorKind {
    /// No value for the specified key was present in the document.
    #[error("The key was not present in the document")]
    NotPresent,

    /// The type of the value in the document did not match the requested type.
    #[error("Expected type {expected:?}, got type {actual:?}")]
    #[non_exhaustive]
    UnexpectedType {
        /// The actual type of the value.
        actual: ElementType,

        /// The expected type of the value.
        expected: ElementType,
    },
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn invalid_key(message: impl ToString) -> Self {
        ErrorKind::InvalidKey {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn out_of_bounds(offset: usize, length: usize, used: usize) -> Self {
        ErrorKind::OutOfBounds {
            offset,
            length,
            used,
        }
        .into()
    }

    pub(crate) fn too_large(length: usize) -> Self {
        ErrorKind::TooLarge { length }.into()
    }

    pub(crate) fn malformed_bytes(message: impl ToString) -> Self {
        ErrorKind::MalformedBytes {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn parse(message: impl ToString) -> Self {
        ErrorKind::Parse {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn value_access_not_present() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::NotPresent,
        }
        .into()
    }

    pub(crate) fn value_access_unexpected_type(actual: ElementType, expected: ElementType) -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType { actual, expected },
        }
        .into()
    }

    #[cfg(test)]
    pub(crate) fn is_value_access_not_present(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::NotPresent,
                ..
            }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_value_access_unexpected_type(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::UnexpectedType { .. },
                ..
            }
        )
    }
}
