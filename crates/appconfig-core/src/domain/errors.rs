//! Errors - エラー型と分類
//!
//! Every service operation fails with one `ServiceError`; callers branch on
//! `ErrorKind` rather than on a zoo of error types.

use std::fmt;

use thiserror::Error;

use super::ids::ApplicationId;

/// ErrorKind は失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field or argument was blank, empty or malformed.
    Validation,
    /// The addressed application id does not exist.
    NotFound,
    /// Create supplied an id that already exists, or a write raced a newer revision.
    Conflict,
    /// The entity store or command catalog failed.
    Store,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Store => "store error",
        };
        f.write_str(name)
    }
}

/// ServiceError はサービス層のエラー
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(id: &ApplicationId) -> Self {
        Self::new(ErrorKind::NotFound, format!("no application with id '{id}'"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_includes_kind_and_message() {
        let err = ServiceError::not_found(&ApplicationId::new("spark"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "not found: no application with id 'spark'");
    }

    #[test]
    fn source_is_exposed() {
        let io = std::io::Error::other("disk gone");
        let err = ServiceError::store("write failed").with_source(io);

        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk gone"));
    }
}
