//! Error types for configuration loading

use thiserror::Error;

use super::field::Kind;

/// Standard result type for a load pass
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type returned by backends
pub type BackendResult<T> = Result<T, BackendError>;

/// Error in the declaration of a configuration type.
///
/// Always reported before any backend is contacted.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// Field metadata could not be parsed
    #[error("invalid config tag {tag:?} on field `{field}`: {reason}")]
    MalformedTag {
        /// Dotted path of the offending field
        field: String,
        /// Raw tag text
        tag: String,
        /// What is wrong with it
        reason: String,
    },

    /// A field names a backend that is not part of the chain
    #[error("field `{field}` (key {key:?}) requires backend {backend:?}, which is not configured")]
    UnknownBackend {
        /// Dotted path of the offending field
        field: String,
        /// Resolution key of the field
        key: String,
        /// Backend name requested by the field
        backend: String,
    },
}

impl DefinitionError {
    /// Create a malformed tag error
    pub fn malformed_tag(
        field: impl Into<String>,
        tag: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedTag {
            field: field.into(),
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown backend error
    pub fn unknown_backend(
        field: impl Into<String>,
        key: impl Into<String>,
        backend: impl Into<String>,
    ) -> Self {
        Self::UnknownBackend {
            field: field.into(),
            key: key.into(),
            backend: backend.into(),
        }
    }
}

/// A raw value that does not parse into the field's declared type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert {raw:?} for key {key:?} into {kind}: {reason}")]
pub struct ConversionError {
    /// Resolution key of the field
    pub key: String,
    /// Offending raw value (lossy UTF-8)
    pub raw: String,
    /// Declared type of the field
    pub kind: Kind,
    /// Parser message
    pub reason: String,
}

impl ConversionError {
    /// Create a conversion error
    pub fn new(
        key: impl Into<String>,
        raw: impl Into<String>,
        kind: Kind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            raw: raw.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Failure to parse raw bytes, before the key is known
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ParseFailure {
    /// Parser message
    pub reason: String,
}

impl ParseFailure {
    /// Create a parse failure
    pub fn new(reason: impl ToString) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }

    /// Attach the key and raw value this failure belongs to
    pub fn into_conversion(self, key: &str, raw: &[u8], kind: Kind) -> ConversionError {
        ConversionError::new(key, String::from_utf8_lossy(raw), kind, self.reason)
    }
}

/// Error returned by a backend
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend holds no value for the key
    #[error("key not found")]
    NotFound,

    /// The load context was canceled
    #[error("operation canceled")]
    Canceled,

    /// The load context deadline passed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The backend found a value but could not decode it into the target
    #[error("failed to decode value: {message}")]
    Decode {
        /// Decoder message
        message: String,
    },

    /// Any other infrastructure failure
    #[error("{message}")]
    Source {
        /// Error message
        message: String,
    },
}

impl BackendError {
    /// Create a decode error
    pub fn decode(message: impl ToString) -> Self {
        Self::Decode {
            message: message.to_string(),
        }
    }

    /// Create a source error
    pub fn source_error(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Check if this is the not-found signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Outcome of a failed load pass
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The configuration type is declared incorrectly
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A value was found but has the wrong shape
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A backend failed for a reason other than a missing key
    #[error("backend {backend:?} failed for key {key:?}: {source}")]
    Backend {
        /// Name of the failing backend
        backend: String,
        /// Key being resolved
        key: String,
        /// Backend error
        source: BackendError,
    },

    /// The load context was canceled
    #[error("configuration load canceled")]
    Canceled,

    /// The load context deadline passed
    #[error("configuration load deadline exceeded")]
    DeadlineExceeded,

    /// Required fields were left unresolved
    #[error("missing required configuration keys: {}", keys.join(", "))]
    MissingRequired {
        /// Every missing key, in walk order
        keys: Vec<String>,
    },
}

impl LoadError {
    /// Wrap a backend error, surfacing cancellation verbatim
    pub fn backend(backend: impl Into<String>, key: impl Into<String>, source: BackendError) -> Self {
        match source {
            BackendError::Canceled => Self::Canceled,
            BackendError::DeadlineExceeded => Self::DeadlineExceeded,
            source => Self::Backend {
                backend: backend.into(),
                key: key.into(),
                source,
            },
        }
    }

    /// Check if the error ended the pass early
    pub fn is_abort(&self) -> bool {
        !matches!(self, Self::MissingRequired { .. })
    }

    /// Missing keys, if this is a required-field violation
    pub fn missing_keys(&self) -> &[String] {
        match self {
            Self::MissingRequired { keys } => keys,
            _ => &[],
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Definition(_) => ErrorCategory::Definition,
            Self::Conversion(_) => ErrorCategory::Conversion,
            Self::Backend { .. } => ErrorCategory::Backend,
            Self::Canceled | Self::DeadlineExceeded => ErrorCategory::Interrupted,
            Self::MissingRequired { .. } => ErrorCategory::Missing,
        }
    }
}

/// Error category for grouping errors
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed configuration type
    Definition,
    /// Present but invalid value
    Conversion,
    /// Backend infrastructure failure
    Backend,
    /// Cancellation or deadline
    Interrupted,
    /// Required values absent
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_cancellation_surfaces_verbatim() {
        assert_eq!(
            LoadError::backend("env", "port", BackendError::Canceled),
            LoadError::Canceled
        );
        assert_eq!(
            LoadError::backend("env", "port", BackendError::DeadlineExceeded),
            LoadError::DeadlineExceeded
        );
        assert!(matches!(
            LoadError::backend("env", "port", BackendError::source_error("boom")),
            LoadError::Backend { .. }
        ));
    }

    #[test]
    fn missing_required_lists_every_key() {
        let err = LoadError::MissingRequired {
            keys: vec!["name".into(), "port".into()],
        };

        assert_eq!(
            err.to_string(),
            "missing required configuration keys: name, port"
        );
        assert!(!err.is_abort());
        assert_eq!(err.category(), ErrorCategory::Missing);
        assert_eq!(err.missing_keys(), ["name", "port"]);
    }

    #[test]
    fn conversion_error_names_key_value_and_kind() {
        let err = ParseFailure::new("invalid digit").into_conversion("port", b"80x", Kind::U16);

        assert_eq!(err.key, "port");
        assert_eq!(err.raw, "80x");
        assert_eq!(err.kind, Kind::U16);
        assert!(err.to_string().contains("u16"));
    }
}
