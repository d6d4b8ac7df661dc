//! Error handling for GeoForge
//!
//! Provides the error types shared by every layer of the engine:
//! - Sync errors (conversion failures the store absorbs)
//! - Projection errors (unknown or malformed coordinate reference systems)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::types::TextFormat;

/// Synchronization error type
///
/// Represents a failed conversion between the views of a document.
/// The store never lets these escape its public operations; they are
/// reported through `SyncReport` and the document event bus instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The text could not be parsed at all
    #[error("Invalid {format} syntax: {reason}")]
    InvalidSyntax {
        /// Format the text was parsed as.
        format: TextFormat,
        /// What the parser rejected.
        reason: String,
    },

    /// The text parsed but does not describe a recognized geospatial shape
    #[error("Unsupported {format} shape: {found}")]
    UnsupportedShape {
        /// Format the text was parsed as.
        format: TextFormat,
        /// The unrecognized type or structure.
        found: String,
    },

    /// An operation produced zero features
    #[error("{operation} produced no features")]
    EmptyResult {
        /// The operation that came back empty.
        operation: String,
    },

    /// The document is too large for an expensive derived view
    #[error("Document of {length} characters exceeds the {limit} character limit")]
    ThresholdExceeded {
        /// Length of the document in characters.
        length: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A coordinate could not be moved between reference systems
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl SyncError {
    /// Create an `InvalidSyntax` error
    pub fn invalid_syntax(format: TextFormat, reason: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            format,
            reason: reason.into(),
        }
    }

    /// Create an `UnsupportedShape` error
    pub fn unsupported_shape(format: TextFormat, found: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            format,
            found: found.into(),
        }
    }

    /// Short machine-friendly name of the error kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSyntax { .. } => "invalid_syntax",
            Self::UnsupportedShape { .. } => "unsupported_shape",
            Self::EmptyResult { .. } => "empty_result",
            Self::ThresholdExceeded { .. } => "threshold_exceeded",
            Self::Projection(_) => "projection",
        }
    }
}

/// Projection error type
///
/// Represents errors raised by the projection service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The CRS identifier is not registered
    #[error("Unknown coordinate reference system: {id}")]
    UnknownCrs {
        /// The unknown identifier.
        id: String,
    },

    /// A CRS definition string could not be understood
    #[error("Invalid definition for {id}: {reason}")]
    InvalidDefinition {
        /// The identifier being registered.
        id: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// A coordinate falls outside the domain of a projection
    #[error("Coordinate ({x}, {y}) is outside the domain of {id}")]
    OutOfDomain {
        /// The CRS whose domain was exceeded.
        id: String,
        /// X / longitude.
        x: f64,
        /// Y / latitude.
        y: f64,
    },
}

/// Main error type for GeoForge
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Conversion error
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Projection error
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a parse failure of either text format
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::Sync(SyncError::InvalidSyntax { .. } | SyncError::UnsupportedShape { .. })
        )
    }

    /// Check if this is a projection error
    pub fn is_projection_error(&self) -> bool {
        matches!(
            self,
            Error::Projection(_) | Error::Sync(SyncError::Projection(_))
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
