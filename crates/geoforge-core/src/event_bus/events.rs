//! Event type definitions for the document bus.

use serde::{Deserialize, Serialize};

use crate::types::{DocumentMode, TextFormat, UpdateOrigin, WktDisplayMode};

/// Events published by a document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentEvent {
    /// The GeoJSON buffer was rewritten
    GeojsonChanged {
        /// Who caused the rewrite.
        origin: UpdateOrigin,
        /// New length in characters.
        length: usize,
    },
    /// The WKT buffer was rewritten
    WktChanged {
        /// Who caused the rewrite.
        origin: UpdateOrigin,
    },
    /// The detected document mode changed
    ModeChanged {
        from: DocumentMode,
        to: DocumentMode,
    },
    /// The active projection changed
    ProjectionChanged { from: String, to: String },
    /// The WKT layout changed
    WktDisplayModeChanged { mode: WktDisplayMode },
    /// The WKT view was skipped because the document is too large
    DerivedViewSkipped { length: usize, limit: usize },
    /// A buffer could not be converted; the derived buffer kept its value
    ConversionFailed {
        /// Format of the text that failed.
        format: TextFormat,
        /// Error kind, see `SyncError::kind`.
        kind: String,
        /// Human readable message.
        message: String,
    },
}

impl DocumentEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            Self::GeojsonChanged { .. } | Self::WktChanged { .. } => EventCategory::Buffer,
            Self::ModeChanged { .. }
            | Self::ProjectionChanged { .. }
            | Self::WktDisplayModeChanged { .. } => EventCategory::Settings,
            Self::DerivedViewSkipped { .. } | Self::ConversionFailed { .. } => {
                EventCategory::Diagnostic
            }
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            Self::GeojsonChanged { origin, length } => {
                format!("GeoJSON changed ({} chars, {:?})", length, origin)
            }
            Self::WktChanged { origin } => format!("WKT changed ({:?})", origin),
            Self::ModeChanged { from, to } => format!("Mode {} -> {}", from, to),
            Self::ProjectionChanged { from, to } => format!("Projection {} -> {}", from, to),
            Self::WktDisplayModeChanged { mode } => format!("WKT display mode {}", mode),
            Self::DerivedViewSkipped { length, limit } => {
                format!("WKT view skipped ({} > {} chars)", length, limit)
            }
            Self::ConversionFailed {
                format, message, ..
            } => format!("{} conversion failed: {}", format, message),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Text buffer rewrites.
    Buffer,
    /// Mode, projection and layout changes.
    Settings,
    /// Skipped views and absorbed conversion failures.
    Diagnostic,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Buffer => write!(f, "Buffer"),
            EventCategory::Settings => write!(f, "Settings"),
            EventCategory::Diagnostic => write!(f, "Diagnostic"),
        }
    }
}
