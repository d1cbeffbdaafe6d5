//! Error types for shower-level access.

use corsika_formats::CorsikaError;
use thiserror::Error;

/// Result type for shower-level operations
pub type Result<T> = std::result::Result<T, ShowerError>;

/// Errors raised by [`crate::ShowerFile`]
#[derive(Debug, Error)]
pub enum ShowerError {
    /// Error from the block-level reader
    #[error(transparent)]
    Format(#[from] CorsikaError),

    /// Event access before the file was indexed
    #[error("file has not been scanned; call scan() before accessing events")]
    NotScanned,

    /// Observation levels are numbered from 1
    #[error("invalid observation level {0}: levels are numbered from 1")]
    InvalidObservationLevel(u32),

    /// I/O error outside the particle stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShowerError {
    /// Check if this is the recoverable "no such event" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Format(e) if e.is_not_found())
    }

    /// Check if this error reports a structurally inconsistent file
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Format(e) if e.is_corruption())
    }

    /// Check if this error reports misuse by the caller
    pub fn is_illegal_state(&self) -> bool {
        match self {
            Self::NotScanned | Self::InvalidObservationLevel(_) => true,
            Self::Format(e) => e.is_illegal_state(),
            Self::Io(_) => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_passes_through() {
        let err = ShowerError::from(CorsikaError::EventNotFound(3));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "event 3 not found");

        let err = ShowerError::from(CorsikaError::UnpairedHeader { position: 4 });
        assert!(err.is_corruption());
        assert!(!err.is_not_found());

        assert!(ShowerError::NotScanned.is_illegal_state());
    }
}
