//! Error types for particle file operations

use crate::block::BlockKind;
use crate::stream::Position;
use thiserror::Error;

/// Result type for particle file operations
pub type Result<T> = std::result::Result<T, CorsikaError>;

/// Errors raised while reading a particle file
#[derive(Debug, Error)]
pub enum CorsikaError {
    /// The leading padding word matches none of the known variants
    #[error("unrecognized file format: leading bytes {prefix:02X?}")]
    UnrecognizedFormat {
        /// First eight bytes of the file
        prefix: [u8; 8],
    },

    /// Leading and trailing padding of a disk block disagree
    #[error("padding mismatch in disk block {disk_block}: start {start}, end {end}")]
    PaddingMismatch {
        /// Disk block index
        disk_block: u64,
        /// Leading padding value
        start: u64,
        /// Trailing padding value
        end: u64,
    },

    /// Padding word does not hold the payload size of the detected variant
    #[error("unexpected padding in disk block {disk_block}: expected {expected}, found {found}")]
    UnexpectedPadding {
        /// Disk block index
        disk_block: u64,
        /// Payload size of the variant
        expected: u64,
        /// Value found in the file
        found: u64,
    },

    /// A block of one kind was expected but another was found
    #[error("expected {expected} at logical position {position}, found {found}")]
    UnexpectedBlock {
        /// Logical position of the offending block
        position: Position,
        /// Kind the caller required
        expected: BlockKind,
        /// Kind actually observed
        found: BlockKind,
    },

    /// Event trailer without a preceding unmatched event header
    #[error("event trailer at logical position {position} has no matching header")]
    UnpairedTrailer {
        /// Logical position of the trailer
        position: Position,
    },

    /// Event header not closed by a trailer before the next header or end of file
    #[error("event header at logical position {position} has no matching trailer")]
    UnpairedHeader {
        /// Logical position of the header
        position: Position,
    },

    /// Multi-block longitudinal profile broken by another block kind
    #[error(
        "longitudinal profile interrupted at logical position {position}: block {block} of {total} is {found}"
    )]
    ProfileInterrupted {
        /// Logical position of the offending block
        position: Position,
        /// One-based index of the block within the profile
        block: usize,
        /// Declared number of blocks
        total: usize,
        /// Kind actually observed
        found: BlockKind,
    },

    /// Stream ended where a block was required
    #[error("unexpected end of stream at logical position {position}")]
    UnexpectedEnd {
        /// Logical position that could not be read
        position: Position,
    },

    /// Buffer handed to the block codec has the wrong length
    #[error("invalid sub-block size: expected {expected} bytes, got {actual}")]
    InvalidSubBlockSize {
        /// Size required by the format variant
        expected: usize,
        /// Size supplied
        actual: usize,
    },

    /// Operation called outside its contract
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Event identifier absent from the index
    #[error("event {0} not found")]
    EventNotFound(u32),

    /// Malformed companion longitudinal text file
    #[error("invalid longitudinal file at line {line}: {reason}")]
    InvalidLongFile {
        /// One-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl CorsikaError {
    /// Check if this error reports a structurally inconsistent file
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::PaddingMismatch { .. }
                | Self::UnexpectedPadding { .. }
                | Self::UnexpectedBlock { .. }
                | Self::UnpairedTrailer { .. }
                | Self::UnpairedHeader { .. }
                | Self::ProfileInterrupted { .. }
                | Self::UnexpectedEnd { .. }
        )
    }

    /// Check if this is the recoverable "no such event" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound(_))
    }

    /// Check if this error reports misuse by the caller
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_) | Self::InvalidSubBlockSize { .. })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let padding = CorsikaError::PaddingMismatch {
            disk_block: 3,
            start: 22932,
            end: 0,
        };
        assert!(padding.is_corruption());
        assert!(!padding.is_not_found());

        let missing = CorsikaError::EventNotFound(42);
        assert!(missing.is_not_found());
        assert!(!missing.is_corruption());
        assert_eq!(missing.to_string(), "event 42 not found");

        let state = CorsikaError::IllegalState("iterator exhausted".to_string());
        assert!(state.is_illegal_state());
    }

    #[test]
    fn test_unexpected_block_message() {
        let err = CorsikaError::UnexpectedBlock {
            position: 12,
            expected: BlockKind::EventHeader,
            found: BlockKind::Particles,
        };
        assert_eq!(
            err.to_string(),
            "expected event header at logical position 12, found particle data"
        );
    }
}
