//! Sub-block codec
//!
//! Every logical block of a particle file is one fixed-size sub-block whose
//! first four bytes identify its kind:
//!
//! | Tag    | Kind              |
//! |--------|-------------------|
//! | `RUNH` | run header        |
//! | `EVTH` | event header      |
//! | `EVTE` | event trailer     |
//! | `RUNE` | run trailer       |
//! | `LONG` | longitudinal data |
//! | other  | particle data     |
//!
//! The four header/trailer kinds are collectively called control blocks.
//! Decoding is a fixed-layout reinterpretation of the sub-block bytes; the
//! only failure is a buffer whose length does not match the variant.
//!
//! ```rust
//! use corsika_formats::block::{Block, BlockKind, RunTrailer};
//! use corsika_formats::variant::{FormatVariant, PaddingWidth, Thinning};
//!
//! let variant = FormatVariant::new(Thinning::NotThinned, PaddingWidth::Word32);
//! let block = Block::RunTrailer(RunTrailer { run_number: 1.0, events_processed: 3.0 });
//!
//! let bytes = block.encode(variant)?;
//! assert_eq!(bytes.len(), variant.sub_block_bytes());
//! assert_eq!(BlockKind::of(&bytes), BlockKind::RunTrailer);
//! assert_eq!(Block::decode(variant, &bytes)?, block);
//! # Ok::<(), corsika_formats::CorsikaError>(())
//! ```

mod header;
mod longitudinal;
mod particle;

pub use header::{EventHeader, EventTrailer, RunHeader, RunTrailer};
pub use longitudinal::{LONG_ENTRIES_PER_BLOCK, LongitudinalBlock, LongitudinalEntry};
pub use particle::{MUON_ADDITIONAL_INFO_IDS, ParticleBlock, ParticleRecord};

use crate::error::{CorsikaError, Result};
use crate::variant::FormatVariant;
use binrw::{BinReaderExt, BinWriterExt};
use std::fmt;
use std::io::Cursor;

/// Sub-block tags
pub mod tags {
    /// Run header
    pub const RUN_HEADER: [u8; 4] = *b"RUNH";
    /// Event header
    pub const EVENT_HEADER: [u8; 4] = *b"EVTH";
    /// Event trailer
    pub const EVENT_TRAILER: [u8; 4] = *b"EVTE";
    /// Run trailer
    pub const RUN_TRAILER: [u8; 4] = *b"RUNE";
    /// Longitudinal profile
    pub const LONGITUDINAL: [u8; 4] = *b"LONG";
}

/// Kind of a logical block, read from its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `RUNH`
    RunHeader,
    /// `EVTH`
    EventHeader,
    /// `EVTE`
    EventTrailer,
    /// `RUNE`
    RunTrailer,
    /// `LONG`
    Longitudinal,
    /// Anything else
    Particles,
}

impl BlockKind {
    /// Classify a sub-block by its leading tag bytes
    pub fn of(data: &[u8]) -> Self {
        let Some(tag) = data.get(..4) else {
            return Self::Particles;
        };
        match [tag[0], tag[1], tag[2], tag[3]] {
            tags::RUN_HEADER => Self::RunHeader,
            tags::EVENT_HEADER => Self::EventHeader,
            tags::EVENT_TRAILER => Self::EventTrailer,
            tags::RUN_TRAILER => Self::RunTrailer,
            tags::LONGITUDINAL => Self::Longitudinal,
            _ => Self::Particles,
        }
    }

    /// Run/event header or trailer
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::RunHeader | Self::EventHeader | Self::EventTrailer | Self::RunTrailer
        )
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RunHeader => "run header",
            Self::EventHeader => "event header",
            Self::EventTrailer => "event trailer",
            Self::RunTrailer => "run trailer",
            Self::Longitudinal => "longitudinal data",
            Self::Particles => "particle data",
        };
        f.write_str(name)
    }
}

/// A decoded logical block
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Run header
    RunHeader(RunHeader),
    /// Event header
    EventHeader(EventHeader),
    /// Event trailer
    EventTrailer(EventTrailer),
    /// Run trailer
    RunTrailer(RunTrailer),
    /// Longitudinal profile
    Longitudinal(LongitudinalBlock),
    /// Particle records
    Particles(ParticleBlock),
}

impl Block {
    /// Decode one sub-block of `variant`
    pub fn decode(variant: FormatVariant, data: &[u8]) -> Result<Self> {
        let expected = variant.sub_block_bytes();
        if data.len() != expected {
            return Err(CorsikaError::InvalidSubBlockSize {
                expected,
                actual: data.len(),
            });
        }

        let mut cursor = Cursor::new(data);
        let block = match BlockKind::of(data) {
            BlockKind::RunHeader => Self::RunHeader(cursor.read_le()?),
            BlockKind::EventHeader => Self::EventHeader(cursor.read_le()?),
            BlockKind::EventTrailer => Self::EventTrailer(cursor.read_le()?),
            BlockKind::RunTrailer => Self::RunTrailer(cursor.read_le()?),
            BlockKind::Longitudinal => Self::Longitudinal(cursor.read_le()?),
            BlockKind::Particles => Self::Particles(ParticleBlock::decode(data, variant.thinning)?),
        };
        Ok(block)
    }

    /// Encode into a zero-filled sub-block of `variant`
    pub fn encode(&self, variant: FormatVariant) -> Result<Vec<u8>> {
        let size = variant.sub_block_bytes();
        let mut cursor = Cursor::new(Vec::with_capacity(size));
        match self {
            Self::RunHeader(block) => cursor.write_le(block)?,
            Self::EventHeader(block) => cursor.write_le(block)?,
            Self::EventTrailer(block) => cursor.write_le(block)?,
            Self::RunTrailer(block) => cursor.write_le(block)?,
            Self::Longitudinal(block) => cursor.write_le(block)?,
            Self::Particles(block) => block.encode(&mut cursor, variant.thinning)?,
        }

        let mut bytes = cursor.into_inner();
        if bytes.len() > size {
            return Err(CorsikaError::InvalidSubBlockSize {
                expected: size,
                actual: bytes.len(),
            });
        }
        bytes.resize(size, 0);
        Ok(bytes)
    }

    /// Kind of this block
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::RunHeader(_) => BlockKind::RunHeader,
            Self::EventHeader(_) => BlockKind::EventHeader,
            Self::EventTrailer(_) => BlockKind::EventTrailer,
            Self::RunTrailer(_) => BlockKind::RunTrailer,
            Self::Longitudinal(_) => BlockKind::Longitudinal,
            Self::Particles(_) => BlockKind::Particles,
        }
    }

    /// Run/event header or trailer
    pub fn is_control(&self) -> bool {
        self.kind().is_control()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::variant::{PaddingWidth, Thinning};
    use pretty_assertions::assert_eq;

    const NOT_THINNED: FormatVariant = FormatVariant::new(Thinning::NotThinned, PaddingWidth::Word32);
    const THINNED: FormatVariant = FormatVariant::new(Thinning::Thinned, PaddingWidth::Word64);

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(BlockKind::of(b"RUNH...."), BlockKind::RunHeader);
        assert_eq!(BlockKind::of(b"EVTH...."), BlockKind::EventHeader);
        assert_eq!(BlockKind::of(b"EVTE...."), BlockKind::EventTrailer);
        assert_eq!(BlockKind::of(b"RUNE...."), BlockKind::RunTrailer);
        assert_eq!(BlockKind::of(b"LONG...."), BlockKind::Longitudinal);
        assert_eq!(BlockKind::of(&[0u8; 8]), BlockKind::Particles);
        assert_eq!(BlockKind::of(b"RU"), BlockKind::Particles);

        assert!(BlockKind::EventTrailer.is_control());
        assert!(!BlockKind::Longitudinal.is_control());
        assert!(!BlockKind::Particles.is_control());
    }

    #[test]
    fn test_event_header_word_offsets() {
        let header = EventHeader {
            event_number: 12.0,
            particle_id: 14.0,
            theta: 0.25,
            observation_levels: 1.0,
            flag_curved: 2.0,
            starting_height: 11_282_920.0,
            ..Default::default()
        };
        let bytes = Block::EventHeader(header.clone()).encode(NOT_THINNED).unwrap();
        assert_eq!(bytes.len(), 1092);

        let word = |index: usize| f32::from_le_bytes(bytes[index * 4..index * 4 + 4].try_into().unwrap());
        assert_eq!(&bytes[..4], b"EVTH");
        assert_eq!(word(1), 12.0);
        assert_eq!(word(2), 14.0);
        assert_eq!(word(10), 0.25);
        assert_eq!(word(46), 1.0);
        assert_eq!(word(78), 2.0);
        assert_eq!(word(157), 11_282_920.0);

        let decoded = Block::decode(NOT_THINNED, &bytes).unwrap();
        assert_eq!(decoded, Block::EventHeader(header));
    }

    #[test]
    fn test_event_trailer_fit_offsets() {
        let trailer = EventTrailer {
            event_number: 3.0,
            longitudinal_fit: [1.0e6, -5.0, 700.0, 40.0, -0.02, 1.0e-5],
            chi2_per_dof: 0.9,
            ..Default::default()
        };
        let bytes = Block::EventTrailer(trailer.clone()).encode(THINNED).unwrap();
        let word = |index: usize| f32::from_le_bytes(bytes[index * 4..index * 4 + 4].try_into().unwrap());
        assert_eq!(word(255), 1.0e6);
        assert_eq!(word(261), 0.9);
        assert_eq!(
            Block::decode(THINNED, &bytes).unwrap(),
            Block::EventTrailer(trailer)
        );
    }

    #[test]
    fn test_longitudinal_layout() {
        let mut block = LongitudinalBlock {
            steps_and_blocks: 3001.0,
            ..Default::default()
        };
        block.entries[0].depth = 5.0;
        block.entries[25].cherenkov = 9.0;

        let bytes = Block::Longitudinal(block.clone()).encode(NOT_THINNED).unwrap();
        let word = |index: usize| f32::from_le_bytes(bytes[index * 4..index * 4 + 4].try_into().unwrap());
        assert_eq!(word(7), 5.0);
        assert_eq!(word(7 + 25 * 10 + 9), 9.0);

        let Block::Longitudinal(decoded) = Block::decode(NOT_THINNED, &bytes).unwrap() else {
            panic!("expected longitudinal block");
        };
        assert_eq!(decoded.declared_steps(), 30);
        assert_eq!(decoded.declared_blocks(), 1);
    }

    #[test]
    fn test_zero_block_is_particle_data() {
        let bytes = vec![0u8; THINNED.sub_block_bytes()];
        let block = Block::decode(THINNED, &bytes).unwrap();
        assert_eq!(block.kind(), BlockKind::Particles);
        let Block::Particles(particles) = block else {
            panic!("expected particle block");
        };
        assert_eq!(particles.particles().count(), 0);
    }

    #[test]
    fn test_wrong_buffer_size() {
        let bytes = vec![0u8; 1000];
        let err = Block::decode(NOT_THINNED, &bytes).unwrap_err();
        assert!(matches!(
            err,
            CorsikaError::InvalidSubBlockSize {
                expected: 1092,
                actual: 1000
            }
        ));
    }
}
