//! Format variant detection
//!
//! A particle file comes in one of four layouts: thinned or not thinned
//! records, framed by 32-bit or 64-bit padding words. The variant is fixed
//! for the lifetime of a file and decides every size used by the framer.

use crate::error::{CorsikaError, Result};
use std::fmt;

/// Sub-blocks grouped into one disk block
pub const SUB_BLOCKS_PER_DISK_BLOCK: usize = 21;

/// Particle records per particle sub-block
pub const PARTICLES_PER_SUB_BLOCK: usize = 39;

/// Size of one data word in bytes
pub const WORD_SIZE: usize = 4;

/// Particle record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Thinning {
    /// Seven-word records without weights
    NotThinned,
    /// Eight-word records carrying a statistical weight
    Thinned,
}

impl Thinning {
    /// Words per particle record
    pub const fn record_words(self) -> usize {
        match self {
            Self::NotThinned => 7,
            Self::Thinned => 8,
        }
    }

    /// Bytes per particle record
    pub const fn record_bytes(self) -> usize {
        self.record_words() * WORD_SIZE
    }

    /// Words per sub-block
    pub const fn sub_block_words(self) -> usize {
        self.record_words() * PARTICLES_PER_SUB_BLOCK
    }

    /// Bytes per sub-block
    pub const fn sub_block_bytes(self) -> usize {
        self.sub_block_words() * WORD_SIZE
    }

    /// Payload bytes of one disk block; also the value of every padding word
    pub const fn disk_payload_bytes(self) -> usize {
        SUB_BLOCKS_PER_DISK_BLOCK * PARTICLES_PER_SUB_BLOCK * self.record_bytes()
    }
}

/// Width of the padding words bracketing each disk block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingWidth {
    /// One 32-bit word
    Word32,
    /// One 64-bit word
    Word64,
}

impl PaddingWidth {
    /// Bytes taken by one padding word
    pub const fn bytes(self) -> usize {
        match self {
            Self::Word32 => 4,
            Self::Word64 => 8,
        }
    }

    /// Decode a padding word from the start of `data`
    pub fn read(self, data: &[u8]) -> u64 {
        match self {
            Self::Word32 => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&data[..4]);
                u64::from(u32::from_le_bytes(bytes))
            }
            Self::Word64 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&data[..8]);
                u64::from_le_bytes(bytes)
            }
        }
    }
}

/// Layout of a particle file, chosen once from its leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatVariant {
    /// Particle record layout
    pub thinning: Thinning,
    /// Padding word width
    pub padding: PaddingWidth,
}

impl FormatVariant {
    /// Number of bytes inspected by [`FormatVariant::sniff`]
    pub const SNIFF_BYTES: usize = 8;

    /// Create a variant from its two components
    pub const fn new(thinning: Thinning, padding: PaddingWidth) -> Self {
        Self { thinning, padding }
    }

    /// Detect the variant from the first eight bytes of a file.
    ///
    /// The 64-bit interpretation is tried first. A 32-bit padded file never
    /// matches it because its upper half holds the first sub-block's tag.
    pub fn sniff(prefix: [u8; 8]) -> Result<Self> {
        let wide = u64::from_le_bytes(prefix);
        let narrow = u64::from(u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]));

        let candidates = [
            (wide, Self::new(Thinning::Thinned, PaddingWidth::Word64)),
            (wide, Self::new(Thinning::NotThinned, PaddingWidth::Word64)),
            (narrow, Self::new(Thinning::Thinned, PaddingWidth::Word32)),
            (narrow, Self::new(Thinning::NotThinned, PaddingWidth::Word32)),
        ];

        candidates
            .into_iter()
            .find(|(value, variant)| *value == variant.padding_value())
            .map(|(_, variant)| variant)
            .ok_or(CorsikaError::UnrecognizedFormat { prefix })
    }

    /// Whether records carry thinning weights
    pub const fn is_thinned(&self) -> bool {
        matches!(self.thinning, Thinning::Thinned)
    }

    /// Bytes per sub-block
    pub const fn sub_block_bytes(&self) -> usize {
        self.thinning.sub_block_bytes()
    }

    /// Sub-blocks per disk block
    pub const fn sub_blocks_per_disk_block(&self) -> usize {
        SUB_BLOCKS_PER_DISK_BLOCK
    }

    /// Expected value of every padding word
    pub const fn padding_value(&self) -> u64 {
        self.thinning.disk_payload_bytes() as u64
    }

    /// Bytes per disk block, both padding words included
    pub const fn disk_block_bytes(&self) -> usize {
        2 * self.padding.bytes() + SUB_BLOCKS_PER_DISK_BLOCK * self.sub_block_bytes()
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let thinning = match self.thinning {
            Thinning::Thinned => "thinned",
            Thinning::NotThinned => "not thinned",
        };
        let padding = match self.padding {
            PaddingWidth::Word32 => "32-bit",
            PaddingWidth::Word64 => "64-bit",
        };
        write!(f, "{thinning}, {padding} padding")
    }
}
