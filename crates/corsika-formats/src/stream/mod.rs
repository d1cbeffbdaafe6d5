//! Random-access block stream
//!
//! A particle file is read as a sequence of logical blocks numbered from
//! zero. Logical position `p` lives in disk block `p / 21` at sub-block
//! offset `p % 21`, so seekable sources jump there directly. Forward-only
//! sources (gzip) can still seek backwards by replaying from the start.

mod framer;
mod raw;
mod source;

pub use framer::DiskBlockFramer;
pub use raw::{FileStream, RawStream, SubBlock};
pub use source::{
    BlockSource, DynSource, GZIP_MAGIC, ReplayableSource, SeekableSource, open_path,
};

/// Zero-based index of a logical block within a file
pub type Position = u64;
