//! Reader for CORSIKA air-shower ground particle files
//!
#![allow(clippy::cast_possible_truncation)] // Float-encoded integers in the format
#![allow(clippy::cast_precision_loss)] // Positions and counts as f32 words
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::float_cmp)] // Exact sentinel values in the format
#![allow(clippy::derive_partial_eq_without_eq)] // Float-bearing block structs
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::doc_markdown)] // Physics terms don't need backticks
#![allow(clippy::redundant_closure_for_method_calls)] // Iterator chains
//! A particle file is a Fortran unformatted stream of fixed-size disk blocks.
//! Each disk block holds 21 sub-blocks between two padding words, and each
//! sub-block is one logical block: a run or event header/trailer, a slice of
//! a longitudinal profile, or 39 particle records.
//!
//! # Layers
//!
//! - **[`variant`]**: detects thinning and padding width from the first bytes
//! - **[`block`]**: decodes one sub-block into a typed [`Block`]
//! - **[`stream`]**: frames disk blocks and gives random access by logical
//!   position, replaying from the start when the source cannot seek
//! - **[`particles`]**: walks the particle records of one event
//! - **[`index`]**: one pass over the file locating every event
//! - **[`profile`]** and **[`long_file`]**: longitudinal profiles, embedded
//!   or from the companion `.long` text file
//!
//! # Example
//!
//! ```rust,no_run
//! use corsika_formats::{EventIndex, FileStream, ParticleIterator};
//!
//! let mut stream = FileStream::open("DAT000001")?;
//! let index = EventIndex::build(&mut stream)?;
//!
//! for ordinal in 0..index.len() {
//!     let header = index.header(ordinal).unwrap_or_default();
//!     let particles = ParticleIterator::new(&mut stream, header + 1)?;
//!     let count = particles.filter(|p| p.as_ref().is_ok_and(|p| !p.is_empty())).count();
//!     println!("event {ordinal}: {count} particles");
//! }
//! # Ok::<(), corsika_formats::CorsikaError>(())
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod error;
pub mod index;
pub mod long_file;
pub mod particles;
pub mod profile;
pub mod stream;
pub mod variant;

pub use block::{Block, BlockKind};
pub use error::{CorsikaError, Result};
pub use index::EventIndex;
pub use long_file::LongFile;
pub use particles::{IteratorState, ParticleIterator};
pub use profile::{GaisserHillasFit, LongitudinalProfile, read_embedded_profile};
pub use stream::{BlockSource, FileStream, Position, RawStream};
pub use variant::FormatVariant;
