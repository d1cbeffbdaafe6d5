//! Event-level access to CORSIKA ground particle files
//!
//! Builds on `corsika-formats` to read a particle file one shower at a time:
//! the event header and trailer, the longitudinal profile (embedded or from
//! the companion `.long` file), and the particles of one observation level
//! with arrival times relative to the shower front.
//!
//! # Example
//!
//! ```no_run
//! use corsika_shower::{ShowerFile, ShowerFileOptions};
//!
//! let mut file = ShowerFile::open("DAT000001", ShowerFileOptions::default())?;
//! while let Some(shower) = file.read()? {
//!     let particles = file.particles(&shower)?.count();
//!     println!(
//!         "event {}: {:.3e} GeV, {} profile steps, {particles} particles",
//!         shower.event_id(),
//!         shower.energy(),
//!         shower.profile.len(),
//!     );
//! }
//! # Ok::<(), corsika_shower::ShowerError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::cast_possible_truncation)] // Float-encoded counts in headers
#![allow(clippy::cast_precision_loss)] // Times and heights as f32 words
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod options;
pub mod particles;
pub mod shower;
pub mod shower_file;

pub use config::{DumpCommand, DumpConfig};
pub use error::{Result, ShowerError};
pub use options::ShowerFileOptions;
pub use particles::ShowerParticles;
pub use shower::{Shower, arrival_time_shift};
pub use shower_file::{ShowerFile, companion_long_file};
