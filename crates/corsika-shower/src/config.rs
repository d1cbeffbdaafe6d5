//! Command-line configuration for `corsika-dump`.
//!
//! Every global option can also come from the environment:
//! - `CORSIKA_FILE`: particle file to read
//! - `CORSIKA_OBS_LEVEL`: observation level, from 1
//! - `CORSIKA_LONG_FILE`: longitudinal file to use instead of the companion
//!
//! # Example
//!
//! ```no_run
//! use corsika_shower::{DumpConfig, ShowerFile};
//!
//! let config = DumpConfig::from_args();
//! let file = ShowerFile::open(&config.file, config.options())?;
//! # Ok::<(), corsika_shower::ShowerError>(())
//! ```

use crate::options::ShowerFileOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Options for the dump tool
#[derive(Debug, Clone, Parser)]
#[command(
    name = "corsika-dump",
    about = "Inspect CORSIKA ground particle files",
    version
)]
pub struct DumpConfig {
    /// Particle file, plain or gzip-compressed
    #[arg(long, short, env = "CORSIKA_FILE")]
    pub file: PathBuf,

    /// Observation level to read particles from
    #[arg(long, env = "CORSIKA_OBS_LEVEL", default_value_t = 1)]
    pub observation_level: u32,

    /// Longitudinal profile file (defaults to the `.long` file next to the
    /// particle file)
    #[arg(long, env = "CORSIKA_LONG_FILE")]
    pub long_file: Option<PathBuf>,

    /// Skip the additional muon information records
    #[arg(long)]
    pub drop_muon_info: bool,

    /// What to print
    #[command(subcommand)]
    pub command: DumpCommand,
}

/// Output of the dump tool
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum DumpCommand {
    /// File layout and event count
    Info,
    /// One line per event
    Events,
    /// Particles of one event
    Particles {
        /// Event number; the first event when omitted
        #[arg(long)]
        event: Option<u32>,
        /// Stop after this many particles
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Longitudinal profile of one event
    Profile {
        /// Event number; the first event when omitted
        #[arg(long)]
        event: Option<u32>,
    },
}

impl DumpConfig {
    /// Parse from the process arguments and environment
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Options for [`crate::ShowerFile::open`]
    pub fn options(&self) -> ShowerFileOptions {
        let options = ShowerFileOptions::default()
            .with_observation_level(self.observation_level)
            .with_muon_production_info(!self.drop_muon_info);
        match &self.long_file {
            Some(path) => options.with_long_file(path),
            None => options,
        }
    }
}
