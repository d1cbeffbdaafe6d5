//! Options for opening a shower file

use crate::error::{Result, ShowerError};
use std::path::{Path, PathBuf};

/// How a [`crate::ShowerFile`] reads its events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowerFileOptions {
    /// One-based observation level whose particles are returned
    pub observation_level: u32,

    /// Keep the additional muon information records (codes 75 and 76)
    pub keep_muon_production_info: bool,

    /// Companion longitudinal file, instead of the one next to the particle file
    pub long_file: Option<PathBuf>,

    /// Index all events while opening
    pub scan_on_open: bool,
}

impl Default for ShowerFileOptions {
    fn default() -> Self {
        Self {
            observation_level: 1,
            keep_muon_production_info: true,
            long_file: None,
            scan_on_open: true,
        }
    }
}

impl ShowerFileOptions {
    /// Select the observation level
    #[must_use]
    pub const fn with_observation_level(mut self, level: u32) -> Self {
        self.observation_level = level;
        self
    }

    /// Keep or drop the additional muon information records
    #[must_use]
    pub const fn with_muon_production_info(mut self, keep: bool) -> Self {
        self.keep_muon_production_info = keep;
        self
    }

    /// Read profiles from `path`
    #[must_use]
    pub fn with_long_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.long_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Index while opening, or defer to the first event access
    #[must_use]
    pub const fn with_scan_on_open(mut self, scan: bool) -> Self {
        self.scan_on_open = scan;
        self
    }

    /// Check the options are usable
    pub fn validate(&self) -> Result<()> {
        if self.observation_level == 0 {
            return Err(ShowerError::InvalidObservationLevel(0));
        }
        Ok(())
    }
}
