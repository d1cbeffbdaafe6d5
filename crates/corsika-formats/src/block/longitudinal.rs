//! Longitudinal profile sub-blocks (`LONG`)

use binrw::{BinRead, BinWrite};

/// Depth entries carried by one longitudinal sub-block
pub const LONG_ENTRIES_PER_BLOCK: usize = 26;

/// One depth step of a longitudinal profile
#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct LongitudinalEntry {
    /// Atmospheric depth (g/cm²)
    pub depth: f32,
    /// Number of photons
    pub gammas: f32,
    /// Number of positrons
    pub positrons: f32,
    /// Number of electrons
    pub electrons: f32,
    /// Number of positive muons
    pub mu_plus: f32,
    /// Number of negative muons
    pub mu_minus: f32,
    /// Number of hadrons
    pub hadrons: f32,
    /// Number of charged particles
    pub charged: f32,
    /// Number of nuclei
    pub nuclei: f32,
    /// Number of Cherenkov photons
    pub cherenkov: f32,
}

impl LongitudinalEntry {
    /// Electrons and positrons combined
    pub fn electrons_total(&self) -> f32 {
        self.positrons + self.electrons
    }

    /// Muons of both charges combined
    pub fn muons_total(&self) -> f32 {
        self.mu_plus + self.mu_minus
    }
}

/// Longitudinal profile sub-block
///
/// A profile longer than [`LONG_ENTRIES_PER_BLOCK`] steps continues in the
/// immediately following sub-blocks; each of them repeats the header words.
#[derive(Debug, Clone, PartialEq, Default, BinRead, BinWrite)]
#[brw(little, magic = b"LONG")]
pub struct LongitudinalBlock {
    /// `steps * 100 + blocks`
    pub steps_and_blocks: f32,
    /// Primary particle code
    pub primary_id: f32,
    /// Primary energy (GeV)
    pub energy: f32,
    /// Slope of the energy spectrum
    pub slope: f32,
    /// Zenith angle (rad)
    pub theta: f32,
    /// Azimuth angle (rad)
    pub phi: f32,
    /// Depth entries, unused ones zeroed
    pub entries: [LongitudinalEntry; LONG_ENTRIES_PER_BLOCK],
}

impl LongitudinalBlock {
    fn packed(&self) -> u64 {
        self.steps_and_blocks.max(0.0).round() as u64
    }

    /// Number of sub-blocks making up the whole profile
    pub fn declared_blocks(&self) -> usize {
        (self.packed() % 100) as usize
    }

    /// Number of depth steps in the whole profile
    pub fn declared_steps(&self) -> usize {
        (self.packed() / 100) as usize
    }
}
