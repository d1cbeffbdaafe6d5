//! Run and event header/trailer sub-blocks
//!
//! Only the leading words that readers actually consume are named; the rest
//! of each sub-block is skipped on read and zero-filled on write. Word
//! numbers in the field docs are one-based, as in the simulation manual.

use binrw::{BinRead, BinWrite};

/// Run header (`RUNH`)
#[derive(Debug, Clone, PartialEq, Default, BinRead, BinWrite)]
#[brw(little, magic = b"RUNH")]
pub struct RunHeader {
    /// Word 2: run number
    pub run_number: f32,
    /// Word 3: date of run start (yymmdd)
    pub date: f32,
    /// Word 4: program version
    pub version: f32,
    /// Word 5: number of observation levels
    pub observation_levels: f32,
    /// Words 6-15: observation level heights (cm)
    pub observation_heights: [f32; 10],
    /// Word 16: slope of the energy spectrum
    pub spectral_slope: f32,
    /// Word 17: lower limit of the energy range (GeV)
    pub energy_min: f32,
    /// Word 18: upper limit of the energy range (GeV)
    pub energy_max: f32,
    /// Word 19: EGS4 flag
    pub flag_egs4: f32,
    /// Word 20: NKG flag
    pub flag_nkg: f32,
    /// Words 21-24: kinetic energy cutoffs for hadrons, muons, electrons, photons (GeV)
    pub cutoffs: [f32; 4],
}

impl RunHeader {
    /// Run number as an integer
    pub fn run_id(&self) -> u32 {
        self.run_number as u32
    }
}

/// Event header (`EVTH`)
#[derive(Debug, Clone, PartialEq, Default, BinRead, BinWrite)]
#[brw(little, magic = b"EVTH")]
pub struct EventHeader {
    /// Word 2: event number
    pub event_number: f32,
    /// Word 3: primary particle code
    pub particle_id: f32,
    /// Word 4: total energy of the primary (GeV)
    pub energy: f32,
    /// Word 5: starting altitude (g/cm²)
    pub starting_altitude: f32,
    /// Word 6: number of first target if fixed
    pub first_target: f32,
    /// Word 7: height of first interaction (cm); negative when tracking
    /// starts at the margin of the atmosphere
    pub z_first: f32,
    /// Words 8-10: primary momentum (GeV/c)
    pub momentum: [f32; 3],
    /// Word 11: zenith angle (rad)
    pub theta: f32,
    /// Word 12: azimuth angle (rad)
    pub phi: f32,
    /// Word 13: number of random number sequences
    pub random_sequences: f32,
    /// Words 14-43: seed and call counters per sequence
    pub seeds: [[f32; 3]; 10],
    /// Word 44: run number
    pub run_number: f32,
    /// Word 45: date of run start
    pub date: f32,
    /// Word 46: program version
    pub version: f32,
    /// Word 47: number of observation levels
    pub observation_levels: f32,
    /// Words 48-57: observation level heights (cm)
    pub observation_heights: [f32; 10],
    /// Word 58: slope of the energy spectrum
    pub spectral_slope: f32,
    /// Word 59: lower limit of the energy range (GeV)
    pub energy_min: f32,
    /// Word 60: upper limit of the energy range (GeV)
    pub energy_max: f32,
    /// Words 61-64: cutoffs for hadrons, muons, electrons, photons (GeV)
    pub cutoffs: [f32; 4],
    /// Words 65-70: NFLAIN, NFLDIF, NFLPI0, NFLPIF, NFLCHE, NFRAGM
    pub physics_flags: [f32; 6],
    /// Word 71: x component of the magnetic field (µT)
    pub magnetic_field_x: f32,
    /// Word 72: z component of the magnetic field (µT)
    pub magnetic_field_z: f32,
    /// Word 73: EGS4 flag
    pub flag_egs4: f32,
    /// Word 74: NKG flag
    pub flag_nkg: f32,
    /// Word 75: low-energy hadronic model
    pub low_energy_model: f32,
    /// Word 76: high-energy hadronic model
    pub high_energy_model: f32,
    /// Word 77: Cherenkov flag
    pub flag_cherenkov: f32,
    /// Word 78: neutrino flag
    pub flag_neutrino: f32,
    /// Word 79: curved atmosphere flag (0 = flat)
    pub flag_curved: f32,
    /// Word 80: computer flag
    pub flag_computer: f32,
    /// Word 81: lower edge of the zenith range (deg)
    pub theta_min: f32,
    /// Word 82: upper edge of the zenith range (deg)
    pub theta_max: f32,
    /// Word 83: lower edge of the azimuth range (deg)
    pub phi_min: f32,
    /// Word 84: upper edge of the azimuth range (deg)
    pub phi_max: f32,
    /// Word 158: starting height of the primary (cm), zero when unset
    #[brw(pad_before = 292)]
    pub starting_height: f32,
}

impl EventHeader {
    /// Event number as an integer identifier
    pub fn event_id(&self) -> u32 {
        self.event_number as u32
    }

    /// Primary particle code as an integer
    pub fn primary(&self) -> u32 {
        self.particle_id as u32
    }

    /// Number of observation levels as an integer
    pub fn observation_level_count(&self) -> usize {
        self.observation_levels.max(0.0) as usize
    }

    /// Whether the simulation used the curved-atmosphere option
    pub fn is_curved(&self) -> bool {
        self.flag_curved != 0.0
    }
}

/// Event trailer (`EVTE`)
#[derive(Debug, Clone, PartialEq, Default, BinRead, BinWrite)]
#[brw(little, magic = b"EVTE")]
pub struct EventTrailer {
    /// Word 2: event number
    pub event_number: f32,
    /// Word 3: weighted number of photons
    pub photons: f32,
    /// Word 4: weighted number of electrons
    pub electrons: f32,
    /// Word 5: weighted number of hadrons
    pub hadrons: f32,
    /// Word 6: weighted number of muons
    pub muons: f32,
    /// Word 7: number of particles written
    pub particles_written: f32,
    /// Words 256-261: parameters of the longitudinal Gaisser-Hillas fit
    #[brw(pad_before = 992)]
    pub longitudinal_fit: [f32; 6],
    /// Word 262: chi² per degree of freedom of that fit
    pub chi2_per_dof: f32,
}

impl EventTrailer {
    /// Event number as an integer identifier
    pub fn event_id(&self) -> u32 {
        self.event_number as u32
    }
}

/// Run trailer (`RUNE`)
#[derive(Debug, Clone, PartialEq, Default, BinRead, BinWrite)]
#[brw(little, magic = b"RUNE")]
pub struct RunTrailer {
    /// Word 2: run number
    pub run_number: f32,
    /// Word 3: number of events processed
    pub events_processed: f32,
}
