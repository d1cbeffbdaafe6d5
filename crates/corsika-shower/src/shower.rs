//! One simulated air shower
//!
//! Particle arrival times in the file count from the first interaction, or
//! from the top of the atmosphere for simulations that start there. Shifting
//! them by the light travel time down to the observation level makes zero
//! the moment the shower front would reach the ground along the axis.

use corsika_formats::Position;
use corsika_formats::block::{EventHeader, EventTrailer};
use corsika_formats::profile::LongitudinalProfile;

/// Speed of light (cm/ns)
pub const SPEED_OF_LIGHT: f64 = 29.979_245_8;

/// Earth radius used by the curved-atmosphere option (cm)
pub const EARTH_RADIUS: f64 = 6.371_315e8;

/// Top of the atmosphere when the header carries no starting height (cm)
pub const DEFAULT_STARTING_HEIGHT: f64 = 112.829_2e5;

/// Particle code of a photon
pub const PHOTON: u32 = 1;

/// Light travel time (ns) from the reference height to the lowest
/// observation level along the shower axis.
pub fn arrival_time_shift(header: &EventHeader) -> f64 {
    let levels = header.observation_level_count();
    let observation_height = header
        .observation_heights
        .get(levels.saturating_sub(1))
        .map_or(0.0, |&h| f64::from(h));

    let first_interaction = f64::from(header.z_first).abs();
    let atmosphere_top = if header.starting_height > 0.0 {
        f64::from(header.starting_height)
    } else {
        DEFAULT_STARTING_HEIGHT
    };

    let mut reference = if header.z_first < 0.0 {
        atmosphere_top
    } else {
        first_interaction
    };

    let cos_zenith = f64::from(header.theta).cos();
    if !header.is_curved() {
        return (reference - observation_height) / (cos_zenith * SPEED_OF_LIGHT);
    }

    if header.primary() == PHOTON {
        reference = first_interaction;
    }
    let radius = EARTH_RADIUS + observation_height;
    let height = reference - observation_height;
    let along_axis = radius * cos_zenith;
    // sqrt((R cos θ)² + h² + 2Rh)
    let path = height
        .mul_add(height, (2.0 * radius).mul_add(height, along_axis * along_axis))
        .sqrt();
    (path - along_axis) / SPEED_OF_LIGHT
}

/// Header, trailer and profile of one event
#[derive(Debug, Clone, PartialEq)]
pub struct Shower {
    /// Zero-based position of the event in the file
    pub ordinal: usize,
    /// Event header
    pub header: EventHeader,
    /// Event trailer
    pub trailer: EventTrailer,
    /// Longitudinal profile; empty when the file has none
    pub profile: LongitudinalProfile,
    /// Subtracted from every particle arrival time (ns)
    pub time_shift: f64,
    /// Observation level whose particles are returned
    pub observation_level: u32,
    /// Position of the first particle block
    pub first_particle_block: Position,
}

impl Shower {
    /// Event number
    pub fn event_id(&self) -> u32 {
        self.header.event_id()
    }

    /// Primary particle code
    pub fn primary(&self) -> u32 {
        self.header.primary()
    }

    /// Primary energy (GeV)
    pub fn energy(&self) -> f64 {
        f64::from(self.header.energy)
    }

    /// Zenith angle (rad)
    pub fn zenith(&self) -> f64 {
        f64::from(self.header.theta)
    }

    /// Azimuth angle (rad)
    pub fn azimuth(&self) -> f64 {
        f64::from(self.header.phi)
    }

    /// Height of the selected observation level (cm)
    pub fn observation_height(&self) -> Option<f64> {
        let index = (self.observation_level as usize).checked_sub(1)?;
        self.header
            .observation_heights
            .get(index)
            .map(|&h| f64::from(h))
    }
}
