//! Longitudinal shower profiles
//!
//! A profile is a table of particle counts against atmospheric depth. It is
//! either embedded in the particle file as `LONG` sub-blocks or written to
//! a companion text file; the companion also carries energy deposits and a
//! Gaisser-Hillas fit.

mod blocks;

pub use blocks::read_embedded_profile;

use crate::block::{EventTrailer, LongitudinalEntry};

/// Six-parameter Gaisser-Hillas fit of the charged-particle profile
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaisserHillasFit {
    /// Fit parameters `[N_max, X_0, X_max, a, b, c]` with
    /// `λ(X) = a + b·X + c·X²`
    pub parameters: [f64; 6],
    /// χ² per degree of freedom
    pub chi2_per_dof: f64,
}

impl GaisserHillasFit {
    /// Fit stored in an event trailer, if the simulation wrote one
    pub fn from_trailer(trailer: &EventTrailer) -> Option<Self> {
        if trailer.longitudinal_fit.iter().all(|&p| p == 0.0) {
            return None;
        }
        Some(Self {
            parameters: trailer.longitudinal_fit.map(f64::from),
            chi2_per_dof: f64::from(trailer.chi2_per_dof),
        })
    }

    /// Maximum particle number
    pub fn n_max(&self) -> f64 {
        self.parameters[0]
    }

    /// Depth of the shower maximum (g/cm²)
    pub fn x_max(&self) -> f64 {
        self.parameters[2]
    }

    /// Fitted particle number at slant depth `depth`
    pub fn evaluate(&self, depth: f64) -> f64 {
        let [n_max, x0, x_max, a, b, c] = self.parameters;
        let lambda = c.mul_add(depth, b).mul_add(depth, a);
        if lambda <= 0.0 || depth <= x0 || x_max <= x0 {
            return 0.0;
        }
        let ratio = (depth - x0) / (x_max - x0);
        n_max * ratio.powf((x_max - x0) / lambda) * ((x_max - depth) / lambda).exp()
    }
}

/// Particle counts and energy deposit against slant depth
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LongitudinalProfile {
    /// Slant depth of every step (g/cm²)
    pub depth: Vec<f64>,
    /// Charged particles
    pub charged: Vec<f64>,
    /// Photons
    pub gammas: Vec<f64>,
    /// Electrons and positrons
    pub electrons: Vec<f64>,
    /// Muons of both charges
    pub muons: Vec<f64>,
    /// Slant depth of every energy deposit step (g/cm²)
    pub energy_deposit_depth: Vec<f64>,
    /// Energy deposit per slant depth, neutrinos excluded (GeV cm²/g)
    pub energy_deposit: Vec<f64>,
    /// Fit of the charged-particle profile
    pub gaisser_hillas: Option<GaisserHillasFit>,
    /// Total deposited energy, neutrinos excluded (GeV)
    pub calorimetric_energy: Option<f64>,
}

impl LongitudinalProfile {
    /// Number of depth steps
    pub fn len(&self) -> usize {
        self.depth.len()
    }

    /// Whether no profile data is present
    pub fn is_empty(&self) -> bool {
        self.depth.is_empty() && self.energy_deposit.is_empty()
    }

    /// Whether energy deposit columns are present
    pub fn has_energy_deposit(&self) -> bool {
        !self.energy_deposit.is_empty()
    }

    /// Depth and count of the step with the most charged particles
    pub fn charged_maximum(&self) -> Option<(f64, f64)> {
        self.depth
            .iter()
            .zip(&self.charged)
            .map(|(&depth, &count)| (depth, count))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub(crate) fn push_entry(&mut self, entry: &LongitudinalEntry) {
        self.depth.push(f64::from(entry.depth));
        self.charged.push(f64::from(entry.charged));
        self.gammas.push(f64::from(entry.gammas));
        self.electrons.push(f64::from(entry.electrons_total()));
        self.muons.push(f64::from(entry.muons_total()));
    }
}
