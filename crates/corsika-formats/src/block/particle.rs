//! Particle data sub-blocks

use crate::error::Result;
use crate::variant::{PARTICLES_PER_SUB_BLOCK, Thinning};
use binrw::{BinRead, BinWrite, Endian};
use std::io::{Cursor, Seek, Write};

/// Particle code used for the additional muon information records
pub const MUON_ADDITIONAL_INFO_IDS: [u32; 2] = [75, 76];

/// One particle record
///
/// Thinned files carry an eighth word with the statistical weight; for
/// files without thinning the weight reads as `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little, import(thinned: bool))]
pub struct ParticleRecord {
    /// Packed `id * 1000 + hadronic_generation * 10 + observation_level`
    pub description: f32,
    /// Momentum x component (GeV/c)
    pub px: f32,
    /// Momentum y component (GeV/c)
    pub py: f32,
    /// Momentum z component, pointing down (GeV/c)
    pub pz: f32,
    /// Position x at the observation level (cm)
    pub x: f32,
    /// Position y at the observation level (cm)
    pub y: f32,
    /// Arrival time since first interaction (ns)
    pub t: f32,
    /// Thinning weight
    #[br(if(thinned, 1.0))]
    #[bw(if(thinned))]
    pub weight: f32,
}

impl ParticleRecord {
    fn code(&self) -> u32 {
        self.description.abs().round() as u32
    }

    /// Unused slot at the end of a sub-block
    pub fn is_empty(&self) -> bool {
        self.description == 0.0
    }

    /// Particle type code
    pub fn particle_id(&self) -> u32 {
        self.code() / 1000
    }

    /// Hadronic generation counter
    pub fn hadronic_generation(&self) -> u32 {
        (self.code() % 1000) / 10
    }

    /// One-based observation level where the particle was recorded
    pub fn observation_level(&self) -> u32 {
        self.code() % 10
    }

    /// Whether this record carries additional muon information rather than
    /// a ground particle
    pub fn is_muon_additional_info(&self) -> bool {
        MUON_ADDITIONAL_INFO_IDS.contains(&self.particle_id())
    }
}

/// A sub-block of particle records
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBlock {
    /// Records in file order, empty slots included
    pub records: [ParticleRecord; PARTICLES_PER_SUB_BLOCK],
}

impl ParticleBlock {
    /// Decode all records of a particle sub-block
    pub fn decode(data: &[u8], thinning: Thinning) -> Result<Self> {
        let thinned = thinning == Thinning::Thinned;
        let mut cursor = Cursor::new(data);
        let mut records = [ParticleRecord::default(); PARTICLES_PER_SUB_BLOCK];
        for record in &mut records {
            *record = ParticleRecord::read_options(&mut cursor, Endian::Little, (thinned,))?;
        }
        Ok(Self { records })
    }

    /// Write all records in the layout of `thinning`
    pub fn encode<W: Write + Seek>(&self, writer: &mut W, thinning: Thinning) -> Result<()> {
        let thinned = thinning == Thinning::Thinned;
        for record in &self.records {
            record.write_options(writer, Endian::Little, (thinned,))?;
        }
        Ok(())
    }

    /// Records that are not empty slots
    pub fn particles(&self) -> impl Iterator<Item = &ParticleRecord> {
        self.records.iter().filter(|record| !record.is_empty())
    }
}
