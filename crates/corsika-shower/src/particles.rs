//! Ground particles of one shower

use crate::error::Result;
use corsika_formats::ParticleIterator;
use corsika_formats::block::ParticleRecord;
use corsika_formats::stream::BlockSource;

/// Particles of one observation level with shifted arrival times.
///
/// Empty slots are skipped, and so are the additional muon information
/// records unless they were requested.
#[derive(Debug)]
pub struct ShowerParticles<'a, S> {
    inner: ParticleIterator<'a, S>,
    observation_level: u32,
    keep_muon_production_info: bool,
    time_shift: f64,
}

impl<'a, S: BlockSource> ShowerParticles<'a, S> {
    pub(crate) fn new(
        inner: ParticleIterator<'a, S>,
        observation_level: u32,
        keep_muon_production_info: bool,
        time_shift: f64,
    ) -> Self {
        Self {
            inner,
            observation_level,
            keep_muon_production_info,
            time_shift,
        }
    }

    /// Start over from the first particle of the shower
    pub fn rewind(&mut self) -> Result<()> {
        self.inner.rewind()?;
        Ok(())
    }

    fn accepts(&self, record: &ParticleRecord) -> bool {
        !record.is_empty()
            && record.observation_level() == self.observation_level
            && (self.keep_muon_production_info || !record.is_muon_additional_info())
    }
}

impl<S: BlockSource> Iterator for ShowerParticles<'_, S> {
    type Item = Result<ParticleRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = match self.inner.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            if self.accepts(&record) {
                record.t = (f64::from(record.t) - self.time_shift) as f32;
                return Some(Ok(record));
            }
        }
    }
}
