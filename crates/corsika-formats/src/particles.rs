//! Particle iteration within one event
//!
//! The iterator walks particle sub-blocks from a start position and stops
//! at the first control or longitudinal block, which ends the event's
//! particle data. Empty slots are returned as-is; filtering them is left to
//! the caller.

use crate::block::{BlockKind, ParticleBlock, ParticleRecord};
use crate::error::{CorsikaError, Result};
use crate::stream::{BlockSource, Position, RawStream};
use crate::variant::PARTICLES_PER_SUB_BLOCK;
use tracing::trace;

/// Iteration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    /// More records may follow
    Active,
    /// A non-particle block was reached
    Exhausted,
}

/// Cursor over the particle records of one event
#[derive(Debug)]
pub struct ParticleIterator<'a, S> {
    stream: &'a mut RawStream<S>,
    start: Position,
    block: Option<ParticleBlock>,
    slot: usize,
    state: IteratorState,
}

impl<'a, S: BlockSource> ParticleIterator<'a, S> {
    /// Iterate from `start`; zero means the stream's current position
    pub fn new(stream: &'a mut RawStream<S>, start: Position) -> Result<Self> {
        let start = if start == 0 {
            stream.logical_position()
        } else {
            start
        };
        let mut iterator = Self {
            stream,
            start,
            block: None,
            slot: PARTICLES_PER_SUB_BLOCK,
            state: IteratorState::Active,
        };
        iterator.rewind()?;
        Ok(iterator)
    }

    /// Go back to the first record of the start block
    pub fn rewind(&mut self) -> Result<()> {
        self.stream.seek(self.start)?;
        self.block = None;
        self.slot = PARTICLES_PER_SUB_BLOCK;
        self.state = IteratorState::Active;
        Ok(())
    }

    /// Position the iterator started from
    pub fn start(&self) -> Position {
        self.start
    }

    /// Current state
    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// Whether a non-particle block has been reached
    pub fn is_exhausted(&self) -> bool {
        self.state == IteratorState::Exhausted
    }

    /// Next record, or `None` once a non-particle block is reached.
    ///
    /// Calling this again after `None` is an error.
    pub fn advance(&mut self) -> Result<Option<ParticleRecord>> {
        if self.is_exhausted() {
            return Err(CorsikaError::IllegalState(
                "particle iterator advanced after the end of its event".to_string(),
            ));
        }

        if self.slot == PARTICLES_PER_SUB_BLOCK || self.block.is_none() {
            let position = self.stream.logical_position();
            let thinning = self.stream.variant().thinning;
            let Some(sub_block) = self.stream.next_sub_block()? else {
                self.state = IteratorState::Exhausted;
                return Err(CorsikaError::UnexpectedEnd { position });
            };

            if sub_block.kind != BlockKind::Particles {
                trace!(position, kind = %sub_block.kind, "particle data ends");
                self.state = IteratorState::Exhausted;
                return Ok(None);
            }
            self.block = Some(ParticleBlock::decode(sub_block.data, thinning)?);
            self.slot = 0;
        }

        let record = self
            .block
            .as_ref()
            .map(|block| block.records[self.slot])
            .ok_or_else(|| CorsikaError::IllegalState("no particle block loaded".to_string()))?;
        self.slot += 1;
        Ok(Some(record))
    }
}

impl<S: BlockSource> Iterator for ParticleIterator<'_, S> {
    type Item = Result<ParticleRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }
        self.advance().transpose()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use corsika_test_utils::{SyntheticFile, particle_record};
    use std::io::Cursor;

    #[test]
    fn test_stops_at_longitudinal_block() {
        let bytes = SyntheticFile::single_event(false, false).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();

        let mut particles = ParticleIterator::new(&mut stream, 2).unwrap();
        let mut count = 0;
        while let Some(record) = particles.advance().unwrap() {
            assert_eq!(record.px, count as f32);
            count += 1;
        }
        assert_eq!(count, 50 * PARTICLES_PER_SUB_BLOCK);
        assert_eq!(particles.state(), IteratorState::Exhausted);

        let err = particles.advance().unwrap_err();
        assert!(err.is_illegal_state());
    }

    #[test]
    fn test_rewind() {
        let mut file = SyntheticFile::new(true, false);
        file.run_header(1)
            .event_header(1, 14, 0.0)
            .particle_block(&[
                particle_record(1, 1, 1.0, true),
                particle_record(3, 1, 2.0, true),
            ])
            .event_trailer(1)
            .run_trailer(1, 1);
        let mut stream = RawStream::from_reader(Cursor::new(file.to_bytes())).unwrap();

        let mut particles = ParticleIterator::new(&mut stream, 2).unwrap();
        let first: Vec<_> = particles.by_ref().map(Result::unwrap).collect();
        assert_eq!(first.len(), PARTICLES_PER_SUB_BLOCK);
        assert_eq!(first[1].particle_id(), 3);
        assert_eq!(first[1].weight, 3.0);
        assert!(first[2].is_empty());

        particles.rewind().unwrap();
        assert_eq!(particles.state(), IteratorState::Active);
        let again: Vec<_> = particles.map(Result::unwrap).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_zero_start_uses_current_position() {
        let bytes = SyntheticFile::single_event(false, false).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();
        stream.seek(51).unwrap();

        let particles = ParticleIterator::new(&mut stream, 0).unwrap();
        assert_eq!(particles.start(), 51);
        assert_eq!(particles.count(), PARTICLES_PER_SUB_BLOCK);
    }

    #[test]
    fn test_truncated_event() {
        let mut file = SyntheticFile::new(false, false);
        file.run_header(1).event_header(1, 14, 0.0);
        for _ in 0..19 {
            file.particle_blocks(1);
        }
        // exactly one disk block, no trailer
        let mut stream = RawStream::from_reader(Cursor::new(file.to_bytes())).unwrap();
        let mut particles = ParticleIterator::new(&mut stream, 2).unwrap();
        let err = particles.find_map(Result::err).unwrap();
        assert!(matches!(err, CorsikaError::UnexpectedEnd { position: 21 }));
        assert!(particles.is_exhausted());
    }
}
