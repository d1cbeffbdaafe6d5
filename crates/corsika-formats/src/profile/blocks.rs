use super::LongitudinalProfile;
use crate::block::{Block, BlockKind, LongitudinalBlock};
use crate::error::{CorsikaError, Result};
use crate::stream::{BlockSource, Position, RawStream};
use tracing::debug;

/// Read the profile embedded at `start`.
///
/// The first block declares how many contiguous `LONG` blocks follow and how
/// many steps they hold. Entries are taken until the declared step count is
/// reached or a zero depth appears after the first entry; the remaining
/// blocks are still read to check the profile is unbroken.
pub fn read_embedded_profile<S: BlockSource>(
    stream: &mut RawStream<S>,
    start: Position,
) -> Result<LongitudinalProfile> {
    stream.seek(start)?;
    let first = match next_long_block(stream)? {
        (_, Ok(block)) => block,
        (position, Err(found)) => {
            return Err(CorsikaError::UnexpectedBlock {
                position,
                expected: BlockKind::Longitudinal,
                found,
            });
        }
    };

    let total = first.declared_blocks().max(1);
    let steps = first.declared_steps();

    let mut profile = LongitudinalProfile::default();
    let mut filling = append_entries(&first, &mut profile, steps);

    for block_number in 2..=total {
        let block = match next_long_block(stream)? {
            (_, Ok(block)) => block,
            (position, Err(found)) => {
                return Err(CorsikaError::ProfileInterrupted {
                    position,
                    block: block_number,
                    total,
                    found,
                });
            }
        };
        if filling {
            filling = append_entries(&block, &mut profile, steps);
        }
    }

    debug!(start, blocks = total, steps = profile.len(), "read embedded profile");
    Ok(profile)
}

/// Next block as a longitudinal block, or the kind found instead
fn next_long_block<S: BlockSource>(
    stream: &mut RawStream<S>,
) -> Result<(Position, std::result::Result<LongitudinalBlock, BlockKind>)> {
    let position = stream.logical_position();
    let block = stream
        .next_block()?
        .ok_or(CorsikaError::UnexpectedEnd { position })?;
    match block {
        Block::Longitudinal(block) => Ok((position, Ok(block))),
        other => Ok((position, Err(other.kind()))),
    }
}

/// Append entries until a stop condition; returns whether more may follow
fn append_entries(block: &LongitudinalBlock, profile: &mut LongitudinalProfile, steps: usize) -> bool {
    for entry in &block.entries {
        let taken = profile.len();
        if steps > 0 && taken >= steps {
            return false;
        }
        if taken > 0 && entry.depth == 0.0 {
            return false;
        }
        profile.push_entry(entry);
    }
    true
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stream::SeekableSource;
    use corsika_test_utils::{SyntheticFile, profile_rows};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn stream(file: &SyntheticFile) -> RawStream<SeekableSource<Cursor<Vec<u8>>>> {
        RawStream::from_reader(Cursor::new(file.to_bytes())).unwrap()
    }

    #[test]
    fn test_single_block_profile() {
        let file = SyntheticFile::single_event(false, false);
        let profile = read_embedded_profile(&mut stream(&file), 52).unwrap();

        assert_eq!(profile.len(), 10);
        assert_eq!(profile.depth[0], 10.0);
        assert_eq!(profile.depth[9], 100.0);
        // e+ = 2x, e- = 3x
        assert_eq!(profile.electrons[1], 10.0);
        // mu+ = 0.5x, mu- = 0.25x
        assert_eq!(profile.muons[3], 3.0);
        assert_eq!(profile.charged[0], 5.0);
        assert!(profile.energy_deposit.is_empty());
        assert_eq!(profile.gaisser_hillas, None);
    }

    #[test]
    fn test_multi_block_profile() {
        let mut file = SyntheticFile::new(true, true);
        file.run_header(1)
            .event_header(1, 14, 0.0)
            .longitudinal(&profile_rows(60))
            .event_trailer(1);
        let profile = read_embedded_profile(&mut stream(&file), 2).unwrap();
        assert_eq!(profile.len(), 60);
        assert_eq!(profile.depth[59], 600.0);
    }

    #[test]
    fn test_stops_at_declared_steps() {
        let mut file = SyntheticFile::new(false, false);
        file.run_header(1)
            .event_header(1, 14, 0.0)
            .longitudinal_declared(&profile_rows(20), 12, 1)
            .event_trailer(1);
        let profile = read_embedded_profile(&mut stream(&file), 2).unwrap();
        assert_eq!(profile.len(), 12);
    }

    #[test]
    fn test_stops_at_zero_depth() {
        let mut file = SyntheticFile::new(false, false);
        file.run_header(1)
            .event_header(1, 14, 0.0)
            .longitudinal_declared(&profile_rows(8), 0, 1)
            .event_trailer(1);
        let profile = read_embedded_profile(&mut stream(&file), 2).unwrap();
        assert_eq!(profile.len(), 8);
    }

    #[test]
    fn test_interrupted_profile() {
        let mut file = SyntheticFile::new(false, false);
        file.run_header(1)
            .event_header(1, 14, 0.0)
            .longitudinal_declared(&profile_rows(10), 60, 3)
            .event_trailer(1);
        let err = read_embedded_profile(&mut stream(&file), 2).unwrap_err();
        assert!(matches!(
            err,
            CorsikaError::ProfileInterrupted {
                position: 3,
                block: 2,
                total: 3,
                found: BlockKind::EventTrailer
            }
        ));
    }

    #[test]
    fn test_start_is_not_longitudinal() {
        let file = SyntheticFile::single_event(false, false);
        let err = read_embedded_profile(&mut stream(&file), 1).unwrap_err();
        assert!(matches!(
            err,
            CorsikaError::UnexpectedBlock {
                position: 1,
                expected: BlockKind::Longitudinal,
                found: BlockKind::EventHeader
            }
        ));
    }
}
