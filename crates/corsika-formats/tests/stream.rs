#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for block streaming over real files
//!
//! Synthetic particle files are written to disk plain and gzip-compressed;
//! both must yield the same blocks, indexes and profiles.

use corsika_formats::stream::{DynSource, ReplayableSource};
use corsika_formats::{
    Block, CorsikaError, EventIndex, FileStream, ParticleIterator, RawStream,
    read_embedded_profile,
};
use corsika_test_utils::{SCENARIO_EVENT_ID, SyntheticFile};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Cursor;

#[test]
fn test_all_variants_index_identically() {
    for thinned in [false, true] {
        for wide in [false, true] {
            let file = SyntheticFile::single_event(thinned, wide);
            let temp = file.to_temp_file().unwrap();
            let mut stream = FileStream::open(temp.path()).unwrap();
            assert_eq!(stream.is_thinned(), thinned);
            assert!(stream.validate());

            let index = EventIndex::build(&mut stream).unwrap();
            assert_eq!(index.event_headers(), &[1]);
            assert_eq!(index.event_trailers(), &[53]);
            assert_eq!(index.long_blocks(), &[52]);
            assert_eq!(index.find(SCENARIO_EVENT_ID).unwrap(), 0);
        }
    }
}

#[test]
fn test_index_is_deterministic() {
    let file = SyntheticFile::multi_event(false, false, 5, 7, true);
    let temp = file.to_temp_file().unwrap();

    let first = EventIndex::build(&mut FileStream::open(temp.path()).unwrap()).unwrap();
    let mut stream = FileStream::open(temp.path()).unwrap();
    stream.seek(40).unwrap();
    let second = EventIndex::build(&mut stream).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_gzip_file_replays() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DAT000001.gz");
    let file = SyntheticFile::multi_event(true, false, 3, 30, true);
    file.write_gzip_to(&path).unwrap();

    let mut stream = FileStream::open(&path).unwrap();
    assert!(!stream.is_seekable());
    assert!(stream.validate());

    let index = EventIndex::build(&mut stream).unwrap();
    assert_eq!(index.len(), 3);

    // last event first, then back to the first one
    let last = index.find(30).unwrap();
    let profile = read_embedded_profile(&mut stream, index.long_block(last).unwrap()).unwrap();
    assert_eq!(profile.len(), 30);

    let first = index.find(10).unwrap();
    let start = index.header(first).unwrap() + 1;
    let particles = ParticleIterator::new(&mut stream, start).unwrap();
    let count = particles.map(Result::unwrap).filter(|p| !p.is_empty()).count();
    assert_eq!(count, 30 * 39);
}

#[test]
fn test_event_header_decoded_after_seek() {
    let file = SyntheticFile::multi_event(false, true, 4, 25, false);
    let temp = file.to_temp_file().unwrap();
    let mut stream = FileStream::open(temp.path()).unwrap();
    let index = EventIndex::build(&mut stream).unwrap();

    for (ordinal, id) in [(3usize, 40u32), (0, 10), (2, 30)] {
        stream.seek(index.header(ordinal).unwrap()).unwrap();
        let Some(Block::EventHeader(header)) = stream.next_block().unwrap() else {
            panic!("expected event header at ordinal {ordinal}");
        };
        assert_eq!(header.event_id(), id);
        assert_eq!(header.observation_level_count(), 1);
    }
}

#[test]
fn test_padding_mismatch_is_reported() {
    let file = SyntheticFile::multi_event(false, false, 1, 30, false);
    let mut bytes = file.to_bytes();
    let disk_block = file.disk_block_bytes();
    // corrupt the trailing padding of the second disk block
    let end = 2 * disk_block - 4;
    bytes[end..end + 4].copy_from_slice(&1u32.to_le_bytes());

    let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();
    let err = EventIndex::build(&mut stream).unwrap_err();
    assert!(err.is_corruption());
    assert!(matches!(
        err,
        CorsikaError::PaddingMismatch {
            disk_block: 1,
            start: 22932,
            end: 1
        }
    ));
}

#[test]
fn test_unrecognized_file() {
    let temp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), b"#!/bin/sh\necho hello\n").unwrap();
    let err = FileStream::open(temp.path()).unwrap_err();
    assert!(matches!(err, CorsikaError::UnrecognizedFormat { .. }));
}

/// Position and raw bytes of the block at each of `positions`, `None` past the end
fn blocks_at(stream: &mut FileStream, positions: &[u64]) -> Vec<Option<(u64, Vec<u8>)>> {
    positions
        .iter()
        .map(|&position| {
            stream.seek(position).unwrap();
            stream
                .next_sub_block()
                .unwrap()
                .map(|b| (b.position, b.data.to_vec()))
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Seeking a forward-only source must land on the same block bytes as
    /// seeking the file directly, in any order.
    #[test]
    fn prop_replay_matches_direct_seek(positions in prop::collection::vec(0u64..120, 1..12)) {
        let file = SyntheticFile::multi_event(false, true, 4, 20, true);
        let temp = file.to_temp_file().unwrap();
        let mut direct = FileStream::open(temp.path()).unwrap();
        let expected = blocks_at(&mut direct, &positions);

        let replay_bytes = file.to_bytes();
        let source: DynSource = Box::new(
            ReplayableSource::new(move || Ok(Cursor::new(replay_bytes.clone()))).unwrap(),
        );
        let mut replay = RawStream::new(source).unwrap();
        let actual = blocks_at(&mut replay, &positions);

        prop_assert_eq!(expected, actual);
        for &position in &positions {
            replay.seek(position).unwrap();
            prop_assert_eq!(replay.logical_position(), position);
        }
    }

    /// Indexing is deterministic and lookups resolve to the last event
    /// carrying each identifier.
    #[test]
    fn prop_index_round_trip(
        ids in prop::collection::vec(1u32..6, 0..8),
        blocks in 0usize..3,
    ) {
        let mut file = SyntheticFile::new(false, false);
        file.run_header(1);
        for &id in &ids {
            file.event_header(id, 14, 0.0).particle_blocks(blocks).event_trailer(id);
        }
        file.run_trailer(1, ids.len() as u32);
        let bytes = file.to_bytes();

        let mut stream = RawStream::from_reader(Cursor::new(bytes.clone())).unwrap();
        let first = EventIndex::build(&mut stream).unwrap();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();
        let second = EventIndex::build(&mut stream).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.event_ids(), ids.as_slice());

        for &id in &ids {
            let last = ids.iter().rposition(|&other| other == id).unwrap();
            prop_assert_eq!(first.find(id).unwrap(), last);
        }
        prop_assert!(first.find(99).unwrap_err().is_not_found());
    }
}
