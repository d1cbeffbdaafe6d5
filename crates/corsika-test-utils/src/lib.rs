//! Test utilities for corsika-rs
//!
//! Builds synthetic ground-particle files word by word so tests in the other
//! crates can exercise every format variant without shipping binary fixtures.
//! The writer here knows nothing about the decoder in `corsika-formats`; it
//! lays out raw words and padding exactly as the simulation does.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Sub-blocks grouped into one padded disk block
pub const SUB_BLOCKS_PER_DISK_BLOCK: usize = 21;

/// Particle records in one particle sub-block
pub const PARTICLES_PER_SUB_BLOCK: usize = 39;

/// Depth entries in one longitudinal sub-block
pub const LONG_ENTRIES_PER_BLOCK: usize = 26;

/// Words per longitudinal entry
pub const LONG_ENTRY_WORDS: usize = 10;

/// Event number used by [`SyntheticFile::single_event`]
pub const SCENARIO_EVENT_ID: u32 = 7;

/// One sub-block under construction: the full word array, tag included.
#[derive(Debug, Clone)]
pub struct SubBlockWords {
    tag: Option<[u8; 4]>,
    words: Vec<f32>,
}

impl SubBlockWords {
    fn new(tag: Option<&[u8; 4]>, word_count: usize) -> Self {
        Self {
            tag: tag.copied(),
            words: vec![0.0; word_count],
        }
    }

    /// Set the word at zero-based `index` (index 0 is the tag slot).
    pub fn set(&mut self, index: usize, value: f32) -> &mut Self {
        self.words[index] = value;
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.words.len() * 4);
        for (i, word) in self.words.iter().enumerate() {
            match (i, self.tag) {
                (0, Some(tag)) => out.extend_from_slice(&tag),
                _ => out.extend_from_slice(&word.to_le_bytes()),
            }
        }
        out
    }
}

/// Synthetic ground-particle file
#[derive(Debug, Clone)]
pub struct SyntheticFile {
    thinned: bool,
    wide_padding: bool,
    sub_blocks: Vec<SubBlockWords>,
}

impl SyntheticFile {
    /// Empty file for the given thinning mode and padding width
    pub fn new(thinned: bool, wide_padding: bool) -> Self {
        Self {
            thinned,
            wide_padding,
            sub_blocks: Vec::new(),
        }
    }

    /// Words per particle record
    pub fn record_words(&self) -> usize {
        if self.thinned { 8 } else { 7 }
    }

    /// Words per sub-block
    pub fn words_per_sub_block(&self) -> usize {
        self.record_words() * PARTICLES_PER_SUB_BLOCK
    }

    /// Bytes per sub-block
    pub fn sub_block_bytes(&self) -> usize {
        self.words_per_sub_block() * 4
    }

    /// Value carried by every padding word
    pub fn padding_value(&self) -> u64 {
        (SUB_BLOCKS_PER_DISK_BLOCK * self.sub_block_bytes()) as u64
    }

    /// Bytes per padding word
    pub fn padding_width(&self) -> usize {
        if self.wide_padding { 8 } else { 4 }
    }

    /// Bytes per disk block, padding included
    pub fn disk_block_bytes(&self) -> usize {
        2 * self.padding_width() + SUB_BLOCKS_PER_DISK_BLOCK * self.sub_block_bytes()
    }

    /// Logical position the next pushed sub-block will occupy
    pub fn next_position(&self) -> u64 {
        self.sub_blocks.len() as u64
    }

    /// Push a sub-block and return a handle to fill its words
    pub fn push(&mut self, tag: Option<&[u8; 4]>) -> &mut SubBlockWords {
        let words = self.words_per_sub_block();
        self.sub_blocks.push(SubBlockWords::new(tag, words));
        let last = self.sub_blocks.len() - 1;
        &mut self.sub_blocks[last]
    }

    /// Run header sub-block
    pub fn run_header(&mut self, run_number: u32) -> &mut Self {
        self.push(Some(b"RUNH"))
            .set(1, run_number as f32)
            .set(2, 240_101.0)
            .set(3, 7.75)
            .set(4, 1.0)
            .set(5, 145_200.0);
        self
    }

    /// Event header sub-block with the fields the driver relies on
    pub fn event_header(&mut self, event_number: u32, primary: u32, theta: f32) -> &mut Self {
        self.push(Some(b"EVTH"))
            .set(1, event_number as f32)
            .set(2, primary as f32)
            .set(3, 1.0e9)
            .set(6, 2_500_000.0)
            .set(10, theta)
            .set(43, 1.0)
            .set(46, 1.0)
            .set(47, 145_200.0)
            .set(157, 0.0);
        self
    }

    /// Event header with every field set explicitly by the caller
    pub fn event_header_with(
        &mut self,
        event_number: u32,
        fill: impl FnOnce(&mut SubBlockWords),
    ) -> &mut Self {
        let block = self.push(Some(b"EVTH"));
        block.set(1, event_number as f32);
        fill(block);
        self
    }

    /// Event trailer sub-block
    pub fn event_trailer(&mut self, event_number: u32) -> &mut Self {
        self.push(Some(b"EVTE"))
            .set(1, event_number as f32)
            .set(2, 10.0)
            .set(3, 20.0)
            .set(4, 3.0)
            .set(5, 4.0)
            .set(6, 37.0)
            .set(255, 1.5e6)
            .set(256, -10.0)
            .set(257, 650.0)
            .set(258, 45.0)
            .set(259, -0.01)
            .set(260, 1.0e-5)
            .set(261, 1.2);
        self
    }

    /// Run trailer sub-block
    pub fn run_trailer(&mut self, run_number: u32, events: u32) -> &mut Self {
        self.push(Some(b"RUNE"))
            .set(1, run_number as f32)
            .set(2, events as f32);
        self
    }

    /// One particle sub-block from explicit records.
    ///
    /// Each record holds at most [`Self::record_words`] words; unused slots
    /// stay zero, which the format treats as empty.
    pub fn particle_block(&mut self, records: &[Vec<f32>]) -> &mut Self {
        let record_words = self.record_words();
        let block = self.push(None);
        for (slot, record) in records.iter().take(PARTICLES_PER_SUB_BLOCK).enumerate() {
            for (offset, value) in record.iter().take(record_words).enumerate() {
                block.set(slot * record_words + offset, *value);
            }
        }
        self
    }

    /// `count` full particle sub-blocks with deterministic content.
    ///
    /// Record `n` (counted across blocks from zero) is a muon-plus
    /// (`id 5`) at observation level 1 with `px = n`.
    pub fn particle_blocks(&mut self, count: usize) -> &mut Self {
        let thinned = self.thinned;
        let mut n = 0usize;
        for _ in 0..count {
            let records: Vec<Vec<f32>> = (0..PARTICLES_PER_SUB_BLOCK)
                .map(|_| {
                    let record = particle_record(5, 1, n as f32, thinned);
                    n += 1;
                    record
                })
                .collect();
            self.particle_block(&records);
        }
        self
    }

    /// Longitudinal sub-blocks covering `rows` (depth first in each row).
    ///
    /// Splits into as many blocks as needed and declares the step and block
    /// counts in the first word of every block.
    pub fn longitudinal(&mut self, rows: &[[f32; LONG_ENTRY_WORDS]]) -> &mut Self {
        let blocks = rows.len().div_ceil(LONG_ENTRIES_PER_BLOCK).max(1);
        self.longitudinal_declared(rows, rows.len(), blocks)
    }

    /// Longitudinal sub-blocks with explicit declared step and block counts
    pub fn longitudinal_declared(
        &mut self,
        rows: &[[f32; LONG_ENTRY_WORDS]],
        declared_steps: usize,
        declared_blocks: usize,
    ) -> &mut Self {
        let chunks: Vec<&[[f32; LONG_ENTRY_WORDS]]> = if rows.is_empty() {
            vec![&[]]
        } else {
            rows.chunks(LONG_ENTRIES_PER_BLOCK).collect()
        };
        for chunk in chunks {
            let block = self.push(Some(b"LONG"));
            block
                .set(1, (declared_steps * 100 + declared_blocks) as f32)
                .set(2, 14.0)
                .set(3, 1.0e9)
                .set(4, -2.7)
                .set(5, 0.5)
                .set(6, 0.0);
            for (entry, row) in chunk.iter().enumerate() {
                for (offset, value) in row.iter().enumerate() {
                    block.set(7 + entry * LONG_ENTRY_WORDS + offset, *value);
                }
            }
        }
        self
    }

    /// Single-event run: run header at 0, event header at 1, 50 particle blocks,
    /// a longitudinal block at 52, the trailer at 53 and the run trailer.
    pub fn single_event(thinned: bool, wide_padding: bool) -> Self {
        let mut file = Self::new(thinned, wide_padding);
        file.run_header(1)
            .event_header(SCENARIO_EVENT_ID, 14, 0.5)
            .particle_blocks(50)
            .longitudinal(&profile_rows(10))
            .event_trailer(SCENARIO_EVENT_ID)
            .run_trailer(1, 1);
        file
    }

    /// A run with `events` events, each holding `particle_blocks` particle
    /// sub-blocks and, when `with_profile` is set, a two-block profile.
    pub fn multi_event(
        thinned: bool,
        wide_padding: bool,
        events: u32,
        particle_blocks: usize,
        with_profile: bool,
    ) -> Self {
        let mut file = Self::new(thinned, wide_padding);
        file.run_header(1);
        for id in 1..=events {
            file.event_header(id * 10, 14, 0.3).particle_blocks(particle_blocks);
            if with_profile {
                file.longitudinal(&profile_rows(30));
            }
            file.event_trailer(id * 10);
        }
        file.run_trailer(1, events);
        file
    }

    /// Serialize into disk blocks, zero-filling the final one
    pub fn to_bytes(&self) -> Vec<u8> {
        let padding = self.padding_value();
        let mut out = Vec::new();
        let empty = SubBlockWords::new(None, self.words_per_sub_block());
        let disk_blocks = self.sub_blocks.len().div_ceil(SUB_BLOCKS_PER_DISK_BLOCK).max(1);

        for disk in 0..disk_blocks {
            self.write_padding(&mut out, padding);
            for slot in 0..SUB_BLOCKS_PER_DISK_BLOCK {
                let index = disk * SUB_BLOCKS_PER_DISK_BLOCK + slot;
                let block = self.sub_blocks.get(index).unwrap_or(&empty);
                out.extend_from_slice(&block.to_bytes());
            }
            self.write_padding(&mut out, padding);
        }
        out
    }

    fn write_padding(&self, out: &mut Vec<u8>, value: u64) {
        if self.wide_padding {
            out.extend_from_slice(&value.to_le_bytes());
        } else {
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
    }

    /// Write the serialized file to `path`
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    /// Write the serialized file gzip-compressed to `path`
    pub fn write_gzip_to(&self, path: &Path) -> io::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::fast());
        encoder.write_all(&self.to_bytes())?;
        encoder.finish()?;
        Ok(())
    }

    /// Write into a fresh temporary file
    pub fn to_temp_file(&self) -> io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&self.to_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

/// Raw particle record words: description, momentum, position, time and,
/// for thinned files, the weight.
pub fn particle_record(id: u32, observation_level: u32, px: f32, thinned: bool) -> Vec<f32> {
    let description = (id * 1000 + observation_level) as f32;
    let mut record = vec![description, px, 0.5, 2.0, 100.0, -100.0, 1000.0];
    if thinned {
        record.push(3.0);
    }
    record
}

/// `count` profile rows with depth `10, 20, ...` and simple increasing counts
pub fn profile_rows(count: usize) -> Vec<[f32; LONG_ENTRY_WORDS]> {
    (1..=count)
        .map(|step| {
            let x = step as f32;
            [
                10.0 * x, // depth
                100.0 * x, // gammas
                2.0 * x, // positrons
                3.0 * x, // electrons
                0.5 * x, // mu+
                0.25 * x, // mu-
                x, // hadrons
                5.0 * x, // charged
                0.0, // nuclei
                7.0 * x, // cherenkov
            ]
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_block_sizes() {
        assert_eq!(SyntheticFile::new(false, false).padding_value(), 22932);
        assert_eq!(SyntheticFile::new(true, false).padding_value(), 26208);
        assert_eq!(SyntheticFile::new(true, true).disk_block_bytes(), 26208 + 16);
    }

    #[test]
    fn test_single_event_layout() {
        let file = SyntheticFile::single_event(false, true);
        assert_eq!(file.next_position(), 55);

        let bytes = file.to_bytes();
        assert_eq!(bytes.len(), 3 * file.disk_block_bytes());
        assert_eq!(&bytes[..8], &22932u64.to_le_bytes());
        assert_eq!(&bytes[8..12], b"RUNH");
    }

    #[test]
    fn test_gzip_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DAT000001.gz");
        SyntheticFile::single_event(true, false)
            .write_gzip_to(&path)
            .unwrap();
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
    }
}
