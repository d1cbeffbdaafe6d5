//! Disk block framing
//!
//! The framer holds one disk block in memory and hands out its sub-blocks
//! in order. It does not own the source; the caller passes it on every
//! read so that a reopened source can be swapped in underneath.

use super::Position;
use crate::error::{CorsikaError, Result};
use crate::variant::{FormatVariant, SUB_BLOCKS_PER_DISK_BLOCK};
use std::io::{self, Read};
use tracing::trace;

/// Cursor over the disk blocks of one stream
#[derive(Debug)]
pub struct DiskBlockFramer {
    variant: FormatVariant,
    buffer: Vec<u8>,
    buffer_valid: bool,
    disk_block: u64,
    offset: usize,
}

impl DiskBlockFramer {
    /// Create a framer positioned before the first disk block
    pub fn new(variant: FormatVariant) -> Self {
        Self {
            variant,
            buffer: vec![0; variant.disk_block_bytes()],
            buffer_valid: false,
            disk_block: 0,
            offset: 0,
        }
    }

    /// Load the first disk block, whose leading bytes were already consumed
    /// from `source` to detect the variant.
    pub fn prime<R: Read + ?Sized>(
        &mut self,
        prefix: [u8; FormatVariant::SNIFF_BYTES],
        source: &mut R,
    ) -> Result<()> {
        self.reposition(0, 0);
        self.buffer[..prefix.len()].copy_from_slice(&prefix);

        let filled = read_full(source, &mut self.buffer[prefix.len()..])?;
        if filled == 0 {
            return Ok(());
        }
        if prefix.len() + filled < self.buffer.len() {
            return Err(truncated(0));
        }
        self.check_padding()?;
        self.buffer_valid = true;
        Ok(())
    }

    /// Hand out the next sub-block, reading a new disk block when the
    /// current one is used up. `None` marks a clean end of stream.
    pub fn next_sub_block<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<Option<&[u8]>> {
        if !self.buffer_valid && !self.load(source)? {
            return Ok(None);
        }

        let size = self.variant.sub_block_bytes();
        let start = self.variant.padding.bytes() + self.offset * size;

        self.offset += 1;
        if self.offset == SUB_BLOCKS_PER_DISK_BLOCK {
            self.offset = 0;
            self.disk_block += 1;
            self.buffer_valid = false;
        }

        Ok(Some(&self.buffer[start..start + size]))
    }

    /// Move the cursor without touching the source; the next read loads
    /// disk block `disk_block` from wherever the source is positioned.
    pub fn reposition(&mut self, disk_block: u64, offset: usize) {
        self.disk_block = disk_block;
        self.offset = offset;
        self.buffer_valid = false;
    }

    /// Logical position of the next sub-block
    pub fn position(&self) -> Position {
        self.disk_block * SUB_BLOCKS_PER_DISK_BLOCK as u64 + self.offset as u64
    }

    /// Leading and trailing padding of the buffered disk block
    pub fn padding(&self) -> (u64, u64) {
        let width = self.variant.padding;
        let end = self.buffer.len() - width.bytes();
        (width.read(&self.buffer), width.read(&self.buffer[end..]))
    }

    fn load<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<bool> {
        let filled = read_full(source, &mut self.buffer)?;
        if filled == 0 {
            trace!(disk_block = self.disk_block, "end of stream");
            return Ok(false);
        }
        if filled < self.buffer.len() {
            return Err(truncated(self.disk_block));
        }
        self.check_padding()?;
        self.buffer_valid = true;
        trace!(disk_block = self.disk_block, "loaded disk block");
        Ok(true)
    }

    fn check_padding(&self) -> Result<()> {
        let (start, end) = self.padding();
        if start != end {
            return Err(CorsikaError::PaddingMismatch {
                disk_block: self.disk_block,
                start,
                end,
            });
        }
        Ok(())
    }
}

fn truncated(disk_block: u64) -> CorsikaError {
    CorsikaError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("disk block {disk_block} is truncated"),
    ))
}

/// Fill `buf` as far as the source allows and return the byte count
pub(super) fn read_full<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
