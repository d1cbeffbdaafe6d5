use super::framer::{DiskBlockFramer, read_full};
use super::source::{BlockSource, DynSource, SeekableSource, open_path};
use super::Position;
use crate::block::{Block, BlockKind};
use crate::error::{CorsikaError, Result};
use crate::variant::{FormatVariant, SUB_BLOCKS_PER_DISK_BLOCK};
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Stream over a file opened with [`open_path`]
pub type FileStream = RawStream<DynSource>;

/// Undecoded sub-block borrowed from the stream buffer
#[derive(Debug, Clone, Copy)]
pub struct SubBlock<'a> {
    /// Logical position of this block
    pub position: Position,
    /// Kind read from the tag
    pub kind: BlockKind,
    /// Raw bytes, exactly one sub-block long
    pub data: &'a [u8],
    variant: FormatVariant,
}

impl SubBlock<'_> {
    /// Decode into a typed block
    pub fn decode(&self) -> Result<Block> {
        Block::decode(self.variant, self.data)
    }
}

/// Sequence of logical blocks with random access by position
pub struct RawStream<S> {
    source: Option<S>,
    variant: FormatVariant,
    framer: DiskBlockFramer,
}

impl<S> fmt::Debug for RawStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStream")
            .field("variant", &self.variant)
            .field("position", &self.framer.position())
            .field("closed", &self.source.is_none())
            .finish()
    }
}

impl FileStream {
    /// Open a particle file from disk, gzip-compressed or not
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening particle file");
        Self::new(open_path(path)?)
    }
}

impl<R: Read + Seek> RawStream<SeekableSource<R>> {
    /// Stream over an in-memory or otherwise seekable reader
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::new(SeekableSource::new(reader))
    }
}

impl<S: BlockSource> RawStream<S> {
    /// Detect the layout from the leading bytes and load the first disk block
    pub fn new(mut source: S) -> Result<Self> {
        let prefix = read_prefix(&mut source)?;
        let variant = FormatVariant::sniff(prefix)?;
        debug!(%variant, seekable = source.is_seekable(), "detected particle file layout");

        let mut framer = DiskBlockFramer::new(variant);
        framer.prime(prefix, &mut source)?;
        Ok(Self {
            source: Some(source),
            variant,
            framer,
        })
    }

    /// Detected layout
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// Whether records carry thinning weights
    pub fn is_thinned(&self) -> bool {
        self.variant.is_thinned()
    }

    /// Whether seeks are served directly rather than by replaying
    pub fn is_seekable(&self) -> bool {
        self.source.as_ref().is_some_and(BlockSource::is_seekable)
    }

    /// Whether [`RawStream::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Position of the block the next read returns
    pub fn logical_position(&self) -> Position {
        self.framer.position()
    }

    /// Read the next sub-block without decoding it.
    ///
    /// Returns `None` at a clean end of stream.
    pub fn next_sub_block(&mut self) -> Result<Option<SubBlock<'_>>> {
        let source = self.source.as_mut().ok_or_else(closed)?;
        let position = self.framer.position();
        let variant = self.variant;

        let Some(data) = self.framer.next_sub_block(source)? else {
            return Ok(None);
        };
        let kind = BlockKind::of(data);
        trace!(position, %kind, "read sub-block");
        Ok(Some(SubBlock {
            position,
            kind,
            data,
            variant,
        }))
    }

    /// Read and decode the next block
    pub fn next_block(&mut self) -> Result<Option<Block>> {
        match self.next_sub_block()? {
            Some(sub_block) => sub_block.decode().map(Some),
            None => Ok(None),
        }
    }

    /// Position the stream so the next read returns block `target`.
    ///
    /// Forward-only sources reopen and skip from the start when `target` is
    /// behind the cursor. Seeking past the end succeeds; the next read then
    /// reports end of stream.
    pub fn seek(&mut self, target: Position) -> Result<()> {
        let disk_stride = SUB_BLOCKS_PER_DISK_BLOCK as u64;
        let disk_block = target / disk_stride;
        let offset = (target % disk_stride) as usize;

        let source = self.source.as_mut().ok_or_else(closed)?;
        if source.is_seekable() {
            source.seek_to(disk_block * self.variant.disk_block_bytes() as u64)?;
            self.framer.reposition(disk_block, offset);
            trace!(target, disk_block, offset, "seek");
            return Ok(());
        }

        if target < self.logical_position() {
            debug!(
                from = self.logical_position(),
                target, "replaying forward-only source from the start"
            );
            self.replay()?;
        }
        while self.logical_position() < target {
            if self.next_sub_block()?.is_none() {
                self.framer.reposition(disk_block, offset);
                break;
            }
        }
        Ok(())
    }

    /// Check that the file starts like a particle file: a run header in the
    /// first slot and padding words holding the payload size.
    ///
    /// The cursor is restored afterwards. Forward-only sources are not
    /// checked and always pass; a closed stream never does.
    pub fn validate(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        if !self.is_seekable() {
            return true;
        }

        let saved = self.logical_position();
        let verdict = self.check_first_disk_block();
        let restored = self.seek(saved);

        match (verdict, restored) {
            (Ok(()), Ok(())) => true,
            (Err(e), _) => {
                debug!(error = %e, "particle file failed validation");
                false
            }
            (Ok(()), Err(e)) => {
                warn!(error = %e, position = saved, "could not restore position after validation");
                false
            }
        }
    }

    /// Release the source; every later read or seek fails with
    /// [`CorsikaError::IllegalState`]. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            debug!("closed particle stream");
        }
    }

    fn check_first_disk_block(&mut self) -> Result<()> {
        self.seek(0)?;
        let kind = self
            .next_sub_block()?
            .map(|sub_block| sub_block.kind)
            .ok_or(CorsikaError::UnexpectedEnd { position: 0 })?;
        if kind != BlockKind::RunHeader {
            return Err(CorsikaError::UnexpectedBlock {
                position: 0,
                expected: BlockKind::RunHeader,
                found: kind,
            });
        }

        let (start, _) = self.framer.padding();
        let expected = self.variant.padding_value();
        if start != expected {
            return Err(CorsikaError::UnexpectedPadding {
                disk_block: 0,
                expected,
                found: start,
            });
        }
        Ok(())
    }

    fn replay(&mut self) -> Result<()> {
        let source = self.source.as_mut().ok_or_else(closed)?;
        source.reopen()?;
        let prefix = read_prefix(source)?;
        self.framer.prime(prefix, source)
    }
}

fn closed() -> CorsikaError {
    CorsikaError::IllegalState("particle stream is closed".to_string())
}

fn read_prefix<R: Read + ?Sized>(source: &mut R) -> Result<[u8; FormatVariant::SNIFF_BYTES]> {
    let mut prefix = [0u8; FormatVariant::SNIFF_BYTES];
    if read_full(source, &mut prefix)? < prefix.len() {
        return Err(CorsikaError::UnrecognizedFormat { prefix });
    }
    Ok(prefix)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::stream::ReplayableSource;
    use corsika_test_utils::SyntheticFile;
    use std::io::Cursor;

    fn kinds<S: BlockSource>(stream: &mut RawStream<S>) -> Vec<BlockKind> {
        let mut kinds = Vec::new();
        while let Some(sub_block) = stream.next_sub_block().unwrap() {
            kinds.push(sub_block.kind);
        }
        kinds
    }

    #[test]
    fn test_sequential_read() {
        let bytes = SyntheticFile::single_event(false, false).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();
        assert!(stream.is_seekable());
        assert!(!stream.is_thinned());

        let kinds = kinds(&mut stream);
        // three disk blocks, zero-filled after the run trailer
        assert_eq!(kinds.len(), 63);
        assert_eq!(kinds[0], BlockKind::RunHeader);
        assert_eq!(kinds[1], BlockKind::EventHeader);
        assert_eq!(kinds[52], BlockKind::Longitudinal);
        assert_eq!(kinds[53], BlockKind::EventTrailer);
        assert_eq!(kinds[54], BlockKind::RunTrailer);
        assert_eq!(stream.logical_position(), 63);
    }

    #[test]
    fn test_seek_direct() {
        let bytes = SyntheticFile::single_event(true, true).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();

        stream.seek(53).unwrap();
        assert_eq!(stream.logical_position(), 53);
        let block = stream.next_block().unwrap().unwrap();
        assert_eq!(block.kind(), BlockKind::EventTrailer);

        stream.seek(1).unwrap();
        let Block::EventHeader(header) = stream.next_block().unwrap().unwrap() else {
            panic!("expected event header");
        };
        assert_eq!(header.event_id(), 7);
    }

    #[test]
    fn test_seek_by_replay() {
        let bytes = SyntheticFile::single_event(false, true).to_bytes();
        let source = ReplayableSource::new(move || Ok(Cursor::new(bytes.clone()))).unwrap();
        let mut stream = RawStream::new(source).unwrap();
        assert!(!stream.is_seekable());

        stream.seek(52).unwrap();
        assert_eq!(stream.next_sub_block().unwrap().unwrap().kind, BlockKind::Longitudinal);

        stream.seek(1).unwrap();
        assert_eq!(stream.logical_position(), 1);
        assert_eq!(stream.next_sub_block().unwrap().unwrap().kind, BlockKind::EventHeader);
    }

    #[test]
    fn test_seek_past_end() {
        let bytes = SyntheticFile::single_event(false, false).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();
        stream.seek(500).unwrap();
        assert!(stream.next_sub_block().unwrap().is_none());
    }

    #[test]
    fn test_validate_restores_position() {
        let bytes = SyntheticFile::single_event(false, false).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();
        stream.seek(30).unwrap();
        assert!(stream.validate());
        assert_eq!(stream.logical_position(), 30);
        assert_eq!(stream.next_sub_block().unwrap().unwrap().position, 30);
    }

    #[test]
    fn test_validate_rejects_missing_run_header() {
        let mut file = SyntheticFile::new(false, false);
        file.event_header(1, 14, 0.0).event_trailer(1);
        let mut stream = RawStream::from_reader(Cursor::new(file.to_bytes())).unwrap();
        assert!(!stream.validate());
        assert_eq!(stream.logical_position(), 0);
    }

    #[test]
    fn test_unrecognized_format() {
        let err = RawStream::from_reader(Cursor::new(b"not a particle file".to_vec())).unwrap_err();
        assert!(matches!(err, CorsikaError::UnrecognizedFormat { .. }));

        let err = RawStream::from_reader(Cursor::new(vec![1u8, 2, 3])).unwrap_err();
        assert!(matches!(err, CorsikaError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_close_is_idempotent() {
        let bytes = SyntheticFile::single_event(false, false).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes)).unwrap();
        stream.close();
        stream.close();
        assert!(stream.is_closed());
        assert!(!stream.is_seekable());

        let err = stream.next_block().unwrap_err();
        assert!(err.is_illegal_state());
        assert!(stream.seek(0).unwrap_err().is_illegal_state());
    }

    #[test]
    fn test_validate_fails_after_close() {
        let bytes = SyntheticFile::single_event(false, false).to_bytes();
        let mut stream = RawStream::from_reader(Cursor::new(bytes.clone())).unwrap();
        assert!(stream.validate());
        stream.close();
        assert!(!stream.validate());

        let source = ReplayableSource::new(move || Ok(Cursor::new(bytes.clone()))).unwrap();
        let mut stream = RawStream::new(source).unwrap();
        assert!(stream.validate());
        stream.close();
        assert!(!stream.validate());
    }
}
