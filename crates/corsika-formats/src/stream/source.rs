//! Backing storage for a block stream
//!
//! Plain files can be positioned directly. Compressed or piped inputs can
//! only be read forward, so "going back" means opening them again from the
//! start. [`BlockSource`] captures both cases behind one interface with a
//! single owner: reopening replaces the handle in place.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::debug;

/// Gzip member magic bytes
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Readable storage that may or may not support direct positioning
pub trait BlockSource: Read {
    /// Whether [`BlockSource::seek_to`] is supported
    fn is_seekable(&self) -> bool;

    /// Position the next read at `offset` bytes from the start
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Replace the underlying handle with a fresh one positioned at the start
    fn reopen(&mut self) -> io::Result<()>;
}

impl<S: BlockSource + ?Sized> BlockSource for Box<S> {
    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        (**self).seek_to(offset)
    }

    fn reopen(&mut self) -> io::Result<()> {
        (**self).reopen()
    }
}

/// Source over anything implementing [`Seek`]
#[derive(Debug)]
pub struct SeekableSource<R> {
    inner: R,
}

impl<R: Read + Seek> SeekableSource<R> {
    /// Wrap a seekable reader
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for SeekableSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Seek> BlockSource for SeekableSource<R> {
    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn reopen(&mut self) -> io::Result<()> {
        self.seek_to(0)
    }
}

/// Forward-only source that can be replayed by calling its opener again
pub struct ReplayableSource<F, R> {
    open: F,
    inner: R,
}

impl<F, R> ReplayableSource<F, R>
where
    F: FnMut() -> io::Result<R>,
    R: Read,
{
    /// Open the first handle through `open`
    pub fn new(mut open: F) -> io::Result<Self> {
        let inner = open()?;
        Ok(Self { open, inner })
    }
}

impl<F, R: Read> Read for ReplayableSource<F, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<F, R> BlockSource for ReplayableSource<F, R>
where
    F: FnMut() -> io::Result<R>,
    R: Read,
{
    fn is_seekable(&self) -> bool {
        false
    }

    fn seek_to(&mut self, _offset: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source does not support positioning",
        ))
    }

    fn reopen(&mut self) -> io::Result<()> {
        self.inner = (self.open)()?;
        Ok(())
    }
}

impl<F, R> std::fmt::Debug for ReplayableSource<F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayableSource").finish_non_exhaustive()
    }
}

/// Boxed source as returned by [`open_path`]
pub type DynSource = Box<dyn BlockSource + Send>;

/// Open a particle file, transparently decompressing gzip input.
///
/// Gzip files become a [`ReplayableSource`] that reopens the file on every
/// rewind; everything else is a buffered [`SeekableSource`].
pub fn open_path<P: AsRef<Path>>(path: P) -> io::Result<DynSource> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let mut magic = Vec::with_capacity(GZIP_MAGIC.len());
    (&mut file).take(GZIP_MAGIC.len() as u64).read_to_end(&mut magic)?;

    if magic == GZIP_MAGIC {
        debug!(path = %path.display(), "opening gzip-compressed particle file");
        let path: PathBuf = path.to_path_buf();
        let source = ReplayableSource::new(move || File::open(&path).map(MultiGzDecoder::new))?;
        return Ok(Box::new(source));
    }

    file.seek(SeekFrom::Start(0))?;
    Ok(Box::new(SeekableSource::new(BufReader::new(file))))
}
