//! Event-level access to a particle file
//!
//! A [`ShowerFile`] ties together the block stream, the event index, and
//! the longitudinal profiles, whether embedded or in the companion `.long`
//! file next to the particle file.

use crate::error::{Result, ShowerError};
use crate::options::ShowerFileOptions;
use crate::particles::ShowerParticles;
use crate::shower::{Shower, arrival_time_shift};
use corsika_formats::block::{EventHeader, EventTrailer};
use corsika_formats::profile::{GaisserHillasFit, LongitudinalProfile};
use corsika_formats::stream::{BlockSource, DynSource};
use corsika_formats::{
    Block, BlockKind, CorsikaError, EventIndex, FileStream, FormatVariant, LongFile,
    ParticleIterator, Position, RawStream, read_embedded_profile,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Particle file opened for reading whole events
pub struct ShowerFile<S = DynSource> {
    stream: RawStream<S>,
    options: ShowerFileOptions,
    observation_level: u32,
    long_file_path: Option<PathBuf>,
    long_file: Option<LongFile>,
    index: Option<EventIndex>,
    current: usize,
}

impl<S> fmt::Debug for ShowerFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShowerFile")
            .field("stream", &self.stream)
            .field("observation_level", &self.observation_level)
            .field("long_file_path", &self.long_file_path)
            .field("events", &self.index.as_ref().map(EventIndex::len))
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Companion profile file: same path with a `.long` extension, if it is a
/// regular file
pub fn companion_long_file(path: &Path) -> Option<PathBuf> {
    let candidate = path.with_extension("long");
    candidate.is_file().then_some(candidate)
}

impl ShowerFile {
    /// Open the particle file at `path`
    pub fn open<P: AsRef<Path>>(path: P, options: ShowerFileOptions) -> Result<Self> {
        let path = path.as_ref();
        options.validate()?;

        let stream = FileStream::open(path)?;
        if !stream.is_seekable() {
            warn!(
                path = %path.display(),
                "particle file does not support random access; seeks will replay from the start"
            );
        }

        let long_file_path = options
            .long_file
            .clone()
            .or_else(|| companion_long_file(path));
        if let Some(long) = &long_file_path {
            debug!(path = %long.display(), "using longitudinal file");
        }

        Self::with_long_file(stream, options, long_file_path)
    }
}

impl<S: BlockSource> ShowerFile<S> {
    /// Read events from an already opened stream.
    ///
    /// Only the long file named in `options` is used; there is no path to
    /// derive a companion from.
    pub fn from_stream(stream: RawStream<S>, options: ShowerFileOptions) -> Result<Self> {
        options.validate()?;
        let long_file_path = options.long_file.clone();
        Self::with_long_file(stream, options, long_file_path)
    }

    fn with_long_file(
        stream: RawStream<S>,
        options: ShowerFileOptions,
        long_file_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut file = Self {
            stream,
            observation_level: options.observation_level,
            options,
            long_file_path,
            long_file: None,
            index: None,
            current: 0,
        };
        if file.options.scan_on_open {
            file.scan()?;
        }
        Ok(file)
    }

    /// Detected layout
    pub fn variant(&self) -> FormatVariant {
        self.stream.variant()
    }

    /// Whether records carry thinning weights
    pub fn is_thinned(&self) -> bool {
        self.stream.is_thinned()
    }

    /// Whether the source supports direct seeks
    pub fn is_seekable(&self) -> bool {
        self.stream.is_seekable()
    }

    /// Companion longitudinal file in use, if any
    pub fn long_file_path(&self) -> Option<&Path> {
        self.long_file_path.as_deref()
    }

    /// Observation level whose particles are returned
    pub fn observation_level(&self) -> u32 {
        self.observation_level
    }

    /// Index every event; a second call reuses the first index
    pub fn scan(&mut self) -> Result<&EventIndex> {
        if self.index.is_none() {
            self.index = Some(EventIndex::build(&mut self.stream)?);
        }
        self.index.as_ref().ok_or(ShowerError::NotScanned)
    }

    /// Index built so far
    pub fn index(&self) -> Option<&EventIndex> {
        self.index.as_ref()
    }

    /// Number of events, scanning first if needed
    pub fn event_count(&mut self) -> Result<usize> {
        Ok(self.scan()?.len())
    }

    /// Check the file starts like a particle file
    pub fn validate(&mut self) -> bool {
        self.stream.validate()
    }

    /// Go back to the first event for [`ShowerFile::read`]
    pub fn rewind(&mut self) {
        self.current = 0;
    }

    /// Read the next event, or `None` after the last one
    pub fn read(&mut self) -> Result<Option<Shower>> {
        let index = self.index.as_ref().ok_or(ShowerError::NotScanned)?;
        if self.current >= index.len() {
            return Ok(None);
        }
        let shower = self.read_at(self.current)?;
        self.current += 1;
        Ok(Some(shower))
    }

    /// Read the event with identifier `id`; [`ShowerFile::read`] continues
    /// after it
    pub fn find_event(&mut self, id: u32) -> Result<Shower> {
        let index = self.index.as_ref().ok_or(ShowerError::NotScanned)?;
        let ordinal = index.find(id)?;
        let shower = self.read_at(ordinal)?;
        self.current = ordinal + 1;
        Ok(shower)
    }

    /// Particles of `shower` at its observation level
    pub fn particles(&mut self, shower: &Shower) -> Result<ShowerParticles<'_, S>> {
        let keep = self.options.keep_muon_production_info;
        let inner = ParticleIterator::new(&mut self.stream, shower.first_particle_block)?;
        Ok(ShowerParticles::new(
            inner,
            shower.observation_level,
            keep,
            shower.time_shift,
        ))
    }

    /// Release the underlying stream
    pub fn close(&mut self) {
        self.stream.close();
        self.long_file = None;
    }

    fn read_at(&mut self, ordinal: usize) -> Result<Shower> {
        let index = self.index.as_ref().ok_or(ShowerError::NotScanned)?;
        let missing = || CorsikaError::IllegalState(format!("event {ordinal} is not indexed"));
        let header_position = index.header(ordinal).ok_or_else(missing)?;
        let trailer_position = index.trailer(ordinal).ok_or_else(missing)?;
        let long_block = index.long_block(ordinal);
        let embedded = index.has_long_blocks();

        let header = self.read_header(header_position)?;
        let trailer = self.read_trailer(trailer_position)?;

        let levels = header.observation_level_count() as u32;
        if self.observation_level > levels {
            info!(
                requested = self.observation_level,
                available = levels,
                "observation level does not exist, switching to level 1"
            );
            self.observation_level = 1;
        }

        let time_shift = arrival_time_shift(&header);
        if header.is_curved() {
            debug!(time_shift, "curved atmosphere time shift");
        }

        let mut profile = if embedded {
            match long_block {
                Some(start) => read_embedded_profile(&mut self.stream, start)?,
                None => LongitudinalProfile::default(),
            }
        } else {
            self.companion_profile(ordinal, f64::from(header.theta))?
        };
        if profile.gaisser_hillas.is_none() {
            profile.gaisser_hillas = GaisserHillasFit::from_trailer(&trailer);
        }

        Ok(Shower {
            ordinal,
            header,
            trailer,
            profile,
            time_shift,
            observation_level: self.observation_level,
            first_particle_block: header_position + 1,
        })
    }

    fn read_header(&mut self, position: Position) -> Result<EventHeader> {
        self.stream.seek(position)?;
        match self.stream.next_block()? {
            Some(Block::EventHeader(header)) => Ok(header),
            Some(other) => Err(unexpected(position, BlockKind::EventHeader, other.kind())),
            None => Err(CorsikaError::UnexpectedEnd { position }.into()),
        }
    }

    fn read_trailer(&mut self, position: Position) -> Result<EventTrailer> {
        self.stream.seek(position)?;
        match self.stream.next_block()? {
            Some(Block::EventTrailer(trailer)) => Ok(trailer),
            Some(other) => Err(unexpected(position, BlockKind::EventTrailer, other.kind())),
            None => Err(CorsikaError::UnexpectedEnd { position }.into()),
        }
    }

    /// Profile from the companion file. It is opened on first use with the
    /// zenith angle of that event.
    fn companion_profile(&mut self, ordinal: usize, zenith: f64) -> Result<LongitudinalProfile> {
        let Some(path) = &self.long_file_path else {
            return Ok(LongitudinalProfile::default());
        };
        if self.long_file.is_none() {
            self.long_file = Some(LongFile::open(path, zenith)?);
        }
        match self.long_file.as_mut() {
            Some(long_file) => Ok(long_file.profile(ordinal)?),
            None => Ok(LongitudinalProfile::default()),
        }
    }
}

fn unexpected(position: Position, expected: BlockKind, found: BlockKind) -> ShowerError {
    CorsikaError::UnexpectedBlock {
        position,
        expected,
        found,
    }
    .into()
}
