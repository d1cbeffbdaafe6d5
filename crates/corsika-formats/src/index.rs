//! Event index
//!
//! One sequential pass over a stream records where every event header,
//! event trailer and embedded longitudinal profile sits. Random access to
//! events goes through the index afterwards.

use crate::block::{Block, BlockKind};
use crate::error::{CorsikaError, Result};
use crate::stream::{BlockSource, Position, RawStream};
use std::collections::HashMap;
use tracing::{debug, info};

/// Positions of the events in one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventIndex {
    event_headers: Vec<Position>,
    event_trailers: Vec<Position>,
    long_blocks: Vec<Position>,
    event_profiles: Vec<Option<Position>>,
    ids: Vec<u32>,
    id_to_position: HashMap<u32, usize>,
}

impl EventIndex {
    /// Scan `stream` from the start and index every event.
    ///
    /// Only header blocks are decoded. The stream is left at the end.
    pub fn build<S: BlockSource>(stream: &mut RawStream<S>) -> Result<Self> {
        stream.seek(0)?;

        let mut index = Self::default();
        let mut open_event: Option<(Position, u32)> = None;
        let mut awaiting_profile = false;

        while let Some(sub_block) = stream.next_sub_block()? {
            let position = sub_block.position;
            match sub_block.kind {
                BlockKind::EventHeader => {
                    if let Some((header, _)) = open_event {
                        return Err(CorsikaError::UnpairedHeader { position: header });
                    }
                    let id = match sub_block.decode()? {
                        Block::EventHeader(header) => header.event_id(),
                        other => {
                            return Err(CorsikaError::UnexpectedBlock {
                                position,
                                expected: BlockKind::EventHeader,
                                found: other.kind(),
                            });
                        }
                    };
                    debug!(position, event = id, "event header");
                    index.event_headers.push(position);
                    index.event_profiles.push(None);
                    open_event = Some((position, id));
                    awaiting_profile = true;
                }
                BlockKind::EventTrailer => {
                    let Some((_, id)) = open_event.take() else {
                        return Err(CorsikaError::UnpairedTrailer { position });
                    };
                    index.event_trailers.push(position);
                    index.ids.push(id);
                    index.id_to_position.insert(id, index.event_headers.len() - 1);
                }
                BlockKind::Longitudinal if awaiting_profile => {
                    index.long_blocks.push(position);
                    if let Some(profile) = index.event_profiles.last_mut() {
                        *profile = Some(position);
                    }
                    awaiting_profile = false;
                }
                _ => {}
            }
        }

        if let Some((header, _)) = open_event {
            return Err(CorsikaError::UnpairedHeader { position: header });
        }

        info!(
            events = index.len(),
            profiles = index.long_blocks.len(),
            "indexed particle file"
        );
        Ok(index)
    }

    /// Number of complete events
    pub fn len(&self) -> usize {
        self.event_headers.len()
    }

    /// Whether the file holds no events
    pub fn is_empty(&self) -> bool {
        self.event_headers.is_empty()
    }

    /// Event header positions in file order
    pub fn event_headers(&self) -> &[Position] {
        &self.event_headers
    }

    /// Event trailer positions in file order
    pub fn event_trailers(&self) -> &[Position] {
        &self.event_trailers
    }

    /// Positions of the first longitudinal block of every event that has one
    pub fn long_blocks(&self) -> &[Position] {
        &self.long_blocks
    }

    /// Whether any event carries an embedded profile
    pub fn has_long_blocks(&self) -> bool {
        !self.long_blocks.is_empty()
    }

    /// Header position of the event at `ordinal`
    pub fn header(&self, ordinal: usize) -> Option<Position> {
        self.event_headers.get(ordinal).copied()
    }

    /// Trailer position of the event at `ordinal`
    pub fn trailer(&self, ordinal: usize) -> Option<Position> {
        self.event_trailers.get(ordinal).copied()
    }

    /// First longitudinal block of the event at `ordinal`, if it has one
    pub fn long_block(&self, ordinal: usize) -> Option<Position> {
        self.event_profiles.get(ordinal).copied().flatten()
    }

    /// Ordinal of the event with identifier `id`.
    ///
    /// If several events share an identifier, the last one wins.
    pub fn find(&self, id: u32) -> Result<usize> {
        self.id_to_position
            .get(&id)
            .copied()
            .ok_or(CorsikaError::EventNotFound(id))
    }

    /// Event identifiers in file order, repeats included
    pub fn event_ids(&self) -> &[u32] {
        &self.ids
    }
}
