//! Greedy packing of segments into size-bounded partitions.
//!
//! The sequencer walks the segments once, in order. Each segment is probed
//! against the current partition; if it fits it is committed, otherwise the
//! partition is sealed and the segment opens the next one. Segments are never
//! split and never reordered.

use crate::encoding::PartitionEncoding;
use crate::error::{CoreError, CoreResult};
use crate::segment::Segment;
use std::ops::Range;
use tracing::debug;

/// A completed partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPartition {
    /// 1-based ordinal.
    pub ordinal: u32,
    /// Indexes of the segments this partition holds.
    pub segments: Range<usize>,
    /// Uncompressed length of the partition content, joiners included.
    pub raw_len: usize,
    /// Sealed payload.
    pub payload: Vec<u8>,
}

impl SealedPartition {
    /// Returns the number of segments in this partition.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Where the sequencer is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Filling the partition with this ordinal.
    Accumulating(u32),
    /// Sealing the partition with this ordinal.
    Sealing(u32),
    /// Every partition has been sealed.
    Done,
}

/// Packs segments into partitions through a [`PartitionEncoding`].
pub struct PartitionSequencer<'e> {
    encoding: &'e mut dyn PartitionEncoding,
    joiner: &'e [u8],
    reserved: usize,
    state: SequencerState,
    scratch: Vec<u8>,
    first_segment: usize,
    next_segment: usize,
    raw_len: usize,
    sealed: Vec<SealedPartition>,
}

impl<'e> PartitionSequencer<'e> {
    /// Creates a sequencer.
    ///
    /// `reserved` is the non-payload size of a storage object, counted
    /// against the ceiling on every probe.
    pub fn new(encoding: &'e mut dyn PartitionEncoding, joiner: &'e str, reserved: usize) -> Self {
        Self {
            encoding,
            joiner: joiner.as_bytes(),
            reserved,
            state: SequencerState::Accumulating(1),
            scratch: Vec::new(),
            first_segment: 0,
            next_segment: 0,
            raw_len: 0,
            sealed: Vec::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Adds the next segment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OversizeSegment`] if the segment does not fit in
    /// an empty partition, or a codec error if the encoder fails.
    pub fn push(&mut self, segment: &Segment<'_>) -> CoreResult<()> {
        if self.state == SequencerState::Done {
            return Err(CoreError::invalid_config(
                "cannot add segments after the sequencer finished",
            ));
        }

        if self.try_append(segment)? {
            return Ok(());
        }
        if self.encoding.is_empty() {
            return Err(self.oversize(segment));
        }

        self.seal_current()?;

        if !self.try_append(segment)? {
            return Err(self.oversize(segment));
        }
        Ok(())
    }

    /// Seals the last partition and returns every sealed partition.
    ///
    /// A run without segments still produces one empty partition.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the encoder fails to finish.
    pub fn finish(mut self) -> CoreResult<Vec<SealedPartition>> {
        if self.state != SequencerState::Done {
            self.seal_current()?;
            self.state = SequencerState::Done;
        }
        Ok(self.sealed)
    }

    /// Runs a whole segment sequence through a fresh sequencer.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push) and [`finish`](Self::finish).
    pub fn run(
        encoding: &'e mut dyn PartitionEncoding,
        joiner: &'e str,
        reserved: usize,
        segments: &[Segment<'_>],
    ) -> CoreResult<Vec<SealedPartition>> {
        let mut sequencer = Self::new(encoding, joiner, reserved);
        for segment in segments {
            sequencer.push(segment)?;
        }
        sequencer.finish()
    }

    /// Probes the segment against the current partition and commits it if
    /// it fits. Returns whether it was committed.
    fn try_append(&mut self, segment: &Segment<'_>) -> CoreResult<bool> {
        self.scratch.clear();
        if !self.encoding.is_empty() {
            self.scratch.extend_from_slice(self.joiner);
        }
        self.scratch.extend_from_slice(segment.text.as_bytes());

        if self.encoding.probe(self.reserved, &self.scratch)? {
            return Ok(false);
        }

        self.encoding.commit(&self.scratch)?;
        self.encoding.reset()?;
        self.raw_len += self.scratch.len();
        self.next_segment = segment.index + 1;
        Ok(true)
    }

    fn seal_current(&mut self) -> CoreResult<()> {
        let ordinal = match self.state {
            SequencerState::Accumulating(ordinal) => ordinal,
            SequencerState::Sealing(_) | SequencerState::Done => {
                return Err(CoreError::invalid_config("no partition is open"));
            }
        };
        self.state = SequencerState::Sealing(ordinal);

        let payload = self.encoding.seal()?;
        let partition = SealedPartition {
            ordinal,
            segments: self.first_segment..self.next_segment,
            raw_len: self.raw_len,
            payload,
        };
        debug!(
            ordinal,
            segments = partition.segment_count(),
            raw_len = partition.raw_len,
            payload_len = partition.payload.len(),
            "sealed partition"
        );
        self.sealed.push(partition);

        self.first_segment = self.next_segment;
        self.raw_len = 0;
        self.state = SequencerState::Accumulating(ordinal + 1);
        Ok(())
    }

    fn oversize(&self, segment: &Segment<'_>) -> CoreError {
        CoreError::OversizeSegment {
            index: segment.index,
            size: segment.len(),
            ceiling: self.encoding.ceiling(),
        }
    }
}

impl std::fmt::Debug for PartitionSequencer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionSequencer")
            .field("encoding", &self.encoding.kind())
            .field("reserved", &self.reserved)
            .field("state", &self.state)
            .field("sealed", &self.sealed.len())
            .finish()
    }
}
