//! Dual-encoder gzip writer with a side-effect-free size probe.

use crate::error::CodecResult;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::mem;
use tracing::trace;

/// Default gzip compression level.
pub const DEFAULT_LEVEL: u32 = 6;

/// Bytes reserved for the gzip trailer and final block, which are only
/// written when a stream is finished.
pub const GZIP_TRAILER_RESERVE: usize = 13;

/// Relationship of the probe encoder to the committed encoder.
#[derive(Debug)]
enum ProbeState {
    /// The probe holds exactly the committed content.
    Synced,
    /// The probe holds the committed content plus these candidate bytes.
    Probed(Vec<u8>),
    /// The probe no longer mirrors the committed content.
    Stale,
}

/// A gzip writer that can answer "would these bytes still fit?" before
/// committing them.
///
/// Compression is cumulative and cannot be rewound, so the writer keeps two
/// independent encoders over independent buffers:
///
/// - the **committed** encoder only ever receives bytes that are final;
/// - the **probe** encoder mirrors the committed content plus whatever is
///   currently under test, and is sync-flushed so its buffer length reflects
///   the compressed size so far.
///
/// Resetting the probe discards it and re-creates it from the committed raw
/// bytes. No codec state is ever shared between the two encoders.
///
/// # Example
///
/// ```rust
/// use catsplit_codec::{gunzip_to_string, BoundedGzipWriter};
///
/// let mut writer = BoundedGzipWriter::new(6, 1024);
/// assert!(!writer.probe(0, b"first document").unwrap());
/// writer.commit(b"first document").unwrap();
/// writer.reset().unwrap();
///
/// let payload = writer.seal().unwrap();
/// assert_eq!(gunzip_to_string(&payload).unwrap(), "first document");
/// assert!(writer.is_empty());
/// ```
pub struct BoundedGzipWriter {
    level: u32,
    ceiling: usize,
    committed: GzEncoder<Vec<u8>>,
    probe: GzEncoder<Vec<u8>>,
    committed_raw: Vec<u8>,
    probe_state: ProbeState,
}

impl BoundedGzipWriter {
    /// Creates a writer whose probes compare against `ceiling` bytes.
    ///
    /// Levels above 9 are clamped to 9.
    #[must_use]
    pub fn new(level: u32, ceiling: usize) -> Self {
        let level = level.min(9);
        Self {
            level,
            ceiling,
            committed: new_encoder(level),
            probe: new_encoder(level),
            committed_raw: Vec::new(),
            probe_state: ProbeState::Synced,
        }
    }

    /// Returns the capacity ceiling probes are compared against.
    #[must_use]
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Returns the configured compression level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns true if nothing has been committed to the current partition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed_raw.is_empty()
    }

    /// Returns the number of uncompressed bytes committed so far.
    #[must_use]
    pub fn committed_len(&self) -> usize {
        self.committed_raw.len()
    }

    /// Returns the flushed size of the probe stream as of the last probe.
    #[must_use]
    pub fn probe_size(&self) -> usize {
        self.probe.get_ref().len()
    }

    /// Tests whether `candidate` would push the partition over the ceiling.
    ///
    /// The candidate is written into the probe encoder only, followed by a
    /// sync flush (not a finish: finishing appends the trailer and forbids
    /// further writes). Returns true if `reserved` plus the flushed probe size
    /// exceeds the ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe encoder fails to write or flush.
    pub fn probe(&mut self, reserved: usize, candidate: &[u8]) -> CodecResult<bool> {
        if !matches!(self.probe_state, ProbeState::Synced) {
            self.reset()?;
        }

        self.probe.write_all(candidate)?;
        self.probe.flush()?;
        self.probe_state = ProbeState::Probed(candidate.to_vec());

        let size = reserved.saturating_add(self.probe_size());
        let rejected = size > self.ceiling;
        trace!(candidate = candidate.len(), size, ceiling = self.ceiling, rejected, "gzip probe");
        Ok(rejected)
    }

    /// Appends final bytes to the committed encoder.
    ///
    /// No flush is performed. If `data` is exactly the candidate of the last
    /// probe the probe encoder stays in sync; otherwise it is marked stale and
    /// rebuilt by the next [`reset`](Self::reset) or probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the committed encoder fails to write.
    pub fn commit(&mut self, data: &[u8]) -> CodecResult<()> {
        self.committed.write_all(data)?;
        self.committed_raw.extend_from_slice(data);

        self.probe_state = match mem::replace(&mut self.probe_state, ProbeState::Stale) {
            ProbeState::Probed(candidate) if candidate == data => ProbeState::Synced,
            _ => ProbeState::Stale,
        };
        Ok(())
    }

    /// Discards any divergent probe state.
    ///
    /// A probe that holds rejected or otherwise uncommitted bytes is thrown
    /// away and re-created from the committed raw content. A probe that
    /// already mirrors the committed content is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if replaying the committed content fails.
    pub fn reset(&mut self) -> CodecResult<()> {
        if matches!(self.probe_state, ProbeState::Synced) {
            return Ok(());
        }

        trace!(replayed = self.committed_raw.len(), "rebuilding gzip probe");
        let mut probe = new_encoder(self.level);
        if !self.committed_raw.is_empty() {
            probe.write_all(&self.committed_raw)?;
        }
        self.probe = probe;
        self.probe_state = ProbeState::Synced;
        Ok(())
    }

    /// Finishes the committed stream and returns the completed payload.
    ///
    /// The gzip trailer is written, and all state is cleared so the writer
    /// can start the next partition.
    ///
    /// # Errors
    ///
    /// Returns an error if the committed encoder fails to finish.
    pub fn seal(&mut self) -> CodecResult<Vec<u8>> {
        let committed = mem::replace(&mut self.committed, new_encoder(self.level));
        self.probe = new_encoder(self.level);
        self.committed_raw.clear();
        self.probe_state = ProbeState::Synced;

        let payload = committed.finish()?;
        trace!(payload = payload.len(), "sealed gzip stream");
        Ok(payload)
    }
}

impl std::fmt::Debug for BoundedGzipWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedGzipWriter")
            .field("level", &self.level)
            .field("ceiling", &self.ceiling)
            .field("committed_len", &self.committed_raw.len())
            .field("probe_size", &self.probe_size())
            .field("probe_state", &self.probe_state)
            .finish()
    }
}

fn new_encoder(level: u32) -> GzEncoder<Vec<u8>> {
    GzEncoder::new(Vec::new(), Compression::new(level))
}

/// Compresses `data` into a complete gzip stream.
///
/// # Errors
///
/// Returns an error if the encoder fails.
pub fn gzip(data: &[u8], level: u32) -> CodecResult<Vec<u8>> {
    let mut encoder = new_encoder(level.min(9));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
