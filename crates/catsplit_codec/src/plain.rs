//! Uncompressed bounded writer.

use crate::error::CodecResult;
use std::mem;

/// A bounded writer that stores bytes as-is.
///
/// It exposes the same probe/commit/seal/reset operations as
/// [`BoundedGzipWriter`](crate::BoundedGzipWriter), with sizes measured on
/// raw bytes. Probing never needs a second buffer since the size of
/// uncompressed content is known without writing it.
#[derive(Debug, Default)]
pub struct BoundedPlainWriter {
    ceiling: usize,
    committed: Vec<u8>,
}

impl BoundedPlainWriter {
    /// Creates a writer whose probes compare against `ceiling` bytes.
    #[must_use]
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling,
            committed: Vec::new(),
        }
    }

    /// Returns the capacity ceiling probes are compared against.
    #[must_use]
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Returns true if nothing has been committed to the current partition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Returns the number of bytes committed so far.
    #[must_use]
    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    /// Tests whether `candidate` would push the partition over the ceiling.
    pub fn probe(&mut self, reserved: usize, candidate: &[u8]) -> CodecResult<bool> {
        let total = reserved
            .saturating_add(self.committed.len())
            .saturating_add(candidate.len());
        Ok(total > self.ceiling)
    }

    /// Appends final bytes to the partition.
    pub fn commit(&mut self, data: &[u8]) -> CodecResult<()> {
        self.committed.extend_from_slice(data);
        Ok(())
    }

    /// No probe state to discard.
    pub fn reset(&mut self) -> CodecResult<()> {
        Ok(())
    }

    /// Returns the completed payload and clears the partition.
    pub fn seal(&mut self) -> CodecResult<Vec<u8>> {
        Ok(mem::take(&mut self.committed))
    }
}
