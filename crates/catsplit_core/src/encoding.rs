//! Swappable payload encodings.
//!
//! The sequencer only talks to a [`PartitionEncoding`]; whether a partition
//! is gzip compressed or stored as plain text is decided by which strategy is
//! plugged in.

use crate::descriptor::StorageObjectDescriptor;
use catsplit_codec::{BoundedGzipWriter, BoundedPlainWriter, CodecResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annotation telling a consumer how the payload is encoded.
pub const CONTENT_ENCODING_ANNOTATION: &str = "olm.contentEncoding";

/// Annotation value for gzip compressed payloads.
pub const GZIP_ENCODING: &str = "gzip+base64";

/// Default key the payload is stored under inside a storage object.
pub const DEFAULT_PAYLOAD_KEY: &str = "extraFBC";

/// Suffix of a compressed payload file.
pub const GZIP_SUFFIX: &str = ".gz";

/// How partition payloads are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingKind {
    /// gzip compressed, annotated with [`GZIP_ENCODING`].
    Gzip,
    /// Raw text, no annotation.
    Plain,
}

impl EncodingKind {
    /// Returns the content encoding annotation value, if any.
    #[must_use]
    pub const fn annotation(self) -> Option<&'static str> {
        match self {
            EncodingKind::Gzip => Some(GZIP_ENCODING),
            EncodingKind::Plain => None,
        }
    }

    /// Detects the encoding from a descriptor's annotations.
    #[must_use]
    pub fn from_annotations(annotations: &BTreeMap<String, String>) -> Self {
        match annotations.get(CONTENT_ENCODING_ANNOTATION) {
            Some(value) if value == GZIP_ENCODING => EncodingKind::Gzip,
            _ => EncodingKind::Plain,
        }
    }

    /// Returns the file name a payload stored under `payload_key` is mounted as.
    #[must_use]
    pub fn file_name(self, payload_key: &str) -> String {
        match self {
            EncodingKind::Gzip => format!("{payload_key}.yaml{GZIP_SUFFIX}"),
            EncodingKind::Plain => format!("{payload_key}.yaml"),
        }
    }

    /// Creates a fresh encoding strategy of this kind.
    #[must_use]
    pub fn boxed(self, level: u32, ceiling: usize) -> Box<dyn PartitionEncoding> {
        match self {
            EncodingKind::Gzip => Box::new(GzipEncoding::new(level, ceiling)),
            EncodingKind::Plain => Box::new(PlainEncoding::new(ceiling)),
        }
    }
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingKind::Gzip => write!(f, "gzip"),
            EncodingKind::Plain => write!(f, "plain"),
        }
    }
}

/// The capability a payload encoding offers the partition sequencer.
///
/// # Invariants
///
/// - `probe` never changes what `seal` will return
/// - `commit` only ever receives bytes that are final
/// - `seal` returns an independently decodable payload and leaves the
///   encoding empty
/// - `reset` makes the next probe relative to the committed content only
pub trait PartitionEncoding {
    /// Returns which encoding this is.
    fn kind(&self) -> EncodingKind;

    /// Returns the capacity ceiling probes are compared against.
    fn ceiling(&self) -> usize;

    /// Discards probe state that diverged from the committed content.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe state cannot be rebuilt.
    fn reset(&mut self) -> CodecResult<()>;

    /// Creates an empty storage object carrying this encoding's annotation.
    fn new_container(
        &self,
        name: &str,
        namespace: &str,
        payload_key: &str,
    ) -> StorageObjectDescriptor {
        StorageObjectDescriptor::shell(name, namespace, payload_key, self.kind())
    }

    /// Returns true if nothing has been committed to the current partition.
    fn is_empty(&self) -> bool;

    /// Returns true if committing `candidate` would exceed the ceiling, given
    /// `reserved` bytes of non-payload overhead.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails.
    fn probe(&mut self, reserved: usize, candidate: &[u8]) -> CodecResult<bool>;

    /// Appends final bytes to the current partition.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails.
    fn commit(&mut self, data: &[u8]) -> CodecResult<()>;

    /// Completes the current partition and returns its payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails to finish.
    fn seal(&mut self) -> CodecResult<Vec<u8>>;
}

/// gzip compressed partitions.
#[derive(Debug)]
pub struct GzipEncoding {
    writer: BoundedGzipWriter,
}

impl GzipEncoding {
    /// Creates a gzip strategy.
    #[must_use]
    pub fn new(level: u32, ceiling: usize) -> Self {
        Self {
            writer: BoundedGzipWriter::new(level, ceiling),
        }
    }
}

impl PartitionEncoding for GzipEncoding {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Gzip
    }

    fn ceiling(&self) -> usize {
        self.writer.ceiling()
    }

    fn reset(&mut self) -> CodecResult<()> {
        self.writer.reset()
    }

    fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    fn probe(&mut self, reserved: usize, candidate: &[u8]) -> CodecResult<bool> {
        self.writer.probe(reserved, candidate)
    }

    fn commit(&mut self, data: &[u8]) -> CodecResult<()> {
        self.writer.commit(data)
    }

    fn seal(&mut self) -> CodecResult<Vec<u8>> {
        self.writer.seal()
    }
}

/// Uncompressed partitions.
#[derive(Debug)]
pub struct PlainEncoding {
    writer: BoundedPlainWriter,
}

impl PlainEncoding {
    /// Creates a plain strategy.
    #[must_use]
    pub fn new(ceiling: usize) -> Self {
        Self {
            writer: BoundedPlainWriter::new(ceiling),
        }
    }
}

impl PartitionEncoding for PlainEncoding {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Plain
    }

    fn ceiling(&self) -> usize {
        self.writer.ceiling()
    }

    fn reset(&mut self) -> CodecResult<()> {
        self.writer.reset()
    }

    fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    fn probe(&mut self, reserved: usize, candidate: &[u8]) -> CodecResult<bool> {
        self.writer.probe(reserved, candidate)
    }

    fn commit(&mut self, data: &[u8]) -> CodecResult<()> {
        self.writer.commit(data)
    }

    fn seal(&mut self) -> CodecResult<Vec<u8>> {
        self.writer.seal()
    }
}
