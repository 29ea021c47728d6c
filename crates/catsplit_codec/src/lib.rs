//! # catsplit Codec
//!
//! Size-bounded writers for catsplit partitions.
//!
//! A partition payload must stay under a hard capacity ceiling measured
//! *after* compression. Compression is a cumulative stream, so bytes written
//! to an encoder cannot be taken back. The writers in this crate therefore
//! separate two paths:
//!
//! - `probe` measures what the payload would become if a candidate were
//!   appended, without touching the real output;
//! - `commit` appends bytes that are final;
//! - `seal` finishes the payload and clears the writer for the next
//!   partition;
//! - `reset` discards probe state that diverged from the committed content.
//!
//! ## Writers
//!
//! - [`BoundedGzipWriter`] - two independent gzip encoders (committed and probe)
//! - [`BoundedPlainWriter`] - raw bytes, for uncompressed storage units
//!
//! ## Usage
//!
//! ```
//! use catsplit_codec::{gunzip_to_string, BoundedGzipWriter};
//!
//! let mut writer = BoundedGzipWriter::new(6, 4096);
//! for doc in ["kind: a", "\n---\nkind: b"] {
//!     if writer.probe(0, doc.as_bytes()).unwrap() {
//!         break;
//!     }
//!     writer.commit(doc.as_bytes()).unwrap();
//!     writer.reset().unwrap();
//! }
//! let payload = writer.seal().unwrap();
//! assert_eq!(gunzip_to_string(&payload).unwrap(), "kind: a\n---\nkind: b");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod error;
mod gzip;
mod plain;

pub use decoder::{gunzip, gunzip_to_string};
pub use error::{CodecError, CodecResult};
pub use gzip::{gzip, BoundedGzipWriter, DEFAULT_LEVEL, GZIP_TRAILER_RESERVE};
pub use plain::BoundedPlainWriter;
