//! Reading partition sets back.

use crate::descriptor::{validate_sequence, DescriptorBuilder, StorageObjectDescriptor};
use crate::encoding::EncodingKind;
use crate::error::{CoreError, CoreResult};
use catsplit_codec::{gunzip_to_string, CodecError};
use catsplit_storage::ObjectStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decodes one descriptor's payload into text.
///
/// # Errors
///
/// Returns a codec error if the payload is not valid gzip or not UTF-8.
pub fn decode_payload(descriptor: &StorageObjectDescriptor) -> CoreResult<String> {
    match descriptor.encoding() {
        EncodingKind::Gzip => Ok(gunzip_to_string(&descriptor.payload)?),
        EncodingKind::Plain => String::from_utf8(descriptor.payload.to_vec())
            .map_err(|_| CoreError::Codec(CodecError::InvalidUtf8)),
    }
}

/// Orders `descriptors` by ordinal and checks they form one complete set.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDescriptorSet`] on gaps, duplicates, foreign
/// names or mixed content versions.
pub fn ordered(descriptors: &[StorageObjectDescriptor]) -> CoreResult<Vec<StorageObjectDescriptor>> {
    let mut sorted = descriptors.to_vec();
    sorted.sort_by_key(|d| d.ordinal);
    validate_sequence(&sorted)?;
    Ok(sorted)
}

/// Rebuilds the normalized content from a partition set.
///
/// # Errors
///
/// Returns an error if the set is incomplete or a payload cannot be decoded.
pub fn reconstruct(descriptors: &[StorageObjectDescriptor], joiner: &str) -> CoreResult<String> {
    let sorted = ordered(descriptors)?;
    let mut out = String::new();
    for (i, descriptor) in sorted.iter().enumerate() {
        if i > 0 {
            out.push_str(joiner);
        }
        out.push_str(&decode_payload(descriptor)?);
    }
    Ok(out)
}

/// Loads every partition of `base_name` from a store, ordered by ordinal.
///
/// Objects sharing the prefix but without a numeric suffix are ignored.
///
/// # Errors
///
/// Returns an error if the store fails or an object is not a descriptor.
pub fn load_descriptors(
    store: &dyn ObjectStore,
    base_name: &str,
) -> CoreResult<Vec<StorageObjectDescriptor>> {
    let builder = DescriptorBuilder::new(base_name);
    let mut descriptors = Vec::new();

    for name in store.list(&builder.partition_prefix())? {
        if builder.ordinal_of(&name).is_none() {
            continue;
        }
        if let Some(object) = store.get(&name)? {
            descriptors.push(StorageObjectDescriptor::from_stored(object)?);
        }
    }

    descriptors.sort_by_key(|d| d.ordinal);
    debug!(base = base_name, count = descriptors.len(), "loaded descriptors");
    Ok(descriptors)
}

/// Writes each partition's decoded content to `<root>/<name>/<file>`, where
/// `<file>` is the payload file name without the compression suffix.
///
/// Returns the written paths in ordinal order.
///
/// # Errors
///
/// Returns an error if the set is incomplete, a payload cannot be decoded,
/// or a file cannot be written.
pub fn unpack_to_dir(descriptors: &[StorageObjectDescriptor], root: &Path) -> CoreResult<Vec<PathBuf>> {
    let sorted = ordered(descriptors)?;
    let mut written = Vec::with_capacity(sorted.len());

    for descriptor in &sorted {
        let dir = root.join(&descriptor.name);
        fs::create_dir_all(&dir)?;
        let path = dir.join(EncodingKind::Plain.file_name(&descriptor.payload_key));
        fs::write(&path, decode_payload(descriptor)?)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartitionConfig;
    use crate::descriptor::DescriptorBuilder;
    use crate::partitioner::Partitioner;
    use catsplit_storage::InMemoryStore;
    use tempfile::tempdir;

    fn build(content: &str, max: usize) -> Vec<StorageObjectDescriptor> {
        let partitioner = Partitioner::new(PartitionConfig::new().max_object_size(max)).unwrap();
        partitioner
            .build(content, &DescriptorBuilder::new("cat"))
            .unwrap()
            .descriptors
    }

    fn content() -> String {
        (0..600)
            .map(|i| format!("schema: olm.bundle\nname: pkg.v0.{i}.0\nimage: quay.io/x/{i}"))
            .collect::<Vec<_>>()
            .join("\n---\n")
    }

    #[test]
    fn reconstruct_ignores_input_order() {
        let mut descriptors = build(&content(), 1024);
        assert!(descriptors.len() > 2);
        descriptors.reverse();
        assert_eq!(reconstruct(&descriptors, "\n---\n").unwrap(), content());
    }

    #[test]
    fn missing_partition_is_detected() {
        let mut descriptors = build(&content(), 1024);
        descriptors.remove(1);
        let err = reconstruct(&descriptors, "\n---\n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidDescriptorSet { .. }));
    }

    #[test]
    fn corrupt_payload_is_a_codec_error() {
        let mut descriptors = build("a: 1", 4096);
        descriptors[0].payload = bytes::Bytes::from_static(b"not gzip");
        let err = decode_payload(&descriptors[0]).unwrap_err();
        assert!(matches!(err, CoreError::Codec(_)));
    }

    #[test]
    fn load_from_store_skips_foreign_objects() {
        let descriptors = build(&content(), 1024);
        let mut store = InMemoryStore::new();
        for descriptor in &descriptors {
            store.create(&descriptor.to_stored()).unwrap();
        }
        store
            .create(&catsplit_storage::StoredObject::new("cat-partition-notes", vec![]))
            .unwrap();
        store
            .create(&catsplit_storage::StoredObject::new("dog-partition-1", vec![]))
            .unwrap();

        let loaded = load_descriptors(&store, "cat").unwrap();
        assert_eq!(loaded, descriptors);
    }

    #[test]
    fn unpack_writes_plain_files() {
        let descriptors = build(&content(), 1024);
        let dir = tempdir().unwrap();
        let paths = unpack_to_dir(&descriptors, dir.path()).unwrap();

        assert_eq!(paths.len(), descriptors.len());
        assert_eq!(paths[0], dir.path().join("cat-partition-1").join("extraFBC.yaml"));

        let joined = paths
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect::<Vec<_>>()
            .join("\n---\n");
        assert_eq!(joined, content());
    }
}
