//! Storage object descriptors and the builder that produces them.

use crate::encoding::{EncodingKind, PartitionEncoding, DEFAULT_PAYLOAD_KEY};
use crate::error::{CoreError, CoreResult};
use crate::sequencer::SealedPartition;
use bytes::Bytes;
use catsplit_storage::StoredObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Label holding the SHA-256 of the content a descriptor set was built from.
pub const CONTENT_DIGEST_LABEL: &str = "catsplit.io/content-digest";

/// Label holding the number of partitions in the set.
pub const PARTITION_COUNT_LABEL: &str = "catsplit.io/partition-count";

/// Infix between the base name and the ordinal.
pub const PARTITION_INFIX: &str = "-partition-";

const META_NAMESPACE: &str = "catsplit.io/namespace";
const META_ORDINAL: &str = "catsplit.io/ordinal";
const META_PAYLOAD_KEY: &str = "catsplit.io/payload-key";
const META_ANNOTATION_PREFIX: &str = "annotation:";
const META_LABEL_PREFIX: &str = "label:";
const META_OWNER_API_VERSION: &str = "owner:apiVersion";
const META_OWNER_KIND: &str = "owner:kind";
const META_OWNER_NAME: &str = "owner:name";
const META_OWNER_UID: &str = "owner:uid";

/// Reference to the object that owns a descriptor.
///
/// Attached so an external collector can remove the descriptors together
/// with their owner. catsplit never acts on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    /// API version of the owner.
    pub api_version: String,
    /// Kind of the owner.
    pub kind: String,
    /// Name of the owner.
    pub name: String,
    /// Unique id of the owner.
    pub uid: Uuid,
}

impl OwnerRef {
    /// Creates an owner reference with a random uid.
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
            uid: Uuid::new_v4(),
        }
    }

    /// Sets the uid.
    #[must_use]
    pub fn with_uid(mut self, uid: Uuid) -> Self {
        self.uid = uid;
        self
    }

    fn size(&self) -> usize {
        self.api_version.len() + self.kind.len() + self.name.len() + 36
    }
}

/// One sealed partition, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObjectDescriptor {
    /// Object name, `<base>-partition-<ordinal>`.
    pub name: String,
    /// Namespace the object lives in.
    pub namespace: String,
    /// 1-based position in the partition set.
    pub ordinal: u32,
    /// Key the payload is stored under.
    pub payload_key: String,
    /// Sealed payload bytes.
    pub payload: Bytes,
    /// Annotations, including the content encoding.
    pub annotations: BTreeMap<String, String>,
    /// Labels identifying the content version.
    pub labels: BTreeMap<String, String>,
    /// Owner for external garbage collection.
    pub owner_ref: Option<OwnerRef>,
}

impl StorageObjectDescriptor {
    /// Creates an empty descriptor annotated for `encoding`.
    pub fn shell(name: &str, namespace: &str, payload_key: &str, encoding: EncodingKind) -> Self {
        let mut annotations = BTreeMap::new();
        if let Some(value) = encoding.annotation() {
            annotations.insert(
                crate::encoding::CONTENT_ENCODING_ANNOTATION.to_string(),
                value.to_string(),
            );
        }

        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ordinal: 0,
            payload_key: payload_key.to_string(),
            payload: Bytes::new(),
            annotations,
            labels: BTreeMap::new(),
            owner_ref: None,
        }
    }

    /// Returns the payload encoding, read from the annotations.
    #[must_use]
    pub fn encoding(&self) -> EncodingKind {
        EncodingKind::from_annotations(&self.annotations)
    }

    /// Returns the file name the payload is mounted as.
    #[must_use]
    pub fn payload_file_name(&self) -> String {
        self.encoding().file_name(&self.payload_key)
    }

    /// Returns the content digest label, if present.
    #[must_use]
    pub fn content_digest(&self) -> Option<&str> {
        self.labels.get(CONTENT_DIGEST_LABEL).map(String::as_str)
    }

    /// Returns the name without its ordinal, e.g. `catalog-partition-`.
    #[must_use]
    pub fn partition_prefix(&self) -> Option<&str> {
        self.name
            .strip_suffix(&self.ordinal.to_string())
            .filter(|prefix| prefix.ends_with(PARTITION_INFIX))
    }

    /// Estimated size of everything except the payload.
    #[must_use]
    pub fn overhead(&self) -> usize {
        let pairs = |map: &BTreeMap<String, String>| -> usize {
            map.iter().map(|(k, v)| k.len() + v.len()).sum()
        };
        self.name.len()
            + self.namespace.len()
            + self.payload_key.len()
            + pairs(&self.annotations)
            + pairs(&self.labels)
            + self.owner_ref.as_ref().map_or(0, OwnerRef::size)
    }

    /// Total size counted against the storage object limit.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.overhead() + self.payload.len()
    }

    /// Converts the descriptor into an opaque stored object.
    #[must_use]
    pub fn to_stored(&self) -> StoredObject {
        let mut object = StoredObject::new(self.name.clone(), self.payload.to_vec())
            .with_metadata(META_NAMESPACE, self.namespace.clone())
            .with_metadata(META_ORDINAL, self.ordinal.to_string())
            .with_metadata(META_PAYLOAD_KEY, self.payload_key.clone());

        for (key, value) in &self.annotations {
            object
                .metadata
                .insert(format!("{META_ANNOTATION_PREFIX}{key}"), value.clone());
        }
        for (key, value) in &self.labels {
            object
                .metadata
                .insert(format!("{META_LABEL_PREFIX}{key}"), value.clone());
        }
        if let Some(owner) = &self.owner_ref {
            object = object
                .with_metadata(META_OWNER_API_VERSION, owner.api_version.clone())
                .with_metadata(META_OWNER_KIND, owner.kind.clone())
                .with_metadata(META_OWNER_NAME, owner.name.clone())
                .with_metadata(META_OWNER_UID, owner.uid.to_string());
        }
        object
    }

    /// Rebuilds a descriptor from a stored object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDescriptorSet`] if required metadata is
    /// missing or malformed.
    pub fn from_stored(object: StoredObject) -> CoreResult<Self> {
        let meta = &object.metadata;
        let required = |key: &str| -> CoreResult<String> {
            meta.get(key).cloned().ok_or_else(|| {
                CoreError::invalid_descriptor_set(format!("{}: missing {}", object.name, key))
            })
        };

        let ordinal = required(META_ORDINAL)?.parse::<u32>().map_err(|e| {
            CoreError::invalid_descriptor_set(format!("{}: bad ordinal: {}", object.name, e))
        })?;
        let namespace = required(META_NAMESPACE)?;
        let payload_key = required(META_PAYLOAD_KEY)?;

        let strip = |prefix: &str| -> BTreeMap<String, String> {
            meta.iter()
                .filter_map(|(k, v)| k.strip_prefix(prefix).map(|k| (k.to_string(), v.clone())))
                .collect()
        };
        let annotations = strip(META_ANNOTATION_PREFIX);
        let labels = strip(META_LABEL_PREFIX);

        let owner_ref = match (
            meta.get(META_OWNER_API_VERSION),
            meta.get(META_OWNER_KIND),
            meta.get(META_OWNER_NAME),
            meta.get(META_OWNER_UID),
        ) {
            (Some(api_version), Some(kind), Some(name), Some(uid)) => Some(OwnerRef {
                api_version: api_version.clone(),
                kind: kind.clone(),
                name: name.clone(),
                uid: Uuid::parse_str(uid).map_err(|e| {
                    CoreError::invalid_descriptor_set(format!(
                        "{}: bad owner uid: {}",
                        object.name, e
                    ))
                })?,
            }),
            _ => None,
        };

        Ok(Self {
            name: object.name,
            namespace,
            ordinal,
            payload_key,
            payload: Bytes::from(object.data),
            annotations,
            labels,
            owner_ref,
        })
    }
}

/// Parses the ordinal of `name` when it is `prefix` followed only by digits.
#[must_use]
pub fn parse_ordinal(name: &str, prefix: &str) -> Option<u32> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Checks that `descriptors` form one complete partition set.
///
/// The slice must be ordered by ordinal, numbered `1..=N` without gaps,
/// share one name prefix, and agree on the content digest when one is set.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDescriptorSet`] describing the first problem.
pub fn validate_sequence(descriptors: &[StorageObjectDescriptor]) -> CoreResult<()> {
    let Some(first) = descriptors.first() else {
        return Err(CoreError::invalid_descriptor_set("no descriptors"));
    };
    let prefix = first.partition_prefix().ok_or_else(|| {
        CoreError::invalid_descriptor_set(format!(
            "{} is not named <base>{}<ordinal>",
            first.name, PARTITION_INFIX
        ))
    })?;

    for (i, descriptor) in descriptors.iter().enumerate() {
        let expected = u32::try_from(i + 1)
            .map_err(|_| CoreError::invalid_descriptor_set("too many descriptors"))?;
        if descriptor.ordinal != expected {
            return Err(CoreError::invalid_descriptor_set(format!(
                "expected ordinal {}, found {} ({})",
                expected, descriptor.ordinal, descriptor.name
            )));
        }
        if descriptor.partition_prefix() != Some(prefix) {
            return Err(CoreError::invalid_descriptor_set(format!(
                "{} does not belong to {}*",
                descriptor.name, prefix
            )));
        }
        if descriptor.content_digest() != first.content_digest() {
            return Err(CoreError::invalid_descriptor_set(format!(
                "{} was built from different content than {}",
                descriptor.name, first.name
            )));
        }
    }
    Ok(())
}

/// Wraps sealed partitions into named, annotated descriptors.
///
/// The builder attaches an owner reference but never manages the owner.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    base_name: String,
    namespace: String,
    payload_key: String,
    owner: Option<OwnerRef>,
}

impl DescriptorBuilder {
    /// Creates a builder for descriptors named `<base_name>-partition-<i>`.
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            namespace: "default".to_string(),
            payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
            owner: None,
        }
    }

    /// Sets the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the owner reference attached to every descriptor.
    #[must_use]
    pub fn with_owner(mut self, owner: OwnerRef) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the payload key.
    #[must_use]
    pub fn with_payload_key(mut self, payload_key: impl Into<String>) -> Self {
        self.payload_key = payload_key.into();
        self
    }

    /// Returns the base name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the name of the partition with the given ordinal.
    #[must_use]
    pub fn name_for(&self, ordinal: u32) -> String {
        format!("{}{}{}", self.base_name, PARTITION_INFIX, ordinal)
    }

    /// Returns the shared name prefix of every partition.
    #[must_use]
    pub fn partition_prefix(&self) -> String {
        format!("{}{}", self.base_name, PARTITION_INFIX)
    }

    /// Parses the ordinal out of a partition name, if it is one of ours.
    #[must_use]
    pub fn ordinal_of(&self, name: &str) -> Option<u32> {
        parse_ordinal(name, &self.partition_prefix())
    }

    /// Upper bound on the non-payload size of any descriptor this builder
    /// produces with `encoding`.
    #[must_use]
    pub fn overhead(&self, encoding: EncodingKind) -> usize {
        let mut worst = StorageObjectDescriptor::shell(
            &self.name_for(u32::MAX),
            &self.namespace,
            &self.payload_key,
            encoding,
        );
        self.decorate(&mut worst, u32::MAX, &"0".repeat(64));
        worst.overhead()
    }

    fn decorate(&self, descriptor: &mut StorageObjectDescriptor, count: u32, digest: &str) {
        descriptor
            .labels
            .insert(CONTENT_DIGEST_LABEL.to_string(), digest.to_string());
        descriptor
            .labels
            .insert(PARTITION_COUNT_LABEL.to_string(), count.to_string());
        descriptor.owner_ref = self.owner.clone();
    }

    /// Wraps each sealed partition into a descriptor.
    ///
    /// `digest` identifies the content version and is attached as a label.
    #[must_use]
    pub fn build(
        &self,
        encoding: &dyn PartitionEncoding,
        partitions: Vec<SealedPartition>,
        digest: &str,
    ) -> Vec<StorageObjectDescriptor> {
        let count = u32::try_from(partitions.len()).unwrap_or(u32::MAX);
        partitions
            .into_iter()
            .map(|partition| {
                let mut descriptor = encoding.new_container(
                    &self.name_for(partition.ordinal),
                    &self.namespace,
                    &self.payload_key,
                );
                self.decorate(&mut descriptor, count, digest);
                descriptor.ordinal = partition.ordinal;
                descriptor.payload = Bytes::from(partition.payload);
                descriptor
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{GzipEncoding, CONTENT_ENCODING_ANNOTATION, GZIP_ENCODING};

    fn partition(ordinal: u32, payload: &[u8]) -> SealedPartition {
        SealedPartition {
            ordinal,
            segments: 0..1,
            raw_len: payload.len(),
            payload: payload.to_vec(),
        }
    }

    fn builder() -> DescriptorBuilder {
        DescriptorBuilder::new("test-catalogsource")
            .with_namespace("test-default")
            .with_owner(OwnerRef::new("operators.coreos.com/v1alpha1", "CatalogSource", "test-catalogsource"))
    }

    #[test]
    fn ordinal_parsing_rejects_lookalikes() {
        assert_eq!(parse_ordinal("cat-partition-7", "cat-partition-"), Some(7));
        assert_eq!(parse_ordinal("cat-partition-1-partition-2", "cat-partition-"), None);
        assert_eq!(parse_ordinal("cat-partition-+3", "cat-partition-"), None);
        assert_eq!(parse_ordinal("cat-partition-99999999999", "cat-partition-"), None);
    }

    #[test]
    fn names_are_one_indexed() {
        let builder = builder();
        assert_eq!(builder.name_for(1), "test-catalogsource-partition-1");
        assert_eq!(builder.ordinal_of("test-catalogsource-partition-12"), Some(12));
        assert_eq!(builder.ordinal_of("test-catalogsource-partition-"), None);
        assert_eq!(builder.ordinal_of("test-catalogsource-partition-1a"), None);
        assert_eq!(builder.ordinal_of("other-partition-1"), None);
    }

    #[test]
    fn build_wraps_partitions() {
        let builder = builder();
        let encoding = GzipEncoding::new(6, 1024);
        let descriptors = builder.build(
            &encoding,
            vec![partition(1, b"one"), partition(2, b"two")],
            "abc",
        );

        assert_eq!(descriptors.len(), 2);
        let second = &descriptors[1];
        assert_eq!(second.name, "test-catalogsource-partition-2");
        assert_eq!(second.namespace, "test-default");
        assert_eq!(second.ordinal, 2);
        assert_eq!(second.payload.as_ref(), b"two");
        assert_eq!(second.content_digest(), Some("abc"));
        assert_eq!(
            second.labels.get(PARTITION_COUNT_LABEL).map(String::as_str),
            Some("2")
        );
        assert_eq!(
            second.annotations.get(CONTENT_ENCODING_ANNOTATION).map(String::as_str),
            Some(GZIP_ENCODING)
        );
        assert_eq!(
            second.owner_ref.as_ref().map(|o| o.kind.as_str()),
            Some("CatalogSource")
        );
        assert_eq!(second.payload_file_name(), "extraFBC.yaml.gz");
    }

    #[test]
    fn overhead_bounds_real_descriptors() {
        let builder = builder();
        let encoding = GzipEncoding::new(6, 1024);
        let digest = "f".repeat(64);
        let descriptors = builder.build(&encoding, vec![partition(7, b"x")], &digest);
        assert!(descriptors[0].overhead() <= builder.overhead(EncodingKind::Gzip));
        assert_eq!(descriptors[0].total_size(), descriptors[0].overhead() + 1);
    }

    #[test]
    fn stored_roundtrip_preserves_everything() {
        let builder = builder();
        let encoding = GzipEncoding::new(6, 1024);
        let descriptor = builder
            .build(&encoding, vec![partition(1, b"payload")], "digest")
            .remove(0);

        let restored = StorageObjectDescriptor::from_stored(descriptor.to_stored()).unwrap();
        assert_eq!(restored, descriptor);
    }

    #[test]
    fn from_stored_requires_ordinal() {
        let object = StoredObject::new("x-partition-1", vec![]);
        let result = StorageObjectDescriptor::from_stored(object);
        assert!(matches!(result, Err(CoreError::InvalidDescriptorSet { .. })));
    }

    #[test]
    fn validate_sequence_checks_contiguity() {
        let builder = builder();
        let encoding = GzipEncoding::new(6, 1024);
        let descriptors = builder.build(
            &encoding,
            vec![partition(1, b"a"), partition(2, b"b"), partition(3, b"c")],
            "d",
        );
        assert!(validate_sequence(&descriptors).is_ok());

        let gapped = vec![descriptors[0].clone(), descriptors[2].clone()];
        assert!(validate_sequence(&gapped).is_err());
        assert!(validate_sequence(&[]).is_err());
    }

    #[test]
    fn validate_sequence_rejects_mixed_versions() {
        let builder = builder();
        let encoding = GzipEncoding::new(6, 1024);
        let mut descriptors = builder.build(
            &encoding,
            vec![partition(1, b"a"), partition(2, b"b")],
            "v1",
        );
        descriptors[1]
            .labels
            .insert(CONTENT_DIGEST_LABEL.to_string(), "v2".to_string());
        assert!(validate_sequence(&descriptors).is_err());
    }
}
