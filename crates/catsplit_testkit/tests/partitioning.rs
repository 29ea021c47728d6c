//! End-to-end partitioning properties.

use catsplit_core::{
    normalize, reconstruct, segment, CoreError, DescriptorBuilder, EncodingKind, OwnerRef,
    PartitionConfig, Partitioner, DEFAULT_JOINER, DEFAULT_MAX_OBJECT_SIZE, DEFAULT_PAYLOAD_KEY,
    DEFAULT_SEPARATOR,
};
use catsplit_testkit::prelude::*;
use proptest::prelude::*;

fn builder(base: &str) -> DescriptorBuilder {
    DescriptorBuilder::new(base)
        .with_namespace("test-default")
        .with_owner(OwnerRef::new(
            "operators.coreos.com/v1alpha1",
            "CatalogSource",
            base,
        ))
}

fn normalized(content: &str) -> String {
    normalize(content, DEFAULT_SEPARATOR, DEFAULT_JOINER)
}

#[test]
fn sample_catalog_is_one_partition() {
    let partitioner = Partitioner::new(PartitionConfig::default()).unwrap();
    let output = partitioner.build(SAMPLE_CATALOG, &builder("test-catalogsource")).unwrap();

    assert_eq!(output.descriptors.len(), 1);
    assert_eq!(output.stats.segments, SAMPLE_DOCUMENTS);
    let descriptor = &output.descriptors[0];
    assert_eq!(descriptor.name, "test-catalogsource-partition-1");
    assert_eq!(descriptor.payload_key, DEFAULT_PAYLOAD_KEY);
    assert_eq!(descriptor.encoding(), EncodingKind::Gzip);
    assert_eq!(
        reconstruct(&output.descriptors, DEFAULT_JOINER).unwrap(),
        normalized(SAMPLE_CATALOG)
    );
}

#[test]
fn repetitive_catalog_over_limit_still_fits_one_partition() {
    let catalog = repeated_catalog(DEFAULT_MAX_OBJECT_SIZE);
    assert!(catalog.len() >= DEFAULT_MAX_OBJECT_SIZE);

    let partitioner = Partitioner::new(PartitionConfig::default()).unwrap();
    let output = partitioner.build(&catalog, &builder("large")).unwrap();

    assert_eq!(output.descriptors.len(), 1);
    assert!(output.descriptors[0].payload.len() < DEFAULT_MAX_OBJECT_SIZE);
    assert_eq!(
        reconstruct(&output.descriptors, DEFAULT_JOINER).unwrap(),
        normalized(&catalog)
    );
}

#[test]
fn random_catalog_twice_the_limit_needs_several_partitions() {
    let catalog = random_catalog(2024, DEFAULT_MAX_OBJECT_SIZE * 2);

    let partitioner = Partitioner::new(PartitionConfig::default()).unwrap();
    let output = partitioner.build(&catalog, &builder("huge")).unwrap();

    assert!(output.descriptors.len() >= 2);
    for (i, descriptor) in output.descriptors.iter().enumerate() {
        assert_eq!(descriptor.ordinal as usize, i + 1);
        assert_eq!(descriptor.name, format!("huge-partition-{}", i + 1));
        assert!(descriptor.total_size() <= DEFAULT_MAX_OBJECT_SIZE);
    }
    assert_eq!(
        reconstruct(&output.descriptors, DEFAULT_JOINER).unwrap(),
        normalized(&catalog)
    );
}

#[test]
fn oversize_document_fails_the_build() {
    let document = random_catalog(9, 64 * 1024).replace("---\n", "");
    let content = format!("a: 1\n---\n{document}\n---\nb: 2");

    let config = PartitionConfig::new().max_object_size(16 * 1024);
    let err = Partitioner::new(config)
        .unwrap()
        .build(&content, &builder("over"))
        .unwrap_err();

    assert!(matches!(err, CoreError::OversizeSegment { index: 1, .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_reproduces_normalized_content(
        catalog in catalog_strategy(),
        config in config_strategy(),
    ) {
        let output = Partitioner::new(config).unwrap().build(&catalog, &builder("prop")).unwrap();
        prop_assert_eq!(
            reconstruct(&output.descriptors, DEFAULT_JOINER).unwrap(),
            normalized(&catalog)
        );
    }

    #[test]
    fn every_descriptor_fits(
        catalog in catalog_strategy(),
        config in config_strategy(),
    ) {
        let limit = config.max_object_size;
        let output = Partitioner::new(config).unwrap().build(&catalog, &builder("prop")).unwrap();
        for descriptor in &output.descriptors {
            prop_assert!(descriptor.total_size() <= limit);
        }
    }

    #[test]
    fn builds_are_deterministic(
        catalog in catalog_strategy(),
        config in config_strategy(),
        base in base_name_strategy(),
    ) {
        let partitioner = Partitioner::new(config).unwrap();
        let builder = DescriptorBuilder::new(base);
        let first = partitioner.build(&catalog, &builder).unwrap();
        let second = partitioner.build(&catalog, &builder).unwrap();
        prop_assert_eq!(first.descriptors, second.descriptors);
        prop_assert_eq!(first.digest, second.digest);
    }

    #[test]
    fn documents_keep_their_order(
        catalog in catalog_strategy(),
        config in config_strategy(),
    ) {
        let output = Partitioner::new(config).unwrap().build(&catalog, &builder("prop")).unwrap();
        let expected: Vec<&str> = segment(&catalog, DEFAULT_SEPARATOR)
            .iter()
            .map(|s| s.text)
            .collect();

        let mut actual = Vec::new();
        for descriptor in &output.descriptors {
            let text = catsplit_core::decode_payload(descriptor).unwrap();
            actual.extend(
                segment(&text, DEFAULT_SEPARATOR)
                    .iter()
                    .map(|s| s.text.to_string()),
            );
        }
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn ordinals_are_contiguous(
        catalog in catalog_strategy(),
        config in config_strategy(),
    ) {
        let output = Partitioner::new(config).unwrap().build(&catalog, &builder("prop")).unwrap();
        prop_assert!(!output.descriptors.is_empty());
        prop_assert!(catsplit_core::validate_sequence(&output.descriptors).is_ok());
    }
}
