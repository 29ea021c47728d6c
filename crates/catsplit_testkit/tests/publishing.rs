//! Publishing and reading back partition sets through real stores.

use catsplit_core::{
    load_descriptors, reconstruct, unpack_to_dir, CoreError, DescriptorBuilder, MountPlan,
    PartitionConfig, Partitioner, Publisher, RetryConfig, StorageObjectDescriptor, DEFAULT_JOINER,
};
use catsplit_storage::{InMemoryStore, ObjectStore};
use catsplit_testkit::prelude::*;
use std::path::Path;
use std::time::Duration;

fn build(catalog: &str, max: usize) -> Vec<StorageObjectDescriptor> {
    Partitioner::new(PartitionConfig::new().max_object_size(max))
        .unwrap()
        .build(catalog, &DescriptorBuilder::new("catalog").with_namespace("olm"))
        .unwrap()
        .descriptors
}

fn quick_retries(attempts: u32) -> Publisher {
    Publisher::new(
        RetryConfig::new(attempts)
            .with_initial_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(5))
            .with_jitter(false),
    )
}

#[test]
fn directory_store_roundtrip() {
    let catalog = random_catalog(1, 256 * 1024);
    let descriptors = build(&catalog, 64 * 1024);
    assert!(descriptors.len() > 1);

    let mut temp = TempStore::new();
    let report = quick_retries(1).publish(&mut temp.store, &descriptors).unwrap();
    assert_eq!(report.created.len(), descriptors.len());

    let loaded = load_descriptors(&temp.store, "catalog").unwrap();
    assert_eq!(loaded, descriptors);
    assert_eq!(
        reconstruct(&loaded, DEFAULT_JOINER).unwrap(),
        catsplit_core::normalize(&catalog, "---", DEFAULT_JOINER)
    );
}

#[test]
fn republishing_new_content_updates_and_prunes() {
    let mut temp = TempStore::new();
    let big = build(&random_catalog(2, 256 * 1024), 32 * 1024);
    let small = build(&random_catalog(3, 48 * 1024), 32 * 1024);
    assert!(big.len() > small.len());

    quick_retries(1).publish(&mut temp.store, &big).unwrap();
    let report = quick_retries(1).publish(&mut temp.store, &small).unwrap();

    assert_eq!(report.updated.len(), small.len());
    assert_eq!(report.pruned.len(), big.len() - small.len());
    assert_eq!(temp.store.list("catalog-partition-").unwrap().len(), small.len());

    let loaded = load_descriptors(&temp.store, "catalog").unwrap();
    assert_eq!(loaded, small);
}

#[test]
fn retryable_faults_are_absorbed() {
    let descriptors = build(&random_catalog(4, 128 * 1024), 32 * 1024);
    let mut store = FlakyStore::new(InMemoryStore::new(), Fault::TimedOut, 3);

    let report = quick_retries(4).publish(&mut store, &descriptors).unwrap();
    assert_eq!(report.retries, 3);
    assert_eq!(store.injected(), 3);
    assert_eq!(store.inner().len(), descriptors.len());
}

#[test]
fn permanent_fault_stops_at_first_descriptor() {
    let descriptors = build(&random_catalog(5, 128 * 1024), 32 * 1024);
    let mut store = FlakyStore::new(InMemoryStore::new(), Fault::PermissionDenied, 1);

    let err = quick_retries(4).publish(&mut store, &descriptors).unwrap_err();
    match err {
        CoreError::Persistence { name, attempts, .. } => {
            assert_eq!(name, "catalog-partition-1");
            assert_eq!(attempts, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.inner().is_empty());
}

#[test]
fn failed_publish_can_be_resumed() {
    let descriptors = build(&random_catalog(6, 128 * 1024), 32 * 1024);
    assert!(descriptors.len() > 2);
    let mut store = FlakyStore::new(InMemoryStore::new(), Fault::Unavailable, 0);

    quick_retries(1).publish(&mut store, &descriptors[..1]).unwrap();
    store.fail_next(1);
    let err = quick_retries(1).publish(&mut store, &descriptors).unwrap_err();
    assert!(err.failed_descriptor().is_some());

    let report = quick_retries(1).publish(&mut store, &descriptors).unwrap();
    assert_eq!(store.inner().len(), descriptors.len());
    assert_eq!(report.writes() + report.unchanged.len(), descriptors.len());
}

#[test]
fn unpack_and_plan_agree_on_layout() {
    let descriptors = build(&random_catalog(7, 128 * 1024), 32 * 1024);
    let out = tempfile::tempdir().unwrap();

    let written = unpack_to_dir(&descriptors, out.path()).unwrap();
    let plan = MountPlan::for_descriptors(&descriptors, Path::new("/mnt"), out.path());

    assert_eq!(written.len(), plan.entries.len());
    for (path, entry) in written.iter().zip(&plan.entries) {
        assert_eq!(path, &entry.output_path);
        assert!(entry.payload_path.starts_with("/mnt"));
        assert!(entry.payload_path.to_string_lossy().ends_with(".yaml.gz"));
    }
    assert_eq!(
        plan.extraction_script().matches(" && gzip -d -c ").count(),
        descriptors.len()
    );
}
