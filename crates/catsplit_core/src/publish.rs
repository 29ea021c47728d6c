//! Persisting partition sets to an object store.

use crate::config::RetryConfig;
use crate::descriptor::{parse_ordinal, validate_sequence, StorageObjectDescriptor};
use crate::error::{CoreError, CoreResult};
use catsplit_storage::{ObjectStore, StorageError, StorageResult, StoredObject};
use serde::Serialize;
use std::thread;
use tracing::{info, warn};

/// What a publish run did to each object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Objects that did not exist before.
    pub created: Vec<String>,
    /// Objects whose content was replaced.
    pub updated: Vec<String>,
    /// Objects that already held identical content.
    pub unchanged: Vec<String>,
    /// Stale partitions removed after the set shrank.
    pub pruned: Vec<String>,
    /// Retries spent across the whole run.
    pub retries: u32,
}

impl PublishReport {
    /// Returns the number of objects written.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upsert {
    Created,
    Updated,
    Unchanged,
}

/// Writes descriptor sets to a store.
///
/// Each descriptor is upserted on its own, so a failure leaves earlier
/// descriptors in place and the caller may publish the same set again.
#[derive(Debug, Clone, Default)]
pub struct Publisher {
    retry: RetryConfig,
}

impl Publisher {
    /// Creates a publisher.
    #[must_use]
    pub fn new(retry: RetryConfig) -> Self {
        Self { retry }
    }

    /// Returns the retry configuration.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Upserts every descriptor, then removes partitions of the same set
    /// with an ordinal beyond the new partition count.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidDescriptorSet`] if `descriptors` is not a
    ///   complete set
    /// - [`CoreError::Persistence`] naming the first descriptor that could
    ///   not be written or pruned
    pub fn publish(
        &self,
        store: &mut dyn ObjectStore,
        descriptors: &[StorageObjectDescriptor],
    ) -> CoreResult<PublishReport> {
        validate_sequence(descriptors)?;
        let mut report = PublishReport::default();

        for descriptor in descriptors {
            let object = descriptor.to_stored();
            let outcome = self.with_retry(&descriptor.name, &mut report.retries, || {
                upsert(&mut *store, &object)
            })?;
            let bucket = match outcome {
                Upsert::Created => &mut report.created,
                Upsert::Updated => &mut report.updated,
                Upsert::Unchanged => &mut report.unchanged,
            };
            bucket.push(descriptor.name.clone());
        }

        // validate_sequence guarantees a first descriptor with a prefix.
        if let Some(prefix) = descriptors.first().and_then(|d| d.partition_prefix()) {
            let count = descriptors.len();
            let stale: Vec<String> = store
                .list(prefix)?
                .into_iter()
                .filter(|name| is_stale(name, prefix, count))
                .collect();

            for name in stale {
                self.with_retry(&name, &mut report.retries, || {
                    match store.delete(&name) {
                        Err(StorageError::NotFound { .. }) => Ok(()),
                        other => other,
                    }
                })?;
                report.pruned.push(name);
            }
        }

        info!(
            created = report.created.len(),
            updated = report.updated.len(),
            unchanged = report.unchanged.len(),
            pruned = report.pruned.len(),
            retries = report.retries,
            "published partition set"
        );
        Ok(report)
    }

    fn with_retry<T>(
        &self,
        name: &str,
        retries: &mut u32,
        mut op: impl FnMut() -> StorageResult<T>,
    ) -> CoreResult<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        name,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying storage operation"
                    );
                    *retries += 1;
                    thread::sleep(delay);
                }
                Err(source) => {
                    return Err(CoreError::Persistence {
                        name: name.to_string(),
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}

fn upsert(store: &mut dyn ObjectStore, object: &StoredObject) -> StorageResult<Upsert> {
    match store.get(&object.name)? {
        None => {
            store.create(object)?;
            Ok(Upsert::Created)
        }
        Some(existing) if existing.metadata == object.metadata && existing.data == object.data => {
            Ok(Upsert::Unchanged)
        }
        Some(_) => {
            store.update(object)?;
            Ok(Upsert::Updated)
        }
    }
}

fn is_stale(name: &str, prefix: &str, count: usize) -> bool {
    parse_ordinal(name, prefix)
        .and_then(|ordinal| usize::try_from(ordinal).ok())
        .is_some_and(|ordinal| ordinal > count)
}
