//! Property-based test generators using proptest.
//!
//! Provides strategies for generating catalogs and configurations that
//! exercise partition boundaries at small sizes.

use catsplit_core::{EncodingKind, PartitionConfig};
use proptest::prelude::*;

/// Strategy for a single YAML-ish document (never contains `---`).
pub fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            prop::string::string_regex("[a-z][a-zA-Z]{0,11}").expect("Invalid regex"),
            prop::string::string_regex("[a-zA-Z0-9 ./:_]{0,40}").expect("Invalid regex"),
        ),
        1..8,
    )
    .prop_map(|fields| {
        fields
            .into_iter()
            .map(|(key, value)| format!("{key}: {}", value.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Strategy for separator padding: the whitespace found around `---` lines.
pub fn padding_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ \n\t]{0,3}").expect("Invalid regex")
}

/// Strategy for a catalog: documents joined by `---` with random padding,
/// sometimes with empty documents in between.
pub fn catalog_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (document_strategy(), padding_strategy(), any::<bool>()),
        0..40,
    )
    .prop_map(|docs| {
        let mut catalog = String::new();
        for (doc, padding, empty_before) in docs {
            if empty_before {
                catalog.push_str("---\n");
            }
            catalog.push_str("---");
            catalog.push_str(&padding);
            catalog.push('\n');
            catalog.push_str(&doc);
            catalog.push_str(&padding);
            catalog.push('\n');
        }
        catalog
    })
}

/// Strategy for valid partition set base names.
pub fn base_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,20}[a-z0-9]").expect("Invalid regex")
}

/// Strategy for small configurations that force many partitions while
/// still fitting any single generated document.
pub fn config_strategy() -> impl Strategy<Value = PartitionConfig> {
    (
        prop_oneof![Just(EncodingKind::Gzip), Just(EncodingKind::Plain)],
        768usize..4096,
        1u32..=9,
    )
        .prop_map(|(encoding, max_object_size, level)| {
            PartitionConfig::new()
                .encoding(encoding)
                .max_object_size(max_object_size)
                .level(level)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::test_runner::TestRunner;

    #[test]
    fn documents_have_no_separator() {
        let mut runner = TestRunner::default();
        runner
            .run(&document_strategy(), |doc| {
                prop_assert!(!doc.contains("---"));
                prop_assert!(!doc.trim().is_empty());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn configs_are_valid() {
        let mut runner = TestRunner::default();
        runner
            .run(&config_strategy(), |config| {
                prop_assert!(config.validate().is_ok());
                Ok(())
            })
            .unwrap();
    }
}
