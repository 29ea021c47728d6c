//! Mount layout for a consumer that restores partitions before serving them.
//!
//! Each partition is mounted read-only under a compressed root and expanded
//! into an output root by one extraction pass per partition.

use crate::descriptor::StorageObjectDescriptor;
use crate::encoding::{EncodingKind, GZIP_SUFFIX};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Default directory partitions are mounted under.
pub const DEFAULT_MOUNT_ROOT: &str = "/compressed/configs";

/// Default directory partitions are expanded into.
pub const DEFAULT_OUTPUT_ROOT: &str = "/configs";

/// Maximum length of a DNS-1123 label.
pub const MAX_LABEL_LEN: usize = 63;

const VOLUME_SUFFIX: &str = "-volume";
const VOLUME_TAG_LEN: usize = 8;

/// Where one partition is mounted and expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountEntry {
    /// Storage object name.
    pub object: String,
    /// Volume name, a valid DNS-1123 label.
    pub volume_name: String,
    /// Directory the partition is mounted at.
    pub mount_path: PathBuf,
    /// Path of the mounted payload file.
    pub payload_path: PathBuf,
    /// Path the decoded content is written to.
    pub output_path: PathBuf,
    /// Payload encoding.
    pub encoding: EncodingKind,
}

impl MountEntry {
    fn extraction_command(&self) -> String {
        let dir = self
            .output_path
            .parent()
            .map_or_else(String::new, shell_quote);
        let payload = shell_quote(&self.payload_path);
        let output = shell_quote(&self.output_path);
        let copy = match self.encoding {
            EncodingKind::Gzip => format!("gzip -d -c {payload} > {output}"),
            EncodingKind::Plain => format!("cp {payload} {output}"),
        };
        format!("mkdir -p {dir} && {copy}")
    }
}

/// Mount and extraction plan for a whole partition set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountPlan {
    /// One entry per partition, in ordinal order.
    pub entries: Vec<MountEntry>,
}

impl MountPlan {
    /// Plans mounts for `descriptors` below `mount_root`, expanding into
    /// `output_root`.
    #[must_use]
    pub fn for_descriptors(
        descriptors: &[StorageObjectDescriptor],
        mount_root: &Path,
        output_root: &Path,
    ) -> Self {
        let mut sorted: Vec<&StorageObjectDescriptor> = descriptors.iter().collect();
        sorted.sort_by_key(|d| d.ordinal);

        let entries = sorted
            .into_iter()
            .map(|descriptor| {
                let file = descriptor.payload_file_name();
                let mount_path = mount_root.join(&descriptor.name);
                let payload_path = mount_path.join(&file);
                let output_file = file.strip_suffix(GZIP_SUFFIX).unwrap_or(&file);
                let output_path = output_root.join(&descriptor.name).join(output_file);

                MountEntry {
                    object: descriptor.name.clone(),
                    volume_name: volume_name(&descriptor.name),
                    mount_path,
                    payload_path,
                    output_path,
                    encoding: descriptor.encoding(),
                }
            })
            .collect();

        Self { entries }
    }

    /// Returns a shell command that expands every partition, one pass per
    /// partition, chained with `&&` so the first failure stops the rest.
    #[must_use]
    pub fn extraction_script(&self) -> String {
        self.entries
            .iter()
            .map(MountEntry::extraction_command)
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

/// Truncates `name` to a DNS-1123 label length, dropping dashes the cut
/// leaves at either end.
#[must_use]
pub fn trim_dns_label(name: &str) -> String {
    truncate_label(name, MAX_LABEL_LEN)
}

/// Returns the volume label for `object`.
///
/// Short names get a `-volume` suffix. Names too long for a label keep a
/// truncated head plus a digest of the full name, so distinct objects never
/// share a volume.
#[must_use]
pub fn volume_name(object: &str) -> String {
    let label = format!("{object}{VOLUME_SUFFIX}");
    if label.len() <= MAX_LABEL_LEN {
        return label;
    }
    let digest = format!("{:x}", Sha256::digest(object.as_bytes()));
    let tag = &digest[..VOLUME_TAG_LEN];
    let head = truncate_label(object, MAX_LABEL_LEN - VOLUME_SUFFIX.len() - VOLUME_TAG_LEN - 1);
    if head.is_empty() {
        format!("{tag}{VOLUME_SUFFIX}")
    } else {
        format!("{head}-{tag}{VOLUME_SUFFIX}")
    }
}

fn truncate_label(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let cut = name
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max)
        .last()
        .unwrap_or(0);
    name[..cut].trim_matches('-').to_string()
}

fn shell_quote(path: &Path) -> String {
    let text = path.display().to_string();
    let safe = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"/._-+=:,@%".contains(&b));
    if safe {
        text
    } else {
        format!("'{}'", text.replace('\'', "'\\''"))
    }
}
