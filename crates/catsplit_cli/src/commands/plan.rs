//! Plan command implementation.

use super::load_set;
use catsplit_core::MountPlan;
use std::path::Path;

/// Runs the plan command.
pub fn run(
    dir: &Path,
    name: &str,
    mount_root: &Path,
    output_root: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let descriptors = load_set(dir, name)?;
    let plan = MountPlan::for_descriptors(&descriptors, mount_root, output_root);

    println!("Mounts:");
    for entry in &plan.entries {
        println!("  {} ({})", entry.object, entry.volume_name);
        println!("    mount:   {}", entry.mount_path.display());
        println!("    payload: {}", entry.payload_path.display());
        println!("    output:  {}", entry.output_path.display());
    }
    println!();
    println!("Extraction:");
    println!("{}", plan.extraction_script());

    Ok(())
}
