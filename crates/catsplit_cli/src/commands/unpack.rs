//! Unpack command implementation.

use super::load_set;
use catsplit_core::{reconstruct, unpack_to_dir, DEFAULT_JOINER};
use std::path::Path;

/// Runs the unpack command.
///
/// With an output directory each partition is written to its own file;
/// without one the reconstructed catalog goes to stdout.
pub fn run(dir: &Path, name: &str, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let descriptors = load_set(dir, name)?;

    match out {
        Some(out) => {
            let paths = unpack_to_dir(&descriptors, out)?;
            for path in &paths {
                println!("{}", path.display());
            }
            eprintln!("Unpacked {} partition(s) into {:?}", paths.len(), out);
        }
        None => {
            println!("{}", reconstruct(&descriptors, DEFAULT_JOINER)?);
        }
    }
    Ok(())
}
