//! Benchmark utilities.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a catalog of `docs` documents whose values are drawn from
/// `alphabet`. A small alphabet compresses well, a large one poorly.
pub fn catalog(seed: u64, docs: usize, fields: usize, alphabet: &[u8]) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::new();
    for doc in 0..docs {
        out.push_str("---\n");
        out.push_str(&format!("schema: olm.bundle\nname: bench.v{doc}\n"));
        for field in 0..fields {
            let value: String = (0..32)
                .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
                .collect();
            out.push_str(&format!("field{field}: {value}\n"));
        }
    }
    out
}

/// A catalog that compresses well.
pub fn compressible_catalog(size: usize) -> String {
    sized(size, b"abcde")
}

/// A catalog that barely compresses.
pub fn noisy_catalog(size: usize) -> String {
    sized(size, b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+=*&^%$#@!,.;~")
}

fn sized(size: usize, alphabet: &[u8]) -> String {
    // Each document is roughly 40 + 10 * 42 bytes.
    let docs = (size / 460).max(1);
    catalog(7, docs, 10, alphabet)
}
