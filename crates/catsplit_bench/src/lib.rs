//! Benchmark support for catsplit.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
