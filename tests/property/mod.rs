//! Property-based tests for determinism and round-trip guarantees

mod addresses;
mod determinism;
mod round_trip;
