//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the simulator MUST go through this module.
//!
//! Per-patient and per-cohort streams are seeded through a [`SeedDerivation`],
//! so a trajectory depends only on (cohort id, patient index), never on the
//! order in which patients are simulated.

mod seed;
mod xorshift;

pub use seed::{HashedSeeds, SeedDerivation, SequentialSeeds};
pub use xorshift::RngManager;
