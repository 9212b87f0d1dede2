//! Shared random source for selection decisions
//!
//! Validator, oracle and fee-payer picks are load spreading only. The generator
//! is injected so tests can pin it with a seed.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Lock briefly; never hold the guard across an await point.
pub type SharedRng = Arc<Mutex<StdRng>>;

pub fn rng_from_entropy() -> SharedRng {
    Arc::new(Mutex::new(StdRng::from_entropy()))
}

pub fn seeded_rng(seed: u64) -> SharedRng {
    Arc::new(Mutex::new(StdRng::seed_from_u64(seed)))
}
