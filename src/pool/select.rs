//! Exclusion-aware random proxy selection
//!
//! Random rather than round-robin: concurrent requests racing against
//! the same snapshot would otherwise converge on a recently-failed
//! proxy, and randomness spreads load without coordination.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::models::{PoolSnapshot, Proxy};

/// Pick a proxy uniformly at random among indices not in `excluded`.
///
/// Returns `None` when the snapshot is empty or every index is
/// excluded. Pure function of its inputs; no state across calls.
pub fn select_random<'a>(
    snapshot: &'a PoolSnapshot,
    excluded: &HashSet<usize>,
) -> Option<(&'a Proxy, usize)> {
    let available: Vec<usize> = (0..snapshot.proxies.len())
        .filter(|i| !excluded.contains(i))
        .collect();

    let index = *available.choose(&mut rand::thread_rng())?;
    Some((&snapshot.proxies[index], index))
}
