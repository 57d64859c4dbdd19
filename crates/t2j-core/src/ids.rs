//! Run-local identifier allocation.
//!
//! Every record written in one run (notebook, note, resource, tag, tag join)
//! draws its id from a single [`IdentifierAllocator`], so ids are unique
//! across all record kinds, not just within one.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::defaults;

/// Issues random lowercase hex identifiers, never the same one twice.
pub struct IdentifierAllocator {
    rng: Box<dyn RngCore>,
    id_bytes: usize,
    issued: HashSet<String>,
}

impl IdentifierAllocator {
    /// Allocator backed by the OS-seeded thread RNG.
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }

    /// Allocator backed by a seeded RNG. Same seed, same id sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Allocator backed by any RNG.
    pub fn with_rng(rng: impl RngCore + 'static) -> Self {
        Self {
            rng: Box::new(rng),
            id_bytes: defaults::ID_BYTES,
            issued: HashSet::new(),
        }
    }

    /// Change the number of random bytes per id (hex length is twice this).
    pub fn with_id_bytes(mut self, id_bytes: usize) -> Self {
        self.id_bytes = id_bytes;
        self
    }

    /// Draw a fresh id, retrying until it has not been issued before.
    pub fn allocate(&mut self) -> String {
        let mut buf = vec![0u8; self.id_bytes];
        loop {
            self.rng.fill_bytes(&mut buf);
            let candidate = hex::encode(&buf);
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            debug!(id = %candidate, "ids: collision, regenerating");
        }
    }

    /// Whether `id` was issued by this allocator.
    pub fn contains(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    /// Number of ids issued so far.
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

impl Default for IdentifierAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdentifierAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierAllocator")
            .field("id_bytes", &self.id_bytes)
            .field("issued", &self.issued.len())
            .finish()
    }
}
