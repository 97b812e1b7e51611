//! Identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Produces process-wide-unique, monotonically increasing identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier, greater than every one returned before.
    fn next_id(&self) -> u64;
}

/// Atomic counter based [`IdGenerator`].
#[derive(Debug)]
pub struct AtomicIdGenerator {
    next: AtomicU64,
}

impl AtomicIdGenerator {
    /// Creates a generator starting at 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for AtomicIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for AtomicIdGenerator {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_monotonic() {
        let gen = AtomicIdGenerator::new();
        let a = gen.next_id();
        let b = gen.next_id();
        let c = gen.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_unique_across_threads() {
        let gen = Arc::new(AtomicIdGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let gen = Arc::clone(&gen);
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| gen.next_id()).collect::<Vec<_>>()
            }));
        }

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 400);
    }
}
