use crate::core::models::ids::AtomId;
use crate::core::orbitals::angular::AngularBasis;
use crate::core::orbitals::field::{FieldMode, FieldSample};
use crate::core::orbitals::scene::Combination;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub const DEFAULT_CACHE_CAPACITY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    Orbital { atom: AtomId, n: u8, l: u8, m: i8 },
    Scene { combination: Combination, mix_bits: u64 },
}

/// Everything that determines a sampled field. Floating-point inputs are keyed by their bit
/// patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub revision: u64,
    pub target: FieldTarget,
    pub mode: FieldMode,
    pub basis: AngularBasis,
    pub resolution: [usize; 3],
    pub extent_bits: Option<u64>,
}

/// Least-recently-used store of evaluated fields.
#[derive(Debug, Clone)]
pub struct FieldCache {
    capacity: usize,
    entries: HashMap<FieldKey, Arc<FieldSample>>,
    recency: VecDeque<FieldKey>,
}

impl Default for FieldCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached field and marks it most recently used.
    pub fn get(&mut self, key: &FieldKey) -> Option<Arc<FieldSample>> {
        let sample = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(sample)
    }

    pub fn insert(&mut self, key: FieldKey, sample: Arc<FieldSample>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key, sample).is_some() {
            self.touch(&key);
            return;
        }
        self.recency.push_back(key);
        while self.entries.len() > self.capacity {
            match self.recency.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn touch(&mut self, key: &FieldKey) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(*key);
    }
}
