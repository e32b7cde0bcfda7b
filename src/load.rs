//! Synthetic memory load.
//!
//! Holds a large ascending integer sequence for the life of the process so
//! that orchestration tests can observe memory limits and evictions.

/// Ascending sequence `0..len`, never modified after allocation.
#[derive(Debug)]
pub struct SyntheticLoad {
    values: Vec<u64>,
}

impl SyntheticLoad {
    /// Allocate and populate `elements` integers.
    pub fn allocate(elements: usize) -> Self {
        let values: Vec<u64> = (0..elements as u64).collect();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Heap bytes reserved for the sequence.
    pub fn footprint_bytes(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<u64>()
    }
}
