//! Rolling sample history.

use sensecanvas_core::SensorData;
use std::collections::VecDeque;

/// Default number of samples retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity buffer; the oldest sample is evicted first.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    capacity: usize,
    samples: VecDeque<SensorData>,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: SensorData) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples oldest first.
    pub fn to_vec(&self) -> Vec<SensorData> {
        self.samples.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&SensorData> {
        self.samples.back()
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
