//! Sample ring buffer

/// Fixed-capacity ring of `(value, timestamp)` samples.
///
/// Appends overwrite the oldest sample once full. Samples are addressed by
/// logical offset from the oldest retained sample.
#[derive(Debug, Clone)]
pub struct CircularBuffer {
    values: Vec<f32>,
    timestamps: Vec<f64>,
    start: usize,
    count: usize,
}

impl CircularBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: vec![0.0; capacity],
            timestamps: vec![0.0; capacity],
            start: 0,
            count: 0,
        }
    }

    /// Append a sample, evicting the oldest if full.
    pub fn push(&mut self, value: f32, timestamp: f64) {
        let capacity = self.capacity();
        let idx = (self.start + self.count) % capacity;
        self.values[idx] = value;
        self.timestamps[idx] = timestamp;

        if self.count < capacity {
            self.count += 1;
        } else {
            self.start = (self.start + 1) % capacity;
        }
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True once the buffer has wrapped.
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Maximum number of samples held.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Sample at logical `offset` from the oldest, if present.
    pub fn get(&self, offset: usize) -> Option<(f32, f64)> {
        if offset >= self.count {
            return None;
        }
        let idx = (self.start + offset) % self.capacity();
        Some((self.values[idx], self.timestamps[idx]))
    }

    /// The newest `n` samples in chronological order, or `None` if fewer
    /// than `n` are held (or `n` is zero).
    pub fn latest_window(&self, n: usize) -> Option<(Vec<f32>, Vec<f64>)> {
        if n == 0 || n > self.count {
            return None;
        }
        let first = self.count - n;
        Some((first..self.count).filter_map(|off| self.get(off)).unzip())
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.start = 0;
        self.count = 0;
    }
}
