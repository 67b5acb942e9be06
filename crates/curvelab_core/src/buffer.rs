//! Growable sample and time buffers owned by a curve.
//!
//! Rows are stored row-major in a flat `Vec<f64>`. Capacity (the number of
//! allocated rows) is distinct from the valid prefix `0..=current_index`, and
//! growth only ever appends zero-filled rows, so previously written rows keep
//! their exact contents.

use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    dimension: usize,
    samples: Vec<f64>,
    times: Vec<f64>,
    current_index: usize,
}

impl SampleBuffer {
    /// A zero-filled buffer with `rows` rows.
    pub fn zeroed(dimension: usize, rows: usize) -> Self {
        Self {
            dimension,
            samples: vec![0.0; rows * dimension],
            times: vec![0.0; rows],
            current_index: 0,
        }
    }

    /// A buffer holding no rows at all; the next incremental step reinitialises.
    pub fn empty(dimension: usize) -> Self {
        Self::zeroed(dimension, 0)
    }

    /// A fully valid buffer built from a batch computation.
    pub(crate) fn from_batch(dimension: usize, times: Vec<f64>, samples: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), times.len() * dimension);
        let current_index = times.len().saturating_sub(1);
        Self {
            dimension,
            samples,
            times,
            current_index,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of allocated rows.
    pub fn capacity(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of valid rows, `current_index + 1` (zero when empty).
    pub fn valid_len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.current_index + 1
        }
    }

    /// Resets to `rows` zero-filled rows with `current_index = 0`.
    pub fn erase(&mut self, rows: usize) {
        self.samples.clear();
        self.samples.resize(rows * self.dimension, 0.0);
        self.times.clear();
        self.times.resize(rows, 0.0);
        self.current_index = 0;
    }

    /// Drops every row.
    pub fn invalidate(&mut self) {
        if !self.is_empty() {
            debug!(rows = self.capacity(), "sample buffer invalidated");
        }
        self.erase(0);
    }

    /// Appends `rows` zero-filled rows; existing rows keep their contents.
    pub fn grow(&mut self, rows: usize) {
        self.samples.reserve_exact(rows * self.dimension);
        self.samples.resize(self.samples.len() + rows * self.dimension, 0.0);
        self.times.reserve_exact(rows);
        self.times.resize(self.times.len() + rows, 0.0);
        debug!(capacity = self.capacity(), "sample buffer grown");
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.samples[index * self.dimension..(index + 1) * self.dimension]
    }

    pub fn time(&self, index: usize) -> f64 {
        self.times[index]
    }

    /// Writes `row` at `index` and makes it the current row.
    pub(crate) fn write(&mut self, index: usize, time: f64, row: &[f64]) {
        debug_assert_eq!(row.len(), self.dimension);
        self.times[index] = time;
        self.samples[index * self.dimension..(index + 1) * self.dimension].copy_from_slice(row);
        self.current_index = index;
    }

    /// Valid samples, row-major.
    pub fn samples(&self) -> &[f64] {
        &self.samples[..self.valid_len() * self.dimension]
    }

    /// Valid times.
    pub fn times(&self) -> &[f64] {
        &self.times[..self.valid_len()]
    }

    /// Valid values of a single component.
    pub fn component(&self, component: usize) -> Vec<f64> {
        (0..self.valid_len())
            .map(|i| self.samples[i * self.dimension + component])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_zero_fills_and_resets_index() {
        let mut buffer = SampleBuffer::zeroed(2, 3);
        buffer.write(2, 1.0, &[4.0, 5.0]);
        buffer.erase(4);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.current_index(), 0);
        assert_eq!(buffer.row(2), &[0.0, 0.0]);
    }

    #[test]
    fn grow_preserves_written_rows() {
        let mut buffer = SampleBuffer::zeroed(2, 2);
        buffer.write(0, 0.0, &[1.0, 2.0]);
        buffer.write(1, 0.5, &[3.0, 4.0]);
        let before = buffer.samples().to_vec();

        buffer.grow(2);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.current_index(), 1);
        assert_eq!(buffer.samples(), before.as_slice());
        assert_eq!(buffer.row(3), &[0.0, 0.0]);
    }

    #[test]
    fn valid_slices_follow_current_index() {
        let mut buffer = SampleBuffer::zeroed(1, 5);
        buffer.write(0, 0.0, &[1.0]);
        buffer.write(1, 0.1, &[2.0]);
        assert_eq!(buffer.times(), &[0.0, 0.1]);
        assert_eq!(buffer.component(0), vec![1.0, 2.0]);
    }

    #[test]
    fn invalidate_empties_the_buffer() {
        let mut buffer = SampleBuffer::zeroed(3, 4);
        buffer.invalidate();
        assert!(buffer.is_empty());
        assert_eq!(buffer.valid_len(), 0);
        assert!(buffer.samples().is_empty());
    }
}
