//! Fixed-capacity moving window over f64 samples

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct MovingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl MovingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a sample, evicting the oldest first when full.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
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

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population variance around the current mean.
    pub fn variance(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / self.samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_once_full() {
        let mut w = MovingWindow::new(3);
        for s in [1.0, 2.0, 3.0, 10.0] {
            w.push(s);
        }
        assert_eq!(w.len(), 3);
        // 1.0 evicted: (2 + 3 + 10) / 3
        assert!((w.mean() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn empty_window_is_zero() {
        let w = MovingWindow::new(10);
        assert!(w.is_empty());
        assert_eq!(w.mean(), 0.0);
        assert_eq!(w.variance(), 0.0);
    }

    #[test]
    fn variance_of_constant_samples_is_zero() {
        let mut w = MovingWindow::new(5);
        for _ in 0..5 {
            w.push(2.5);
        }
        assert_eq!(w.variance(), 0.0);

        w.push(0.0);
        assert!(w.variance() > 0.0);
    }

    #[test]
    fn zero_capacity_is_promoted_to_one() {
        let mut w = MovingWindow::new(0);
        w.push(4.0);
        w.push(6.0);
        assert_eq!(w.capacity(), 1);
        assert_eq!(w.mean(), 6.0);
    }
}
