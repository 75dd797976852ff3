use std::collections::VecDeque;

/// Bounded FIFO of per-step percentage returns; the oldest sample is evicted
/// once `capacity` is exceeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsWindow {
    capacity: usize,
    buf: VecDeque<f64>,
}

impl ReturnsWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        self.buf.push_back(value);
        while self.buf.len() > self.capacity {
            self.buf.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.buf.iter()
    }

    /// Population standard deviation (divides by `n`). Zero for an empty window.
    pub fn population_std(&self) -> f64 {
        if self.buf.is_empty() {
            return 0.0;
        }
        let n = self.buf.len() as f64;
        let mean = self.buf.iter().sum::<f64>() / n;
        let var = self
            .buf
            .iter()
            .map(|value| {
                let diff = value - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        var.max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::ReturnsWindow;

    #[test]
    fn push_evicts_oldest_beyond_capacity() {
        let mut window = ReturnsWindow::new(3);
        for value in [1.0, 2.0, 3.0, 4.0] {
            window.push(value);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn population_std_matches_hand_computation() {
        let mut window = ReturnsWindow::new(8);
        for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            window.push(value);
        }
        assert!((window.population_std() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_capacity_never_stores() {
        let mut window = ReturnsWindow::new(0);
        window.push(1.0);
        assert!(window.is_empty());
        assert_eq!(window.population_std(), 0.0);
    }
}
