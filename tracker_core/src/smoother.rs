//! Sliding-window average over the most recent N positions.

use std::collections::VecDeque;

/// Per-track rolling average of x and y.
#[derive(Clone, Debug)]
pub struct RollingSmoother {
    xs: VecDeque<f64>,
    ys: VecDeque<f64>,
    window: usize,
}

impl RollingSmoother {
    /// Create a smoother averaging over `window` samples (clamped to ≥ 1).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            xs: VecDeque::with_capacity(window + 1),
            ys: VecDeque::with_capacity(window + 1),
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Change the window size. Excess samples are evicted immediately so the
    /// next average only sees the newest `window` samples.
    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        self.trim();
    }

    /// Append a sample and return the mean of the current window.
    pub fn push(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.xs.push_back(x);
        self.ys.push_back(y);
        self.trim();
        self.average()
    }

    /// Mean of the buffered samples, `(0, 0)` when empty.
    pub fn average(&self) -> (f64, f64) {
        if self.xs.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.xs.len() as f64;
        (
            self.xs.iter().sum::<f64>() / n,
            self.ys.iter().sum::<f64>() / n,
        )
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Buffered samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    fn trim(&mut self) {
        while self.xs.len() > self.window {
            self.xs.pop_front();
            self.ys.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn keeps_exactly_last_n() {
        let n = 4;
        let mut sm = RollingSmoother::new(n);
        let mut last = (0.0, 0.0);
        for i in 0..(n + 5) {
            last = sm.push(i as f64, 10.0 * i as f64);
        }
        assert_eq!(sm.len(), n);
        let kept: Vec<f64> = sm.samples().map(|(x, _)| x).collect();
        assert_eq!(kept, vec![5.0, 6.0, 7.0, 8.0]);
        assert_abs_diff_eq!(last.0, 6.5, epsilon = 1e-12);
        assert_abs_diff_eq!(last.1, 65.0, epsilon = 1e-12);
    }

    #[test]
    fn window_of_one_is_passthrough() {
        let mut sm = RollingSmoother::new(1);
        assert_eq!(sm.push(1.0, 2.0), (1.0, 2.0));
        assert_eq!(sm.push(-3.0, 7.5), (-3.0, 7.5));
        assert_eq!(sm.len(), 1);
    }

    #[test]
    fn zero_window_is_clamped() {
        let sm = RollingSmoother::new(0);
        assert_eq!(sm.window(), 1);
    }

    #[test]
    fn shrinking_window_evicts_before_next_average() {
        let mut sm = RollingSmoother::new(10);
        for i in 0..10 {
            sm.push(i as f64, 0.0);
        }
        sm.set_window(3);
        assert_eq!(sm.len(), 3);
        // window now holds 7, 8, 9 → push 10 keeps 8, 9, 10
        let (avg_x, _) = sm.push(10.0, 0.0);
        assert_abs_diff_eq!(avg_x, 9.0, epsilon = 1e-12);
    }

    #[test]
    fn partial_window_averages_what_it_has() {
        let mut sm = RollingSmoother::new(20);
        sm.push(1.0, 1.0);
        let avg = sm.push(3.0, 5.0);
        assert_eq!(avg, (2.0, 3.0));
    }
}
