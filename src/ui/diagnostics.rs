use std::collections::VecDeque;

/// Frame-time history shown in the Diagnostics folder
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub frame_time: f32,
    history: VecDeque<f32>,
    capacity: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(120)
    }
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frame_time: 0.0,
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one frame's duration in seconds
    pub fn record(&mut self, dt: f32) {
        self.frame_time = dt;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(dt);
    }

    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn average(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    pub fn frame_time_text(&self) -> String {
        format!("{:.2} ms", self.frame_time * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut diagnostics = Diagnostics::new(3);
        for dt in [0.01, 0.02, 0.03, 0.04] {
            diagnostics.record(dt);
        }
        assert_eq!(diagnostics.history().collect::<Vec<_>>(), vec![0.02, 0.03, 0.04]);
        assert!((diagnostics.average() - 0.03).abs() < 1e-6);
        assert_eq!(diagnostics.frame_time_text(), "40.00 ms");
    }
}
