//! Spread Z-Score Window
//!
//! Keeps the spread history of the current hedge and standardises the
//! latest spread against it.
//!
//! Z-Score Formula: z = (spread - mean(window)) / std(window)
//!
//! The window is rebuilt from the training prices whenever the hedge is
//! refitted and grows by one spread per scored tick until the next refit.
//! Standard deviation is the population one (divide by n).

/// Below this the window is treated as flat and no z-score is produced
const MIN_STD_DEV: f64 = 1e-12;

/// Standardise `x` against a mean and standard deviation
pub fn zscore(x: f64, mean: f64, std_dev: f64) -> f64 {
    (x - mean) / std_dev
}

/// Result of a z-score calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreResult {
    /// Current z-score value
    pub z_score: f64,
    /// Window mean used in calculation
    pub mean: f64,
    /// Window standard deviation
    pub std_dev: f64,
    /// Spread the score was computed for
    pub current_spread: f64,
}

/// Expanding spread history of the hedge in force
#[derive(Debug, Clone, Default)]
pub struct SpreadWindow {
    spreads: Vec<f64>,
}

impl SpreadWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spread: f64) {
        self.spreads.push(spread);
    }

    /// Replace the history wholesale (after retraining)
    pub fn rebuild<I: IntoIterator<Item = f64>>(&mut self, spreads: I) {
        self.spreads.clear();
        self.spreads.extend(spreads);
    }

    /// Z-score of the most recent spread
    pub fn calculate(&self) -> Option<ZScoreResult> {
        let current_spread = *self.spreads.last()?;
        let mean = self.mean()?;
        let std_dev = self.std_dev(mean);

        if !(std_dev > MIN_STD_DEV) {
            return None;
        }

        Some(ZScoreResult {
            z_score: zscore(current_spread, mean, std_dev),
            mean,
            std_dev,
            current_spread,
        })
    }

    fn mean(&self) -> Option<f64> {
        if self.spreads.is_empty() {
            return None;
        }
        Some(self.spreads.iter().sum::<f64>() / self.spreads.len() as f64)
    }

    fn std_dev(&self, mean: f64) -> f64 {
        let variance = self
            .spreads
            .iter()
            .map(|&s| {
                let diff = s - mean;
                diff * diff
            })
            .sum::<f64>()
            / self.spreads.len() as f64;

        variance.sqrt()
    }

    pub fn len(&self) -> usize {
        self.spreads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spreads.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.spreads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_window() {
        let window = SpreadWindow::new();
        assert!(window.is_empty());
        assert!(window.calculate().is_none());
    }

    #[test]
    fn test_zscore_calculation() {
        let mut window = SpreadWindow::new();
        for s in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(s);
        }

        // mean 3, population std sqrt(2)
        let result = window.calculate().unwrap();
        assert_relative_eq!(result.mean, 3.0);
        assert_relative_eq!(result.std_dev, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(result.z_score, 2.0 / 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(result.current_spread, 5.0);
    }

    #[test]
    fn test_flat_window_has_no_score() {
        let mut window = SpreadWindow::new();
        for _ in 0..5 {
            window.push(0.25);
        }
        assert!(window.calculate().is_none());
    }

    #[test]
    fn test_expanding_window_keeps_everything() {
        let mut window = SpreadWindow::new();
        for i in 0..1_000 {
            window.push(i as f64);
        }
        assert_eq!(window.len(), 1_000);
    }

    #[test]
    fn test_rebuild_replaces_history() {
        let mut window = SpreadWindow::new();
        window.push(10.0);
        window.rebuild(vec![1.0, 2.0, 3.0]);
        assert_eq!(window.values(), &[1.0, 2.0, 3.0]);

        window.push(4.0);
        let result = window.calculate().unwrap();
        assert_eq!(result.current_spread, 4.0);
        assert_relative_eq!(result.mean, 2.5);
    }
}
