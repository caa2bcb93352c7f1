//! Early-stop detector on the best cost.

/// Tracks generations without meaningful cost improvement.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    threshold: f64,
    patience: usize,
    best: Option<f64>,
    stale: usize,
}

impl ConvergenceTracker {
    /// `threshold` is the relative improvement a generation must beat to
    /// reset the count; `patience` the stale generations tolerated.
    #[must_use]
    pub fn new(threshold: f64, patience: usize) -> Self {
        Self {
            threshold,
            patience: patience.max(1),
            best: None,
            stale: 0,
        }
    }

    /// Record the best cost of a generation. Returns `true` once converged.
    pub fn observe(&mut self, cost: f64) -> bool {
        let Some(best) = self.best else {
            self.best = Some(cost);
            return false;
        };

        let improvement = (best - cost) / best.abs().max(f64::EPSILON);
        if improvement > self.threshold {
            self.stale = 0;
        } else {
            self.stale += 1;
        }
        if cost < best {
            self.best = Some(cost);
        }
        self.stale >= self.patience
    }

    #[must_use]
    pub fn best(&self) -> Option<f64> {
        self.best
    }

    #[must_use]
    pub fn stale_generations(&self) -> usize {
        self.stale
    }
}
