//! Canonical test configurations.
//!
//! Single source of truth for optimizer settings used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use crate::application::{OptimizationConfig, Strategy};

/// Small seeded evolutionary configuration that finishes in milliseconds.
pub fn fast(strategy: Strategy) -> OptimizationConfig {
    OptimizationConfig {
        strategy,
        population_size: 24,
        generations: 40,
        convergence_patience: 10,
        seed: Some(7),
        threads: Some(2),
        ..OptimizationConfig::default()
    }
}

/// Seeded configuration with the seller bounds applied.
pub fn bounded(strategy: Strategy, min_sellers: usize, max_sellers: Option<usize>) -> OptimizationConfig {
    OptimizationConfig {
        min_sellers,
        max_sellers,
        ..fast(strategy)
    }
}
