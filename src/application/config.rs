//! Per-run optimizer configuration.
//!
//! [`OptimizationConfig`] arrives from the settings file (or a caller merging
//! request parameters with defaults) and is checked once per run by
//! [`OptimizationConfig::validated`]. Values that can be repaired safely are
//! repaired and reported as notes; only values with no sensible repair are
//! rejected.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ScoringPolicy, ScoringWeights, SellerBounds, SellerId};
use crate::error::ConfigError;

/// Smallest population the evolutionary solver will run with.
pub const MIN_POPULATION: usize = 4;

/// Longest solver time limit accepted, in seconds (one week).
pub const MAX_TIME_LIMIT_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// Solver sequence to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// MILP only.
    #[serde(alias = "milp")]
    Exact,
    /// NSGA-II only, unseeded.
    #[serde(alias = "nsga2", alias = "genetic")]
    Evolutionary,
    /// MILP first, then NSGA-II seeded with its answer.
    #[default]
    Hybrid,
}

impl Strategy {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Evolutionary => "evolutionary",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "milp" => Ok(Self::Exact),
            "evolutionary" | "nsga2" | "genetic" => Ok(Self::Evolutionary),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ConfigError::InvalidValue {
                field: "strategy",
                reason: format!("unknown strategy '{other}'"),
            }),
        }
    }
}

/// Wall-clock limits for the solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverLimits {
    /// Budget for the MILP under the exact strategy.
    pub milp_time_limit_secs: f64,
    /// Budget for the MILP stage of the hybrid strategy.
    pub hybrid_milp_budget_secs: f64,
    /// Relative MIP gap at which the backend may stop early.
    pub mip_gap: Option<f64>,
    /// Optional budget for the evolutionary search; the generation cap
    /// always applies.
    pub evolution_time_limit_secs: Option<f64>,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            milp_time_limit_secs: 30.0,
            hybrid_milp_budget_secs: 10.0,
            mip_gap: None,
            evolution_time_limit_secs: None,
        }
    }
}

impl SolverLimits {
    /// MILP budget under the exact strategy.
    #[must_use]
    pub fn milp_time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.milp_time_limit_secs)
    }

    /// MILP budget under the hybrid strategy.
    #[must_use]
    pub fn hybrid_milp_budget(&self) -> Duration {
        Duration::from_secs_f64(self.hybrid_milp_budget_secs)
    }

    /// Evolutionary budget, if any.
    #[must_use]
    pub fn evolution_time_limit(&self) -> Option<Duration> {
        self.evolution_time_limit_secs.map(Duration::from_secs_f64)
    }
}

/// Everything one optimization run is parameterised by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Solver sequence.
    pub strategy: Strategy,

    /// Penalty magnitudes and quality weights.
    pub weights: ScoringWeights,

    /// Copies in any other language pay the language multiplier.
    /// `None` disables the surcharge.
    pub preferred_language: Option<String>,

    /// Fewest distinct sellers a plan should use.
    pub min_sellers: usize,

    /// Most distinct sellers a plan should use.
    pub max_sellers: Option<usize>,

    /// Sellers whose listings are never considered.
    pub excluded_sellers: Vec<SellerId>,

    pub population_size: usize,

    /// Hard cap on evolutionary generations.
    pub generations: usize,

    /// Probability that a parent pair is recombined.
    pub crossover_probability: f64,

    /// Per-gene probability of resampling the listing.
    pub mutation_probability: f64,

    /// Relative cost improvement below which a generation counts as stale.
    pub convergence_threshold: f64,

    /// Stale generations tolerated before stopping early.
    pub convergence_patience: usize,

    /// Cheapest individuals carried into the next generation unconditionally.
    pub elite_count: usize,

    /// RNG seed for reproducible evolutionary runs.
    pub seed: Option<u64>,

    /// Evaluation worker threads (defaults to the number of CPUs).
    pub threads: Option<usize>,

    /// Most alternatives surfaced from the Pareto front.
    pub max_front_size: usize,

    /// Solver time limits.
    pub limits: SolverLimits,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            weights: ScoringWeights::default(),
            preferred_language: Some("English".into()),
            min_sellers: 1,
            max_sellers: None,
            excluded_sellers: Vec::new(),
            population_size: 100,
            generations: 200,
            crossover_probability: 0.8,
            mutation_probability: 0.05,
            convergence_threshold: 1e-3,
            convergence_patience: 20,
            elite_count: 2,
            seed: None,
            threads: None,
            max_front_size: 32,
            limits: SolverLimits::default(),
        }
    }
}

impl OptimizationConfig {
    /// Validate and repair this configuration.
    ///
    /// Returns the repaired configuration together with one note per repair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for values that have no safe
    /// repair: a zero population or generation count, non-finite or negative
    /// weights, non-finite probabilities or time limits.
    pub fn validated(&self) -> Result<(Self, Vec<String>), ConfigError> {
        let mut config = self.clone();
        let mut notes = Vec::new();

        if config.population_size == 0 {
            return Err(invalid("population_size", "must be at least 1"));
        }
        if config.generations == 0 {
            return Err(invalid("generations", "must be at least 1"));
        }
        if !config.weights.is_sane() {
            return Err(invalid(
                "weights",
                "weights must be finite and penalties non-negative",
            ));
        }
        for (field, p) in [
            ("crossover_probability", config.crossover_probability),
            ("mutation_probability", config.mutation_probability),
            ("convergence_threshold", config.convergence_threshold),
        ] {
            if !p.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }
        let limits = &config.limits;
        let budgets = [
            Some(limits.milp_time_limit_secs),
            Some(limits.hybrid_milp_budget_secs),
            limits.evolution_time_limit_secs,
        ];
        if budgets.iter().flatten().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(invalid(
                "limits",
                "time limits must be finite and non-negative",
            ));
        }
        if limits.mip_gap.is_some_and(|g| !g.is_finite() || g < 0.0) {
            return Err(invalid("limits.mip_gap", "must be finite and non-negative"));
        }

        let limits = &mut config.limits;
        for (field, secs) in [
            ("milp_time_limit_secs", &mut limits.milp_time_limit_secs),
            ("hybrid_milp_budget_secs", &mut limits.hybrid_milp_budget_secs),
        ] {
            clamp_time_limit(field, secs, &mut notes);
        }
        if let Some(secs) = limits.evolution_time_limit_secs.as_mut() {
            clamp_time_limit("evolution_time_limit_secs", secs, &mut notes);
        }

        if let Some(max) = config.max_sellers {
            if max < config.min_sellers {
                notes.push(format!(
                    "max_sellers {max} raised to min_sellers {}",
                    config.min_sellers
                ));
                config.max_sellers = Some(config.min_sellers);
            }
        }

        config.crossover_probability =
            clamp_probability("crossover_probability", config.crossover_probability, &mut notes);
        config.mutation_probability =
            clamp_probability("mutation_probability", config.mutation_probability, &mut notes);

        if config.population_size < MIN_POPULATION {
            notes.push(format!(
                "population_size {} raised to {MIN_POPULATION}",
                config.population_size
            ));
            config.population_size = MIN_POPULATION;
        }

        if config.elite_count >= config.population_size {
            let clamped = config.population_size - 1;
            notes.push(format!(
                "elite_count {} lowered to {clamped}",
                config.elite_count
            ));
            config.elite_count = clamped;
        }

        if config.convergence_threshold < 0.0 {
            notes.push(format!(
                "convergence_threshold {} raised to 0",
                config.convergence_threshold
            ));
            config.convergence_threshold = 0.0;
        }

        if config.convergence_patience == 0 {
            notes.push("convergence_patience 0 raised to 1".into());
            config.convergence_patience = 1;
        }

        if config.max_front_size == 0 {
            notes.push("max_front_size 0 raised to 1".into());
            config.max_front_size = 1;
        }

        if config.threads == Some(0) {
            notes.push("threads 0 replaced by the CPU count".into());
            config.threads = None;
        }

        Ok((config, notes))
    }

    /// Scoring policy implied by this configuration.
    #[must_use]
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            weights: self.weights.clone(),
            preferred_language: self.preferred_language.clone(),
            seller_bounds: SellerBounds {
                min: self.min_sellers,
                max: self.max_sellers,
            },
        }
    }

    /// Evaluation worker threads to use.
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

fn clamp_time_limit(field: &str, secs: &mut f64, notes: &mut Vec<String>) {
    if *secs > MAX_TIME_LIMIT_SECS {
        notes.push(format!("{field} {secs} lowered to {MAX_TIME_LIMIT_SECS}"));
        *secs = MAX_TIME_LIMIT_SECS;
    }
}

fn clamp_probability(field: &str, value: f64, notes: &mut Vec<String>) -> f64 {
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        notes.push(format!("{field} {value} clamped to {clamped}"));
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        let (config, notes) = OptimizationConfig::default().validated().unwrap();
        assert!(notes.is_empty());
        assert_eq!(config, OptimizationConfig::default());
    }

    #[test]
    fn max_sellers_raised_to_min() {
        let config = OptimizationConfig {
            min_sellers: 3,
            max_sellers: Some(1),
            ..OptimizationConfig::default()
        };
        let (config, notes) = config.validated().unwrap();
        assert_eq!(config.max_sellers, Some(3));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn probabilities_are_clamped() {
        let config = OptimizationConfig {
            crossover_probability: 1.7,
            mutation_probability: -0.2,
            ..OptimizationConfig::default()
        };
        let (config, notes) = config.validated().unwrap();
        assert_eq!(config.crossover_probability, 1.0);
        assert_eq!(config.mutation_probability, 0.0);
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn huge_time_limits_are_lowered() {
        let mut config = OptimizationConfig::default();
        config.limits.milp_time_limit_secs = 1e20;
        config.limits.evolution_time_limit_secs = Some(1e300);

        let (config, notes) = config.validated().unwrap();

        assert_eq!(config.limits.milp_time_limit_secs, MAX_TIME_LIMIT_SECS);
        assert_eq!(config.limits.evolution_time_limit_secs, Some(MAX_TIME_LIMIT_SECS));
        assert_eq!(notes.len(), 2);
        assert_eq!(
            config.limits.milp_time_limit(),
            Duration::from_secs(7 * 24 * 3600)
        );
    }

    #[test]
    fn small_population_is_raised_and_elites_follow() {
        let config = OptimizationConfig {
            population_size: 2,
            elite_count: 10,
            ..OptimizationConfig::default()
        };
        let (config, _) = config.validated().unwrap();
        assert_eq!(config.population_size, MIN_POPULATION);
        assert_eq!(config.elite_count, MIN_POPULATION - 1);
    }

    #[test]
    fn zero_population_is_rejected() {
        let config = OptimizationConfig {
            population_size: 0,
            ..OptimizationConfig::default()
        };
        let err = config.validated().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "population_size",
                ..
            }
        ));
    }

    #[test]
    fn negative_penalty_is_rejected() {
        let mut config = OptimizationConfig::default();
        config.weights.missing_unit_penalty = -5.0;
        assert!(config.validated().is_err());
    }

    #[test]
    fn strategy_parses_aliases() {
        assert_eq!("milp".parse::<Strategy>().unwrap(), Strategy::Exact);
        assert_eq!("Hybrid".parse::<Strategy>().unwrap(), Strategy::Hybrid);
        assert!("annealing".parse::<Strategy>().is_err());
    }

    #[test]
    fn deserializes_partial_toml() {
        let config: OptimizationConfig = toml::from_str(
            r#"
            strategy = "milp"
            max_sellers = 2

            [weights]
            language_multiplier = 2.0

            [limits]
            hybrid_milp_budget_secs = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::Exact);
        assert_eq!(config.max_sellers, Some(2));
        assert_eq!(config.weights.language_multiplier, 2.0);
        assert_eq!(config.weights.missing_unit_penalty, 10_000.0);
        assert_eq!(config.limits.hybrid_milp_budget(), Duration::from_millis(1500));
        assert_eq!(config.population_size, 100);
    }

    #[test]
    fn policy_carries_bounds() {
        let config = OptimizationConfig {
            min_sellers: 2,
            max_sellers: Some(4),
            ..OptimizationConfig::default()
        };
        let policy = config.scoring_policy();
        assert_eq!(policy.seller_bounds, SellerBounds { min: 2, max: Some(4) });
        assert_eq!(policy.preferred_language.as_deref(), Some("English"));
    }
}
