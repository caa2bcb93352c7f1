//! Result envelope returned for every run.
//!
//! Callers always receive an [`OptimizationResult`], whether the run
//! succeeded, hit a time limit or failed inside a solver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::Strategy;
use super::evolution::StopReason;
use crate::domain::{PurchasePlan, RunId};
use crate::port::SolutionStatus;

/// Outcome class of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
    TimedOut,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performance and diagnostic block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Solver (or solver sequence) that produced the result.
    pub algorithm: String,
    pub generations: usize,
    pub population_size: usize,
    pub evaluations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milp_status: Option<SolutionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milp_variables: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    /// Size of the full Pareto front before truncation.
    pub front_size: usize,
    /// Configuration repairs applied before the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Uniform envelope around one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    /// Human-readable explanation for failures and degraded runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub strategy_requested: Strategy,
    /// Strategy whose output is reported; differs from the request after a
    /// hybrid fallback.
    pub strategy_used: Strategy,
    /// The hybrid MILP stage failed and the evolutionary stage ran unseeded.
    pub fallback: bool,
    /// The result is best-effort: a limit was hit or demand is unmet.
    pub partial: bool,
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<PurchasePlan>,
    /// Pareto-optimal plans, cheapest first.
    pub alternatives: Vec<PurchasePlan>,
    pub diagnostics: Diagnostics,
}

impl OptimizationResult {
    /// Failure envelope: no plans and zero-valued metrics.
    #[must_use]
    pub fn failed(
        run_id: RunId,
        started_at: DateTime<Utc>,
        strategy: Strategy,
        algorithm: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            run_id,
            started_at,
            status: RunStatus::Failed,
            message: Some(message.into()),
            strategy_requested: strategy,
            strategy_used: strategy,
            fallback: false,
            partial: false,
            execution_time_ms: 0,
            recommended: None,
            alternatives: Vec::new(),
            diagnostics: Diagnostics {
                algorithm: algorithm.to_string(),
                ..Diagnostics::default()
            },
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status != RunStatus::Failed
    }

    /// Unfulfilled units in the recommended plan, zero when there is none.
    #[must_use]
    pub fn unfulfilled_units(&self) -> usize {
        self.recommended
            .as_ref()
            .map_or(0, |plan| plan.unfulfilled_units)
    }
}
