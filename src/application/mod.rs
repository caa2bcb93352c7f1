//! Application services (use cases).
//!
//! These services orchestrate the domain model and the solver port to run
//! one optimization: configuration, the exact and evolutionary solvers, the
//! strategy-selecting facade and the result envelope.

pub mod cancel;
pub mod config;
pub mod evolution;
pub mod exact;
pub mod optimizer;
pub mod result;

pub use cancel::CancelToken;
pub use config::{OptimizationConfig, SolverLimits, Strategy};
pub use optimizer::{optimize, recommend, Optimizer};
pub use result::{Diagnostics, OptimizationResult, RunStatus};
