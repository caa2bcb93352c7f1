//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  (exact, evolution,     │
//!                    │   optimizer facade)     │
//!                    └────────────┬────────────┘
//!                                 │
//!                                 ▼
//!                          ┌─────────────┐
//!                          │ MilpSolver  │
//!                          │   (HiGHS)   │
//!                          └─────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`MilpSolver`] - Mixed-integer linear programming backend

pub mod outbound;

pub use outbound::solver::{MilpProblem, MilpSolution, MilpSolver, SolutionStatus, SolveLimits};
