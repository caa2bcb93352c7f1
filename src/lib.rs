//! Cardplan - purchase optimization for trading-card buylists.
//!
//! Given a buylist of wanted cards and a catalog of marketplace listings,
//! the engine decides which listing supplies each wanted copy. Plans are
//! scored on total cost (with penalties for unmet demand and seller-count
//! violations), card quality, availability and the number of sellers.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Problem model, allocations, scoring policy and the
//!   Pareto front. No I/O and no solver knowledge.
//! - **`port`** - The [`MilpSolver`](port::MilpSolver) seam and its
//!   backend-neutral problem description.
//! - **`adapter`** - HiGHS implementation of the solver port via `good_lp`.
//! - **`application`** - Exact (MILP) and evolutionary (NSGA-II) solvers
//!   plus the optimizer facade that selects between them.
//! - **`infrastructure`** - Settings files and logging.
//! - **`cli`** - The `cardplan` command-line interface.
//!
//! # Strategies
//!
//! - `exact` - Solve the allocation as a mixed-integer program
//! - `evolutionary` - Multi-objective NSGA-II search
//! - `hybrid` - Time-boxed MILP whose plan seeds the evolutionary search
//!
//! # Example
//!
//! ```no_run
//! use cardplan::application::{optimize, OptimizationConfig};
//! use cardplan::domain::{Listing, Problem, QualityTier, WantedItem};
//! use rust_decimal_macros::dec;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wanted = vec![WantedItem::try_new("Lightning Bolt", 4, QualityTier::LightlyPlayed)?];
//!     let listings = vec![Listing::try_new(
//!         "l-1",
//!         "Lightning Bolt",
//!         "store-a",
//!         dec!(1.25),
//!         QualityTier::NearMint,
//!         8,
//!     )?];
//!     let problem = Problem::new(wanted, listings)?;
//!     let result = optimize(&problem, &OptimizationConfig::default())?;
//!     println!("{}", result.status);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
