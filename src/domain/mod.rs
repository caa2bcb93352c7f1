//! Marketplace-agnostic domain model and scoring policy.

pub mod allocation;
pub mod constraint;
pub mod error;
pub mod id;
pub mod item;
pub mod money;
pub mod pareto;
pub mod plan;
pub mod policy;
pub mod problem;
pub mod quality;
pub mod score;

pub use allocation::{Allocation, Gene};
pub use error::DomainError;
pub use id::{ListingId, RunId, SellerId};
pub use item::{Listing, WantedItem};
pub use money::Price;
pub use pareto::{FrontMember, ParetoFront};
pub use plan::{PlanLine, PurchasePlan, SellerSubtotal, Shortfall};
pub use policy::{Evaluator, QualityWeights, ScoringPolicy, ScoringWeights, SellerBounds};
pub use problem::{DemandUnit, ListingIdx, Problem, SellerIdx};
pub use quality::QualityTier;
pub use score::ScoreVector;
