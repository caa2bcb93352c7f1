//! Solver implementations for mixed-integer programming.
//!
//! Implements the `port::MilpSolver` trait with concrete backends.

mod highs;

pub use highs::HiGHSSolver;
