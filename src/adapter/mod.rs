//! Adapter implementations of the port traits.

pub mod solver;
