//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: settings file loading and logging initialisation.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation

pub mod config;
