//! Configuration and input validation commands.

mod config;
mod input;

pub use config::execute_config;
pub use input::execute_input;
