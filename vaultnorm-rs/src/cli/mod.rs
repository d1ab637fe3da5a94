//! CLI command implementations.

pub mod args;
pub mod normalize;
pub mod output;

pub use args::{Cli, Commands, NormalizeArgs};
pub use output::Output;
