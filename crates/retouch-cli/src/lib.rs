//! Retouch CLI
//!
//! Headless front end for `retouch-core`: load an image, make one selection,
//! run one region operation and write the result.

pub mod cli;
pub mod run;

pub use cli::{Action, CliArgs, Select};
pub use run::{CliError, RunSummary, run};
