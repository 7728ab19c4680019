//! CLI command handlers. Each command is in its own file.

pub(super) mod batch;
pub(super) mod build;
mod completions;
mod config;
mod man;

pub use batch::run_batch_from_path;
pub use build::run_build;
pub use completions::run_completions;
pub use config::run_config;
pub use man::run_man;
