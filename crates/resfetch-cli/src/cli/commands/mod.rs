//! CLI command handlers. Each command is in its own file.

mod completions;
mod config;
mod get;
mod watch;

pub use completions::run_completions;
pub use config::run_config;
pub use get::run_get;
pub use watch::run_watch;
#[cfg(test)]
pub use watch::watch_config;
