//! Pipeline entry points for the CLI.
//!
//! - `run_server`: Serve feeds over HTTP
//! - `run_fetch`: Refresh one feed and return its RSS
//! - `run_validate`: Check the configuration

pub mod fetch;
pub mod serve;
pub mod validate;

pub use fetch::run_fetch;
pub use serve::run_server;
pub use validate::run_validate;
