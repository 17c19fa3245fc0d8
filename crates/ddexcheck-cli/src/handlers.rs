//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; this module re-exports the
//! entry points `main` dispatches to.

mod completions;
mod info;
mod schemas;
mod validate;

pub use completions::handle_completions;
pub use info::handle_info;
pub use schemas::handle_schemas;
pub use validate::handle_validate;
