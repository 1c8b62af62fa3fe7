//! Platform helpers shared by the CLI and the rotation daemon.
//!
//! - [`path`] - Shell-like path expansion for configuration values
//! - [`thread`] - Named background threads

pub mod path;
pub mod thread;

pub use path::{expand, resolve};
pub use thread::spawn_named_thread;
