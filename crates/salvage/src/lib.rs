//! Boot-time device rescue console.
//!
//! Ties the UI runtime to one device: loads a profile, reads menu
//! definitions, and runs the menu loop until the operator asks for a
//! reboot or power off.

#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod devices;
pub mod error;
pub mod input_host;
pub mod menudef;

pub use cli::run_from_env;
pub use error::{Result, SalvageError};
