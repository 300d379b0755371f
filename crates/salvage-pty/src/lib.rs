#![forbid(unsafe_code)]
//! Shell session plumbing for the recovery console.
//!
//! A [`ShellSession`] spawns a shell on a pty sized to the console, pumps
//! its output into an [`OutputEvent`] channel from a reader thread, and
//! owns the child's lifecycle: keystrokes go in through
//! [`ShellSession::write_all`], termination comes out of
//! [`ShellSession::wait`], and dropping the session kills and reaps the
//! child so a crashed console never leaks a shell.

pub mod session;

pub use session::{
    OutputEvent, ProcessStatus, READ_CHUNK, ShellConfig, ShellSession, escape_frame,
};
