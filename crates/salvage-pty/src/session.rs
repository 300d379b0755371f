//! Spawning and managing the console shell.
//!
//! The session reads the pty in chunks sized to what the console digests
//! per redraw and hands them to whoever took the output receiver. Reads
//! and writes never share a lock with the UI; the reader thread blocks
//! on the pty alone.
//!
//! Lifecycle rules:
//!
//! 1. One session owns one child. [`ShellSession::kill`] is idempotent.
//! 2. The reader thread ends itself on EOF or read error and says so
//!    with a final [`OutputEvent::Eof`] or [`OutputEvent::Err`].
//! 3. Drop kills the child and joins the reader, so no orphans.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use portable_pty::{CommandBuilder, MasterPty, PtySize};
use tracing::{debug, warn};

/// Bytes per pty read, matching one console print burst.
pub const READ_CHUNK: usize = 1024;

const ESC: u8 = 0x1b;

/// How to spawn the console shell.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Shell executable. Falls back to `$SHELL`, then `/bin/sh`.
    pub shell: Option<PathBuf>,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub cwd: Option<PathBuf>,
    /// Pty dimensions in character cells.
    pub rows: u16,
    pub cols: u16,
    /// Pty dimensions in pixels, advertised to the child via the
    /// winsize. Zero means unreported.
    pub pixel_width: u16,
    pub pixel_height: u16,
    /// TERM value. The console speaks a vt100-sized dialect, so that is
    /// what it advertises.
    pub term: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            shell: None,
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
            term: "vt100".to_string(),
        }
    }
}

impl ShellConfig {
    #[must_use]
    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: Some(shell.into()),
            ..Default::default()
        }
    }

    /// Pty size in character cells.
    #[must_use]
    pub fn size(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Pty size in pixels.
    #[must_use]
    pub fn pixel_size(mut self, width: u16, height: u16) -> Self {
        self.pixel_width = width;
        self.pixel_height = height;
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    #[must_use]
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    fn resolve_shell(&self) -> PathBuf {
        if let Some(shell) = &self.shell {
            return shell.clone();
        }
        if let Ok(shell) = std::env::var("SHELL") {
            return PathBuf::from(shell);
        }
        PathBuf::from("/bin/sh")
    }
}

/// One message from the reader thread.
#[derive(Debug)]
pub enum OutputEvent {
    /// A chunk of raw shell output, at most [`READ_CHUNK`] bytes.
    Data(Vec<u8>),
    /// The pty closed; the shell is gone or going.
    Eof,
    /// The pty read failed. Terminal for the stream.
    Err(io::Error),
}

/// Where the child is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    /// Exited with a code. A signal death surfaces as a nonzero code;
    /// the pty layer cannot tell the two apart.
    Exited(i32),
    /// State could not be determined.
    Unknown,
}

impl ProcessStatus {
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, ProcessStatus::Running)
    }

    #[must_use]
    pub const fn exit_code(self) -> Option<i32> {
        match self {
            ProcessStatus::Exited(code) => Some(code),
            _ => None,
        }
    }
}

/// Frames an escape sequence for the shell: ESC followed by the body.
///
/// Arrow keys and the escape key itself go to the shell in this form.
#[must_use]
pub fn escape_frame(body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(body.len() + 1);
    frame.push(ESC);
    frame.extend_from_slice(body);
    frame
}

/// A spawned shell on a pty.
pub struct ShellSession {
    child: Box<dyn portable_pty::Child + Send + Sync>,
    // Keeps the master side open for the child's lifetime.
    _master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    output: Option<mpsc::Receiver<OutputEvent>>,
    reader_thread: Option<JoinHandle<()>>,
    status: ProcessStatus,
}

impl fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellSession")
            .field("pid", &self.child.process_id())
            .field("status", &self.status)
            .finish()
    }
}

impl ShellSession {
    /// Spawns the shell and starts the reader thread.
    ///
    /// # Errors
    ///
    /// Fails when the pty cannot be opened or the shell cannot start.
    pub fn spawn(config: &ShellConfig) -> io::Result<Self> {
        let shell = config.resolve_shell();
        debug!(shell = %shell.display(), rows = config.rows, cols = config.cols, "spawning shell");

        let mut cmd = CommandBuilder::new(&shell);
        for arg in &config.args {
            cmd.arg(arg);
        }
        cmd.env("TERM", &config.term);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        if let Some(cwd) = &config.cwd {
            cmd.cwd(cwd);
        }

        let pty_system = portable_pty::native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: config.rows,
                cols: config.cols,
                pixel_width: config.pixel_width,
                pixel_height: config.pixel_height,
            })
            .map_err(|e| io::Error::other(e.to_string()))?;

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| io::Error::other(e.to_string()))?;

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| io::Error::other(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        let reader_thread = thread::Builder::new()
            .name("pty-reader".into())
            .spawn(move || {
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => {
                            let _ = tx.send(OutputEvent::Eof);
                            break;
                        }
                        Ok(n) => {
                            if tx.send(OutputEvent::Data(buf[..n].to_vec())).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            let _ = tx.send(OutputEvent::Err(err));
                            break;
                        }
                    }
                }
            })
            .expect("spawn pty reader");

        debug!(pid = ?child.process_id(), "shell started");
        Ok(Self {
            child,
            _master: pair.master,
            writer,
            output: Some(rx),
            reader_thread: Some(reader_thread),
            status: ProcessStatus::Running,
        })
    }

    /// Hands out the output stream. The console's print loop owns it
    /// from then on; a second call returns `None`.
    pub fn take_output(&mut self) -> Option<mpsc::Receiver<OutputEvent>> {
        self.output.take()
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    /// Sends raw bytes to the shell.
    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()
    }

    /// Sends an ESC-framed sequence to the shell.
    pub fn send_escape(&mut self, body: &[u8]) -> io::Result<()> {
        self.write_all(&escape_frame(body))
    }

    /// Current status, polled without blocking.
    pub fn status(&mut self) -> ProcessStatus {
        if self.status.is_alive() {
            match self.child.try_wait() {
                Ok(Some(exit)) => {
                    self.status = status_from_exit(exit.success(), exit.exit_code());
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "could not poll shell status");
                    self.status = ProcessStatus::Unknown;
                }
            }
        }
        self.status
    }

    pub fn is_alive(&mut self) -> bool {
        self.status().is_alive()
    }

    /// Kills the shell outright. Safe to call more than once.
    pub fn kill(&mut self) -> io::Result<()> {
        if !self.status.is_alive() {
            return Ok(());
        }
        debug!(pid = ?self.child.process_id(), "killing shell");
        self.child.kill()?;
        self.status = ProcessStatus::Unknown;
        Ok(())
    }

    /// Blocks until the shell exits and reports how it went.
    pub fn wait(&mut self) -> io::Result<ProcessStatus> {
        if let ProcessStatus::Exited(code) = self.status {
            return Ok(ProcessStatus::Exited(code));
        }
        let exit = self.child.wait()?;
        self.status = status_from_exit(exit.success(), exit.exit_code());
        Ok(self.status)
    }
}

fn status_from_exit(success: bool, code: u32) -> ProcessStatus {
    if success {
        ProcessStatus::Exited(0)
    } else {
        ProcessStatus::Exited(i32::try_from(code).unwrap_or(1))
    }
}

impl Drop for ShellSession {
    fn drop(&mut self) {
        let _ = self.writer.flush();
        let _ = self.child.kill();
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn config_defaults_describe_a_plain_terminal() {
        let config = ShellConfig::default();
        assert!(config.shell.is_none());
        assert_eq!((config.cols, config.rows), (80, 24));
        assert_eq!((config.pixel_width, config.pixel_height), (0, 0));
        assert_eq!(config.term, "vt100");
    }

    #[test]
    fn builder_chain_sets_every_field() {
        let config = ShellConfig::with_shell("/sbin/bash")
            .arg("-i")
            .size(95, 54)
            .pixel_size(960, 540)
            .env("SALVAGE_CONSOLE", "1")
            .cwd("/")
            .term("vt100");
        assert_eq!(config.shell, Some(PathBuf::from("/sbin/bash")));
        assert_eq!(config.args, vec!["-i"]);
        assert_eq!((config.cols, config.rows), (95, 54));
        assert_eq!((config.pixel_width, config.pixel_height), (960, 540));
        assert_eq!(config.env.get("SALVAGE_CONSOLE").map(String::as_str), Some("1"));
    }

    #[test]
    fn explicit_shell_wins_over_the_environment() {
        let config = ShellConfig::with_shell("/bin/dash");
        assert_eq!(config.resolve_shell(), PathBuf::from("/bin/dash"));
    }

    #[test]
    fn escape_frames_prefix_a_single_escape_byte() {
        assert_eq!(escape_frame(b"[A"), vec![0x1b, b'[', b'A']);
        assert_eq!(escape_frame(b"["), vec![0x1b, b'[']);
        assert_eq!(escape_frame(&[0x03]), vec![0x1b, 0x03]);
    }

    #[cfg(unix)]
    fn drain_until(
        rx: &mpsc::Receiver<OutputEvent>,
        needle: &[u8],
        timeout: Duration,
    ) -> Vec<u8> {
        let deadline = std::time::Instant::now() + timeout;
        let mut seen = Vec::new();
        while std::time::Instant::now() < deadline {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(OutputEvent::Data(chunk)) => {
                    seen.extend_from_slice(&chunk);
                    if seen.windows(needle.len()).any(|w| w == needle) {
                        break;
                    }
                }
                Ok(OutputEvent::Eof) | Ok(OutputEvent::Err(_)) | Err(_) => break,
            }
        }
        seen
    }

    #[cfg(unix)]
    #[test]
    fn spawn_round_trips_a_command() {
        let config = ShellConfig::with_shell("/bin/sh");
        let mut session = ShellSession::spawn(&config).expect("spawn");
        let rx = session.take_output().expect("output stream");

        assert!(session.is_alive());
        session.write_all(b"echo salvage-pty-check\n").expect("write");

        let seen = drain_until(&rx, b"salvage-pty-check", Duration::from_secs(5));
        assert!(
            seen.windows(b"salvage-pty-check".len())
                .any(|w| w == b"salvage-pty-check"),
            "missing echo in {:?}",
            String::from_utf8_lossy(&seen),
        );

        session.kill().expect("kill");
    }

    #[cfg(unix)]
    #[test]
    fn exit_reports_the_shell_code() {
        let config = ShellConfig::with_shell("/bin/sh");
        let mut session = ShellSession::spawn(&config).expect("spawn");
        let _rx = session.take_output();

        session.write_all(b"exit 0\n").expect("write");
        let status = session.wait().expect("wait");
        assert_eq!(status, ProcessStatus::Exited(0));
        assert!(!session.is_alive());
    }

    #[cfg(unix)]
    #[test]
    fn eof_follows_the_shell_going_away() {
        let config = ShellConfig::with_shell("/bin/sh");
        let mut session = ShellSession::spawn(&config).expect("spawn");
        let rx = session.take_output().expect("output stream");

        session.write_all(b"exit 0\n").expect("write");
        let _ = session.wait();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let mut saw_eof = false;
        while std::time::Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(OutputEvent::Eof) | Ok(OutputEvent::Err(_)) => {
                    saw_eof = true;
                    break;
                }
                Ok(OutputEvent::Data(_)) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    saw_eof = true;
                    break;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
            }
        }
        assert!(saw_eof, "reader never signalled eof");
    }

    #[cfg(unix)]
    #[test]
    fn kill_twice_is_fine() {
        let config = ShellConfig::with_shell("/bin/sh");
        let mut session = ShellSession::spawn(&config).expect("spawn");
        session.kill().expect("first kill");
        session.kill().expect("second kill");
    }

    #[cfg(unix)]
    #[test]
    fn missing_shell_fails_to_spawn() {
        let config = ShellConfig::with_shell("/nonexistent/shell");
        assert!(ShellSession::spawn(&config).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn output_stream_is_taken_once() {
        let config = ShellConfig::with_shell("/bin/sh");
        let mut session = ShellSession::spawn(&config).expect("spawn");
        assert!(session.take_output().is_some());
        assert!(session.take_output().is_none());
        session.kill().expect("kill");
    }
}
