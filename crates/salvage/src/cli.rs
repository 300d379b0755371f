use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::app;
use crate::error::{Result, SalvageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputBackend {
    /// Kernel event devices.
    Evdev,
    /// Line-oriented bridge for workstation runs.
    Stdin,
}

#[derive(Debug, Parser)]
#[command(
    name = "salvage",
    about = "Boot-time device rescue console",
    version
)]
pub struct Cli {
    /// Device profile to load.
    #[arg(long, default_value = "photon-q")]
    pub device: String,

    /// Print the built-in device profiles and exit.
    #[arg(long)]
    pub list_devices: bool,

    /// Shell for console sessions; defaults to $SHELL, then /bin/sh.
    #[arg(long)]
    pub shell: Option<PathBuf>,

    /// Directory holding the menu definition files.
    #[arg(long, default_value = "/menu")]
    pub menu_dir: PathBuf,

    /// Framebuffer size as WIDTHxHEIGHT.
    #[arg(long, default_value = "540x960")]
    pub fb_size: String,

    /// Where key events come from.
    #[arg(long, value_enum, default_value_t = InputBackend::Evdev)]
    pub input: InputBackend,

    /// Directory scanned for event devices.
    #[arg(long, default_value = "/dev/input")]
    pub input_dir: PathBuf,

    /// Start with the text log and menus hidden, as a scripted boot does.
    #[arg(long)]
    pub no_text: bool,

    /// Log filter directives, tracing EnvFilter syntax. RUST_LOG wins.
    #[arg(long, default_value = "info")]
    pub log: String,
}

pub fn run_from_env() -> Result<()> {
    app::run(Cli::parse())
}

/// Parses `WIDTHxHEIGHT`; both sides must be positive.
pub fn parse_fb_size(value: &str) -> Result<(u32, u32)> {
    let invalid = || SalvageError::InvalidFbSize {
        value: value.to_owned(),
    };
    let (width, height) = value.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_handset() {
        let cli = Cli::try_parse_from(["salvage"]).unwrap();
        assert_eq!(cli.device, "photon-q");
        assert_eq!(cli.menu_dir, PathBuf::from("/menu"));
        assert_eq!(cli.fb_size, "540x960");
        assert_eq!(cli.input, InputBackend::Evdev);
        assert!(!cli.no_text);
        assert!(cli.shell.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "salvage",
            "--device",
            "workstation",
            "--input",
            "stdin",
            "--shell",
            "/bin/bash",
            "--no-text",
        ])
        .unwrap();
        assert_eq!(cli.device, "workstation");
        assert_eq!(cli.input, InputBackend::Stdin);
        assert_eq!(cli.shell, Some(PathBuf::from("/bin/bash")));
        assert!(cli.no_text);
    }

    #[test]
    fn fb_size_parses_or_rejects() {
        assert_eq!(parse_fb_size("540x960").unwrap(), (540, 960));
        assert_eq!(parse_fb_size("1x1").unwrap(), (1, 1));
        assert!(parse_fb_size("540").is_err());
        assert!(parse_fb_size("540x").is_err());
        assert!(parse_fb_size("0x960").is_err());
        assert!(parse_fb_size("wide x tall").is_err());
    }
}
