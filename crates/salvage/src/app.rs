//! Service wiring and the top-level menu loop.

use std::path::Path;

use salvage_input::{InputSource, LayoutRegistry};
use salvage_render::HeadlessRenderer;
use salvage_ui::{ConsoleOutcome, Theme, Ui, UiParams};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{self, Cli, InputBackend};
use crate::devices;
use crate::error::{Result, SalvageError};
use crate::input_host::{EvdevSource, StdinSource};
use crate::menudef::{EntryKind, MenuFile};

/// Menu file opened at startup, relative to the menu directory.
pub const ROOT_MENU: &str = "init.menu";

/// Submenus deeper than this are ignored.
const MENU_STACK_MAX: usize = 50;

/// What the operator asked the loop to do with the machine on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Reboot,
    Poweroff,
}

pub fn run(cli: Cli) -> Result<()> {
    init_tracing(&cli.log);

    if cli.list_devices {
        for profile in devices::builtin_profiles() {
            println!("{:<14} {}", profile.id, profile.display_name);
        }
        return Ok(());
    }

    let (width, height) = cli::parse_fb_size(&cli.fb_size)?;
    let profile = devices::find(&cli.device).ok_or_else(|| SalvageError::UnknownDevice {
        id: cli.device.clone(),
    })?;
    info!(device = %profile.id, width, height, "starting salvage");

    let ui = Ui::new(
        Box::new(HeadlessRenderer::new(width, height)),
        profile,
        &LayoutRegistry::with_builtins(),
        UiParams::default(),
        Theme::default(),
    )?;

    let source: Box<dyn InputSource> = match cli.input {
        InputBackend::Evdev => Box::new(EvdevSource::open(&cli.input_dir)?),
        InputBackend::Stdin => Box::new(StdinSource::new()),
    };
    ui.start_tasks(source);
    if cli.no_text {
        ui.compositor().show_text(false);
    }

    match menu_loop(&ui, &cli.menu_dir, cli.shell.as_deref())? {
        PowerAction::Reboot => {
            ui.print("Rebooting...\n");
            info!("reboot requested");
        }
        PowerAction::Poweroff => {
            ui.print("Powering off...\n");
            info!("power off requested");
        }
    }
    Ok(())
}

struct MenuLevel {
    file: String,
    saved_selection: usize,
}

/// Runs menus until a power action is chosen.
///
/// Submenus form a stack: entering one pushes a level, a `..` target pops
/// back and restores the parent's highlighted row. Console entries reload
/// the current file afterwards, so a session can rewrite the menu it was
/// launched from.
fn menu_loop(ui: &Ui, menu_dir: &Path, shell: Option<&Path>) -> Result<PowerAction> {
    let title_block = title_block(ui.device_name());
    let columns = ui.compositor().columns();

    let mut stack = vec![MenuLevel {
        file: ROOT_MENU.to_owned(),
        saved_selection: 0,
    }];
    let mut current = load_level(menu_dir, ROOT_MENU, columns)?;
    let mut initial = 0usize;

    loop {
        let spec = current.spec(&title_block, initial, false);
        initial = 0;
        let picked = ui.menu(&spec);
        let Some(entry) = current.entries.get(picked) else {
            ui.end_menu();
            error!(index = picked, "selection outside the menu");
            continue;
        };
        debug!(index = picked, action = %entry.action, "menu choice");

        match entry.kind {
            EntryKind::Reboot => {
                ui.end_menu();
                return Ok(PowerAction::Reboot);
            }
            EntryKind::Poweroff => {
                ui.end_menu();
                return Ok(PowerAction::Poweroff);
            }
            EntryKind::Console => {
                ui.end_menu();
                ui.print("Opening console...\n");
                match ui.console(shell) {
                    ConsoleOutcome::ForceQuit => ui.print("Console was forcibly closed.\n"),
                    ConsoleOutcome::FailedStart => ui.print("Console failed to start.\n"),
                    ConsoleOutcome::Exited(code) => {
                        if code != 0 {
                            warn!(code, "console exited abnormally");
                        }
                        ui.print("Closing console...\n");
                    }
                }
                if let Some(level) = stack.last() {
                    match load_level(menu_dir, &level.file, columns) {
                        Ok(menu) => current = menu,
                        Err(err) => warn!(error = %err, "keeping stale menu"),
                    }
                }
                initial = picked;
            }
            EntryKind::Submenu if entry.target == ".." => {
                if stack.len() < 2 {
                    continue;
                }
                let Some(child) = stack.pop() else { continue };
                let (parent_file, parent_sel) = match stack.last() {
                    Some(level) => (level.file.clone(), level.saved_selection),
                    None => continue,
                };
                match load_level(menu_dir, &parent_file, columns) {
                    Ok(menu) => {
                        initial = parent_sel;
                        current = menu;
                    }
                    Err(err) => {
                        error!(error = %err, "parent menu vanished");
                        stack.push(child);
                    }
                }
            }
            EntryKind::Submenu => {
                if stack.len() >= MENU_STACK_MAX {
                    warn!("menu stack full");
                    continue;
                }
                match load_level(menu_dir, &entry.target, columns) {
                    Ok(menu) => {
                        let target = entry.target.clone();
                        if let Some(level) = stack.last_mut() {
                            level.saved_selection = picked;
                        }
                        stack.push(MenuLevel {
                            file: target,
                            saved_selection: 0,
                        });
                        current = menu;
                    }
                    Err(err) => warn!(error = %err, "submenu failed to load"),
                }
            }
            EntryKind::Rule | EntryKind::Caption | EntryKind::Unknown => {
                error!(action = %entry.action, "unknown menu action");
                initial = picked;
            }
        }
    }
}

fn load_level(menu_dir: &Path, file: &str, columns: usize) -> Result<MenuFile> {
    let path = menu_dir.join(file);
    let menu = MenuFile::load(&path, columns).map_err(|source| SalvageError::MenuLoad {
        path: path.clone(),
        source,
    })?;
    if menu.entries.is_empty() {
        return Err(SalvageError::MenuEmpty { path });
    }
    Ok(menu)
}

/// Header rows drawn above every menu, in the title color.
fn title_block(device_name: &str) -> Vec<String> {
    vec![
        format!("{device_name} Salvage"),
        format!("Version {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        "Use arrow keys to highlight; enter to select.".to_owned(),
        String::new(),
    ]
}

fn init_tracing(directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use salvage_input::{DeviceProfile, RawKey, keycodes};
    use salvage_render::RecordingRenderer;

    use super::*;

    fn build_ui() -> Ui {
        Ui::new(
            Box::new(RecordingRenderer::new(540, 960)),
            DeviceProfile::new("test", "Test Device", "qwerty-slider"),
            &LayoutRegistry::with_builtins(),
            UiParams::default(),
            Theme::default(),
        )
        .unwrap()
    }

    /// Each menu clears the key queue when it opens, so the script spaces
    /// keys out: `(gap_ms, key)` sleeps then injects.
    fn drive(ui: &Ui, script: &[(u64, RawKey)]) -> thread::JoinHandle<()> {
        let queue = Arc::clone(ui.queue());
        let script = script.to_vec();
        thread::spawn(move || {
            for (gap, code) in script {
                thread::sleep(Duration::from_millis(gap));
                queue.inject(code);
            }
        })
    }

    fn write_menu(dir: &Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn reboot_entry_ends_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        write_menu(dir.path(), ROOT_MENU, "Main\nReboot:reboot:*\n");
        let ui = build_ui();
        let driver = drive(&ui, &[(250, keycodes::KEY_ENTER)]);
        let action = menu_loop(&ui, dir.path(), None).unwrap();
        driver.join().unwrap();
        assert_eq!(action, PowerAction::Reboot);
    }

    #[test]
    fn submenu_descends_and_back_restores_selection() {
        let dir = tempfile::tempdir().unwrap();
        write_menu(
            dir.path(),
            ROOT_MENU,
            "Main\nTools:menu:tools.menu\nPower off:poweroff:*\n",
        );
        write_menu(dir.path(), "tools.menu", "Tools\nBack:menu:..\n");
        let ui = build_ui();
        let driver = drive(
            &ui,
            &[
                (250, keycodes::KEY_ENTER), // into Tools
                (250, keycodes::KEY_ENTER), // back out
                (250, keycodes::KEY_DOWN),  // down from the restored row
                (30, keycodes::KEY_ENTER),  // Power off
            ],
        );
        let action = menu_loop(&ui, dir.path(), None).unwrap();
        driver.join().unwrap();
        assert_eq!(action, PowerAction::Poweroff);
    }

    #[test]
    fn unknown_actions_report_and_reprompt() {
        let dir = tempfile::tempdir().unwrap();
        write_menu(
            dir.path(),
            ROOT_MENU,
            "Main\nFrob:frobnicate:*\nReboot:reboot:*\n",
        );
        let ui = build_ui();
        let driver = drive(
            &ui,
            &[
                (250, keycodes::KEY_ENTER), // frobnicate, rejected
                (250, keycodes::KEY_DOWN),
                (30, keycodes::KEY_ENTER), // reboot
            ],
        );
        let action = menu_loop(&ui, dir.path(), None).unwrap();
        driver.join().unwrap();
        assert_eq!(action, PowerAction::Reboot);
    }

    #[test]
    fn missing_root_menu_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ui = build_ui();
        let err = menu_loop(&ui, dir.path(), None).unwrap_err();
        assert!(matches!(err, SalvageError::MenuLoad { .. }));
    }

    #[test]
    fn itemless_root_menu_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_menu(dir.path(), ROOT_MENU, "Main\n# just a title\n");
        let ui = build_ui();
        let err = menu_loop(&ui, dir.path(), None).unwrap_err();
        assert!(matches!(err, SalvageError::MenuEmpty { .. }));
    }

    #[test]
    fn title_block_carries_name_and_version() {
        let block = title_block("Photon Q");
        assert_eq!(block[0], "Photon Q Salvage");
        assert!(block[1].starts_with("Version "));
        assert_eq!(block.len(), 5);
    }
}
