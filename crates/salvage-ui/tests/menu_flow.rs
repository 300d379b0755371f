//! End-to-end flows through the public `Ui` surface: a scrolling menu
//! driven by scripted keys, and (on unix) a real shell console session.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use salvage_input::{DeviceProfile, LayoutRegistry, RawKey, keycodes};
use salvage_render::{Op, RecordingRenderer};
use salvage_ui::{BatteryReadout, MenuSpec, Theme, Ui, UiParams, ViewMode};

fn build_ui() -> (Ui, RecordingRenderer) {
    let renderer = RecordingRenderer::new(540, 960);
    let profile = DeviceProfile::new("test", "Test Device", "qwerty-slider");
    let ui = Ui::new(
        Box::new(renderer.clone()),
        profile,
        &LayoutRegistry::with_builtins(),
        UiParams::default(),
        Theme::default(),
    )
    .expect("build ui");
    (ui, renderer)
}

/// Menus and the console clear the key queue when they open, so scripted
/// keys have to arrive after the prompt is already waiting.
fn press_later(ui: &Ui, delay: Duration, codes: &[RawKey]) -> thread::JoinHandle<()> {
    let queue = Arc::clone(ui.queue());
    let codes = codes.to_vec();
    thread::spawn(move || {
        thread::sleep(delay);
        for code in codes {
            queue.inject(code);
        }
    })
}

#[test]
fn long_menu_scrolls_and_shows_battery_in_the_title() {
    let (ui, renderer) = build_ui();
    ui.compositor().set_battery(BatteryReadout {
        charge: 57,
        charging: false,
    });

    let items: Vec<String> = (0..40).map(|n| format!("option {n:02}")).collect();
    let spec = MenuSpec {
        headers: vec!["Recovery Menu".to_owned(), String::new()],
        items,
        selectable: vec![true; 40],
        title_rows: 1,
        initial: 0,
        menu_only: true,
    };

    let driver = press_later(
        &ui,
        Duration::from_millis(50),
        &[keycodes::KEY_DOWN, keycodes::KEY_DOWN, keycodes::KEY_ENTER],
    );
    let picked = ui.menu(&spec);
    driver.join().expect("driver thread");
    assert_eq!(picked, 2);

    // 540px wide at a 10px font leaves 54 columns; the battery readout is
    // right-aligned into the title row.
    let title = renderer
        .texts()
        .into_iter()
        .find(|t| t.starts_with("Recovery Menu"))
        .expect("title row drawn");
    assert_eq!(title.chars().count(), 54);
    assert!(title.ends_with("57% "));

    // 40 items against 33 visible rows puts a scrollbar on the right
    // edge: a track fill and a thumb fill, both one cell wide at x 530.
    let edge_fills = renderer
        .ops()
        .iter()
        .filter(|op| {
            matches!(op, Op::Fill { rect, .. } if rect.x == 530 && rect.width == 10)
        })
        .count();
    assert!(edge_fills >= 2, "expected track and thumb, got {edge_fills}");

    ui.end_menu();
}

#[test]
fn menu_selection_repaints_each_move() {
    let (ui, renderer) = build_ui();
    let spec = MenuSpec {
        headers: vec!["Moves".to_owned(), String::new()],
        items: vec!["one".to_owned(), "two".to_owned(), "three".to_owned()],
        selectable: vec![true; 3],
        title_rows: 1,
        initial: 0,
        menu_only: true,
    };

    let driver = press_later(
        &ui,
        Duration::from_millis(50),
        &[keycodes::KEY_DOWN, keycodes::KEY_UP, keycodes::KEY_ENTER],
    );
    let before = renderer.flips();
    let picked = ui.menu(&spec);
    driver.join().expect("driver thread");
    assert_eq!(picked, 0);
    // one flip to open the menu plus one per highlight move
    assert!(renderer.flips() - before >= 3);
    ui.end_menu();
}

#[cfg(unix)]
mod console {
    use super::*;
    use std::path::Path;

    use salvage_ui::ConsoleOutcome;

    #[test]
    fn shell_session_runs_until_exit() {
        let (ui, _renderer) = build_ui();
        let driver = press_later(
            &ui,
            Duration::from_millis(400),
            &[
                keycodes::KEY_E,
                keycodes::KEY_X,
                keycodes::KEY_I,
                keycodes::KEY_T,
                keycodes::KEY_ENTER,
            ],
        );
        let outcome = ui.console(Some(Path::new("/bin/sh")));
        driver.join().expect("driver thread");
        assert_eq!(outcome, ConsoleOutcome::Exited(0));
        assert_eq!(ui.compositor().view_mode(), ViewMode::Normal);
        assert!(ui.compositor().with_console(|_| ()).is_none());
    }

    #[test]
    fn holding_both_chord_keys_force_quits_the_shell() {
        let (ui, _renderer) = build_ui();
        let queue = Arc::clone(ui.queue());
        let driver = thread::spawn(move || {
            thread::sleep(Duration::from_millis(400));
            queue.push_event(keycodes::KEY_APOSTROPHE, 1);
            queue.push_event(keycodes::KEY_BACKSPACE, 1);
        });
        let outcome = ui.console(Some(Path::new("/bin/sh")));
        driver.join().expect("driver thread");
        assert_eq!(outcome, ConsoleOutcome::ForceQuit);
        assert_eq!(ui.compositor().view_mode(), ViewMode::Normal);
    }
}
