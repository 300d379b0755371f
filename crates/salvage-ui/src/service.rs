//! Device wiring and the blocking interactive flows.
//!
//! [`Ui`] assembles one device's services around the compositor: key
//! queue, keyboard layout, modifier latches, LED, screen power, idle
//! countdown, and the USB cable probe. Construction resolves the
//! profile's sysfs paths into concrete backends, every one of them
//! optional so the same binary runs against a headless renderer on a
//! workstation. The interactive entry points block the calling thread;
//! background tasks keep the screen honest in the meantime.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use salvage_input::{
    DeviceProfile, InputDispatcher, InputSource, KeyQueue, KeyboardLayout, Latches,
    LayoutRegistry, Modifiers, UsbProbe, WaitOutcome, spawn_input_task, spawn_repeat_task,
};
use salvage_input::{FixedProbe, SysfsUsbProbe};
use salvage_render::Renderer;
use thiserror::Error;
use tracing::{debug, info};

use crate::assets::UiParams;
use crate::battery::{BatterySource, SysfsBattery, spawn_battery_task};
use crate::compositor::Compositor;
use crate::console::{self, ConsoleOutcome};
use crate::idle::IdleTimer;
use crate::led::{LedController, LedSink, NullLedSink, SysfsLedSink, spawn_led_task};
use crate::menu::{MenuNav, MenuSpec, initial_selection, nav_for_key, next_selectable};
use crate::power::ScreenPower;
use crate::progress::spawn_progress_task;
use crate::text_input;
use crate::theme::Theme;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("unknown keyboard layout {name:?}")]
    UnknownLayout { name: String },
}

/// One device's interactive services.
pub struct Ui {
    compositor: Arc<Compositor>,
    queue: Arc<KeyQueue>,
    layout: Arc<KeyboardLayout>,
    profile: Arc<DeviceProfile>,
    latches: Mutex<Latches>,
    led: Arc<LedController>,
    power: Arc<Mutex<ScreenPower>>,
    idle: Arc<Mutex<IdleTimer>>,
    usb: Arc<dyn UsbProbe>,
    led_sink: Mutex<Option<Box<dyn LedSink>>>,
    battery_source: Mutex<Option<Box<dyn BatterySource>>>,
}

impl Ui {
    /// Builds the service stack for `profile`. Sysfs paths the profile
    /// leaves unset become no-op backends.
    pub fn new(
        renderer: Box<dyn Renderer>,
        profile: DeviceProfile,
        layouts: &LayoutRegistry,
        params: UiParams,
        theme: Theme,
    ) -> Result<Self, UiError> {
        let layout = layouts
            .get(&profile.layout)
            .ok_or_else(|| UiError::UnknownLayout {
                name: profile.layout.clone(),
            })?;
        let compositor = Arc::new(Compositor::new(
            renderer,
            params,
            theme,
            profile.landscape_console,
        ));
        let usb: Arc<dyn UsbProbe> = match &profile.paths.usb_state {
            Some(path) => Arc::new(SysfsUsbProbe::new(path)),
            None => Arc::new(FixedProbe(false)),
        };
        let led_sink: Box<dyn LedSink> = match &profile.paths.led_rgb {
            Some(channels) => Box::new(SysfsLedSink::new(channels.clone())),
            None => Box::new(NullLedSink),
        };
        let battery_source: Option<Box<dyn BatterySource>> =
            match (&profile.paths.battery_charge, &profile.paths.battery_status) {
                (Some(charge), Some(status)) => Some(Box::new(SysfsBattery::new(charge, status))),
                _ => None,
            };
        let power = ScreenPower::new(&profile.paths);
        let latches = Latches::new(profile.paths.caps_indicator.clone());
        let led = Arc::new(LedController::new(theme.led));
        info!(device = %profile.id, layout = %profile.layout, "ui assembled");
        Ok(Self {
            compositor,
            queue: Arc::new(KeyQueue::new()),
            layout,
            profile: Arc::new(profile),
            latches: Mutex::new(latches),
            led,
            power: Arc::new(Mutex::new(power)),
            idle: Arc::new(Mutex::new(IdleTimer::default())),
            usb,
            led_sink: Mutex::new(Some(led_sink)),
            battery_source: Mutex::new(battery_source),
        })
    }

    /// Swaps the cable probe, mainly for tests.
    #[must_use]
    pub fn with_usb_probe(mut self, probe: Box<dyn UsbProbe>) -> Self {
        self.usb = Arc::from(probe);
        self
    }

    /// Swaps the battery backend, mainly for tests.
    #[must_use]
    pub fn with_battery_source(self, source: Box<dyn BatterySource>) -> Self {
        *self.lock_staged(&self.battery_source) = Some(source);
        self
    }

    /// Swaps the LED backend, mainly for tests.
    #[must_use]
    pub fn with_led_sink(self, sink: Box<dyn LedSink>) -> Self {
        *self.lock_staged(&self.led_sink) = Some(sink);
        self
    }

    /// Spawns the persistent background tasks and turns the screen on.
    /// Call once; the tasks run for the life of the process.
    pub fn start_tasks(&self, input: Box<dyn InputSource>) {
        self.lock_power().on();
        spawn_input_task(input, InputDispatcher::new(Arc::clone(&self.queue)));
        spawn_repeat_task(Arc::clone(&self.queue), Arc::clone(&self.profile));
        spawn_progress_task(Arc::clone(&self.compositor));
        if let Some(sink) = self.lock_staged(&self.led_sink).take() {
            spawn_led_task(Arc::clone(&self.led), sink);
        }
        if let Some(source) = self.lock_staged(&self.battery_source).take() {
            spawn_battery_task(
                Arc::clone(&self.compositor),
                Arc::clone(&self.power),
                Arc::clone(&self.idle),
                source,
            );
        }
    }

    /// Runs one menu to a choice and returns the chosen item index.
    ///
    /// Blocks on the key queue with the idle countdown armed; when the
    /// countdown has darkened the screen, the next key only wakes it.
    /// Keys outside the navigation set fire the profile's direct
    /// actions unless `menu_only` is set. The menu stays on screen
    /// after return so the caller can redraw or hide it.
    pub fn menu(&self, spec: &MenuSpec) -> usize {
        self.queue.clear();
        let count = spec.items.len();
        if count == 0 {
            debug!("menu with no items");
            return 0;
        }
        let start = initial_selection(&spec.selectable, spec.initial);
        self.compositor
            .start_menu(&spec.headers, &spec.items, spec.title_rows, start);
        let mut selected = start;
        let mut timed_out = false;
        loop {
            if timed_out {
                timed_out = false;
            } else {
                self.lock_idle().arm();
            }
            let code = match self.queue.wait_key(self.usb.as_ref()) {
                WaitOutcome::Key(code) => code,
                WaitOutcome::TimedOut | WaitOutcome::Interrupted => {
                    timed_out = true;
                    continue;
                }
            };
            if self.lock_idle().screen_is_off() {
                self.lock_power().on();
                continue;
            }
            self.lock_idle().disarm();

            let visible = self.compositor.text_visible();
            match nav_for_key(code, visible) {
                MenuNav::HighlightUp => {
                    let next = next_selectable(&spec.selectable, selected, false);
                    selected = self.compositor.menu_select(next);
                }
                MenuNav::HighlightDown => {
                    let next = next_selectable(&spec.selectable, selected, true);
                    selected = self.compositor.menu_select(next);
                }
                MenuNav::Select => {
                    debug!(selected, "menu select");
                    return selected;
                }
                MenuNav::None => {
                    if !spec.menu_only {
                        if let Some(action) = self.profile.direct_action(code) {
                            debug!(code, action, "direct menu action");
                            return action;
                        }
                    }
                }
            }
        }
    }

    /// Hides the menu block, leaving the log.
    pub fn end_menu(&self) {
        self.compositor.end_menu();
    }

    /// Runs an interactive shell session until it ends.
    pub fn console(&self, shell: Option<&Path>) -> ConsoleOutcome {
        console::run(self, shell)
    }

    /// Prompts for a line of text; empty is a valid answer.
    pub fn text_input(&self, header: &str) -> String {
        text_input::run(self, header)
    }

    /// Appends to the log.
    pub fn print(&self, text: &str) {
        self.compositor.print(text);
    }

    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub(crate) fn compositor_arc(&self) -> &Arc<Compositor> {
        &self.compositor
    }

    #[must_use]
    pub fn queue(&self) -> &Arc<KeyQueue> {
        &self.queue
    }

    #[must_use]
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.profile.display_name
    }

    pub(crate) fn usb(&self) -> &dyn UsbProbe {
        self.usb.as_ref()
    }

    pub(crate) fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub(crate) fn led(&self) -> &Arc<LedController> {
        &self.led
    }

    pub(crate) fn caps_latched(&self) -> bool {
        self.lock_latches().caps()
    }

    pub(crate) fn toggle_caps_latch(&self) {
        self.lock_latches().toggle_caps();
    }

    pub(crate) fn toggle_alt_latch(&self) {
        self.lock_latches().toggle_alt();
    }

    pub(crate) fn clear_latches(&self) {
        self.lock_latches().clear();
    }

    pub(crate) fn latched_modifiers(&self, shift_held: bool, alt_held: bool) -> Modifiers {
        self.lock_latches().modifiers(shift_held, alt_held)
    }

    fn lock_latches(&self) -> MutexGuard<'_, Latches> {
        self.latches.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_power(&self) -> MutexGuard<'_, ScreenPower> {
        self.power.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_idle(&self) -> MutexGuard<'_, IdleTimer> {
        self.idle.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_staged<'a, T>(&self, staged: &'a Mutex<Option<T>>) -> MutexGuard<'a, Option<T>> {
        staged.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    use salvage_input::{RawKey, keycodes};
    use salvage_render::RecordingRenderer;

    fn test_ui() -> (Ui, RecordingRenderer) {
        let renderer = RecordingRenderer::new(540, 960);
        let profile = DeviceProfile::new("test", "Test Device", "qwerty-slider");
        let ui = Ui::new(
            Box::new(renderer.clone()),
            profile,
            &LayoutRegistry::with_builtins(),
            UiParams::default(),
            Theme::default(),
        )
        .unwrap();
        (ui, renderer)
    }

    /// The menu loop clears the queue on entry, so scripted keys have
    /// to arrive once it is already blocking.
    fn inject_later(ui: &Ui, codes: &[RawKey]) {
        let queue = Arc::clone(ui.queue());
        let codes = codes.to_vec();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            for code in codes {
                queue.inject(code);
            }
        });
    }

    fn spec(items: &[(&str, bool)]) -> MenuSpec {
        MenuSpec {
            headers: vec!["Test Menu".to_owned(), String::new()],
            items: items.iter().map(|(label, _)| (*label).to_owned()).collect(),
            selectable: items.iter().map(|(_, sel)| *sel).collect(),
            title_rows: 1,
            initial: 0,
            menu_only: true,
        }
    }

    #[test]
    fn menu_walks_past_captions_to_the_choice() {
        let (ui, _renderer) = test_ui();
        inject_later(&ui, &[keycodes::KEY_DOWN, keycodes::KEY_ENTER]);
        let spec = spec(&[("alpha", true), ("--- more ---", false), ("beta", true)]);
        assert_eq!(ui.menu(&spec), 2);
    }

    #[test]
    fn menu_wraps_upward_from_the_top() {
        let (ui, _renderer) = test_ui();
        inject_later(&ui, &[keycodes::KEY_UP, keycodes::KEY_ENTER]);
        let spec = spec(&[("alpha", true), ("beta", true), ("gamma", true)]);
        assert_eq!(ui.menu(&spec), 2);
    }

    #[test]
    fn a_caption_start_rolls_forward() {
        let (ui, _renderer) = test_ui();
        inject_later(&ui, &[keycodes::KEY_ENTER]);
        let spec = spec(&[("--- section ---", false), ("alpha", true)]);
        assert_eq!(ui.menu(&spec), 1);
    }

    #[test]
    fn direct_actions_fire_unless_menu_only() {
        let (mut profile_ui, _renderer) = test_ui();
        {
            let profile = Arc::get_mut(&mut profile_ui.profile).unwrap();
            profile.direct_actions.insert(keycodes::KEY_P, 1);
        }
        let mut menu = spec(&[("alpha", true), ("beta", true)]);
        menu.menu_only = false;
        inject_later(&profile_ui, &[keycodes::KEY_P]);
        assert_eq!(profile_ui.menu(&menu), 1);

        menu.menu_only = true;
        inject_later(&profile_ui, &[keycodes::KEY_P, keycodes::KEY_ENTER]);
        assert_eq!(profile_ui.menu(&menu), 0);
    }

    #[test]
    fn an_empty_menu_returns_immediately() {
        let (ui, _renderer) = test_ui();
        let spec = MenuSpec::default();
        assert_eq!(ui.menu(&spec), 0);
    }

    #[test]
    fn an_unknown_layout_is_rejected() {
        let renderer = RecordingRenderer::new(100, 100);
        let profile = DeviceProfile::new("test", "Test", "dvorak-imaginary");
        let err = Ui::new(
            Box::new(renderer),
            profile,
            &LayoutRegistry::with_builtins(),
            UiParams::default(),
            Theme::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, UiError::UnknownLayout { .. }));
    }

    #[test]
    fn text_input_types_edits_and_commits() {
        let (ui, renderer) = test_ui();
        for code in [
            keycodes::KEY_H,
            keycodes::KEY_I,
            keycodes::KEY_X,
            keycodes::KEY_BACKSPACE,
            keycodes::KEY_ENTER,
        ] {
            ui.queue().inject(code);
        }
        assert_eq!(ui.text_input("Name:"), "hi");
        assert!(renderer.texts().iter().any(|t| t.starts_with("hi_")));
    }

    #[test]
    fn caps_latch_shifts_typed_letters_and_clears() {
        let (ui, _renderer) = test_ui();
        for code in [
            keycodes::KEY_CAPSLOCK,
            keycodes::KEY_A,
            keycodes::KEY_ENTER,
        ] {
            ui.queue().inject(code);
        }
        assert_eq!(ui.text_input("Label:"), "A");
        assert!(!ui.caps_latched());
    }
}
