//! Where raw events come from.
//!
//! On a device this is an evdev reader, on a development host a stdin
//! bridge, in tests a scripted sequence. The reader thread pulls events
//! until the source runs dry and feeds them through the dispatcher.

use std::collections::VecDeque;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::dispatch::InputDispatcher;
use crate::event::InputEvent;

/// A blocking stream of input events.
///
/// `next_event` returns `None` once the source is exhausted or its
/// backing device goes away, which ends the reader thread.
pub trait InputSource: Send {
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// Canned event sequence for tests and demos.
pub struct ScriptedSource {
    events: VecDeque<InputEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedSource {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

/// Drains `source` into the dispatcher on a background thread.
pub fn spawn_input_task(
    mut source: Box<dyn InputSource>,
    mut dispatcher: InputDispatcher,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("input-reader".into())
        .spawn(move || {
            while let Some(event) = source.next_event() {
                dispatcher.handle(event);
            }
            debug!("input source closed");
        })
        .expect("spawn input reader")
}
