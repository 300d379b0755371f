#![forbid(unsafe_code)]
//! Scrollback console engine for the recovery UI.
//!
//! The [`Console`] consumes raw shell output one chunk at a time, keeps a
//! fixed 1024-row scrollback [`Grid`], tracks the cursor, and interprets
//! the small escape-sequence dialect recovery shells actually emit: cursor
//! movement, erase, and foreground color. Anything it does not recognize
//! is echoed visibly with a caret so broken output stays debuggable.
//!
//! The engine is pure state: it never draws and never sleeps. A renderer
//! reads the grid through [`Console::grid`] and the view window through
//! [`Console::top_row`]; timing concerns such as cursor blink live with
//! the caller.

pub mod cell;
pub mod console;
pub mod grid;
pub mod palette;
pub mod parser;

pub use cell::Cell;
pub use console::{Console, FeedEffects};
pub use grid::{Grid, SHIFT_ROWS, TOTAL_ROWS};
pub use palette::{ANSI_PALETTE, DEFAULT_FRONT, indexed};
pub use parser::{EscapeParser, MAX_SEQUENCE, Sequence};
