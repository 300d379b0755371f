//! Menu definition files.
//!
//! A menu is plain text. Lines starting with `#` are comments, the first
//! remaining line is the menu title, and every later line that carries two
//! colons is an item:
//!
//! ```text
//! Main Menu
//! Open console:console:*
//! Tools:menu:tools.menu
//! *:break:*
//! Maintenance:label:*
//! Reboot:reboot:*
//! ```
//!
//! A `*` label means empty. `break` renders as a dashed rule and `label`
//! as a caption; neither can be highlighted. Malformed lines are logged
//! and dropped rather than failing the whole file.

use std::fs;
use std::io;
use std::path::Path;

use salvage_ui::MenuSpec;
use tracing::{debug, warn};

/// Items past this count are ignored.
pub const MAX_ITEMS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Reboot,
    Poweroff,
    Console,
    Submenu,
    Rule,
    Caption,
    Unknown,
}

impl EntryKind {
    fn from_action(action: &str) -> Self {
        match action {
            "reboot" => Self::Reboot,
            "poweroff" => Self::Poweroff,
            "console" => Self::Console,
            "menu" => Self::Submenu,
            "break" => Self::Rule,
            "label" => Self::Caption,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub label: String,
    pub kind: EntryKind,
    /// Action name as written, kept for diagnostics on unknown kinds.
    pub action: String,
    pub target: String,
}

impl MenuEntry {
    #[must_use]
    pub fn selectable(&self) -> bool {
        !matches!(self.kind, EntryKind::Rule | EntryKind::Caption)
    }
}

/// One parsed menu file.
#[derive(Debug, Clone)]
pub struct MenuFile {
    pub title: String,
    pub entries: Vec<MenuEntry>,
}

impl MenuFile {
    /// Reads and parses `path`. `columns` sizes the dashed rules.
    pub fn load(path: &Path, columns: usize) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading menu");
        Ok(Self::parse(&text, columns))
    }

    /// Parses menu text. Never fails; bad lines are skipped.
    #[must_use]
    pub fn parse(text: &str, columns: usize) -> Self {
        let mut title = None;
        let mut entries = Vec::new();

        for line in text.lines() {
            if entries.len() >= MAX_ITEMS {
                break;
            }
            if line.starts_with('#') {
                continue;
            }
            if title.is_none() {
                let head = line.trim_end();
                if head.is_empty() {
                    continue;
                }
                title = Some(head.to_owned());
                continue;
            }
            if let Some(entry) = parse_item(line, columns) {
                entries.push(entry);
            }
        }

        Self {
            title: title.unwrap_or_default(),
            entries,
        }
    }

    /// Builds the drawable menu: the shared title block, then this menu's
    /// own header pair, then the items.
    #[must_use]
    pub fn spec(&self, title_block: &[String], initial: usize, menu_only: bool) -> MenuSpec {
        let title_rows = title_block.len();
        let mut headers = title_block.to_vec();
        headers.push(self.title.clone());
        headers.push(String::new());
        MenuSpec {
            headers,
            items: self.entries.iter().map(|e| e.label.clone()).collect(),
            selectable: self.entries.iter().map(MenuEntry::selectable).collect(),
            title_rows,
            initial,
            menu_only,
        }
    }
}

/// One `label:action:target` line. The target runs to end of line, so it
/// may itself contain colons.
fn parse_item(line: &str, columns: usize) -> Option<MenuEntry> {
    if !line.contains(':') {
        return None;
    }
    let mut parts = line.splitn(3, ':');
    let label = parts.next().unwrap_or_default();
    let action = parts.next().unwrap_or_default();
    let target = parts
        .next()
        .unwrap_or_default()
        .trim_end_matches([' ', '\r']);
    if label.is_empty() || action.is_empty() || target.is_empty() {
        warn!(line, "dropping malformed menu line");
        return None;
    }

    let label = if label == "*" { "" } else { label };
    let kind = EntryKind::from_action(action);
    let label = match kind {
        EntryKind::Rule => rule_row(label, columns),
        _ => label.to_owned(),
    };
    Some(MenuEntry {
        label,
        kind,
        action: action.to_owned(),
        target: target.to_owned(),
    })
}

/// A dashed separator row, `columns` characters wide. An empty label fills
/// the whole row; otherwise the label sits centered between dashes.
fn rule_row(label: &str, columns: usize) -> String {
    if label.is_empty() {
        return "-".repeat(columns);
    }
    let cap = columns.saturating_sub(4);
    let label: String = label.chars().take(cap).collect();
    let len = label.chars().count();
    let lead = columns.saturating_sub(len + 2) / 2;

    let mut row = String::with_capacity(columns);
    for _ in 0..lead {
        row.push('-');
    }
    row.push(' ');
    row.push_str(&label);
    row.push(' ');
    for _ in lead + len + 2..columns {
        row.push('-');
    }
    row
}
