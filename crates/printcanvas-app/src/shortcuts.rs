//! Keyboard shortcut registry and documentation.

use crate::actions::EditAction;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: EditAction,
}

impl Shortcut {
    pub fn new(key: &'static str, ctrl: bool, shift: bool, action: EditAction) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of editor keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, EditAction::Undo),
            Shortcut::new("Z", true, true, EditAction::Redo),
            Shortcut::new("Y", true, false, EditAction::Redo),
            Shortcut::new("S", true, false, EditAction::MarkSaved),
            Shortcut::new("+", false, false, EditAction::ZoomIn),
            Shortcut::new("-", false, false, EditAction::ZoomOut),
            Shortcut::new("[", false, false, EditAction::RotateLeft),
            Shortcut::new("]", false, false, EditAction::RotateRight),
            Shortcut::new("H", false, false, EditAction::FlipX),
            Shortcut::new("V", false, false, EditAction::FlipY),
            Shortcut::new("Delete", true, true, EditAction::Reset),
        ]
    }

    /// Action bound to a key combination, if any.
    pub fn find(key: &str, ctrl: bool, shift: bool) -> Option<EditAction> {
        Self::all()
            .into_iter()
            .find(|s| s.key.eq_ignore_ascii_case(key) && s.ctrl == ctrl && s.shift == shift)
            .map(|s| s.action)
    }

    /// All shortcuts as a printable table.
    pub fn describe() -> String {
        let mut out = String::from("Keyboard shortcuts\n");
        for shortcut in Self::all() {
            out.push_str(&format!("  {:20} {}\n", shortcut.format(), shortcut.action.label()));
        }
        out
    }
}
