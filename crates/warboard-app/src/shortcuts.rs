//! Keyboard shortcut registry and documentation.

use warboard_core::Key;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, description: &'static str) -> Self {
        Self { key, description }
    }

    /// The key this shortcut responds to.
    pub fn binding(&self) -> Key {
        Key::from_name(self.key)
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete", "Delete selected shape"),
            Shortcut::new("Backspace", "Delete selected shape"),
            Shortcut::new("Escape", "Deselect shape"),
        ]
    }

    /// Description of the shortcut bound to `key`, if any.
    pub fn describe(key: &Key) -> Option<&'static str> {
        Self::all()
            .into_iter()
            .find(|s| &s.binding() == key)
            .map(|s| s.description)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.key, shortcut.description);
        }
        println!();
    }
}
