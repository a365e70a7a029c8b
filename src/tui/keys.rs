use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub label: &'static str,
    pub description: &'static str,
}

impl KeyBinding {
    pub const fn new(
        key: KeyCode,
        modifiers: KeyModifiers,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            modifiers,
            label,
            description,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && self.modifiers == event.modifiers
    }
}

/// Application-wide key mappings; everything else goes to the page or dialog
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: KeyBinding,
    pub help: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL, "Ctrl+C", "Quit"),
            help: KeyBinding::new(KeyCode::Char('g'), KeyModifiers::CONTROL, "Ctrl+G", "Help"),
        }
    }
}

impl KeyMap {
    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event)
    }

    /// Check if the event should show help
    pub fn should_show_help(&self, event: &KeyEvent) -> bool {
        self.help.matches(event)
    }

    /// Help text for the global bindings followed by `extra` page bindings
    pub fn help_text(&self, extra: &[(&str, &str)]) -> String {
        [(self.quit.label, self.quit.description), (self.help.label, self.help.description)]
            .iter()
            .chain(extra.iter())
            .map(|(key, description)| format!("{:<14} {}", key, description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_requires_control() {
        let keys = KeyMap::default();
        assert!(keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(keys.should_show_help(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_help_text_lists_extra_bindings() {
        let text = KeyMap::default().help_text(&[("Esc", "Close")]);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().last().unwrap().starts_with("Esc"));
    }
}
