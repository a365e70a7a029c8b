//! Single-line text input and option select used by the form

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthChar;

/// Editable single-line text with a character cursor
#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
    /// Cursor position in characters
    cursor: usize,
    placeholder: Option<&'static str>,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.placeholder
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Display width of the text left of the cursor
    pub fn cursor_column(&self) -> u16 {
        self.value
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum::<usize>()
            .min(u16::MAX as usize) as u16
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(index, _)| index)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor);
        self.value.insert(index, c);
        self.cursor += 1;
    }

    pub fn delete_previous_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
    }

    pub fn delete_char(&mut self) {
        if self.cursor < self.value.chars().count() {
            let index = self.byte_index(self.cursor);
            self.value.remove(index);
        }
    }

    /// Apply an editing key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let len = self.value.chars().count();
        match event.code {
            KeyCode::Char(c)
                if !event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c);
            }
            KeyCode::Backspace => self.delete_previous_char(),
            KeyCode::Delete => self.delete_char(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }
}

/// Choice among a fixed list of `(value, label)` options
#[derive(Debug, Clone)]
pub struct SelectField {
    options: &'static [(&'static str, &'static str)],
    selected: usize,
}

impl SelectField {
    pub fn new(options: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn value(&self) -> &'static str {
        self.options.get(self.selected).map_or("", |(value, _)| value)
    }

    pub fn label(&self) -> &'static str {
        self.options.get(self.selected).map_or("", |(_, label)| label)
    }

    /// Select the option carrying `value`. Unknown values leave the choice as is.
    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|(option, _)| *option == value) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        match event.code {
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => self.next(),
            KeyCode::Left | KeyCode::Up => self.previous(),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.options.len().saturating_sub(1),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_editing_at_cursor() {
        let mut field = TextField::new();
        for c in "Alx".chars() {
            field.handle_key(&key(KeyCode::Char(c)));
        }
        field.handle_key(&key(KeyCode::Left));
        field.handle_key(&key(KeyCode::Backspace));
        assert_eq!(field.value(), "Ax");
        field.handle_key(&key(KeyCode::Char('l')));
        assert_eq!(field.value(), "Alx");
        field.handle_key(&key(KeyCode::Delete));
        assert_eq!(field.value(), "Al");
        field.handle_key(&key(KeyCode::Home));
        field.handle_key(&key(KeyCode::Backspace));
        assert_eq!(field.value(), "Al");
    }

    #[test]
    fn test_control_chords_are_not_text() {
        let mut field = TextField::new();
        let consumed = field.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!consumed);
        assert!(field.value().is_empty());
        assert!(field.handle_key(&KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)));
        assert_eq!(field.value(), "A");
    }

    #[test]
    fn test_cursor_column_counts_wide_chars() {
        let mut field = TextField::new();
        field.set_value("김a");
        assert_eq!(field.cursor, 2);
        assert_eq!(field.cursor_column(), 3);
        field.handle_key(&key(KeyCode::Backspace));
        field.handle_key(&key(KeyCode::Backspace));
        assert_eq!(field.value(), "");
    }

    #[test]
    fn test_select_cycles_and_selects_by_value() {
        const OPTIONS: &[(&str, &str)] = &[("", "pick"), ("1", "one"), ("2", "two")];
        let mut select = SelectField::new(OPTIONS);
        assert_eq!(select.value(), "");
        select.handle_key(&key(KeyCode::Left));
        assert_eq!(select.value(), "2");
        select.handle_key(&key(KeyCode::Down));
        assert_eq!(select.value(), "");
        assert!(select.select_value("1"));
        assert_eq!(select.label(), "one");
        assert!(!select.select_value("9"));
        assert_eq!(select.value(), "1");
    }
}
