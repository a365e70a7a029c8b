pub mod form;
pub mod modal;

use crate::{
    document::{Document, ElementId},
    tui::{styles::Theme, Frame},
};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

/// Base trait for renderable UI components.
///
/// Components run on the UI thread only; handlers complete synchronously
/// inside the event that triggered them.
pub trait Component {
    /// Handle keyboard input
    fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        let _ = event;
        Ok(())
    }

    /// Handle a click whose original target is `target`
    fn handle_click(&mut self, target: &ElementId) -> Result<()> {
        let _ = target;
        Ok(())
    }

    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Called once the component's host element exists in the document.
    ///
    /// Components register their own elements under `parent` here.
    fn on_mount(&mut self, document: &Document, parent: &ElementId) -> Result<()> {
        let _ = (document, parent);
        Ok(())
    }

    /// Preferred content size (width, height)
    fn preferred_size(&self) -> (u16, u16) {
        (40, 10)
    }

    /// Element that should receive focus when the component is shown
    fn initial_focus(&self) -> Option<ElementId> {
        None
    }

    /// Element naming the component for assistive technology
    fn labelled_by(&self) -> Option<ElementId> {
        None
    }

    /// Element describing the component for assistive technology
    fn described_by(&self) -> Option<ElementId> {
        None
    }
}

/// Component showing a fixed block of text
#[derive(Debug, Clone)]
pub struct TextBlock {
    text: String,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Component for TextBlock {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let paragraph = ratatui::widgets::Paragraph::new(self.text.as_str())
            .style(theme.text_style())
            .wrap(ratatui::widgets::Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn preferred_size(&self) -> (u16, u16) {
        let width = self
            .text
            .lines()
            .map(unicode_width::UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .min(u16::MAX as usize) as u16;
        let height = self.text.lines().count().max(1).min(u16::MAX as usize) as u16;
        (width, height)
    }
}
