pub mod form_page;

use crate::{
    document::ElementId,
    tui::{styles::Theme, Frame},
};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

/// Page identifier type
pub type PageId = String;

/// Base trait for all pages
pub trait Page {
    /// Get the page ID
    fn id(&self) -> &PageId;

    /// Get the page title
    fn title(&self) -> &str;

    /// Handle keyboard input
    fn handle_key_event(&mut self, event: KeyEvent) -> Result<()>;

    /// Handle a click on one of the page's elements
    fn handle_click(&mut self, target: &ElementId) -> Result<()>;

    /// Render the page
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Get page-specific help text
    fn help_text(&self) -> Vec<(&str, &str)> {
        vec![]
    }
}
