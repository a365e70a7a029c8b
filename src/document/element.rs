use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier an element is reachable by
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ElementId> for ElementId {
    fn from(id: &ElementId) -> Self {
        id.clone()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the page body may scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Auto,
    Hidden,
}

/// Inline style of the page body.
///
/// `padding_right: None` means no inline padding is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyStyle {
    pub overflow: Overflow,
    pub padding_right: Option<u16>,
}

impl BodyStyle {
    /// Columns reserved on the right edge of the page
    pub fn padding(&self) -> u16 {
        self.padding_right.unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub(super) struct Element {
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub layout: Option<Rect>,
    pub attributes: BTreeMap<String, String>,
    pub order: u64,
}

impl Element {
    pub fn new(parent: Option<ElementId>, order: u64) -> Self {
        Self {
            parent,
            children: Vec::new(),
            layout: None,
            attributes: BTreeMap::new(),
            order,
        }
    }
}

pub(super) fn rect_contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let area = Rect::new(2, 3, 4, 2);
        assert!(rect_contains(area, 2, 3));
        assert!(rect_contains(area, 5, 4));
        assert!(!rect_contains(area, 6, 4));
        assert!(!rect_contains(area, 2, 5));
        assert!(!rect_contains(Rect::new(0, 0, 0, 0), 0, 0));
    }
}
