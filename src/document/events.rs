use super::ElementId;
use crossterm::event::KeyEvent;
use std::rc::Rc;

/// Handle returned when a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(super) u64);

/// A click as seen by one listener while it bubbles.
///
/// `target` is the element that was hit; `current_target` is the element the
/// listener is registered on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: ElementId,
    pub current_target: ElementId,
    pub column: u16,
    pub row: u16,
}

impl ClickEvent {
    /// True only when the listener's own element was hit, not a descendant
    pub fn is_on_current_target(&self) -> bool {
        self.target == self.current_target
    }
}

pub(super) enum Listener {
    Key(Rc<dyn Fn(&KeyEvent)>),
    Click {
        element: ElementId,
        callback: Rc<dyn Fn(&ClickEvent)>,
    },
}
