//! Page-level side effects bound to the open/close transition
//!
//! Each effect is a guard: acquired when the dialog enters OPEN and released
//! exactly once when it is dropped, whether that happens on close, on removal
//! of the mount point or on provider teardown.

use crate::document::{BodyStyle, Document, ElementId, Overflow};
use tracing::{debug, trace};

/// Body scroll lock with scrollbar-width compensation
#[derive(Debug)]
pub struct ScrollLock {
    document: Document,
    previous: BodyStyle,
}

impl ScrollLock {
    /// Hide the body overflow and pad its right edge by the width of the
    /// scrollbar that disappears.
    pub fn acquire(document: &Document) -> Self {
        let previous = document.body_style();
        let scrollbar_width = document
            .viewport()
            .width
            .saturating_sub(document.client_width());

        document.set_body_style(BodyStyle {
            overflow: Overflow::Hidden,
            padding_right: Some(scrollbar_width),
        });
        debug!(scrollbar_width, "body scroll locked");

        Self {
            document: document.clone(),
            previous,
        }
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.document.set_body_style(self.previous);
        debug!("body scroll unlocked");
    }
}

/// Move focus to the dialog's heading so it is announced first
pub fn focus_initial(document: &Document, target: Option<&ElementId>) -> bool {
    let Some(target) = target else {
        return false;
    };
    let moved = document.focus(target);
    trace!(%target, moved, "initial dialog focus");
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn overflowing_document() -> Document {
        let document = Document::new(Rect::new(0, 0, 80, 24));
        document.set_content_height(200);
        document
    }

    #[test]
    fn test_lock_compensates_scrollbar_width() {
        let document = overflowing_document();
        let lock = ScrollLock::acquire(&document);
        assert_eq!(
            document.body_style(),
            BodyStyle {
                overflow: Overflow::Hidden,
                padding_right: Some(1),
            }
        );
        drop(lock);
        assert_eq!(document.body_style(), BodyStyle::default());
    }

    #[test]
    fn test_lock_without_scrollbar_pads_nothing() {
        let document = Document::new(Rect::new(0, 0, 80, 24));
        let _lock = ScrollLock::acquire(&document);
        assert_eq!(document.body_style().padding_right, Some(0));
    }

    #[test]
    fn test_focus_initial_needs_present_element() {
        let document = Document::new(Rect::new(0, 0, 80, 24));
        let title = ElementId::from("title");
        assert!(!focus_initial(&document, None));
        assert!(!focus_initial(&document, Some(&title)));

        document.insert_element(title.clone(), &Document::body_id());
        assert!(focus_initial(&document, Some(&title)));
        assert_eq!(document.active_element(), Some(title));
    }
}
