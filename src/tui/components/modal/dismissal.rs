//! Dismissal gestures for an open dialog
//!
//! Escape anywhere in the document, or a click that lands on the backdrop
//! itself, closes the dialog. The listeners live exactly as long as the
//! `Dismissal` guard.

use super::types::Closer;
use crate::document::{Document, ElementId, ListenerId};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tracing::debug;

#[derive(Debug)]
pub struct Dismissal {
    document: Document,
    listeners: Vec<ListenerId>,
}

impl Dismissal {
    pub fn attach(document: &Document, backdrop: &ElementId, closer: Closer) -> Self {
        let on_escape = closer.clone();
        let key = document.add_key_listener(move |event| {
            if is_escape(event) {
                debug!("escape pressed, closing dialog");
                on_escape.close();
            }
        });

        // Identity check: clicks inside the dialog body bubble up here too.
        let click = document.add_click_listener(backdrop, move |event| {
            if event.is_on_current_target() {
                debug!(
                    column = event.column,
                    row = event.row,
                    "backdrop clicked, closing dialog"
                );
                closer.close();
            }
        });

        Self {
            document: document.clone(),
            listeners: vec![key, click],
        }
    }
}

impl Drop for Dismissal {
    fn drop(&mut self) {
        for listener in self.listeners.drain(..) {
            self.document.remove_listener(listener);
        }
    }
}

pub fn is_escape(event: &KeyEvent) -> bool {
    event.code == KeyCode::Esc && event.kind != KeyEventKind::Release
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;
    use std::{cell::Cell, rc::Rc};

    struct Fixture {
        document: Document,
        backdrop: ElementId,
        closes: Rc<Cell<usize>>,
    }

    fn fixture() -> Fixture {
        let document = Document::new(Rect::new(0, 0, 80, 24));
        let backdrop = ElementId::from("backdrop");
        let dialog = ElementId::from("dialog");
        document.insert_element(backdrop.clone(), &Document::body_id());
        document.insert_element(dialog.clone(), &backdrop);
        document.set_layout(&backdrop, Rect::new(0, 0, 80, 24));
        document.set_layout(&dialog, Rect::new(20, 5, 40, 10));
        Fixture {
            document,
            backdrop,
            closes: Rc::new(Cell::new(0)),
        }
    }

    fn counting_closer(closes: &Rc<Cell<usize>>) -> Closer {
        let closes = Rc::clone(closes);
        Closer::new(move || closes.set(closes.get() + 1))
    }

    #[test]
    fn test_escape_closes_other_keys_ignored() {
        let f = fixture();
        let _dismissal = Dismissal::attach(&f.document, &f.backdrop, counting_closer(&f.closes));

        f.document
            .dispatch_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        f.document
            .dispatch_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(f.closes.get(), 0);

        f.document
            .dispatch_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(f.closes.get(), 1);
    }

    #[test]
    fn test_click_inside_dialog_does_not_close() {
        let f = fixture();
        let _dismissal = Dismissal::attach(&f.document, &f.backdrop, counting_closer(&f.closes));

        assert_eq!(
            f.document.dispatch_click(30, 8),
            Some(ElementId::from("dialog"))
        );
        assert_eq!(f.closes.get(), 0);

        assert_eq!(f.document.dispatch_click(1, 1), Some(f.backdrop.clone()));
        assert_eq!(f.closes.get(), 1);
    }

    #[test]
    fn test_drop_detaches_listeners() {
        let f = fixture();
        let dismissal = Dismissal::attach(&f.document, &f.backdrop, counting_closer(&f.closes));
        assert_eq!(f.document.listener_count(), 2);

        drop(dismissal);
        assert_eq!(f.document.listener_count(), 0);
        f.document
            .dispatch_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        f.document.dispatch_click(1, 1);
        assert_eq!(f.closes.get(), 0);
    }
}
