//! Host page model for the terminal UI
//!
//! The document is the page a dialog is rendered into. It keeps a registry of
//! elements addressable by id (with parent links, layout and attributes), the
//! inline style of the page body, keyboard focus and the event listener table.
//!
//! `Document` is a cheap-clone handle. Every method releases its internal
//! borrow before invoking user callbacks, so listeners are free to mutate the
//! document or any state that in turn touches it.

mod element;
mod events;

pub use element::{BodyStyle, ElementId, Overflow};
pub use events::{ClickEvent, ListenerId};

use crossterm::event::KeyEvent;
use element::Element;
use events::Listener;
use ratatui::layout::Rect;
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use tracing::trace;

/// Width in columns of the page scrollbar
pub const SCROLLBAR_WIDTH: u16 = 1;

/// Handle to the shared page state
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentState>>,
}

struct DocumentState {
    viewport: Rect,
    content_height: u16,
    body_style: BodyStyle,
    elements: HashMap<ElementId, Element>,
    active_element: Option<ElementId>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    next_order: u64,
}

impl Document {
    /// Id of the root element every page element descends from
    pub const BODY: &'static str = "body";

    /// Create a document whose body covers `viewport`
    pub fn new(viewport: Rect) -> Self {
        let mut elements = HashMap::new();
        let mut body = Element::new(None, 0);
        body.layout = Some(viewport);
        elements.insert(ElementId::from(Self::BODY), body);

        Self {
            inner: Rc::new(RefCell::new(DocumentState {
                viewport,
                content_height: 0,
                body_style: BodyStyle::default(),
                elements,
                active_element: None,
                listeners: Vec::new(),
                next_listener: 0,
                next_order: 1,
            })),
        }
    }

    pub fn body_id() -> ElementId {
        ElementId::from(Self::BODY)
    }

    // ---- element tree ----

    /// Insert an element under `parent`.
    ///
    /// Returns false when the parent does not exist or the id is taken.
    pub fn insert_element(&self, id: impl Into<ElementId>, parent: &ElementId) -> bool {
        let id = id.into();
        let mut state = self.inner.borrow_mut();
        if state.elements.contains_key(&id) || !state.elements.contains_key(parent) {
            return false;
        }

        let order = state.next_order;
        state.next_order += 1;
        state.elements.insert(id.clone(), Element::new(Some(parent.clone()), order));
        if let Some(parent) = state.elements.get_mut(parent) {
            parent.children.push(id.clone());
        }
        trace!("inserted element {} under {}", id, parent);
        true
    }

    /// Remove an element together with its subtree.
    ///
    /// Click listeners registered on removed elements are dropped and focus
    /// held inside the subtree is released.
    pub fn remove_element(&self, id: &ElementId) -> bool {
        if id.as_str() == Self::BODY {
            return false;
        }

        let mut state = self.inner.borrow_mut();
        let Some(element) = state.elements.get(id) else {
            return false;
        };

        if let Some(parent) = element.parent.clone() {
            if let Some(parent) = state.elements.get_mut(&parent) {
                parent.children.retain(|child| child != id);
            }
        }

        let mut pending = vec![id.clone()];
        let mut removed = Vec::new();
        while let Some(current) = pending.pop() {
            if let Some(element) = state.elements.remove(&current) {
                pending.extend(element.children);
                removed.push(current);
            }
        }

        state.listeners.retain(|(_, listener)| match listener {
            Listener::Click { element, .. } => !removed.contains(element),
            Listener::Key(_) => true,
        });

        if state
            .active_element
            .as_ref()
            .is_some_and(|active| removed.contains(active))
        {
            state.active_element = None;
        }

        trace!("removed {} element(s) rooted at {}", removed.len(), id);
        true
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.inner.borrow().elements.contains_key(id)
    }

    pub fn children(&self, id: &ElementId) -> Vec<ElementId> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .map(|element| element.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: &ElementId) -> Option<ElementId> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .and_then(|element| element.parent.clone())
    }

    /// Record where an element was drawn this frame
    pub fn set_layout(&self, id: &ElementId, area: Rect) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(id) {
            element.layout = Some(area);
        }
    }

    pub fn set_attribute(&self, id: &ElementId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(id) {
            element.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attribute(&self, id: &ElementId, name: &str) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(id) {
            element.attributes.remove(name);
        }
    }

    // ---- focus ----

    /// Move keyboard focus to `id`. Absent elements cannot take focus.
    pub fn focus(&self, id: &ElementId) -> bool {
        let mut state = self.inner.borrow_mut();
        if !state.elements.contains_key(id) {
            return false;
        }
        state.active_element = Some(id.clone());
        trace!("focus moved to {}", id);
        true
    }

    pub fn is_focused(&self, id: &ElementId) -> bool {
        self.inner.borrow().active_element.as_ref() == Some(id)
    }

    // ---- viewport and body style ----

    pub fn viewport(&self) -> Rect {
        self.inner.borrow().viewport
    }

    pub fn set_viewport(&self, viewport: Rect) {
        let mut state = self.inner.borrow_mut();
        state.viewport = viewport;
        if let Some(body) = state.elements.get_mut(&Self::body_id()) {
            body.layout = Some(viewport);
        }
    }

    /// Height in rows of the page's scrollable content
    pub fn set_content_height(&self, rows: u16) {
        self.inner.borrow_mut().content_height = rows;
    }

    /// The scrollbar shows when the body may scroll and its content overflows
    pub fn scrollbar_visible(&self) -> bool {
        let state = self.inner.borrow();
        state.body_style.overflow != Overflow::Hidden
            && state.content_height > state.viewport.height
    }

    /// Width of the visible content, i.e. the viewport minus the scrollbar
    pub fn client_width(&self) -> u16 {
        let width = self.viewport().width;
        if self.scrollbar_visible() {
            width.saturating_sub(SCROLLBAR_WIDTH)
        } else {
            width
        }
    }

    pub fn body_style(&self) -> BodyStyle {
        self.inner.borrow().body_style
    }

    pub fn set_body_style(&self, style: BodyStyle) {
        self.inner.borrow_mut().body_style = style;
    }

    // ---- listeners ----

    /// Listen for key presses anywhere in the document
    pub fn add_key_listener(&self, callback: impl Fn(&KeyEvent) + 'static) -> ListenerId {
        self.push_listener(Listener::Key(Rc::new(callback)))
    }

    /// Listen for clicks on `element` or any of its descendants
    pub fn add_click_listener(
        &self,
        element: &ElementId,
        callback: impl Fn(&ClickEvent) + 'static,
    ) -> ListenerId {
        self.push_listener(Listener::Click {
            element: element.clone(),
            callback: Rc::new(callback),
        })
    }

    fn push_listener(&self, listener: Listener) -> ListenerId {
        let mut state = self.inner.borrow_mut();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.inner.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != state.listeners.len()
    }

    /// Deliver a key press to every document key listener.
    ///
    /// Returns true when at least one listener ran.
    pub fn dispatch_key(&self, event: &KeyEvent) -> bool {
        let callbacks: Vec<_> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter_map(|(_, listener)| match listener {
                Listener::Key(callback) => Some(Rc::clone(callback)),
                Listener::Click { .. } => None,
            })
            .collect();

        for callback in &callbacks {
            callback(event);
        }
        !callbacks.is_empty()
    }

    /// Hit-test a click and bubble it from the target up to the body.
    ///
    /// Returns the original target, or `None` when nothing laid out is under
    /// the pointer.
    pub fn dispatch_click(&self, column: u16, row: u16) -> Option<ElementId> {
        let target = self.hit_test(column, row)?;

        let mut path = vec![target.clone()];
        while let Some(parent) = path.last().and_then(|id| self.parent(id)) {
            path.push(parent);
        }

        for current_target in path {
            let callbacks: Vec<_> = self
                .inner
                .borrow()
                .listeners
                .iter()
                .filter_map(|(_, listener)| match listener {
                    Listener::Click { element, callback } if *element == current_target => {
                        Some(Rc::clone(callback))
                    }
                    _ => None,
                })
                .collect();

            let event = ClickEvent {
                target: target.clone(),
                current_target: current_target.clone(),
                column,
                row,
            };
            for callback in callbacks {
                callback(&event);
            }
        }

        Some(target)
    }

    /// Deepest laid-out element under the point; later insertions win ties
    pub fn hit_test(&self, column: u16, row: u16) -> Option<ElementId> {
        let state = self.inner.borrow();
        state
            .elements
            .iter()
            .filter(|(_, element)| {
                element
                    .layout
                    .is_some_and(|area| element::rect_contains(area, column, row))
            })
            .map(|(id, element)| (state.depth(id), element.order, id))
            .max_by_key(|(depth, order, _)| (*depth, *order))
            .map(|(_, _, id)| id.clone())
    }
}

/// Read-back accessors used by tests to inspect what was recorded
#[cfg(test)]
impl Document {
    pub fn layout(&self, id: &ElementId) -> Option<Rect> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .and_then(|element| element.layout)
    }

    pub fn attribute(&self, id: &ElementId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .and_then(|element| element.attributes.get(name).cloned())
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.inner.borrow().active_element.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl DocumentState {
    fn depth(&self, id: &ElementId) -> usize {
        let mut depth = 0;
        let mut current = self.elements.get(id).and_then(|element| element.parent.as_ref());
        while let Some(parent) = current {
            depth += 1;
            current = self.elements.get(parent).and_then(|element| element.parent.as_ref());
        }
        depth
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Document")
            .field("viewport", &state.viewport)
            .field("body_style", &state.body_style)
            .field("elements", &state.elements.len())
            .field("active_element", &state.active_element)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}
