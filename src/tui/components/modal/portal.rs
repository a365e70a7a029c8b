//! Out-of-flow rendering of the dialog
//!
//! The portal renders the dialog into the mount point element instead of at
//! the provider's position. It inserts a full-viewport backdrop with the
//! dialog body inside it, runs the enter effects, and tears everything down
//! again when the dialog closes or the mount point goes away.

use super::{
    dismissal::Dismissal,
    effects::{focus_initial, ScrollLock},
    types::{Closer, SharedContent},
};
use crate::{
    document::{Document, ElementId},
    tui::{styles::Theme, Frame},
};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Clear},
};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Id of the dimmed layer covering the viewport
pub const BACKDROP_ID: &str = "modal-backdrop";

/// Id of the wrapper holding the dialog content
pub const DIALOG_ID: &str = "modal-body";

/// Space between the dialog border and its content
const PADDING_X: u16 = 2;
const PADDING_Y: u16 = 1;

/// Size used when the dialog has no content
const EMPTY_SIZE: (u16, u16) = (20, 3);

pub struct Portal {
    document: Document,
    mount_point: ElementId,
    mounted: Option<MountedModal>,
}

impl Portal {
    pub fn new(document: Document, mount_point: ElementId) -> Self {
        Self {
            document,
            mount_point,
            mounted: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Bring the rendered structure in line with the dialog state.
    ///
    /// The mount point is looked up on every call, so it may appear or
    /// disappear at any time.
    pub fn reconcile(&mut self, is_open: bool, content: Option<SharedContent>, closer: Closer) {
        if !is_open || !self.document.contains(&self.mount_point) {
            if self.mounted.take().is_some() {
                debug!("dialog unmounted from {}", self.mount_point);
            }
            return;
        }

        match self.mounted.as_mut() {
            Some(mounted) => {
                if !same_content(mounted.content.as_ref(), content.as_ref()) {
                    debug!("dialog content replaced while open");
                    mounted.replace_content(content);
                }
            }
            None => {
                self.mounted = Some(MountedModal::enter(
                    &self.document,
                    &self.mount_point,
                    content,
                    closer,
                ));
                info!("dialog mounted into {}", self.mount_point);
            }
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = None;
    }

    pub fn content(&self) -> Option<SharedContent> {
        self.mounted.as_ref().and_then(|mounted| mounted.content.clone())
    }

    /// Whether `target` is the dialog body or lies inside it
    pub fn owns(&self, target: &ElementId) -> bool {
        let Some(mounted) = &self.mounted else {
            return false;
        };
        let mut current = Some(target.clone());
        while let Some(id) = current {
            if id == mounted.dialog {
                return true;
            }
            current = self.document.parent(&id);
        }
        false
    }

    pub fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let Some(mounted) = &self.mounted else {
            return;
        };

        let viewport = frame.size();
        self.document.set_layout(&mounted.backdrop, viewport);
        frame.buffer_mut().set_style(viewport, theme.backdrop_style());

        let preferred = mounted
            .content
            .as_ref()
            .map(|content| content.borrow().preferred_size())
            .unwrap_or(EMPTY_SIZE);
        let area = dialog_area(viewport, preferred);
        self.document.set_layout(&mounted.dialog, area);

        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.focused_border_style())
            .style(theme.base_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(content) = &mounted.content {
            content.borrow_mut().render(frame, pad(inner), theme);
        }
    }
}

/// Structure and effects owned by an open, mounted dialog.
///
/// Dropping it removes the inserted elements, detaches the dismissal
/// listeners and restores the body style.
struct MountedModal {
    document: Document,
    backdrop: ElementId,
    dialog: ElementId,
    content: Option<SharedContent>,
    _dismissal: Dismissal,
    _scroll_lock: ScrollLock,
}

impl MountedModal {
    fn enter(
        document: &Document,
        mount_point: &ElementId,
        content: Option<SharedContent>,
        closer: Closer,
    ) -> Self {
        let backdrop = ElementId::from(BACKDROP_ID);
        let dialog = ElementId::from(DIALOG_ID);

        document.insert_element(backdrop.clone(), mount_point);
        document.insert_element(dialog.clone(), &backdrop);
        document.set_layout(&backdrop, document.viewport());
        document.set_attribute(&dialog, "role", "dialog");
        document.set_attribute(&dialog, "aria-modal", "true");

        let scroll_lock = ScrollLock::acquire(document);
        let dismissal = Dismissal::attach(document, &backdrop, closer);

        let mut mounted = Self {
            document: document.clone(),
            backdrop,
            dialog,
            content: None,
            _dismissal: dismissal,
            _scroll_lock: scroll_lock,
        };
        mounted.replace_content(content);
        mounted
    }

    fn replace_content(&mut self, content: Option<SharedContent>) {
        for child in self.document.children(&self.dialog) {
            self.document.remove_element(&child);
        }
        self.content = content;

        let Some(content) = &self.content else {
            self.document.set_layout(
                &self.dialog,
                dialog_area(self.document.viewport(), EMPTY_SIZE),
            );
            return;
        };

        let mut content = content.borrow_mut();
        if let Err(err) = content.on_mount(&self.document, &self.dialog) {
            warn!("dialog content failed to mount: {:#}", err);
        }

        for (name, value) in [
            ("aria-labelledby", content.labelled_by()),
            ("aria-describedby", content.described_by()),
        ] {
            match value {
                Some(id) => self.document.set_attribute(&self.dialog, name, id.as_str()),
                None => self.document.remove_attribute(&self.dialog, name),
            }
        }

        self.document.set_layout(
            &self.dialog,
            dialog_area(self.document.viewport(), content.preferred_size()),
        );
        focus_initial(&self.document, content.initial_focus().as_ref());
    }
}

impl Drop for MountedModal {
    fn drop(&mut self) {
        self.document.remove_element(&self.backdrop);
    }
}

fn same_content(a: Option<&SharedContent>, b: Option<&SharedContent>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Centre a dialog whose content wants `size`, including border and padding
pub fn dialog_area(viewport: Rect, (width, height): (u16, u16)) -> Rect {
    let width = width
        .saturating_add(2 + PADDING_X * 2)
        .min(viewport.width);
    let height = height
        .saturating_add(2 + PADDING_Y * 2)
        .min(viewport.height);
    Rect {
        x: viewport.x + (viewport.width - width) / 2,
        y: viewport.y + (viewport.height - height) / 2,
        width,
        height,
    }
}

fn pad(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(PADDING_X),
        y: area.y.saturating_add(PADDING_Y),
        width: area.width.saturating_sub(PADDING_X * 2),
        height: area.height.saturating_sub(PADDING_Y * 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_area_is_centred() {
        let area = dialog_area(Rect::new(0, 0, 80, 24), (40, 10));
        assert_eq!(area, Rect::new(17, 5, 46, 14));
    }

    #[test]
    fn test_dialog_area_clamps_to_viewport() {
        let viewport = Rect::new(0, 0, 30, 8);
        assert_eq!(dialog_area(viewport, (100, 100)), viewport);
    }

    #[test]
    fn test_pad_shrinks_inside_border() {
        assert_eq!(pad(Rect::new(10, 5, 20, 6)), Rect::new(12, 6, 16, 4));
        assert_eq!(pad(Rect::new(0, 0, 3, 1)).width, 0);
    }
}
