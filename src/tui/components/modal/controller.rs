//! Modal controller
//!
//! The provider owns the single dialog state for its scope. Descendants get
//! at it only through `ModalHandle`, obtained with `use_modal`. State changes
//! are synchronous; the portal reflects them on the next `reconcile`.

use super::{portal::Portal, types::*};
use crate::{
    document::{Document, ElementId},
    tui::{styles::Theme, Frame},
};
use anyhow::Result;
use crossterm::event::KeyEvent;
use std::{cell::RefCell, rc::Rc};
use tracing::{debug, error, info};

/// `isOpen` plus the resolved content
#[derive(Default)]
pub struct ModalState {
    pub(super) is_open: bool,
    pub(super) content: Option<SharedContent>,
}

impl ModalState {
    pub(super) fn open(state: &Rc<RefCell<ModalState>>, options: ModalOptions) {
        state.borrow_mut().is_open = true;

        // Resolve without holding the borrow so the factory may use its props.
        let resolved = match options.content {
            ContentSource::Static(content) => Ok(content),
            ContentSource::Dynamic(factory) => factory(ContentProps {
                is_open: true,
                close: Closer::for_state(Rc::downgrade(state)),
            }),
        };

        let mut state = state.borrow_mut();
        match resolved {
            Ok(content) => {
                state.content = Some(Rc::new(RefCell::new(content)));
                info!("modal opened");
            }
            Err(err) => {
                let err = ModalError::ContentResolution(err);
                error!("Modal open error: {:#}", anyhow::Error::from(err));
                state.is_open = false;
            }
        }
    }

    pub(super) fn close(state: &Rc<RefCell<ModalState>>) {
        let mut state = state.borrow_mut();
        if state.is_open || state.content.is_some() {
            debug!("modal closed");
        }
        state.is_open = false;
        state.content = None;
    }

    pub(super) fn snapshot(&self) -> ModalSnapshot {
        ModalSnapshot {
            is_open: self.is_open,
            has_content: self.content.is_some(),
        }
    }
}

/// Owner of the dialog state and its out-of-flow rendering
pub struct ModalProvider {
    state: Rc<RefCell<ModalState>>,
    portal: Portal,
}

impl ModalProvider {
    /// Create a provider rendering into the element `mount_point` of `document`
    pub fn new(document: Document, mount_point: impl Into<ElementId>) -> Self {
        let state = Rc::new(RefCell::new(ModalState::default()));
        Self {
            portal: Portal::new(document, mount_point.into()),
            state,
        }
    }

    /// Scope token for descendants
    pub fn context(&self) -> ModalContext {
        ModalContext {
            state: Rc::downgrade(&self.state),
        }
    }

    pub fn open(&self, options: impl Into<ModalOptions>) {
        ModalState::open(&self.state, options.into());
    }

    pub fn close(&self) {
        ModalState::close(&self.state);
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open
    }

    pub fn snapshot(&self) -> ModalSnapshot {
        self.state.borrow().snapshot()
    }

    /// Whether the dialog is currently rendered into the mount point
    pub fn is_mounted(&self) -> bool {
        self.portal.is_mounted()
    }

    /// Apply enter/exit effects for the latest state
    pub fn reconcile(&mut self) {
        let (is_open, content) = {
            let state = self.state.borrow();
            (state.is_open, state.content.clone())
        };
        self.portal
            .reconcile(is_open, content, Closer::for_state(Rc::downgrade(&self.state)));
    }

    pub fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        self.portal.render(frame, theme);
    }

    /// Route a key press to the mounted content.
    ///
    /// Returns false when nothing is mounted to receive it.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> Result<bool> {
        let Some(content) = self.portal.content() else {
            return Ok(false);
        };
        let mut content = content.borrow_mut();
        content.handle_key_event(event)?;
        Ok(true)
    }

    /// Route a click whose target lies inside the dialog body.
    ///
    /// Returns false when the target is not part of the mounted dialog.
    pub fn handle_click(&mut self, target: &ElementId) -> Result<bool> {
        if !self.portal.owns(target) {
            return Ok(false);
        }
        if let Some(content) = self.portal.content() {
            content.borrow_mut().handle_click(target)?;
        }
        Ok(true)
    }
}

impl Drop for ModalProvider {
    fn drop(&mut self) {
        ModalState::close(&self.state);
        self.portal.unmount();
    }
}
