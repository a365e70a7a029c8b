//! Core modal types
//!
//! Content sources, the capability bundle handed to descendants, and the
//! modal error type.

use super::controller::ModalState;
use crate::tui::components::Component;
use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

/// Concrete renderable dialog content
pub type Content = Box<dyn Component>;

/// Resolved content as stored in the modal state.
///
/// Shared so an event handler can keep the content alive while it closes the
/// dialog that holds it.
pub type SharedContent = Rc<RefCell<Content>>;

type ContentFactory = Box<dyn FnOnce(ContentProps) -> anyhow::Result<Content>>;

/// Where dialog content comes from
pub enum ContentSource {
    /// Content ready to be shown as is
    Static(Content),
    /// Content built at open time from the controller accessors
    Dynamic(ContentFactory),
}

impl ContentSource {
    pub fn from_component(component: impl Component + 'static) -> Self {
        Self::Static(Box::new(component))
    }

    pub fn dynamic<F, C>(factory: F) -> Self
    where
        F: FnOnce(ContentProps) -> anyhow::Result<C> + 'static,
        C: Component + 'static,
    {
        Self::Dynamic(Box::new(move |props| {
            factory(props).map(|component| Box::new(component) as Content)
        }))
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("ContentSource::Static"),
            Self::Dynamic(_) => f.write_str("ContentSource::Dynamic"),
        }
    }
}

/// Options accepted by `open`
#[derive(Debug)]
pub struct ModalOptions {
    pub content: ContentSource,
}

impl ModalOptions {
    pub fn new(content: ContentSource) -> Self {
        Self { content }
    }
}

impl From<ContentSource> for ModalOptions {
    fn from(content: ContentSource) -> Self {
        Self::new(content)
    }
}

/// Accessors given to dynamic content: everything but `open`
#[derive(Clone)]
pub struct ContentProps {
    pub is_open: bool,
    pub close: Closer,
}

/// Callable that closes the dialog it was created for
#[derive(Clone)]
pub struct Closer(Rc<dyn Fn()>);

impl Closer {
    pub fn new(close: impl Fn() + 'static) -> Self {
        Self(Rc::new(close))
    }

    pub(super) fn for_state(state: Weak<RefCell<ModalState>>) -> Self {
        Self::new(move || {
            if let Some(state) = state.upgrade() {
                ModalState::close(&state);
            }
        })
    }

    pub fn close(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Closer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Closer")
    }
}

/// Scope token passed down to components that may request the modal.
///
/// `ModalContext::default()` has no provider behind it.
#[derive(Debug, Clone, Default)]
pub struct ModalContext {
    pub(super) state: Weak<RefCell<ModalState>>,
}

/// The capability bundle: `is_open`, `open`, `close`
#[derive(Debug, Clone)]
pub struct ModalHandle {
    pub(super) state: Weak<RefCell<ModalState>>,
}

impl ModalHandle {
    pub fn is_open(&self) -> bool {
        self.state
            .upgrade()
            .is_some_and(|state| state.borrow().is_open)
    }

    /// Show `options.content`, replacing whatever is open
    pub fn open(&self, options: impl Into<ModalOptions>) {
        match self.state.upgrade() {
            Some(state) => ModalState::open(&state, options.into()),
            None => tracing::debug!("open ignored: modal provider is gone"),
        }
    }

    pub fn close(&self) {
        if let Some(state) = self.state.upgrade() {
            ModalState::close(&state);
        }
    }
}

/// Obtain the modal capability bundle for the scope `context` belongs to
pub fn use_modal(context: &ModalContext) -> ModalResult<ModalHandle> {
    if context.state.upgrade().is_none() {
        return Err(ModalError::OutsideProvider);
    }
    Ok(ModalHandle {
        state: context.state.clone(),
    })
}

/// Observable modal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalSnapshot {
    pub is_open: bool,
    pub has_content: bool,
}

/// Result type for modal operations
pub type ModalResult<T> = std::result::Result<T, ModalError>;

#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    #[error("use_modal used outside provider")]
    OutsideProvider,

    #[error("failed to resolve dialog content")]
    ContentResolution(#[source] anyhow::Error),
}
