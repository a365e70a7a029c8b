//! Modal dialog orchestration
//!
//! A single provider per UI scope owns whether a dialog is open and what it
//! shows. Any descendant holding the scope's `ModalContext` can obtain the
//! `ModalHandle` capability bundle with `use_modal` and open or close the
//! dialog imperatively.
//!
//! Rendering is out of flow: the portal draws the dialog into the page's
//! mount point element, dims the page behind it, locks body scrolling and
//! wires up dismissal by Escape or backdrop click. All of it is undone when
//! the dialog closes.

pub mod controller;
pub mod dismissal;
pub mod effects;
pub mod portal;
pub mod types;

pub use controller::ModalProvider;
pub use types::*;
