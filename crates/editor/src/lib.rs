//! Incremental model↔view synchronization core for a structural editor.
//!
//! The model tree (see `trellis-primitives`) is kept visually rendered at all
//! times. Edits flow one way:
//!
//! ```text
//! EditOp ──► EditLog::apply ──► model mutation ──► EditHost observer
//!                                                      │
//!                                        IncrementalRenderer::update
//!                                                      │
//!                                            localized Surface patch
//! ```
//!
//! The [`SelectionOverlay`] is independent of the edit log: it observes two
//! carets and maintains one to three overlay elements over the rendered
//! content, reclassifying only when the selection's shape changes.
//!
//! Everything here is single-threaded and synchronous: an `apply` and the
//! renderer patch it triggers run to completion before control returns to
//! the caller that issued the edit.

/// Editor facade: owns the log, renderer, overlay, and surface.
pub mod editor;
/// Error types for render and overlay invariant violations.
pub mod error;
/// Edit log controller and undo/redo history.
pub mod log;
/// Selection overlay state machine.
pub mod overlay;
/// Incremental renderer: per-op view patches.
pub mod render;
/// Host rendering-surface contract and the in-process tree surface.
pub mod surface;

pub use editor::{Editor, RenderHost};
pub use error::{EditError, OverlayError, RenderError};
pub use log::{EditHost, EditLog, History, LogEntry, MAX_UNDO};
pub use overlay::{Caret, SelectionOverlay, SelectionShape};
pub use render::IncrementalRenderer;
pub use surface::{Bounds, ElemId, Surface, TreeSurface};
