//! Error types for the view side of the sync core.
//!
//! All of these are programmer errors: they propagate synchronously to the
//! caller that issued the edit or selection change and are never recoverable
//! mid-operation.

use thiserror::Error;
use trellis_primitives::ModelError;

use crate::surface::ElemId;

/// Errors raised by the incremental renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	/// A patch expected a view handle that does not exist.
	#[error("missing view handle for {what} (node {index})")]
	MissingView {
		/// What kind of view was expected.
		what: &'static str,
		/// Arena index of the model node.
		index: u32,
	},

	/// The view tree disagreed with the model in a way a patch cannot repair.
	#[error("render invariant violated: {0}")]
	InvariantViolation(&'static str),

	/// The model refused a read the renderer needed.
	#[error(transparent)]
	Model(#[from] ModelError),
}

/// Errors raised by the selection overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlayError {
	/// A selection endpoint has no enclosing line element.
	#[error("selection endpoint {0:?} has no enclosing line")]
	NoEnclosingLine(ElemId),

	/// The right endpoint's line is not reachable forward from the left
	/// endpoint's line; the caller must pass visually ordered endpoints.
	#[error("selection endpoint lines are not in forward sibling order")]
	LinesOutOfOrder,
}

/// Aggregate error for the editor facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
	/// Structural mutation failed.
	#[error(transparent)]
	Model(#[from] ModelError),

	/// The renderer could not patch the view.
	#[error(transparent)]
	Render(#[from] RenderError),
}
