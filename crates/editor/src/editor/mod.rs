//! Editor facade: wires the edit log, renderer, overlay, and surface.
//!
//! [`Editor`] is the host-facing entry point. It routes every edit through
//! [`EditLog::apply`] with the renderer registered as the observer, then
//! settles layout and re-measures the selection overlay, so the visual tree
//! and the selection stay consistent after each committed operation.

use trellis_primitives::{EditOp, ModelArena, NodeId};

use crate::error::{EditError, OverlayError, RenderError};
use crate::log::{EditHost, EditLog};
use crate::overlay::{Caret, SelectionOverlay, SelectionShape};
use crate::render::IncrementalRenderer;
use crate::surface::{ElemId, Surface};


/// [`EditHost`] adapter pairing the renderer with the surface it patches.
///
/// Borrowed fresh for each log call, so the log, renderer, and surface can
/// live side by side in [`Editor`] without borrow conflicts.
pub struct RenderHost<'a, S: Surface> {
	/// The renderer receiving each committed op.
	pub renderer: &'a mut IncrementalRenderer,
	/// The surface the renderer patches.
	pub surface: &'a mut S,
}

impl<S: Surface> EditHost for RenderHost<'_, S> {
	fn operation_applied(&mut self, op: &EditOp, model: &ModelArena) -> Result<(), RenderError> {
		self.renderer.update(model, op, self.surface)
	}
}

/// The host-facing editor core.
pub struct Editor<S: Surface> {
	log: EditLog,
	renderer: IncrementalRenderer,
	overlay: SelectionOverlay,
	surface: S,
	lines_root: ElemId,
}

impl<S: Surface> Editor<S> {
	/// Creates an editor over `surface`; rendered lines attach under
	/// `lines_root`.
	pub fn new(surface: S, lines_root: ElemId) -> Self {
		Self {
			log: EditLog::new(),
			renderer: IncrementalRenderer::new(),
			overlay: SelectionOverlay::new(),
			surface,
			lines_root,
		}
	}

	/// Read access to the model.
	pub fn model(&self) -> &ModelArena {
		self.log.model()
	}

	/// Mutable access to the model arena, for node allocation and initial
	/// tree construction. Linked structure is mutated through
	/// [`commit`](Self::commit) only.
	pub fn model_mut(&mut self) -> &mut ModelArena {
		self.log.model_mut()
	}

	/// The underlying surface.
	pub fn surface(&self) -> &S {
		&self.surface
	}

	/// Mutable access to the surface.
	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	/// The renderer's view bookkeeping.
	pub fn renderer(&self) -> &IncrementalRenderer {
		&self.renderer
	}

	/// The selection overlay.
	pub fn overlay(&self) -> &SelectionOverlay {
		&self.overlay
	}

	/// Renders a top-level chain as a new line. Idempotent.
	pub fn open_line(&mut self, chain: NodeId) -> Result<ElemId, RenderError> {
		let line =
			self.renderer.init_expr(self.log.model(), chain, self.lines_root, &mut self.surface)?;
		self.surface.settle_layout();
		Ok(line)
	}

	/// Applies an edit through the log and patches the view.
	pub fn commit(&mut self, edit: EditOp) -> Result<(), EditError> {
		let mut host = RenderHost { renderer: &mut self.renderer, surface: &mut self.surface };
		self.log.apply(edit, &mut host)?;
		self.settle();
		Ok(())
	}

	/// Undoes the most recent edit, if any.
	pub fn undo(&mut self) -> Result<bool, EditError> {
		let mut host = RenderHost { renderer: &mut self.renderer, surface: &mut self.surface };
		let undone = self.log.undo(&mut host)?;
		if undone {
			self.settle();
		}
		Ok(undone)
	}

	/// Re-applies the next undone edit, if any.
	pub fn redo(&mut self) -> Result<bool, EditError> {
		let mut host = RenderHost { renderer: &mut self.renderer, surface: &mut self.surface };
		let redone = self.log.redo(&mut host)?;
		if redone {
			self.settle();
		}
		Ok(redone)
	}

	/// Whether an undo step is available.
	pub fn can_undo(&self) -> bool {
		self.log.can_undo()
	}

	/// Whether a redo step is available.
	pub fn can_redo(&self) -> bool {
		self.log.can_redo()
	}

	/// Sets the selection span and patches the overlay.
	pub fn select(&mut self, left: Caret, right: Caret) -> Result<SelectionShape, OverlayError> {
		let shape = self.overlay.select(&mut self.surface, left, right)?;
		self.overlay.refresh(&mut self.surface);
		Ok(shape)
	}

	/// Clears the selection.
	pub fn clear_selection(&mut self) {
		self.overlay.clear(&mut self.surface);
	}

	// Content changed under the selection: settle layout, then re-measure
	// the overlay.
	fn settle(&mut self) {
		self.surface.settle_layout();
		self.overlay.refresh(&mut self.surface);
	}
}
