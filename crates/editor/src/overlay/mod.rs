//! Selection overlay state machine.
//!
//! A selection spans two carets over the visual tree. The overlay classifies
//! the span into one of three shapes and keeps 1–3 overlay elements layered
//! over the content:
//!
//! - **single element**: both carets in one element; one overlay prepended
//!   inside it.
//! - **single line**: distinct elements on one line; one overlay prepended
//!   into the left endpoint, width measured as `right.right − left.left`.
//! - **multi line**: endpoints on different lines; a cap overlay prepended
//!   into each endpoint's line plus one mid fill overlay per line strictly
//!   between them.
//!
//! `select` patches incrementally while the shape is stable (caps replaced
//! only when their endpoint moved, the mid fill set diffed line by line) and
//! rebuilds from scratch only on a shape change. Mid fills carry a
//! per-selection correlation class from a monotonic instance counter, so
//! stacked overlay layers never diff against each other's elements.
//!
//! Content width is never computed analytically. After the host settles
//! layout, [`refresh`](SelectionOverlay::refresh) re-measures the single-line
//! overlay width.

use tracing::trace;

use crate::error::OverlayError;
use crate::surface::{ElemId, Surface};


/// A caret: a visual element plus a character offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
	/// The element the caret sits in.
	pub elem: ElemId,
	/// Character offset within the element's text.
	pub offset: usize,
}

impl Caret {
	/// Creates a caret at `offset` within `elem`.
	pub fn new(elem: ElemId, offset: usize) -> Self {
		Self { elem, offset }
	}

	/// A caret inside a `space` placeholder snaps to offset 0; the blank
	/// spacer glyph is not a real selection boundary.
	fn normalized<S: Surface>(self, surface: &S) -> Self {
		if self.offset != 0 && surface.has_class(self.elem, "space") {
			Self { elem: self.elem, offset: 0 }
		} else {
			self
		}
	}
}

/// Classification of a selection span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionShape {
	/// Both carets in the same element.
	SingleElem,
	/// Distinct elements on the same line.
	SingleLine,
	/// Endpoints on different lines.
	MultiLine,
}

/// Overlay elements of the current shape.
#[derive(Debug)]
enum ShapeViews {
	SingleElem { overlay: ElemId },
	SingleLine { overlay: ElemId },
	MultiLine { left_cap: ElemId, right_cap: ElemId, mids: Vec<(ElemId, ElemId)> },
}

#[derive(Debug)]
struct Active {
	shape: SelectionShape,
	left: Caret,
	right: Caret,
	left_line: ElemId,
	right_line: ElemId,
	instance: u64,
	views: ShapeViews,
}

/// Renders and incrementally maintains the selection overlay.
#[derive(Debug, Default)]
pub struct SelectionOverlay {
	state: Option<Active>,
	next_instance: u64,
}

impl SelectionOverlay {
	/// Creates an overlay with no active selection.
	pub fn new() -> Self {
		Self::default()
	}

	/// The current selection shape, if a selection is active.
	pub fn shape(&self) -> Option<SelectionShape> {
		self.state.as_ref().map(|s| s.shape)
	}

	/// The active selection's correlation id.
	pub fn instance_id(&self) -> Option<u64> {
		self.state.as_ref().map(|s| s.instance)
	}

	/// Number of live overlay elements.
	pub fn overlay_count(&self) -> usize {
		match self.state.as_ref().map(|s| &s.views) {
			None => 0,
			Some(ShapeViews::SingleElem { .. } | ShapeViews::SingleLine { .. }) => 1,
			Some(ShapeViews::MultiLine { mids, .. }) => 2 + mids.len(),
		}
	}

	/// Lines currently holding a mid fill overlay, in document order.
	pub fn mid_lines(&self) -> Vec<ElemId> {
		match self.state.as_ref().map(|s| &s.views) {
			Some(ShapeViews::MultiLine { mids, .. }) => mids.iter().map(|(line, _)| *line).collect(),
			_ => Vec::new(),
		}
	}

	/// The multi-line cap overlays `(left, right)`, if that shape is active.
	pub fn cap_views(&self) -> Option<(ElemId, ElemId)> {
		match self.state.as_ref().map(|s| &s.views) {
			Some(ShapeViews::MultiLine { left_cap, right_cap, .. }) => Some((*left_cap, *right_cap)),
			_ => None,
		}
	}

	/// Classifies a caret pair without touching overlay state.
	///
	/// Shape is a pure function of the two endpoints: the same pair always
	/// classifies the same way.
	pub fn classify<S: Surface>(
		surface: &S,
		left: Caret,
		right: Caret,
	) -> Result<SelectionShape, OverlayError> {
		let left = left.normalized(surface);
		let right = right.normalized(surface);
		let left_line = enclosing_line(surface, left.elem)?;
		let right_line = enclosing_line(surface, right.elem)?;
		if left_line != right_line {
			Ok(SelectionShape::MultiLine)
		} else if left.elem != right.elem {
			Ok(SelectionShape::SingleLine)
		} else {
			Ok(SelectionShape::SingleElem)
		}
	}

	/// Sets the selection to the span `left..right` and patches the overlay.
	///
	/// `left` must not come after `right` in document order; endpoint
	/// normalization is the host's job. If an edit destroyed part of the
	/// previous selection's elements, the stale overlays are dropped and the
	/// new selection initializes fresh.
	pub fn select<S: Surface>(
		&mut self,
		surface: &mut S,
		left: Caret,
		right: Caret,
	) -> Result<SelectionShape, OverlayError> {
		self.prune(surface);
		let left = left.normalized(surface);
		let right = right.normalized(surface);
		let left_line = enclosing_line(surface, left.elem)?;
		let right_line = enclosing_line(surface, right.elem)?;
		let shape = if left_line != right_line {
			SelectionShape::MultiLine
		} else if left.elem != right.elem {
			SelectionShape::SingleLine
		} else {
			SelectionShape::SingleElem
		};
		trace!(?shape, "select");

		match self.state.take() {
			Some(active) if active.shape == shape => {
				let patched =
					self.patch(surface, active, shape, left, right, left_line, right_line)?;
				self.state = Some(patched);
			}
			Some(active) => {
				teardown(surface, active.views);
				let fresh = self.init(surface, shape, left, right, left_line, right_line)?;
				self.state = Some(fresh);
			}
			None => {
				let fresh = self.init(surface, shape, left, right, left_line, right_line)?;
				self.state = Some(fresh);
			}
		}
		Ok(shape)
	}

	/// Clears the selection and detaches every overlay element.
	pub fn clear<S: Surface>(&mut self, surface: &mut S) {
		if let Some(active) = self.state.take() {
			teardown(surface, active.views);
		}
	}

	/// Re-measures geometry-dependent overlay dimensions.
	///
	/// Call after the host settles layout; the single-line overlay width can
	/// only be measured, never derived. A selection whose elements were
	/// destroyed by an edit is dropped here instead of being measured.
	pub fn refresh<S: Surface>(&mut self, surface: &mut S) {
		self.prune(surface);
		let Some(active) = self.state.as_ref() else { return };
		if let ShapeViews::SingleLine { overlay } = active.views {
			let width =
				surface.bounds(active.right.elem).right - surface.bounds(active.left.elem).left;
			surface.set_width(overlay, width);
		}
	}

	/// Drops the selection if an edit destroyed any element it references.
	fn prune<S: Surface>(&mut self, surface: &mut S) {
		let Some(active) = self.state.take() else { return };
		if is_intact(surface, &active) {
			self.state = Some(active);
		} else {
			trace!("selection references destroyed elements; dropping overlay");
			teardown(surface, active.views);
		}
	}

	fn init<S: Surface>(
		&mut self,
		surface: &mut S,
		shape: SelectionShape,
		left: Caret,
		right: Caret,
		left_line: ElemId,
		right_line: ElemId,
	) -> Result<Active, OverlayError> {
		let instance = self.next_instance;
		self.next_instance += 1;
		let views = match shape {
			SelectionShape::SingleElem => {
				let overlay = surface.create("select select-elem");
				surface.prepend_child(left.elem, overlay);
				ShapeViews::SingleElem { overlay }
			}
			SelectionShape::SingleLine => {
				let overlay = surface.create("select select-line");
				surface.prepend_child(left.elem, overlay);
				let width = surface.bounds(right.elem).right - surface.bounds(left.elem).left;
				surface.set_width(overlay, width);
				ShapeViews::SingleLine { overlay }
			}
			SelectionShape::MultiLine => {
				// Validate span order before creating anything.
				let interior = lines_between(surface, left_line, right_line)?;
				let left_cap = surface.create("select select-cap");
				surface.prepend_child(left_line, left_cap);
				let right_cap = surface.create("select select-cap");
				surface.prepend_child(right_line, right_cap);
				let mids = interior
					.into_iter()
					.map(|line| (line, make_mid(surface, line, instance)))
					.collect();
				ShapeViews::MultiLine { left_cap, right_cap, mids }
			}
		};
		Ok(Active { shape, left, right, left_line, right_line, instance, views })
	}

	fn patch<S: Surface>(
		&mut self,
		surface: &mut S,
		active: Active,
		shape: SelectionShape,
		left: Caret,
		right: Caret,
		left_line: ElemId,
		right_line: ElemId,
	) -> Result<Active, OverlayError> {
		let instance = active.instance;
		let views = match active.views {
			ShapeViews::SingleElem { overlay } => {
				let overlay = if left.elem == active.left.elem {
					overlay
				} else {
					surface.detach(overlay);
					let fresh = surface.create("select select-elem");
					surface.prepend_child(left.elem, fresh);
					fresh
				};
				ShapeViews::SingleElem { overlay }
			}
			ShapeViews::SingleLine { overlay } => {
				let overlay = if left.elem == active.left.elem {
					overlay
				} else {
					surface.detach(overlay);
					let fresh = surface.create("select select-line");
					surface.prepend_child(left.elem, fresh);
					fresh
				};
				let width = surface.bounds(right.elem).right - surface.bounds(left.elem).left;
				surface.set_width(overlay, width);
				ShapeViews::SingleLine { overlay }
			}
			ShapeViews::MultiLine { left_cap, right_cap, mids } => {
				let wanted = lines_between(surface, left_line, right_line)?;
				let left_cap = if left_line == active.left_line {
					left_cap
				} else {
					surface.detach(left_cap);
					let fresh = surface.create("select select-cap");
					surface.prepend_child(left_line, fresh);
					fresh
				};
				let right_cap = if right_line == active.right_line {
					right_cap
				} else {
					surface.detach(right_cap);
					let fresh = surface.create("select select-cap");
					surface.prepend_child(right_line, fresh);
					fresh
				};
				// Diff the mid fill set by line: drop overlays whose line
				// left the span, add one per line that entered it.
				let mut kept = Vec::with_capacity(wanted.len());
				let mut old = mids;
				for line in wanted {
					match old.iter().position(|(l, _)| *l == line) {
						Some(at) => kept.push(old.swap_remove(at)),
						None => kept.push((line, make_mid(surface, line, instance))),
					}
				}
				for (_, stale) in old {
					surface.detach(stale);
				}
				ShapeViews::MultiLine { left_cap, right_cap, mids: kept }
			}
		};
		Ok(Active { shape, left, right, left_line, right_line, instance, views })
	}
}

fn make_mid<S: Surface>(surface: &mut S, line: ElemId, instance: u64) -> ElemId {
	let overlay = surface.create(&format!("select select-mid sel-{instance}"));
	surface.prepend_child(line, overlay);
	overlay
}

/// Whether every element the selection references is still live.
fn is_intact<S: Surface>(surface: &S, active: &Active) -> bool {
	let views_live = match &active.views {
		ShapeViews::SingleElem { overlay } | ShapeViews::SingleLine { overlay } => {
			surface.is_live(*overlay)
		}
		ShapeViews::MultiLine { left_cap, right_cap, mids } => {
			surface.is_live(*left_cap)
				&& surface.is_live(*right_cap)
				&& mids.iter().all(|(line, overlay)| {
					surface.is_live(*line) && surface.is_live(*overlay)
				})
		}
	};
	views_live
		&& surface.is_live(active.left.elem)
		&& surface.is_live(active.right.elem)
		&& surface.is_live(active.left_line)
		&& surface.is_live(active.right_line)
}

/// Overlay elements inside a destroyed endpoint die with it; detach only
/// the survivors.
fn teardown<S: Surface>(surface: &mut S, views: ShapeViews) {
	match views {
		ShapeViews::SingleElem { overlay } | ShapeViews::SingleLine { overlay } => {
			if surface.is_live(overlay) {
				surface.detach(overlay);
			}
		}
		ShapeViews::MultiLine { left_cap, right_cap, mids } => {
			if surface.is_live(left_cap) {
				surface.detach(left_cap);
			}
			if surface.is_live(right_cap) {
				surface.detach(right_cap);
			}
			for (_, overlay) in mids {
				if surface.is_live(overlay) {
					surface.detach(overlay);
				}
			}
		}
	}
}

/// Walks ancestors until an element carrying the `line` class is found.
fn enclosing_line<S: Surface>(surface: &S, elem: ElemId) -> Result<ElemId, OverlayError> {
	let mut cursor = Some(elem);
	while let Some(current) = cursor {
		if surface.has_class(current, "line") {
			return Ok(current);
		}
		cursor = surface.parent(current);
	}
	Err(OverlayError::NoEnclosingLine(elem))
}

/// Lines strictly between two distinct lines, in document order.
fn lines_between<S: Surface>(
	surface: &S,
	left_line: ElemId,
	right_line: ElemId,
) -> Result<Vec<ElemId>, OverlayError> {
	let mut mids = Vec::new();
	let mut cursor = surface.next_sibling(left_line);
	loop {
		match cursor {
			Some(line) if line == right_line => return Ok(mids),
			Some(line) => {
				mids.push(line);
				cursor = surface.next_sibling(line);
			}
			None => return Err(OverlayError::LinesOutOfOrder),
		}
	}
}
