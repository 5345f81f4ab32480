//! Host rendering-surface contract.
//!
//! The core never talks to a real display directly. Everything it needs from
//! the host is behind [`Surface`]: create an element, set its text, add and
//! remove style classes, place it relative to siblings, measure bounding
//! geometry, and settle layout. The renderer and the overlay each mutate
//! only the elements they own; the host owns the element store itself.
//!
//! Geometry is only meaningful after [`settle_layout`](Surface::settle_layout)
//! — content width is never computed analytically, it is measured after the
//! host reports that layout has settled.

mod tree;

#[cfg(test)]
mod tests;

pub use tree::{CHAR_ADVANCE, LINE_HEIGHT, TreeSurface};

/// Handle to a visual element owned by the host surface.
///
/// Handles carry a generation so a slot reused after destruction does not
/// resurrect handles to the old element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElemId {
	pub(crate) index: u32,
	pub(crate) generation: u32,
}

/// Bounding geometry of an element, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
	/// Left edge.
	pub left: f64,
	/// Top edge.
	pub top: f64,
	/// Right edge.
	pub right: f64,
	/// Bottom edge.
	pub bottom: f64,
}

impl Bounds {
	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.right - self.left
	}
}

/// The visual-element contract expected from the host rendering surface.
///
/// Handles passed to these methods must be live; handing a destroyed handle
/// to the surface is a contract violation the implementation may treat as a
/// hard fault.
pub trait Surface {
	/// Creates a detached element carrying `class`.
	fn create(&mut self, class: &str) -> ElemId;

	/// Whether the handle still refers to a live element. The only method
	/// that accepts a destroyed handle.
	fn is_live(&self, elem: ElemId) -> bool;

	/// Replaces the element's text content.
	fn set_text(&mut self, elem: ElemId, text: &str);

	/// The element's current text content.
	fn text(&self, elem: ElemId) -> &str;

	/// Adds a style class.
	fn add_class(&mut self, elem: ElemId, class: &str);

	/// Removes a style class if present.
	fn remove_class(&mut self, elem: ElemId, class: &str);

	/// Whether the element carries a style class.
	fn has_class(&self, elem: ElemId, class: &str) -> bool;

	/// Appends `child` as the element's last child, detaching it first if
	/// it is attached elsewhere.
	fn append_child(&mut self, parent: ElemId, child: ElemId);

	/// Inserts `child` as the element's first child.
	fn prepend_child(&mut self, parent: ElemId, child: ElemId);

	/// Inserts `elem` as the sibling immediately after `anchor`.
	fn insert_after(&mut self, anchor: ElemId, elem: ElemId);

	/// Unlinks the element from its parent and destroys it together with
	/// its subtree. All handles into the subtree become dead.
	fn detach(&mut self, elem: ElemId);

	/// The element's parent, if attached.
	fn parent(&self, elem: ElemId) -> Option<ElemId>;

	/// The sibling after this element, if any.
	fn next_sibling(&self, elem: ElemId) -> Option<ElemId>;

	/// Bounding geometry as of the last layout settlement.
	fn bounds(&self, elem: ElemId) -> Bounds;

	/// Overrides the element's width (used by selection overlays).
	fn set_width(&mut self, elem: ElemId, width: f64);

	/// Recomputes layout. Bounds are stable until the next mutation.
	fn settle_layout(&mut self);
}
