//! In-process element tree implementing [`Surface`].
//!
//! `TreeSurface` is the reference host: a flat slab of elements with
//! parent/child links, style classes, text, and a deterministic monospace
//! layout pass (fixed character advance and line height). Tests and headless
//! embeddings use it in place of a real display surface.

use smallvec::SmallVec;

use super::{Bounds, ElemId, Surface};

/// Horizontal advance per character in the monospace layout.
pub const CHAR_ADVANCE: f64 = 8.0;
/// Vertical extent of one line.
pub const LINE_HEIGHT: f64 = 16.0;

#[derive(Debug)]
struct Elem {
	parent: Option<u32>,
	children: Vec<u32>,
	classes: SmallVec<[String; 4]>,
	text: String,
	bounds: Bounds,
	width_override: Option<f64>,
	generation: u32,
	live: bool,
}

impl Elem {
	fn fresh(generation: u32) -> Self {
		Self {
			parent: None,
			children: Vec::new(),
			classes: SmallVec::new(),
			text: String::new(),
			bounds: Bounds::default(),
			width_override: None,
			generation,
			live: true,
		}
	}

	fn is_overlay(&self) -> bool {
		self.classes.iter().any(|c| c.starts_with("select"))
	}
}

/// A deterministic, headless element tree.
#[derive(Debug)]
pub struct TreeSurface {
	slots: Vec<Elem>,
	free: Vec<u32>,
	root: u32,
}

impl TreeSurface {
	/// Creates a surface with a single root element (class `editor`).
	pub fn new() -> Self {
		let mut root = Elem::fresh(0);
		root.classes.push("editor".to_string());
		Self { slots: vec![root], free: Vec::new(), root: 0 }
	}

	/// The root element.
	pub fn root(&self) -> ElemId {
		ElemId { index: self.root, generation: self.slots[self.root as usize].generation }
	}

	fn idx(&self, id: ElemId) -> usize {
		let slot = &self.slots[id.index as usize];
		assert!(
			slot.live && slot.generation == id.generation,
			"dead element handle passed to surface"
		);
		id.index as usize
	}

	fn id_of(&self, index: u32) -> ElemId {
		ElemId { index, generation: self.slots[index as usize].generation }
	}

	/// Children of an element, in order.
	pub fn children_of(&self, id: ElemId) -> Vec<ElemId> {
		let index = self.idx(id);
		self.slots[index].children.iter().map(|c| self.id_of(*c)).collect()
	}

	/// Width override set through [`Surface::set_width`], if any.
	pub fn width_of(&self, id: ElemId) -> Option<f64> {
		let index = self.idx(id);
		self.slots[index].width_override
	}

	/// Non-empty texts of the subtree in document order, overlay elements
	/// excluded. Test convenience.
	pub fn texts_under(&self, id: ElemId) -> Vec<String> {
		let mut out = Vec::new();
		self.collect_texts(self.idx(id) as u32, &mut out);
		out
	}

	fn collect_texts(&self, index: u32, out: &mut Vec<String>) {
		let elem = &self.slots[index as usize];
		if elem.is_overlay() {
			return;
		}
		if !elem.text.is_empty() {
			out.push(elem.text.clone());
		}
		for child in &elem.children {
			self.collect_texts(*child, out);
		}
	}

	fn unlink(&mut self, index: u32) {
		if let Some(parent) = self.slots[index as usize].parent.take() {
			self.slots[parent as usize].children.retain(|c| *c != index);
		}
	}

	fn destroy(&mut self, index: u32) {
		let children = std::mem::take(&mut self.slots[index as usize].children);
		for child in children {
			self.destroy(child);
		}
		let elem = &mut self.slots[index as usize];
		elem.live = false;
		elem.generation += 1;
		elem.parent = None;
		elem.classes.clear();
		elem.text.clear();
		elem.width_override = None;
		self.free.push(index);
	}

	fn layout_block(&mut self, index: u32, y: &mut f64) {
		if self.slots[index as usize].classes.iter().any(|c| c == "line") {
			let top = *y;
			let mut x = 0.0;
			self.layout_inline(index, &mut x, top);
			self.slots[index as usize].bounds =
				Bounds { left: 0.0, top, right: x, bottom: top + LINE_HEIGHT };
			*y += LINE_HEIGHT;
			return;
		}
		let children = self.slots[index as usize].children.clone();
		for child in children {
			self.layout_block(child, y);
		}
	}

	fn layout_inline(&mut self, index: u32, x: &mut f64, top: f64) {
		let children = self.slots[index as usize].children.clone();
		for child in children {
			if self.slots[child as usize].is_overlay() {
				continue;
			}
			let left = *x;
			*x += self.slots[child as usize].text.chars().count() as f64 * CHAR_ADVANCE;
			self.layout_inline(child, x, top);
			self.slots[child as usize].bounds =
				Bounds { left, top, right: *x, bottom: top + LINE_HEIGHT };
		}
	}
}

impl Default for TreeSurface {
	fn default() -> Self {
		Self::new()
	}
}

impl Surface for TreeSurface {
	fn create(&mut self, class: &str) -> ElemId {
		let index = match self.free.pop() {
			Some(index) => {
				let generation = self.slots[index as usize].generation;
				self.slots[index as usize] = Elem::fresh(generation);
				index
			}
			None => {
				self.slots.push(Elem::fresh(0));
				(self.slots.len() - 1) as u32
			}
		};
		for class in class.split_whitespace() {
			self.slots[index as usize].classes.push(class.to_string());
		}
		self.id_of(index)
	}

	fn is_live(&self, id: ElemId) -> bool {
		self.slots
			.get(id.index as usize)
			.is_some_and(|s| s.live && s.generation == id.generation)
	}

	fn set_text(&mut self, elem: ElemId, text: &str) {
		let index = self.idx(elem);
		self.slots[index].text.clear();
		self.slots[index].text.push_str(text);
	}

	fn text(&self, elem: ElemId) -> &str {
		let index = self.idx(elem);
		&self.slots[index].text
	}

	fn add_class(&mut self, elem: ElemId, class: &str) {
		let index = self.idx(elem);
		if !self.slots[index].classes.iter().any(|c| c == class) {
			self.slots[index].classes.push(class.to_string());
		}
	}

	fn remove_class(&mut self, elem: ElemId, class: &str) {
		let index = self.idx(elem);
		self.slots[index].classes.retain(|c| c != class);
	}

	fn has_class(&self, elem: ElemId, class: &str) -> bool {
		let index = self.idx(elem);
		self.slots[index].classes.iter().any(|c| c == class)
	}

	fn append_child(&mut self, parent: ElemId, child: ElemId) {
		let parent = self.idx(parent) as u32;
		let child = self.idx(child) as u32;
		self.unlink(child);
		self.slots[parent as usize].children.push(child);
		self.slots[child as usize].parent = Some(parent);
	}

	fn prepend_child(&mut self, parent: ElemId, child: ElemId) {
		let parent = self.idx(parent) as u32;
		let child = self.idx(child) as u32;
		self.unlink(child);
		self.slots[parent as usize].children.insert(0, child);
		self.slots[child as usize].parent = Some(parent);
	}

	fn insert_after(&mut self, anchor: ElemId, elem: ElemId) {
		let anchor = self.idx(anchor) as u32;
		let elem = self.idx(elem) as u32;
		let parent = self.slots[anchor as usize]
			.parent
			.expect("insert_after anchor must be attached");
		self.unlink(elem);
		let at = self.slots[parent as usize]
			.children
			.iter()
			.position(|c| *c == anchor)
			.expect("anchor must be among its parent's children");
		self.slots[parent as usize].children.insert(at + 1, elem);
		self.slots[elem as usize].parent = Some(parent);
	}

	fn detach(&mut self, elem: ElemId) {
		let index = self.idx(elem) as u32;
		assert!(index != self.root, "cannot detach the root element");
		self.unlink(index);
		self.destroy(index);
	}

	fn parent(&self, elem: ElemId) -> Option<ElemId> {
		let index = self.idx(elem);
		self.slots[index].parent.map(|p| self.id_of(p))
	}

	fn next_sibling(&self, elem: ElemId) -> Option<ElemId> {
		let index = self.idx(elem) as u32;
		let parent = self.slots[index as usize].parent?;
		let siblings = &self.slots[parent as usize].children;
		let at = siblings.iter().position(|c| *c == index)?;
		siblings.get(at + 1).map(|c| self.id_of(*c))
	}

	fn bounds(&self, elem: ElemId) -> Bounds {
		let index = self.idx(elem);
		self.slots[index].bounds
	}

	fn set_width(&mut self, elem: ElemId, width: f64) {
		let index = self.idx(elem);
		self.slots[index].width_override = Some(width);
	}

	fn settle_layout(&mut self) {
		let root = self.root;
		let mut y = 0.0;
		self.layout_block(root, &mut y);
	}
}
