//! Incremental renderer: applies each committed operation as a minimal,
//! localized patch to the visual tree.
//!
//! The renderer owns a one-to-one mapping from model nodes to visual element
//! handles: one text element per leaf, one per non-empty operator, one
//! `space` placeholder per chain, plus a `line` element per top-level chain.
//! A subtree is never re-rendered wholesale; every op touches exactly the
//! elements it concerns.
//!
//! Rendering walks are lazy and idempotent: an element is created only if
//! its node has none yet, so the same routine serves both the first render
//! of a chain and the patch for an inserted subtree.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};
use trellis_primitives::{EditOp, FieldEdit, ModelArena, Node, NodeId, OpSym, TypeTag};

use crate::error::RenderError;
use crate::surface::{ElemId, Surface};


/// Insertion cursor: each pushed element lands immediately after the
/// previous one (the "view appender").
struct Appender {
	at: Cursor,
}

enum Cursor {
	/// Next element becomes the first child of this parent.
	Start(ElemId),
	/// Next element is inserted after this sibling.
	After(ElemId),
}

impl Appender {
	fn start(parent: ElemId) -> Self {
		Self { at: Cursor::Start(parent) }
	}

	fn after(anchor: ElemId) -> Self {
		Self { at: Cursor::After(anchor) }
	}

	fn push<S: Surface>(&mut self, surface: &mut S, elem: ElemId) {
		match self.at {
			Cursor::Start(parent) => surface.prepend_child(parent, elem),
			Cursor::After(anchor) => surface.insert_after(anchor, elem),
		}
		self.at = Cursor::After(elem);
	}

	/// Advances past an element that already exists.
	fn skip(&mut self, elem: ElemId) {
		self.at = Cursor::After(elem);
	}
}

/// The edit log's canonical subscriber: patches the visual tree per op.
#[derive(Debug, Default)]
pub struct IncrementalRenderer {
	leaf_views: FxHashMap<NodeId, ElemId>,
	op_views: FxHashMap<NodeId, ElemId>,
	placeholder_views: FxHashMap<NodeId, ElemId>,
	paren_views: FxHashMap<NodeId, (ElemId, ElemId)>,
	line_views: FxHashMap<NodeId, ElemId>,
	/// Which operand subtree is currently rendered for each step. Needed by
	/// the operand patch, which must tear down the *old* operand's views.
	rendered_operand: FxHashMap<NodeId, NodeId>,
}

impl IncrementalRenderer {
	/// Creates a renderer with no views.
	pub fn new() -> Self {
		Self::default()
	}

	/// Total live view handles, for accounting and tests.
	pub fn handle_count(&self) -> usize {
		self.leaf_views.len()
			+ self.op_views.len()
			+ self.placeholder_views.len()
			+ self.line_views.len()
			+ self.paren_views.len() * 2
	}

	/// The leaf's text element, if rendered.
	pub fn leaf_view(&self, leaf: NodeId) -> Option<ElemId> {
		self.leaf_views.get(&leaf).copied()
	}

	/// The step's operator element, if rendered.
	pub fn op_view(&self, step: NodeId) -> Option<ElemId> {
		self.op_views.get(&step).copied()
	}

	/// The chain's placeholder element, if rendered.
	pub fn placeholder_view(&self, chain: NodeId) -> Option<ElemId> {
		self.placeholder_views.get(&chain).copied()
	}

	/// The top-level chain's line element, if rendered.
	pub fn line_view(&self, chain: NodeId) -> Option<ElemId> {
		self.line_views.get(&chain).copied()
	}

	/// Renders a fresh top-level chain: creates its line element under
	/// `lines_root`, then walks the chain lazily. Safe to call on a
	/// partially-rendered tree.
	pub fn init_expr<S: Surface>(
		&mut self,
		model: &ModelArena,
		chain: NodeId,
		lines_root: ElemId,
		surface: &mut S,
	) -> Result<ElemId, RenderError> {
		let line = match self.line_views.get(&chain) {
			Some(line) => *line,
			None => {
				let line = surface.create("line");
				surface.append_child(lines_root, line);
				self.line_views.insert(chain, line);
				line
			}
		};
		let mut appender = Appender::start(line);
		self.render_chain(model, chain, &mut appender, surface)?;
		debug!(chain = chain.index(), "initial chain render");
		Ok(line)
	}

	/// Applies one committed operation as a localized patch.
	pub fn update<S: Surface>(
		&mut self,
		model: &ModelArena,
		op: &EditOp,
		surface: &mut S,
	) -> Result<(), RenderError> {
		trace!(?op, "render patch");
		match op {
			EditOp::ListInsert { chain, after, node } => {
				let anchor = match after {
					Some(prev) => self.rightmost_elem(model, *prev)?,
					None => self.placeholder_views.get(chain).copied().ok_or(
						RenderError::MissingView {
							what: "chain placeholder",
							index: chain.index(),
						},
					)?,
				};
				let mut appender = Appender::after(anchor);
				self.render_step(model, *node, &mut appender, surface)
			}
			EditOp::ListRemove { node, .. } => self.remove_step_views(model, *node, surface),
			EditOp::SetField { node, field } => self.patch_field(model, *node, field, surface),
		}
	}

	fn patch_field<S: Surface>(
		&mut self,
		model: &ModelArena,
		node: NodeId,
		field: &FieldEdit,
		surface: &mut S,
	) -> Result<(), RenderError> {
		match field {
			FieldEdit::Operator { to } => {
				let elem = self.op_views.get(&node).copied().ok_or(RenderError::MissingView {
					what: "operator view",
					index: node.index(),
				})?;
				surface.set_text(elem, to.as_str());
				if to.is_separator() {
					surface.add_class(elem, "sep");
				} else {
					surface.remove_class(elem, "sep");
				}
				Ok(())
			}
			FieldEdit::Operand { to } => {
				let old =
					self.rendered_operand.get(&node).copied().ok_or(RenderError::MissingView {
						what: "rendered operand",
						index: node.index(),
					})?;
				if old == *to {
					return Ok(());
				}
				// Render the replacement at the exact position of the old
				// operand, then tear the old one down.
				let anchor = self.rightmost_elem(model, old)?;
				let mut appender = Appender::after(anchor);
				self.render_expr(model, *to, &mut appender, surface)?;
				self.rendered_operand.insert(node, *to);
				self.remove_expr_views(model, old, surface)
			}
			FieldEdit::LeafValue { to } => {
				let elem = self.leaf_views.get(&node).copied().ok_or(
					RenderError::MissingView { what: "leaf view", index: node.index() },
				)?;
				surface.set_text(elem, to);
				Ok(())
			}
			FieldEdit::LeafType { to } => {
				let elem = self.leaf_views.get(&node).copied().ok_or(
					RenderError::MissingView { what: "leaf view", index: node.index() },
				)?;
				for tag in TypeTag::ALL {
					surface.remove_class(elem, tag.class());
				}
				if let Some(tag) = to {
					surface.add_class(elem, tag.class());
				}
				Ok(())
			}
		}
	}

	/// The rightmost existing visual element reachable from a node: for a
	/// chain, its closing paren or the rightmost element of its last step;
	/// for a step, the rightmost element of its operand; for a leaf, its own
	/// element.
	fn rightmost_elem(&self, model: &ModelArena, node: NodeId) -> Result<ElemId, RenderError> {
		match model.node(node)? {
			Node::Leaf(_) => self.leaf_views.get(&node).copied().ok_or(
				RenderError::MissingView { what: "leaf view", index: node.index() },
			),
			Node::Step(step) => self.rightmost_elem(model, step.operand),
			Node::Chain(chain) => {
				if let Some((_, close)) = self.paren_views.get(&node) {
					return Ok(*close);
				}
				if let Some(last) = chain.steps().last() {
					let step = *chain.steps().get(last).ok_or(
						RenderError::InvariantViolation("chain ring lost its last slot"),
					)?;
					return self.rightmost_elem(model, step);
				}
				self.placeholder_views.get(&node).copied().ok_or(RenderError::MissingView {
					what: "chain placeholder",
					index: node.index(),
				})
			}
		}
	}

	fn render_expr<S: Surface>(
		&mut self,
		model: &ModelArena,
		node: NodeId,
		appender: &mut Appender,
		surface: &mut S,
	) -> Result<(), RenderError> {
		match model.node(node)? {
			Node::Leaf(leaf) => {
				if let Some(elem) = self.leaf_views.get(&node) {
					appender.skip(*elem);
					return Ok(());
				}
				let class = match leaf.ty {
					Some(tag) => format!("text {}", tag.class()),
					None => "text".to_string(),
				};
				let elem = surface.create(&class);
				surface.set_text(elem, &leaf.value);
				appender.push(surface, elem);
				self.leaf_views.insert(node, elem);
				Ok(())
			}
			Node::Chain(_) => self.render_chain(model, node, appender, surface),
			Node::Step(_) => {
				Err(RenderError::InvariantViolation("a bare step is not a renderable operand"))
			}
		}
	}

	fn render_chain<S: Surface>(
		&mut self,
		model: &ModelArena,
		chain: NodeId,
		appender: &mut Appender,
		surface: &mut S,
	) -> Result<(), RenderError> {
		let info = model.chain(chain)?;
		let paren = info.paren;
		let steps: SmallVec<[NodeId; 8]> = info.steps().iter().map(|(_, id)| *id).collect();

		let close = if paren {
			let (open, close) = match self.paren_views.get(&chain) {
				Some(pair) => *pair,
				None => {
					let open = surface.create("text paren");
					surface.set_text(open, "(");
					let close = surface.create("text paren");
					surface.set_text(close, ")");
					self.paren_views.insert(chain, (open, close));
					(open, close)
				}
			};
			if surface.parent(open).is_some() {
				appender.skip(open);
			} else {
				appender.push(surface, open);
			}
			Some(close)
		} else {
			None
		};

		match self.placeholder_views.get(&chain) {
			Some(elem) => appender.skip(*elem),
			None => {
				let elem = surface.create("text space");
				surface.set_text(elem, " ");
				appender.push(surface, elem);
				self.placeholder_views.insert(chain, elem);
			}
		}

		for step in steps {
			self.render_step(model, step, appender, surface)?;
		}

		if let Some(close) = close {
			if surface.parent(close).is_some() {
				appender.skip(close);
			} else {
				appender.push(surface, close);
			}
		}
		Ok(())
	}

	fn render_step<S: Surface>(
		&mut self,
		model: &ModelArena,
		step: NodeId,
		appender: &mut Appender,
		surface: &mut S,
	) -> Result<(), RenderError> {
		let (op, operand) = {
			let entry = model.step(step)?;
			(entry.op, entry.operand)
		};
		if op != OpSym::Empty {
			match self.op_views.get(&step) {
				Some(elem) => appender.skip(*elem),
				None => {
					let class = if op.is_separator() { "text sep" } else { "text" };
					let elem = surface.create(class);
					surface.set_text(elem, op.as_str());
					appender.push(surface, elem);
					self.op_views.insert(step, elem);
				}
			}
		}
		self.render_expr(model, operand, appender, surface)?;
		self.rendered_operand.insert(step, operand);
		Ok(())
	}

	/// Tears down the views of a removed step: operator element first, then
	/// the operand subtree. Siblings are untouched.
	fn remove_step_views<S: Surface>(
		&mut self,
		model: &ModelArena,
		step: NodeId,
		surface: &mut S,
	) -> Result<(), RenderError> {
		if let Some(elem) = self.op_views.remove(&step) {
			surface.detach(elem);
		}
		let operand = match self.rendered_operand.remove(&step) {
			Some(operand) => operand,
			None => model.step(step)?.operand,
		};
		self.remove_expr_views(model, operand, surface)
	}

	fn remove_expr_views<S: Surface>(
		&mut self,
		model: &ModelArena,
		node: NodeId,
		surface: &mut S,
	) -> Result<(), RenderError> {
		match model.node(node)? {
			Node::Leaf(_) => {
				let elem = self.leaf_views.remove(&node).ok_or(RenderError::MissingView {
					what: "leaf view",
					index: node.index(),
				})?;
				surface.detach(elem);
				Ok(())
			}
			Node::Chain(chain) => {
				let steps: SmallVec<[NodeId; 8]> =
					chain.steps().iter().map(|(_, id)| *id).collect();
				for step in steps {
					self.remove_step_views(model, step, surface)?;
				}
				let placeholder = self.placeholder_views.remove(&node).ok_or(
					RenderError::MissingView { what: "chain placeholder", index: node.index() },
				)?;
				surface.detach(placeholder);
				if let Some((open, close)) = self.paren_views.remove(&node) {
					surface.detach(open);
					surface.detach(close);
				}
				if let Some(line) = self.line_views.remove(&node) {
					surface.detach(line);
				}
				Ok(())
			}
			Node::Step(_) => {
				Err(RenderError::InvariantViolation("a bare step is not a renderable operand"))
			}
		}
	}
}
