//! The model tree: arena-allocated leaves, operator steps, and chains.
//!
//! Nodes live in a flat [`ModelArena`] table addressed by stable [`NodeId`]
//! handles. Upward navigation uses handle fields (`owner`, `slot`) instead of
//! reference cycles: from a step, the enclosing chain and its ring slot are
//! both O(1) away.
//!
//! Structural mutation goes through the arena helpers
//! ([`insert_step_after`](ModelArena::insert_step_after),
//! [`remove_step`](ModelArena::remove_step)) so the owner back-handles stay
//! consistent with ring membership. Removal unlinks but never frees: a
//! removed subtree stays addressable so an inverse operation can re-link the
//! very same node.

use std::fmt;

use crate::error::ModelError;
use crate::ring::{Ring, RingId};


/// Handle to a node in a [`ModelArena`].
///
/// Arena slots are never reused, so a `NodeId` stays valid for the lifetime
/// of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
	/// Slot index, for diagnostics only.
	pub fn index(&self) -> u32 {
		self.0
	}
}

/// Minimal display-only type tag carried by leaves.
///
/// Used exclusively for styling the leaf's visual element; the core performs
/// no type checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
	/// Numeric literal.
	Number,
	/// String literal.
	Str,
	/// Identifier.
	Ident,
	/// Boolean literal.
	Bool,
}

impl TypeTag {
	/// All tags, in declaration order.
	pub const ALL: [TypeTag; 4] = [TypeTag::Number, TypeTag::Str, TypeTag::Ident, TypeTag::Bool];

	/// Style class the renderer attaches to the leaf's element.
	pub fn class(&self) -> &'static str {
		match self {
			TypeTag::Number => "number",
			TypeTag::Str => "string",
			TypeTag::Ident => "ident",
			TypeTag::Bool => "bool",
		}
	}
}

/// Operator symbol carried by a chain step.
///
/// `Empty` is reserved for the first step of a chain, which represents the
/// chain's initial operand by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSym {
	/// No operator (first step of a chain).
	Empty,
	/// Member access `.`.
	Member,
	/// Call `()`.
	Call,
	/// Block `{}`.
	Block,
	/// `+`
	Add,
	/// `-`
	Sub,
	/// `*`
	Mul,
	/// `/`
	Div,
	/// `%`
	Rem,
	/// `&`
	BitAnd,
	/// `|`
	BitOr,
	/// `^`
	BitXor,
	/// `<`
	Lt,
	/// `>`
	Gt,
	/// `<=`
	Le,
	/// `>=`
	Ge,
	/// `==`
	Eq,
	/// `!=`
	Ne,
	/// `&&`
	And,
	/// `||`
	Or,
}

impl OpSym {
	/// Display text of the operator.
	pub fn as_str(&self) -> &'static str {
		match self {
			OpSym::Empty => "",
			OpSym::Member => ".",
			OpSym::Call => "()",
			OpSym::Block => "{}",
			OpSym::Add => "+",
			OpSym::Sub => "-",
			OpSym::Mul => "*",
			OpSym::Div => "/",
			OpSym::Rem => "%",
			OpSym::BitAnd => "&",
			OpSym::BitOr => "|",
			OpSym::BitXor => "^",
			OpSym::Lt => "<",
			OpSym::Gt => ">",
			OpSym::Le => "<=",
			OpSym::Ge => ">=",
			OpSym::Eq => "==",
			OpSym::Ne => "!=",
			OpSym::And => "&&",
			OpSym::Or => "||",
		}
	}

	/// Whether the operator is rendered as a spaced separator.
	///
	/// Member access and the call/brace operators hug their operands; the
	/// empty first-step operator is not rendered at all.
	pub fn is_separator(&self) -> bool {
		!matches!(self, OpSym::Empty | OpSym::Member | OpSym::Call | OpSym::Block)
	}
}

impl fmt::Display for OpSym {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An opaque scalar value with an optional display type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
	/// The scalar's display text.
	pub value: String,
	/// Optional display-only type tag.
	pub ty: Option<TypeTag>,
}

/// One step of an operator chain: an operator symbol plus its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
	/// The operator applied to the operand.
	pub op: OpSym,
	/// The operand expression (a leaf or a nested chain).
	pub operand: NodeId,
	owner: Option<NodeId>,
	slot: Option<RingId>,
}

impl Step {
	/// The chain this step is currently linked into, if any.
	pub fn owner(&self) -> Option<NodeId> {
		self.owner
	}

	/// The step's ring slot in its owner chain, if linked.
	pub fn slot(&self) -> Option<RingId> {
		self.slot
	}
}

/// An ordered sequence of operator steps.
#[derive(Debug)]
pub struct Chain {
	steps: Ring<NodeId>,
	/// Whether the chain renders wrapped in parentheses.
	pub paren: bool,
}

impl Chain {
	/// The step ring, in chain order.
	pub fn steps(&self) -> &Ring<NodeId> {
		&self.steps
	}
}

/// A model node: a leaf, an operator step, or an operator chain.
#[derive(Debug)]
pub enum Node {
	/// Opaque scalar.
	Leaf(Leaf),
	/// Operator + operand pair.
	Step(Step),
	/// Ordered step sequence.
	Chain(Chain),
}

impl Node {
	/// Node kind name, for diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			Node::Leaf(_) => "leaf",
			Node::Step(_) => "step",
			Node::Chain(_) => "chain",
		}
	}
}

/// Flat table of model nodes.
#[derive(Debug, Default)]
pub struct ModelArena {
	nodes: Vec<Node>,
}

impl ModelArena {
	/// Creates an empty arena.
	pub fn new() -> Self {
		Self::default()
	}

	fn insert(&mut self, node: Node) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(node);
		id
	}

	/// Allocates a leaf node.
	pub fn new_leaf(&mut self, value: impl Into<String>, ty: Option<TypeTag>) -> NodeId {
		self.insert(Node::Leaf(Leaf { value: value.into(), ty }))
	}

	/// Allocates an empty chain.
	pub fn new_chain(&mut self, paren: bool) -> NodeId {
		self.insert(Node::Chain(Chain { steps: Ring::new(), paren }))
	}

	/// Allocates an unlinked step. Link it with
	/// [`insert_step_after`](Self::insert_step_after).
	pub fn new_step(&mut self, op: OpSym, operand: NodeId) -> NodeId {
		self.insert(Node::Step(Step { op, operand, owner: None, slot: None }))
	}

	/// The node behind `id`.
	pub fn node(&self, id: NodeId) -> Result<&Node, ModelError> {
		self.nodes.get(id.0 as usize).ok_or(ModelError::UnknownNode { index: id.0 })
	}

	fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, ModelError> {
		self.nodes.get_mut(id.0 as usize).ok_or(ModelError::UnknownNode { index: id.0 })
	}

	/// The leaf behind `id`.
	pub fn leaf(&self, id: NodeId) -> Result<&Leaf, ModelError> {
		match self.node(id)? {
			Node::Leaf(leaf) => Ok(leaf),
			_ => Err(ModelError::KindMismatch { expected: "leaf" }),
		}
	}

	pub(crate) fn leaf_mut(&mut self, id: NodeId) -> Result<&mut Leaf, ModelError> {
		match self.node_mut(id)? {
			Node::Leaf(leaf) => Ok(leaf),
			_ => Err(ModelError::KindMismatch { expected: "leaf" }),
		}
	}

	/// The step behind `id`.
	pub fn step(&self, id: NodeId) -> Result<&Step, ModelError> {
		match self.node(id)? {
			Node::Step(step) => Ok(step),
			_ => Err(ModelError::KindMismatch { expected: "step" }),
		}
	}

	pub(crate) fn step_mut(&mut self, id: NodeId) -> Result<&mut Step, ModelError> {
		match self.node_mut(id)? {
			Node::Step(step) => Ok(step),
			_ => Err(ModelError::KindMismatch { expected: "step" }),
		}
	}

	/// The chain behind `id`.
	pub fn chain(&self, id: NodeId) -> Result<&Chain, ModelError> {
		match self.node(id)? {
			Node::Chain(chain) => Ok(chain),
			_ => Err(ModelError::KindMismatch { expected: "chain" }),
		}
	}

	fn chain_mut(&mut self, id: NodeId) -> Result<&mut Chain, ModelError> {
		match self.node_mut(id)? {
			Node::Chain(chain) => Ok(chain),
			_ => Err(ModelError::KindMismatch { expected: "chain" }),
		}
	}

	/// Step node ids of a chain, in chain order.
	pub fn steps_of(&self, chain: NodeId) -> Result<Vec<NodeId>, ModelError> {
		Ok(self.chain(chain)?.steps.iter().map(|(_, id)| *id).collect())
	}

	/// Links an unlinked step into a chain after `after` (or at the head).
	///
	/// `after`, when given, must be a step currently linked into the same
	/// chain. Linking an already-linked step is an
	/// [`InvalidOperationTarget`](ModelError::InvalidOperationTarget) error.
	pub fn insert_step_after(
		&mut self,
		chain: NodeId,
		after: Option<NodeId>,
		step: NodeId,
	) -> Result<(), ModelError> {
		if self.step(step)?.owner.is_some() {
			return Err(ModelError::InvalidOperationTarget("step is already linked into a chain"));
		}
		let anchor = match after {
			Some(anchor_step) => {
				let anchor = self.step(anchor_step)?;
				if anchor.owner != Some(chain) {
					return Err(ModelError::InvalidOperationTarget(
						"anchor step is not a member of the chain",
					));
				}
				anchor.slot
			}
			None => None,
		};
		let slot = self.chain_mut(chain)?.steps.insert_after(anchor, step)?;
		let entry = self.step_mut(step)?;
		entry.owner = Some(chain);
		entry.slot = Some(slot);
		Ok(())
	}

	/// Unlinks a step from its chain.
	///
	/// The step (and its operand subtree) stays allocated so an inverse
	/// operation can re-link it.
	pub fn remove_step(&mut self, chain: NodeId, step: NodeId) -> Result<(), ModelError> {
		let slot = {
			let entry = self.step(step)?;
			if entry.owner != Some(chain) {
				return Err(ModelError::InvalidOperationTarget("step is not a member of the chain"));
			}
			entry
				.slot
				.ok_or(ModelError::InvalidOperationTarget("linked step has no ring slot"))?
		};
		let unlinked = self.chain_mut(chain)?.steps.remove(slot)?;
		if unlinked != step {
			return Err(ModelError::InvalidOperationTarget("ring slot held a different step"));
		}
		let entry = self.step_mut(step)?;
		entry.owner = None;
		entry.slot = None;
		Ok(())
	}

	/// The step immediately before `step` in its chain, or `None` at the head.
	pub fn step_before(&self, chain: NodeId, step: NodeId) -> Result<Option<NodeId>, ModelError> {
		let entry = self.step(step)?;
		if entry.owner != Some(chain) {
			return Err(ModelError::InvalidOperationTarget("step is not a member of the chain"));
		}
		let slot =
			entry.slot.ok_or(ModelError::InvalidOperationTarget("linked step has no ring slot"))?;
		let ring = &self.chain(chain)?.steps;
		match ring.prev(slot)? {
			Some(prev) => Ok(ring.get(prev).copied()),
			None => Ok(None),
		}
	}

	/// Builds a chain from `(operator, operand)` pairs, appending in order.
	///
	/// Convenience for constructing initial model state before the edit log
	/// takes over as the sole mutation path.
	pub fn chain_from(
		&mut self,
		paren: bool,
		steps: impl IntoIterator<Item = (OpSym, NodeId)>,
	) -> Result<NodeId, ModelError> {
		let chain = self.new_chain(paren);
		let mut tail = None;
		for (op, operand) in steps {
			let step = self.new_step(op, operand);
			self.insert_step_after(chain, tail, step)?;
			tail = Some(step);
		}
		Ok(chain)
	}
}
