//! Reversible structural edit operations.
//!
//! [`EditOp`] is the closed set of mutations the model admits. Every op can
//! compute its algebraic inverse against the *pre-mutation* model state:
//!
//! - insert⁻¹ removes the same node,
//! - remove⁻¹ re-inserts the node after its current predecessor,
//! - set-field⁻¹ sets the field back to its current value.
//!
//! Applying an op and then its inverse restores the model to a state
//! indistinguishable from before. That property is what makes the edit log's
//! undo/redo sound, and the proptest in `tests.rs` exercises it directly.

use crate::error::ModelError;
use crate::model::{ModelArena, NodeId, OpSym, TypeTag};

#[cfg(test)]
mod tests;

/// A field mutation, tagged per node kind.
///
/// Replaces the source's string-keyed dynamic field dispatch with a closed
/// enum dispatched through a `match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
	/// Replace a step's operator symbol.
	Operator {
		/// The new operator.
		to: OpSym,
	},
	/// Replace a step's operand expression.
	Operand {
		/// The new operand node.
		to: NodeId,
	},
	/// Replace a leaf's scalar value.
	LeafValue {
		/// The new display text.
		to: String,
	},
	/// Replace a leaf's display type tag.
	LeafType {
		/// The new tag.
		to: Option<TypeTag>,
	},
}

/// A structural mutation paired with a computable inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
	/// Link an unlinked step into a chain after `after` (head when `None`).
	ListInsert {
		/// The target chain.
		chain: NodeId,
		/// The step to insert after, or `None` for the chain head.
		after: Option<NodeId>,
		/// The step being linked.
		node: NodeId,
	},
	/// Unlink a step from its chain. The node stays allocated.
	ListRemove {
		/// The chain the step belongs to.
		chain: NodeId,
		/// The step being unlinked.
		node: NodeId,
	},
	/// Replace one field of a node.
	SetField {
		/// The target node.
		node: NodeId,
		/// The tagged field mutation.
		field: FieldEdit,
	},
}

impl EditOp {
	/// Computes the inverse of this op against the current (pre-mutation)
	/// model state.
	///
	/// Must be called before [`apply`](Self::apply): the inverse captures the
	/// predecessor of a removed step and the old value of a set field.
	pub fn invert(&self, model: &ModelArena) -> Result<EditOp, ModelError> {
		match self {
			EditOp::ListInsert { chain, node, .. } => {
				Ok(EditOp::ListRemove { chain: *chain, node: *node })
			}
			EditOp::ListRemove { chain, node } => Ok(EditOp::ListInsert {
				chain: *chain,
				after: model.step_before(*chain, *node)?,
				node: *node,
			}),
			EditOp::SetField { node, field } => {
				let old = match field {
					FieldEdit::Operator { .. } => FieldEdit::Operator { to: model.step(*node)?.op },
					FieldEdit::Operand { .. } => {
						FieldEdit::Operand { to: model.step(*node)?.operand }
					}
					FieldEdit::LeafValue { .. } => {
						FieldEdit::LeafValue { to: model.leaf(*node)?.value.clone() }
					}
					FieldEdit::LeafType { .. } => {
						FieldEdit::LeafType { to: model.leaf(*node)?.ty }
					}
				};
				Ok(EditOp::SetField { node: *node, field: old })
			}
		}
	}

	/// Performs the structural mutation.
	///
	/// Fails fast with [`ModelError::InvalidOperationTarget`] when the op
	/// names a node that is not a live member of the stated container.
	pub fn apply(&self, model: &mut ModelArena) -> Result<(), ModelError> {
		match self {
			EditOp::ListInsert { chain, after, node } => {
				model.insert_step_after(*chain, *after, *node)
			}
			EditOp::ListRemove { chain, node } => model.remove_step(*chain, *node),
			EditOp::SetField { node, field } => {
				match field {
					FieldEdit::Operator { to } => model.step_mut(*node)?.op = *to,
					FieldEdit::Operand { to } => model.step_mut(*node)?.operand = *to,
					FieldEdit::LeafValue { to } => model.leaf_mut(*node)?.value = to.clone(),
					FieldEdit::LeafType { to } => model.leaf_mut(*node)?.ty = *to,
				}
				Ok(())
			}
		}
	}
}
