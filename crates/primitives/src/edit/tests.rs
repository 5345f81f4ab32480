use proptest::prelude::*;

use super::{EditOp, FieldEdit};
use crate::error::ModelError;
use crate::model::{ModelArena, Node, NodeId, OpSym, TypeTag};

/// Flattens a chain to `(op, operand-text)` pairs for structural comparison.
fn flatten(model: &ModelArena, chain: NodeId) -> Vec<(OpSym, String)> {
	model
		.steps_of(chain)
		.unwrap()
		.iter()
		.map(|step| {
			let step = model.step(*step).unwrap();
			(step.op, operand_text(model, step.operand))
		})
		.collect()
}

fn operand_text(model: &ModelArena, node: NodeId) -> String {
	match model.node(node).unwrap() {
		Node::Leaf(leaf) => leaf.value.clone(),
		Node::Chain(_) => {
			let inner: String = flatten(model, node)
				.iter()
				.map(|(op, text)| format!("{op}{text}"))
				.collect();
			format!("({inner})")
		}
		Node::Step(_) => unreachable!("operand is never a bare step"),
	}
}

fn number_chain(model: &mut ModelArena, values: &[&str]) -> NodeId {
	let leaves: Vec<NodeId> = values
		.iter()
		.map(|v| model.new_leaf(*v, Some(TypeTag::Number)))
		.collect();
	let steps = leaves
		.into_iter()
		.enumerate()
		.map(|(i, leaf)| (if i == 0 { OpSym::Empty } else { OpSym::Add }, leaf));
	model.chain_from(false, steps).unwrap()
}

#[test]
fn insert_then_inverse_restores_chain() {
	let mut model = ModelArena::new();
	let chain = number_chain(&mut model, &["1"]);
	let before = flatten(&model, chain);

	let two = model.new_leaf("2", Some(TypeTag::Number));
	let step = model.new_step(OpSym::Add, two);
	let first = model.steps_of(chain).unwrap()[0];
	let op = EditOp::ListInsert { chain, after: Some(first), node: step };

	let inverse = op.invert(&model).unwrap();
	op.apply(&mut model).unwrap();
	assert_eq!(flatten(&model, chain), vec![
		(OpSym::Empty, "1".to_string()),
		(OpSym::Add, "2".to_string())
	]);

	inverse.apply(&mut model).unwrap();
	assert_eq!(flatten(&model, chain), before);
}

#[test]
fn remove_inverse_reinserts_after_former_predecessor() {
	let mut model = ModelArena::new();
	let chain = number_chain(&mut model, &["1", "2", "3"]);
	let before = flatten(&model, chain);
	let middle = model.steps_of(chain).unwrap()[1];

	let op = EditOp::ListRemove { chain, node: middle };
	let inverse = op.invert(&model).unwrap();
	op.apply(&mut model).unwrap();
	assert_eq!(flatten(&model, chain).len(), 2);

	inverse.apply(&mut model).unwrap();
	assert_eq!(flatten(&model, chain), before);
}

#[test]
fn remove_head_inverse_reinserts_at_head() {
	let mut model = ModelArena::new();
	let chain = number_chain(&mut model, &["1", "2"]);
	let before = flatten(&model, chain);
	let head = model.steps_of(chain).unwrap()[0];

	let op = EditOp::ListRemove { chain, node: head };
	let inverse = op.invert(&model).unwrap();
	op.apply(&mut model).unwrap();
	inverse.apply(&mut model).unwrap();
	assert_eq!(flatten(&model, chain), before);
}

#[test]
fn set_operator_inverse_captures_old_value() {
	let mut model = ModelArena::new();
	let chain = number_chain(&mut model, &["1", "2"]);
	let second = model.steps_of(chain).unwrap()[1];

	let op = EditOp::SetField { node: second, field: FieldEdit::Operator { to: OpSym::Mul } };
	let inverse = op.invert(&model).unwrap();
	assert_eq!(inverse, EditOp::SetField {
		node: second,
		field: FieldEdit::Operator { to: OpSym::Add }
	});

	op.apply(&mut model).unwrap();
	assert_eq!(model.step(second).unwrap().op, OpSym::Mul);
	inverse.apply(&mut model).unwrap();
	assert_eq!(model.step(second).unwrap().op, OpSym::Add);
}

#[test]
fn set_operand_swaps_subtrees_reversibly() {
	let mut model = ModelArena::new();
	let chain = number_chain(&mut model, &["1", "2"]);
	let second = model.steps_of(chain).unwrap()[1];
	let nested = number_chain(&mut model, &["1", "2"]);
	let before = flatten(&model, chain);

	let op = EditOp::SetField { node: second, field: FieldEdit::Operand { to: nested } };
	let inverse = op.invert(&model).unwrap();
	op.apply(&mut model).unwrap();
	assert_eq!(flatten(&model, chain)[1].1, "(1+2)");

	inverse.apply(&mut model).unwrap();
	assert_eq!(flatten(&model, chain), before);
}

#[test]
fn set_leaf_value_and_type_are_reversible() {
	let mut model = ModelArena::new();
	let leaf = model.new_leaf("x", Some(TypeTag::Ident));

	let op = EditOp::SetField { node: leaf, field: FieldEdit::LeafValue { to: "y".into() } };
	let inverse = op.invert(&model).unwrap();
	op.apply(&mut model).unwrap();
	assert_eq!(model.leaf(leaf).unwrap().value, "y");
	inverse.apply(&mut model).unwrap();
	assert_eq!(model.leaf(leaf).unwrap().value, "x");

	let op = EditOp::SetField { node: leaf, field: FieldEdit::LeafType { to: None } };
	let inverse = op.invert(&model).unwrap();
	op.apply(&mut model).unwrap();
	assert_eq!(model.leaf(leaf).unwrap().ty, None);
	inverse.apply(&mut model).unwrap();
	assert_eq!(model.leaf(leaf).unwrap().ty, Some(TypeTag::Ident));
}

#[test]
fn apply_on_wrong_kind_fails() {
	let mut model = ModelArena::new();
	let leaf = model.new_leaf("x", None);
	let op = EditOp::SetField { node: leaf, field: FieldEdit::Operator { to: OpSym::Add } };
	assert!(matches!(op.apply(&mut model), Err(ModelError::KindMismatch { .. })));
}

#[test]
fn double_remove_fails_without_corruption() {
	let mut model = ModelArena::new();
	let chain = number_chain(&mut model, &["1", "2"]);
	let head = model.steps_of(chain).unwrap()[0];

	let op = EditOp::ListRemove { chain, node: head };
	op.apply(&mut model).unwrap();
	assert!(op.apply(&mut model).is_err());
	assert_eq!(flatten(&model, chain).len(), 1);
}

proptest! {
	// apply(op); apply(op.invert()) restores chain length, order, and field
	// values; re-applying op afterwards (the redo path) reproduces the
	// mutated state.
	#[test]
	fn apply_invert_round_trips(
		seed in prop::collection::vec("[a-z]{1,3}", 1..6),
		actions in prop::collection::vec((0u8..4, 0usize..8, 0usize..8), 1..40),
	) {
		let mut model = ModelArena::new();
		let values: Vec<&str> = seed.iter().map(|s| s.as_str()).collect();
		let chain = number_chain(&mut model, &values);

		for (kind, pos, aux) in actions {
			let steps = model.steps_of(chain).unwrap();
			let op = match kind {
				0 => {
					let operand = model.new_leaf(format!("n{aux}"), Some(TypeTag::Number));
					let node = model.new_step(OpSym::Mul, operand);
					let after = if steps.is_empty() {
						None
					} else {
						Some(steps[pos % steps.len()])
					};
					EditOp::ListInsert { chain, after, node }
				}
				1 if !steps.is_empty() => {
					EditOp::ListRemove { chain, node: steps[pos % steps.len()] }
				}
				2 if !steps.is_empty() => EditOp::SetField {
					node: steps[pos % steps.len()],
					field: FieldEdit::Operator { to: OpSym::Sub },
				},
				_ if !steps.is_empty() => {
					let operand = model.step(steps[pos % steps.len()]).unwrap().operand;
					if model.leaf(operand).is_err() {
						continue;
					}
					EditOp::SetField {
						node: operand,
						field: FieldEdit::LeafValue { to: format!("v{aux}") },
					}
				}
				_ => continue,
			};

			let before = flatten(&model, chain);
			let inverse = op.invert(&model).unwrap();
			op.apply(&mut model).unwrap();
			let after_apply = flatten(&model, chain);

			inverse.apply(&mut model).unwrap();
			prop_assert_eq!(flatten(&model, chain), before);

			// Redo: the same op applies again and lands in the same state.
			op.apply(&mut model).unwrap();
			prop_assert_eq!(flatten(&model, chain), after_apply);
		}
	}
}
