use proptest::prelude::*;

use super::Ring;
use crate::error::ModelError;

fn collect(ring: &Ring<i32>) -> Vec<i32> {
	ring.iter().map(|(_, v)| *v).collect()
}

#[test]
fn new_ring_is_empty() {
	let ring: Ring<i32> = Ring::new();
	assert!(ring.is_empty());
	assert_eq!(ring.len(), 0);
	assert_eq!(ring.first(), None);
	assert_eq!(ring.last(), None);
}

#[test]
fn append_preserves_order() {
	let mut ring = Ring::new();
	ring.append(1);
	ring.append(2);
	ring.append(3);
	assert_eq!(collect(&ring), vec![1, 2, 3]);
	assert!(!ring.is_empty());
}

#[test]
fn insert_after_head_and_anchor() {
	let mut ring = Ring::new();
	let a = ring.append(1);
	ring.append(3);
	ring.insert_after(Some(a), 2).unwrap();
	ring.insert_after(None, 0).unwrap();
	assert_eq!(collect(&ring), vec![0, 1, 2, 3]);
}

#[test]
fn remove_returns_value_and_relinks() {
	let mut ring = Ring::new();
	ring.append(1);
	let b = ring.append(2);
	ring.append(3);
	assert_eq!(ring.remove(b).unwrap(), 2);
	assert_eq!(collect(&ring), vec![1, 3]);
	assert_eq!(ring.len(), 2);
}

#[test]
fn double_remove_is_an_error() {
	let mut ring = Ring::new();
	let a = ring.append(1);
	ring.remove(a).unwrap();
	assert!(matches!(ring.remove(a), Err(ModelError::InvalidOperationTarget(_))));
}

#[test]
fn stale_anchor_is_an_error() {
	let mut ring = Ring::new();
	let a = ring.append(1);
	ring.remove(a).unwrap();
	assert!(ring.insert_after(Some(a), 2).is_err());
}

#[test]
fn handle_from_another_ring_is_rejected() {
	let mut a = Ring::new();
	let mut b = Ring::new();
	let in_a = a.append(1);
	let in_b = b.append(10);
	// Same slot coordinates (first element of each ring), different ring.
	assert_eq!(in_a.index(), in_b.index());

	assert!(matches!(
		b.insert_after(Some(in_a), 11),
		Err(ModelError::InvalidOperationTarget(_))
	));
	assert!(b.remove(in_a).is_err());
	assert_eq!(b.get(in_a), None);
	assert!(!b.contains(in_a));
	assert_eq!(collect(&b), vec![10]);
}

#[test]
fn reused_slot_does_not_resurrect_old_handle() {
	let mut ring = Ring::new();
	let a = ring.append(1);
	ring.remove(a).unwrap();
	// The freed slot is reused for the new value.
	let b = ring.append(2);
	assert_eq!(a.index(), b.index());
	assert!(!ring.contains(a));
	assert_eq!(ring.get(b), Some(&2));
	assert_eq!(ring.get(a), None);
}

#[test]
fn neighbour_queries() {
	let mut ring = Ring::new();
	let a = ring.append(1);
	let b = ring.append(2);
	assert_eq!(ring.next(a).unwrap(), Some(b));
	assert_eq!(ring.next(b).unwrap(), None);
	assert_eq!(ring.prev(b).unwrap(), Some(a));
	assert_eq!(ring.prev(a).unwrap(), None);
	assert_eq!(ring.first(), Some(a));
	assert_eq!(ring.last(), Some(b));
}

#[test]
fn get_mut_updates_in_place() {
	let mut ring = Ring::new();
	let a = ring.append(1);
	*ring.get_mut(a).unwrap() = 10;
	assert_eq!(collect(&ring), vec![10]);
}

#[test]
fn empty_after_removing_everything() {
	let mut ring = Ring::new();
	let a = ring.append(1);
	let b = ring.append(2);
	ring.remove(a).unwrap();
	ring.remove(b).unwrap();
	assert!(ring.is_empty());
	assert_eq!(collect(&ring), Vec::<i32>::new());
}

proptest! {
	// For any sequence of appends, anchored inserts, and removes, iteration
	// yields elements in exact insertion-relative order and emptiness matches
	// the surviving count. A Vec<i32> is the ordering oracle.
	#[test]
	fn iteration_matches_oracle(ops in prop::collection::vec((0u8..3, 0usize..16, 0i32..1000), 1..200)) {
		let mut ring = Ring::new();
		let mut oracle: Vec<(super::RingId, i32)> = Vec::new();

		for (op, pos, value) in ops {
			match op {
				0 => {
					let id = ring.append(value);
					oracle.push((id, value));
				}
				1 if !oracle.is_empty() => {
					let at = pos % oracle.len();
					let (anchor, _) = oracle[at];
					let id = ring.insert_after(Some(anchor), value).unwrap();
					oracle.insert(at + 1, (id, value));
				}
				1 => {
					let id = ring.insert_after(None, value).unwrap();
					oracle.insert(0, (id, value));
				}
				_ if !oracle.is_empty() => {
					let at = pos % oracle.len();
					let (id, expected) = oracle.remove(at);
					prop_assert_eq!(ring.remove(id).unwrap(), expected);
				}
				_ => {}
			}
		}

		let got: Vec<i32> = ring.iter().map(|(_, v)| *v).collect();
		let want: Vec<i32> = oracle.iter().map(|(_, v)| *v).collect();
		prop_assert_eq!(got, want);
		prop_assert_eq!(ring.is_empty(), oracle.is_empty());
		prop_assert_eq!(ring.len(), oracle.len());
	}
}
