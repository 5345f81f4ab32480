use super::tree::{CHAR_ADVANCE, LINE_HEIGHT};
use super::{Surface, TreeSurface};

#[test]
fn create_and_classes() {
	let mut s = TreeSurface::new();
	let e = s.create("text sep");
	assert!(s.has_class(e, "text"));
	assert!(s.has_class(e, "sep"));
	s.remove_class(e, "sep");
	assert!(!s.has_class(e, "sep"));
	s.add_class(e, "sep");
	assert!(s.has_class(e, "sep"));
}

#[test]
fn tree_structure_and_sibling_order() {
	let mut s = TreeSurface::new();
	let root = s.root();
	let line = s.create("line");
	s.append_child(root, line);
	let a = s.create("text");
	let c = s.create("text");
	s.append_child(line, a);
	s.append_child(line, c);
	let b = s.create("text");
	s.insert_after(a, b);

	assert_eq!(s.children_of(line), vec![a, b, c]);
	assert_eq!(s.parent(b), Some(line));
	assert_eq!(s.next_sibling(a), Some(b));
	assert_eq!(s.next_sibling(c), None);
}

#[test]
fn prepend_places_first() {
	let mut s = TreeSurface::new();
	let root = s.root();
	let a = s.create("text");
	s.append_child(root, a);
	let sel = s.create("select");
	s.prepend_child(a, sel);
	assert_eq!(s.children_of(a), vec![sel]);
}

#[test]
fn detach_destroys_subtree() {
	let mut s = TreeSurface::new();
	let root = s.root();
	let line = s.create("line");
	s.append_child(root, line);
	let a = s.create("text");
	s.append_child(line, a);

	s.detach(line);
	assert!(!s.is_live(line));
	assert!(!s.is_live(a));
	assert_eq!(s.children_of(root), Vec::new());
}

#[test]
fn slot_reuse_does_not_resurrect_handles() {
	let mut s = TreeSurface::new();
	let root = s.root();
	let a = s.create("text");
	s.append_child(root, a);
	s.detach(a);
	let b = s.create("text");
	assert!(s.is_live(b));
	assert!(!s.is_live(a));
}

#[test]
fn monospace_layout_positions_text() {
	let mut s = TreeSurface::new();
	let root = s.root();
	let line = s.create("line");
	s.append_child(root, line);
	let a = s.create("text");
	s.set_text(a, "ab");
	let b = s.create("text");
	s.set_text(b, "cde");
	s.append_child(line, a);
	s.append_child(line, b);
	s.settle_layout();

	assert_eq!(s.bounds(a).left, 0.0);
	assert_eq!(s.bounds(a).right, 2.0 * CHAR_ADVANCE);
	assert_eq!(s.bounds(b).left, 2.0 * CHAR_ADVANCE);
	assert_eq!(s.bounds(b).right, 5.0 * CHAR_ADVANCE);
	assert_eq!(s.bounds(line).right, 5.0 * CHAR_ADVANCE);
	assert_eq!(s.bounds(line).bottom, LINE_HEIGHT);
}

#[test]
fn lines_stack_vertically() {
	let mut s = TreeSurface::new();
	let root = s.root();
	let l1 = s.create("line");
	let l2 = s.create("line");
	s.append_child(root, l1);
	s.append_child(root, l2);
	s.settle_layout();
	assert_eq!(s.bounds(l1).top, 0.0);
	assert_eq!(s.bounds(l2).top, LINE_HEIGHT);
}

#[test]
fn overlay_elements_do_not_advance_layout() {
	let mut s = TreeSurface::new();
	let root = s.root();
	let line = s.create("line");
	s.append_child(root, line);
	let a = s.create("text");
	s.set_text(a, "x");
	s.append_child(line, a);
	let sel = s.create("select select-span");
	s.set_text(sel, "wide");
	s.prepend_child(a, sel);
	s.settle_layout();

	assert_eq!(s.bounds(a).right, CHAR_ADVANCE);
	assert_eq!(s.texts_under(line), vec!["x".to_string()]);
}

#[test]
fn width_override_round_trips() {
	let mut s = TreeSurface::new();
	let e = s.create("select");
	assert_eq!(s.width_of(e), None);
	s.set_width(e, 42.0);
	assert_eq!(s.width_of(e), Some(42.0));
}
