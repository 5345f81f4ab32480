//! Circular doubly-linked ordered container.
//!
//! [`Ring`] is the backbone of every variable-length list in the model:
//! operator-chain steps, statement lists, and the edit-history log. Slots
//! live in a flat table with the sentinel at slot 0; content is addressed by
//! generational [`RingId`] handles, so a stale handle is detected and refused
//! instead of corrupting the ring.
//!
//! Insertion and removal are O(1) given a handle. There is no indexed random
//! access: traversal in ring order is the only supported access pattern,
//! matching the rendering walk.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::ModelError;

#[cfg(test)]
mod tests;

const SENTINEL: u32 = 0;

static NEXT_RING_TOKEN: AtomicU32 = AtomicU32::new(0);

/// Handle to a content slot in a [`Ring`].
///
/// Handles carry a generation so that a slot reused after removal does not
/// resurrect handles to its previous occupant, and the token of the ring
/// that minted them, so a handle from another ring is refused even when the
/// slot coordinates happen to coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingId {
	index: u32,
	generation: u32,
	ring: u32,
}

impl RingId {
	/// Slot index, for diagnostics only.
	pub fn index(&self) -> u32 {
		self.index
	}

	/// Slot generation, for diagnostics only.
	pub fn generation(&self) -> u32 {
		self.generation
	}
}

#[derive(Debug)]
struct Slot<T> {
	value: Option<T>,
	prev: u32,
	next: u32,
	generation: u32,
	live: bool,
}

/// An ordered container whose slots form a circular doubly-linked ring
/// around a sentinel.
///
/// Invariant: the ring is empty iff the sentinel's `next` is the sentinel
/// itself. Iteration order is always ring order (insertion-relative order).
#[derive(Debug)]
pub struct Ring<T> {
	slots: Vec<Slot<T>>,
	free: Vec<u32>,
	len: usize,
	token: u32,
}

impl<T> Ring<T> {
	/// Creates an empty ring.
	pub fn new() -> Self {
		Self {
			slots: vec![Slot {
				value: None,
				prev: SENTINEL,
				next: SENTINEL,
				generation: 0,
				live: false,
			}],
			free: Vec::new(),
			len: 0,
			token: NEXT_RING_TOKEN.fetch_add(1, Ordering::Relaxed),
		}
	}

	/// Number of content slots.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Whether the ring holds no content.
	pub fn is_empty(&self) -> bool {
		debug_assert_eq!(self.slots[SENTINEL as usize].next == SENTINEL, self.len == 0);
		self.slots[SENTINEL as usize].next == SENTINEL
	}

	fn check(&self, id: RingId) -> Result<u32, ModelError> {
		if id.ring != self.token {
			return Err(ModelError::InvalidOperationTarget("handle belongs to a different ring"));
		}
		let slot = self
			.slots
			.get(id.index as usize)
			.filter(|s| s.live && s.generation == id.generation);
		match slot {
			Some(_) => Ok(id.index),
			None => Err(ModelError::InvalidOperationTarget("stale or removed ring handle")),
		}
	}

	fn link_after(&mut self, prev: u32, value: T) -> RingId {
		let next = self.slots[prev as usize].next;
		let index = match self.free.pop() {
			Some(index) => {
				let slot = &mut self.slots[index as usize];
				slot.value = Some(value);
				slot.prev = prev;
				slot.next = next;
				slot.live = true;
				index
			}
			None => {
				let index = self.slots.len() as u32;
				self.slots.push(Slot {
					value: Some(value),
					prev,
					next,
					generation: 0,
					live: true,
				});
				index
			}
		};
		self.slots[prev as usize].next = index;
		self.slots[next as usize].prev = index;
		self.len += 1;
		RingId { index, generation: self.slots[index as usize].generation, ring: self.token }
	}

	/// Appends a value at the end of the ring (directly before the sentinel).
	pub fn append(&mut self, value: T) -> RingId {
		let tail = self.slots[SENTINEL as usize].prev;
		self.link_after(tail, value)
	}

	/// Inserts a value after `anchor`, or at the head when `anchor` is `None`.
	///
	/// Fails with [`ModelError::InvalidOperationTarget`] if the anchor is not
	/// a live member of this ring.
	pub fn insert_after(&mut self, anchor: Option<RingId>, value: T) -> Result<RingId, ModelError> {
		let prev = match anchor {
			Some(id) => self.check(id)?,
			None => SENTINEL,
		};
		Ok(self.link_after(prev, value))
	}

	/// Removes and returns the value at `id`.
	///
	/// Removing an already-removed or stale handle is an explicit error,
	/// never ring corruption.
	pub fn remove(&mut self, id: RingId) -> Result<T, ModelError> {
		let index = self.check(id)?;
		let (prev, next) = {
			let slot = &self.slots[index as usize];
			(slot.prev, slot.next)
		};
		self.slots[prev as usize].next = next;
		self.slots[next as usize].prev = prev;
		let slot = &mut self.slots[index as usize];
		slot.live = false;
		slot.generation += 1;
		let value = slot.value.take();
		self.free.push(index);
		self.len -= 1;
		value.ok_or(ModelError::InvalidOperationTarget("ring slot had no value"))
	}

	/// Whether `id` refers to a live member of this ring.
	pub fn contains(&self, id: RingId) -> bool {
		self.check(id).is_ok()
	}

	/// Returns the value at `id`, if live.
	pub fn get(&self, id: RingId) -> Option<&T> {
		let index = self.check(id).ok()?;
		self.slots[index as usize].value.as_ref()
	}

	/// Mutable access to the value at `id`, if live.
	pub fn get_mut(&mut self, id: RingId) -> Option<&mut T> {
		let index = self.check(id).ok()?;
		self.slots[index as usize].value.as_mut()
	}

	fn id_of(&self, index: u32) -> Option<RingId> {
		if index == SENTINEL {
			return None;
		}
		Some(RingId {
			index,
			generation: self.slots[index as usize].generation,
			ring: self.token,
		})
	}

	/// First content slot in ring order.
	pub fn first(&self) -> Option<RingId> {
		self.id_of(self.slots[SENTINEL as usize].next)
	}

	/// Last content slot in ring order.
	pub fn last(&self) -> Option<RingId> {
		self.id_of(self.slots[SENTINEL as usize].prev)
	}

	/// The member after `id`, or `None` at the end of the ring.
	pub fn next(&self, id: RingId) -> Result<Option<RingId>, ModelError> {
		let index = self.check(id)?;
		Ok(self.id_of(self.slots[index as usize].next))
	}

	/// The member before `id`, or `None` at the head of the ring.
	pub fn prev(&self, id: RingId) -> Result<Option<RingId>, ModelError> {
		let index = self.check(id)?;
		Ok(self.id_of(self.slots[index as usize].prev))
	}

	/// Forward traversal in ring order, sentinel-exclusive.
	pub fn iter(&self) -> Iter<'_, T> {
		Iter { ring: self, cursor: self.slots[SENTINEL as usize].next }
	}
}

impl<T> Default for Ring<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// Forward iterator over `(handle, value)` pairs in ring order.
pub struct Iter<'a, T> {
	ring: &'a Ring<T>,
	cursor: u32,
}

impl<'a, T> Iterator for Iter<'a, T> {
	type Item = (RingId, &'a T);

	fn next(&mut self) -> Option<Self::Item> {
		if self.cursor == SENTINEL {
			return None;
		}
		let index = self.cursor;
		let slot = &self.ring.slots[index as usize];
		self.cursor = slot.next;
		let value = slot.value.as_ref()?;
		Some((RingId { index, generation: slot.generation, ring: self.ring.token }, value))
	}
}

impl<'a, T> IntoIterator for &'a Ring<T> {
	type Item = (RingId, &'a T);
	type IntoIter = Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
