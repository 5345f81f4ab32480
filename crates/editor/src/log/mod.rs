//! Edit log controller and undo/redo history.
//!
//! [`EditLog::apply`] is the only sanctioned way to mutate the model. It
//! computes the inverse *before* mutating (so the inverse captures
//! pre-mutation state), performs the mutation, appends the `(applied,
//! inverse)` pair to the history ring, and then notifies the single
//! registered observer with the op — in exactly that order, so observers see
//! ops in commit order.
//!
//! The observer seam is the [`EditHost`] trait; the editor facade implements
//! it by forwarding to the incremental renderer.
//!
//! # Undo/redo
//!
//! [`History`] keeps a cursor on the entry ring. Undo applies the inverse at
//! the cursor and steps back; redo re-applies the next entry's forward op. A
//! fresh `apply` while redo entries are pending truncates the forward
//! history (standard editor semantics, no branching).

use tracing::trace;
use trellis_primitives::{EditOp, ModelArena, ModelError, Ring, RingId};

use crate::error::{EditError, RenderError};


/// Maximum retained history size.
pub const MAX_UNDO: usize = 100;

/// One committed edit: the applied op paired with its inverse.
#[derive(Debug, Clone)]
pub struct LogEntry {
	/// The op as applied.
	pub applied: EditOp,
	/// The inverse captured before application.
	pub inverse: EditOp,
}

/// The single observer notified after each committed operation.
///
/// At most one observer sees each apply, in commit order. Fan-out to
/// multiple observers is deliberately unsupported.
pub trait EditHost {
	/// Called after `op` has been applied to `model`.
	fn operation_applied(&mut self, op: &EditOp, model: &ModelArena) -> Result<(), RenderError>;
}

/// Append-ordered history ring with an undo/redo cursor.
#[derive(Debug, Default)]
pub struct History {
	entries: Ring<LogEntry>,
	/// Last applied entry; `None` means everything has been undone.
	cursor: Option<RingId>,
}

impl History {
	/// Creates an empty history.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of retained entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the history holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Whether an undo step is available.
	pub fn can_undo(&self) -> bool {
		self.cursor.is_some()
	}

	/// Whether a redo step is available.
	pub fn can_redo(&self) -> bool {
		match self.cursor {
			Some(cursor) => {
				matches!(self.entries.next(cursor), Ok(Some(_)))
			}
			None => self.entries.first().is_some(),
		}
	}

	/// Appends a committed entry, truncating any redo entries first.
	pub fn record(&mut self, entry: LogEntry) -> Result<(), ModelError> {
		self.truncate_forward()?;
		let id = self.entries.append(entry);
		self.cursor = Some(id);
		while self.entries.len() > MAX_UNDO {
			let Some(first) = self.entries.first() else { break };
			if Some(first) == self.cursor {
				break;
			}
			self.entries.remove(first)?;
		}
		Ok(())
	}

	fn truncate_forward(&mut self) -> Result<(), ModelError> {
		loop {
			let next = match self.cursor {
				Some(cursor) => self.entries.next(cursor)?,
				None => self.entries.first(),
			};
			match next {
				Some(id) => {
					self.entries.remove(id)?;
				}
				None => return Ok(()),
			}
		}
	}

	/// Steps the cursor back, returning the inverse op to apply.
	pub fn step_back(&mut self) -> Result<Option<EditOp>, ModelError> {
		let Some(cursor) = self.cursor else { return Ok(None) };
		let inverse = self
			.entries
			.get(cursor)
			.ok_or(ModelError::InvalidOperationTarget("history cursor is stale"))?
			.inverse
			.clone();
		self.cursor = self.entries.prev(cursor)?;
		Ok(Some(inverse))
	}

	/// Steps the cursor forward, returning the forward op to re-apply.
	pub fn step_forward(&mut self) -> Result<Option<EditOp>, ModelError> {
		let next = match self.cursor {
			Some(cursor) => self.entries.next(cursor)?,
			None => self.entries.first(),
		};
		let Some(next) = next else { return Ok(None) };
		let applied = self
			.entries
			.get(next)
			.ok_or(ModelError::InvalidOperationTarget("history cursor is stale"))?
			.applied
			.clone();
		self.cursor = Some(next);
		Ok(Some(applied))
	}
}

/// The edit log controller: owns the model and the history.
#[derive(Debug, Default)]
pub struct EditLog {
	model: ModelArena,
	history: History,
}

impl EditLog {
	/// Creates a log over an empty model.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a log over a pre-built model.
	pub fn with_model(model: ModelArena) -> Self {
		Self { model, history: History::new() }
	}

	/// Read access to the model.
	pub fn model(&self) -> &ModelArena {
		&self.model
	}

	/// Mutable access to the model arena, for node allocation and initial
	/// tree construction only. Linked structure must be mutated through
	/// [`apply`](Self::apply).
	pub fn model_mut(&mut self) -> &mut ModelArena {
		&mut self.model
	}

	/// The history ring.
	pub fn history(&self) -> &History {
		&self.history
	}

	/// Applies an edit: invert, mutate, record, notify — in that order.
	pub fn apply<H: EditHost>(&mut self, edit: EditOp, host: &mut H) -> Result<(), EditError> {
		let inverse = edit.invert(&self.model)?;
		edit.apply(&mut self.model)?;
		trace!(?edit, "edit applied");
		self.history.record(LogEntry { applied: edit.clone(), inverse })?;
		host.operation_applied(&edit, &self.model)?;
		Ok(())
	}

	/// Undoes the most recent edit, if any. Returns whether anything was
	/// undone.
	pub fn undo<H: EditHost>(&mut self, host: &mut H) -> Result<bool, EditError> {
		let Some(inverse) = self.history.step_back()? else { return Ok(false) };
		inverse.apply(&mut self.model)?;
		trace!(?inverse, "edit undone");
		host.operation_applied(&inverse, &self.model)?;
		Ok(true)
	}

	/// Re-applies the next undone edit, if any. Returns whether anything was
	/// redone.
	pub fn redo<H: EditHost>(&mut self, host: &mut H) -> Result<bool, EditError> {
		let Some(applied) = self.history.step_forward()? else { return Ok(false) };
		applied.apply(&mut self.model)?;
		trace!(?applied, "edit redone");
		host.operation_applied(&applied, &self.model)?;
		Ok(true)
	}

	/// Whether an undo step is available.
	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
	}

	/// Whether a redo step is available.
	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}
}
