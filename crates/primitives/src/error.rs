//! Error types for structural model mutation.

use thiserror::Error;

/// Errors raised when an operation targets a node that is not in the state
/// the operation requires.
///
/// These are programmer errors: the caller handed us a stale handle, a node
/// from another container, or an already-removed node. They are raised
/// synchronously at the point of misuse so the ring is never silently
/// corrupted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
	/// The operation named a container member that is not a live member of
	/// that container (double removal, foreign anchor, stale slot handle).
	#[error("invalid operation target: {0}")]
	InvalidOperationTarget(&'static str),

	/// A node handle does not refer to an arena node.
	#[error("unknown node handle (index {index})")]
	UnknownNode {
		/// Slot index of the dead handle.
		index: u32,
	},

	/// A node had a different kind than the operation requires.
	#[error("node kind mismatch: expected {expected}")]
	KindMismatch {
		/// The kind the operation required.
		expected: &'static str,
	},
}
