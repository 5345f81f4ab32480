//! Core primitives for the structural editor model: the ordered ring
//! container, the node arena, and reversible edit operations.

/// Reversible structural edit operations and their inverses.
pub mod edit;
/// Error types raised on structural misuse.
pub mod error;
/// Model tree: arena-allocated leaves, operator steps, and chains.
pub mod model;
/// Circular doubly-linked ordered container backed by a slot table.
pub mod ring;

pub use edit::{EditOp, FieldEdit};
pub use error::ModelError;
pub use model::{Chain, Leaf, ModelArena, Node, NodeId, OpSym, Step, TypeTag};
pub use ring::{Ring, RingId};
