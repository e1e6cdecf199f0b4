// ─── Module Tree ───
// A manifest node is either a single artifact or an ordered group of
// sub-modules, never both. See `tree.rs` for the invariants.

mod kind;
mod tree;

pub use kind::{ModuleKind, Presence};
pub use tree::{ensure_unique_ids, Module, ModuleContent};
