//! Shared domain types for the demand board.
//!
//! Everything here is plain data: identities and roles supplied by the
//! surrounding application, GUT prioritization fields, the persisted
//! board/column/card records and the snapshot views handed to clients.
//! Storage and authorization live in the `demand-board` crate.

pub mod gut;
pub mod identity;
pub mod models;

pub use gut::{GutScores, GutTier};
pub use identity::{Identity, Role};
pub use models::*;
