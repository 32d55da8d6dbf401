//! # Unification Protocol
//!
//! The collective steps shared by every distributed encode: vocabulary
//! unification, then (with position sharding) order restoration.

pub mod assembler;
pub mod unifier;
pub mod wire;

pub use assembler::{PositionedShard, gather_positioned, place_by_position};
pub use unifier::unify_vocabulary;
