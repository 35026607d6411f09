// Pokemon Quiz Schema - Shared type definitions
// This crate contains the data contract shared between the quiz library and
// its front ends: owned creatures, evolution trees, difficulty tiers and the
// subset of PokeAPI payloads the game consumes.

// Re-export the main types
pub use creature::*;
pub use difficulty::*;
pub use pokeapi_types::*;

pub mod creature;
pub mod difficulty;
pub mod pokeapi_types;
