//! Pokemon Quiz
//!
//! A multiplication-table quiz where points turn into Pokémon: every 100
//! points catches a random creature from PokeAPI and every 300 evolves one
//! the player already owns. Progress is saved between runs.

// --- MODULE DECLARATIONS ---
pub mod collection;
pub mod config;
pub mod errors;
pub mod interface;
pub mod logging;
pub mod pokeapi;
pub mod progression;
pub mod quiz;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;

// --- PUBLIC API RE-EXPORTS ---

// Shared data definitions from the `schema` crate.
pub use schema::{Creature, DifficultyTier, EvolutionChainNode, MAX_TABLE};

// Game flow.
pub use quiz::{grade, generate_question, Outcome, Question, TableSelection};
pub use session::{Session, Submission};
pub use state::{ScoreState, Snapshot};

// Rewards.
pub use collection::Collection;
pub use progression::{evaluate_rewards, evolve_pokemon, find_next_evolution, RewardDelivery, RewardEvent};

// Outside world.
pub use config::Settings;
pub use pokeapi::{CreatureSource, PokeApiClient};
pub use storage::ProgressStore;

// Crate-specific error and result types.
pub use errors::{
    ApiError, ApiResult, ConfigError, GameError, GameResult, QuizError, QuizResult, StorageError,
    StorageResult,
};
