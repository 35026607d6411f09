pub mod delivery;
pub mod evolution;
pub mod rewards;

pub use delivery::{
    catch_random, deliver_rewards, evolve_pokemon, CatchRules, DropReason, FallbackCause,
    RewardDelivery, RewardTask,
};
pub use evolution::find_next_evolution;
pub use rewards::{evaluate_rewards, Milestones, RewardEvent};
