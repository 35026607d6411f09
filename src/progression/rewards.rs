use serde::{Deserialize, Serialize};

// Default milestone intervals
pub const CATCH_EVERY: u32 = 100;
pub const EVOLVE_EVERY: u32 = 300;

/// A reward unlocked by a scoring event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardEvent {
    /// Catch a new random creature
    Catch,
    /// Evolve one owned creature to its next stage
    Evolve,
}

/// Score intervals that gate rewards.
///
/// Every check is a function of the two totals only, so re-evaluating the
/// same pair of scores always yields the same events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones {
    pub catch_every: u32,
    pub evolve_every: u32,
}

impl Default for Milestones {
    fn default() -> Self {
        Self {
            catch_every: CATCH_EVERY,
            evolve_every: EVOLVE_EVERY,
        }
    }
}

impl Milestones {
    pub fn catch_milestone(&self, score: u32) -> u32 {
        score / self.catch_every
    }

    pub fn evolve_milestone(&self, score: u32) -> u32 {
        score / self.evolve_every
    }

    /// Events unlocked by moving from `previous_score` to `new_score`.
    ///
    /// At most one event of each kind, however many intervals were skipped.
    /// `Catch` always comes before `Evolve`.
    pub fn evaluate(&self, previous_score: u32, new_score: u32) -> Vec<RewardEvent> {
        let mut events = Vec::new();

        if self.catch_milestone(new_score) > self.catch_milestone(previous_score) {
            events.push(RewardEvent::Catch);
        }
        if self.evolve_milestone(new_score) > self.evolve_milestone(previous_score) {
            events.push(RewardEvent::Evolve);
        }

        events
    }

    /// Points earned inside the current catch interval, and the interval size.
    /// Drives the `37 / 100` progress bar.
    pub fn progress(&self, score: u32) -> (u32, u32) {
        (score % self.catch_every, self.catch_every)
    }
}

/// [`Milestones::evaluate`] with the standard 100/300 intervals
pub fn evaluate_rewards(previous_score: u32, new_score: u32) -> Vec<RewardEvent> {
    Milestones::default().evaluate(previous_score, new_score)
}
