use crate::collection::Collection;
use crate::quiz::Outcome;
use serde::{Deserialize, Serialize};

/// Running score for the current player.
///
/// `total_score` and `correct_count` only grow. `streak` is session-only and
/// drops to zero on a wrong answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub total_score: u32,
    pub streak: u32,
    pub correct_count: u32,
}

/// A score change produced by a correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    pub previous_score: u32,
    pub new_score: u32,
}

impl ScoreState {
    /// Apply a graded outcome. Returns the score change for correct answers,
    /// which is what the reward ledger consumes.
    pub fn apply(&mut self, outcome: &Outcome) -> Option<ScoreChange> {
        match outcome {
            Outcome::Correct { points, .. } => {
                let previous_score = self.total_score;
                self.total_score = self.total_score.saturating_add(*points);
                self.streak = self.streak.saturating_add(1);
                self.correct_count = self.correct_count.saturating_add(1);
                Some(ScoreChange {
                    previous_score,
                    new_score: self.total_score,
                })
            }
            Outcome::Incorrect { .. } => {
                self.streak = 0;
                None
            }
            Outcome::Invalid => None,
        }
    }
}

/// Everything that survives a restart, in the saved-progress layout.
///
/// Missing fields load as zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub total_score: u32,
    pub correct_count: u32,
    pub pokemon_collection: Collection,
    pub selected_tables: Vec<u32>,
}

impl Snapshot {
    /// Score state restored from a snapshot; the streak starts over.
    pub fn score(&self) -> ScoreState {
        ScoreState {
            total_score: self.total_score,
            streak: 0,
            correct_count: self.correct_count,
        }
    }
}
