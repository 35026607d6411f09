use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Highest multiplication table the quiz offers.
pub const MAX_TABLE: u32 = 12;

/// Difficulty bands for the multiplication tables.
/// Each band fixes the base points awarded for a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum DifficultyTier {
    #[strum(serialize = "Easy")]
    Easy,
    #[strum(serialize = "Easy-Medium")]
    EasyMedium,
    #[strum(serialize = "Medium")]
    Medium,
    #[strum(serialize = "Medium-Hard")]
    MediumHard,
    #[strum(serialize = "Hard")]
    Hard,
}

impl DifficultyTier {
    /// Tier of a table, or `None` when the table is not offered.
    pub fn for_table(table: u32) -> Option<Self> {
        match table {
            1 | 2 | 10 => Some(DifficultyTier::Easy),
            3..=5 => Some(DifficultyTier::EasyMedium),
            6 | 11 => Some(DifficultyTier::Medium),
            12 => Some(DifficultyTier::MediumHard),
            7..=9 => Some(DifficultyTier::Hard),
            _ => None,
        }
    }

    pub fn base_points(self) -> u32 {
        match self {
            DifficultyTier::Easy => 10,
            DifficultyTier::EasyMedium => 15,
            DifficultyTier::Medium => 20,
            DifficultyTier::MediumHard => 25,
            DifficultyTier::Hard => 30,
        }
    }

    /// Tables belonging to this tier, ascending.
    pub fn tables(self) -> Vec<u32> {
        (1..=MAX_TABLE)
            .filter(|&t| DifficultyTier::for_table(t) == Some(self))
            .collect()
    }

    pub fn all() -> Vec<DifficultyTier> {
        DifficultyTier::iter().collect()
    }
}
