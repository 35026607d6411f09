use crate::errors::{QuizError, QuizResult};
use rand::seq::IndexedRandom;
use rand::Rng;
use schema::DifficultyTier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multipliers are drawn from `0..=MAX_MULTIPLIER`.
pub const MAX_MULTIPLIER: u32 = 10;

/// A single "table × multiplier" question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub table: u32,
    pub multiplier: u32,
    pub answer: u32,
}

impl Question {
    pub fn new(table: u32, multiplier: u32) -> Self {
        Self {
            table,
            multiplier,
            answer: table * multiplier,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "What is {} × {}?", self.table, self.multiplier)
    }
}

/// A validated, de-duplicated, ascending set of tables to practise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSelection(Vec<u32>);

impl TableSelection {
    pub fn new(tables: impl IntoIterator<Item = u32>) -> QuizResult<Self> {
        let mut tables: Vec<u32> = tables.into_iter().collect();
        tables.sort_unstable();
        tables.dedup();

        if tables.is_empty() {
            return Err(QuizError::EmptySelection);
        }
        if let Some(&unknown) = tables
            .iter()
            .find(|&&t| DifficultyTier::for_table(t).is_none())
        {
            return Err(QuizError::UnknownTable(unknown));
        }
        Ok(Self(tables))
    }

    pub fn tables(&self) -> &[u32] {
        &self.0
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> Question {
        let table = self.0.choose(rng).copied().unwrap_or(1);
        Question::new(table, rng.random_range(0..=MAX_MULTIPLIER))
    }
}

/// Pick a table uniformly from `selected_tables` and a multiplier uniformly
/// from `0..=10`.
pub fn generate_question<R: Rng>(selected_tables: &[u32], rng: &mut R) -> QuizResult<Question> {
    let selection = TableSelection::new(selected_tables.iter().copied())?;
    Ok(selection.generate(rng))
}
