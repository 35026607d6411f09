use crate::errors::{QuizError, QuizResult};
use crate::quiz::Question;
use schema::DifficultyTier;
use serde::{Deserialize, Serialize};

/// Answers submitted in under this many seconds score double.
pub const SPEED_BONUS_SECS: f64 = 5.0;
const SPEED_BONUS_MULTIPLIER: u32 = 2;

/// Result of grading one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Correct { points: u32, speed_bonus: bool },
    Incorrect { correct_answer: u32 },
    /// The input was not a number. Nothing changes, the streak survives.
    Invalid,
}

impl Outcome {
    pub fn points(&self) -> u32 {
        match self {
            Outcome::Correct { points, .. } => *points,
            _ => 0,
        }
    }
}

/// Base points for a correct answer on `table`
pub fn base_points(table: u32) -> QuizResult<u32> {
    DifficultyTier::for_table(table)
        .map(DifficultyTier::base_points)
        .ok_or(QuizError::UnknownTable(table))
}

/// Lenient integer parse: skips leading whitespace, accepts an optional sign,
/// then reads the leading run of digits and ignores whatever follows.
/// A `0x`/`0X` prefix switches to hexadecimal, as a browser's `parseInt`
/// without a radix does. Returns `None` when there are no digits. Oversized
/// values saturate.
pub fn parse_answer(raw_input: &str) -> Option<i64> {
    let trimmed = raw_input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, rest) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let digits: Vec<i64> = rest
        .chars()
        .map_while(|c| c.to_digit(radix))
        .map(i64::from)
        .collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.iter().fold(0i64, |acc, d| {
        acc.saturating_mul(i64::from(radix)).saturating_add(*d)
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Grades answers against the current question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grader {
    pub speed_bonus_secs: f64,
}

impl Default for Grader {
    fn default() -> Self {
        Self {
            speed_bonus_secs: SPEED_BONUS_SECS,
        }
    }
}

impl Grader {
    pub fn new(speed_bonus_secs: f64) -> Self {
        Self { speed_bonus_secs }
    }

    /// Grade `raw_input` for `question`, answered after `elapsed_secs`.
    ///
    /// Fails only when the question's table has no difficulty tier, which is
    /// a configuration error rather than a player mistake.
    pub fn grade(&self, question: &Question, raw_input: &str, elapsed_secs: f64) -> QuizResult<Outcome> {
        let Some(answer) = parse_answer(raw_input) else {
            return Ok(Outcome::Invalid);
        };

        if answer != i64::from(question.answer) {
            return Ok(Outcome::Incorrect {
                correct_answer: question.answer,
            });
        }

        let base = base_points(question.table)?;
        let speed_bonus = elapsed_secs < self.speed_bonus_secs;
        let points = if speed_bonus {
            base * SPEED_BONUS_MULTIPLIER
        } else {
            base
        };
        Ok(Outcome::Correct { points, speed_bonus })
    }
}

/// Grade with the standard five-second speed bonus.
pub fn grade(question: &Question, raw_input: &str, elapsed_secs: f64) -> QuizResult<Outcome> {
    Grader::default().grade(question, raw_input, elapsed_secs)
}
