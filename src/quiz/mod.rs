pub mod grading;
pub mod question;
pub mod timer;

pub use grading::{base_points, grade, parse_answer, Grader, Outcome, SPEED_BONUS_SECS};
pub use question::{generate_question, Question, TableSelection, MAX_MULTIPLIER};
pub use timer::QuestionTimer;
