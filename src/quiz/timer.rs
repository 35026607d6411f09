use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock stopwatch for the question on screen.
///
/// There is no expiry: a late answer is still graded against the current
/// question, the timer only reports how long it took.
#[derive(Debug, Clone, Copy)]
pub struct QuestionTimer {
    started: Instant,
    stopped: Option<Duration>,
}

impl QuestionTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
        }
    }

    /// Time since the question was shown, frozen once stopped.
    pub fn elapsed(&self) -> Duration {
        self.stopped.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Freeze the reading. Stopping twice keeps the first reading.
    pub fn stop(&mut self) -> Duration {
        *self.stopped.get_or_insert_with(|| self.started.elapsed())
    }

    pub fn is_running(&self) -> bool {
        self.stopped.is_none()
    }

    /// Display form used by the front ends, e.g. `3.4s`
    pub fn display(&self) -> String {
        format!("{:.1}s", self.elapsed_secs())
    }
}
