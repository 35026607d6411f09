//! The game session: the one owner of all mutable game state.
//!
//! Front ends create a [`Session`] at startup and drive it with user input.
//! Every mutation goes through `&mut self`, and the snapshot is persisted
//! after each correct answer and each delivered reward.

use crate::collection::Collection;
use crate::config::Settings;
use crate::errors::{QuizError, QuizResult};
use crate::pokeapi::CreatureSource;
use crate::progression::{CatchRules, Milestones, RewardDelivery, RewardEvent, RewardTask};
use crate::quiz::{Grader, Outcome, Question, QuestionTimer, TableSelection};
use crate::state::{ScoreState, Snapshot};
use crate::storage::ProgressStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What a submission did
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub outcome: Outcome,
    pub score: ScoreState,
    /// Rewards unlocked by this answer, being fetched in the background
    pub rewards: Vec<RewardEvent>,
    /// Pause before the next question; `None` when the question stays up
    pub next_delay: Option<Duration>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy)]
struct ActiveQuestion {
    question: Question,
    timer: QuestionTimer,
}

pub struct Session {
    score: ScoreState,
    collection: Collection,
    selection: Option<TableSelection>,
    saved_tables: Vec<u32>,
    active: Option<ActiveQuestion>,
    pending: Vec<RewardTask>,
    store: Option<ProgressStore>,
    source: Arc<dyn CreatureSource>,
    grader: Grader,
    milestones: Milestones,
    catch_rules: CatchRules,
    correct_delay: Duration,
    incorrect_delay: Duration,
    rng: StdRng,
}

impl Session {
    /// Session restored from `snapshot`, kept in memory only
    pub fn new(snapshot: Snapshot, source: Arc<dyn CreatureSource>, settings: &Settings) -> Self {
        Self {
            score: snapshot.score(),
            collection: snapshot.pokemon_collection,
            selection: None,
            saved_tables: snapshot.selected_tables,
            active: None,
            pending: Vec::new(),
            store: None,
            source,
            grader: settings.grader(),
            milestones: settings.milestones(),
            catch_rules: settings.catch_rules(),
            correct_delay: settings.correct_delay(),
            incorrect_delay: settings.incorrect_delay(),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Session backed by saved progress; loads whatever `store` holds
    pub fn open(store: ProgressStore, source: Arc<dyn CreatureSource>, settings: &Settings) -> Self {
        let snapshot = store.load();
        let mut session = Self::new(snapshot, source, settings);
        session.store = Some(store);
        session
    }

    /// Replace the random source, for reproducible sessions
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn milestones(&self) -> Milestones {
        self.milestones
    }

    /// Answers faster than this many seconds score double
    pub fn speed_bonus_secs(&self) -> f64 {
        self.grader.speed_bonus_secs
    }

    /// Tables in play, or the ones remembered from the last game
    pub fn selected_tables(&self) -> &[u32] {
        match &self.selection {
            Some(selection) => selection.tables(),
            None => &self.saved_tables,
        }
    }

    pub fn is_started(&self) -> bool {
        self.selection.is_some()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.active.as_ref().map(|a| &a.question)
    }

    /// Time on the current question so far
    pub fn elapsed(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.timer.elapsed())
    }

    pub fn pending_rewards(&self) -> usize {
        self.pending.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            total_score: self.score.total_score,
            correct_count: self.score.correct_count,
            pokemon_collection: self.collection.clone(),
            selected_tables: self.selected_tables().to_vec(),
        }
    }

    /// Start a game on `tables` and show the first question.
    pub fn start(&mut self, tables: impl IntoIterator<Item = u32>) -> QuizResult<Question> {
        let selection = TableSelection::new(tables)?;
        debug!(tables = ?selection.tables(), "game started");
        self.selection = Some(selection);
        self.persist();
        self.next_question()
    }

    /// Put a fresh question on screen and restart the timer.
    pub fn next_question(&mut self) -> QuizResult<Question> {
        let selection = self.selection.as_ref().ok_or(QuizError::EmptySelection)?;
        let question = selection.generate(&mut self.rng);
        self.active = Some(ActiveQuestion {
            question,
            timer: QuestionTimer::start(),
        });
        Ok(question)
    }

    /// Grade `raw_input` against the current question.
    ///
    /// Non-numeric input changes nothing and leaves the question and its
    /// timer running. Otherwise the question is retired, the score updated
    /// and any unlocked rewards start fetching in the background.
    pub fn submit(&mut self, raw_input: &str) -> QuizResult<Submission> {
        let active = self.active.as_mut().ok_or(QuizError::NoActiveQuestion)?;
        let outcome = self
            .grader
            .grade(&active.question, raw_input, active.timer.elapsed_secs())?;

        if outcome == Outcome::Invalid {
            return Ok(Submission {
                outcome,
                score: self.score,
                rewards: Vec::new(),
                next_delay: None,
                elapsed: active.timer.elapsed(),
            });
        }

        let elapsed = active.timer.stop();
        self.active = None;

        let mut rewards = Vec::new();
        let next_delay = match self.score.apply(&outcome) {
            Some(change) => {
                rewards = self.milestones.evaluate(change.previous_score, change.new_score);
                if !rewards.is_empty() {
                    self.spawn_rewards(rewards.clone());
                }
                self.persist();
                self.correct_delay
            }
            None => self.incorrect_delay,
        };

        Ok(Submission {
            outcome,
            score: self.score,
            rewards,
            next_delay: Some(next_delay),
            elapsed,
        })
    }

    fn spawn_rewards(&mut self, events: Vec<RewardEvent>) {
        debug!(?events, "rewards unlocked");
        let task = RewardTask::spawn(
            events,
            self.collection.clone(),
            Arc::clone(&self.source),
            self.catch_rules.clone(),
            StdRng::from_rng(&mut self.rng),
        );
        self.pending.push(task);
    }

    /// Whether any reward task has finished and is waiting to be applied
    pub fn rewards_ready(&self) -> bool {
        self.pending.iter().any(RewardTask::is_finished)
    }

    /// Apply the reward tasks that have already finished. Never waits on
    /// the network: tasks still running stay pending for a later call.
    pub async fn settle_finished(&mut self) -> Vec<RewardDelivery> {
        let (finished, running): (Vec<RewardTask>, Vec<RewardTask>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(RewardTask::is_finished);
        self.pending = running;
        self.apply_tasks(finished).await
    }

    /// Wait for every outstanding reward task, in the order they were
    /// started, and apply what they delivered.
    pub async fn settle_rewards(&mut self) -> Vec<RewardDelivery> {
        let tasks = std::mem::take(&mut self.pending);
        self.apply_tasks(tasks).await
    }

    async fn apply_tasks(&mut self, tasks: Vec<RewardTask>) -> Vec<RewardDelivery> {
        let mut deliveries = Vec::new();
        let mut changed = false;

        for task in tasks {
            for delivery in task.join().await {
                changed |= delivery.apply_to(&mut self.collection);
                deliveries.push(delivery);
            }
        }

        if changed {
            self.persist();
        }
        deliveries
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        // Saving must never interrupt play
        if let Err(e) = store.save(&self.snapshot()) {
            warn!(error = %e, "could not save progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::DropReason;
    use crate::test_support::{owned, FakeDex, StalledDex};
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings {
            max_creature_id: 3,
            ..Settings::default()
        }
    }

    fn dex() -> Arc<dyn CreatureSource> {
        Arc::new(FakeDex::new().with_line(&[(1, "bulbasaur"), (2, "ivysaur"), (3, "venusaur")]))
    }

    fn session_with(snapshot: Snapshot, source: Arc<dyn CreatureSource>) -> Session {
        Session::new(snapshot, source, &settings()).with_rng(StdRng::seed_from_u64(5))
    }

    fn answer_correctly(session: &mut Session) -> Submission {
        let answer = session.current_question().map(|q| q.answer).unwrap();
        session.submit(&answer.to_string()).unwrap()
    }

    #[test]
    fn test_start_validates_tables() {
        let mut session = session_with(Snapshot::default(), dex());
        assert_eq!(session.start(Vec::<u32>::new()), Err(QuizError::EmptySelection));
        assert_eq!(session.start([4, 15]), Err(QuizError::UnknownTable(15)));
        assert!(!session.is_started());

        let question = session.start([7]).unwrap();
        assert_eq!(question.table, 7);
        assert_eq!(session.selected_tables(), &[7]);
    }

    #[test]
    fn test_submit_without_question() {
        let mut session = session_with(Snapshot::default(), dex());
        assert_eq!(session.submit("4"), Err(QuizError::NoActiveQuestion));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_keeps_question_and_streak() {
        let mut session = session_with(Snapshot::default(), dex());
        session.start([2]).unwrap();
        answer_correctly(&mut session);
        let question = session.next_question().unwrap();

        let submission = session.submit("two").unwrap();

        assert_eq!(submission.outcome, Outcome::Invalid);
        assert_eq!(submission.next_delay, None);
        assert_eq!(session.current_question(), Some(&question));
        assert_eq!(session.score().streak, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_answer_resets_streak() {
        let mut session = session_with(Snapshot::default(), dex());
        session.start([3]).unwrap();
        answer_correctly(&mut session);
        let question = session.next_question().unwrap();

        let submission = session.submit(&(question.answer + 1).to_string()).unwrap();

        assert_eq!(
            submission.outcome,
            Outcome::Incorrect {
                correct_answer: question.answer
            }
        );
        assert_eq!(submission.next_delay, Some(Duration::from_secs(3)));
        assert_eq!(
            session.score(),
            ScoreState {
                total_score: 30,
                streak: 0,
                correct_count: 1
            }
        );
        assert!(session.current_question().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_bonus_depends_on_elapsed_time() {
        let mut session = session_with(Snapshot::default(), dex());
        session.start([8]).unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        let fast = answer_correctly(&mut session);
        assert_eq!(
            fast.outcome,
            Outcome::Correct {
                points: 60,
                speed_bonus: true
            }
        );
        assert_eq!(fast.elapsed, Duration::from_secs(3));
        assert_eq!(fast.next_delay, Some(Duration::from_secs(2)));

        session.next_question().unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        let slow = answer_correctly(&mut session);
        assert_eq!(
            slow.outcome,
            Outcome::Correct {
                points: 30,
                speed_bonus: false
            }
        );
        assert_eq!(session.score().total_score, 90);
    }

    #[tokio::test]
    async fn test_crossing_milestones_delivers_rewards() {
        let snapshot = Snapshot {
            total_score: 290,
            correct_count: 10,
            pokemon_collection: Collection::from_creatures(vec![owned(1, "bulbasaur")]),
            selected_tables: vec![9],
        };
        let mut session = session_with(snapshot, dex());
        session.start([9]).unwrap();

        let submission = answer_correctly(&mut session);

        assert_eq!(submission.rewards, vec![RewardEvent::Catch, RewardEvent::Evolve]);
        assert_eq!(session.pending_rewards(), 1);

        let deliveries = session.settle_rewards().await;

        assert_eq!(deliveries.len(), 2);
        assert!(deliveries.iter().all(RewardDelivery::is_delivered));
        assert_eq!(session.pending_rewards(), 0);
        assert_eq!(session.collection().len(), 2);
        assert!(session.settle_rewards().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_rewards_keep_points() {
        let mut session = session_with(
            Snapshot {
                total_score: 95,
                ..Snapshot::default()
            },
            Arc::new(FakeDex::new().offline()),
        );
        session.start([1]).unwrap();

        let submission = answer_correctly(&mut session);
        assert_eq!(submission.rewards, vec![RewardEvent::Catch]);

        let deliveries = session.settle_rewards().await;

        assert!(matches!(
            deliveries.as_slice(),
            [RewardDelivery::Dropped {
                reason: DropReason::CatchFailed(_),
                ..
            }]
        ));
        assert!(session.collection().is_empty());
        assert!(session.score().total_score >= 105);
    }

    #[tokio::test]
    async fn test_progress_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let mut session = Session::open(ProgressStore::new(&path), dex(), &settings())
            .with_rng(StdRng::seed_from_u64(11));
        session.start([5, 2]).unwrap();
        for _ in 0..4 {
            answer_correctly(&mut session);
            session.next_question().unwrap();
        }
        session.settle_rewards().await;
        let expected = session.snapshot();

        let reopened = Session::open(ProgressStore::new(&path), dex(), &settings());
        assert_eq!(reopened.snapshot(), expected);
        assert_eq!(reopened.score().streak, 0);
        assert_eq!(reopened.selected_tables(), &[2, 5]);
        assert!(!reopened.is_started());
    }

    #[tokio::test]
    async fn test_stalled_rewards_do_not_hold_up_play() {
        let mut session = session_with(
            Snapshot {
                total_score: 95,
                ..Snapshot::default()
            },
            Arc::new(StalledDex),
        );
        session.start([10]).unwrap();

        let submission = answer_correctly(&mut session);
        assert_eq!(submission.rewards, vec![RewardEvent::Catch]);

        let settled = tokio::time::timeout(Duration::from_secs(5), session.settle_finished())
            .await
            .expect("settling finished rewards must not wait on the network");
        assert!(settled.is_empty());
        assert_eq!(session.pending_rewards(), 1);
        assert!(!session.rewards_ready());
        assert!(session.next_question().is_ok());
    }

    #[tokio::test]
    async fn test_finished_rewards_are_applied_on_a_later_call() {
        let mut session = session_with(
            Snapshot {
                total_score: 95,
                ..Snapshot::default()
            },
            dex(),
        );
        session.start([10]).unwrap();
        answer_correctly(&mut session);

        while !session.rewards_ready() {
            tokio::task::yield_now().await;
        }
        let deliveries = session.settle_finished().await;

        assert!(matches!(deliveries.as_slice(), [RewardDelivery::Caught { .. }]));
        assert_eq!(session.pending_rewards(), 0);
        assert_eq!(session.collection().len(), 1);
    }
}
