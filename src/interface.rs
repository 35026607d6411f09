//! Text rendering and command handling shared by the terminal game and the
//! MCP server.
//!
//! Everything here turns session state into player-facing text. The front
//! ends only decide when to print it.

use crate::progression::{FallbackCause, Milestones, RewardDelivery, RewardEvent};
use crate::quiz::{Outcome, Question};
use crate::session::{Session, Submission};
use schema::{DifficultyTier, MAX_TABLE};

const PROGRESS_BAR_WIDTH: usize = 20;

/// One line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Answer(String),
    Pokedex,
    Stats,
    Quit,
    Empty,
}

/// Classify a line typed by the player. Anything that is not a command is an
/// answer attempt, graded leniently.
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => Input::Empty,
        "dex" | "pokedex" => Input::Pokedex,
        "stats" | "status" => Input::Stats,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Answer(trimmed.to_string()),
    }
}

/// Parse a table list such as `2,7,9` or `2 7 9`.
pub fn parse_tables(input: &str) -> Result<Vec<u32>, String> {
    let tables = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| format!("'{}' is not a table number (use 1-{})", part, MAX_TABLE))
        })
        .collect::<Result<Vec<u32>, String>>()?;

    if tables.is_empty() {
        return Err("⚠️ Please select at least one table".to_string());
    }
    Ok(tables)
}

/// Returns formatted text listing the tables and what they are worth
pub fn get_available_tables_display(session: &Session) -> String {
    let mut output = String::from("Available Tables:\n");
    for tier in DifficultyTier::all() {
        let tables: Vec<String> = tier.tables().iter().map(u32::to_string).collect();
        output.push_str(&format!(
            "  {:<12} {:>2} pts  tables {}\n",
            tier.to_string(),
            tier.base_points(),
            tables.join(", ")
        ));
    }
    output.push_str(&format!(
        "Answer within {} seconds for double points.\n",
        session.speed_bonus_secs()
    ));
    output
}

/// Starts a game and returns the intro text with the first question
pub fn start_quiz(session: &mut Session, tables: &[u32]) -> Result<String, String> {
    let question = session
        .start(tables.iter().copied())
        .map_err(|e| format!("Could not start the quiz: {}", e))?;

    let tables: Vec<String> = session.selected_tables().iter().map(u32::to_string).collect();
    let milestones = session.milestones();
    Ok(format!(
        "🎮 Quiz started with tables {}!\nEvery {} points catches a Pokémon, every {} evolves one.\n\n{}",
        tables.join(", "),
        milestones.catch_every,
        milestones.evolve_every,
        format_question(&question)
    ))
}

pub fn format_question(question: &Question) -> String {
    format!("❓ {}", question)
}

/// Shows the current question with its running timer
pub fn display_current_question(session: &Session) -> String {
    match (session.current_question(), session.elapsed()) {
        (Some(question), Some(elapsed)) => {
            format!("{}  ⏱️ {:.1}s", format_question(question), elapsed.as_secs_f64())
        }
        _ if session.is_started() => "Next question is on its way...".to_string(),
        _ => "No quiz is running. Choose your tables to begin.".to_string(),
    }
}

/// Feedback line for a graded answer
pub fn format_submission(submission: &Submission, milestones: Milestones) -> String {
    let mut output = match submission.outcome {
        Outcome::Correct {
            points,
            speed_bonus: true,
        } => format!("✓ Correct! 🎉 +{} points (⚡ speed bonus x2)", points),
        Outcome::Correct { points, .. } => format!("✓ Correct! 🎉 +{} points", points),
        Outcome::Incorrect { correct_answer } => {
            format!("✗ Incorrect. The answer is {}", correct_answer)
        }
        Outcome::Invalid => return "⚠️ Please enter a number".to_string(),
    };

    output.push_str(&format!(
        "\nScore: {}  Streak: {}",
        submission.score.total_score, submission.score.streak
    ));
    for event in &submission.rewards {
        match event {
            RewardEvent::Catch => output.push_str(&format!(
                "\n🎁 {} more points! A wild Pokémon appeared...",
                milestones.catch_every
            )),
            RewardEvent::Evolve => {
                output.push_str("\n✨ Something is happening to one of your Pokémon...")
            }
        }
    }
    output
}

/// Announcement for one delivered (or missed) reward
pub fn format_delivery(delivery: &RewardDelivery) -> String {
    match delivery {
        RewardDelivery::Caught { creature, fallback } => {
            let headline = match fallback {
                None => "🎉 Congratulations! You caught a new Pokémon!",
                Some(FallbackCause::NothingCanEvolve) => {
                    "🌟 None of your Pokémon can evolve any further, so you caught a new one!"
                }
                Some(FallbackCause::EvolutionFailed(_)) => {
                    "🌟 The evolution fizzled, but you caught a new Pokémon instead!"
                }
            };
            format!("{}\n{:#}", headline, creature)
        }
        RewardDelivery::Evolved { from, into, .. } => format!(
            "🌟 Evolution! Your {} evolved into {}!\n{:#}",
            from.name, into.name, into
        ),
        RewardDelivery::Skipped { .. } => {
            "🌟 An evolution was unlocked, but you have no Pokémon to evolve yet.".to_string()
        }
        RewardDelivery::Dropped { event, .. } => match event {
            RewardEvent::Catch => {
                "😢 The Pokémon got away (could not reach the Pokédex). Your points are safe."
                    .to_string()
            }
            RewardEvent::Evolve => {
                "😢 The evolution failed (could not reach the Pokédex). Your points are safe."
                    .to_string()
            }
        },
    }
}

pub fn format_deliveries(deliveries: &[RewardDelivery]) -> String {
    deliveries
        .iter()
        .map(format_delivery)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `[#######-------------] 37 / 100`
pub fn progress_bar(points: u32, total: u32) -> String {
    let filled = if total == 0 {
        0
    } else {
        (points.min(total) as usize * PROGRESS_BAR_WIDTH) / total as usize
    };
    format!(
        "[{}{}] {} / {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        points,
        total
    )
}

/// The score panel
pub fn display_status(session: &Session) -> String {
    let score = session.score();
    let (points, total) = session.milestones().progress(score.total_score);

    let mut output = String::from("--- Trainer Status ---\n");
    output.push_str(&format!("Score:    {}\n", score.total_score));
    output.push_str(&format!("Streak:   {}\n", score.streak));
    output.push_str(&format!("Correct:  {}\n", score.correct_count));
    output.push_str(&format!("Pokémon:  {}\n", session.collection().len()));
    output.push_str(&format!("Next catch {}\n", progress_bar(points, total)));

    if !session.selected_tables().is_empty() {
        let tables: Vec<String> = session.selected_tables().iter().map(u32::to_string).collect();
        output.push_str(&format!("Tables:   {}\n", tables.join(", ")));
    }
    if session.pending_rewards() > 0 {
        output.push_str("🎁 A reward is on its way...\n");
    }
    output
}

/// The Pokédex, ordered by Pokédex number
pub fn display_pokedex(session: &Session) -> String {
    let collection = session.collection();
    if collection.is_empty() {
        return format!(
            "🎯 You haven't caught any Pokémon yet!\nEarn {} points to catch your first one.",
            session.milestones().catch_every
        );
    }

    let mut output = format!(
        "--- Pokédex ({} caught, score {}) ---\n",
        collection.len(),
        session.score().total_score
    );
    for creature in collection.sorted_by_id() {
        let card = format!("{:#}", creature);
        let mut lines = card.lines();
        if let Some(first_line) = lines.next() {
            output.push_str(&format!(" {}\n", first_line));
        }
        for line in lines {
            output.push_str(&format!("    {}\n", line));
        }
    }
    output
}

/// Announces the rewards whose fetch has finished since the last call.
/// Rewards still being fetched are left for a later turn.
pub async fn collect_rewards(session: &mut Session) -> Option<String> {
    let deliveries = session.settle_finished().await;
    if deliveries.is_empty() {
        None
    } else {
        Some(format_deliveries(&deliveries))
    }
}

/// Grades an answer, announces any rewards that are ready and moves on to
/// the next question without pausing. Used where there is no screen to hold
/// feedback on.
pub async fn answer_and_continue(session: &mut Session, raw_input: &str) -> Result<String, String> {
    let submission = session.submit(raw_input).map_err(|e| e.to_string())?;
    let mut output = format_submission(&submission, session.milestones());
    if submission.next_delay.is_none() {
        return Ok(output);
    }

    if let Some(rewards) = collect_rewards(session).await {
        output.push_str("\n\n");
        output.push_str(&rewards);
    }

    let question = session.next_question().map_err(|e| e.to_string())?;
    output.push_str("\n\n");
    output.push_str(&format_question(&question));
    Ok(output)
}
