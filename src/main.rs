//! Terminal front end for the Pokémon multiplication quiz.

use anyhow::{Context, Result};
use clap::Parser;
use pokemon_quiz::config::{Paths, Settings};
use pokemon_quiz::interface::{self, Input};
use pokemon_quiz::{logging, PokeApiClient, ProgressStore, Session};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{info, warn};

// How long quitting waits for rewards that are still being fetched
const EXIT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "pokemon-quiz")]
#[command(about = "Multiplication practice that rewards you with Pokémon")]
struct Cli {
    /// Tables to practise, e.g. 2,7,9. Defaults to the last selection.
    #[arg(long, value_delimiter = ',')]
    tables: Option<Vec<u32>>,

    /// Settings file (RON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where progress is saved
    #[arg(long)]
    save: Option<PathBuf>,

    /// Forget all saved progress before starting
    #[arg(long, default_value_t = false)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = Paths::resolve();
    let settings_path = cli.config.clone().unwrap_or_else(|| paths.settings_path.clone());
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    logging::init(&settings.log_filter);

    let store = ProgressStore::new(cli.save.clone().unwrap_or_else(|| paths.save_path_for(&settings)));
    if cli.reset {
        store.reset().context("resetting saved progress")?;
        println!("Saved progress cleared.");
    }
    info!(save = %store.path().display(), "using saved progress");

    let source = Arc::new(PokeApiClient::new(settings.api_base_url.clone()));
    let mut session = Session::open(store, source, &settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("🔥 Welcome to the Pokémon Times-Tables Quiz! 🔥\n");
    println!("{}", interface::get_available_tables_display(&session));
    println!("{}", interface::display_status(&session));

    let intro = match cli.tables {
        Some(tables) => interface::start_quiz(&mut session, &tables).map_err(anyhow::Error::msg)?,
        None => match choose_tables(&mut lines, &mut session).await? {
            Some(intro) => intro,
            None => return Ok(()),
        },
    };
    println!("{}", intro);
    println!("(type an answer, 'dex' for your Pokédex, 'stats' for your score, 'quit' to leave)");

    while let Some(line) = lines.next_line().await? {
        if let Some(rewards) = interface::collect_rewards(&mut session).await {
            println!("\n{}\n", rewards);
        }

        match interface::parse_input(&line) {
            Input::Quit => break,
            Input::Empty => continue,
            Input::Pokedex => println!("{}", interface::display_pokedex(&session)),
            Input::Stats => {
                println!("{}", interface::display_status(&session));
                println!("{}", interface::display_current_question(&session));
            }
            Input::Answer(raw) => {
                let submission = session.submit(&raw)?;
                println!("{}", interface::format_submission(&submission, session.milestones()));

                let Some(delay) = submission.next_delay else {
                    continue;
                };
                // Rewards still being fetched are announced on a later turn
                tokio::time::sleep(delay).await;
                if let Some(rewards) = interface::collect_rewards(&mut session).await {
                    println!("\n{}\n", rewards);
                }

                let question = session.next_question()?;
                println!("\n{}", interface::format_question(&question));
            }
        }
    }

    match tokio::time::timeout(EXIT_SETTLE_TIMEOUT, session.settle_rewards()).await {
        Ok(deliveries) if !deliveries.is_empty() => {
            println!("\n{}", interface::format_deliveries(&deliveries))
        }
        Ok(_) => {}
        Err(_) => warn!("gave up waiting for rewards still being fetched"),
    }
    println!("\n{}", interface::display_status(&session));
    println!("Thanks for playing! Your progress has been saved.");
    Ok(())
}

/// Ask for tables until a valid selection is made. `None` when input ends.
async fn choose_tables<R>(lines: &mut Lines<R>, session: &mut Session) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let saved = session.selected_tables().to_vec();
    loop {
        if saved.is_empty() {
            println!("Which tables do you want to practise? (e.g. 2,7,9)");
        } else {
            let tables: Vec<String> = saved.iter().map(u32::to_string).collect();
            println!(
                "Which tables do you want to practise? Press Enter for {}",
                tables.join(", ")
            );
        }

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let tables = if line.trim().is_empty() && !saved.is_empty() {
            Ok(saved.clone())
        } else {
            interface::parse_tables(&line)
        };

        match tables.and_then(|tables| interface::start_quiz(session, &tables)) {
            Ok(intro) => return Ok(Some(intro)),
            Err(message) => println!("{}", message),
        }
    }
}
