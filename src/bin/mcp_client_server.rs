//! Pokemon Quiz MCP Server
//!
//! A Model Context Protocol server using the official Rust SDK (rmcp) that
//! lets an LLM client play the multiplication quiz over stdio.

use std::borrow::Cow;
use std::sync::Arc;

use pokemon_quiz::config::{Paths, Settings};
use pokemon_quiz::interface::*;
use pokemon_quiz::{logging, PokeApiClient, ProgressStore, Session};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};
use tokio::sync::Mutex;
use tracing::info;

const NOT_STARTED: &str = "No quiz is currently running. Use 'start_quiz' to begin.";

#[derive(Clone)]
pub struct PokemonQuizService {
    tool_router: ToolRouter<PokemonQuizService>,
    session: Arc<Mutex<Session>>,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StartQuizRequest {
    #[schemars(description = "Multiplication tables to practise (1-12), e.g. [2, 7, 9]")]
    pub tables: Vec<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnswerRequest {
    #[schemars(description = "The answer to the current question")]
    pub answer: String,
}

fn text(body: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

/// Applies rewards that finished fetching since the last call, then renders.
/// The announcement goes above the rendered text.
async fn with_rewards(
    session: &mut Session,
    render: impl FnOnce(&Session) -> String,
) -> Result<CallToolResult, McpError> {
    let rewards = collect_rewards(session).await;
    let body = render(session);
    match rewards {
        Some(rewards) => text(format!("{}\n\n{}", rewards, body)),
        None => text(body),
    }
}

#[tool_router]
impl PokemonQuizService {
    pub fn new(session: Session) -> Self {
        Self {
            tool_router: Self::tool_router(),
            session: Arc::new(Mutex::new(session)),
        }
    }

    #[tool(description = "Start a quiz on the chosen multiplication tables")]
    async fn start_quiz(
        &self,
        Parameters(request): Parameters<StartQuizRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        match start_quiz(&mut session, &request.tables) {
            Ok(intro) => text(format!("{}\n\n{}", get_available_tables_display(&session), intro)),
            Err(e) => Err(McpError {
                code: ErrorCode(-32602),
                message: Cow::from(e),
                data: None,
            }),
        }
    }

    #[tool(description = "Show the current question and how long it has been up")]
    async fn get_question(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        if !session.is_started() {
            return text(NOT_STARTED.to_string());
        }
        with_rewards(&mut session, display_current_question).await
    }

    #[tool(description = "Answer the current question; the next question is shown along with any rewards that have arrived")]
    async fn answer(
        &self,
        Parameters(request): Parameters<AnswerRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        if !session.is_started() {
            return text(NOT_STARTED.to_string());
        }
        match answer_and_continue(&mut session, &request.answer).await {
            Ok(result) => text(result),
            Err(e) => text(format!("Error: {}", e)),
        }
    }

    #[tool(description = "Get the score, streak, progress to the next Pokémon and selected tables")]
    async fn get_status(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        with_rewards(&mut session, display_status).await
    }

    #[tool(description = "List every Pokémon caught so far, ordered by Pokédex number")]
    async fn view_pokedex(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        with_rewards(&mut session, display_pokedex).await
    }
}

#[tool_handler]
impl ServerHandler for PokemonQuizService {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Paths::resolve();
    let settings = Settings::load(&paths.settings_path)?;
    logging::init(&settings.log_filter);
    info!("Pokemon Quiz MCP Server starting...");

    let store = ProgressStore::new(paths.save_path_for(&settings));
    let source = Arc::new(PokeApiClient::new(settings.api_base_url.clone()));
    let service = PokemonQuizService::new(Session::open(store, source, &settings));
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;
    info!("Server running, waiting for shutdown...");
    let quit_reason = server.waiting().await?;

    info!(?quit_reason, "Pokemon Quiz MCP Server exiting");
    Ok(())
}
