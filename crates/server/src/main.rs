//! Postsmith Server
//!
//! Axum server that embeds and serves the form UI with API routes.
//! One page, one trigger: research a topic, write a post, author an
//! image prompt.

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode, Uri},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use futures::stream::{self, Stream};
use postsmith_core::crew::{news_post_crew, Orchestrator, RunEvent};
use postsmith_core::models::DEFAULT_TOPIC;
use postsmith_core::{Credentials, Language, PipelineOutput, RunParams, SecretStore};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc, RwLock},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use utoipa::{OpenApi, ToSchema};

/// Embedded frontend assets
#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

/// Application state
struct AppState {
    run_state: RwLock<RunState>,
    event_tx: broadcast::Sender<RunEvent>,
    /// Read-only after startup
    store: SecretStore,
}

type SharedState = Arc<AppState>;

// === API Types ===

/// Per-run state machine, observable via the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
enum RunState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Serialize, ToSchema)]
struct StatusResponse {
    state: RunState,
}

#[derive(Deserialize, ToSchema)]
struct GenerateRequest {
    /// Anthropic API key; falls back to the secret store when short or absent
    anthropic_key: Option<String>,
    /// Serper API key; same fallback
    serper_key: Option<String>,
    /// Research topic
    topic: Option<String>,
    /// Post language: "hebrew" or "english"
    language: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct GenerateResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    post: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl GenerateResponse {
    fn success(output: PipelineOutput) -> Self {
        Self {
            success: true,
            post: Some(output.post),
            image_prompt: output.image_prompt,
            raw: Some(output.raw),
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            post: None,
            image_prompt: None,
            raw: None,
            error: Some(message.into()),
        }
    }
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Postsmith API",
        version = "1.0.0",
        description = "API for the Postsmith post and image-prompt generator"
    ),
    paths(get_status, generate),
    components(schemas(StatusResponse, RunState, GenerateRequest, GenerateResponse)),
    tags(
        (name = "run", description = "Pipeline runs")
    )
)]
struct ApiDoc;

// === API Handlers ===

/// Get the current run state
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "run",
    responses(
        (status = 200, description = "Current run state", body = StatusResponse)
    )
)]
async fn get_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let run_state = state.run_state.read().await;
    Json(StatusResponse { state: *run_state })
}

/// Run the full pipeline and return the generated post and image prompt
#[utoipa::path(
    post,
    path = "/api/v1/generate",
    tag = "run",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Pipeline result or a user-facing error", body = GenerateResponse)
    )
)]
async fn generate(
    State(state): State<SharedState>,
    Json(req): Json<GenerateRequest>,
) -> Json<GenerateResponse> {
    // Credentials first: when either key is missing the pipeline is
    // never constructed, let alone invoked.
    let credentials = match Credentials::resolve(
        &state.store,
        req.anthropic_key.as_deref(),
        req.serper_key.as_deref(),
    ) {
        Ok(credentials) => credentials,
        Err(err) => return Json(GenerateResponse::failure(err.to_string())),
    };

    let language = match req.language.as_deref() {
        Some(raw) => match raw.parse::<Language>() {
            Ok(language) => language,
            Err(err) => return Json(GenerateResponse::failure(err)),
        },
        None => Language::default(),
    };

    let topic = req
        .topic
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

    let params = RunParams::new(topic, language);
    info!(topic = %params.topic, language = %params.language, "starting pipeline run");

    *state.run_state.write().await = RunState::Running;

    // Bridge run events to the SSE broadcast channel.
    let (event_tx, mut event_rx) = mpsc::channel::<RunEvent>(100);
    let broadcast_tx = state.event_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let _ = broadcast_tx.send(event);
        }
    });

    let crew = news_post_crew(&params);
    let orchestrator = Orchestrator::new(&credentials).with_event_channel(event_tx);

    match orchestrator.run(&crew).await {
        Ok(raw) => {
            *state.run_state.write().await = RunState::Succeeded;
            info!("pipeline run completed");
            Json(GenerateResponse::success(PipelineOutput::parse(raw)))
        }
        Err(err) => {
            *state.run_state.write().await = RunState::Failed;
            error!(error = %err, "pipeline run failed");
            Json(GenerateResponse::failure(err.to_string()))
        }
    }
}

/// SSE endpoint for run events with heartbeat
async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_tx.subscribe();

    // Timeout-based stream with a heartbeat comment every 15 seconds
    let stream = stream::unfold(rx, |mut rx| async move {
        let timeout = tokio::time::timeout(std::time::Duration::from_secs(15), rx.recv()).await;

        match timeout {
            Ok(Ok(event)) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            Ok(Err(_)) => None, // Channel closed
            Err(_) => Some((Ok(Event::default().comment("heartbeat")), rx)),
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn serve_static(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    if let Some(file) = Assets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime.as_ref())
            .body(Body::from(file.data.to_vec()))
            .unwrap();
    }

    // Single-page fallback
    if let Some(file) = Assets::get("index.html") {
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html")
            .body(Body::from(file.data.to_vec()))
            .unwrap();
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("Not Found"))
        .unwrap()
}

// === Server Entry ===

async fn run_server(port: u16) -> anyhow::Result<()> {
    let (event_tx, _) = broadcast::channel::<RunEvent>(100);

    let state: SharedState = Arc::new(AppState {
        run_state: RwLock::new(RunState::default()),
        event_tx,
        store: SecretStore::from_env(),
    });

    let api_routes = Router::new()
        .route("/status", get(get_status))
        .route("/generate", post(generate))
        .route("/events", get(events))
        .route("/openapi.json", get(serve_openapi));

    let app = Router::new()
        .nest("/api/v1", api_routes)
        .fallback(get(serve_static))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Postsmith server running at http://{addr}");
    info!("  POST /api/v1/generate  - run the pipeline");
    info!("  GET  /api/v1/status    - run state");
    info!("  GET  /api/v1/events    - run events (SSE)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the pipeline once from the terminal, no server.
async fn run_cli(topic: Option<String>, language: String) -> anyhow::Result<()> {
    let language: Language = language.parse().map_err(anyhow::Error::msg)?;
    let store = SecretStore::from_env();
    let credentials = Credentials::resolve(&store, None, None)?;

    let params = RunParams::new(
        topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
        language,
    );
    let crew = news_post_crew(&params);

    let raw = Orchestrator::new(&credentials).run(&crew).await?;
    let output = PipelineOutput::parse(raw);

    println!("{}", output.post);
    if let Some(prompt) = &output.image_prompt {
        println!("\n{}\n", postsmith_core::output::SEPARATOR);
        println!("{prompt}");
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Postsmith - research a topic, write a post, author an image prompt"
)]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the Postsmith server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Run the pipeline once and print the result
    Run {
        /// Topic to research
        topic: Option<String>,
        /// Post language (hebrew | english)
        #[arg(short, long, default_value = "hebrew")]
        language: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keys from .env feed the secret store snapshot taken at startup.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Run { topic, language }) => run_cli(topic, language).await,
        Some(CliCommand::Serve { port }) => run_server(port).await,
        None => run_server(8080).await,
    }
}
