use std::io::IsTerminal;

use ai_agent_cli::{completions, interactive, oneshot, wiring};
use ai_agent_common::config::{AppConfig, TransportMode};
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "ai-agent")]
#[command(about = "Agent swarm runtime: tool-aware chat, a bounded multi-agent scheduler, and stdio/HTTP transports")]
struct Cli {
    #[arg(long, default_value = "agent-swarm.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single query through the tool-aware model adapter and print the result.
    Execute { query: String },
    /// Start an interactive REPL against the tool-aware model adapter.
    Interactive,
    /// Start the stdio JSON-RPC and/or HTTP transport, per config (or --mode).
    Serve {
        #[arg(long, value_enum)]
        mode: Option<ServeMode>,
    },
    /// Emit shell completions for this CLI.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ServeMode {
    Stdio,
    Http,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Some(Commands::Execute { query }) => {
            let state = wiring::build_app_state(&config);
            oneshot::execute(&query, &state).await?;
        }
        Some(Commands::Interactive) => {
            let state = wiring::build_app_state(&config);
            interactive::run(&state).await?;
        }
        Some(Commands::Completions { shell }) => {
            completions::generate(shell);
        }
        Some(Commands::Serve { mode }) => {
            let state = wiring::build_app_state(&config);
            match mode {
                Some(ServeMode::Stdio) => serve_stdio(state).await?,
                Some(ServeMode::Http) => serve_http(state, &config).await?,
                None => serve_by_config_mode(state, &config).await?,
            }
        }
        None => {
            let state = wiring::build_app_state(&config);
            serve_by_config_mode(state, &config).await?;
        }
    }

    Ok(())
}

/// `TransportMode::Both` auto-selects stdio vs. HTTP based on whether stdin
/// is a terminal: a piped/redirected stdin means a JSON-RPC client is driving
/// us, an interactive terminal means a human wants the HTTP server running
/// in the foreground.
async fn serve_by_config_mode(state: ai_agent_transport::AppState, config: &AppConfig) -> anyhow::Result<()> {
    match config.transport.mode {
        TransportMode::Stdio => serve_stdio(state).await,
        TransportMode::Http => serve_http(state, config).await,
        TransportMode::Both => {
            if std::io::stdin().is_terminal() {
                serve_http(state, config).await
            } else {
                serve_stdio(state).await
            }
        }
    }
}

async fn serve_stdio(state: ai_agent_transport::AppState) -> anyhow::Result<()> {
    tracing::info!("starting stdio JSON-RPC transport");
    ai_agent_transport::run_stdio(state).await?;
    Ok(())
}

async fn serve_http(state: ai_agent_transport::AppState, config: &AppConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.transport.host, config.transport.port);
    tracing::info!(%addr, "starting HTTP transport");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let router = ai_agent_transport::build_router(state);
    axum::serve(listener, router).await?;
    Ok(())
}
