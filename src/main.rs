use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use streamscribe::cli::Cli;
use streamscribe::config::Config;
use streamscribe::server::{router, AppState};
use streamscribe::stt::{CommandTranscriber, Transcriber};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let mut config = load_config(&cli)?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let transcriber: Arc<dyn Transcriber> = Arc::new(
        CommandTranscriber::new(&config.stt.command).context("invalid stt.command")?,
    );
    if !transcriber.is_ready() {
        warn!(
            backend = transcriber.name(),
            "ASR command not found on PATH; transcription will fail until it is installed"
        );
    }

    let listen: SocketAddr = config
        .server
        .listen
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server.listen))?;

    info!(
        version = %streamscribe::version_string(),
        %listen,
        mode = %config.server.mode,
        backend = transcriber.name(),
        language = %config.stt.language,
        "starting streamscribe websocket server"
    );

    let state = AppState {
        transcriber,
        config: Arc::new(config),
    };
    let listener = TcpListener::bind(listen)
        .await
        .context("failed to bind tcp listener")?;
    axum::serve(listener, router(state).into_make_service())
        .await
        .context("websocket server exited")?;
    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}
