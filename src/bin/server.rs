//! Backend entrypoint: serve the companion API.
//!
//! Usage: `solace-server [config.toml]`. Without an argument the default
//! config path is used when present, otherwise built-in defaults.

use solace::config::AppConfig;
use solace::keywords::{KeywordTable, OffensiveTerms};
use solace::model::{
    GenerationOptions, HfTurnCodec, HttpDialogueModel, HttpEmotionModel,
};
use solace::registry::SessionRegistry;
use solace::responder::Responder;
use solace::server::{ApiServer, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<AppConfig> {
    let args: Vec<String> = std::env::args().collect();
    if let Some(path) = args.get(1) {
        return Ok(AppConfig::from_file(std::path::Path::new(path))?);
    }
    let default_path = AppConfig::default_config_path();
    if default_path.exists() {
        return Ok(AppConfig::from_file(&default_path)?);
    }
    Ok(AppConfig::default())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    config.validate()?;

    let keywords = KeywordTable::load_or_empty(&config.keywords.keyword_file);
    let offensive = OffensiveTerms::load_or_empty(&config.keywords.offensive_file);
    if !offensive.is_empty() {
        info!(
            "offensive-term list holds {} terms (no moderation policy wired)",
            offensive.len()
        );
    }

    let codec = Arc::new(HfTurnCodec::from_file(
        &config.generation.tokenizer_file,
        &config.generation.end_of_turn_token,
    )?);
    let dialogue = Arc::new(HttpDialogueModel::new(&config.generation)?);
    let emotion = Arc::new(HttpEmotionModel::new(&config.emotion)?);

    let responder = Arc::new(Responder::new(
        keywords,
        codec,
        dialogue,
        GenerationOptions::from_config(&config.generation),
    ));
    let registry = Arc::new(SessionRegistry::new(config.sessions.max_sessions));

    let state = AppState::new(responder, emotion, registry);
    let server = ApiServer::start(state, &config.server).await?;
    info!("solace-server ready on port {}", server.port());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.shutdown();
    Ok(())
}
