//! Terminal dashboard for the companion API.
//!
//! Reads messages from stdin, renders replies with their classified
//! emotion, and keeps a session-local transcript and emotion history.
//! Commands:
//!
//! - `:stats`  — emotion bar chart and totals
//! - `:export [path]` — write the transcript as JSON
//! - `:reset`  — clear local history and reset the backend session
//! - `:quit`   — exit
//!
//! Usage: `solace-dashboard [config.toml]`.

use indicatif::{ProgressBar, ProgressStyle};
use solace::config::AppConfig;
use solace::dashboard::{ChatClient, DashboardState, annotate_reply, emotion_bars};
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

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

fn typing_indicator(delay_ms: u64) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("typing…");
    spinner.enable_steady_tick(Duration::from_millis((delay_ms / 4).max(50)));
    spinner
}

fn print_prompt() {
    print!("you> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep stdout clean for the transcript; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = load_config()?;
    let session = Uuid::new_v4().to_string();
    let client = ChatClient::new(&config.dashboard, session)?;
    let mut state = DashboardState::new();

    println!("Solace dashboard — talking to {}", config.dashboard.base_url);
    println!("Commands: :stats, :export [path], :reset, :quit");
    print_prompt();

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();

        if input.is_empty() {
            print_prompt();
            continue;
        }

        match input {
            ":quit" | ":q" => break,
            ":reset" => {
                // Local history clears regardless of the backend outcome.
                state.reset();
                match client.reset().await {
                    Ok(message) => println!("{message}"),
                    Err(e) => println!("Backend reset failed: {e}"),
                }
            }
            ":stats" => {
                let counts = state.emotion_counts();
                if counts.is_empty() {
                    println!("No data yet. Start chatting!");
                } else {
                    print!("{}", emotion_bars(&counts));
                    println!("Total exchanges: {}", state.total_exchanges());
                    println!("Unique emotions: {}", counts.len());
                }
            }
            _ if input.starts_with(":export") => {
                let path = input
                    .strip_prefix(":export")
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(std::path::PathBuf::from)
                    .unwrap_or_else(|| config.dashboard.export_path.clone());
                match state.write_export(&path) {
                    Ok(()) => println!("Chat log saved to {}", path.display()),
                    Err(e) => println!("Export failed: {e}"),
                }
            }
            message => {
                state.record_user(message.to_owned());

                // Fixed typing-simulation delay; cosmetic, not a latency signal.
                let spinner = typing_indicator(config.dashboard.typing_delay_ms);
                tokio::time::sleep(Duration::from_millis(config.dashboard.typing_delay_ms)).await;

                match client.chat(message).await {
                    Ok(reply) => {
                        spinner.finish_and_clear();
                        let rendered = annotate_reply(&reply.response, &reply.emotion);
                        state.record_assistant(rendered.clone());
                        state.record_emotion(reply.emotion);
                        println!("solace> {rendered}");
                    }
                    Err(e) => {
                        spinner.finish_and_clear();
                        // Inline error in place of a bot reply; the session
                        // and its history stay intact.
                        let error_text = format!("Backend not responding: {e}");
                        state.record_assistant(error_text.clone());
                        println!("solace> {error_text}");
                    }
                }
            }
        }

        print_prompt();
    }

    Ok(())
}
