use clap::{Parser, Subcommand};
use lostfound_match::config::Settings;
use lostfound_match::core::sort_for_display;
use lostfound_match::models::{ErrorResponse, Item, TriggerRequest, VerifyMatchRequest};
use lostfound_match::services::{InMemoryItems, ItemRepository, MatchStore};
use lostfound_match::MatchError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use validator::Validate;

#[derive(Debug, Parser)]
#[command(name = "lostfound-match", version, about = "Lost & found matching engine")]
struct Cli {
    /// Configuration file (defaults to config/default.toml + config/local.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one lost item against one found item
    Score {
        #[arg(long)]
        lost: PathBuf,
        #[arg(long)]
        found: PathBuf,
    },
    /// Find matches for one item among all items
    Match {
        /// JSON array of items
        #[arg(long)]
        items: PathBuf,
        /// Id of the item to match
        #[arg(long)]
        item: String,
    },
    /// Replace a user's matches with freshly computed ones
    Recalculate {
        #[arg(long)]
        items: PathBuf,
        /// JSON array of existing matches; rewritten in place
        #[arg(long)]
        matches: PathBuf,
        #[arg(long)]
        user: String,
        /// Keep existing matches and only add missing pairs
        #[arg(long)]
        append: bool,
    },
    /// Verify or reject a stored match
    Verify {
        #[arg(long)]
        matches: PathBuf,
        #[arg(long)]
        id: String,
        /// Reject instead of verifying
        #[arg(long)]
        reject: bool,
    },
    /// Case-insensitive search over descriptions and categories
    Search {
        #[arg(long)]
        items: PathBuf,
        #[arg(long)]
        query: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&Settings::default());
            error!("Failed to load configuration: {}", e);
            print_error(&MatchError::from(e));
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings);
    info!("Configuration loaded successfully");

    match run(cli.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging. `LOG_LEVEL` and `LOG_FORMAT` override the settings.
fn init_logging(settings: &Settings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn run(command: Command, settings: &Settings) -> Result<(), MatchError> {
    let matcher = settings.build_matcher();

    match command {
        Command::Score { lost, found } => {
            let lost = read_item(&lost)?;
            let found = read_item(&found)?;
            print_json(&matcher.score(&lost, &found))
        }
        Command::Match { items, item } => {
            let repo = InMemoryItems::from_json_file(items)?;
            let new_item = repo.get(&item).await?;
            let mut result = matcher.find_matches_from(&new_item, &repo).await?;
            info!(
                "Matched {} of {} candidates ({} failed)",
                result.matches.len(),
                result.total_candidates,
                result.failed
            );
            sort_for_display(&mut result.matches);
            print_json(&result.matches)
        }
        Command::Recalculate { items, matches, user, append } => {
            let request = TriggerRequest {
                user_email: user,
                recalculate: !append,
            };
            request.validate()?;

            let repo = InMemoryItems::from_json_file(items)?;
            let store = MatchStore::from_json_file(&matches)?;
            let response = matcher
                .trigger(&request.user_email, request.recalculate, &repo, &store)
                .await?;
            store.save_json_file(&matches).await?;
            print_json(&response)
        }
        Command::Verify { matches, id, reject } => {
            let request = VerifyMatchRequest {
                match_id: id,
                is_verified: !reject,
            };
            request.validate()?;

            let store = MatchStore::from_json_file(&matches)?;
            let updated = store.verify(&request.match_id, request.is_verified).await?;
            store.save_json_file(&matches).await?;
            print_json(&updated)
        }
        Command::Search { items, query } => {
            let repo = InMemoryItems::from_json_file(items)?;
            print_json(&repo.search(&query, None).await)
        }
    }
}

fn read_item(path: &Path) -> Result<Item, MatchError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), MatchError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_error(e: &MatchError) {
    let kind = match e {
        MatchError::NotFound(_) => "not_found",
        MatchError::CandidatePool(_) => "candidate_pool",
        MatchError::Config(_) => "invalid_config",
        MatchError::Json(_) => "invalid_json",
        MatchError::Io(_) => "io",
        MatchError::Validation(_) => "validation_failed",
        _ => "matching_failed",
    };
    let body = ErrorResponse {
        error: kind.to_string(),
        message: e.to_string(),
    };
    if let Ok(json) = serde_json::to_string(&body) {
        println!("{}", json);
    }
}
