//! Ladder Arena maintenance tool
//!
//! `ladder-arena [migrate | leaderboard <event-id> | recalculate <event-id>]`

use std::sync::Arc;

use anyhow::{bail, Context};
use sea_orm::{ConnectionTrait, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ladder_arena::adapters::{PostgresArenaStore, PostgresAttendanceLog, PostgresMemberRoster};
use ladder_arena::app::ArenaService;
use ladder_arena::config::Config;
use ladder_arena::domain::entities::{Actor, ArenaEventId};

const MIGRATION: &str = include_str!("../migrations/0001_arena.sql");

enum Command {
    Migrate,
    Leaderboard(ArenaEventId),
    Recalculate(ArenaEventId),
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let event_id = |raw: Option<&String>| -> anyhow::Result<ArenaEventId> {
        let raw = raw.context("missing <event-id>")?;
        let id = Uuid::parse_str(raw).with_context(|| format!("invalid event id: {}", raw))?;
        Ok(ArenaEventId(id))
    };

    match args.first().map(String::as_str) {
        None | Some("migrate") => Ok(Command::Migrate),
        Some("leaderboard") => Ok(Command::Leaderboard(event_id(args.get(1))?)),
        Some("recalculate") => Ok(Command::Recalculate(event_id(args.get(1))?)),
        Some(other) => bail!(
            "unknown command '{}' (expected migrate, leaderboard or recalculate)",
            other
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ladder_arena=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let service = ArenaService::new(
        Arc::new(PostgresArenaStore::new(db.clone())),
        Arc::new(PostgresMemberRoster::new(db.clone())),
        Arc::new(PostgresAttendanceLog::new(db.clone())),
        config.arena,
    );

    match command {
        Command::Migrate => {
            db.execute_unprepared(MIGRATION)
                .await
                .context("Failed to apply arena migration")?;
            tracing::info!("Arena schema is up to date");
        }
        Command::Leaderboard(event_id) => {
            let board = service.leaderboard(event_id).await?;
            println!("{}", serde_json::to_string_pretty(&board)?);
        }
        Command::Recalculate(event_id) => {
            let ranks = service.recalculate_ranks(&Actor::operator(), event_id).await?;
            tracing::info!(event_id = %event_id, participants = ranks.len(), "Done");
        }
    }

    Ok(())
}
