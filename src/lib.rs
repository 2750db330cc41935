pub mod api;
pub mod bracket;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod http;
pub mod matches;
pub mod rate_limiter;
pub mod roster;
pub mod services;
pub mod standings;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use cli::Cli;
use colored::Colorize;
use log::info;

use crate::bracket::PromotionOutcome;
use crate::cli::Command;
use crate::config::AppConfig;
use crate::database::DbPool;
use crate::domain::{Actor, Role, TournamentId};
use crate::services::server::ServerService;
use crate::services::TournamentService;

/// Identity used for maintenance commands run from the shell.
const CLI_ACTOR: &str = "cli";

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_store(config: &AppConfig) -> Result<DbPool> {
    let pool = database::create_pool(&config.store.database_path)?;
    database::setup::ensure_schema(&*database::get_connection(&pool)?)?;
    Ok(pool)
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init(reset: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.store.database_path)?;
    let conn = database::get_connection(&pool)?;
    if reset {
        database::setup::reset_database(&conn)?;
    } else {
        database::setup::ensure_schema(&conn)?;
    }
    info!("Database ready at {}", config.store.database_path);
    Ok(())
}

pub fn handle_standings(tournament_id: TournamentId) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = open_store(&config)?;
    let service = TournamentService::new(&pool, config.bracket.tie_policy);
    let tournament = service.get(tournament_id)?;
    let entries = service.standings(tournament_id)?;

    println!("{} ({})", tournament.name.bold(), tournament.category);
    println!(
        "{}",
        format!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4}",
            "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
        )
        .dimmed()
    );
    for (idx, entry) in entries.iter().enumerate() {
        let line = format!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+5} {:>4}",
            idx + 1,
            entry.team_id,
            entry.played,
            entry.won,
            entry.drawn,
            entry.lost,
            entry.goals_for,
            entry.goals_against,
            entry.goal_difference,
            entry.points
        );
        if idx == 0 {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
    if entries.is_empty() {
        println!("{}", "No completed matches yet".yellow());
    }
    Ok(())
}

pub fn handle_reconcile(tournament_id: TournamentId) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = open_store(&config)?;
    let service = TournamentService::new(&pool, config.bracket.tie_policy);
    let actor = Actor::new(CLI_ACTOR, Role::Admin);

    for (match_id, outcome) in service.reconcile(&actor, tournament_id)? {
        let line = match &outcome {
            PromotionOutcome::Promoted {
                next_match_id,
                slot,
                team_id,
            } => format!("match {}: {} promoted to {} of match {}", match_id, team_id, slot, next_match_id)
                .green()
                .to_string(),
            PromotionOutcome::Pending { reason } => format!("match {}: still pending ({})", match_id, reason)
                .red()
                .to_string(),
            other => format!("match {}: {:?}", match_id, other).dimmed().to_string(),
        };
        println!("{}", line);
    }
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
