use anyhow::Result;

use tournament_engine::cli::Command;
use tournament_engine::{
    handle_completions, handle_init, handle_reconcile, handle_serve, handle_standings, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Init { reset } => handle_init(*reset),
        Command::Standings { tournament_id } => handle_standings(*tournament_id),
        Command::Reconcile { tournament_id } => handle_reconcile(*tournament_id),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
