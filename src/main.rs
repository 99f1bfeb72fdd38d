// src/main.rs

mod cli;
mod commands;
mod config;
mod dashboard;
mod db;
mod error;
mod export;
mod models;
mod session;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    // init runs before any login: there may be no users table yet
    if let Commands::Init = cli.command {
        return commands::handle_init(&config);
    }

    let date = match &cli.date {
        Some(d) => models::parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };

    let conn = db::open_connection(&config.db_path)?;
    let session = commands::authenticate(&conn, &cli.auth, &config, date)?;

    match cli.command {
        Commands::Init => commands::handle_init(&config),
        Commands::Log(args) => commands::handle_log(&conn, &session, args),
        Commands::Note { field } => commands::handle_note(&conn, &session, field),
        Commands::Show => commands::handle_show(&conn, &session),
        Commands::Dash {
            metric,
            json,
            player,
        } => commands::handle_dash(&conn, &session, metric, json, player),
        Commands::List { player } => commands::handle_list(&conn, &session, player),
        Commands::Export { path } => {
            commands::handle_export(&conn, &session, &path).map(|_| ())
        }
        Commands::User(cmd) => commands::handle_user(&conn, &session, cmd),
    }
}

fn main() {
    // before parsing, so `.env` can supply TRAINLOG_USER / TRAINLOG_PASSWORD
    let env_file = config::load_env_file(None);
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match env_file {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) => debug!(error = %e, "No environment file loaded"),
    }

    if let Err(e) = run(cli) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_file_credentials_reach_the_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "TRAINLOG_USER=envkim\nTRAINLOG_PASSWORD=envpw\n").unwrap();

        config::load_env_file(Some(&path)).unwrap();
        let cli = Cli::try_parse_from(["trainlog", "show"]).unwrap();

        assert_eq!(cli.auth.user.as_deref(), Some("envkim"));
        assert_eq!(cli.auth.password.as_deref(), Some("envpw"));
        assert!(matches!(cli.command, Commands::Show));
    }
}
