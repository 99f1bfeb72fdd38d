// src/cli.rs

use crate::models::{Level, Location, LogType, Metric, TextField};
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "trainlog - training journal for a youth baseball club",
    long_about = "trainlog keeps one training journal entry per player per day: session time, location, intensity, drill counts and feedback. Players record and review their own entries and dashboard; the coach (admin PIN) manages players and exports everything to a spreadsheet."
)]
pub struct Cli {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// The session date (format: YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    pub date: Option<String>,

    /// Increase log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct AuthArgs {
    #[arg(short, long, global = true, env = "TRAINLOG_USER", help = "Player name (ID)")]
    pub user: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        env = "TRAINLOG_PASSWORD",
        hide_env_values = true,
        help = "Player password"
    )]
    pub password: Option<String>,

    #[arg(long, global = true, help = "Admin PIN (takes precedence over --user)")]
    pub pin: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates the database file and tables if they do not exist yet.
    Init,

    /// Saves the journal entry for the session date.
    /// Fields not given keep their saved value (or the default on the first save).
    Log(LogArgs),

    /// Edits one free-text field of the session date's entry in the default editor.
    Note {
        #[arg(value_enum, help = "The text field to edit")]
        field: TextField,
    },

    /// Shows the journal entry for the session date.
    Show,

    /// Weekly, monthly and yearly totals of one metric around the session date.
    Dash {
        #[arg(short, long, value_enum, default_value_t = Metric::Duration)]
        metric: Metric,

        #[arg(long, help = "Print the series as JSON instead of bar charts")]
        json: bool,

        /// Player to chart (admin only). Players always see their own data.
        #[arg(long, value_name = "NAME")]
        player: Option<String>,
    },

    /// Lists saved entries. Players see their own; the admin sees everyone's.
    List {
        #[arg(long, value_name = "NAME", help = "Only entries of this player (admin only)")]
        player: Option<String>,
    },

    /// Exports entries to an .xlsx spreadsheet.
    Export {
        #[arg(help = "Output file, e.g. training_logs.xlsx")]
        path: String,
    },

    /// Manages player accounts (admin only).
    #[command(subcommand)]
    User(UserCommands),
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Registers a player.
    Add { name: String, password: String },

    /// Removes a player account. Their journal entries are kept.
    Del {
        name: String,
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Lists registered players.
    List,
}

#[derive(Args, Debug, Default)]
pub struct LogArgs {
    #[arg(long, value_enum, hide = true)]
    pub kind: Option<LogType>,

    #[arg(short = 't', long, help = "Training time in minutes")]
    pub duration: Option<i64>,

    #[arg(short, long, value_enum)]
    pub location: Option<Location>,

    #[arg(short, long, value_enum)]
    pub intensity: Option<Level>,

    #[arg(short, long, value_enum)]
    pub satisfaction: Option<Level>,

    #[arg(long, help = "What the team practised")]
    pub team: Option<String>,

    #[arg(long, help = "Practice swings (reps)")]
    pub swing: Option<i64>,

    #[arg(long, help = "Live batting (minutes)")]
    pub live: Option<i64>,

    #[arg(long, help = "Defense drills (minutes)")]
    pub defense: Option<i64>,

    #[arg(long, help = "Pitching (pitches)")]
    pub pitching: Option<i64>,

    #[arg(long, help = "Running (minutes)")]
    pub running: Option<i64>,

    #[arg(long, help = "Bar hanging (minutes)")]
    pub hanging: Option<i64>,

    #[arg(long, help = "Other personal training")]
    pub etc: Option<String>,

    #[arg(long, help = "Coach feedback")]
    pub coach: Option<String>,

    #[arg(long, help = "What went well")]
    pub good: Option<String>,

    #[arg(long, help = "What to improve")]
    pub bad: Option<String>,

    #[arg(long, help = "Promise for next time")]
    pub promise: Option<String>,

    #[arg(short, long, help = "Free memo")]
    pub memo: Option<String>,

    #[arg(long, hide = true, help = "Tactical board image (data URL)")]
    pub image: Option<String>,
}
