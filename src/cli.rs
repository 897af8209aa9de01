//! CLI command definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use todaydo_core::Language;
use todaydo_services::{Priority, SearchEngine};

/// Today Do - personal productivity dashboard in the terminal
#[derive(Parser, Debug)]
#[command(name = "today-do")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override config file location
    #[arg(long, global = true, env = "TODAY_DO_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON where supported
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show current weather
    Weather {
        /// Ignore the 30-minute cache
        #[arg(long)]
        refresh: bool,

        /// Switch to this location ("lon,lat" or a place name)
        #[arg(long)]
        location: Option<String>,
    },

    /// Show today's background image
    Background {
        /// Fetch a new image even if the current one is fresh
        #[arg(long)]
        refresh: bool,
    },

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Manage the todo list
    #[command(subcommand)]
    Todo(TodoCommand),

    /// Print a web search URL
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,

        /// Engine to use (google, naver, baidu)
        #[arg(long)]
        engine: Option<SearchEngine>,

        /// Remember --engine as the default
        #[arg(long, requires = "engine")]
        save: bool,

        /// Switch the default to the next engine before searching
        #[arg(long, conflicts_with = "engine")]
        next: bool,
    },

    /// Show the current time and date
    Clock,

    /// Show the quote of the day
    Quote {
        /// Pick a random quote instead
        #[arg(long)]
        random: bool,
    },

    /// Read or write the quick note
    #[command(subcommand)]
    Notes(NotesCommand),

    /// Run a pomodoro timer until interrupted
    Pomodoro,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print current settings (API keys masked)
    Show,
    /// Update one or more settings
    Set(SettingsArgs),
    /// Restore defaults
    Reset,
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub pexels_key: Option<String>,

    #[arg(long)]
    pub qweather_key: Option<String>,

    /// Bare hostname, e.g. devapi.qweather.com
    #[arg(long)]
    pub qweather_host: Option<String>,

    /// Interface language (en, ko)
    #[arg(long)]
    pub language: Option<Language>,

    /// Preferred weather location
    #[arg(long, conflicts_with = "auto_location")]
    pub location: Option<String>,

    /// Forget the preferred location and auto-detect
    #[arg(long)]
    pub auto_location: bool,
}

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    /// List todos in display order
    List,
    /// Add a todo
    Add {
        #[arg(required = true)]
        text: Vec<String>,

        /// low, medium or high
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
    },
    /// Toggle a todo's completed state
    Done { id: String },
    /// Change a todo's text
    Edit {
        id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Change a todo's priority
    Priority { id: String, priority: Priority },
    /// Delete a todo
    Rm { id: String },
    /// Delete all completed todos
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// Print the note
    Show,
    /// Replace the note
    Set {
        #[arg(required = true)]
        text: Vec<String>,
    },
}
