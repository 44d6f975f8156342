//! Binary entry point for smart-notes.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use smart_notes::cli::AppContext;
use smart_notes::config::Settings;
use smart_notes::models::NoteFilter;
use smart_notes::observability::{LoggingConfig, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

/// Smart Notes - note taking with AI classification.
#[derive(Parser)]
#[command(name = "smart-notes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "SMART_NOTES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Analyze and store a note.
    Add {
        /// The note text.
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },

    /// List notes.
    List {
        /// Group open notes by urgency.
        #[arg(short, long)]
        prioritized: bool,

        /// Include completed notes.
        #[arg(short, long, conflicts_with = "filter")]
        all: bool,

        /// View: all, urgent, upcoming, ideas or completed.
        #[arg(short, long, value_name = "VIEW")]
        filter: Option<NoteFilter>,

        /// Only notes whose content, summary or action items contain TEXT.
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },

    /// Replace a note's text, keeping its classification.
    Edit {
        /// Note ID or unique prefix.
        id: String,

        /// The new text.
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },

    /// Toggle a note's completed flag.
    Done {
        /// Note ID or unique prefix.
        id: String,
    },

    /// Delete a note.
    Delete {
        /// Note ID or unique prefix.
        id: String,
    },

    /// Ask the AI a question about a note.
    Ask {
        /// Note ID or unique prefix.
        id: String,

        /// The question.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Show the questions asked about a note.
    History {
        /// Note ID or unique prefix.
        id: String,

        /// Delete the history entry with this ID instead.
        #[arg(long, value_name = "MSG_ID")]
        delete: Option<String>,
    },

    /// Check connectivity to the active AI provider.
    Status {
        /// Repeat the check every SECS seconds.
        #[arg(short, long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// List models offered by the active AI provider.
    Models,

    /// Show or change the AI provider configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,

        /// Provider to activate: ollama, gemini or openai.
        #[arg(long)]
        provider: Option<String>,

        /// Model for the provider.
        #[arg(long)]
        model: Option<String>,

        /// Ollama server URL.
        #[arg(long)]
        url: Option<String>,

        /// API key (Gemini or OpenAI).
        #[arg(long)]
        api_key: Option<String>,

        /// OpenAI-compatible base URL.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Export notes and configuration to a JSON backup.
    Export {
        /// Output file.
        path: PathBuf,
    },

    /// Replace notes and configuration from a JSON backup.
    Import {
        /// Backup file.
        path: PathBuf,
    },
}

/// Main entry point.
///
/// Synchronous: the provider clients use blocking HTTP.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = init_logging(LoggingConfig::from_settings(
        Some(&settings.logging),
        cli.verbose,
    )) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, settings: Settings) -> anyhow::Result<()> {
    let app = AppContext::open(settings)?;

    match command {
        Commands::Add { content } => commands::cmd_add(&app, &content.join(" ")),
        Commands::List {
            prioritized,
            all,
            filter,
            search,
        } => commands::cmd_list(
            &app,
            commands::ListOptions {
                prioritized,
                all,
                filter: filter.unwrap_or_default(),
                search: search.unwrap_or_default(),
            },
        ),
        Commands::Edit { id, content } => commands::cmd_edit(&app, &id, &content.join(" ")),
        Commands::Done { id } => commands::cmd_done(&app, &id),
        Commands::Delete { id } => commands::cmd_delete(&app, &id),
        Commands::Ask { id, question } => commands::cmd_ask(&app, &id, &question.join(" ")),
        Commands::History { id, delete } => commands::cmd_history(&app, &id, delete.as_deref()),
        Commands::Status { watch } => commands::cmd_status(&app, watch),
        Commands::Models => commands::cmd_models(&app),
        Commands::Config {
            show,
            provider,
            model,
            url,
            api_key,
            base_url,
        } => commands::cmd_config(
            &app,
            show,
            smart_notes::cli::ConfigUpdate {
                provider,
                model,
                url,
                api_key,
                base_url,
            },
        ),
        Commands::Export { path } => commands::cmd_export(&app, &path),
        Commands::Import { path } => commands::cmd_import(&app, &path),
    }
}

/// Loads settings from `path`, or from the default location.
fn load_settings(path: Option<&std::path::Path>) -> smart_notes::Result<Settings> {
    match path {
        Some(path) => Settings::load_from_file(path),
        None => Settings::load_default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_joins_words() {
        let cli = Cli::try_parse_from(["smart-notes", "add", "buy", "milk"]).unwrap();
        match cli.command {
            Commands::Add { content } => assert_eq!(content.join(" "), "buy milk"),
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_config_flags() {
        let cli = Cli::try_parse_from([
            "smart-notes",
            "config",
            "--provider",
            "openai",
            "--base-url",
            "http://localhost:1234/v1",
        ])
        .unwrap();
        match cli.command {
            Commands::Config {
                provider, base_url, ..
            } => {
                assert_eq!(provider.as_deref(), Some("openai"));
                assert_eq!(base_url.as_deref(), Some("http://localhost:1234/v1"));
            },
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_parse_list_filter_and_search() {
        let cli = Cli::try_parse_from([
            "smart-notes",
            "list",
            "--filter",
            "urgent",
            "--search",
            "milk",
        ])
        .unwrap();
        match cli.command {
            Commands::List { filter, search, .. } => {
                assert_eq!(filter, Some(NoteFilter::Urgent));
                assert_eq!(search.as_deref(), Some("milk"));
            },
            _ => panic!("expected list"),
        }
        assert!(Cli::try_parse_from(["smart-notes", "list", "--filter", "someday"]).is_err());
        assert!(Cli::try_parse_from(["smart-notes", "list", "--all", "--filter", "ideas"]).is_err());
    }

    #[test]
    fn test_parse_edit_and_history() {
        let cli = Cli::try_parse_from(["smart-notes", "edit", "note-1", "call", "mom"]).unwrap();
        match cli.command {
            Commands::Edit { id, content } => {
                assert_eq!(id, "note-1");
                assert_eq!(content.join(" "), "call mom");
            },
            _ => panic!("expected edit"),
        }

        let cli =
            Cli::try_parse_from(["smart-notes", "history", "note-1", "--delete", "msg-1"]).unwrap();
        match cli.command {
            Commands::History { id, delete } => {
                assert_eq!(id, "note-1");
                assert_eq!(delete.as_deref(), Some("msg-1"));
            },
            _ => panic!("expected history"),
        }
    }

    #[test]
    fn test_status_watch_takes_seconds() {
        let cli = Cli::try_parse_from(["smart-notes", "status", "--watch", "30"]).unwrap();
        assert!(matches!(cli.command, Commands::Status { watch: Some(30) }));
    }
}
