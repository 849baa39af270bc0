//! vocab-retention CLI
//!
//! Terminal vocabulary trainer: sign in, then cycle through a deck of
//! flashcards with a "know it / show definition" loop.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vocab_retention::account::LocalIdentityProvider;
use vocab_retention::config::{AppConfig, ConfigLayer, default_config_path, load_config_file};
use vocab_retention::deck::Deck;
use vocab_retention::identity::IdentityProvider;
use vocab_retention::report::{format_deck, format_stats};
use vocab_retention::types::OutputFormat;

#[derive(Parser)]
#[command(name = "vocab-retention")]
#[command(about = "Learn vocabulary with a know-it / show-definition flashcard loop")]
#[command(version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON deck to use instead of the built-in deck
    #[arg(long, global = true)]
    deck: Option<PathBuf>,

    /// Account store location
    #[arg(long, global = true)]
    accounts: Option<PathBuf>,

    /// Correct answers needed to learn a word
    #[arg(long, global = true)]
    threshold: Option<u32>,

    /// Celebration banner duration in milliseconds
    #[arg(long, global = true)]
    celebration_ms: Option<u64>,

    /// Write logs here while the TUI runs (filter with RUST_LOG)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive trainer (default)
    Learn,

    /// List the cards in the deck
    Deck {
        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Manage the local account without the TUI
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Show who is signed in
    Status,
    /// Create an account and sign in (password read from stdin)
    Signup { email: String },
    /// Sign in (password read from stdin)
    Signin { email: String },
    /// Sign out
    Signout,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.as_ref().unwrap_or(&Commands::Learn);

    let config = match resolve_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let interactive = matches!(command, Commands::Learn);
    if let Err(e) = init_logging(config.log_file.as_deref(), interactive) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match command {
        Commands::Learn => cmd_learn(&config),
        Commands::Deck { format } => cmd_deck(&config, (*format).into()),
        Commands::Account { command } => cmd_account(&config, command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// SETUP
// ============================================================================

/// Defaults, then config file, then flags.
fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    let file_layer = match &cli.config {
        Some(path) => load_config_file(path, true),
        None => load_config_file(&default_config_path(), false),
    }
    .map_err(|e| e.to_string())?;

    let flag_layer = ConfigLayer {
        deck: cli.deck.clone(),
        accounts: cli.accounts.clone(),
        learned_threshold: cli.threshold,
        celebration_ms: cli.celebration_ms,
        log_file: cli.log_file.clone(),
    };

    AppConfig::resolve(file_layer.merge(flag_layer)).map_err(|e| e.to_string())
}

/// Logs go to stderr for plain commands. The TUI owns the terminal, so
/// there they go to the log file if one is configured, else nowhere.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("cannot open log file {}: {}", path.display(), e))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if !interactive => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

fn load_deck(config: &AppConfig) -> Result<Deck, String> {
    match &config.deck_path {
        Some(path) => Deck::load(path).map_err(|e| e.to_string()),
        None => Ok(Deck::builtin()),
    }
}

fn open_provider(config: &AppConfig) -> Result<LocalIdentityProvider, String> {
    LocalIdentityProvider::open(&config.account_store).map_err(|e| e.to_string())
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn cmd_learn(config: &AppConfig) -> Result<(), String> {
    let deck = load_deck(config)?;
    let mut provider = open_provider(config)?;

    let summary = vocab_retention::tui::run(deck, config.review, &mut provider)
        .map_err(|e| format!("terminal error: {}", e))?;

    if let Some(stats) = summary {
        print!("{}", format_stats(&stats, OutputFormat::Human));
    }
    Ok(())
}

fn cmd_deck(config: &AppConfig, format: OutputFormat) -> Result<(), String> {
    let deck = load_deck(config)?;
    print!("{}", format_deck(&deck, format));
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn cmd_account(config: &AppConfig, command: &AccountCommand) -> Result<(), String> {
    let mut provider = open_provider(config)?;

    match command {
        AccountCommand::Status => match provider.current_user() {
            Some(user) => println!("Signed in as {} ({})", user.email, user.display_name()),
            None => println!("Not signed in."),
        },
        AccountCommand::Signup { email } => {
            let password = prompt_password()?;
            let user = provider.sign_up(email, &password).map_err(|e| e.to_string())?;
            println!("Account created. Signed in as {}", user.email);
        }
        AccountCommand::Signin { email } => {
            let password = prompt_password()?;
            let user = provider.sign_in(email, &password).map_err(|e| e.to_string())?;
            println!("Signed in as {}", user.email);
        }
        AccountCommand::Signout => {
            provider.sign_out().map_err(|e| e.to_string())?;
            println!("Signed out.");
        }
    }
    Ok(())
}

/// Read one line from stdin as the password (trailing newline removed).
fn prompt_password() -> Result<String, String> {
    eprint!("Password: ");
    io::stderr().flush().map_err(|e| e.to_string())?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| e.to_string())?;

    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
