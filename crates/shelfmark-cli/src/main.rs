//! Shelfmark CLI
//!
//! Command-line interface for Shelfmark - local-first media tracking.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use shelfmark_core::{ApiClient, Config, GuestStore, MediaType, SessionStore, Status};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelfmark")]
#[command(about = "Shelfmark - Local-first media tracking")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a new media item
    Add {
        /// Title of the media item
        title: String,
        /// Media type (video, book, anime, game, tv, movie)
        #[arg(short = 't', long = "type", default_value = "book")]
        media_type: MediaType,
        /// Initial status (planned, in_progress, completed, on_hold, dropped)
        #[arg(short, long, default_value = "planned")]
        status: Status,
        /// Release year
        #[arg(short, long)]
        year: Option<i32>,
        /// Rating (1-10)
        #[arg(short, long)]
        rating: Option<i32>,
    },
    /// List entries
    #[command(alias = "ls")]
    List {
        /// Filter by media type
        #[arg(short = 't', long = "type")]
        media_type: Option<MediaType>,
        /// Filter by status
        #[arg(short, long)]
        status: Option<Status>,
    },
    /// Show entry details
    Show {
        /// Entry ID (full UUID or prefix)
        id: String,
    },
    /// Update an entry
    Update {
        /// Entry ID (full UUID or prefix)
        id: String,
        /// New status
        #[arg(short, long)]
        status: Option<Status>,
        /// Rating (1-10)
        #[arg(short, long)]
        rating: Option<i32>,
        /// Review text (markdown)
        #[arg(long)]
        review: Option<String>,
    },
    /// Remove an entry
    #[command(alias = "rm")]
    Remove {
        /// Entry ID (full UUID or prefix)
        id: String,
    },
    /// Manage collections
    Collection {
        #[command(subcommand)]
        command: CollectionCommands,
    },
    /// Export the guest library as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Import a previously exported library (replaces local data)
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Mint a public read-only link for the guest library
    Share,
    /// Log in and merge guest data into your account
    Login {
        /// Account email
        email: String,
    },
    /// Log out and return to guest mode
    Logout,
    /// Show library and session status
    Status,
    /// Show the anonymous device identifier
    Device,
    /// Delete all local guest data
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum CollectionCommands {
    /// Create a collection
    #[command(alias = "add")]
    Create {
        /// Collection title
        title: String,
        /// Make the collection publicly visible
        #[arg(long)]
        public: bool,
    },
    /// List collections
    #[command(alias = "ls")]
    List,
    /// Rename a collection
    Rename {
        /// Collection ID
        id: String,
        /// New title
        title: String,
    },
    /// Remove a collection
    #[command(alias = "rm")]
    Remove {
        /// Collection ID
        id: String,
    },
    /// Mint a public share link for a collection (requires login)
    Share {
        /// Collection ID
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = Config::load()?;

    // Config commands don't need the store or API
    if let Commands::Config { command } = cli.command {
        return handle_config_command(command, config, &output);
    }

    let store = GuestStore::with_config(config.clone());
    let api = ApiClient::new(config.api_url.clone())?;
    let sessions = SessionStore::new(config.clone());
    let state = sessions.load();

    match cli.command {
        Commands::Add {
            title,
            media_type,
            status,
            year,
            rating,
        } => {
            commands::entry::add(
                &store, &api, &state, title, media_type, status, year, rating, &output,
            )
            .await
        }
        Commands::List { media_type, status } => {
            commands::entry::list(&store, &api, &state, media_type, status, &output).await
        }
        Commands::Show { id } => commands::entry::show(&store, id, &output),
        Commands::Update {
            id,
            status,
            rating,
            review,
        } => {
            commands::entry::update(&store, &api, &state, id, status, rating, review, &output)
                .await
        }
        Commands::Remove { id } => commands::entry::remove(&store, &api, &state, id, &output).await,
        Commands::Collection { command } => {
            handle_collection_command(command, &store, &api, &state, &output).await
        }
        Commands::Export { file } => commands::snapshot::export(&store, file, &output),
        Commands::Import { file } => commands::snapshot::import(&store, file, &output),
        Commands::Share => commands::snapshot::share(&store, &api, &output).await,
        Commands::Login { email } => {
            commands::auth::login(&store, &api, &sessions, email, &output).await
        }
        Commands::Logout => commands::auth::logout(&api, &sessions, &output).await,
        Commands::Status => commands::status::show(&store, &state, &config, &output),
        Commands::Device => handle_device_command(&store, &output),
        Commands::Clear { yes } => handle_clear_command(&store, yes, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

async fn handle_collection_command(
    command: CollectionCommands,
    store: &GuestStore,
    api: &ApiClient,
    state: &shelfmark_core::AuthState,
    output: &Output,
) -> Result<()> {
    match command {
        CollectionCommands::Create { title, public } => {
            commands::collection::create(store, api, state, title, public, output).await
        }
        CollectionCommands::List => commands::collection::list(store, api, state, output).await,
        CollectionCommands::Rename { id, title } => {
            commands::collection::rename(store, api, state, id, title, output).await
        }
        CollectionCommands::Remove { id } => {
            commands::collection::remove(store, api, state, id, output).await
        }
        CollectionCommands::Share { id } => {
            commands::collection::share(api, state, id, output).await
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    mut config: Config,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(&config, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(&mut config, key, value, output)
        }
    }
}

fn handle_device_command(store: &GuestStore, output: &Output) -> Result<()> {
    let device_id = store.device_id();

    if output.is_json() {
        println!("{}", serde_json::json!({ "device_id": device_id }));
    } else if output.is_quiet() {
        println!("{}", device_id);
    } else {
        println!("Device ID: {}", device_id);
        println!();
        println!("This anonymous identifier is local to this device and is");
        println!("discarded when your guest data merges into an account.");
    }
    Ok(())
}

fn handle_clear_command(store: &GuestStore, yes: bool, output: &Output) -> Result<()> {
    if !yes {
        use std::io::{self, Write};

        print!(
            "Delete {} entr{} and all local guest data? [y/N] ",
            store.entry_count(),
            if store.entry_count() == 1 { "y" } else { "ies" }
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !matches!(input.trim(), "y" | "Y" | "yes") {
            output.message("Aborted.");
            return Ok(());
        }
    }

    commands::status::clear(store, output)
}
