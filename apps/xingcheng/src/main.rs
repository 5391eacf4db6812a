//! # Xingcheng
//!
//! Entry point for the Xingcheng exploration game.
//!
//! Local play goes through CLI subcommands against a save file; `serve`
//! exposes the same actions as a JSON API for a map front-end.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use xingcheng::cli::{self, CliError};
use xingcheng::config::ServerConfig;
use xingcheng::{api, xingcheng_core::GameConfig};

/// Xingcheng (行成): walk the map, dig for relics, fill your museum.
#[derive(Parser, Debug)]
#[command(name = "xingcheng", version)]
#[command(about = "Location-based exploration game", long_about = None)]
struct Args {
    /// Save location
    #[arg(long, global = true, default_value = "xingcheng.json")]
    db: PathBuf,

    /// Storage backend: file or redb
    #[arg(long, global = true, default_value = "file")]
    backend: String,

    /// Game rules override (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new save
    Init {
        /// Overwrite an existing save
        #[arg(long)]
        force: bool,
    },
    /// Show the profile
    Status,
    /// Walk to a coordinate
    Goto {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
    /// Daily residence check-in
    CheckIn,
    /// Dig for artifacts
    Excavate {
        /// Skip the countdown
        #[arg(long)]
        instant: bool,
        /// Seed the rarity roll
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List market items
    Market {
        /// common, rare, epic, legendary or all
        #[arg(long)]
        rarity: Option<String>,
    },
    /// Buy an item by id
    Buy { item_id: String },
    /// Show the museum
    Museum,
    /// Ask the oracle about the current position
    Oracle,
    /// List achievements
    Achievements,
    /// Daily walk task progress
    Walk,
    /// Export the save
    Export {
        /// Output file
        output: PathBuf,
        /// canonical (binary) or json
        #[arg(long, default_value = "canonical")]
        format: String,
    },
    /// Import an exported save, replacing the current one
    Import {
        /// Input file (either export format)
        input: PathBuf,
    },
    /// Debug panel
    Debug {
        /// xp, currency, teleport or reset
        action: String,
        /// Amount for xp/currency grants
        #[arg(long)]
        amount: Option<u64>,
    },
    /// Run the HTTP API
    Serve {
        /// Bind address (overrides XINGCHENG_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Required bearer token (overrides XINGCHENG_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
        /// Requests per second, 0 to disable (overrides XINGCHENG_RATE_LIMIT)
        #[arg(long)]
        rate_limit: Option<u32>,
        /// Oracle delay in milliseconds (overrides XINGCHENG_ORACLE_DELAY_MS)
        #[arg(long)]
        oracle_delay_ms: Option<u64>,
        /// Mount the /debug routes
        #[arg(long)]
        enable_debug: bool,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xingcheng=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_rules(path: Option<&Path>) -> Result<GameConfig, CliError> {
    match path {
        Some(path) => {
            let rules = GameConfig::from_json_file(path)?;
            tracing::info!(path = %path.display(), "loaded game rules");
            Ok(rules)
        }
        None => Ok(GameConfig::default()),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let db = args.db.as_path();
    let backend = args.backend.as_str();
    let json = args.json;
    let rules = load_rules(args.config.as_deref())?;

    match args.command {
        Command::Init { force } => cli::cmd_init(db, backend, force)?,
        Command::Status => cli::cmd_status(db, backend, json)?,
        Command::Goto { lat, lng } => cli::cmd_goto(db, backend, json, lat, lng)?,
        Command::CheckIn => cli::cmd_check_in(db, backend, json)?,
        Command::Excavate { instant, seed } => {
            cli::cmd_excavate(db, backend, json, instant, seed, &rules)?;
        }
        Command::Market { rarity } => cli::cmd_market(db, backend, json, rarity.as_deref())?,
        Command::Buy { item_id } => cli::cmd_buy(db, backend, json, &item_id)?,
        Command::Museum => cli::cmd_museum(db, backend, json)?,
        Command::Oracle => cli::cmd_oracle(db, backend, json)?,
        Command::Achievements => cli::cmd_achievements(db, backend, json)?,
        Command::Walk => cli::cmd_walk(db, backend, json)?,
        Command::Export { output, format } => cli::cmd_export(db, backend, &output, &format)?,
        Command::Import { input } => cli::cmd_import(db, backend, &input)?,
        Command::Debug { action, amount } => {
            cli::cmd_debug(db, backend, json, &action, amount, &rules)?;
        }
        Command::Serve {
            bind,
            api_key,
            rate_limit,
            oracle_delay_ms,
            enable_debug,
        } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if api_key.is_some() {
                config.api_key = api_key;
            }
            if let Some(rate) = rate_limit {
                config.rate_limit_per_sec = rate;
            }
            if let Some(delay) = oracle_delay_ms {
                config.oracle_delay_ms = delay;
            }
            config.enable_debug |= enable_debug;
            if config.api_key.is_none() {
                tracing::warn!("no API key configured; the API is open to anyone who can reach it");
            }

            let store = cli::open_store(db, backend)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(api::run(config, store, rules))?;
        }
    }
    Ok(())
}
