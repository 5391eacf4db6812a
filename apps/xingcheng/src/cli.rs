//! # CLI Commands
//!
//! One function per subcommand. Each opens the save, runs the game's
//! "app opened" check, performs its action, persists the profile and
//! prints a report (boxed text or JSON).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use xingcheng_core::achievements;
use xingcheng_core::formats;
use xingcheng_core::lore;
use xingcheng_core::{
    Catalog, Coordinate, CoreError, GameConfig, GameEvent, GameSession, ItemId, JsonFileStore,
    MarketFilter, ProfileStore, RedbStore, Report, UserProfile,
};

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("unknown backend '{0}' (expected 'file' or 'redb')")]
    UnknownBackend(String),

    #[error("unknown export format '{0}' (expected 'canonical' or 'json')")]
    UnknownFormat(String),

    #[error("unknown debug action '{0}' (expected xp, currency, teleport or reset)")]
    UnknownDebugAction(String),

    #[error("save already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// BACKENDS
// =============================================================================

/// Where the save lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// JSON file
    File,
    /// redb database
    Redb,
}

impl FromStr for Backend {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Backend::File),
            "redb" => Ok(Backend::Redb),
            other => Err(CliError::UnknownBackend(other.to_string())),
        }
    }
}

/// A store usable from any thread.
pub type DynStore = Box<dyn ProfileStore + Send + Sync>;

/// Open the store for a path and backend name.
pub fn open_store(db_path: &Path, backend: &str) -> Result<DynStore, CliError> {
    Ok(match backend.parse::<Backend>()? {
        Backend::File => Box::new(JsonFileStore::new(db_path)),
        Backend::Redb => Box::new(RedbStore::open(db_path)?),
    })
}

// =============================================================================
// SESSION HELPERS
// =============================================================================

/// Load the saved profile (or a new one) into a session with default rules.
pub fn load_or_create_session(db_path: &Path, backend: &str) -> Result<GameSession, CliError> {
    let store = open_store(db_path, backend)?;
    let profile = store.load_or_initial()?;
    Ok(GameSession::with_defaults(profile))
}

/// Persist a session's profile.
pub fn save_session(session: &GameSession, db_path: &Path, backend: &str) -> Result<(), CliError> {
    let store = open_store(db_path, backend)?;
    store.save(session.profile())?;
    Ok(())
}

/// An opened save with the events of the launch check.
struct Opened {
    store: DynStore,
    session: GameSession,
    events: Vec<GameEvent>,
}

impl Opened {
    fn new(db_path: &Path, backend: &str, config: &GameConfig) -> Result<Self, CliError> {
        let store = open_store(db_path, backend)?;
        let profile = store.load_or_initial()?;
        let mut session = GameSession::new(profile, Catalog::standard(), config.clone())?;
        let events = session.start();
        Ok(Self {
            store,
            session,
            events,
        })
    }

    fn save(&self) -> Result<(), CliError> {
        self.store.save(self.session.profile())?;
        Ok(())
    }

    fn report(self, action: &str) -> Report {
        Report::new(action, self.events, self.session.profile())
    }
}

fn emit(report: &Report, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

fn print_notifications(events: &[GameEvent]) {
    for event in events {
        println!("» {}", event);
    }
}

/// Run a mutating action: open, act, save, report.
fn run_action<F>(
    db_path: &Path,
    backend: &str,
    json: bool,
    action: &str,
    config: &GameConfig,
    f: F,
) -> Result<(), CliError>
where
    F: FnOnce(&mut GameSession) -> Result<Vec<GameEvent>, CoreError>,
{
    let mut opened = Opened::new(db_path, backend, config)?;
    let outcome = f(&mut opened.session);
    // The launch check may have unlocked something even if the action fails
    opened.save()?;
    let events = outcome.inspect_err(|e| tracing::warn!(action, error = %e, "action rejected"))?;
    tracing::info!(action, events = events.len(), "action applied");
    opened.events.extend(events);
    emit(&opened.report(action), json)
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Create a new save.
pub fn cmd_init(db_path: &Path, backend: &str, force: bool) -> Result<(), CliError> {
    backend.parse::<Backend>()?;
    if db_path.exists() {
        if !force {
            return Err(CliError::AlreadyExists(db_path.to_path_buf()));
        }
        std::fs::remove_file(db_path)?;
    }

    let store = open_store(db_path, backend)?;
    store.save(&UserProfile::initial())?;
    tracing::info!(path = %db_path.display(), backend, "save initialized");
    println!("Initialized new save at {}", db_path.display());
    Ok(())
}

/// Show the profile.
pub fn cmd_status(db_path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    run_action(db_path, backend, json, "status", &GameConfig::default(), |_| Ok(Vec::new()))
}

/// Walk to a coordinate.
pub fn cmd_goto(
    db_path: &Path,
    backend: &str,
    json: bool,
    lat: f64,
    lng: f64,
) -> Result<(), CliError> {
    let to = Coordinate::new(lat, lng)?;
    run_action(db_path, backend, json, "goto", &GameConfig::default(), |s| Ok(s.move_to(to)))
}

/// Daily residence check-in.
pub fn cmd_check_in(db_path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    run_action(db_path, backend, json, "check-in", &GameConfig::default(), |s| Ok(s.check_in()))
}

/// Dig for artifacts. Sleeps one second per countdown tick unless `instant`.
pub fn cmd_excavate(
    db_path: &Path,
    backend: &str,
    json: bool,
    instant: bool,
    seed: Option<u64>,
    config: &GameConfig,
) -> Result<(), CliError> {
    run_action(db_path, backend, json, "excavate", config, |session| match seed {
        Some(seed) => dig(session, &mut StdRng::seed_from_u64(seed), instant, json),
        None => dig(session, &mut rand::rng(), instant, json),
    })
}

fn dig<R: Rng>(
    session: &mut GameSession,
    rng: &mut R,
    instant: bool,
    quiet: bool,
) -> Result<Vec<GameEvent>, CoreError> {
    let mut events = session.start_excavation()?;
    if !quiet {
        print_notifications(&events);
    }
    while session.excavation().is_some() {
        if !instant {
            std::thread::sleep(Duration::from_secs(1));
        }
        for event in session.tick_excavation(rng) {
            tracing::debug!(%event, "excavation tick");
            if let GameEvent::ExcavationTick { .. } = event {
                if !quiet {
                    println!("» {}", event);
                }
            } else {
                events.push(event);
            }
        }
    }
    Ok(events)
}

/// List market items, optionally filtered by rarity.
pub fn cmd_market(
    db_path: &Path,
    backend: &str,
    json: bool,
    rarity: Option<&str>,
) -> Result<(), CliError> {
    let filter = MarketFilter::from_str(rarity.unwrap_or("all"))?;
    let opened = Opened::new(db_path, backend, &GameConfig::default())?;
    opened.save()?;

    let items = opened.session.catalog().market(filter);
    if json {
        let value = json!({ "events": opened.events, "items": items });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_notifications(&opened.events);
    println!("市集  通宝 {}", opened.session.profile().currency);
    for item in items {
        println!(
            "  {} {} [{}] {} 通宝  ({})",
            item.icon,
            item.name,
            item.rarity.label(),
            item.price,
            item.id
        );
    }
    Ok(())
}

/// Buy an item.
pub fn cmd_buy(db_path: &Path, backend: &str, json: bool, item_id: &str) -> Result<(), CliError> {
    let id = ItemId::new(item_id);
    run_action(db_path, backend, json, "buy", &GameConfig::default(), |s| s.buy_item(&id))
}

/// Show the museum.
pub fn cmd_museum(db_path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    let opened = Opened::new(db_path, backend, &GameConfig::default())?;
    opened.save()?;

    let view = opened.session.profile().museum_view(opened.session.catalog());
    if json {
        let value = json!({ "events": opened.events, "museum": view });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_notifications(&opened.events);
    println!("{}", view.title);
    println!("{}", view.subtitle);
    if view.is_empty() {
        println!("  架上空空如也，去外面的世界看看吧");
    }
    for item in &view.items {
        println!("  {} {} [{}]", item.icon, item.name, item.rarity.label());
    }
    Ok(())
}

/// Ask the oracle about the current position.
pub fn cmd_oracle(db_path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    let opened = Opened::new(db_path, backend, &GameConfig::default())?;
    opened.save()?;

    let position = opened.session.position();
    let lore = opened.session.consult_oracle();
    if json {
        let value = json!({ "events": opened.events, "position": position, "lore": lore });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_notifications(&opened.events);
        println!("天机阁 {}", position);
        println!("{}", lore::ORACLE_PENDING);
        println!("\"{}\"", lore);
    }
    Ok(())
}

/// List achievements.
pub fn cmd_achievements(db_path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    let opened = Opened::new(db_path, backend, &GameConfig::default())?;
    opened.save()?;

    let statuses = achievements::status_list(opened.session.profile(), opened.session.catalog());
    if json {
        let value = json!({ "events": opened.events, "achievements": statuses });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_notifications(&opened.events);
    for status in statuses {
        let mark = if status.unlocked { "✔" } else { "·" };
        let a = status.achievement;
        println!(
            "  {} {} [{}] +{} 阅历  {}",
            mark,
            a.title,
            a.rarity.label(),
            a.reward_xp,
            a.description
        );
    }
    Ok(())
}

/// Progress of the daily walk task.
pub fn cmd_walk(db_path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    let opened = Opened::new(db_path, backend, &GameConfig::default())?;
    opened.save()?;

    let walk = opened.session.daily_walk();
    if json {
        let value = json!({ "events": opened.events, "walk": walk });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_notifications(&opened.events);
        println!(
            "日行三里: {}.{:01} / {}.{:01} km ({}%)",
            walk.walked_m / 1_000,
            (walk.walked_m % 1_000) / 100,
            walk.goal_m / 1_000,
            (walk.goal_m % 1_000) / 100,
            walk.percent
        );
    }
    Ok(())
}

/// Debug panel actions: `xp`, `currency`, `teleport`, `reset`.
pub fn cmd_debug(
    db_path: &Path,
    backend: &str,
    json: bool,
    action: &str,
    amount: Option<u64>,
    config: &GameConfig,
) -> Result<(), CliError> {
    let label = format!("debug {}", action);
    match action {
        "xp" => run_action(db_path, backend, json, &label, config, |s| Ok(s.grant_xp(amount))),
        "currency" => run_action(db_path, backend, json, &label, config, |s| {
            Ok(s.grant_currency(amount))
        }),
        "teleport" => run_action(db_path, backend, json, &label, config, |s| {
            Ok(s.teleport(Coordinate::forbidden_city()))
        }),
        "reset" => run_action(db_path, backend, json, &label, config, |s| Ok(s.reset())),
        other => Err(CliError::UnknownDebugAction(other.to_string())),
    }
}

/// Export the save as `canonical` (binary) or `json`.
pub fn cmd_export(
    db_path: &Path,
    backend: &str,
    output: &Path,
    format: &str,
) -> Result<(), CliError> {
    let canonical = match format {
        "canonical" => true,
        "json" => false,
        other => return Err(CliError::UnknownFormat(other.to_string())),
    };

    let store = open_store(db_path, backend)?;
    let profile = store.load_or_initial()?;
    let bytes = if canonical {
        formats::encode_canonical(&profile)?
    } else {
        formats::encode_json(&profile)?.into_bytes()
    };
    std::fs::write(output, bytes)?;
    tracing::info!(output = %output.display(), format, "save exported");
    println!("Exported save to {}", output.display());
    Ok(())
}

/// Import an export (either format) into the save, replacing it.
pub fn cmd_import(db_path: &Path, backend: &str, input: &Path) -> Result<(), CliError> {
    let bytes = std::fs::read(input)?;
    let profile = formats::decode_any(&bytes)?;
    let store = open_store(db_path, backend)?;
    store.save(&profile)?;
    tracing::info!(input = %input.display(), "save imported");
    println!(
        "Imported save: Lv.{} with {} items",
        profile.level,
        profile.inventory.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!(Backend::from_str("file").ok(), Some(Backend::File));
        assert_eq!(Backend::from_str("redb").ok(), Some(Backend::Redb));
        assert!(matches!(
            Backend::from_str("sqlite"),
            Err(CliError::UnknownBackend(name)) if name == "sqlite"
        ));
    }
}
