//! Integration tests for Xingcheng CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xingcheng::cli::{
    CliError, cmd_buy, cmd_check_in, cmd_debug, cmd_excavate, cmd_export, cmd_goto, cmd_import,
    cmd_init, cmd_market, cmd_status, load_or_create_session, save_session,
};
use xingcheng_core::{GameConfig, GameSession, ItemId, UserProfile};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn file_db(dir: &TempDir) -> PathBuf {
    dir.path().join("save.json")
}

fn redb_db(dir: &TempDir) -> PathBuf {
    dir.path().join("save.redb")
}

fn load(db_path: &Path, backend: &str) -> UserProfile {
    load_or_create_session(db_path, backend)
        .unwrap()
        .into_profile()
}

// =============================================================================
// INIT COMMAND TESTS
// =============================================================================

#[test]
fn test_init_creates_file_save() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    let result = cmd_init(&db_path, "file", false);
    assert!(result.is_ok());
    assert!(db_path.exists());
    assert_eq!(load(&db_path, "file"), UserProfile::initial());
}

#[test]
fn test_init_creates_redb_save() {
    let temp = create_temp_dir();
    let db_path = redb_db(&temp);

    let result = cmd_init(&db_path, "redb", false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_fails_if_exists_without_force() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    cmd_init(&db_path, "file", false).unwrap();

    let result = cmd_init(&db_path, "file", false);
    assert!(matches!(result, Err(CliError::AlreadyExists(_))));
}

#[test]
fn test_init_with_force_resets_progress() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    cmd_init(&db_path, "file", false).unwrap();
    cmd_check_in(&db_path, "file", true).unwrap();
    assert_eq!(load(&db_path, "file").residence_days, 1);

    cmd_init(&db_path, "file", true).unwrap();
    assert_eq!(load(&db_path, "file").residence_days, 0);
}

#[test]
fn test_init_rejects_unknown_backend() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("save.sqlite");

    let result = cmd_init(&db_path, "sqlite", false);
    assert!(matches!(result, Err(CliError::UnknownBackend(_))));
    assert!(!db_path.exists());
}

// =============================================================================
// LOAD/SAVE SESSION TESTS
// =============================================================================

#[test]
fn test_load_nonexistent_creates_new() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("nonexistent.json");

    let session = load_or_create_session(&db_path, "file").unwrap();
    assert_eq!(session.profile(), &UserProfile::initial());
}

#[test]
fn test_save_and_load_session() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    let mut profile = UserProfile::initial();
    profile.inventory.push(ItemId::new("spirit_fox"));
    profile.currency = 42;
    let session = GameSession::with_defaults(profile.clone());

    save_session(&session, &db_path, "file").unwrap();
    assert_eq!(load(&db_path, "file"), profile);
}

#[test]
fn test_save_and_load_redb_session() {
    let temp = create_temp_dir();
    let db_path = redb_db(&temp);

    let mut profile = UserProfile::initial();
    profile.residence_days = 7;
    save_session(&GameSession::with_defaults(profile.clone()), &db_path, "redb").unwrap();
    assert_eq!(load(&db_path, "redb"), profile);
}

#[test]
fn test_corrupt_save_is_an_error() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);
    std::fs::write(&db_path, "{ not json").unwrap();

    assert!(load_or_create_session(&db_path, "file").is_err());
    assert!(cmd_status(&db_path, "file", true).is_err());
}

// =============================================================================
// STATUS / LAUNCH CHECK TESTS
// =============================================================================

#[test]
fn test_status_unlocks_first_steps_once() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    cmd_status(&db_path, "file", true).unwrap();
    let profile = load(&db_path, "file");
    assert_eq!(profile.unlocked_achievements.len(), 1);
    assert_eq!(profile.xp, 50);

    cmd_status(&db_path, "file", true).unwrap();
    let profile = load(&db_path, "file");
    assert_eq!(profile.unlocked_achievements.len(), 1);
    assert_eq!(profile.xp, 50);
}

// =============================================================================
// MOVEMENT TESTS
// =============================================================================

#[test]
fn test_goto_forbidden_city_unlocks_achievement() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    cmd_goto(&db_path, "file", true, 39.9163, 116.3972).unwrap();
    let profile = load(&db_path, "file");
    assert!(profile.inventory.contains(&ItemId::new("jade_dragon")));
    assert_eq!(profile.xp, 1_050);
    assert_eq!(profile.level, 3);
    assert!(profile.distance_walked_m > 1_500);
}

#[test]
fn test_goto_rejects_invalid_coordinate() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    let result = cmd_goto(&db_path, "file", true, 91.0, 0.0);
    assert!(result.is_err());
}

#[test]
fn test_check_in_accumulates() {
    let temp = create_temp_dir();
    let db_path = redb_db(&temp);

    for _ in 0..3 {
        cmd_check_in(&db_path, "redb", true).unwrap();
    }
    assert_eq!(load(&db_path, "redb").residence_days, 3);
}

// =============================================================================
// EXCAVATION TESTS
// =============================================================================

#[test]
fn test_instant_excavation_grants_xp() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);
    cmd_status(&db_path, "file", true).unwrap();
    let before = load(&db_path, "file");

    cmd_excavate(&db_path, "file", true, true, Some(7), &GameConfig::default()).unwrap();
    let after = load(&db_path, "file");

    let gained = after.xp - before.xp;
    let found = after.inventory.len() - before.inventory.len();
    match found {
        0 => assert_eq!(gained, 10),
        1 => assert_eq!(gained, 50),
        n => panic!("excavation added {n} items"),
    }
}

#[test]
fn test_seeded_excavation_is_deterministic() {
    let temp = create_temp_dir();
    let a = temp.path().join("a.json");
    let b = temp.path().join("b.json");

    cmd_excavate(&a, "file", true, true, Some(2024), &GameConfig::default()).unwrap();
    cmd_excavate(&b, "file", true, true, Some(2024), &GameConfig::default()).unwrap();
    assert_eq!(load(&a, "file"), load(&b, "file"));
}

#[test]
fn test_excavation_uses_configured_weights() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);
    // Only legendary can roll, and the catalog has legendary items
    let config = GameConfig {
        rarity_weights: [0, 0, 0, 1],
        ..GameConfig::default()
    };

    cmd_excavate(&db_path, "file", true, true, Some(1), &config).unwrap();
    let profile = load(&db_path, "file");
    assert_eq!(profile.inventory.len(), 1);
    assert!(matches!(profile.inventory[0].as_str(), "gujian_sword" | "jade_dragon"));
    assert_eq!(profile.xp, 50 + 50);
}

// =============================================================================
// MARKET TESTS
// =============================================================================

#[test]
fn test_market_listing_and_filter() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    assert!(cmd_market(&db_path, "file", true, None).is_ok());
    assert!(cmd_market(&db_path, "file", true, Some("epic")).is_ok());
    assert!(cmd_market(&db_path, "file", true, Some("mythic")).is_err());
}

#[test]
fn test_buy_spends_currency() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    // iron_coin costs 15 of the starting 100
    cmd_buy(&db_path, "file", true, "iron_coin").unwrap();
    cmd_buy(&db_path, "file", true, "iron_coin").unwrap();
    let profile = load(&db_path, "file");
    assert_eq!(profile.currency, 70);
    assert_eq!(profile.count_of(&ItemId::new("iron_coin")), 2);
}

#[test]
fn test_buy_without_funds_fails_but_keeps_launch_check() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    let result = cmd_buy(&db_path, "file", true, "jade_dragon");
    assert!(result.is_err());

    let profile = load(&db_path, "file");
    assert_eq!(profile.currency, 100);
    assert!(profile.inventory.is_empty());
    // first_steps was still recorded
    assert_eq!(profile.unlocked_achievements.len(), 1);
}

#[test]
fn test_buy_unknown_item_fails() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    assert!(cmd_buy(&db_path, "file", true, "unicorn").is_err());
}

// =============================================================================
// DEBUG PANEL TESTS
// =============================================================================

#[test]
fn test_debug_grants_and_reset() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);
    let config = GameConfig::default();

    cmd_debug(&db_path, "file", true, "xp", None, &config).unwrap();
    cmd_debug(&db_path, "file", true, "currency", Some(5), &config).unwrap();
    let profile = load(&db_path, "file");
    assert_eq!(profile.xp, 550);
    assert_eq!(profile.level, 2);
    assert_eq!(profile.currency, 105);

    cmd_debug(&db_path, "file", true, "teleport", None, &config).unwrap();
    let profile = load(&db_path, "file");
    assert!(profile.inventory.contains(&ItemId::new("jade_dragon")));
    assert_eq!(profile.distance_walked_m, 0);

    cmd_debug(&db_path, "file", true, "reset", None, &config).unwrap();
    let profile = load(&db_path, "file");
    assert!(profile.inventory.is_empty());
    assert_eq!(profile.xp, 50);
}

#[test]
fn test_debug_unknown_action() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);

    let result = cmd_debug(&db_path, "file", true, "god-mode", None, &GameConfig::default());
    assert!(matches!(result, Err(CliError::UnknownDebugAction(_))));
}

// =============================================================================
// EXPORT/IMPORT TESTS
// =============================================================================

#[test]
fn test_export_import_canonical_across_backends() {
    let temp = create_temp_dir();
    let file_path = file_db(&temp);
    let redb_path = redb_db(&temp);
    let export_path = temp.path().join("export.bin");

    cmd_goto(&file_path, "file", true, 39.9163, 116.3972).unwrap();
    cmd_export(&file_path, "file", &export_path, "canonical").unwrap();
    assert!(std::fs::read(&export_path).unwrap().starts_with(b"XCSV"));

    cmd_import(&redb_path, "redb", &export_path).unwrap();
    assert_eq!(load(&redb_path, "redb"), load(&file_path, "file"));
}

#[test]
fn test_export_import_json() {
    let temp = create_temp_dir();
    let source = file_db(&temp);
    let target = temp.path().join("target.json");
    let export_path = temp.path().join("export.json");

    cmd_check_in(&source, "file", true).unwrap();
    cmd_export(&source, "file", &export_path, "json").unwrap();
    let text = std::fs::read_to_string(&export_path).unwrap();
    assert!(text.contains("\"residenceDays\": 1"));

    cmd_import(&target, "file", &export_path).unwrap();
    assert_eq!(load(&target, "file"), load(&source, "file"));
}

#[test]
fn test_canonical_export_is_deterministic() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);
    let first = temp.path().join("first.bin");
    let second = temp.path().join("second.bin");

    cmd_check_in(&db_path, "file", true).unwrap();
    cmd_export(&db_path, "file", &first, "canonical").unwrap();
    cmd_export(&db_path, "file", &second, "canonical").unwrap();
    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_export_unknown_format() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);
    let out = temp.path().join("out.xml");

    let result = cmd_export(&db_path, "file", &out, "xml");
    assert!(matches!(result, Err(CliError::UnknownFormat(_))));
    assert!(!out.exists());
}

#[test]
fn test_import_rejects_garbage() {
    let temp = create_temp_dir();
    let db_path = file_db(&temp);
    let input = temp.path().join("garbage.bin");
    std::fs::write(&input, b"XCSV\x09junk").unwrap();

    assert!(cmd_import(&db_path, "file", &input).is_err());
    assert!(!db_path.exists());
}
