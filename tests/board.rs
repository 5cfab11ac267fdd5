//! End-to-end board scenarios: everything goes through the public engine
//! API against real temp-dir stores, the way the deployed polling loop and
//! edit surface use it.

use serde_json::json;
use tempfile::TempDir;

use salesboard::access::Tier;
use salesboard::config::Config;
use salesboard::engine::{EditOutcome, SyncEngine};
use salesboard::model::RawRow;

fn board_config(dir: &TempDir) -> Config {
    Config {
        data_path: dir.path().join("sales_data.json").to_string_lossy().into_owned(),
        incentive_path: dir.path().join("incentive.json").to_string_lossy().into_owned(),
        snapshot_path: dir.path().join("board_snapshot.json").to_string_lossy().into_owned(),
        access_path: dir.path().join("access.json").to_string_lossy().into_owned(),
        buckets_path: None,
        poll_secs: 10,
        roster: vec![
            "Rob".to_string(),
            "Wayne".to_string(),
            "George".to_string(),
            "JT".to_string(),
            "Keenan".to_string(),
            "Payton".to_string(),
            "Taylor".to_string(),
        ],
        periods: vec![
            "Monday".to_string(),
            "Tuesday".to_string(),
            "Wednesday".to_string(),
            "Thursday".to_string(),
            "Friday".to_string(),
        ],
        default_goal: 1000.0,
        default_incentive: "Everyone needs more blades...".to_string(),
        notify_separator: ", ".to_string(),
        notify_suffix: " just made more sales!".to_string(),
    }
}

fn seed_access(dir: &TempDir) {
    let table = json!({
        "payton@ecsempire.com": "full",
        "wayne@ecsempire.com": "full",
        "robert@ecsempire.com": "full",
        "keenan@ecsempire.com": "limited",
        "taylor@ecsempire.com": "limited",
    });
    std::fs::write(dir.path().join("access.json"), table.to_string()).unwrap();
}

fn board(dir: &TempDir) -> SyncEngine {
    seed_access(dir);
    SyncEngine::new(board_config(dir)).unwrap()
}

const EDITOR: &str = "payton@ecsempire.com";

// ---------------------------------------------------------------------------
// First run: empty store, baseline tick, no notification
// ---------------------------------------------------------------------------
#[test]
fn first_run_on_empty_store_is_quiet_and_fully_populated() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    let outcome = engine.tick();
    assert!(!outcome.notification.active);
    assert_eq!(outcome.dataset.rows.len(), 7);
    assert!(outcome.dataset.rows.iter().all(|r| r.total == 0.0));
    // 7 entities + grand total bar
    assert_eq!(outcome.bars.len(), 8);
    assert!(outcome.snapshot_saved);
}

#[test]
fn baseline_tick_stays_quiet_even_with_nonzero_data() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);
    engine.apply_edit(
        EDITOR,
        &[RawRow::new("Rob").with_cell("Monday", json!(4500))],
    );

    let outcome = engine.tick();
    assert!(!outcome.notification.active);
}

// ---------------------------------------------------------------------------
// The core scenario: edit, pulse, clear
// ---------------------------------------------------------------------------
#[test]
fn progress_pulses_exactly_one_tick() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    engine.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(500))]);
    engine.tick();

    engine.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(800))]);
    let pulse = engine.tick();
    assert!(pulse.notification.active);
    assert_eq!(pulse.notification.message, "Rob just made more sales!");

    let settled = engine.tick();
    assert!(!settled.notification.active);
    assert!(settled.notification.message.is_empty());
}

#[test]
fn simultaneous_improvers_share_one_message() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    engine.apply_edit(
        EDITOR,
        &[
            RawRow::new("Rob").with_cell("Monday", json!(100)),
            RawRow::new("Wayne").with_cell("Monday", json!(100)),
        ],
    );
    engine.tick();

    engine.apply_edit(
        EDITOR,
        &[
            RawRow::new("Rob").with_cell("Monday", json!(200)),
            RawRow::new("Wayne").with_cell("Monday", json!(300)),
        ],
    );
    let pulse = engine.tick();
    assert!(pulse.notification.active);
    assert!(pulse.notification.message.contains("Rob"));
    assert!(pulse.notification.message.contains("Wayne"));
    assert!(pulse.notification.message.ends_with(" just made more sales!"));
}

#[test]
fn corrections_and_ties_never_notify() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    engine.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(900))]);
    engine.tick();

    // Same value: tie. Then a rollback.
    engine.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(900))]);
    assert!(!engine.tick().notification.active);
    engine.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(400))]);
    assert!(!engine.tick().notification.active);
}

// ---------------------------------------------------------------------------
// Malformed input degrades, never breaks the tick
// ---------------------------------------------------------------------------
#[test]
fn garbage_cells_degrade_to_zero_in_the_tick_path() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    engine.apply_edit(
        EDITOR,
        &[RawRow::new("Rob")
            .with_cell("Monday", json!("abc"))
            .with_cell("Tuesday", json!("250"))
            .with_cell("Wednesday", json!(-50))],
    );
    let outcome = engine.tick();
    let rob = outcome.dataset.rows.iter().find(|r| r.name == "Rob").unwrap();
    assert_eq!(rob.total, 250.0);
}

// ---------------------------------------------------------------------------
// Shared snapshot across viewer sessions (last-write-wins)
// ---------------------------------------------------------------------------
#[test]
fn pulse_is_shared_across_viewer_sessions() {
    let dir = TempDir::new().unwrap();
    let mut writer = board(&dir);
    let mut viewer = SyncEngine::new(board_config(&dir)).unwrap();

    writer.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(500))]);
    writer.tick();
    writer.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(800))]);

    // Whichever session ticks first consumes the increase and persists the
    // advanced snapshot; the other sees the settled state. Last write wins,
    // nobody double-fires.
    let first = writer.tick();
    assert!(first.notification.active);
    let second = viewer.tick();
    assert!(!second.notification.active);
}

// ---------------------------------------------------------------------------
// Access tiers and the edit surface
// ---------------------------------------------------------------------------
#[test]
fn access_tiers_gate_edits_but_not_viewing() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    assert_eq!(engine.resolve_access("nobody@nowhere.com"), Tier::Denied);
    assert_eq!(engine.resolve_access("keenan@ecsempire.com"), Tier::Limited);
    assert_eq!(engine.resolve_access(EDITOR), Tier::Full);

    let rows = vec![RawRow::new("Rob").with_cell("Monday", json!(700))];
    assert_eq!(engine.apply_edit("keenan@ecsempire.com", &rows), EditOutcome::Denied);
    assert_eq!(engine.apply_edit(EDITOR, &rows), EditOutcome::Saved);

    // Limited viewers still see the data via the tick path.
    let outcome = engine.tick();
    let rob = outcome.dataset.rows.iter().find(|r| r.name == "Rob").unwrap();
    assert_eq!(rob.total, 700.0);
}

#[test]
fn rejected_edit_leaves_durable_data_untouched() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    engine.apply_edit(EDITOR, &[RawRow::new("Rob").with_cell("Monday", json!(500))]);
    engine.apply_edit(
        "keenan@ecsempire.com",
        &[RawRow::new("Rob").with_cell("Monday", json!(9999))],
    );

    let outcome = engine.tick();
    let rob = outcome.dataset.rows.iter().find(|r| r.name == "Rob").unwrap();
    assert_eq!(rob.total, 500.0);
}

// ---------------------------------------------------------------------------
// Goal column supplement: persisted, never part of detection
// ---------------------------------------------------------------------------
#[test]
fn goal_edits_round_trip_without_firing_notifications() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    engine.apply_edit(
        EDITOR,
        &[RawRow::new("Rob")
            .with_cell("Monday", json!(500))
            .with_cell("Goal", json!(1000))],
    );
    engine.tick();

    engine.apply_edit(
        EDITOR,
        &[RawRow::new("Rob")
            .with_cell("Monday", json!(500))
            .with_cell("Goal", json!(5000))],
    );
    let outcome = engine.tick();
    assert!(!outcome.notification.active);
    let rob = outcome.dataset.rows.iter().find(|r| r.name == "Rob").unwrap();
    assert_eq!(rob.goal, 5000.0);
    assert_eq!(rob.total, 500.0);
}

// ---------------------------------------------------------------------------
// Incentive message
// ---------------------------------------------------------------------------
#[test]
fn incentive_text_defaults_then_follows_edits() {
    let dir = TempDir::new().unwrap();
    let mut engine = board(&dir);

    assert_eq!(engine.incentive(), "Everyone needs more blades...");
    assert_eq!(engine.apply_incentive(EDITOR, "Double blades this week"), EditOutcome::Saved);
    assert_eq!(engine.incentive(), "Double blades this week");

    // A second session reads the same durable message.
    let viewer = SyncEngine::new(board_config(&dir)).unwrap();
    assert_eq!(viewer.incentive(), "Double blades this week");
}
