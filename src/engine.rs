//! Tick coordinator. `SyncEngine` owns the store handles and is the single
//! snapshot writer in this process; the polling loop is its only caller.
//!
//! Independent pollers against the same files race with last-write-wins
//! semantics. That is the documented contract: losing one intermediate
//! notification pulse is tolerable, and every tick compares against whatever
//! snapshot is durable at load time.

use anyhow::Result;

use crate::access::{AccessTable, Tier};
use crate::chart::{render, Bar, BucketTable};
use crate::config::{now_ts, Config};
use crate::detect::{detect, MessageStyle, Snapshot};
use crate::logging::{json_log, log, obj, state_hash, v_bool, v_num, v_str, Domain, Level};
use crate::model::{normalize, Dataset, RawRow};
use crate::notify::{transition, NotificationView, NotifyState};
use crate::store::RecordStore;

/// Result of one polling tick, handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub notification: NotificationView,
    pub bars: Vec<Bar>,
    pub dataset: Dataset,
    pub snapshot_saved: bool,
}

/// Outcome of an edit attempt, carrying the status string the board shows.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Saved,
    Denied,
    SaveFailed(String),
}

impl EditOutcome {
    pub fn status(&self) -> String {
        match self {
            EditOutcome::Saved => "Data saved!".to_string(),
            EditOutcome::Denied => "read-only access".to_string(),
            EditOutcome::SaveFailed(err) => format!("error saving data: {}", err),
        }
    }
}

pub struct SyncEngine {
    cfg: Config,
    store: RecordStore,
    access: AccessTable,
    buckets: BucketTable,
    style: MessageStyle,
}

impl SyncEngine {
    pub fn new(cfg: Config) -> Result<Self> {
        let store = RecordStore::new(&cfg);
        let access = match AccessTable::from_path(std::path::Path::new(&cfg.access_path))? {
            Some(table) => table,
            None => {
                log(
                    Level::Warn,
                    Domain::Access,
                    "access_table_missing",
                    obj(&[("path", v_str(&cfg.access_path))]),
                );
                AccessTable::default()
            }
        };
        let buckets = match &cfg.buckets_path {
            Some(path) => BucketTable::from_path(std::path::Path::new(path))?,
            None => BucketTable::default(),
        };
        let style = MessageStyle::new(&cfg.notify_separator, &cfg.notify_suffix);
        Ok(Self {
            cfg,
            store,
            access,
            buckets,
            style,
        })
    }

    /// One polling tick: load, normalize, detect, persist the advanced
    /// snapshot, render. Never fails; every failure degrades to a safe
    /// default and is retried next tick.
    pub fn tick(&mut self) -> TickOutcome {
        let ts = now_ts();

        let raw_rows = match self.store.load_rows() {
            Ok(Some(rows)) => rows,
            Ok(None) => Vec::new(),
            Err(err) => {
                // Unreadable dataset: render zeros but leave the snapshot
                // alone so the next successful load compares against a
                // stale-but-valid baseline.
                log(
                    Level::Error,
                    Domain::Store,
                    "dataset_load_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                let dataset = normalize(&[], &self.cfg.roster, &self.cfg.periods, self.cfg.default_goal);
                let bars = render(&dataset, &self.buckets);
                return TickOutcome {
                    notification: NotificationView::idle(),
                    bars,
                    dataset,
                    snapshot_saved: false,
                };
            }
        };

        let dataset = normalize(&raw_rows, &self.cfg.roster, &self.cfg.periods, self.cfg.default_goal);

        let previous = match self.store.load_snapshot() {
            Ok(prev) => prev,
            Err(err) => {
                // Corrupt snapshot re-establishes the baseline; by the
                // first-tick rule that cannot fire a notification.
                log(
                    Level::Warn,
                    Domain::Store,
                    "snapshot_load_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                None
            }
        };

        let detection = detect(&dataset, previous.as_ref(), &self.style, ts);
        let prev_state =
            NotifyState::from_flag(previous.as_ref().map(|s| s.notification_active).unwrap_or(false));
        let next_state = transition(prev_state, !detection.increased.is_empty());

        let mut snapshot = detection.snapshot;
        snapshot.notification_active = next_state.is_active();
        if !next_state.is_active() {
            snapshot.message.clear();
        }

        json_log(
            Domain::Detect,
            "tick_compared",
            obj(&[
                ("increased", v_num(detection.increased.len() as f64)),
                ("baseline", v_bool(previous.is_none())),
                ("state_hash", v_str(&snapshot_hash(&snapshot))),
            ]),
        );
        if prev_state != next_state {
            json_log(
                Domain::Notify,
                "session_transition",
                obj(&[
                    ("prev", v_str(&format!("{:?}", prev_state))),
                    ("next", v_str(&format!("{:?}", next_state))),
                    ("message", v_str(&snapshot.message)),
                ]),
            );
        }

        let snapshot_saved = match self.store.save_snapshot(&snapshot) {
            Ok(()) => true,
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Store,
                    "snapshot_save_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                false
            }
        };

        let bars = render(&dataset, &self.buckets);
        TickOutcome {
            notification: NotificationView::from_snapshot(&snapshot),
            bars,
            dataset,
            snapshot_saved,
        }
    }

    /// Full replacement of the dataset's editable cells. Names are identity
    /// and totals are recomputed server-side, so the input is normalized
    /// before anything touches disk; rows for unknown names are dropped.
    pub fn apply_edit(&mut self, identity: &str, raw_rows: &[RawRow]) -> EditOutcome {
        let tier = self.access.resolve(identity);
        if !tier.can_edit() {
            json_log(
                Domain::Access,
                "edit_rejected",
                obj(&[("identity", v_str(identity)), ("tier", v_str(&format!("{:?}", tier)))]),
            );
            return EditOutcome::Denied;
        }
        let dataset = normalize(raw_rows, &self.cfg.roster, &self.cfg.periods, self.cfg.default_goal);
        match self.store.save_rows(&dataset.to_raw_rows()) {
            Ok(()) => {
                json_log(
                    Domain::Store,
                    "dataset_saved",
                    obj(&[("rows", v_num(dataset.rows.len() as f64))]),
                );
                EditOutcome::Saved
            }
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Store,
                    "dataset_save_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                EditOutcome::SaveFailed(err.to_string())
            }
        }
    }

    /// Full replacement of the incentive text, gated like dataset edits.
    pub fn apply_incentive(&mut self, identity: &str, text: &str) -> EditOutcome {
        let tier = self.access.resolve(identity);
        if !tier.can_edit() {
            json_log(
                Domain::Access,
                "edit_rejected",
                obj(&[("identity", v_str(identity)), ("tier", v_str(&format!("{:?}", tier)))]),
            );
            return EditOutcome::Denied;
        }
        match self.store.save_incentive(text) {
            Ok(()) => EditOutcome::Saved,
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Store,
                    "incentive_save_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                EditOutcome::SaveFailed(err.to_string())
            }
        }
    }

    /// Current incentive text; absent file falls back to the configured
    /// default, read failures degrade to the same default.
    pub fn incentive(&self) -> String {
        match self.store.load_incentive() {
            Ok(Some(text)) => text,
            Ok(None) => self.cfg.default_incentive.clone(),
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Store,
                    "incentive_load_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                self.cfg.default_incentive.clone()
            }
        }
    }

    pub fn resolve_access(&self, identity: &str) -> Tier {
        let tier = self.access.resolve(identity);
        json_log(
            Domain::Access,
            "identity_resolved",
            obj(&[("identity", v_str(identity)), ("tier", v_str(&format!("{:?}", tier)))]),
        );
        tier
    }
}

fn snapshot_hash(snapshot: &Snapshot) -> String {
    serde_json::to_string(snapshot)
        .map(|s| state_hash(&s))
        .unwrap_or_default()
}
