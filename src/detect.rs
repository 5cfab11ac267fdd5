//! Change detection: compare the current dataset's totals against the last
//! persisted snapshot and produce a notification intent.
//!
//! The snapshot always advances to the current totals regardless of outcome,
//! which makes detection idempotent: running it again on the same dataset
//! finds nothing and clears the flag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Dataset;

/// Last-observed board state, shared across all viewers through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub totals: BTreeMap<String, f64>,
    pub notification_active: bool,
    #[serde(default)]
    pub message: String,
    pub ts: u64,
}

/// How the notification message is assembled from the increase set.
#[derive(Debug, Clone)]
pub struct MessageStyle {
    pub separator: String,
    pub suffix: String,
}

impl MessageStyle {
    pub fn new(separator: &str, suffix: &str) -> Self {
        Self {
            separator: separator.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn compose(&self, names: &[String]) -> String {
        if names.is_empty() {
            return String::new();
        }
        format!("{}{}", names.join(&self.separator), self.suffix)
    }
}

#[derive(Debug, Clone)]
pub struct Detection {
    /// Names whose total strictly increased since the previous snapshot.
    pub increased: Vec<String>,
    pub message: String,
    /// Replacement snapshot carrying the current totals.
    pub snapshot: Snapshot,
}

/// Compare `current` against `previous`. `None` means baseline tick: no
/// notification is possible without a prior observation. Entities present in
/// `current` but absent from `previous` have no baseline and are treated as
/// non-increasing. Decreases and ties are silent.
pub fn detect(current: &Dataset, previous: Option<&Snapshot>, style: &MessageStyle, ts: u64) -> Detection {
    let totals = current.totals();

    let increased: Vec<String> = match previous {
        None => Vec::new(),
        Some(prev) => current
            .rows
            .iter()
            .filter(|row| match prev.totals.get(&row.name) {
                Some(prior) => row.total > *prior,
                None => false,
            })
            .map(|row| row.name.clone())
            .collect(),
    };

    let message = style.compose(&increased);
    let snapshot = Snapshot {
        totals,
        notification_active: !increased.is_empty(),
        message: message.clone(),
        ts,
    };

    Detection {
        increased,
        message,
        snapshot,
    }
}
