//! Access gate: a declarative identity -> tier table loaded from
//! configuration. Unknown identities resolve to `Denied`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Full,
    Limited,
    Denied,
}

impl Tier {
    /// Only `Full` may write the dataset or the incentive text.
    pub fn can_edit(&self) -> bool {
        matches!(self, Tier::Full)
    }

    /// `Denied` routes to the login view; the rest reach the dashboard.
    pub fn can_view(&self) -> bool {
        !matches!(self, Tier::Denied)
    }
}

/// Permission table: identity -> tier. Stored as a flat JSON object, e.g.
/// `{"payton@example.com": "full", "keenan@example.com": "limited"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessTable {
    entries: BTreeMap<String, Tier>,
}

impl AccessTable {
    pub fn from_entries(entries: &[(&str, Tier)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(id, tier)| (canonical(id), *tier))
                .collect(),
        }
    }

    /// Missing file is an explicit `None` so the caller can fall back to an
    /// empty table (everyone denied) rather than treat first-run as an error.
    pub fn from_path(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read access table {}", path.display()))
            }
        };
        let table: AccessTable = serde_json::from_str(&raw)
            .with_context(|| format!("malformed access table {}", path.display()))?;
        Ok(Some(table))
    }

    pub fn resolve(&self, identity: &str) -> Tier {
        self.entries
            .get(&canonical(identity))
            .copied()
            .unwrap_or(Tier::Denied)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn canonical(identity: &str) -> String {
    identity.trim().to_ascii_lowercase()
}
