//! Dataset model: normalization of loosely-typed stored rows into a fully
//! populated numeric table.
//!
//! The roster and period set are fixed configuration. Normalization is a
//! total function: malformed cells degrade to 0.0, missing roster entities
//! are synthesized with all-zero periods, and rows for names outside the
//! roster are dropped. It never fails and never produces a partial dataset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column key for the per-entity goal in stored rows.
pub const GOAL_KEY: &str = "Goal";

/// One row as it sits on disk: a name plus loosely-typed cells keyed by
/// column label. Cells may be numbers, numeric strings, or garbage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(flatten)]
    pub cells: BTreeMap<String, Value>,
}

impl RawRow {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, key: &str, value: Value) -> Self {
        self.cells.insert(key.to_string(), value);
        self
    }
}

/// One normalized row. `total` is always recomputed from `values`; it is
/// never stored and never independently edited. `goal` is carried for the
/// edit surface but excluded from the total and from change detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    /// Period values, aligned with `Dataset::periods`.
    pub values: Vec<f64>,
    pub goal: f64,
    pub total: f64,
}

/// Ordered normalized table, one row per roster entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub periods: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }

    /// Per-entity totals keyed by name, the shape the snapshot stores.
    pub fn totals(&self) -> BTreeMap<String, f64> {
        self.rows
            .iter()
            .map(|r| (r.name.clone(), r.total))
            .collect()
    }

    /// Back to the on-disk shape: numeric cells only, no stored total.
    pub fn to_raw_rows(&self) -> Vec<RawRow> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = BTreeMap::new();
                for (period, value) in self.periods.iter().zip(row.values.iter()) {
                    cells.insert(period.clone(), json_num(*value));
                }
                cells.insert(GOAL_KEY.to_string(), json_num(row.goal));
                RawRow {
                    name: row.name.clone(),
                    cells,
                }
            })
            .collect()
    }
}

fn json_num(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Total coercion function for untrusted cells. Finite non-negative numbers
/// (or strings that parse to them) pass through; everything else, including
/// negative and non-finite input, yields 0.0.
pub fn coerce_cell(cell: Option<&Value>) -> f64 {
    let parsed = match cell {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Normalize stored rows into a full dataset over the configured roster and
/// periods.
pub fn normalize(raw: &[RawRow], roster: &[String], periods: &[String], default_goal: f64) -> Dataset {
    let by_name: BTreeMap<&str, &RawRow> = raw.iter().map(|r| (r.name.as_str(), r)).collect();

    let rows = roster
        .iter()
        .map(|name| {
            let stored = by_name.get(name.as_str());
            let values: Vec<f64> = periods
                .iter()
                .map(|p| coerce_cell(stored.and_then(|r| r.cells.get(p))))
                .collect();
            let goal = match stored.and_then(|r| r.cells.get(GOAL_KEY)) {
                Some(cell) => coerce_cell(Some(cell)),
                None => default_goal,
            };
            let total = values.iter().sum();
            Row {
                name: name.clone(),
                values,
                goal,
                total,
            }
        })
        .collect();

    Dataset {
        periods: periods.to_vec(),
        rows,
    }
}
