//! Visualization deriver: rank the dataset into color-bucketed bars. Pure
//! function of the dataset, no state.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Dataset;

pub const GRAND_TOTAL_LABEL: &str = "Total Sales";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Red,
    Blue,
    Green,
    Purple,
    Orange,
}

/// Ordered half-open value ranges mapped to colors. A value belongs to the
/// first bucket whose upper bound it does not exceed; anything above the last
/// bound gets `overflow`. Total over the real line: no gaps, no overlaps,
/// each boundary value lands in exactly one bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketTable {
    /// Ascending inclusive upper bounds.
    pub bounds: Vec<(f64, Color)>,
    pub overflow: Color,
}

impl Default for BucketTable {
    fn default() -> Self {
        Self {
            bounds: vec![
                (999.0, Color::Black),
                (1999.0, Color::Red),
                (2999.0, Color::Blue),
                (3999.0, Color::Green),
                (4999.0, Color::Purple),
            ],
            overflow: Color::Orange,
        }
    }
}

impl BucketTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read bucket table {}", path.display()))?;
        let table: BucketTable = serde_json::from_str(&raw)
            .with_context(|| format!("malformed bucket table {}", path.display()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bounds.is_empty() {
            bail!("bucket table has no bounds");
        }
        for pair in self.bounds.windows(2) {
            if pair[1].0 <= pair[0].0 {
                bail!("bucket bounds not strictly ascending: {} then {}", pair[0].0, pair[1].0);
            }
        }
        Ok(())
    }

    pub fn color_for(&self, value: f64) -> Color {
        for (bound, color) in &self.bounds {
            if value <= *bound {
                return *color;
            }
        }
        self.overflow
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub name: String,
    pub value: f64,
    pub color: Color,
}

/// One bar per entity plus a synthetic grand-total bar, sorted ascending by
/// value for display. Output length is always entity count + 1.
pub fn render(dataset: &Dataset, buckets: &BucketTable) -> Vec<Bar> {
    let mut bars: Vec<Bar> = dataset
        .rows
        .iter()
        .map(|row| Bar {
            name: row.name.clone(),
            value: row.total,
            color: buckets.color_for(row.total),
        })
        .collect();

    let grand = dataset.grand_total();
    bars.push(Bar {
        name: GRAND_TOTAL_LABEL.to_string(),
        value: grand,
        color: buckets.color_for(grand),
    });

    bars.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));
    bars
}
