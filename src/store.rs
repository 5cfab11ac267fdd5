//! Record store: flat JSON files for the dataset, the incentive message, and
//! the shared snapshot.
//!
//! A missing file is `Ok(None)` (first run), distinct from a corrupt file,
//! which is an error. Saves write a temp file in the same directory and
//! rename it into place, so a failed save leaves the prior durable bytes
//! unchanged; callers report the failure as a non-fatal status and retry on
//! the next tick or edit.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::detect::Snapshot;
use crate::model::RawRow;

/// On-disk shape of the incentive message file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveDoc {
    #[serde(rename = "incentiveText")]
    pub incentive_text: String,
}

pub struct RecordStore {
    data_path: PathBuf,
    incentive_path: PathBuf,
    snapshot_path: PathBuf,
}

impl RecordStore {
    pub fn new(cfg: &Config) -> Self {
        Self {
            data_path: PathBuf::from(&cfg.data_path),
            incentive_path: PathBuf::from(&cfg.incentive_path),
            snapshot_path: PathBuf::from(&cfg.snapshot_path),
        }
    }

    pub fn load_rows(&self) -> Result<Option<Vec<RawRow>>> {
        read_json(&self.data_path)
    }

    pub fn save_rows(&self, rows: &[RawRow]) -> Result<()> {
        write_json(&self.data_path, &rows)
    }

    pub fn load_incentive(&self) -> Result<Option<String>> {
        let doc: Option<IncentiveDoc> = read_json(&self.incentive_path)?;
        Ok(doc.map(|d| d.incentive_text))
    }

    pub fn save_incentive(&self, text: &str) -> Result<()> {
        write_json(
            &self.incentive_path,
            &IncentiveDoc {
                incentive_text: text.to_string(),
            },
        )
    }

    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        read_json(&self.snapshot_path)
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        write_json(&self.snapshot_path, snapshot)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("cannot read {}", path.display())),
    };
    let value =
        serde_json::from_str(&raw).with_context(|| format!("corrupt record {}", path.display()))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, &body).with_context(|| format!("cannot write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("cannot replace {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
