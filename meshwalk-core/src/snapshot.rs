// Snapshot assembly and persistence

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use meshwalk_scanner::{NodeRecord, WalkOutcome};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// One entry of `nodeInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub data: NodeRecord,
}

/// The persisted result of a walk, as consumed by the map front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub node_info: Vec<NodeInfo>,
    pub non_mapped: usize,
    pub hosts_scraped: usize,
    pub date: DateTime<Utc>,
}

impl Snapshot {
    pub fn assemble(outcome: WalkOutcome, generated_at: DateTime<Utc>) -> Self {
        Self {
            node_info: outcome
                .records
                .into_iter()
                .map(|data| NodeInfo { data })
                .collect(),
            non_mapped: outcome.non_mapped,
            hosts_scraped: outcome.total_attempted,
            date: generated_at,
        }
    }

    pub fn mapped(&self) -> usize {
        self.node_info.len()
    }

    pub fn supernodes(&self) -> usize {
        self.node_info
            .iter()
            .filter(|info| info.data.is_supernode())
            .count()
    }

    /// Write the snapshot next to `path`, then rename it into place so
    /// readers never see a partial file.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let staging = staging_path(path);
        debug!("Writing snapshot to {}", staging.display());
        let result = self
            .write_staged(&staging)
            .and_then(|()| Ok(fs::rename(&staging, path)?));

        match &result {
            Ok(()) => debug!("Snapshot moved into place at {}", path.display()),
            Err(_) => {
                if let Err(e) = fs::remove_file(&staging) {
                    debug!("Could not remove {}: {}", staging.display(), e);
                }
            }
        }
        result
    }

    fn write_staged(&self, staging: &Path) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(staging)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// `out.json` is staged as `out.json.new`.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".new");
    PathBuf::from(staged)
}
