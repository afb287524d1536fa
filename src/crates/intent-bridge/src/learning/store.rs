//! JSON persistence for learned patterns
//!
//! The document is rewritten wholesale: serialized to a sibling `.tmp` file
//! and renamed over the target.

use super::{LearnedPattern, Stats};
use crate::{BridgeError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreDocument {
    #[serde(default)]
    pub patterns: IndexMap<String, LearnedPattern>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Read the store; `None` when the file does not exist
pub(crate) async fn load(path: &Path) -> Result<Option<StoreDocument>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BridgeError::PersistenceFailure(format!(
                "cannot read {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_str(&text).map(Some).map_err(|e| {
        BridgeError::PersistenceFailure(format!("cannot parse {}: {}", path.display(), e))
    })
}

pub(crate) async fn save(path: &Path, document: &StoreDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    let failed = |e: std::io::Error| {
        BridgeError::PersistenceFailure(format!("cannot write {}: {}", path.display(), e))
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(failed)?;
    }

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, json).await.map_err(failed)?;
    tokio::fs::rename(&tmp, path).await.map_err(failed)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "learning.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
