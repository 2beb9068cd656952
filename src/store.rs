// src/store.rs
//! File persistence for the cross-run `SeenKeys` set.
//!
//! Runs against the same file must be serialized by the caller: the set is
//! read once before a run and written once after it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dedup::SeenKeys;

pub const DEFAULT_SEEN_PATH: &str = "state/seen_keys.json";
pub const ENV_SEEN_PATH: &str = "TRIAGE_SEEN_PATH";

/// `$TRIAGE_SEEN_PATH` or `state/seen_keys.json`.
pub fn seen_path_from_env() -> PathBuf {
    std::env::var(ENV_SEEN_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SEEN_PATH))
}

/// A missing file is an empty set; a malformed one is an error.
pub fn load_seen_keys(path: &Path) -> Result<SeenKeys> {
    if !path.exists() {
        return Ok(SeenKeys::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading seen keys from {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(SeenKeys::new());
    }
    serde_json::from_str(&raw).with_context(|| format!("parsing seen keys {}", path.display()))
}

/// Writes via a sibling temp file and rename, creating the parent directory.
pub fn save_seen_keys(path: &Path, seen: &SeenKeys) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let body = serde_json::to_string_pretty(seen)?;
    fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
