use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// What a finished run left behind. Written for inspection and support,
/// never read back to resume an interrupted install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallRecord {
    pub product: String,
    pub version: String,
    pub files: Vec<String>,
    #[serde(default)]
    pub prerequisite_installed: bool,
}

pub fn record_path(destination: &Path) -> PathBuf {
    destination.join("install.json")
}

pub fn write_record(record_path: &Path, record: &InstallRecord) -> Result<()> {
    if let Some(parent) = record_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(record).context("serialize install.json")?;
    fs::write(record_path, contents).context("write install.json")?;
    Ok(())
}

#[cfg(test)]
pub fn read_record(record_path: &Path) -> Result<InstallRecord> {
    let s = fs::read_to_string(record_path).context("read install.json")?;
    Ok(serde_json::from_str(&s).context("parse install.json")?)
}
