//! JSON record of a plotting run.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use emtf_core::{Error, Result, Window};
use serde::{Deserialize, Serialize};

pub const MANIFEST_SCHEMA: &str = "emtf_plot_manifest_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMeta {
    pub tool: String,
    pub tool_version: String,
    pub created_unix_ms: u128,
}

/// One written image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub kind: String,
    pub name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window: Option<Window>,
    pub series: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotManifest {
    pub schema_version: String,
    pub meta: ManifestMeta,
    /// Results file the plots were drawn from.
    pub input: String,
    pub artifacts: Vec<ManifestEntry>,
}

fn now_unix_ms() -> Result<u128> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Computation(format!("system time error: {e}")))?;
    Ok(d.as_millis())
}

impl PlotManifest {
    pub fn new(input: impl Into<String>) -> Result<Self> {
        Ok(Self {
            schema_version: MANIFEST_SCHEMA.to_string(),
            meta: ManifestMeta {
                tool: "emtf".into(),
                tool_version: env!("CARGO_PKG_VERSION").into(),
                created_unix_ms: now_unix_ms()?,
            },
            input: input.into(),
            artifacts: Vec::new(),
        })
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.artifacts.push(entry);
    }

    /// Write pretty JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
