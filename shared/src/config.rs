use crate::form::FormInput;
use serde::{Deserialize, Serialize};

/// Page configuration, read from `gsea.toml`.
///
/// Every section and key is optional; whatever is missing falls back to the
/// layout the backend serves out of the box.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub worker: WorkerSection,
    pub module: ModuleSection,
    pub defaults: FormInput,
}

/// Where the page finds the computation unit's own bundle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorkerSection {
    pub script: String,
    pub wasm: String,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            script: "/_api/public/worker/gsea_worker.js".to_string(),
            wasm: "/_api/public/worker/gsea_worker_bg.wasm".to_string(),
        }
    }
}

/// The external analysis module the unit imports.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModuleSection {
    pub url: String,
    pub entry_point: String,
}

impl Default for ModuleSection {
    fn default() -> Self {
        Self {
            url: "/_api/public/pkg/gsea_rs.js".to_string(),
            entry_point: "prerank_rs".to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Parses `text`, falling back to defaults. The parse error, if any, is
    /// handed back so the caller can log it.
    pub fn from_toml_or_default(text: &str) -> (Self, Option<String>) {
        match Self::from_toml_str(text) {
            Ok(config) => (config, None),
            Err(error) => (Self::default(), Some(error.to_string())),
        }
    }
}
