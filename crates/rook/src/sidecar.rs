//
// sidecar.rs
//
// Side-car metadata persisted as JSON next to the document
//

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::fold::{decode_folds, encode_folds, Fold, FoldDecodeError};

/// Property key holding the encoded fold list.
pub const PROPERTY_FOLDS: &str = "folds";

/// String properties stored alongside a document, preserving insertion
/// order so the file diffs cleanly across saves.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SidecarProperties {
    properties: IndexMap<String, String>,
}

impl SidecarProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.properties.shift_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Store the fold list under [`PROPERTY_FOLDS`]. An empty list removes
    /// the property.
    pub fn set_folds(&mut self, folds: &[Fold]) {
        if folds.is_empty() {
            self.properties.shift_remove(PROPERTY_FOLDS);
        } else {
            self.set(PROPERTY_FOLDS, encode_folds(folds));
        }
    }

    /// Decode the stored fold list. A missing property is an empty list;
    /// a malformed one is a decode error.
    pub fn folds(&self) -> Result<Vec<Fold>, FoldDecodeError> {
        match self.get(PROPERTY_FOLDS) {
            Some(encoded) => decode_folds(encoded),
            None => Ok(Vec::new()),
        }
    }

    /// The side-car path for a document: the document path with a
    /// `.rook.json` suffix appended.
    pub fn path_for(document_path: &Path) -> PathBuf {
        let mut name = document_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.push_str(".rook.json");
        document_path.with_file_name(name)
    }

    /// Load properties from `path`. A missing file is an empty property
    /// set, not an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading side-car {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing side-car {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(&self.properties)?;
        fs::write(path, contents)
            .with_context(|| format!("writing side-car {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
