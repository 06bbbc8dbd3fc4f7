//! The JSON manifest of registered repository names.

use std::path::Path;

use crate::editor::Insertion;
use crate::error::{IndexError, Result};
use crate::writer;

/// Sorted, duplicate-free list of repository names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    names: Vec<String>,
}

impl Manifest {
    /// Reads the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the file cannot be read and
    /// [`IndexError::Decode`] if it is not a JSON array of strings.
    pub fn load(path: &Path) -> Result<Self> {
        let data = writer::read(path)?;
        let names: Vec<String> = serde_json::from_str(&data).map_err(|source| IndexError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { names })
    }

    /// Names in manifest order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if `name` is recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Records `name`, keeping the list sorted and free of duplicates.
    pub fn record(&mut self, name: &str) -> Insertion {
        if self.contains(name) {
            return Insertion::Duplicate;
        }
        self.names.push(name.to_string());
        self.names.sort();
        self.names.dedup();
        let index = self.names.iter().position(|n| n == name).unwrap_or_default();
        Insertion::Inserted { index }
    }

    /// Serializes the manifest with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Decode`] if serialization fails.
    pub fn to_json(&self, path: &Path) -> Result<String> {
        serde_json::to_string_pretty(&self.names).map_err(|source| IndexError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the manifest to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json(path)?;
        writer::write_atomic(path, json.as_bytes())
    }
}

impl From<Vec<String>> for Manifest {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

/// Records `name` in the manifest at `path`, saving it only when it changed.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, decoded or written.
pub fn update_manifest(path: &Path, name: &str) -> Result<Insertion> {
    let mut manifest = Manifest::load(path)?;
    let outcome = manifest.record(name);
    if outcome.is_inserted() {
        manifest.save(path)?;
    }
    Ok(outcome)
}
