//! Where the registrar finds its inputs and writes its outputs.

use std::path::{Path, PathBuf};

use crate::error::{IndexError, Result};

/// Directory holding the files instantiated for every repository.
pub const TEMPLATE_DIR: &str = ".template";
/// Site landing page holding the HTML link list.
pub const INDEX_FILE: &str = "index.html";
/// Repository README holding the Markdown link list.
pub const README_FILE: &str = "README.md";
/// JSON array of every registered repository name.
pub const MANIFEST_FILE: &str = "repository.json";

/// Paths used by one registration, resolved against a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Root of the project index.
    pub root: PathBuf,
    /// Template directory.
    pub templates: PathBuf,
    /// HTML index page.
    pub index: PathBuf,
    /// Markdown README.
    pub readme: PathBuf,
    /// JSON manifest.
    pub manifest: PathBuf,
}

impl Layout {
    /// Resolves the standard file names against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            templates: root.join(TEMPLATE_DIR),
            index: root.join(INDEX_FILE),
            readme: root.join(README_FILE),
            manifest: root.join(MANIFEST_FILE),
            root,
        }
    }

    /// Directory a repository named `name` is instantiated into.
    pub fn repository_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Checks that `name` can serve as a directory name and a link target.
///
/// # Errors
///
/// Returns [`IndexError::Usage`] for empty names, `.`/`..`, names with a
/// path separator, control characters or surrounding whitespace.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name refers to a directory itself")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.chars().any(char::is_control) {
        Some("name contains control characters")
    } else if name.trim() != name {
        Some("name has leading or trailing whitespace")
    } else if Path::new(name).is_absolute() {
        Some("name is an absolute path")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(IndexError::Usage {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
