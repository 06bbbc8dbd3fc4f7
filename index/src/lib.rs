//! Repository index registrar.
//!
//! Registers a new repository in a small static project index. One
//! registration performs four steps in a fixed order, stopping at the
//! first failure:
//!
//! 1. instantiate `<name>/` from the files in `.template/`
//! 2. link `/<name>` from the list in `index.html`
//! 3. link `/<name>` from the bullet list in `README.md`
//! 4. record `<name>` in `repository.json`
//!
//! Steps 2 to 4 keep their lists sorted and never add a name twice, so
//! registering the same name again leaves every document unchanged.
//! Steps that already completed are not undone when a later one fails.
//!
//! # Entry Point
//!
//! ```no_run
//! use repo_index::{register, Layout};
//!
//! let layout = Layout::new(".");
//! let registration = register(&layout, "widgets").expect("Registration failed");
//! println!("{} template file(s) written", registration.files.len());
//! ```
//!
//! # Layout
//!
//! ```text
//! ./
//!   .template/        ← one file per output, `{{ . }}` expands to the name
//!   index.html        ← html > body > div > ul of <li><a href="/NAME">NAME</a></li>
//!   README.md         ← second block: bullet list of [NAME](/NAME)
//!   repository.json   ← ["NAME", ...]
//!   <name>/           ← created by registration
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod editor;
pub mod error;
pub mod html;
pub mod layout;
pub mod logging;
pub mod manifest;
pub mod markdown;
pub mod template;
pub mod writer;

use std::path::PathBuf;

use log::info;

pub use editor::{insert_sorted, Boundary, EntryList, Insertion};
pub use error::{IndexError, Result};
pub use layout::{validate_name, Layout};

/// What one registration changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Files written from templates, in render order.
    pub files: Vec<PathBuf>,
    /// Outcome of the `index.html` update.
    pub index: Insertion,
    /// Outcome of the `README.md` update.
    pub readme: Insertion,
    /// Outcome of the `repository.json` update.
    pub manifest: Insertion,
}

impl Registration {
    /// Returns true if none of the documents needed a new entry.
    pub fn already_registered(&self) -> bool {
        !(self.index.is_inserted() || self.readme.is_inserted() || self.manifest.is_inserted())
    }
}

/// Registers `name` in the project index described by `layout`.
///
/// # Errors
///
/// Returns [`IndexError::Usage`] for an unusable name, otherwise the error
/// of the first step that failed. Earlier steps stay applied.
pub fn register(layout: &Layout, name: &str) -> Result<Registration> {
    validate_name(name)?;

    let files = template::materialize(&layout.templates, &layout.repository_dir(name), name)?;
    info!("event=materialize status=ok name={} files={}", name, files.len());

    let index = html::update_index(&layout.index, name)?;
    info!("event=index status=ok name={} outcome={:?}", name, index);

    let readme = markdown::update_readme(&layout.readme, name)?;
    info!("event=readme status=ok name={} outcome={:?}", name, readme);

    let manifest = manifest::update_manifest(&layout.manifest, name)?;
    info!("event=manifest status=ok name={} outcome={:?}", name, manifest);

    Ok(Registration {
        files,
        index,
        readme,
        manifest,
    })
}
