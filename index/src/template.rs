//! Template instantiation for a newly registered repository.
//!
//! Every regular file directly inside the template directory is rendered
//! with the repository name as its only value and written under the same
//! file name into the repository directory.
//!
//! # Template Syntax
//!
//! Templates use Go template syntax, evaluated by [`gtmpl`]. The datum `.`
//! is the repository name with HTML special characters escaped, as
//! `html/template` does for text content:
//!
//! ```text
//! <h1>{{ . }}</h1>                   the repository name
//! {{/* a comment */}}                removed from the output
//! {{ printf "%s-docs" . }}           functions and pipelines
//! {{ if . }}...{{ end }}             actions
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use gtmpl::Context;
use log::debug;
use walkdir::WalkDir;

use crate::error::{IndexError, Result};
use crate::writer;

/// A parsed template file.
pub struct Template {
    engine: gtmpl::Template,
}

impl Template {
    /// Parses template source; `path` names the file in errors.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Template`] if the source is not a valid
    /// template.
    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        let mut engine = gtmpl::Template::default();
        engine
            .parse(source)
            .map_err(|err| template_error(path, err))?;
        Ok(Self { engine })
    }

    /// Renders the template with `name` as the datum.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Template`] if evaluation fails, for example on
    /// a call to an undefined function or a field access on the name.
    pub fn render(&self, path: &Path, name: &str) -> Result<String> {
        self.engine
            .render(&Context::from(escape_html(name)))
            .map_err(|err| template_error(path, err))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template").finish_non_exhaustive()
    }
}

fn template_error(path: &Path, err: impl fmt::Display) -> IndexError {
    IndexError::Template {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Escapes HTML special characters in a string.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&#34;")
        .replace('\'', "&#39;")
}

/// Lists the template files in `template_dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`IndexError::Io`] if the directory cannot be read.
pub fn template_files(template_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(template_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(template_dir).to_path_buf();
            IndexError::io(&path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Renders every template into `out_dir`, creating it if needed.
///
/// Returns the paths written, in the order they were rendered.
///
/// # Errors
///
/// Returns an error if the output directory cannot be created, a template
/// cannot be read, parsed or rendered, or an output file cannot be written. The first
/// failure stops the remaining templates.
pub fn materialize(template_dir: &Path, out_dir: &Path, name: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|e| IndexError::io(out_dir, e))?;

    let mut written = Vec::new();
    for template_path in template_files(template_dir)? {
        let Some(file_name) = template_path.file_name() else {
            continue;
        };
        let source = writer::read(&template_path)?;
        let template = Template::parse(&template_path, &source)?;
        let rendered = template.render(&template_path, name)?;

        let output = out_dir.join(file_name);
        writer::write_truncate(&output, &rendered)?;
        debug!(
            "event=template_rendered template={} output={}",
            template_path.display(),
            output.display()
        );
        written.push(output);
    }
    Ok(written)
}
