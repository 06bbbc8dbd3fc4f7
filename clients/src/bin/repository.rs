//! `repository` — Registers a new repository in the project index.
//!
//! **Steps (in order, stopping at the first failure):**
//! - `<name>/` — instantiated from every file in `.template/`
//! - `index.html` — `<li><a href="/NAME">NAME</a></li>` inserted in order
//! - `README.md` — `- [NAME](/NAME)` inserted in order
//! - `repository.json` — name recorded, array kept sorted
//!
//! **Usage:**
//! ```
//! repository [--root <path>] [--log-level <spec>] <NAME>
//! ```
//!
//! Exits with status 1 and prints `repository: <error>` on standard output
//! if the name is missing or any step fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use log::info;
use repo_index::logging::{init_logging, resolve_level};
use repo_index::{register, Layout};

/// Register a repository in the project index.
#[derive(Parser)]
#[command(
    name = "repository",
    about = "Register a repository in the project index"
)]
struct Args {
    /// Name of the repository to register.
    name: String,

    /// Root of the project index (default: current directory).
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Log specification, e.g. `info` or `repo_index=debug`
    /// (default: $REPOSITORY_LOG, else `warn`).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.kind() == ErrorKind::MissingRequiredArgument => {
            println!("repository: missing repository name argument");
            process::exit(1);
        }
        Err(err) => err.exit(),
    };

    let level = resolve_level(args.log_level.as_deref());
    let _logger = match init_logging(&level) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("repository: cannot start logging with {:?}: {}", level, err);
            None
        }
    };

    if let Err(err) = run(&args) {
        println!("repository: {:#}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let layout = Layout::new(&args.root);
    info!(
        "event=register status=start name={} root={}",
        args.name,
        layout.root.display()
    );
    let registration = register(&layout, &args.name)
        .with_context(|| format!("cannot register {}", args.name))?;

    if registration.already_registered() {
        println!("{} is already registered.", args.name);
    } else {
        println!("Registered {}.", args.name);
    }
    println!("  Files: {}", registration.files.len());
    println!("  Directory: {}", layout.repository_dir(&args.name).display());

    Ok(())
}
