//! Operator entry point: deploy packaged definitions from one or all modules.
//!
//! Positional arguments pre-answer the module, kind, and file prompts; any
//! axis left out is asked for interactively on stdin. Outcome lines go to
//! stdout, diagnostics to stderr, registrations to the NDJSON journal.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use defdeploy::config::{JOURNAL_ENV, MAX_ATTEMPTS_ENV, MODULES_ROOT_ENV};
use defdeploy::logging::init_logging;
use defdeploy::{
    Config, ConfigOverrides, ConsolePrompt, DirectoryRegistry, JournalServices, ModuleId,
    ResourceIndex, SelectionRequest, Services, run_invocation,
};
use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "deploy-definition")]
#[command(about = "Deploy a specific definition from a packaged module")]
struct Cli {
    /// The module identifier where to find the definition
    module_id: Option<u64>,

    /// The kind of definitions to load (e.g. condition, action, ...)
    kind: Option<String>,

    /// The file containing the definition, extension optional (e.g. firstName)
    file_name: Option<String>,

    /// Directory holding one sub-directory per module
    #[arg(long, env = MODULES_ROOT_ENV)]
    modules_root: Option<PathBuf>,

    /// NDJSON file registrations are appended to
    #[arg(long, env = JOURNAL_ENV)]
    journal: Option<PathBuf>,

    /// Give up after this many invalid answers to one prompt (0 = never)
    #[arg(long, env = MAX_ATTEMPTS_ENV)]
    max_attempts: Option<u32>,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

/// Returns false when the invocation aborted before deploying anything.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = env::current_dir().context("reading current directory")?;
    let config = Config::resolve(
        ConfigOverrides {
            modules_root: cli.modules_root,
            journal: cli.journal,
            max_attempts: cli.max_attempts,
        },
        &cwd,
    )?;
    info!(root = %config.modules_root.display(), journal = %config.journal.display(), "configuration resolved");

    let registry = DirectoryRegistry::open(&config.modules_root)?;
    let index = ResourceIndex::new(&registry);

    let journal_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.journal)
        .with_context(|| format!("opening journal {}", config.journal.display()))?;
    let journal = JournalServices::new(journal_file);
    let services = Services::uniform(&journal);

    let request = SelectionRequest {
        module_id: cli.module_id.map(ModuleId),
        kind: cli.kind,
        file_name: cli.file_name,
    };

    let stdin = io::stdin();
    let mut prompter = ConsolePrompt::new(stdin.lock(), io::stdout());
    let mut out = io::stdout();

    match run_invocation(
        &index,
        &mut prompter,
        config.retry,
        &services,
        &request,
        &mut out,
    ) {
        Ok(report) => {
            info!(
                kind = %report.kind,
                registered = report.registered.len(),
                failed = report.failures.len(),
                "invocation completed"
            );
            Ok(true)
        }
        Err(err) if err.is_fatal() => {
            writeln!(out, "{err}")?;
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
