//! rstcheck CLI - check reStructuredText files.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::{DirEntry, WalkDir};

use rstcheck::{check_file, check_source, LintError, ReportLevel, Settings, SphinxMode};

/// File extensions checked when walking directories.
const RST_EXTENSIONS: [&str; 2] = ["rst", "rest"];

/// File argument that stands for standard input.
const STDIN: &str = "-";

/// Check reStructuredText files for syntax errors, Sphinx aware.
#[derive(Parser)]
#[command(name = "rstcheck", version, about)]
struct Cli {
    /// Files or directories to check; `-` reads standard input.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Check `.rst` files in directories recursively.
    #[arg(short, long)]
    recursive: bool,

    /// Lowest level of message to report.
    #[arg(long, value_enum)]
    report_level: Option<ReportLevel>,

    /// Comma-separated directives to ignore.
    #[arg(long, value_delimiter = ',')]
    ignore_directives: Vec<String>,

    /// Comma-separated roles to ignore.
    #[arg(long, value_delimiter = ',')]
    ignore_roles: Vec<String>,

    /// Comma-separated substitutions to ignore.
    #[arg(long, value_delimiter = ',')]
    ignore_substitutions: Vec<String>,

    /// Comma-separated code block languages to skip.
    #[arg(long, value_delimiter = ',')]
    ignore_languages: Vec<String>,

    /// Regular expression; matching messages are not reported.
    #[arg(long)]
    ignore_messages: Option<String>,

    /// Whether to use Sphinx directives, roles and configuration.
    #[arg(long, value_enum)]
    sphinx: Option<SphinxMode>,

    /// Directory whose `.rstcheck` settings file is read.
    #[arg(long, value_name = "DIR")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer command line options over file settings. Lists are appended.
    fn apply(&self, settings: &mut Settings) {
        if let Some(level) = self.report_level {
            settings.report_level = level;
        }
        if let Some(mode) = self.sphinx {
            settings.sphinx = mode;
        }
        if let Some(pattern) = &self.ignore_messages {
            settings.ignore_messages = Some(pattern.clone());
        }
        settings.ignore_directives.extend(self.ignore_directives.iter().cloned());
        settings.ignore_roles.extend(self.ignore_roles.iter().cloned());
        settings
            .ignore_substitutions
            .extend(self.ignore_substitutions.iter().cloned());
        settings.ignore_languages.extend(self.ignore_languages.iter().cloned());
    }

    /// Split `-` out of the file arguments. Returns whether standard input
    /// should be checked, and the remaining paths.
    fn inputs(&self) -> (bool, Vec<PathBuf>) {
        let (stdin, paths): (Vec<_>, Vec<_>) = self
            .files
            .iter()
            .cloned()
            .partition(|path| path == Path::new(STDIN));
        (!stdin.is_empty(), paths)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => {
            println!("Success! No issues detected.");
            ExitCode::SUCCESS
        }
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Check everything named on the command line. `Ok(true)` when clean.
fn run(cli: &Cli) -> Result<bool> {
    let root = match &cli.config {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let mut settings = Settings::new(&root).context("Failed to load settings")?;
    cli.apply(&mut settings);
    debug!(?settings, "Effective settings");

    let (read_stdin, paths) = cli.inputs();
    let mut clean = true;
    if read_stdin {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read standard input")?;
        let errors = check_source(&source, None, &settings)?;
        clean &= report(&errors);
    }

    let files = discover(&paths, cli.recursive)?;
    debug!("Checking {} files", files.len());

    // one session per file, so files are independent
    let results: Vec<_> = files
        .par_iter()
        .map(|path| (path, check_file(path, &settings)))
        .collect();

    for (path, result) in results {
        match result {
            Ok(errors) => clean &= report(&errors),
            Err(err) => {
                let err = anyhow::Error::from(err).context(format!("Failed to check {}", path.display()));
                eprintln!("Error: {err:#}");
                clean = false;
            }
        }
    }
    Ok(clean)
}

/// Print `errors`; true when there were none.
fn report(errors: &[LintError]) -> bool {
    for error in errors {
        eprintln!("{error}");
    }
    errors.is_empty()
}

/// Expand the command line paths into the list of files to check.
fn discover(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        if !recursive {
            warn!("{} is a directory; pass --recursive to check it", path.display());
            continue;
        }
        for entry in WalkDir::new(path).into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            if entry.file_type().is_file() && is_rst(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn is_rst(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RST_EXTENSIONS.contains(&ext))
}
