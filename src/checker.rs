//! Turning documents into reportable lint errors.

use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::code_check::check_code_block;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::rst::Level;
use crate::session::Session;

/// Origin reported for sources that did not come from a file.
pub const STRING_ORIGIN: &str = "<string>";

/// One reportable problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintError {
    pub source_origin: String,
    pub line_number: usize,
    pub level: Level,
    pub message: String,
}

impl fmt::Display for LintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: ({}) {}",
            self.source_origin, self.line_number, self.level, self.message
        )
    }
}

/// Check `source`, read from `source_file` if it came from one.
///
/// The file's directory is where Sphinx configuration is looked for and what
/// `include` paths are relative to. Results are sorted by line.
pub fn check_source(source: &str, source_file: Option<&Path>, settings: &Settings) -> Result<Vec<LintError>> {
    let ignore_messages = settings
        .ignore_messages
        .as_deref()
        .map(Regex::new)
        .transpose()?;
    let origin = source_file.map_or_else(|| STRING_ORIGIN.to_string(), |path| path.display().to_string());
    let source_dir = source_file.and_then(Path::parent).map(|dir| {
        if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        }
    });

    let mut session = Session::new();
    session.prepare(source_dir, settings)?;
    let document = session.parse(source);

    let mut errors: Vec<LintError> = document
        .messages
        .iter()
        .filter(|message| settings.report_level.admits(message.level))
        .map(|message| LintError {
            source_origin: origin.clone(),
            line_number: message.line,
            level: message.level,
            message: message.message.clone(),
        })
        .collect();

    for block in document.code_blocks() {
        if settings
            .ignore_languages
            .iter()
            .any(|language| language.eq_ignore_ascii_case(&block.language))
        {
            debug!("Skipping {} code block at line {}", block.language, block.line);
            continue;
        }
        if !settings.report_level.admits(Level::Error) {
            continue;
        }
        errors.extend(check_code_block(&block).into_iter().map(|issue| LintError {
            source_origin: origin.clone(),
            line_number: issue.line,
            level: Level::Error,
            message: issue.message,
        }));
    }
    session.reset();

    if let Some(pattern) = &ignore_messages {
        errors.retain(|error| !pattern.is_match(&error.message));
    }
    errors.sort_by_key(|error| error.line_number);
    Ok(errors)
}

/// Read and check the file at `path`.
pub fn check_file(path: &Path, settings: &Settings) -> Result<Vec<LintError>> {
    debug!("Checking {}", path.display());
    let source = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    check_source(&source, Some(path), settings)
}
