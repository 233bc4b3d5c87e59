//! rstcheck: a reStructuredText checker that understands Sphinx
//!
//! This crate parses reStructuredText documents and reports the problems
//! docutils would report, without flagging the directives, roles and
//! substitutions a Sphinx project legitimately adds.
//!
//! # Overview
//!
//! For every document the checker:
//!
//! - **Locates the Sphinx project**: walks up to the nearest `conf.py`
//! - **Collects Sphinx markup**: the directive and role names of the
//!   standard and language domains, bundled extensions and `extlinks`
//! - **Ignores that markup**: installs inert handlers, except for the
//!   whitelisted code and include directives, which stay checked
//! - **Resolves substitutions**: from `rst_prolog`, `rst_epilog` and
//!   `html_context["substitutions"]`
//! - **Checks embedded code**: JSON and YAML code blocks are validated
//!
//! # Architecture
//!
//! - [`rst`]: the parser and its directive/role [`Registry`](rst::Registry)
//! - [`sphinx`]: conf root lookup, `conf.py` reading, the name catalog and
//!   substitution extraction
//! - [`ignore`] and [`code_block`]: the handlers installed into a registry
//! - [`session`]: a registry prepared for one document
//! - [`checker`]: turning a document into [`LintError`]s
//! - [`config`]: settings
//!
//! # Usage
//!
//! ```ignore
//! use rstcheck::{check_file, Settings};
//!
//! let settings = Settings::new(&project_dir)?;
//! for error in check_file(&project_dir.join("index.rst"), &settings)? {
//!     println!("{error}");
//! }
//! ```

// Parsing
pub mod rst;

// Markup extension handling
pub mod code_block;
pub mod ignore;
pub mod session;
pub mod sphinx;

// Checking
pub mod checker;
pub mod code_check;

// Configuration and errors
pub mod config;
pub mod error;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;

pub use checker::{check_file, check_source, LintError};
pub use config::{ReportLevel, Settings, SphinxMode};
pub use error::{Error, Result};
pub use session::Session;
