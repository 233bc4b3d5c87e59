//! End-to-end checks of documents inside Sphinx projects.
//!
//! Each test lays out a project in a temp directory with a `conf.py` and
//! checks files through [`rstcheck::check_file`].

#![cfg(feature = "sphinx")]

use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use tempfile::TempDir;

use rstcheck::{check_file, LintError, ReportLevel, Session, Settings, SphinxMode};

/// Helper: Create a temporary project directory with a `conf.py`.
///
/// Returns (TempDir, PathBuf) - keep TempDir alive for test duration.
fn create_sphinx_project(conf_py: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let project_dir = temp_dir.path().join("project");
    fs::create_dir(&project_dir).expect("Failed to create project subdirectory");
    fs::write(project_dir.join("conf.py"), conf_py).expect("Failed to write conf.py");
    (temp_dir, project_dir)
}

fn messages(errors: &[LintError]) -> Vec<(usize, &str)> {
    errors
        .iter()
        .map(|e| (e.line_number, e.message.as_str()))
        .collect()
}

const CONF_PY: &str = r#"
# -- Project information
project = "Demo"
release = "2.1"

extensions = [
    "sphinx.ext.autodoc",
    "sphinx.ext.todo",
    "sphinx.ext.extlinks",
]

extlinks = {"issue": ("https://example.com/issues/%s", "issue %s")}

rst_prolog = """
.. |project| replace:: Demo
.. |release| replace:: 2.0
"""

rst_epilog = ".. _tracker: https://example.com/issues"

html_context = {
    "substitutions": {"release": "2.1", "codename": "Otter"},
}
"#;

// ============================================================================
// Sphinx markup
// ============================================================================

#[test]
fn test_sphinx_document_is_clean() {
    let (_temp_dir, project_dir) = create_sphinx_project(CONF_PY);
    let docs = project_dir.join("api");
    fs::create_dir(&docs).unwrap();
    fs::write(
        docs.join("index.rst"),
        r#"API
===

.. toctree::
   :maxdepth: 2

   modules

.. automodule:: demo.core
   :members:

.. py:function:: run(config)

   Runs :py:class:`demo.Config` (see :ref:`setup`).

.. todo:: Document errors.

|project| |release| "|codename|" lives at tracker_; see :issue:`42`
and :kbd:`Ctrl+C`.
"#,
    )
    .unwrap();

    let errors = check_file(&docs.join("index.rst"), &Settings::default()).unwrap();

    assert!(errors.is_empty(), "{errors:#?}");
}

#[test]
fn test_unknown_markup_still_reported() {
    let (_temp_dir, project_dir) = create_sphinx_project(CONF_PY);
    let file = project_dir.join("index.rst");
    fs::write(
        &file,
        ".. not-a-directive::\n\n:not-a-role:`x` and |nothing| and nowhere_\n",
    )
    .unwrap();

    let errors = check_file(&file, &Settings::default()).unwrap();

    assert_eq!(
        messages(&errors),
        vec![
            (1, "Unknown directive type \"not-a-directive\"."),
            (3, "Unknown interpreted text role \"not-a-role\"."),
            (3, "Undefined substitution referenced: \"nothing\"."),
            (3, "Unknown target name: \"nowhere\"."),
        ]
    );
    assert!(errors.iter().all(|e| e.source_origin == file.display().to_string()));
}

#[test]
fn test_sphinx_off_reports_sphinx_markup() {
    let (_temp_dir, project_dir) = create_sphinx_project(CONF_PY);
    let file = project_dir.join("index.rst");
    fs::write(&file, ".. toctree::\n\n|project|\n").unwrap();
    let settings = Settings {
        sphinx: SphinxMode::Off,
        ..Default::default()
    };

    let errors = check_file(&file, &settings).unwrap();

    assert_eq!(
        messages(&errors),
        vec![
            (1, "Unknown directive type \"toctree\"."),
            (3, "Undefined substitution referenced: \"project\"."),
        ]
    );
}

#[test]
fn test_context_substitution_overrides_prolog() {
    let (_temp_dir, project_dir) = create_sphinx_project(CONF_PY);
    let mut session = Session::new();

    session.prepare(Some(&project_dir), &Settings::default()).unwrap();

    assert_eq!(session.substitutions()["release"], "2.1");
    assert_eq!(session.substitutions()["project"], "Demo");
    assert_eq!(session.targets()["tracker"], "https://example.com/issues");
}

// ============================================================================
// Embedded code
// ============================================================================

#[test]
fn test_code_block_errors_use_document_lines() {
    let (_temp_dir, project_dir) = create_sphinx_project("");
    let file = project_dir.join("config.rst");
    fs::write(
        &file,
        r#"Configuration
=============

.. code-block:: json
   :caption: settings.json

   {
     "debug": true
     "level": 3
   }

.. sourcecode:: yaml

   key: [unclosed
"#,
    )
    .unwrap();

    let errors = check_file(&file, &Settings::default()).unwrap();

    assert_eq!(errors.len(), 2, "{errors:#?}");
    assert_eq!(errors[0].line_number, 9);
    assert!(errors[0].message.starts_with("(JSON)"));
    assert!(errors[1].line_number >= 14);
    assert!(errors[1].message.starts_with("(YAML)"));

    let settings = Settings {
        ignore_languages: vec!["json".to_string(), "yaml".to_string()],
        ..Default::default()
    };
    assert!(check_file(&file, &settings).unwrap().is_empty());
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_report_level_and_user_ignores() {
    let (_temp_dir, project_dir) = create_sphinx_project("");
    let file = project_dir.join("index.rst");
    fs::write(&file, "Long title\n=====\n\n.. mermaid::\n\n   graph TD\n").unwrap();

    let defaults = check_file(&file, &Settings::default()).unwrap();
    assert_eq!(defaults.len(), 2);

    let settings = Settings {
        report_level: ReportLevel::Error,
        ignore_directives: vec!["mermaid".to_string()],
        ..Default::default()
    };
    assert!(check_file(&file, &settings).unwrap().is_empty());
}

#[test]
fn test_settings_file_in_project_root() {
    let (_temp_dir, project_dir) = create_sphinx_project("");
    fs::write(
        project_dir.join(".rstcheck.toml"),
        "ignore_roles = [\"jira\"]\nignore_substitutions = [\"today\"]\n",
    )
    .unwrap();
    let file = project_dir.join("index.rst");
    fs::write(&file, "See :jira:`ABC-1` as of |today|.\n").unwrap();

    let settings = Settings::new(&project_dir).unwrap();

    assert!(check_file(&file, &settings).unwrap().is_empty());
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn test_parallel_checks_do_not_share_ignores() {
    let (_temp_a, with_ext) = create_sphinx_project("extensions = ['sphinx.ext.todo']\n");
    let (_temp_b, without_ext) = create_sphinx_project("extensions = []\n");
    let source = ".. todo:: write this\n";
    let files: Vec<PathBuf> = (0..8)
        .map(|i| {
            let dir = if i % 2 == 0 { &with_ext } else { &without_ext };
            let file = dir.join(format!("doc{i}.rst"));
            fs::write(&file, source).unwrap();
            file
        })
        .collect();

    let results: Vec<usize> = files
        .par_iter()
        .map(|file| check_file(file, &Settings::default()).unwrap().len())
        .collect();

    assert_eq!(results, vec![0, 1, 0, 1, 0, 1, 0, 1]);
}

#[test]
fn test_session_reuse_after_reset() {
    let (_temp_a, with_ext) = create_sphinx_project("extensions = ['sphinx.ext.todo']\n");
    let (_temp_b, without_ext) = create_sphinx_project("");
    let source = ".. todo:: write this\n";
    let mut session = Session::new();

    session.prepare(Some(&with_ext), &Settings::default()).unwrap();
    assert!(session.parse(source).messages.is_empty());
    session.reset();

    session.prepare(Some(&without_ext), &Settings::default()).unwrap();
    assert_eq!(session.parse(source).messages.len(), 1);
}
