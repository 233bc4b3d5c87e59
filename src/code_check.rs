//! Syntax checks for the languages of embedded code blocks.

use serde::Deserialize;
use tracing::debug;

use crate::rst::CodeBlock;

/// A syntax error inside a code block, positioned in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeIssue {
    pub line: usize,
    pub message: String,
}

/// Validate `block` with the checker for its language. Languages without a
/// checker always pass.
pub fn check_code_block(block: &CodeBlock) -> Vec<CodeIssue> {
    let found = match block.language.to_lowercase().as_str() {
        "json" => check_json(&block.text),
        "yaml" | "yml" => check_yaml(&block.text),
        "" => None,
        other => {
            debug!("No checker for language '{}'", other);
            None
        }
    };

    found
        .map(|(line, message)| CodeIssue {
            // error lines count from 1 within the block
            line: block.line + line.max(1) - 1,
            message,
        })
        .into_iter()
        .collect()
}

fn check_json(text: &str) -> Option<(usize, String)> {
    match serde_json::from_str::<serde::de::IgnoredAny>(text) {
        Ok(_) => None,
        Err(e) => Some((e.line(), format!("(JSON) {e}"))),
    }
}

fn check_yaml(text: &str) -> Option<(usize, String)> {
    for document in serde_yaml::Deserializer::from_str(text) {
        if let Err(e) = serde_yaml::Value::deserialize(document) {
            let line = e.location().map_or(1, |location| location.line());
            return Some((line, format!("(YAML) {e}")));
        }
    }
    None
}
