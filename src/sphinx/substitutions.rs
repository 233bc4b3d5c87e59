//! Substitutions and link targets Sphinx injects into every document.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::rst::{substitution_role_key, Node, Registry, Role, RoleCall, SystemMessage};

pub type SubstitutionMap = HashMap<String, String>;
pub type TargetMap = HashMap<String, String>;

static SUBSTITUTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\. \|([^|\n]+)\| replace:: (.+)").unwrap());

static LINK_TARGET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\. _([^:\n]+): (.+)").unwrap());

/// Harvest `.. |NAME| replace:: VALUE` and `.. _NAME: VALUE` lines from
/// `prolog`, then layer `context` substitutions on top.
///
/// A later line overrides an earlier one with the same name, and context
/// values override prolog values.
pub fn extract<I, K, V>(prolog: &str, context: I) -> (SubstitutionMap, TargetMap)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut substitutions: SubstitutionMap = SUBSTITUTION_RE
        .captures_iter(prolog)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    let targets: TargetMap = LINK_TARGET_RE
        .captures_iter(prolog)
        .map(|caps| (target_name(&caps[1]).to_string(), caps[2].to_string()))
        .collect();

    for (name, value) in context {
        substitutions.insert(name.into(), value.into());
    }

    debug!(
        substitutions = substitutions.len(),
        targets = targets.len(),
        "Extracted Sphinx substitutions and targets"
    );
    (substitutions, targets)
}

/// `` `Name With Spaces` `` quoting is markup, not part of the name.
fn target_name(raw: &str) -> &str {
    raw.strip_prefix('`')
        .and_then(|name| name.strip_suffix('`'))
        .unwrap_or(raw)
}

/// Resolves substitution references to a stored literal value.
#[derive(Debug, Clone)]
pub struct SubstitutionResolver {
    table: Arc<SubstitutionMap>,
    /// Lowercased name to the original key. Of keys differing only in case,
    /// the lexicographically smallest one is kept.
    folded: Arc<HashMap<String, String>>,
}

impl SubstitutionResolver {
    pub fn new(table: SubstitutionMap) -> Self {
        let mut folded: HashMap<String, String> = HashMap::new();
        for key in table.keys().sorted() {
            folded.entry(key.to_lowercase()).or_insert_with(|| key.clone());
        }
        Self {
            table: Arc::new(table),
            folded: Arc::new(folded),
        }
    }

    /// Value for `name`, matching case-insensitively when there is no exact
    /// entry.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.table
            .get(name)
            .or_else(|| {
                self.folded
                    .get(&name.to_lowercase())
                    .and_then(|key| self.table.get(key))
            })
            .map(String::as_str)
    }
}

impl Role for SubstitutionResolver {
    fn run(&self, call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>) {
        // registered only under keys present in the table
        let text = self.lookup(call.name).unwrap_or(call.rawtext);
        (vec![Node::Text(text.to_string())], vec![])
    }
}

/// Install one shared [`SubstitutionResolver`] for every name in
/// `substitutions`, under [`substitution_role_key`] keys.
pub fn register_substitutions(registry: &mut Registry, substitutions: &SubstitutionMap) {
    if substitutions.is_empty() {
        return;
    }
    let resolver: Arc<dyn Role> = Arc::new(SubstitutionResolver::new(substitutions.clone()));
    for name in substitutions.keys() {
        debug!("Register substitution resolver for '{}'", name);
        registry.register_role(&substitution_role_key(name), resolver.clone());
    }
}
