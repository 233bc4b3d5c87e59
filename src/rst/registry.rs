//! Name-keyed directive and role tables.
//!
//! A [`Registry`] starts out holding the built-in docutils directives and
//! roles. Callers add or override entries before parsing and restore the
//! built-in state with [`Registry::reset`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::builtins;
use super::nodes::{Node, SystemMessage};
use super::parser::State;

/// A parsed directive occurrence handed to a [`Directive`] handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveCall<'a> {
    /// The name as written in the document
    pub name: &'a str,
    pub arguments: Vec<String>,
    pub options: Vec<(String, String)>,
    /// Body lines with the block indentation removed
    pub content: Vec<String>,
    /// Line of the `.. name::` marker
    pub line: usize,
    /// Line of the first content line
    pub content_offset: usize,
}

impl DirectiveCall<'_> {
    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }
}

/// Handler for a block-level directive.
///
/// The argument and content declarations drive how the parser splits the
/// directive block before [`run`](Self::run) is called, the same way
/// docutils does it: with no arguments and no options declared, everything
/// after the marker is content.
pub trait Directive: Send + Sync {
    fn required_arguments(&self) -> usize {
        0
    }

    fn optional_arguments(&self) -> usize {
        0
    }

    /// Whether the last argument may contain whitespace.
    fn final_argument_whitespace(&self) -> bool {
        false
    }

    /// Whether `:name: value` lines after the arguments are options.
    fn has_options(&self) -> bool {
        false
    }

    fn has_content(&self) -> bool {
        false
    }

    /// Produce the nodes for this occurrence. Problems are reported through
    /// [`State::report`].
    fn run(&self, call: &DirectiveCall<'_>, state: &mut State<'_>) -> Vec<Node>;
}

/// An interpreted text occurrence handed to a [`Role`] handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCall<'a> {
    pub name: &'a str,
    /// The whole markup, e.g. ``:kbd:`Ctrl+C` ``
    pub rawtext: &'a str,
    pub text: &'a str,
    pub line: usize,
}

/// Handler for inline interpreted text.
pub trait Role: Send + Sync {
    fn run(&self, call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>);
}

/// Directive and role tables consulted by the parser.
#[derive(Clone)]
pub struct Registry {
    directives: HashMap<String, Arc<dyn Directive>>,
    roles: HashMap<String, Arc<dyn Role>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::pristine()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("directives", &self.directives.len())
            .field("roles", &self.roles.len())
            .finish()
    }
}

impl Registry {
    /// A registry holding only the built-in directives and roles.
    pub fn pristine() -> Self {
        let mut registry = Self {
            directives: HashMap::new(),
            roles: HashMap::new(),
        };
        builtins::install(&mut registry);
        registry
    }

    /// Install `handler` for `name`, replacing any previous handler.
    pub fn register_directive(&mut self, name: &str, handler: Arc<dyn Directive>) {
        self.directives.insert(normalize(name), handler);
    }

    /// Install `handler` for `name`, replacing any previous handler.
    pub fn register_role(&mut self, name: &str, handler: Arc<dyn Role>) {
        self.roles.insert(normalize(name), handler);
    }

    pub fn directive(&self, name: &str) -> Option<Arc<dyn Directive>> {
        self.directives.get(&normalize(name)).cloned()
    }

    pub fn role(&self, name: &str) -> Option<Arc<dyn Role>> {
        self.roles.get(&normalize(name)).cloned()
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.contains_key(&normalize(name))
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains_key(&normalize(name))
    }

    /// Drop every registration and go back to the built-in tables.
    pub fn reset(&mut self) {
        debug!(
            directives = self.directives.len(),
            roles = self.roles.len(),
            "Resetting directive and role tables"
        );
        *self = Self::pristine();
    }
}

/// Role table key under which the resolver for substitution `name` lives.
///
/// Role references are simple names, so a key wrapped in `|` can never be
/// reached from interpreted text or collide with a real role.
pub fn substitution_role_key(name: &str) -> String {
    format!("|{name}|")
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(&'static str);

    impl Role for Marker {
        fn run(&self, _call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>) {
            (vec![Node::Text(self.0.to_string())], vec![])
        }
    }

    fn call() -> RoleCall<'static> {
        RoleCall {
            name: "thing",
            rawtext: ":thing:`x`",
            text: "x",
            line: 1,
        }
    }

    #[test]
    fn test_pristine_has_builtins() {
        let registry = Registry::pristine();
        assert!(registry.has_directive("note"));
        assert!(registry.has_directive("code"));
        assert!(registry.has_role("emphasis"));
        assert!(!registry.has_directive("toctree"));
        assert!(!registry.has_role("doc"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = Registry::pristine();
        assert!(registry.has_directive("NOTE"));
        assert!(registry.has_role("Strong"));
    }

    #[test]
    fn test_register_twice_last_write_wins() {
        let mut registry = Registry::pristine();
        registry.register_role("thing", Arc::new(Marker("first")));
        registry.register_role("thing", Arc::new(Marker("second")));

        let (nodes, messages) = registry.role("thing").unwrap().run(&call());

        assert_eq!(nodes, vec![Node::Text("second".to_string())]);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_reset_drops_registrations() {
        let mut registry = Registry::pristine();
        registry.register_role("thing", Arc::new(Marker("x")));
        registry.register_role("emphasis", Arc::new(Marker("override")));

        registry.reset();

        assert!(!registry.has_role("thing"));
        let (nodes, _) = registry.role("emphasis").unwrap().run(&call());
        assert_ne!(nodes, vec![Node::Text("override".to_string())]);
    }
}
