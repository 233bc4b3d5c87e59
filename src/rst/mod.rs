//! reStructuredText parsing engine.
//!
//! The parser consults a [`Registry`] for every directive and role it meets.
//! Unknown names, undefined substitutions and unresolved hyperlink
//! references become [`SystemMessage`]s on the returned [`Document`].
//!
//! ```
//! use std::sync::Arc;
//! use rstcheck::rst::{Directive, DirectiveCall, Node, Parser, Registry, State};
//!
//! struct Silent;
//!
//! impl Directive for Silent {
//!     fn has_content(&self) -> bool { true }
//!     fn run(&self, _call: &DirectiveCall<'_>, _state: &mut State<'_>) -> Vec<Node> { vec![] }
//! }
//!
//! let mut registry = Registry::pristine();
//! registry.register_directive("toctree", Arc::new(Silent));
//!
//! let document = Parser::new(&registry).parse(".. toctree::\n\n   intro\n");
//! assert!(document.messages.is_empty());
//! ```

mod builtins;
mod inline;
mod nodes;
mod parser;
mod registry;

pub use nodes::{CodeBlock, Document, Level, LiteralBlock, Node, SystemMessage, CODE_BLOCK_CLASS};
pub use parser::{Parser, State};
pub use registry::{substitution_role_key, Directive, DirectiveCall, Registry, Role, RoleCall};
