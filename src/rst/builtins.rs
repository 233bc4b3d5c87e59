//! The directives and roles a registry starts out with.
//!
//! These mirror the standard docutils set closely enough for checking:
//! argument counts and content rules are enforced, bodies are parsed where
//! docutils parses them, and everything else is accepted as is.

use std::path::Path;
use std::sync::Arc;

use super::nodes::{Level, LiteralBlock, Node, SystemMessage};
use super::parser::State;
use super::registry::{Directive, DirectiveCall, Registry, Role, RoleCall};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Body {
    /// No content allowed
    Empty,
    /// Content is parsed as body elements
    Nested,
    /// Content is parsed as inline text
    Inline,
    /// Content is kept verbatim
    Literal,
}

/// A table-driven standard directive.
#[derive(Clone, Copy, Debug)]
struct Standard {
    required: usize,
    optional: usize,
    final_whitespace: bool,
    body: Body,
    content_required: bool,
}

impl Standard {
    const fn new(required: usize, optional: usize, body: Body, content_required: bool) -> Self {
        Self {
            required,
            optional,
            final_whitespace: required + optional > 0,
            body,
            content_required,
        }
    }

    /// Admonition-like: no arguments, parsed body that must be present.
    const fn body() -> Self {
        Self::new(0, 0, Body::Nested, true)
    }
}

const STANDARD_DIRECTIVES: &[(&str, Standard)] = &[
    ("attention", Standard::body()),
    ("caution", Standard::body()),
    ("danger", Standard::body()),
    ("error", Standard::body()),
    ("hint", Standard::body()),
    ("important", Standard::body()),
    ("note", Standard::body()),
    ("tip", Standard::body()),
    ("warning", Standard::body()),
    ("admonition", Standard::new(1, 0, Body::Nested, true)),
    ("topic", Standard::new(1, 0, Body::Nested, true)),
    ("sidebar", Standard::new(0, 1, Body::Nested, true)),
    ("rubric", Standard::new(1, 0, Body::Empty, false)),
    ("epigraph", Standard::body()),
    ("highlights", Standard::body()),
    ("pull-quote", Standard::body()),
    ("compound", Standard::body()),
    ("container", Standard::new(0, 1, Body::Nested, true)),
    ("line-block", Standard::new(0, 0, Body::Inline, true)),
    ("parsed-literal", Standard::new(0, 0, Body::Inline, true)),
    ("code", Standard::new(0, 1, Body::Literal, true)),
    ("math", Standard::new(0, 1, Body::Literal, false)),
    ("image", Standard::new(1, 0, Body::Empty, false)),
    ("figure", Standard::new(1, 0, Body::Nested, false)),
    ("table", Standard::new(0, 1, Body::Nested, true)),
    ("csv-table", Standard::new(0, 1, Body::Literal, false)),
    ("list-table", Standard::new(0, 1, Body::Nested, true)),
    ("contents", Standard::new(0, 1, Body::Empty, false)),
    ("sectnum", Standard::new(0, 0, Body::Empty, false)),
    ("section-numbering", Standard::new(0, 0, Body::Empty, false)),
    ("header", Standard::body()),
    ("footer", Standard::body()),
    ("target-notes", Standard::new(0, 0, Body::Empty, false)),
    ("meta", Standard::new(0, 0, Body::Literal, true)),
    ("raw", Standard::new(1, 0, Body::Literal, false)),
    ("replace", Standard::new(0, 0, Body::Inline, true)),
    ("unicode", Standard::new(1, 0, Body::Empty, false)),
    ("date", Standard::new(0, 1, Body::Empty, false)),
    ("class", Standard::new(1, 0, Body::Nested, false)),
    ("title", Standard::new(1, 0, Body::Empty, false)),
];

const STANDARD_ROLES: &[&str] = &[
    "abbreviation",
    "ab",
    "acronym",
    "ac",
    "emphasis",
    "math",
    "strong",
    "subscript",
    "sub",
    "superscript",
    "sup",
    "title-reference",
    "title",
    "t",
];

pub(super) fn install(registry: &mut Registry) {
    for (name, standard) in STANDARD_DIRECTIVES {
        registry.register_directive(name, Arc::new(*standard));
    }
    registry.register_directive("include", Arc::new(Include));
    registry.register_directive("role", Arc::new(RoleDirective));
    registry.register_directive("default-role", Arc::new(DefaultRole));

    let generic: Arc<dyn Role> = Arc::new(GenericRole);
    for name in STANDARD_ROLES {
        registry.register_role(name, generic.clone());
    }
    let literal: Arc<dyn Role> = Arc::new(LiteralRole);
    registry.register_role("literal", literal.clone());
    registry.register_role("code", literal);
    let pep: Arc<dyn Role> = Arc::new(NumberedRole::Pep);
    registry.register_role("pep", pep.clone());
    registry.register_role("pep-reference", pep);
    let rfc: Arc<dyn Role> = Arc::new(NumberedRole::Rfc);
    registry.register_role("rfc", rfc.clone());
    registry.register_role("rfc-reference", rfc);
    registry.register_role("raw", Arc::new(RawRole));
}

impl Directive for Standard {
    fn required_arguments(&self) -> usize {
        self.required
    }

    fn optional_arguments(&self) -> usize {
        self.optional
    }

    fn final_argument_whitespace(&self) -> bool {
        self.final_whitespace
    }

    fn has_options(&self) -> bool {
        true
    }

    fn has_content(&self) -> bool {
        self.body != Body::Empty
    }

    fn run(&self, call: &DirectiveCall<'_>, state: &mut State<'_>) -> Vec<Node> {
        if self.content_required && call.content.is_empty() {
            state.report(
                Level::Warning,
                call.line,
                format!(
                    "Content block expected for the \"{}\" directive; none found.",
                    call.name
                ),
            );
            return vec![];
        }

        match self.body {
            Body::Empty => match call.name.to_lowercase().as_str() {
                "unicode" | "date" => vec![Node::Text(call.arguments.join(" "))],
                _ => vec![Node::Container {
                    name: call.name.to_string(),
                    line: call.line,
                    children: vec![],
                }],
            },
            Body::Nested => {
                let children = state.nested_parse(&call.content, call.content_offset);
                vec![Node::Container {
                    name: call.name.to_string(),
                    line: call.line,
                    children,
                }]
            }
            Body::Inline => state.parse_inline(&call.content.join("\n"), call.content_offset),
            Body::Literal => {
                let text = if call.content.is_empty() {
                    call.arguments.join(" ")
                } else {
                    call.content.join("\n")
                };
                vec![Node::LiteralBlock(LiteralBlock {
                    line: call.content_offset,
                    text,
                    language: call.argument(0).unwrap_or_default().to_string(),
                    classes: vec![call.name.to_lowercase()],
                })]
            }
        }
    }
}

/// `include`: the path must exist. The included text is not checked here;
/// checking it is the job of whoever discovers the file.
struct Include;

impl Directive for Include {
    fn required_arguments(&self) -> usize {
        1
    }

    fn final_argument_whitespace(&self) -> bool {
        true
    }

    fn has_options(&self) -> bool {
        true
    }

    fn run(&self, call: &DirectiveCall<'_>, state: &mut State<'_>) -> Vec<Node> {
        let path = call.argument(0).unwrap_or_default();
        // <name> points into the docutils standard library
        if path.starts_with('<') && path.ends_with('>') {
            return vec![];
        }
        let resolved = match state.source_dir() {
            Some(dir) => dir.join(path),
            None => Path::new(path).to_path_buf(),
        };
        if !resolved.exists() {
            state.report(
                Level::Severe,
                call.line,
                format!(
                    "Problems with \"include\" directive path: No such file or directory: '{path}'."
                ),
            );
        }
        vec![]
    }
}

/// `role`: defines `name` or `name(base)` for the rest of the document.
struct RoleDirective;

impl Directive for RoleDirective {
    fn required_arguments(&self) -> usize {
        1
    }

    fn has_options(&self) -> bool {
        true
    }

    fn has_content(&self) -> bool {
        true
    }

    fn run(&self, call: &DirectiveCall<'_>, state: &mut State<'_>) -> Vec<Node> {
        let argument = call.argument(0).unwrap_or_default();
        let (name, base) = match argument.split_once('(') {
            Some((name, base)) => (name, Some(base.trim_end_matches(')'))),
            None => (argument, None),
        };

        if let Some(base) = base {
            if state.lookup_role(base).is_none() {
                state.report(
                    Level::Error,
                    call.line,
                    format!("Unknown interpreted text role \"{base}\"."),
                );
                return vec![];
            }
        }

        state.define_role(name, Arc::new(GenericRole));
        vec![]
    }
}

/// `default-role`: changes (or with no argument restores) the role used by
/// plain interpreted text.
struct DefaultRole;

impl Directive for DefaultRole {
    fn optional_arguments(&self) -> usize {
        1
    }

    fn run(&self, call: &DirectiveCall<'_>, state: &mut State<'_>) -> Vec<Node> {
        match call.argument(0) {
            Some(name) if state.lookup_role(name).is_none() => {
                state.report(
                    Level::Error,
                    call.line,
                    format!("Unknown interpreted text role \"{name}\"."),
                );
            }
            Some(name) => state.set_default_role(Some(name.to_string())),
            None => state.set_default_role(None),
        }
        vec![]
    }
}

struct GenericRole;

impl Role for GenericRole {
    fn run(&self, call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>) {
        let node = Node::Inline {
            role: call.name.to_string(),
            text: call.text.to_string(),
        };
        (vec![node], vec![])
    }
}

struct LiteralRole;

impl Role for LiteralRole {
    fn run(&self, call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>) {
        (vec![Node::Literal(call.text.to_string())], vec![])
    }
}

enum NumberedRole {
    Pep,
    Rfc,
}

impl Role for NumberedRole {
    fn run(&self, call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>) {
        // `rfc:2324#section-2` style anchors are allowed
        let number = call.text.split('#').next().unwrap_or_default().trim();
        let valid = match self {
            NumberedRole::Pep => number.parse::<u32>().is_ok_and(|n| n <= 9999),
            NumberedRole::Rfc => number.parse::<u32>().is_ok_and(|n| n >= 1),
        };
        if valid {
            return GenericRole.run(call);
        }
        let message = match self {
            NumberedRole::Pep => format!(
                "PEP number must be a number from 0 to 9999; \"{}\" is invalid.",
                call.text
            ),
            NumberedRole::Rfc => format!(
                "RFC number must be a number greater than or equal to 1; \"{}\" is invalid.",
                call.text
            ),
        };
        (
            vec![Node::Text(call.rawtext.to_string())],
            vec![SystemMessage::new(Level::Error, call.line, message)],
        )
    }
}

struct RawRole;

impl Role for RawRole {
    fn run(&self, call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>) {
        let message = format!(
            "No format (Writer name) is associated with this role: \"{}\". The \"raw\" role cannot be used directly.",
            call.name
        );
        (
            vec![Node::Text(call.rawtext.to_string())],
            vec![SystemMessage::new(Level::Error, call.line, message)],
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::rst::{Document, Level, Node, Parser, Registry};

    fn parse(source: &str) -> Document {
        let registry = Registry::pristine();
        Parser::new(&registry).parse(source)
    }

    #[test]
    fn test_admonition_body_is_checked() {
        let document = parse(".. note::\n\n   Uses :unknown:`role`.\n");
        assert_eq!(document.messages.len(), 1);
        assert_eq!(document.messages[0].line, 3);
        assert_eq!(
            document.messages[0].message,
            "Unknown interpreted text role \"unknown\"."
        );
    }

    #[test]
    fn test_admonition_requires_content() {
        let document = parse(".. warning::\n");
        assert_eq!(document.messages[0].level, Level::Warning);
        assert_eq!(
            document.messages[0].message,
            "Content block expected for the \"warning\" directive; none found."
        );
    }

    #[test]
    fn test_docutils_code_directive_is_not_a_checkable_block() {
        let document = parse(".. code:: json\n\n   {\"a\": 1}\n");
        assert!(document.messages.is_empty());
        assert!(document.code_blocks().is_empty());
        match &document.children[0] {
            Node::LiteralBlock(block) => {
                assert_eq!(block.language, "json");
                assert_eq!(block.classes, vec!["code".to_string()]);
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_role_directive_defines_local_role() {
        let document = parse(".. role:: custom\n\nUse :custom:`this`.\n");
        assert!(document.messages.is_empty(), "{:?}", document.messages);
    }

    #[test]
    fn test_role_directive_with_unknown_base() {
        let document = parse(".. role:: custom(nonexistent)\n");
        assert_eq!(
            document.messages[0].message,
            "Unknown interpreted text role \"nonexistent\"."
        );
    }

    #[test]
    fn test_default_role_directive() {
        let document = parse(".. default-role:: literal\n\nSome `text`.\n");
        assert!(document.messages.is_empty());
        match &document.children[0] {
            Node::Paragraph { children, .. } => {
                assert_eq!(children[1], Node::Literal("text".to_string()))
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_pep_number_validated() {
        let document = parse("See :pep:`eight`.\n");
        assert_eq!(
            document.messages[0].message,
            "PEP number must be a number from 0 to 9999; \"eight\" is invalid."
        );
        assert!(parse("See :pep:`8`.\n").messages.is_empty());
    }

    #[test]
    fn test_include_missing_file_is_severe() {
        let document = parse(".. include:: does-not-exist.rst\n");
        assert_eq!(document.messages[0].level, Level::Severe);
    }

    #[test]
    fn test_replace_substitution() {
        let document = parse(".. |project| replace:: *rstcheck*\n\nThis is |project|.\n");
        assert!(document.messages.is_empty());
    }
}
