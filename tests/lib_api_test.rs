//! Integration tests for the rstcheck library public API.
//!
//! These tests use the library as an external dependency would: building a
//! registry, ignoring names, installing code directives and resolvers, and
//! parsing.

use std::sync::Arc;

use rstcheck::code_block::register_code_directives;
use rstcheck::ignore::ignore_directives_and_roles;
use rstcheck::rst::{CodeBlock, Directive, DirectiveCall, Node, Parser, Registry, State};
use rstcheck::sphinx::{extract, filter_whitelisted_directives_and_roles, register_substitutions};

fn message_texts(source: &str, registry: &Registry) -> Vec<String> {
    Parser::new(registry)
        .parse(source)
        .messages
        .into_iter()
        .map(|m| m.message)
        .collect()
}

// ============================================================================
// Ignoring names
// ============================================================================

#[test]
fn test_ignored_names_produce_no_errors() {
    let source = ".. automodule:: pkg.mod\n   :members:\n\nCall :py:func:`pkg.mod.f`.\n";
    let mut registry = Registry::pristine();
    assert_eq!(message_texts(source, &registry).len(), 2);

    ignore_directives_and_roles(&mut registry, ["automodule"], ["py:func"]);

    assert!(message_texts(source, &registry).is_empty());
}

#[test]
fn test_registering_twice_is_not_an_error() {
    let mut registry = Registry::pristine();
    ignore_directives_and_roles(&mut registry, ["x", "x"], ["y"]);
    ignore_directives_and_roles(&mut registry, ["x"], ["y", "y"]);

    assert!(message_texts(".. x::\n\n:y:`z`\n", &registry).is_empty());
}

#[test]
fn test_reset_restores_unknown_markup_errors() {
    let source = ".. automodule:: pkg\n";
    let mut registry = Registry::pristine();
    ignore_directives_and_roles(&mut registry, ["automodule"], Vec::<&str>::new());
    assert!(message_texts(source, &registry).is_empty());

    registry.reset();

    assert_eq!(
        message_texts(source, &registry),
        vec!["Unknown directive type \"automodule\"."]
    );
}

#[test]
fn test_whitelisted_names_are_never_ignored() {
    let (directives, roles) = filter_whitelisted_directives_and_roles(
        vec!["toctree".into(), "code".into(), "include".into()],
        vec!["doc".into()],
    );
    let mut registry = Registry::pristine();
    ignore_directives_and_roles(&mut registry, &directives, &roles);
    register_code_directives(&mut registry, &[]);

    let document = Parser::new(&registry).parse(".. code:: json\n\n   [1]\n\n.. include:: missing.rst\n");

    assert_eq!(document.code_blocks().len(), 1);
    assert_eq!(document.messages.len(), 1);
    assert!(document.messages[0].message.contains("include"));
}

// ============================================================================
// Code blocks
// ============================================================================

#[test]
fn test_code_block_round_trip() {
    let mut registry = Registry::pristine();
    register_code_directives(&mut registry, &[]);

    let document = Parser::new(&registry).parse(".. code-block:: python\n\n   a\n   b\n");

    assert_eq!(
        document.code_blocks(),
        vec![CodeBlock {
            language: "python".to_string(),
            text: "a\nb".to_string(),
            line: 3,
        }]
    );
}

// ============================================================================
// Substitutions
// ============================================================================

#[test]
fn test_substitution_resolution() {
    let (substitutions, _) = extract(".. |a| replace:: X\n.. |b| replace:: Y", [("b", "Z")]);
    let mut registry = Registry::pristine();
    register_substitutions(&mut registry, &substitutions);

    let document = Parser::new(&registry).parse("|a| and |b| but not |c|\n");

    let texts: Vec<_> = document
        .messages
        .iter()
        .map(|m| m.message.as_str())
        .collect();
    assert_eq!(texts, vec!["Undefined substitution referenced: \"c\"."]);
    match &document.children[0] {
        Node::Paragraph { children, .. } => {
            assert_eq!(children[0], Node::Text("X".to_string()));
            assert_eq!(children[2], Node::Text("Z".to_string()));
        }
        other => panic!("unexpected node {other:?}"),
    }
}

#[test]
fn test_document_definition_beats_resolver() {
    let (substitutions, _) = extract(".. |name| replace:: from prolog", Vec::<(String, String)>::new());
    let mut registry = Registry::pristine();
    register_substitutions(&mut registry, &substitutions);

    let document = Parser::new(&registry).parse(".. |name| replace:: local\n\n|name|\n");

    assert!(document.messages.is_empty());
}

// ============================================================================
// Custom handlers
// ============================================================================

struct Counting;

impl Directive for Counting {
    fn required_arguments(&self) -> usize {
        1
    }

    fn run(&self, call: &DirectiveCall<'_>, state: &mut State<'_>) -> Vec<Node> {
        state.parse_inline(call.argument(0).unwrap_or_default(), call.line)
    }
}

#[test]
fn test_custom_directive_sees_registry() {
    let mut registry = Registry::pristine();
    registry.register_directive("counting", Arc::new(Counting));

    let texts = message_texts(".. counting:: :nope:`x`\n\n.. counting::\n", &registry);

    assert_eq!(
        texts,
        vec![
            "Unknown interpreted text role \"nope\".",
            "Error in \"counting\" directive: 1 argument(s) required, 0 supplied."
        ]
    );
}
