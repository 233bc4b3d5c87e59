//! Inline markup: literals, interpreted text, substitution and hyperlink references.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::nodes::{Level, Node};
use super::parser::{State, SIMPLENAME};
use super::registry::RoleCall;

const DEFAULT_ROLE: &str = "title-reference";

static INLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        concat!(
            r"(?s)(?<literal>``.+?``)",
            r"|:(?<prole>{name}):`(?<ptext>(?:[^`\\]|\\.)+)`",
            r"|`(?<itext>(?:[^`\\]|\\.)+)`(?::(?<srole>{name}):|(?<refmark>__?))?",
            r"|\|(?<sub>[^\s|](?:[^|\n]*[^\s|])?)\|(?<subref>__?)?",
            r"|\b(?<word>{name})(?<wordref>__?)\b",
        ),
        name = SIMPLENAME
    ))
    .unwrap()
});

/// Parse `text`, whose first line is `line`, into inline nodes.
pub(crate) fn parse(text: &str, line: usize, state: &mut State<'_>) -> Vec<Node> {
    let mut nodes = vec![];
    let mut last = 0;

    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            nodes.push(Node::Text(text[last..whole.start()].to_string()));
        }
        let at = line + text[..whole.start()].matches('\n').count();
        nodes.extend(construct(&caps, whole.as_str(), at, state));
        last = whole.end();
    }

    if last < text.len() {
        nodes.push(Node::Text(text[last..].to_string()));
    }
    nodes
}

fn construct(caps: &Captures<'_>, rawtext: &str, line: usize, state: &mut State<'_>) -> Vec<Node> {
    if let Some(literal) = caps.name("literal") {
        let inner = literal.as_str();
        return vec![Node::Literal(inner[2..inner.len() - 2].to_string())];
    }

    if let (Some(role), Some(text)) = (caps.name("prole"), caps.name("ptext")) {
        return interpret(Some(role.as_str()), text.as_str(), rawtext, line, state);
    }

    if let Some(text) = caps.name("itext") {
        if let Some(role) = caps.name("srole") {
            return interpret(Some(role.as_str()), text.as_str(), rawtext, line, state);
        }
        if let Some(mark) = caps.name("refmark") {
            return vec![reference(text.as_str(), mark.as_str() == "_", line, state)];
        }
        return interpret(None, text.as_str(), rawtext, line, state);
    }

    if let Some(name) = caps.name("sub") {
        if caps.name("subref").is_some_and(|mark| mark.as_str() == "_") {
            state.add_reference(name.as_str(), line);
        }
        return vec![Node::SubstitutionReference {
            name: name.as_str().to_string(),
            line,
        }];
    }

    if let Some(word) = caps.name("word") {
        let named = caps.name("wordref").is_some_and(|mark| mark.as_str() == "_");
        return vec![reference(word.as_str(), named, line, state)];
    }

    vec![Node::Text(rawtext.to_string())]
}

/// Dispatch interpreted text to its role, or to the default role when no
/// role is given.
fn interpret(role: Option<&str>, text: &str, rawtext: &str, line: usize, state: &mut State<'_>) -> Vec<Node> {
    let name = role
        .or(state.default_role())
        .unwrap_or(DEFAULT_ROLE)
        .to_string();

    match state.lookup_role(&name) {
        Some(handler) => {
            let (nodes, messages) = handler.run(&RoleCall {
                name: &name,
                rawtext,
                text,
                line,
            });
            state.extend_messages(messages);
            nodes
        }
        None => {
            state.report(
                Level::Error,
                line,
                format!("Unknown interpreted text role \"{name}\"."),
            );
            vec![Node::Text(rawtext.to_string())]
        }
    }
}

/// A hyperlink reference. Named references (single trailing `_`) must
/// resolve to a target; anonymous ones and embedded URIs are not checked.
fn reference(text: &str, named: bool, line: usize, state: &mut State<'_>) -> Node {
    let text = text.trim();
    if let Some(open) = text.rfind('<').filter(|_| text.ends_with('>')) {
        return Node::Reference {
            name: text[..open].trim().to_string(),
            line,
        };
    }
    if named {
        state.add_reference(text, line);
    }
    Node::Reference {
        name: text.to_string(),
        line,
    }
}

#[cfg(test)]
mod tests {
    use crate::rst::{Node, Parser, Registry};

    fn paragraph(source: &str) -> (Vec<Node>, Vec<String>) {
        let registry = Registry::pristine();
        let document = Parser::new(&registry).parse(source);
        let messages = document.messages.iter().map(|m| m.message.clone()).collect();
        match document.children.into_iter().next() {
            Some(Node::Paragraph { children, .. }) => (children, messages),
            other => panic!("expected a paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_hides_markup() {
        let (children, messages) = paragraph("Use ``:bogus:`x` and |sub|`` here.");
        assert!(messages.is_empty());
        assert_eq!(children[1], Node::Literal(":bogus:`x` and |sub|".to_string()));
    }

    #[test]
    fn test_suffix_role() {
        let (children, messages) = paragraph("Some `text`:strong: here.");
        assert!(messages.is_empty());
        assert_eq!(
            children[1],
            Node::Inline {
                role: "strong".to_string(),
                text: "text".to_string()
            }
        );
    }

    #[test]
    fn test_default_role_is_title_reference() {
        let (children, messages) = paragraph("Read `Dune` tonight.");
        assert!(messages.is_empty());
        assert_eq!(
            children[1],
            Node::Inline {
                role: "title-reference".to_string(),
                text: "Dune".to_string()
            }
        );
    }

    #[test]
    fn test_embedded_uri_is_not_checked() {
        let (_, messages) = paragraph("Visit `Python <https://python.org>`_ now.");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_anonymous_reference_is_not_checked() {
        let (_, messages) = paragraph("Visit `this page`__ now.");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_snake_case_is_plain_text() {
        let (children, messages) = paragraph("call snake_case and __init__ today");
        assert!(messages.is_empty());
        assert_eq!(children, vec![Node::Text("call snake_case and __init__ today".to_string())]);
    }

    #[test]
    fn test_pipe_with_spaces_is_not_substitution() {
        let (_, messages) = paragraph("a | b | c");
        assert!(messages.is_empty());
    }
}
