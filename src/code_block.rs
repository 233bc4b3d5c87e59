//! Directive turning `code`, `code-block` and `sourcecode` bodies into
//! checkable code blocks.

use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::rst::{Directive, DirectiveCall, LiteralBlock, Node, Registry, State, CODE_BLOCK_CLASS};

/// Directives whose body is embedded source code.
pub const CODE_DIRECTIVES: [&str; 3] = ["code", "code-block", "sourcecode"];

/// Produces one literal block tagged [`CODE_BLOCK_CLASS`] whose text is the
/// body lines joined by newlines, untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeBlockDirective;

impl Directive for CodeBlockDirective {
    fn optional_arguments(&self) -> usize {
        1
    }

    // :linenos:, :caption: and friends
    fn has_options(&self) -> bool {
        true
    }

    fn has_content(&self) -> bool {
        true
    }

    fn run(&self, call: &DirectiveCall<'_>, _state: &mut State<'_>) -> Vec<Node> {
        let language = call.argument(0).unwrap_or_default().to_string();
        let text = call.content.iter().join("\n");

        vec![Node::LiteralBlock(LiteralBlock {
            line: call.content_offset,
            text,
            language,
            classes: vec![CODE_BLOCK_CLASS.to_string()],
        })]
    }
}

/// Install [`CodeBlockDirective`] for every code directive not listed in
/// `ignored`.
pub fn register_code_directives(registry: &mut Registry, ignored: &[String]) {
    let handler: Arc<dyn Directive> = Arc::new(CodeBlockDirective);
    for name in CODE_DIRECTIVES {
        if ignored.iter().any(|ignored| ignored.eq_ignore_ascii_case(name)) {
            debug!("Not registering code directive '{}'; it is ignored", name);
            continue;
        }
        debug!("Register custom directive for '{}'.", name);
        registry.register_directive(name, handler.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rst::{CodeBlock, Parser};

    fn code_blocks(source: &str) -> (Vec<CodeBlock>, usize) {
        let mut registry = Registry::pristine();
        register_code_directives(&mut registry, &[]);
        let document = Parser::new(&registry).parse(source);
        (document.code_blocks(), document.messages.len())
    }

    #[test]
    fn test_no_language_defaults_to_empty() {
        let (blocks, messages) = code_blocks(".. code-block::\n\n   a\n   b\n");

        assert_eq!(messages, 0);
        assert_eq!(
            blocks,
            vec![CodeBlock {
                language: String::new(),
                text: "a\nb".to_string(),
                line: 3
            }]
        );
    }

    #[test]
    fn test_text_is_exact_body() {
        let source = ".. sourcecode:: python\n\n   def f():\n\n       return  1   \n   # end\n";
        let (blocks, _) = code_blocks(source);

        assert_eq!(blocks[0].language, "python");
        // trailing whitespace is dropped by the line splitter, nothing else
        assert_eq!(blocks[0].text, "def f():\n\n    return  1\n# end");
    }

    #[test]
    fn test_options_are_not_content() {
        let (blocks, messages) =
            code_blocks(".. code:: json\n   :linenos:\n   :caption: Example\n\n   {\"a\": 1}\n");

        assert_eq!(messages, 0);
        assert_eq!(blocks[0].text, "{\"a\": 1}");
        assert_eq!(blocks[0].line, 5);
    }

    #[test]
    fn test_ignored_code_directive_is_left_alone() {
        let mut registry = Registry::pristine();
        register_code_directives(&mut registry, &["code-block".to_string()]);

        assert!(!registry.has_directive("code-block"));
        assert!(registry.has_directive("sourcecode"));
    }
}
