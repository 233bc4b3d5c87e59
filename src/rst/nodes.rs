//! Document tree and system messages produced by the parser.

use std::fmt;

/// Severity of a [`SystemMessage`], ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info = 1,
    Warning = 2,
    Error = 3,
    Severe = 4,
}

impl Level {
    pub fn name(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Severe => "SEVERE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name(), *self as u8)
    }
}

/// A problem found while parsing. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMessage {
    pub level: Level,
    pub line: usize,
    pub message: String,
}

impl SystemMessage {
    pub fn new(level: Level, line: usize, message: impl Into<String>) -> Self {
        Self {
            level,
            line,
            message: message.into(),
        }
    }
}

/// Verbatim text block, either from `::` or from a code-like directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralBlock {
    /// Line of the first content line
    pub line: usize,
    pub text: String,
    /// Empty when no language was given
    pub language: String,
    pub classes: Vec<String>,
}

/// Class attached to literal blocks whose content is handed to the embedded code checks.
pub const CODE_BLOCK_CLASS: &str = "code-block";

impl LiteralBlock {
    pub fn is_code_block(&self) -> bool {
        self.classes.iter().any(|class| class == CODE_BLOCK_CLASS)
    }
}

/// Checkable code extracted from a tagged [`LiteralBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Title {
        line: usize,
        children: Vec<Node>,
    },
    Transition {
        line: usize,
    },
    Paragraph {
        line: usize,
        children: Vec<Node>,
    },
    List {
        line: usize,
        items: Vec<Vec<Node>>,
    },
    Definition {
        line: usize,
        term: Vec<Node>,
        children: Vec<Node>,
    },
    BlockQuote {
        line: usize,
        children: Vec<Node>,
    },
    LiteralBlock(LiteralBlock),
    /// Output of a built-in directive that wraps body elements
    Container {
        name: String,
        line: usize,
        children: Vec<Node>,
    },
    SubstitutionDefinition {
        name: String,
        line: usize,
        children: Vec<Node>,
    },
    Target {
        name: String,
        refuri: Option<String>,
        line: usize,
    },
    Footnote {
        label: String,
        line: usize,
        children: Vec<Node>,
    },
    Comment {
        line: usize,
    },
    Text(String),
    Literal(String),
    Inline {
        role: String,
        text: String,
    },
    Reference {
        name: String,
        line: usize,
    },
    SubstitutionReference {
        name: String,
        line: usize,
    },
}

impl Node {
    /// Child nodes, flattening list items.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Title { children, .. }
            | Node::Paragraph { children, .. }
            | Node::BlockQuote { children, .. }
            | Node::Container { children, .. }
            | Node::SubstitutionDefinition { children, .. }
            | Node::Footnote { children, .. } => children.iter().collect(),
            Node::Definition { term, children, .. } => term.iter().chain(children).collect(),
            Node::List { items, .. } => items.iter().flatten().collect(),
            _ => vec![],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Vec<&mut Vec<Node>> {
        match self {
            Node::Title { children, .. }
            | Node::Paragraph { children, .. }
            | Node::BlockQuote { children, .. }
            | Node::Container { children, .. }
            | Node::SubstitutionDefinition { children, .. }
            | Node::Footnote { children, .. } => vec![children],
            Node::Definition { term, children, .. } => vec![term, children],
            Node::List { items, .. } => items.iter_mut().collect(),
            _ => vec![],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn astext(&self) -> String {
        match self {
            Node::Text(text) | Node::Literal(text) => text.clone(),
            Node::Inline { text, .. } => text.clone(),
            Node::Reference { name, .. } => name.clone(),
            Node::LiteralBlock(block) => block.text.clone(),
            _ => self.children().iter().map(|child| child.astext()).collect(),
        }
    }
}

/// A parsed document: the node tree plus every message raised on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
    pub messages: Vec<SystemMessage>,
}

impl Document {
    /// Depth-first walk over every node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        fn walk_nodes<'a>(nodes: &[&'a Node], visit: &mut impl FnMut(&'a Node)) {
            for &node in nodes {
                visit(node);
                walk_nodes(&node.children(), visit);
            }
        }
        walk_nodes(&self.children.iter().collect::<Vec<_>>(), visit);
    }

    /// Every literal block tagged as checkable code, in document order.
    pub fn code_blocks(&self) -> Vec<CodeBlock> {
        let mut blocks = vec![];
        self.walk(&mut |node| {
            if let Node::LiteralBlock(literal) = node {
                if literal.is_code_block() {
                    blocks.push(CodeBlock {
                        language: literal.language.clone(),
                        text: literal.text.clone(),
                        line: literal.line,
                    });
                }
            }
        });
        blocks
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level >= Level::Error)
    }
}
