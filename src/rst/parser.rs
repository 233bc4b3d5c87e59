//! Block-level parser.
//!
//! Handles the subset of reStructuredText a checker needs to see through:
//! sections, paragraphs, lists, block quotes, literal blocks and explicit
//! markup. Inline markup is delegated to [`super::inline`].

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::inline;
use super::nodes::{Document, Level, LiteralBlock, Node, SystemMessage};
use super::registry::{substitution_role_key, Directive, DirectiveCall, Registry, Role, RoleCall};

/// Directive and role name syntax.
pub(crate) const SIMPLENAME: &str = r"[^\W_]+(?:[-._+:][^\W_]+)*";

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?<name>{SIMPLENAME})\s?::(?:\s+(?<args>.*))?$")).unwrap()
});

static SUBSTITUTION_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\|(?<name>[^\s|](?:[^|]*[^\s|])?)\|\s+(?<directive>{SIMPLENAME})\s?::(?:\s+(?<args>.*))?$"
    ))
    .unwrap()
});

static TARGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^_(?:`(?<quoted>[^`]+)`|(?<name>(?:[^:\\]|\\.)+)):(?:\s+(?<uri>.*))?$").unwrap()
});

static ANONYMOUS_TARGET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__(?:\s+(?<uri>.*))?$").unwrap());

static FOOTNOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?<label>[^\]]+)\](?:\s+(?<text>.*))?$").unwrap());

static OPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:(?<name>[^:\s][^:]*):(?:\s+(?<value>.*))?$").unwrap());

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?<marker>[-*+\u{2022}])(?: +(?<text>.*))?$").unwrap());

static ENUMERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<marker>(?:\d+|#)[.)]|\((?:\d+|#)\))(?: +(?<text>.*))?$").unwrap()
});

/// Entry point: parses a whole document against a [`Registry`].
///
/// ```
/// use rstcheck::rst::{Parser, Registry};
///
/// let registry = Registry::pristine();
/// let document = Parser::new(&registry).parse(".. toctree::\n");
/// assert_eq!(document.messages[0].message, "Unknown directive type \"toctree\".");
/// ```
pub struct Parser<'r> {
    registry: &'r Registry,
    source_dir: Option<&'r Path>,
    known_targets: HashSet<String>,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            source_dir: None,
            known_targets: HashSet::new(),
        }
    }

    /// Directory that relative `include` paths are resolved against.
    #[must_use]
    pub fn with_source_dir(mut self, source_dir: &'r Path) -> Self {
        self.source_dir = Some(source_dir);
        self
    }

    /// Target names defined outside the document.
    #[must_use]
    pub fn with_known_targets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_targets
            .extend(names.into_iter().map(|name| normalize_name(name.as_ref())));
        self
    }

    pub fn parse(&self, source: &str) -> Document {
        let lines = split_lines(source);
        let mut state = State::new(self.registry, self.source_dir);

        let mut children = state.nested_parse(&lines, 1);
        state.resolve_substitutions(&mut children);
        state.check_references(&self.known_targets);

        let mut messages = state.messages;
        messages.sort_by_key(|message| message.line);

        Document { children, messages }
    }
}

/// Parser state shared by block parsing, inline parsing and directive handlers.
pub struct State<'r> {
    registry: &'r Registry,
    source_dir: Option<&'r Path>,
    local_roles: HashMap<String, Arc<dyn Role>>,
    default_role: Option<String>,
    messages: Vec<SystemMessage>,
    substitution_defs: Vec<String>,
    targets: HashSet<String>,
    references: Vec<(String, usize)>,
}

impl<'r> State<'r> {
    fn new(registry: &'r Registry, source_dir: Option<&'r Path>) -> Self {
        Self {
            registry,
            source_dir,
            local_roles: HashMap::new(),
            default_role: None,
            messages: vec![],
            substitution_defs: vec![],
            targets: HashSet::new(),
            references: vec![],
        }
    }

    pub fn report(&mut self, level: Level, line: usize, message: impl Into<String>) {
        self.messages.push(SystemMessage::new(level, line, message));
    }

    pub(crate) fn extend_messages(&mut self, messages: Vec<SystemMessage>) {
        self.messages.extend(messages);
    }

    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir
    }

    /// Role lookup: roles defined by the document first, then the registry.
    pub fn lookup_role(&self, name: &str) -> Option<Arc<dyn Role>> {
        self.local_roles
            .get(&name.to_lowercase())
            .cloned()
            .or_else(|| self.registry.role(name))
    }

    /// Define a role for the rest of this document only.
    pub fn define_role(&mut self, name: &str, handler: Arc<dyn Role>) {
        self.local_roles.insert(name.to_lowercase(), handler);
    }

    pub fn default_role(&self) -> Option<&str> {
        self.default_role.as_deref()
    }

    pub fn set_default_role(&mut self, name: Option<String>) {
        self.default_role = name;
    }

    pub(crate) fn add_reference(&mut self, name: &str, line: usize) {
        self.references.push((name.to_string(), line));
    }

    pub fn parse_inline(&mut self, text: &str, line: usize) -> Vec<Node> {
        inline::parse(text, line, self)
    }

    /// Parse already dedented `lines`; `first_line` is the line number of `lines[0]`.
    pub fn nested_parse(&mut self, lines: &[String], first_line: usize) -> Vec<Node> {
        let mut nodes = vec![];
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            let lineno = first_line + i;

            if is_blank(line) {
                i += 1;
                continue;
            }

            if indent_of(line) > 0 {
                let end = indented_end(lines, i);
                self.check_unindent(lines, end, first_line, "Block quote");
                let block = dedent(&lines[i..end]);
                let children = self.nested_parse(&block, lineno);
                nodes.push(Node::BlockQuote {
                    line: lineno,
                    children,
                });
                i = end;
                continue;
            }

            if let Some(rest) = explicit_markup(line) {
                let end = indented_end(lines, i + 1);
                // consecutive explicit markup blocks need no blank line between them
                if !lines.get(end).is_some_and(|next| explicit_markup(next).is_some()) {
                    self.check_unindent(lines, end, first_line, "Explicit markup");
                }
                nodes.extend(self.explicit(rest, &lines[i + 1..end], lineno));
                i = end;
                continue;
            }

            if let Some(consumed) = self.section(lines, i, first_line, &mut nodes) {
                i += consumed;
                continue;
            }

            if is_adornment(line, 4) && lines.get(i + 1).map_or(true, |next| is_blank(next)) {
                nodes.push(Node::Transition { line: lineno });
                i += 1;
                continue;
            }

            if list_marker(line).is_some() {
                i = self.list(lines, i, first_line, &mut nodes);
                continue;
            }

            i = self.paragraph(lines, i, first_line, &mut nodes);
        }

        nodes
    }

    fn check_unindent(&mut self, lines: &[String], end: usize, first_line: usize, kind: &str) {
        if end < lines.len() && end > 0 && !is_blank(&lines[end - 1]) {
            self.report(
                Level::Warning,
                first_line + end,
                format!("{kind} ends without a blank line; unexpected unindent."),
            );
        }
    }

    fn section(
        &mut self,
        lines: &[String],
        i: usize,
        first_line: usize,
        nodes: &mut Vec<Node>,
    ) -> Option<usize> {
        let line = &lines[i];
        let lineno = first_line + i;

        // overline, title, underline
        if is_adornment(line, 2) {
            let title = lines.get(i + 1)?;
            let underline = lines.get(i + 2)?;
            if is_blank(title) || !is_adornment(underline, 2) || underline.chars().next() != line.chars().next() {
                return None;
            }
            let text = title.trim();
            if line.chars().count() < text.chars().count() {
                self.report(Level::Warning, lineno, "Title overline too short.");
            }
            self.title(text, lineno + 1, nodes);
            return Some(3);
        }

        let underline = lines.get(i + 1)?;
        if !is_adornment(underline, 2) {
            return None;
        }
        let text = line.trim_end();
        let (text_len, underline_len) = (text.chars().count(), underline.chars().count());
        if underline_len < text_len {
            if underline_len < 4 {
                return None;
            }
            self.report(Level::Warning, lineno + 1, "Title underline too short.");
        }
        self.title(text, lineno, nodes);
        Some(2)
    }

    fn title(&mut self, text: &str, lineno: usize, nodes: &mut Vec<Node>) {
        self.targets.insert(normalize_name(text));
        let children = self.parse_inline(text, lineno);
        nodes.push(Node::Title {
            line: lineno,
            children,
        });
    }

    fn list(&mut self, lines: &[String], start: usize, first_line: usize, nodes: &mut Vec<Node>) -> usize {
        let Some((kind, _)) = list_marker(&lines[start]) else {
            return start + 1;
        };
        let mut items = vec![];
        let mut i = start;

        while let Some((item_kind, width)) = lines.get(i).and_then(|line| list_marker(line)) {
            if item_kind != kind {
                break;
            }
            let end = indented_end(lines, i + 1);
            let (marker, text) = lines[i].split_at(width);
            let mut item_lines = vec![format!("{}{}", " ".repeat(marker.chars().count()), text)];
            item_lines.extend_from_slice(&lines[i + 1..end]);
            let item_lines = dedent(&item_lines);
            items.push(self.nested_parse(&item_lines, first_line + i));
            i = end;
        }

        if i < lines.len() && i > 0 && !is_blank(&lines[i - 1]) {
            let name = match kind {
                ListKind::Bullet => "Bullet list",
                ListKind::Enumerated => "Enumerated list",
            };
            self.check_unindent(lines, i, first_line, name);
        }

        nodes.push(Node::List {
            line: first_line + start,
            items,
        });
        i
    }

    fn paragraph(&mut self, lines: &[String], start: usize, first_line: usize, nodes: &mut Vec<Node>) -> usize {
        let lineno = first_line + start;
        let mut end = start;
        while end < lines.len() && !is_blank(&lines[end]) && indent_of(&lines[end]) == 0 {
            end += 1;
        }
        let text = lines[start..end].join("\n");
        let expects_literal = text.ends_with("::");
        let indented_follows = end < lines.len() && !is_blank(&lines[end]);

        if indented_follows && !expects_literal {
            if end - start == 1 {
                let block_end = indented_end(lines, end);
                self.check_unindent(lines, block_end, first_line, "Definition list");
                let term = self.parse_inline(&text, lineno);
                let body = dedent(&lines[end..block_end]);
                let children = self.nested_parse(&body, first_line + end);
                nodes.push(Node::Definition {
                    line: lineno,
                    term,
                    children,
                });
                return block_end;
            }
            self.report(Level::Error, first_line + end, "Unexpected indentation.");
        }

        let text = if expects_literal {
            let trimmed = text.trim_end();
            if trimmed == "::" {
                String::new()
            } else if trimmed[..trimmed.len() - 2].ends_with(char::is_whitespace) {
                trimmed[..trimmed.len() - 2].trim_end().to_string()
            } else {
                trimmed[..trimmed.len() - 1].to_string()
            }
        } else {
            text
        };

        if !text.is_empty() {
            let children = self.parse_inline(&text, lineno);
            nodes.push(Node::Paragraph {
                line: lineno,
                children,
            });
        }

        if !expects_literal {
            return end;
        }

        let mut next = end;
        while next < lines.len() && is_blank(&lines[next]) {
            next += 1;
        }
        if next < lines.len() && indent_of(&lines[next]) > 0 {
            let block_end = indented_end(lines, next);
            self.check_unindent(lines, block_end, first_line, "Literal block");
            let block = dedent(&lines[next..block_end]);
            nodes.push(Node::LiteralBlock(LiteralBlock {
                line: first_line + next,
                text: block.join("\n"),
                language: String::new(),
                classes: vec![],
            }));
            block_end
        } else {
            self.report(
                Level::Warning,
                first_line + next.min(lines.len().saturating_sub(1)),
                "Literal block expected; none found.",
            );
            next
        }
    }

    fn explicit(&mut self, rest: &str, body: &[String], lineno: usize) -> Vec<Node> {
        if let Some(caps) = SUBSTITUTION_DEF_RE.captures(rest) {
            let name = caps["name"].to_string();
            let args = caps.name("args").map_or("", |m| m.as_str());
            let Some(children) = self.run_directive(&caps["directive"], args, body, lineno) else {
                return vec![];
            };
            self.substitution_defs.push(name.clone());
            return vec![Node::SubstitutionDefinition {
                name,
                line: lineno,
                children,
            }];
        }

        if let Some(caps) = DIRECTIVE_RE.captures(rest) {
            let args = caps.name("args").map_or("", |m| m.as_str());
            return self
                .run_directive(&caps["name"], args, body, lineno)
                .unwrap_or_default();
        }

        if let Some(caps) = ANONYMOUS_TARGET_RE.captures(rest) {
            let refuri = target_uri(caps.name("uri").map(|m| m.as_str()), body);
            return vec![Node::Target {
                name: String::new(),
                refuri,
                line: lineno,
            }];
        }

        if let Some(caps) = TARGET_RE.captures(rest) {
            let name = caps
                .name("quoted")
                .or_else(|| caps.name("name"))
                .map_or("", |m| m.as_str())
                .replace('\\', "");
            let refuri = target_uri(caps.name("uri").map(|m| m.as_str()), body);
            if let Some(indirect) = refuri.as_deref().and_then(indirect_target) {
                self.add_reference(&indirect, lineno);
            }
            if name != "_" {
                self.targets.insert(normalize_name(&name));
            }
            return vec![Node::Target {
                name,
                refuri,
                line: lineno,
            }];
        }

        if let Some(caps) = FOOTNOTE_RE.captures(rest) {
            let label = caps["label"].to_string();
            let mut item_lines = vec![caps.name("text").map_or("", |m| m.as_str()).to_string()];
            item_lines.extend(dedent(body));
            let children = self.nested_parse(&item_lines, lineno);
            self.targets.insert(normalize_name(&label));
            return vec![Node::Footnote {
                label,
                line: lineno,
                children,
            }];
        }

        vec![Node::Comment { line: lineno }]
    }

    /// Split a directive block the way docutils does and run its handler.
    /// `None` means the directive was unknown or invalid; the problem has
    /// already been reported.
    fn run_directive(&mut self, name: &str, args: &str, body: &[String], lineno: usize) -> Option<Vec<Node>> {
        let Some(handler) = self.registry.directive(name) else {
            self.report(Level::Error, lineno, format!("Unknown directive type \"{name}\"."));
            return None;
        };

        let mut block = vec![args.to_string()];
        block.extend(dedent(body));
        let mut offset = lineno;
        // only the empty remainder of the marker line is dropped; a blank
        // line after it still separates arguments from content
        if block.first().is_some_and(|line| is_blank(line)) {
            block.remove(0);
            offset += 1;
        }

        let takes_arguments = handler.required_arguments() + handler.optional_arguments() > 0;
        let (mut arg_block, mut content, mut content_offset) =
            if !block.is_empty() && (takes_arguments || handler.has_options()) {
                let split = block.iter().position(|line| is_blank(line)).unwrap_or(block.len());
                let content_start = (split + 1).min(block.len());
                (
                    block[..split].to_vec(),
                    block[content_start..].to_vec(),
                    offset + content_start,
                )
            } else {
                (vec![], block, offset)
            };
        while content.first().is_some_and(|line| is_blank(line)) {
            content.remove(0);
            content_offset += 1;
        }

        let mut options = vec![];
        if handler.has_options() {
            if let Some(position) = arg_block.iter().position(|line| OPTION_RE.is_match(line)) {
                options = parse_options(&arg_block.split_off(position));
            }
        }

        if !arg_block.is_empty() && !takes_arguments {
            if !content.is_empty() {
                arg_block.push(String::new());
            }
            arg_block.append(&mut content);
            content = arg_block;
            arg_block = vec![];
            content_offset = offset;
        }

        let arguments = if takes_arguments {
            match parse_arguments(handler.as_ref(), &arg_block) {
                Ok(arguments) => arguments,
                Err(problem) => {
                    self.report(
                        Level::Error,
                        lineno,
                        format!("Error in \"{name}\" directive: {problem}"),
                    );
                    return None;
                }
            }
        } else {
            vec![]
        };

        if !content.is_empty() && !handler.has_content() {
            self.report(
                Level::Error,
                lineno,
                format!("Error in \"{name}\" directive: no content permitted."),
            );
            return None;
        }

        let call = DirectiveCall {
            name,
            arguments,
            options,
            content,
            line: lineno,
            content_offset,
        };
        Some(handler.run(&call, self))
    }

    fn is_substitution_defined(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.substitution_defs
            .iter()
            .any(|defined| defined == name || defined.to_lowercase() == lowered)
    }

    /// Replace substitution references the document does not define with the
    /// output of a registered resolver, or report them.
    fn resolve_substitutions(&mut self, nodes: &mut Vec<Node>) {
        let mut i = 0;
        while i < nodes.len() {
            if let Node::SubstitutionReference { name, line } = &nodes[i] {
                let (name, line) = (name.clone(), *line);
                if !self.is_substitution_defined(&name) {
                    match self.registry.role(&substitution_role_key(&name)) {
                        Some(resolver) => {
                            let rawtext = format!("|{name}|");
                            let (replacement, messages) = resolver.run(&RoleCall {
                                name: &name,
                                rawtext: &rawtext,
                                text: &name,
                                line,
                            });
                            self.messages.extend(messages);
                            let count = replacement.len();
                            nodes.splice(i..i + 1, replacement);
                            i += count;
                            continue;
                        }
                        None => self.report(
                            Level::Error,
                            line,
                            format!("Undefined substitution referenced: \"{name}\"."),
                        ),
                    }
                }
            } else {
                for children in nodes[i].children_mut() {
                    self.resolve_substitutions(children);
                }
            }
            i += 1;
        }
    }

    fn check_references(&mut self, known_targets: &HashSet<String>) {
        for (name, line) in std::mem::take(&mut self.references) {
            let key = normalize_name(&name);
            if !self.targets.contains(&key) && !known_targets.contains(&key) {
                self.report(Level::Error, line, format!("Unknown target name: \"{key}\"."));
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Enumerated,
}

/// Kind and marker width (including trailing spaces) of a list item line.
fn list_marker(line: &str) -> Option<(ListKind, usize)> {
    let (kind, caps) = match BULLET_RE.captures(line) {
        Some(caps) => (ListKind::Bullet, caps),
        None => (ListKind::Enumerated, ENUMERATOR_RE.captures(line)?),
    };
    let width = caps
        .name("text")
        .map_or(line.len(), |text| text.start());
    Some((kind, width))
}

fn parse_arguments(handler: &dyn Directive, arg_block: &[String]) -> Result<Vec<String>, String> {
    let text = arg_block.join("\n");
    let arguments: Vec<String> = text.split_whitespace().map(String::from).collect();
    let required = handler.required_arguments();
    let maximum = required + handler.optional_arguments();

    if arguments.len() < required {
        return Err(format!(
            "{required} argument(s) required, {} supplied.",
            arguments.len()
        ));
    }
    if arguments.len() <= maximum {
        return Ok(arguments);
    }
    if !handler.final_argument_whitespace() {
        return Err(format!(
            "maximum {maximum} argument(s) allowed, {} supplied.",
            arguments.len()
        ));
    }

    let mut rest = text.trim();
    let mut split = vec![];
    for _ in 1..maximum {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        split.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }
    split.push(rest.to_string());
    Ok(split)
}

fn parse_options(lines: &[String]) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = vec![];
    for line in lines {
        match OPTION_RE.captures(line) {
            Some(caps) => options.push((
                caps["name"].to_string(),
                caps.name("value").map_or("", |m| m.as_str()).to_string(),
            )),
            None => {
                if let Some((_, value)) = options.last_mut() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(line.trim());
                }
            }
        }
    }
    options
}

fn target_uri(first: Option<&str>, body: &[String]) -> Option<String> {
    let uri: String = first
        .into_iter()
        .chain(body.iter().map(String::as_str))
        .map(str::trim)
        .collect();
    (!uri.is_empty()).then_some(uri)
}

/// `other_` or `` `other name`_ `` as the value of a target.
fn indirect_target(refuri: &str) -> Option<String> {
    if refuri.contains("://") || refuri.ends_with("__") {
        return None;
    }
    let name = refuri.strip_suffix('_')?;
    Some(name.trim_matches('`').to_string())
}

/// Reference names compare case-insensitively with whitespace collapsed.
pub(crate) fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn explicit_markup(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("..")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_adornment(line: &str, min_len: usize) -> bool {
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    ADORNMENT_CHARS.contains(first)
        && line.chars().count() >= min_len
        && chars.all(|c| c == first)
}

/// End (exclusive) of the run of blank or indented lines starting at `start`,
/// not counting trailing blank lines.
fn indented_end(lines: &[String], start: usize) -> usize {
    let mut end = start;
    let mut last_content = start;
    while end < lines.len() && (is_blank(&lines[end]) || indent_of(&lines[end]) > 0) {
        end += 1;
        if !is_blank(&lines[end - 1]) {
            last_content = end;
        }
    }
    if end == lines.len() {
        last_content
    } else {
        end
    }
}

/// Remove the common indentation and surrounding blank lines.
fn dedent(lines: &[String]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);
    let mut dedented: Vec<String> = lines
        .iter()
        .map(|line| {
            if is_blank(line) {
                String::new()
            } else {
                line[indent..].to_string()
            }
        })
        .collect();
    while dedented.last().is_some_and(|line| line.is_empty()) {
        dedented.pop();
    }
    dedented
}

/// Lines with tabs expanded to 8 columns and trailing whitespace removed.
fn split_lines(source: &str) -> Vec<String> {
    source
        .lines()
        .map(|line| {
            let mut expanded = String::with_capacity(line.len());
            for c in line.chars() {
                if c == '\t' {
                    let pad = 8 - expanded.chars().count() % 8;
                    expanded.extend(std::iter::repeat_n(' ', pad));
                } else {
                    expanded.push(c);
                }
            }
            expanded.trim_end().to_string()
        })
        .collect()
}
