//! Reading values out of a Sphinx `conf.py`.
//!
//! Only top-level assignments of Python literals are understood: strings
//! (including implicit concatenation and triple quotes), numbers, booleans,
//! `None`, lists, tuples and dicts. Anything computed at import time is
//! skipped with a debug log.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::confdir::CONF_FILE;

static ASSIGNMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?<name>[A-Za-z_]\w*)[ \t]*(?<op>\+?=)[ \t]*").unwrap());

/// The configuration values the checker cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SphinxConfig {
    pub rst_prolog: Option<String>,
    pub rst_epilog: Option<String>,
    pub html_context: Map<String, Value>,
    pub extensions: Vec<String>,
    /// Keys of the `extlinks` dict; each one becomes a role
    pub extlinks: Vec<String>,
}

impl SphinxConfig {
    /// Load `conf.py` from `confdir`. A missing or unreadable file yields the
    /// default configuration.
    pub fn load(confdir: &Path) -> SphinxConfig {
        let path = confdir.join(CONF_FILE);
        match fs::read_to_string(&path) {
            Ok(source) => {
                // Python reads source with universal newlines
                let source = source.replace("\r\n", "\n").replace('\r', "\n");
                SphinxConfig::from_source(&source)
            }
            Err(e) => {
                debug!("Could not read {}: {}", path.display(), e);
                SphinxConfig::default()
            }
        }
    }

    pub fn from_source(source: &str) -> SphinxConfig {
        let mut values = read_assignments(source);

        let mut take_string = |key: &str| match values.remove(key) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                debug!("Ignoring non-string {}: {}", key, other);
                None
            }
            None => None,
        };
        let rst_prolog = take_string("rst_prolog");
        let rst_epilog = take_string("rst_epilog");

        let html_context = match values.remove("html_context") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let extensions = match values.remove("extensions") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        let extlinks = match values.remove("extlinks") {
            Some(Value::Object(map)) => map.into_iter().map(|(key, _)| key).collect(),
            _ => Vec::new(),
        };

        SphinxConfig {
            rst_prolog,
            rst_epilog,
            html_context,
            extensions,
            extlinks,
        }
    }

    /// Prolog and epilog joined, the text substitutions are harvested from.
    pub fn prolog_text(&self) -> String {
        [self.rst_prolog.as_deref(), self.rst_epilog.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Entries of `html_context["substitutions"]`, with non-string values
    /// rendered the way Python prints them.
    pub fn context_substitutions(&self) -> Vec<(String, String)> {
        let Some(Value::Object(substitutions)) = self.html_context.get("substitutions") else {
            return Vec::new();
        };
        substitutions
            .iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Bool(true) => "True".to_string(),
                    Value::Bool(false) => "False".to_string(),
                    Value::Null => "None".to_string(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect()
    }
}

/// Evaluate every top-level `NAME = literal` (and `NAME += literal`) in
/// `source`. Later assignments win.
pub fn read_assignments(source: &str) -> Map<String, Value> {
    let mut values = Map::new();
    let mut consumed = 0;

    for caps in ASSIGNMENT_RE.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        // inside a string or container that was already read
        if whole.start() < consumed {
            continue;
        }
        let value_start = whole.end();
        // `x == y` is a comparison
        if source[value_start..].starts_with('=') {
            continue;
        }
        let name = caps["name"].to_string();

        let mut reader = LiteralReader::new(source, value_start);
        match reader.expression() {
            Ok(value) => {
                consumed = reader.pos;
                if &caps["op"] == "+=" {
                    let merged = match (values.remove(&name), value) {
                        (Some(Value::Array(mut old)), Value::Array(new)) => {
                            old.extend(new);
                            Value::Array(old)
                        }
                        (Some(Value::String(old)), Value::String(new)) => Value::String(old + &new),
                        (_, value) => value,
                    };
                    values.insert(name, merged);
                } else {
                    values.insert(name, value);
                }
            }
            Err(e) => debug!("Skipping conf.py assignment to {}: {}", name, e),
        }
    }
    values
}

#[derive(Debug, thiserror::Error)]
#[error("{reason} at byte {offset}")]
struct NotALiteral {
    reason: &'static str,
    offset: usize,
}

struct LiteralReader<'a> {
    src: &'a str,
    pos: usize,
    /// Bracket nesting; newlines are insignificant when non-zero
    depth: usize,
}

impl<'a> LiteralReader<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos, depth: 0 }
    }

    fn fail<T>(&self, reason: &'static str) -> Result<T, NotALiteral> {
        Err(NotALiteral {
            reason,
            offset: self.pos,
        })
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_space(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\x0c' => {
                    self.pos += 1;
                }
                '\n' if self.depth > 0 => {
                    self.pos += 1;
                }
                '#' if self.depth > 0 => {
                    self.skip_comment();
                }
                '\\' if self.src[self.pos + 1..].starts_with('\n') => {
                    self.pos += 2;
                }
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        match self.src[self.pos..].find('\n') {
            Some(offset) => self.pos += offset,
            None => self.pos = self.src.len(),
        }
    }

    /// A full right-hand side, which must be followed by the end of the
    /// statement.
    fn expression(&mut self) -> Result<Value, NotALiteral> {
        let value = self.value()?;
        self.skip_space();
        match self.peek() {
            None | Some('\n') | Some(';') => Ok(value),
            Some('#') => {
                self.skip_comment();
                Ok(value)
            }
            Some(_) => self.fail("unsupported expression"),
        }
    }

    /// Atoms joined by `+` or, for strings, by juxtaposition.
    fn value(&mut self) -> Result<Value, NotALiteral> {
        let mut value = self.atom()?;
        loop {
            self.skip_space();
            let explicit = self.eat('+');
            if explicit {
                self.skip_space();
            } else if !(value.is_string() && self.at_string()) {
                return Ok(value);
            }
            let next = self.atom()?;
            value = match (value, next) {
                (Value::String(a), Value::String(b)) => Value::String(a + &b),
                (Value::Array(mut a), Value::Array(b)) if explicit => {
                    a.extend(b);
                    Value::Array(a)
                }
                _ => return self.fail("unsupported operands"),
            };
        }
    }

    fn at_string(&self) -> bool {
        let rest = &self.src[self.pos..];
        let prefix_len = rest
            .chars()
            .take_while(|c| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B'))
            .count();
        prefix_len <= 2 && matches!(rest[prefix_len..].chars().next(), Some('\'' | '"'))
    }

    fn atom(&mut self) -> Result<Value, NotALiteral> {
        if self.at_string() {
            return self.string().map(Value::String);
        }
        match self.peek() {
            Some('[') => {
                self.bump();
                self.sequence(']').map(Value::Array)
            }
            Some('(') => {
                self.bump();
                self.parenthesized()
            }
            Some('{') => {
                self.bump();
                self.dict().map(Value::Object)
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '.' => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                    self.bump();
                }
                match &self.src[start..self.pos] {
                    "True" => Ok(Value::Bool(true)),
                    "False" => Ok(Value::Bool(false)),
                    "None" => Ok(Value::Null),
                    _ => self.fail("name or call"),
                }
            }
            _ => self.fail("unexpected token"),
        }
    }

    fn string(&mut self) -> Result<String, NotALiteral> {
        let mut raw = false;
        while let Some(c) = self.peek() {
            match c {
                'r' | 'R' => raw = true,
                'u' | 'U' | 'b' | 'B' => {}
                _ => break,
            }
            self.bump();
        }
        let Some(quote) = self.bump() else {
            return self.fail("unterminated string");
        };
        let triple = self.src[self.pos..].starts_with(&format!("{quote}{quote}"));
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return self.fail("unterminated string");
            };
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.src[self.pos..].starts_with(&format!("{quote}{quote}")) {
                    self.pos += 2;
                    return Ok(out);
                }
                out.push(c);
                continue;
            }
            match c {
                '\n' if !triple => return self.fail("newline in string"),
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return self.fail("unterminated string");
                    };
                    if raw {
                        out.push('\\');
                        out.push(escaped);
                    } else {
                        self.escape(escaped, &mut out)?;
                    }
                }
                _ => out.push(c),
            }
        }
    }

    fn escape(&mut self, escaped: char, out: &mut String) -> Result<(), NotALiteral> {
        match escaped {
            '\n' => {}
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' | '\'' | '"' => out.push(escaped),
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits = self.src.get(self.pos..self.pos + width).unwrap_or_default();
                let decoded = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32);
                match decoded {
                    Some(c) if digits.len() == width => {
                        out.push(c);
                        self.pos += width;
                    }
                    _ => return self.fail("bad escape"),
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn number(&mut self) -> Result<Value, NotALiteral> {
        let start = self.pos;
        self.eat('-');
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '_' | 'e' | 'E'))
        {
            self.bump();
            if matches!(self.src[..self.pos].chars().last(), Some('e' | 'E')) {
                let _ = self.eat('-') || self.eat('+');
            }
        }
        let text: String = self.src[start..self.pos].chars().filter(|&c| c != '_').collect();
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        match text.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => self.fail("bad number"),
        }
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn sequence(&mut self, close: char) -> Result<Vec<Value>, NotALiteral> {
        self.depth += 1;
        let mut items = Vec::new();
        loop {
            self.skip_space();
            if self.eat(close) {
                break;
            }
            items.push(self.value()?);
            self.skip_space();
            if self.eat(close) {
                break;
            }
            if !self.eat(',') {
                return self.fail("expected ','");
            }
        }
        self.depth -= 1;
        Ok(items)
    }

    /// A tuple, or a single value wrapped in parentheses.
    fn parenthesized(&mut self) -> Result<Value, NotALiteral> {
        self.depth += 1;
        self.skip_space();
        if self.eat(')') {
            self.depth -= 1;
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        self.skip_space();
        if self.eat(')') {
            self.depth -= 1;
            return Ok(first);
        }
        if !self.eat(',') {
            return self.fail("expected ','");
        }
        self.depth -= 1;
        let mut items = vec![first];
        items.extend(self.sequence(')')?);
        Ok(Value::Array(items))
    }

    fn dict(&mut self) -> Result<Map<String, Value>, NotALiteral> {
        self.depth += 1;
        let mut map = Map::new();
        loop {
            self.skip_space();
            if self.eat('}') {
                break;
            }
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return self.fail("unsupported dict key"),
            };
            self.skip_space();
            if !self.eat(':') {
                return self.fail("expected ':'");
            }
            self.skip_space();
            let value = self.value()?;
            map.insert(key, value);
            self.skip_space();
            if self.eat('}') {
                break;
            }
            if !self.eat(',') {
                return self.fail("expected ','");
            }
        }
        self.depth -= 1;
        Ok(map)
    }
}
