//! Parser for JSON documents with `//` and `/* */` comments.
//!
//! Comments are allowed anywhere whitespace is. A run of comments directly
//! in front of an object key (or array element) becomes that member's
//! description. A comment starting on the line where the previous member's
//! value ended belongs to that member and is dropped rather than carried
//! forward to the next key.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{ParseError, ParseErrorKind};
use crate::value::{Node, Value};

/// Parser configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Attach preceding comments to members as descriptions.
    pub collect_comments: bool,
    /// Maximum nesting of objects and arrays.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            collect_comments: true,
            max_depth: 512,
        }
    }
}

/// Parse a document with default options.
///
/// # Example
///
/// ```rust
/// use strata_core_store::{parse, path, Value};
///
/// let root = parse(r#"{
///     // Sphere defaults
///     "Sphere": { "Radius": 0.5 }
/// }"#).unwrap();
///
/// let sphere = root.get(&path!(".Sphere")).unwrap();
/// assert_eq!(sphere.description.as_deref(), Some("// Sphere defaults"));
/// assert_eq!(root.get(&path!(".Sphere.Radius")).unwrap().value, Value::Float(0.5));
/// ```
pub fn parse(text: &str) -> Result<Node, ParseError> {
    Parser::default().parse(text)
}

/// A reusable, configured parser.
#[derive(Clone, Debug, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse `text` into an object node.
    ///
    /// The root never carries a description.
    pub fn parse(&self, text: &str) -> Result<Node, ParseError> {
        let mut state = State::new(text, &self.options);
        state.skip_trivia()?;
        state.pending.clear();

        match state.peek() {
            Some('{') => {}
            Some(_) => return Err(state.error(ParseErrorKind::RootNotObject)),
            None => return Err(state.error(ParseErrorKind::UnexpectedEof)),
        }
        let root = state.parse_object(1)?;

        state.trailing_line = None;
        state.skip_trivia()?;
        if state.peek().is_some() {
            return Err(state.error(ParseErrorKind::TrailingContent));
        }

        Ok(Node::new(root))
    }
}

struct State<'o> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    options: &'o ParserOptions,
    /// Comments seen since the last significant token.
    pending: Vec<String>,
    /// Line on which the previous member's value ended.
    trailing_line: Option<usize>,
}

impl<'o> State<'o> {
    fn new(text: &str, options: &'o ParserOptions) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            options,
            pending: Vec::new(),
            trailing_line: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            kind,
        }
    }

    fn error_at(&self, (line, column): (usize, usize), kind: ParseErrorKind) -> ParseError {
        ParseError { line, column, kind }
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(c) => self.error(ParseErrorKind::UnexpectedChar(c)),
            None => self.error(ParseErrorKind::UnexpectedEof),
        }
    }

    /// Skip whitespace and comments, queueing comments as pending
    /// descriptions.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    let line = self.line;
                    let comment = self.line_comment();
                    self.queue_comment(line, comment);
                }
                (Some('/'), Some('*')) => {
                    let line = self.line;
                    let comment = self.block_comment()?;
                    self.queue_comment(line, comment);
                }
                (Some('/'), _) => return Err(self.error(ParseErrorKind::UnexpectedChar('/'))),
                _ => return Ok(()),
            }
        }
    }

    fn line_comment(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        text.trim_end().to_string()
    }

    fn block_comment(&mut self) -> Result<String, ParseError> {
        let start = (self.line, self.column);
        let mut text = String::new();
        // Opening delimiter
        for _ in 0..2 {
            if let Some(c) = self.advance() {
                text.push(c);
            }
        }
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    text.push_str("*/");
                    return Ok(text);
                }
                Some(c) => text.push(c),
                None => return Err(self.error_at(start, ParseErrorKind::UnterminatedComment)),
            }
        }
    }

    fn queue_comment(&mut self, line: usize, comment: String) {
        if self.trailing_line == Some(line) {
            log::trace!("dropping trailing comment on line {}: {}", line, comment);
            return;
        }
        if self.options.collect_comments {
            self.pending.push(comment);
        }
    }

    fn take_description(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let description = self.pending.join("\n");
        self.pending.clear();
        Some(description)
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.skip_trivia()?;
        // Comments between a key and its value describe nothing
        self.pending.clear();

        match self.peek() {
            Some('{') => self.parse_object(depth),
            Some('[') => self.parse_array(depth),
            Some('"') => Ok(Value::String(self.parse_string()?)),
            Some('-') | Some('0'..='9') => self.parse_number(),
            Some('t') | Some('f') | Some('n') => self.parse_literal(),
            _ => Err(self.unexpected()),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth > self.options.max_depth {
            Err(self.error(ParseErrorKind::DepthLimit(self.options.max_depth)))
        } else {
            Ok(())
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.check_depth(depth)?;
        self.advance(); // '{'
        self.trailing_line = None;

        let mut map = BTreeMap::new();
        self.skip_trivia()?;
        if self.eat('}') {
            self.pending.clear();
            return Ok(Value::Object(map));
        }

        loop {
            let description = self.take_description();
            if self.peek() != Some('"') {
                return Err(match self.peek() {
                    None => self.error(ParseErrorKind::UnexpectedEof),
                    Some(_) => self.error(ParseErrorKind::ExpectedKey),
                });
            }
            let key = self.parse_string()?;

            self.skip_trivia()?;
            if !self.eat(':') {
                return Err(match self.peek() {
                    None => self.error(ParseErrorKind::UnexpectedEof),
                    Some(_) => self.error(ParseErrorKind::ExpectedColon),
                });
            }

            let value = self.parse_value(depth + 1)?;
            self.trailing_line = Some(self.line);
            if map.contains_key(&key) {
                log::warn!(
                    "duplicate key '{}' at line {}; keeping the last value",
                    key,
                    self.line
                );
            }
            map.insert(key, Node { value, description });

            if self.finish_member('}')? {
                return Ok(Value::Object(map));
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.check_depth(depth)?;
        self.advance(); // '['
        self.trailing_line = None;

        let mut items = Vec::new();
        self.skip_trivia()?;
        if self.eat(']') {
            self.pending.clear();
            return Ok(Value::Array(items));
        }

        loop {
            let description = self.take_description();
            let value = self.parse_value(depth + 1)?;
            self.trailing_line = Some(self.line);
            items.push(Node { value, description });

            if self.finish_member(']')? {
                return Ok(Value::Array(items));
            }
        }
    }

    /// Consume the separator after a member. Returns `true` once the
    /// container's closing bracket has been consumed.
    fn finish_member(&mut self, close: char) -> Result<bool, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(',') => {
                self.advance();
                self.pending.clear();
                self.skip_trivia()?;
                if self.peek() == Some(close) {
                    return Err(self.error(ParseErrorKind::TrailingComma(close)));
                }
                Ok(false)
            }
            Some(c) if c == close => {
                self.advance();
                self.pending.clear();
                Ok(true)
            }
            None => Err(self.error(ParseErrorKind::UnexpectedEof)),
            Some(_) => Err(self.error(ParseErrorKind::ExpectedSeparator(close))),
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let start = (self.line, self.column);
        self.advance(); // opening quote

        let mut out = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(self.error_at(start, ParseErrorKind::UnterminatedString));
                }
                Some('"') => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) if (c as u32) < 0x20 => {
                    return Err(self.error(ParseErrorKind::ControlCharacter(c as u32)));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let c = self
            .advance()
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEof))?;
        Ok(match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.parse_unicode_escape(),
            other => return Err(self.error(ParseErrorKind::InvalidEscape(other))),
        })
    }

    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.hex4()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !(self.eat('\\') && self.eat('u')) {
                    return Err(self.error(ParseErrorKind::InvalidUnicode(format!(
                        "unpaired surrogate {:04X}",
                        high
                    ))));
                }
                let low = self.hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error(ParseErrorKind::InvalidUnicode(format!(
                        "invalid low surrogate {:04X}",
                        low
                    ))));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(self.error(ParseErrorKind::InvalidUnicode(format!(
                    "unpaired surrogate {:04X}",
                    high
                ))));
            }
            _ => high,
        };
        char::from_u32(code).ok_or_else(|| {
            self.error(ParseErrorKind::InvalidUnicode(format!("{:X}", code)))
        })
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    self.error(ParseErrorKind::InvalidUnicode(
                        "expected four hex digits".to_string(),
                    ))
                })?;
            self.advance();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = (self.line, self.column);
        let mut text = String::new();
        let mut is_float = false;

        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }

        match self.peek() {
            Some('0') => {
                text.push('0');
                self.advance();
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(self.invalid_number(start, text));
                }
            }
            Some('1'..='9') => self.digits(&mut text),
            _ => return Err(self.invalid_number(start, text)),
        }

        if self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.advance();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.invalid_number(start, text));
            }
            self.digits(&mut text);
        }

        if let Some(e @ ('e' | 'E')) = self.peek() {
            is_float = true;
            text.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.invalid_number(start, text));
            }
            self.digits(&mut text);
        }

        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
        }
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| self.invalid_number(start, text))
    }

    fn digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            self.advance();
        }
    }

    fn invalid_number(&self, start: (usize, usize), mut text: String) -> ParseError {
        if let Some(c) = self.peek() {
            text.push(c);
        }
        self.error_at(start, ParseErrorKind::InvalidNumber(text))
    }

    fn parse_literal(&mut self) -> Result<Value, ParseError> {
        let start = (self.line, self.column);
        let mut word = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
            word.push(c);
            self.advance();
        }
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => {
                let first = word.chars().next().unwrap_or(' ');
                Err(self.error_at(start, ParseErrorKind::UnexpectedChar(first)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    const SPHERE: &str = r#"
{
  // Default settings for sources.
  "sources" : {
    // A sphere source
    "SphereSource" : {
      /* New comment
         New comment 2 */
      "Radius" : 2.25,
      // Theta resolution


      // Theta resolution 2
      "ThetaResolution" : 32,
      // Center comment
      "Center" : [1.0, 2.0, 4.0]
    }
  }
}
"#;

    fn description<'a>(root: &'a Node, p: &str) -> Option<&'a str> {
        root.get(&path!(p)).and_then(|n| n.description.as_deref())
    }

    #[test]
    fn parses_sphere_document() {
        let root = parse(SPHERE).unwrap();
        assert_eq!(
            root.get(&path!(".sources.SphereSource.Radius")).unwrap().value,
            Value::Float(2.25)
        );
        assert_eq!(
            root.get(&path!(".sources.SphereSource.ThetaResolution"))
                .unwrap()
                .value,
            Value::Integer(32)
        );
        assert_eq!(
            root.get(&path!(".sources.SphereSource.Center")).unwrap().value,
            Value::from(vec![1.0, 2.0, 4.0])
        );
    }

    #[test]
    fn attaches_descriptions() {
        let root = parse(SPHERE).unwrap();
        assert_eq!(
            description(&root, ".sources"),
            Some("// Default settings for sources.")
        );
        assert_eq!(
            description(&root, ".sources.SphereSource"),
            Some("// A sphere source")
        );
        assert_eq!(
            description(&root, ".sources.SphereSource.Radius"),
            Some("/* New comment\n         New comment 2 */")
        );
        assert_eq!(
            description(&root, ".sources.SphereSource.ThetaResolution"),
            Some("// Theta resolution\n// Theta resolution 2")
        );
        assert_eq!(
            description(&root, ".sources.SphereSource.Center"),
            Some("// Center comment")
        );
        assert!(root.description.is_none());
    }

    #[test]
    fn same_line_comment_does_not_attach_forward() {
        let root = parse("{\n\"a\": 1, // about a\n\"b\": 2\n}").unwrap();
        assert_eq!(description(&root, ".a"), None);
        assert_eq!(description(&root, ".b"), None);
    }

    #[test]
    fn comments_between_key_and_value_are_ignored() {
        let root = parse("{ \"a\" /* x */ : /* y */ 1 }").unwrap();
        assert_eq!(root.get(&path!(".a")).unwrap().value, Value::Integer(1));
        assert_eq!(description(&root, ".a"), None);
    }

    #[test]
    fn comment_before_closing_brace_is_dropped() {
        let root = parse("{\n\"a\": 1\n// orphan\n}").unwrap();
        assert_eq!(description(&root, ".a"), None);
    }

    #[test]
    fn array_elements_get_descriptions() {
        let root = parse("{\"xs\": [\n// first\n1,\n/* second */ 2]}").unwrap();
        match &root.get(&path!(".xs")).unwrap().value {
            Value::Array(items) => {
                assert_eq!(items[0].description.as_deref(), Some("// first"));
                assert_eq!(items[1].description.as_deref(), Some("/* second */"));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn collect_comments_off() {
        let parser = Parser::new(ParserOptions {
            collect_comments: false,
            ..ParserOptions::default()
        });
        let root = parser.parse(SPHERE).unwrap();
        assert_eq!(description(&root, ".sources"), None);
        assert!(root.get(&path!(".sources.SphereSource.Radius")).is_some());
    }

    #[test]
    fn scalars() {
        let root = parse(
            r#"{"t": true, "f": false, "n": null, "i": -7, "big": 99999999999999999999,
                "e": 1e3, "s": "a\"b\\c\u00e9\ud83d\ude00\n"}"#,
        )
        .unwrap();
        let get = |p: &str| root.get(&path!(p)).unwrap().value.clone();
        assert_eq!(get(".t"), Value::Bool(true));
        assert_eq!(get(".f"), Value::Bool(false));
        assert_eq!(get(".n"), Value::Null);
        assert_eq!(get(".i"), Value::Integer(-7));
        assert_eq!(get(".big"), Value::Float(1e20));
        assert_eq!(get(".e"), Value::Float(1000.0));
        assert_eq!(get(".s"), Value::String("a\"b\\c\u{e9}\u{1F600}\n".to_string()));
    }

    fn kind_of(text: &str) -> ParseErrorKind {
        parse(text).unwrap_err().kind
    }

    #[test]
    fn malformed_documents() {
        assert_eq!(kind_of("{\"a\": \"open}"), ParseErrorKind::UnterminatedString);
        assert_eq!(kind_of("{\"a\": 1,}"), ParseErrorKind::TrailingComma('}'));
        assert_eq!(kind_of("{\"a\": [1, 2,]}"), ParseErrorKind::TrailingComma(']'));
        assert_eq!(kind_of("{\"a\": [1, 2}"), ParseErrorKind::ExpectedSeparator(']'));
        assert_eq!(kind_of("{\"a\" 1}"), ParseErrorKind::ExpectedColon);
        assert_eq!(kind_of("{a: 1}"), ParseErrorKind::ExpectedKey);
        assert_eq!(kind_of("{\"a\": 1 /* open"), ParseErrorKind::UnterminatedComment);
        assert_eq!(kind_of("{\"a\": 1"), ParseErrorKind::UnexpectedEof);
        assert_eq!(kind_of("{} {}"), ParseErrorKind::TrailingContent);
        assert_eq!(kind_of("[1, 2]"), ParseErrorKind::RootNotObject);
        assert_eq!(kind_of(""), ParseErrorKind::UnexpectedEof);
        assert_eq!(kind_of("{\"a\": 01}"), ParseErrorKind::InvalidNumber("01".to_string()));
        assert_eq!(kind_of("{\"a\": 1.}"), ParseErrorKind::InvalidNumber("1.}".to_string()));
        assert_eq!(kind_of("{\"a\": tru}"), ParseErrorKind::UnexpectedChar('t'));
        assert_eq!(kind_of("{\"a\": \"\\q\"}"), ParseErrorKind::InvalidEscape('q'));
        assert_eq!(kind_of("{\"a\": 1 / 2}"), ParseErrorKind::UnexpectedChar('/'));
    }

    #[test]
    fn error_positions_are_one_based() {
        let err = parse("{\n  \"a\": 1,\n}").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn unterminated_string_points_at_opening_quote() {
        let err = parse("{\"a\": \"abc").unwrap_err();
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn depth_limit() {
        let parser = Parser::new(ParserOptions {
            max_depth: 3,
            ..ParserOptions::default()
        });
        assert!(parser.parse("{\"a\": {\"b\": {}}}").is_ok());
        assert_eq!(
            parser.parse("{\"a\": {\"b\": {\"c\": {}}}}").unwrap_err().kind,
            ParseErrorKind::DepthLimit(3)
        );
    }

    #[test]
    fn duplicate_keys_keep_last() {
        let root = parse("{\"a\": 1, \"a\": 2}").unwrap();
        assert_eq!(root.get(&path!(".a")).unwrap().value, Value::Integer(2));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ParserOptions = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(options.max_depth, 8);
        assert!(options.collect_comments);
    }
}
