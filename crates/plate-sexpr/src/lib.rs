//! A small S-expression parser for KiCad board files.
//!
//! KiCad's `.kicad_pcb` format is a tree of parenthesized lists whose first
//! element is a tag symbol, e.g. `(gr_line (start 0 0) (end 10 0) (layer
//! "Edge.Cuts"))`. This crate parses that text into [`Sexpr`] trees and
//! serializes trees back out in KiCad's tab-indented style (see
//! [`formatter`]).

pub mod formatter;

use std::fmt;

/// An S-expression value.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    /// Unquoted identifier.
    Symbol(String),
    /// Quoted text.
    Str(String),
    /// Numeric atom. KiCad mixes integer and float lexemes freely, so a
    /// single f64 representation is used for both.
    Num(f64),
    /// Parenthesized list.
    List(Vec<Sexpr>),
}

impl Sexpr {
    /// Create a symbol atom.
    pub fn symbol(s: impl Into<String>) -> Self {
        Sexpr::Symbol(s.into())
    }

    /// Create a quoted string atom.
    pub fn string(s: impl Into<String>) -> Self {
        Sexpr::Str(s.into())
    }

    /// Create a numeric atom.
    pub fn num(n: f64) -> Self {
        Sexpr::Num(n)
    }

    /// Create a list.
    pub fn list(items: Vec<Sexpr>) -> Self {
        Sexpr::List(items)
    }

    /// Get the symbol name if this is a symbol.
    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Sexpr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get the string content if this is a quoted string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Sexpr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the atom text if this is a symbol or string.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexpr::Symbol(s) | Sexpr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value if this is a number.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Sexpr::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the list items if this is a list.
    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match self {
            Sexpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get mutable access to list items if this is a list.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Sexpr>> {
        match self {
            Sexpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// The tag of a list node: its leading symbol, e.g. `footprint` for
    /// `(footprint "H:Hole" ...)`.
    pub fn tag(&self) -> Option<&str> {
        self.as_list()?.first()?.as_sym()
    }

    /// Find a direct child list `(name ...)`.
    pub fn find_list(&self, name: &str) -> Option<&[Sexpr]> {
        find_child_list(self.as_list()?, name)
    }

    /// Find all direct child lists `(name ...)`.
    pub fn find_all_lists(&self, name: &str) -> Vec<&[Sexpr]> {
        self.as_list()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|n| n.as_list())
                    .filter(|l| l.first().and_then(Sexpr::as_sym) == Some(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find a mutable direct child list `(name ...)`.
    pub fn find_list_mut(&mut self, name: &str) -> Option<&mut Vec<Sexpr>> {
        self.as_list_mut()?
            .iter_mut()
            .filter_map(|n| match n {
                Sexpr::List(items) if items.first().and_then(Sexpr::as_sym) == Some(name) => {
                    Some(items)
                }
                _ => None,
            })
            .next()
    }
}

/// Find a direct child list `(name ...)` within a slice of nodes.
pub fn find_child_list<'a>(items: &'a [Sexpr], name: &str) -> Option<&'a [Sexpr]> {
    items
        .iter()
        .filter_map(|n| n.as_list())
        .find(|l| l.first().and_then(Sexpr::as_sym) == Some(name))
}

impl From<&str> for Sexpr {
    fn from(s: &str) -> Self {
        Sexpr::symbol(s)
    }
}

impl From<String> for Sexpr {
    fn from(s: String) -> Self {
        Sexpr::symbol(s)
    }
}

impl From<f64> for Sexpr {
    fn from(n: f64) -> Self {
        Sexpr::num(n)
    }
}

impl From<i64> for Sexpr {
    fn from(n: i64) -> Self {
        Sexpr::num(n as f64)
    }
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", formatter::format_compact(self))
    }
}

/// Errors that can occur during parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedEof,
    UnexpectedChar(char, char),
    UnclosedList,
    UnterminatedString,
    EmptyAtom,
    TrailingInput,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof => write!(f, "unexpected end of input"),
            ParseError::UnexpectedChar(found, expected) => {
                write!(f, "expected '{expected}', found '{found}'")
            }
            ParseError::UnclosedList => write!(f, "unclosed list"),
            ParseError::UnterminatedString => write!(f, "unterminated string"),
            ParseError::EmptyAtom => write!(f, "empty atom"),
            ParseError::TrailingInput => write!(f, "trailing input after document"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a single S-expression document, requiring the whole input to be
/// consumed (apart from trailing whitespace and comments).
pub fn parse(input: &str) -> Result<Sexpr, ParseError> {
    log::trace!("parsing {} bytes of S-expression input", input.len());
    let mut parser = Parser::new(input);
    let doc = parser.parse_value()?;
    parser.skip_trivia();
    if !parser.is_at_end() {
        return Err(ParseError::TrailingInput);
    }
    Ok(doc)
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            chars: input.chars().peekable(),
        }
    }

    fn parse_value(&mut self) -> Result<Sexpr, ParseError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(ParseError::UnexpectedEof),
            Some('(') => self.parse_list(),
            Some('"') => self.parse_string(),
            Some(_) => self.parse_bare_atom(),
        }
    }

    fn parse_list(&mut self) -> Result<Sexpr, ParseError> {
        self.expect('(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(ParseError::UnclosedList),
                Some(')') => {
                    self.bump();
                    return Ok(Sexpr::List(items));
                }
                Some(_) => items.push(self.parse_value()?),
            }
        }
    }

    fn parse_string(&mut self) -> Result<Sexpr, ParseError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString),
                Some('"') => return Ok(Sexpr::Str(out)),
                Some('\\') => match self.bump() {
                    None => return Err(ParseError::UnterminatedString),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some(ch) => out.push(ch),
                },
                Some(ch) => out.push(ch),
            }
        }
    }

    fn parse_bare_atom(&mut self) -> Result<Sexpr, ParseError> {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' {
                break;
            }
            text.push(ch);
            self.bump();
        }
        if text.is_empty() {
            return Err(ParseError::EmptyAtom);
        }
        // Numeric lexemes become numbers, everything else a symbol.
        match text.parse::<f64>() {
            Ok(n) if text.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') => {
                Ok(Sexpr::Num(n))
            }
            _ => Ok(Sexpr::Symbol(text)),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == ';' {
                // Comment runs to end of line.
                while let Some(ch) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.bump() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(ParseError::UnexpectedChar(ch, expected)),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_atoms() {
        assert_eq!(parse("hello").unwrap(), Sexpr::symbol("hello"));
        assert_eq!(parse("123").unwrap(), Sexpr::num(123.0));
        assert_eq!(parse("-4.25").unwrap(), Sexpr::num(-4.25));
        assert_eq!(
            parse("symbol-with-dashes").unwrap(),
            Sexpr::symbol("symbol-with-dashes")
        );
        // Layer-ish tokens must stay symbols even though they contain dots.
        assert_eq!(parse("F.Cu").unwrap(), Sexpr::symbol("F.Cu"));
    }

    #[test]
    fn parse_strings() {
        assert_eq!(
            parse("\"hello world\"").unwrap(),
            Sexpr::string("hello world")
        );
        assert_eq!(
            parse("\"with\\\"quotes\\\"\"").unwrap(),
            Sexpr::string("with\"quotes\"")
        );
        assert_eq!(parse("\"line\\nbreak\"").unwrap(), Sexpr::string("line\nbreak"));
    }

    #[test]
    fn parse_lists() {
        assert_eq!(parse("()").unwrap(), Sexpr::List(vec![]));
        let parsed = parse("(a b 3)").unwrap();
        assert_eq!(
            parsed,
            Sexpr::list(vec![Sexpr::symbol("a"), Sexpr::symbol("b"), Sexpr::num(3.0)])
        );
        assert_eq!(parsed.tag(), Some("a"));
    }

    #[test]
    fn parse_nested_with_comments() {
        let input = r#"
        ; header comment
        (gr_line ; inline comment
          (start 0 0)
          (end 10 0)
          (layer "Edge.Cuts"))
        "#;
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.tag(), Some("gr_line"));
        let layer = parsed.find_list("layer").unwrap();
        assert_eq!(layer[1].as_str(), Some("Edge.Cuts"));
    }

    #[test]
    fn trailing_input_rejected() {
        assert_eq!(parse("(a) (b)"), Err(ParseError::TrailingInput));
    }

    #[test]
    fn unclosed_list_rejected() {
        assert_eq!(parse("(a (b)"), Err(ParseError::UnclosedList));
    }

    #[test]
    fn find_lists() {
        let parsed = parse("(pad \"1\" smd circle (at 1 2) (size 3 4))").unwrap();
        let at = parsed.find_list("at").unwrap();
        assert_eq!(at[1].as_num(), Some(1.0));
        assert_eq!(at[2].as_num(), Some(2.0));
        assert!(parsed.find_list("drill").is_none());
    }

    #[test]
    fn find_list_mut_edits_in_place() {
        let mut parsed = parse("(gr_line (layer \"F.Adhes\"))").unwrap();
        let layer = parsed.find_list_mut("layer").unwrap();
        layer[1] = Sexpr::string("Edge.Cuts");
        assert_eq!(
            parsed.find_list("layer").unwrap()[1].as_str(),
            Some("Edge.Cuts")
        );
    }

    #[test]
    fn roundtrip_through_formatter() {
        let inputs = [
            "(simple list)",
            "(nested (list with) (multiple levels))",
            r#"(with "quoted string" and atoms)"#,
            r#"(pad "1" smd circle (at 0.5 -1) (size 2.54 2.54) (layers "F.Cu" "*.Mask"))"#,
        ];
        for input in inputs {
            let parsed = parse(input).unwrap();
            let formatted = formatter::format_board(&parsed);
            let reparsed = parse(&formatted).unwrap();
            assert_eq!(parsed, reparsed, "roundtrip failed for: {input}");
        }
    }
}
