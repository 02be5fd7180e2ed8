//! Template compiler.
//!
//! Recursive descent parser turning template text into a [`Node`] program.
//! Errors carry the byte offset of the offending token.
//!
//! # Syntax
//!
//! - `{* ... *}` comments are dropped
//! - `{{ expr }}` interpolates an expression
//! - `{{if expr}} ... {{else if expr}} ... {{else}} ... {{end}}`
//! - expressions: `.Field.Path`, `.`, literals, `fn(arg, ...)`, `expr | fn`

use crate::domain::error::{LoadError, ParseError};
use crate::domain::template::{Branch, CompiledTemplate, Expr, Literal, Node, TemplateSource};

const ACTION_OPEN: &str = "{{";
const ACTION_CLOSE: &str = "}}";
const COMMENT_OPEN: &str = "{*";
const COMMENT_CLOSE: &str = "*}";

/// How a block of nodes ended.
enum Terminator {
    Eof,
    Else { condition: Option<Expr>, position: usize },
    End { position: usize },
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, message: impl Into<String>, position: usize) -> ParseError {
        ParseError {
            message: message.into(),
            position,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn consume_exact(&mut self, s: &str) -> bool {
        if self.remaining().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch), self.pos)),
            None => Err(self.error(
                format!("expected '{}', found end of input", expected),
                self.pos,
            )),
        }
    }

    fn expect_close(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.consume_exact(ACTION_CLOSE) {
            Ok(())
        } else {
            let found = self.peek_word();
            Err(self.error(
                format!("expected '{}', found '{}'", ACTION_CLOSE, found),
                self.pos,
            ))
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        remaining.starts_with(keyword)
            && !remaining[keyword.len()..]
                .chars()
                .next()
                .is_some_and(is_ident_char)
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> String {
        let word: String = self
            .remaining()
            .chars()
            .take_while(|c| is_ident_char(*c))
            .collect();
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(ch) if ch.is_alphabetic() || ch == '_' => {}
            _ => {
                return Err(self.error(
                    format!("expected identifier, found '{}'", self.peek_word()),
                    start,
                ));
            }
        }
        while self.peek().is_some_and(is_ident_char) {
            self.advance();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_number(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(self.error("expected number", start));
        }

        let num_str = &self.input[start..self.pos];
        if has_dot {
            num_str
                .parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| self.error(format!("invalid number: {}", num_str), start))
        } else {
            num_str
                .parse::<i64>()
                .map(Literal::Int)
                .map_err(|_| self.error(format!("invalid number: {}", num_str), start))
        }
    }

    fn parse_string(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        self.advance();
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(Literal::Str(value)),
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        return Err(self.error(
                            format!("unknown escape sequence '\\{}'", other),
                            self.pos - other.len_utf8() - 1,
                        ));
                    }
                    None => break,
                },
                Some(ch) => value.push(ch),
                None => break,
            }
        }
        Err(self.error("unterminated string literal", start))
    }

    fn parse_path(&mut self) -> Result<Expr, ParseError> {
        // Leading '.' already peeked.
        self.advance();
        let mut segments = Vec::new();
        if !self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return Ok(Expr::Path(segments));
        }
        segments.push(self.parse_ident()?);
        while self.peek() == Some('.') {
            self.advance();
            segments.push(self.parse_ident()?);
        }
        Ok(Expr::Path(segments))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        // Opening '(' already consumed.
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok(args);
        }
        args.push(self.parse_pipeline()?);
        loop {
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.advance();
                return Ok(args);
            }
            self.expect_char(',')?;
            args.push(self.parse_pipeline()?);
        }
    }

    fn parse_call(&mut self) -> Result<(String, Vec<Expr>), ParseError> {
        let name = self.parse_ident()?;
        let args = if self.peek() == Some('(') {
            self.advance();
            self.parse_args()?
        } else {
            Vec::new()
        };
        Ok((name, args))
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('.') => self.parse_path(),
            Some('"') => Ok(Expr::Literal(self.parse_string()?)),
            Some('(') => {
                self.advance();
                let inner = self.parse_pipeline()?;
                self.expect_char(')')?;
                Ok(inner)
            }
            Some(ch) if ch.is_ascii_digit() || ch == '-' => Ok(Expr::Literal(self.parse_number()?)),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                if self.consume_keyword("true") {
                    Ok(Expr::Literal(Literal::Bool(true)))
                } else if self.consume_keyword("false") {
                    Ok(Expr::Literal(Literal::Bool(false)))
                } else if self.consume_keyword("nil") {
                    Ok(Expr::Literal(Literal::Nil))
                } else {
                    let (name, args) = self.parse_call()?;
                    Ok(Expr::Call { name, args })
                }
            }
            _ => Err(self.error(
                format!("expected expression, found '{}'", self.peek_word()),
                self.pos,
            )),
        }
    }

    /// `term ('|' fn[(args)])*`; the piped value becomes the first argument.
    fn parse_pipeline(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_term()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some('|') {
                return Ok(expr);
            }
            self.advance();
            self.skip_whitespace();
            let (name, mut args) = self.parse_call()?;
            args.insert(0, expr);
            expr = Expr::Call { name, args };
        }
    }

    fn push_text(nodes: &mut Vec<Node>, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(prev)) = nodes.last_mut() {
            prev.push_str(text);
        } else {
            nodes.push(Node::Text(text.to_string()));
        }
    }

    fn parse_if(&mut self, if_pos: usize) -> Result<Node, ParseError> {
        let mut branches = Vec::new();
        let mut condition = self.parse_pipeline()?;
        self.expect_close()?;

        loop {
            let (body, terminator) = self.parse_block()?;
            branches.push(Branch { condition, body });
            match terminator {
                Terminator::Eof => {
                    return Err(self.error("unclosed {{if}}: expected {{end}}", if_pos));
                }
                Terminator::End { .. } => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                }
                Terminator::Else {
                    condition: Some(next),
                    ..
                } => condition = next,
                Terminator::Else {
                    condition: None, ..
                } => {
                    let (otherwise, terminator) = self.parse_block()?;
                    return match terminator {
                        Terminator::End { .. } => Ok(Node::If {
                            branches,
                            otherwise,
                        }),
                        Terminator::Else { position, .. } => {
                            Err(self.error("unexpected {{else}} after {{else}}", position))
                        }
                        Terminator::Eof => {
                            Err(self.error("unclosed {{if}}: expected {{end}}", if_pos))
                        }
                    };
                }
            }
        }
    }

    /// Parse nodes until end of input, `{{else}}` or `{{end}}`.
    fn parse_block(&mut self) -> Result<(Vec<Node>, Terminator), ParseError> {
        let mut nodes = Vec::new();
        loop {
            let rest = self.remaining();
            let next_action = rest.find(ACTION_OPEN);
            let next_comment = rest.find(COMMENT_OPEN);
            let next = match (next_action, next_comment) {
                (Some(a), Some(c)) => Some(a.min(c)),
                (a, c) => a.or(c),
            };

            let Some(offset) = next else {
                Self::push_text(&mut nodes, rest);
                self.pos = self.input.len();
                return Ok((nodes, Terminator::Eof));
            };

            Self::push_text(&mut nodes, &rest[..offset]);
            self.pos += offset;
            let tag_pos = self.pos;

            if self.consume_exact(COMMENT_OPEN) {
                match self.remaining().find(COMMENT_CLOSE) {
                    Some(end) => self.pos += end + COMMENT_CLOSE.len(),
                    None => return Err(self.error("unterminated comment", tag_pos)),
                }
                continue;
            }

            self.consume_exact(ACTION_OPEN);
            self.skip_whitespace();

            if self.consume_keyword("if") {
                nodes.push(self.parse_if(tag_pos)?);
            } else if self.consume_keyword("else") {
                self.skip_whitespace();
                let condition = if self.consume_keyword("if") {
                    Some(self.parse_pipeline()?)
                } else {
                    None
                };
                self.expect_close()?;
                return Ok((
                    nodes,
                    Terminator::Else {
                        condition,
                        position: tag_pos,
                    },
                ));
            } else if self.consume_keyword("end") {
                self.expect_close()?;
                return Ok((nodes, Terminator::End { position: tag_pos }));
            } else {
                let expr = self.parse_pipeline()?;
                self.expect_close()?;
                nodes.push(Node::Interpolate(expr));
            }
        }
    }

    fn parse(&mut self) -> Result<Vec<Node>, ParseError> {
        let (nodes, terminator) = self.parse_block()?;
        match terminator {
            Terminator::Eof => Ok(nodes),
            Terminator::Else { position, .. } => {
                Err(self.error("unexpected {{else}} outside {{if}}", position))
            }
            Terminator::End { position } => {
                Err(self.error("unexpected {{end}} outside {{if}}", position))
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}

/// Compile source bytes into a template named after its logical path.
pub fn compile(source: &TemplateSource) -> Result<CompiledTemplate, LoadError> {
    let text = std::str::from_utf8(&source.bytes).map_err(|e| LoadError::Compile {
        path: source.path.clone(),
        source: ParseError {
            message: "template source is not valid UTF-8".to_string(),
            position: e.valid_up_to(),
        },
    })?;
    let program = parse(text).map_err(|e| LoadError::Compile {
        path: source.path.clone(),
        source: e,
    })?;
    Ok(CompiledTemplate::new(
        source.path.clone(),
        source.path.clone(),
        source.hash.clone(),
        program,
    ))
}
