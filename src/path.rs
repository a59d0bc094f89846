use std::fmt;

use itertools::Itertools;

use crate::errors::{ContextError, Result};

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathExpr {
    /// `.` or `this`: the context's own model.
    This,
    /// One or more non-empty segments, `a.b.c`.
    Segments(Vec<String>),
}

impl PathExpr {
    pub fn parse(input: &str) -> Result<PathExpr> {
        if input.is_empty() {
            return Err(ContextError::invalid_path(input, "path is empty"));
        }
        if input == "." || input == "this" {
            return Ok(PathExpr::This);
        }
        let segments = Parser::new(input)
            .parse_segments()
            .map_err(|reason| ContextError::invalid_path(input, reason))?;
        Ok(PathExpr::Segments(segments))
    }

    /// Empty for `This`.
    pub fn segments(&self) -> &[String] {
        match self {
            PathExpr::This => &[],
            PathExpr::Segments(segments) => segments,
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathExpr::This => f.write_str("this"),
            PathExpr::Segments(segments) if segments.len() == 1 && segments[0] == "this" => {
                f.write_str("[this]")
            }
            PathExpr::Segments(segments) => {
                let joined = segments
                    .iter()
                    .map(|s| {
                        if s.contains('.') || s.starts_with('[') {
                            format!("[{s}]")
                        } else {
                            s.clone()
                        }
                    })
                    .join(".");
                f.write_str(&joined)
            }
        }
    }
}

struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn parse_segments(&mut self) -> std::result::Result<Vec<String>, String> {
        let mut segments = Vec::new();
        loop {
            segments.push(self.parse_segment()?);
            if self.eof() {
                break;
            }
            self.expect('.')?;
            if self.eof() {
                return Err("path ends with `.`".into());
            }
        }
        Ok(segments)
    }

    // `[...]` is a literal segment and may contain dots.
    fn parse_segment(&mut self) -> std::result::Result<String, String> {
        if self.consume_char('[') {
            let literal = self.capture_until(']')?;
            self.expect(']')?;
            if literal.is_empty() {
                return Err(format!("empty `[]` segment at offset {}", self.i - 2));
            }
            return Ok(literal.to_string());
        }
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '.' {
                break;
            }
            self.i += c.len_utf8();
        }
        if self.i == start {
            return Err(format!("empty segment at offset {start}"));
        }
        Ok(self.s[start..self.i].to_string())
    }

    fn capture_until(&mut self, end: char) -> std::result::Result<&'a str, String> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == end {
                break;
            }
            self.i += c.len_utf8();
        }
        if self.peek_char() != Some(end) {
            return Err(format!("expected '{end}'"));
        }
        Ok(&self.s[start..self.i])
    }

    fn expect(&mut self, c: char) -> std::result::Result<(), String> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(format!("expected '{c}' at offset {}", self.i))
        }
    }

    fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
