//! Window match expressions
//!
//! Rule rows select windows with small boolean expressions:
//!
//! - `any`, `none`
//! - `type=<kind>` (`normal`, `dialog`, `popup_menu`, ...)
//! - `class=<glob>`, `name=<glob>`, `title=<glob>`, `role=<glob>`
//! - `state=<flag>` (`shaded`, `minimized`, `alpha`, `skip_taskbar`, `skip_pager`)
//! - `!e`, `a & b`, `a | b`, `( e )`
//!
//! Globs support `*` and `?`. Hosts with their own match language implement
//! [`WindowMatcher`] instead.

use regex::Regex;
use rustc_hash::FxHashMap;
use wisp_core::{Result, WindowInfo, WispError};

/// Evaluates configured match expressions against windows
pub trait WindowMatcher {
    /// Validate (and cache) an expression when configuration is applied
    fn prepare(&mut self, expression: &str) -> Result<()> {
        let _ = expression;
        Ok(())
    }

    fn evaluate(&self, expression: &str, window: &WindowInfo) -> bool;
}

/// State flags usable in `state=` terms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateFlag {
    Shaded,
    Minimized,
    Alpha,
    SkipTaskbar,
    SkipPager,
}

/// Parsed match expression
#[derive(Clone, Debug)]
pub enum MatchExpr {
    Any,
    Never,
    Kind(String),
    Class(Regex),
    Name(Regex),
    Title(Regex),
    Role(Regex),
    State(StateFlag),
    Not(Box<MatchExpr>),
    And(Box<MatchExpr>, Box<MatchExpr>),
    Or(Box<MatchExpr>, Box<MatchExpr>),
}

impl MatchExpr {
    /// Parse an expression; an empty string matches nothing
    pub fn parse(input: &str) -> Result<MatchExpr> {
        if input.trim().is_empty() {
            return Ok(MatchExpr::Never);
        }
        let mut parser = Parser::new(input);
        let expr = parser.parse_or()?;
        parser.skip_whitespace();
        if parser.peek().is_some() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    pub fn matches(&self, w: &WindowInfo) -> bool {
        match self {
            MatchExpr::Any => true,
            MatchExpr::Never => false,
            MatchExpr::Kind(kind) => w.kind.as_str() == kind,
            MatchExpr::Class(re) => re.is_match(&w.class),
            MatchExpr::Name(re) => re.is_match(&w.name),
            MatchExpr::Title(re) => re.is_match(&w.title),
            MatchExpr::Role(re) => re.is_match(&w.role),
            MatchExpr::State(flag) => match flag {
                StateFlag::Shaded => w.shaded,
                StateFlag::Minimized => w.minimized,
                StateFlag::Alpha => w.has_alpha,
                StateFlag::SkipTaskbar => w.skip_taskbar,
                StateFlag::SkipPager => w.skip_pager,
            },
            MatchExpr::Not(e) => !e.matches(w),
            MatchExpr::And(a, b) => a.matches(w) && b.matches(w),
            MatchExpr::Or(a, b) => a.matches(w) || b.matches(w),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn error(&self, msg: &str) -> WispError {
        WispError::Config(format!(
            "invalid match \"{}\" at {}: {}",
            self.input, self.pos, msg
        ))
    }

    fn parse_or(&mut self) -> Result<MatchExpr> {
        let mut lhs = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some('|') {
                return Ok(lhs);
            }
            self.next_char();
            let rhs = self.parse_and()?;
            lhs = MatchExpr::Or(Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_and(&mut self) -> Result<MatchExpr> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some('&') {
                return Ok(lhs);
            }
            self.next_char();
            let rhs = self.parse_unary()?;
            lhs = MatchExpr::And(Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<MatchExpr> {
        self.skip_whitespace();
        match self.peek() {
            Some('!') => {
                self.next_char();
                Ok(MatchExpr::Not(Box::new(self.parse_unary()?)))
            }
            Some('(') => {
                self.next_char();
                let inner = self.parse_or()?;
                self.skip_whitespace();
                if self.next_char() != Some(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some(_) => self.parse_term(),
            None => Err(self.error("expected a term")),
        }
    }

    fn parse_term(&mut self) -> Result<MatchExpr> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '&' | '|' | '(' | ')' | '!') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let term = self.input[start..self.pos].trim();
        if term.is_empty() {
            return Err(self.error("expected a term"));
        }

        let Some((key, value)) = term.split_once('=') else {
            return match term.to_ascii_lowercase().as_str() {
                "any" | "all" => Ok(MatchExpr::Any),
                "none" => Ok(MatchExpr::Never),
                _ => Err(self.error("expected key=value")),
            };
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "type" => Ok(MatchExpr::Kind(value.to_ascii_lowercase())),
            "class" => Ok(MatchExpr::Class(self.glob(value)?)),
            "name" => Ok(MatchExpr::Name(self.glob(value)?)),
            "title" => Ok(MatchExpr::Title(self.glob(value)?)),
            "role" => Ok(MatchExpr::Role(self.glob(value)?)),
            "state" => {
                let flag = match value.to_ascii_lowercase().as_str() {
                    "shaded" => StateFlag::Shaded,
                    "minimized" => StateFlag::Minimized,
                    "alpha" | "argb" => StateFlag::Alpha,
                    "skip_taskbar" => StateFlag::SkipTaskbar,
                    "skip_pager" => StateFlag::SkipPager,
                    _ => return Err(self.error("unknown state flag")),
                };
                Ok(MatchExpr::State(flag))
            }
            _ => Err(self.error("unknown key")),
        }
    }

    fn glob(&self, pattern: &str) -> Result<Regex> {
        let mut re = String::with_capacity(pattern.len() + 4);
        re.push('^');
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                _ => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        re.push('$');
        Regex::new(&re).map_err(|e| self.error(&e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Default matcher
// ─────────────────────────────────────────────────────────────────────────────

/// [`WindowMatcher`] for the built-in expression language
#[derive(Default)]
pub struct ExprMatcher {
    cache: FxHashMap<String, MatchExpr>,
}

impl ExprMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowMatcher for ExprMatcher {
    fn prepare(&mut self, expression: &str) -> Result<()> {
        if !self.cache.contains_key(expression) {
            let expr = MatchExpr::parse(expression)?;
            self.cache.insert(expression.to_string(), expr);
        }
        Ok(())
    }

    fn evaluate(&self, expression: &str, window: &WindowInfo) -> bool {
        match self.cache.get(expression) {
            Some(expr) => expr.matches(window),
            None => MatchExpr::parse(expression)
                .map(|e| e.matches(window))
                .unwrap_or(false),
        }
    }
}
