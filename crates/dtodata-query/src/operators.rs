//! Comparison operators: canonical OData keywords and the UI token map.
//!
//! The map is positional. Entry `i` of the UI token list always stands for
//! `Operator::ALL[i]`; a configured list replaces the default one wholesale.

use std::fmt;

use dtodata_core::config::{Settings, DEFAULT_OPERATOR_TOKENS, OPERATOR_COUNT};
use dtodata_core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Has,
}

impl Operator {
    /// Canonical order. Scans and the UI token map both follow it.
    pub const ALL: [Operator; OPERATOR_COUNT] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::Has,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Has => "has",
        }
    }

    fn position(self) -> usize {
        match self {
            Operator::Eq => 0,
            Operator::Ne => 1,
            Operator::Gt => 2,
            Operator::Ge => 3,
            Operator::Lt => 4,
            Operator::Le => 5,
            Operator::Has => 6,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scanning a clause for a canonical operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorMatch {
    /// First operator in canonical order present in the clause, with the byte
    /// offset of its single occurrence.
    Found { op: Operator, at: usize },
    NotFound,
    /// The selected operator occurs more than once; no split point is chosen.
    Ambiguous(Operator),
}

/// Scan `clause` for canonical operators in list order.
///
/// An operator counts when its keyword starts a word and is followed by a
/// space. The first operator in `Operator::ALL` with any occurrence wins,
/// regardless of where other operators sit in the string.
pub fn scan(clause: &str) -> OperatorMatch {
    for op in Operator::ALL {
        let needle = format!("{} ", op.as_str());
        let mut hits = clause
            .match_indices(needle.as_str())
            .map(|(at, _)| at)
            .filter(|&at| starts_word(clause, at));

        match (hits.next(), hits.next()) {
            (None, _) => continue,
            (Some(at), None) => return OperatorMatch::Found { op, at },
            (Some(_), Some(_)) => return OperatorMatch::Ambiguous(op),
        }
    }
    OperatorMatch::NotFound
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_word(s: &str, at: usize) -> bool {
    s[..at].chars().next_back().map_or(true, |c| !is_word_char(c))
}

fn ends_word(s: &str, at: usize) -> bool {
    s[at..].chars().next().map_or(true, |c| !is_word_char(c))
}

/// Positional UI token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMap {
    tokens: Vec<String>,
}

impl Default for OperatorMap {
    fn default() -> Self {
        Self {
            tokens: DEFAULT_OPERATOR_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl OperatorMap {
    pub fn new(tokens: Vec<String>) -> Result<Self> {
        if tokens.len() != OPERATOR_COUNT {
            return Err(Error::Config(format!(
                "operator map needs {} tokens, got {}",
                OPERATOR_COUNT,
                tokens.len()
            )));
        }
        if tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::Config("operator map contains a blank token".into()));
        }
        Ok(Self { tokens })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.map_operators.clone())
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// UI token shown for `op`.
    pub fn ui_token(&self, op: Operator) -> &str {
        &self.tokens[op.position()]
    }

    /// Canonical operator a UI token stands for.
    pub fn canonical(&self, token: &str) -> Option<Operator> {
        self.tokens
            .iter()
            .position(|t| t == token)
            .map(|i| Operator::ALL[i])
    }

    /// Replace every UI token in `input` with its canonical keyword.
    ///
    /// At each position the longest matching token wins (ties go to the
    /// earlier list entry), so `>=` is never read as `>` then `=`. Tokens made
    /// of word characters only match whole words. The keyword is separated
    /// from neighbouring text by one space. Token text inside quoted literals
    /// is rewritten too; nothing is escaped.
    pub fn translate(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len() + 8);
        let mut i = 0;

        while i < input.len() {
            match self.longest_match(input, i) {
                Some((idx, len)) => {
                    if out.chars().next_back().is_some_and(|c| !c.is_whitespace()) {
                        out.push(' ');
                    }
                    out.push_str(Operator::ALL[idx].as_str());
                    if input[i + len..]
                        .chars()
                        .next()
                        .is_some_and(|c| !c.is_whitespace())
                    {
                        out.push(' ');
                    }
                    i += len;
                }
                None => {
                    // `i` always sits on a char boundary.
                    let Some(c) = input[i..].chars().next() else {
                        break;
                    };
                    out.push(c);
                    i += c.len_utf8();
                }
            }
        }

        out
    }

    fn longest_match(&self, input: &str, at: usize) -> Option<(usize, usize)> {
        let rest = &input[at..];
        let mut best: Option<(usize, usize)> = None;

        for (idx, token) in self.tokens.iter().enumerate() {
            if !rest.starts_with(token.as_str()) {
                continue;
            }
            if token.chars().all(is_word_char)
                && !(starts_word(input, at) && ends_word(input, at + token.len()))
            {
                continue;
            }
            if best.map_or(true, |(_, len)| token.len() > len) {
                best = Some((idx, token.len()));
            }
        }

        best
    }
}
