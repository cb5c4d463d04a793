//! Lexical validation and tokenizing
//!
//! Formula text is normalized before it is parsed: whitespace is removed,
//! except that whitespace between two alphanumeric characters is rejected
//! as ambiguous (`a b` is an error, while `a *b` is simply `a*b`). `.` and
//! `_` are not alphanumeric, so `1 .5` reads as `1.5`. Brackets must pair up.

use std::collections::HashSet;
use std::str::FromStr;

use crate::error::FormulaError;
use crate::ident::Identifier;
use crate::op;

/// Remove whitespace, rejecting whitespace between two alphanumeric characters
pub fn strip_spaces(text: &str) -> Result<String, FormulaError> {
    let chars: Vec<char> = text.chars().collect();
    let mut stripped = String::with_capacity(text.len());
    let mut previous: Option<char> = None;

    for (i, c) in chars.iter().enumerate() {
        if !c.is_whitespace() {
            stripped.push(*c);
            previous = Some(*c);
            continue;
        }
        let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
        match (previous, next) {
            (Some(prev), Some(next)) if prev.is_alphanumeric() && next.is_alphanumeric() => {
                return Err(FormulaError::InvalidSpacing)
            }
            _ => {}
        }
    }
    Ok(stripped)
}

/// Check bracket pairing, returning the number of pairs
pub fn count_bracket_pairs(text: &str) -> Result<usize, FormulaError> {
    let mut depth = 0usize;
    let mut pairs = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or(FormulaError::UnpairedBrackets)?;
                pairs += 1;
            }
            _ => {}
        }
    }
    match depth {
        0 => Ok(pairs),
        _ => Err(FormulaError::UnpairedBrackets),
    }
}

/// Whether `word` may name a function or a parameter
pub fn is_name(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Parse a run as a numeric literal if the whole run is one
///
/// Only runs starting with a digit or a `.` are candidates, so names
/// like `inf` or `nan` stay available as parameters.
pub fn parse_number(word: &str) -> Option<f64> {
    match word.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '.' => f64::from_str(word).ok(),
        _ => None,
    }
}

/// The declared half of a definition: `name(param, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    text: String,
    identifier: Identifier,
    parameters: Vec<String>,
}

impl Signature {
    pub fn parse(text: &str, max_parameters: usize) -> Result<Self, FormulaError> {
        let stripped = strip_spaces(text)?;
        if stripped.chars().any(|c| op::binary(c).is_some()) {
            return Err(FormulaError::InvalidIdentifier(
                "operators are not allowed in an identifier".into(),
            ));
        }
        if count_bracket_pairs(&stripped)? != 1 {
            return Err(FormulaError::InvalidIdentifier(
                "expected exactly one pair of brackets".into(),
            ));
        }

        let (open, close) = match (stripped.find('('), stripped.rfind(')')) {
            (Some(open), Some(close)) => (open, close),
            _ => return Err(FormulaError::UnpairedBrackets),
        };
        if close != stripped.len() - 1 {
            return Err(FormulaError::InvalidIdentifier(format!(
                "unexpected characters after '{}'",
                &stripped[..=close]
            )));
        }

        let name = &stripped[..open];
        if !is_name(name) {
            return Err(FormulaError::InvalidIdentifier(format!(
                "'{}' is not a valid function name",
                name
            )));
        }

        let inner = &stripped[open + 1..close];
        let parameters = match inner {
            "" => Vec::new(),
            _ => inner.split(',').map(String::from).collect::<Vec<String>>(),
        };
        if parameters.len() > max_parameters {
            return Err(FormulaError::TooManyParameters {
                limit: max_parameters,
                actual: parameters.len(),
            });
        }

        let mut seen = HashSet::with_capacity(parameters.len());
        for param in parameters.iter() {
            if !is_name(param) {
                return Err(FormulaError::InvalidParameter(param.clone()));
            }
            if !seen.insert(param.as_str()) {
                return Err(FormulaError::ConflictingVariable(param.clone()));
            }
        }

        Ok(Self {
            identifier: Identifier::new(name, parameters.len()),
            text: stripped,
            parameters,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Parameter names, indexed by argument slot
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    /// A run of characters between delimiters
    Word(&'a str),
    /// One of the delimiter characters
    Symbol(char),
}

/// Split normalized formula text on the delimiter set
pub fn tokenize(formula: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (i, c) in formula.char_indices() {
        if op::is_delimiter(c) {
            if i > start {
                tokens.push(Token::Word(&formula[start..i]));
            }
            tokens.push(Token::Symbol(c));
            start = i + c.len_utf8();
        }
    }
    if formula.len() > start {
        tokens.push(Token::Word(&formula[start..]));
    }
    tokens
}
