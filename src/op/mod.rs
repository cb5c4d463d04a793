//! Operators
//!
//! This module contains the global operator catalog. Binary operators are
//! looked up by the delimiter character that spells them. The unary
//! negative shares its `-` with subtraction, so it is resolved by the
//! compiler from context and lives outside the map, as does the bracket
//! marker that only exists on the compiler's operator stack.

use phf::phf_map;
use std::fmt;

use crate::error::Error;

mod numeric;

/// Characters that split a formula into operand runs
pub const DELIMITERS: &[char] = &['+', '-', '*', '/', '%', '^', '(', ')', ','];

pub static OPERATOR_MAP: phf::Map<char, Operator> = phf_map! {
    '+' => Operator {
        symbol: '+',
        name: "addition",
        precedence: 1,
        kind: OperatorKind::Binary(numeric::add),
    },
    '-' => Operator {
        symbol: '-',
        name: "subtraction",
        precedence: 1,
        kind: OperatorKind::Binary(numeric::subtract),
    },
    '*' => Operator {
        symbol: '*',
        name: "multiplication",
        precedence: 2,
        kind: OperatorKind::Binary(numeric::multiply),
    },
    '/' => Operator {
        symbol: '/',
        name: "division",
        precedence: 2,
        kind: OperatorKind::Binary(numeric::divide),
    },
    '%' => Operator {
        symbol: '%',
        name: "modulo",
        precedence: 2,
        kind: OperatorKind::Binary(numeric::modulo),
    },
    '^' => Operator {
        symbol: '^',
        name: "power",
        precedence: 4,
        kind: OperatorKind::Binary(numeric::power),
    },
};

/// Prefix `-`, e.g. in `-a` or `2*-a`
pub static NEGATIVE: Operator = Operator {
    symbol: '-',
    name: "negative",
    precedence: 3,
    kind: OperatorKind::Unary(numeric::negative),
};

/// Marker for an open `(` on the compiler's operator stack. Never emitted.
pub static LEFT_BRACKET: Operator = Operator {
    symbol: '(',
    name: "left bracket",
    precedence: 0,
    kind: OperatorKind::Bracket,
};

pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// Look up the binary operator spelled by `symbol`
pub fn binary(symbol: char) -> Option<&'static Operator> {
    OPERATOR_MAP.get(&symbol)
}

pub type UnaryFn = fn(f64) -> f64;
pub type BinaryFn = fn(f64, f64) -> Result<f64, Error>;

#[derive(Clone, Copy)]
pub enum OperatorKind {
    Unary(UnaryFn),
    Binary(BinaryFn),
    Bracket,
}

pub struct Operator {
    symbol: char,
    name: &'static str,
    precedence: u8,
    kind: OperatorKind,
}
impl Operator {
    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    pub fn is_unary(&self) -> bool {
        matches!(self.kind, OperatorKind::Unary(_))
    }

    pub fn is_bracket(&self) -> bool {
        matches!(self.kind, OperatorKind::Bracket)
    }
}
impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.name == other.name
    }
}
impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("name", &self.name)
            .field("precedence", &self.precedence)
            .field("operator", &"<operator fn>")
            .finish()
    }
}

#[cfg(test)]
mod test_operators {
    use super::*;

    /// All operators symbols must match their keys
    #[test]
    fn test_operator_map_symbols() {
        OPERATOR_MAP
            .entries()
            .for_each(|(k, op)| assert_eq!(*k, op.symbol))
    }

    #[test]
    fn test_operator_map_is_binary() {
        OPERATOR_MAP
            .values()
            .for_each(|op| assert!(matches!(op.kind, OperatorKind::Binary(_))))
    }

    #[test]
    fn test_every_operator_is_a_delimiter() {
        OPERATOR_MAP.keys().for_each(|k| assert!(is_delimiter(*k)));
        assert!(is_delimiter(LEFT_BRACKET.symbol));
        assert!(is_delimiter(NEGATIVE.symbol));
    }

    fn precedence_cases() -> Vec<(&'static Operator, u8)> {
        vec![
            (&LEFT_BRACKET, 0),
            (binary('+').unwrap(), 1),
            (binary('-').unwrap(), 1),
            (binary('*').unwrap(), 2),
            (binary('/').unwrap(), 2),
            (binary('%').unwrap(), 2),
            (&NEGATIVE, 3),
            (binary('^').unwrap(), 4),
        ]
    }

    #[test]
    fn test_precedence_table() {
        precedence_cases().into_iter().for_each(|(op, exp)| {
            println!("{:?}", op);
            assert_eq!(op.precedence(), exp);
        })
    }

    #[test]
    fn test_negative_is_not_subtraction() {
        assert_ne!(&NEGATIVE, binary('-').unwrap());
        assert!(NEGATIVE.is_unary());
        assert!(!binary('-').unwrap().is_unary());
    }

    #[test]
    fn test_no_operator_for_separators() {
        assert!(binary(',').is_none());
        assert!(binary(')').is_none());
        assert!(binary('(').is_none());
    }
}
