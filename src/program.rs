//! Postfix programs
//!
//! A program is the compiled form of a formula: a flat sequence of
//! instructions in Reverse Polish order, consumed left to right by the
//! evaluator.

use std::fmt;
use std::iter::FromIterator;
use std::slice;
use std::sync::Arc;

use crate::func::Definition;
use crate::op::{Operator, OperatorKind};

/// A single postfix instruction
#[derive(Clone)]
pub enum Instruction {
    /// A numeric literal
    Constant(f64),
    /// A slot in the argument vector
    Parameter(usize),
    /// A unary or binary arithmetic operator
    Operator(&'static Operator),
    /// A call into another function, consuming `arity` operands
    Invoke {
        callee: Arc<Definition>,
        arity: usize,
    },
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constant(x), Self::Constant(y)) => x == y,
            (Self::Parameter(x), Self::Parameter(y)) => x == y,
            (Self::Operator(x), Self::Operator(y)) => x == y,
            (
                Self::Invoke {
                    callee: x,
                    arity: x_arity,
                },
                Self::Invoke {
                    callee: y,
                    arity: y_arity,
                },
            ) => Arc::ptr_eq(x, y) && x_arity == y_arity,
            _ => false,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Parameter(index) => f.debug_tuple("Parameter").field(index).finish(),
            Self::Operator(op) => f.debug_tuple("Operator").field(&op.name()).finish(),
            Self::Invoke { callee, arity } => f
                .debug_struct("Invoke")
                .field("callee", callee.identifier())
                .field("arity", arity)
                .finish(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{}", value),
            Self::Parameter(index) => write!(f, "${}", index),
            Self::Operator(op) => match op.kind() {
                OperatorKind::Unary(_) => write!(f, "neg"),
                _ => write!(f, "{}", op.symbol()),
            },
            Self::Invoke { callee, .. } => write!(f, "[{}]", callee.identifier()),
        }
    }
}

/// An ordered postfix instruction sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Iterate the instructions in compiled order
    pub fn iter(&self) -> slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .iter()
            .map(Instruction::to_string)
            .collect::<Vec<String>>();
        write!(f, "{}", rendered.join(" "))
    }
}

#[cfg(test)]
mod test_program {
    use super::*;
    use crate::op::{self, NEGATIVE};

    fn sample() -> Program {
        vec![
            Instruction::Parameter(0),
            Instruction::Constant(2.5),
            Instruction::Operator(op::binary('+').unwrap()),
            Instruction::Operator(&NEGATIVE),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut program = Program::new();
        assert!(program.is_empty());
        program.append(Instruction::Constant(1.0));
        program.append(Instruction::Parameter(3));
        assert_eq!(program.len(), 2);
        assert_eq!(
            program.iter().cloned().collect::<Vec<Instruction>>(),
            vec![Instruction::Constant(1.0), Instruction::Parameter(3)]
        );
    }

    #[test]
    fn test_iteration_is_restartable() {
        let program = sample();
        let first: Vec<&Instruction> = program.iter().collect();
        let second: Vec<&Instruction> = (&program).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(sample().to_string(), "$0 2.5 + neg");
        assert_eq!(Program::new().to_string(), "");
    }
}
