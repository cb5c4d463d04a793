//! Stack machine evaluation of postfix programs

use crate::error::Error;
use crate::op::OperatorKind;
use crate::program::{Instruction, Program};

/// Run `program` against `arguments`
///
/// The only error raised is a division or modulo by zero. A malformed
/// program (an operator without enough operands, a parameter slot past the
/// end of `arguments`, leftover operands) evaluates to NaN, as does an
/// empty program.
///
/// ```rust
/// use mathfunc_rs::eval::evaluate;
/// use mathfunc_rs::{Instruction, Program};
///
/// let program: Program = vec![Instruction::Parameter(0), Instruction::Constant(2.0)]
///     .into_iter()
///     .collect();
/// assert!(evaluate(&program, &[1.0]).unwrap().is_nan());
/// assert!(evaluate(&Program::new(), &[]).unwrap().is_nan());
/// ```
pub fn evaluate(program: &Program, arguments: &[f64]) -> Result<f64, Error> {
    let mut stack: Vec<f64> = Vec::with_capacity(program.len());

    for instruction in program {
        match instruction {
            Instruction::Constant(value) => stack.push(*value),
            Instruction::Parameter(index) => match arguments.get(*index) {
                Some(value) => stack.push(*value),
                None => return Ok(f64::NAN),
            },
            Instruction::Operator(op) => match op.kind() {
                OperatorKind::Unary(rule) => match stack.pop() {
                    Some(operand) => stack.push(rule(operand)),
                    None => return Ok(f64::NAN),
                },
                OperatorKind::Binary(rule) => {
                    // First pop is the right operand
                    let (lhs, rhs) = match (stack.pop(), stack.pop()) {
                        (Some(rhs), Some(lhs)) => (lhs, rhs),
                        _ => return Ok(f64::NAN),
                    };
                    stack.push(rule(lhs, rhs)?);
                }
                OperatorKind::Bracket => return Ok(f64::NAN),
            },
            Instruction::Invoke { callee, arity } => {
                if stack.len() < *arity {
                    return Ok(f64::NAN);
                }
                let operands = stack.split_off(stack.len() - arity);
                stack.push(callee.evaluate(&operands)?);
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(result), true) => Ok(result),
        _ => Ok(f64::NAN),
    }
}
