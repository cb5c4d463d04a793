//! Named algebraic formulas, compiled to postfix programs
//!
//! A function is declared from an identifier such as `f(a, b, c)` and a
//! formula such as `(a + b) ^ c`. The formula is compiled against a
//! [`Namespace`] into a postfix [`Program`], which is then evaluated on a
//! small stack machine each time the function is invoked. Formulas may
//! call any function already defined in their namespace, matched by name
//! and argument count, so definitions compose.
//!
//! ```rust
//! use mathfunc_rs::{Function, Namespace};
//!
//! let ns = Namespace::new();
//! let f = Function::new_in(&ns, "f(a, b, c)", "(a + b) ^ c").unwrap();
//! let g = Function::new_in(&ns, "g(x)", "f(x, x, 2) - 1").unwrap();
//!
//! assert_eq!(f.invoke(&[1.0, 2.0, 2.0]).unwrap(), 9.0);
//! assert_eq!(g.invoke(&[1.5]).unwrap(), 8.0);
//! ```
//!
//! Operators are `+ - * / % ^` plus a prefix `-`, with the usual
//! precedence (`^` binds tightest, then negation, then `* / %`, then
//! `+ -`). All binary operators, `^` included, associate to the left.
//!
//! The default namespace, [`Namespace::global`], comes with `sin`, `cos`,
//! `tan`, `sinh`, `cosh`, `tanh`, `asin`, `acos`, `atan`, `atan2(y, x)`,
//! `exp`, `ln`, `log(x)` (base 10), `log(base, x)`, `ceil` and `floor`.
//! Namespaces created with [`Namespace::new`] start out empty.

mod compile;
mod error;
mod func;
mod ident;
mod lex;
mod namespace;
mod program;

pub mod builtin;
pub mod eval;
pub mod op;

pub use error::{Error, FormulaError};
pub use func::{Definition, Function, NativeFn};
pub use ident::Identifier;
pub use namespace::{Namespace, NamespaceOptions};
pub use op::Operator;
pub use program::{Instruction, Program};
