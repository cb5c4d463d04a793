//! Functions

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::eval;
use crate::ident::Identifier;
use crate::namespace::Namespace;
use crate::program::Program;

/// Evaluation rule of a native function. Receives exactly `arity` values.
pub type NativeFn = fn(&[f64]) -> f64;

enum Body {
    Formula(Program),
    Native(NativeFn),
}

/// The immutable body of a function, shared between its namespace entry,
/// its owner, and every program that invokes it
pub struct Definition {
    identifier: Identifier,
    expression: String,
    body: Body,
    depth: usize,
}

impl Definition {
    pub(crate) fn compiled(
        identifier: Identifier,
        expression: String,
        program: Program,
        depth: usize,
    ) -> Self {
        Self {
            identifier,
            expression,
            body: Body::Formula(program),
            depth,
        }
    }

    /// A function evaluated by a Rust rule rather than a formula
    ///
    /// ```rust
    /// use mathfunc_rs::{Definition, Function, Namespace};
    ///
    /// let ns = Namespace::new();
    /// ns.register(Definition::native("hypot", 2, |args| args[0].hypot(args[1])))
    ///     .unwrap();
    /// let f = Function::new_in(&ns, "f(x)", "hypot(x, 4)").unwrap();
    /// assert_eq!(f.invoke(&[3.0]).unwrap(), 5.0);
    /// ```
    pub fn native<S: Into<String>>(name: S, arity: usize, rule: NativeFn) -> Self {
        let identifier = Identifier::new(name, arity);
        Self {
            expression: format!("{}=<native>", identifier),
            identifier,
            body: Body::Native(rule),
            depth: 1,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The normalized source text, e.g. `f(a,b,c)=(a+b)^c`
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The compiled program; `None` for native functions
    pub fn program(&self) -> Option<&Program> {
        match &self.body {
            Body::Formula(program) => Some(program),
            Body::Native(_) => None,
        }
    }

    /// Longest chain of nested evaluations one invocation can make,
    /// counting this function. A function that calls nothing has depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, Body::Native(_))
    }

    /// Invoke with arguments, which must match the declared arity
    pub fn invoke(&self, arguments: &[f64]) -> Result<f64, Error> {
        if arguments.len() != self.identifier.arity() {
            return Err(Error::WrongArgumentCount {
                identifier: self.identifier.clone(),
                expected: self.identifier.arity(),
                actual: arguments.len(),
            });
        }
        self.evaluate(arguments)
    }

    /// Evaluate without the arity check
    ///
    /// Used for calls out of compiled programs, whose argument counts were
    /// fixed at compile time.
    pub(crate) fn evaluate(&self, arguments: &[f64]) -> Result<f64, Error> {
        match &self.body {
            Body::Formula(program) => eval::evaluate(program, arguments),
            Body::Native(rule) => {
                if arguments.len() != self.identifier.arity() {
                    return Ok(f64::NAN);
                }
                Ok(rule(arguments))
            }
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("identifier", &self.identifier)
            .field("expression", &self.expression)
            .field("depth", &self.depth)
            .finish()
    }
}

/// A caller-owned function compiled from a formula
///
/// The function is registered in its namespace for as long as the
/// `Function` lives, and other formulas may call it by name. Dropping it
/// removes it from the namespace, unless some other function's program
/// invokes it. In that case the namespace keeps the definition, with the
/// same identifier and program, so those callers keep working.
///
/// ```rust
/// use mathfunc_rs::Function;
///
/// let f = Function::new("f_doc(a, b, c)", "(a + b) ^ c").unwrap();
/// let g = Function::new("g_doc(x, y, z)", "log(f_doc(x, y, z) - 1)").unwrap();
///
/// let expected = (3.0f64.powf(0.03) - 1.0).log10();
/// assert!((g.invoke(&[1.0, 2.0, 0.03]).unwrap() - expected).abs() < 1e-12);
/// ```
pub struct Function {
    namespace: Namespace,
    definition: Arc<Definition>,
}

impl Function {
    /// Compile `formula` as `ident` in the default namespace
    pub fn new(ident: &str, formula: &str) -> Result<Self, Error> {
        Self::new_in(&Namespace::global(), ident, formula)
    }

    /// Compile `formula` as `ident` in `namespace`
    pub fn new_in(namespace: &Namespace, ident: &str, formula: &str) -> Result<Self, Error> {
        let definition = namespace.compile(ident, formula)?;
        Ok(Self {
            namespace: namespace.clone(),
            definition,
        })
    }

    pub fn invoke(&self, arguments: &[f64]) -> Result<f64, Error> {
        self.definition.invoke(arguments)
    }

    pub fn identifier(&self) -> &Identifier {
        self.definition.identifier()
    }

    pub fn expression(&self) -> &str {
        self.definition.expression()
    }

    pub fn program(&self) -> Option<&Program> {
        self.definition.program()
    }

    pub fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Whether another compiled function invokes this one
    pub fn is_referenced(&self) -> bool {
        self.namespace.is_referenced_definition(&self.definition)
    }
}

impl Drop for Function {
    fn drop(&mut self) {
        debug!("Releasing {}", self.definition.identifier());
        self.namespace.release(&self.definition);
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("identifier", self.identifier())
            .field("expression", &self.expression())
            .field("referenced", &self.is_referenced())
            .finish()
    }
}
