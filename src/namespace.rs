//! Namespaces
//!
//! A namespace is the symbol table formulas are compiled against. It maps
//! each [`Identifier`] to the shared, immutable [`Definition`] behind it.
//! Compiled programs hold their callees by `Arc`, so a definition stays
//! alive for as long as anything invokes it, whatever happens to the
//! table entry.

use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::builtin;
use crate::compile::Compiler;
use crate::error::{Error, FormulaError};
use crate::func::Definition;
use crate::ident::Identifier;
use crate::lex::{self, Signature};

static DEFAULT_NAMESPACE: Lazy<Namespace> = Lazy::new(|| {
    let namespace = Namespace::new();
    if let Err(err) = builtin::install(&namespace) {
        warn!("Could not install built-in functions: {}", err);
    }
    namespace
});

/// Limits applied to a namespace and to the formulas compiled against it
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceOptions {
    /// Maximum number of distinct functions (default: 65537)
    pub capacity: usize,
    /// Maximum parameters per function (default: 257)
    pub max_parameters: usize,
    /// Maximum nesting of function calls within one formula (default: 64)
    pub max_nesting: usize,
    /// Maximum length of a chain of functions calling one another, counting
    /// the function being defined (default: 256)
    pub max_depth: usize,
}

impl Default for NamespaceOptions {
    fn default() -> Self {
        Self {
            capacity: 65537,
            max_parameters: 257,
            max_nesting: 64,
            max_depth: 256,
        }
    }
}

#[derive(Debug)]
enum Slot {
    /// Claimed by a formula that is still compiling
    Reserved,
    Defined(Entry),
}

#[derive(Debug)]
struct Entry {
    definition: Arc<Definition>,
    /// Set once another compiled program invokes this definition
    referenced: bool,
}

/// The table behind a [`Namespace`]
#[derive(Debug)]
pub(crate) struct SymbolTable {
    options: NamespaceOptions,
    slots: HashMap<Identifier, Slot>,
}

impl SymbolTable {
    pub fn new(options: NamespaceOptions) -> Self {
        Self {
            options,
            slots: HashMap::new(),
        }
    }

    pub fn options(&self) -> &NamespaceOptions {
        &self.options
    }

    fn claim(&mut self, identifier: &Identifier) -> Result<(), FormulaError> {
        if self.slots.contains_key(identifier) {
            return Err(FormulaError::ConflictingFunction(identifier.clone()));
        }
        if self.slots.len() >= self.options.capacity {
            return Err(FormulaError::NamespaceFull(self.options.capacity));
        }
        self.slots.insert(identifier.clone(), Slot::Reserved);
        Ok(())
    }

    /// Add a definition. Never overwrites an existing entry.
    pub fn register(&mut self, definition: Arc<Definition>) -> Result<(), FormulaError> {
        let identifier = definition.identifier().clone();
        self.claim(&identifier)?;
        self.slots.insert(
            identifier,
            Slot::Defined(Entry {
                definition,
                referenced: false,
            }),
        );
        Ok(())
    }

    /// The installed definition for `identifier`, if any. Reservations
    /// do not resolve.
    pub fn resolve(&self, identifier: &Identifier) -> Option<&Arc<Definition>> {
        match self.slots.get(identifier) {
            Some(Slot::Defined(entry)) => Some(&entry.definition),
            _ => None,
        }
    }

    fn entry(&self, identifier: &Identifier) -> Option<&Entry> {
        match self.slots.get(identifier) {
            Some(Slot::Defined(entry)) => Some(entry),
            _ => None,
        }
    }

    fn mark_referenced(&mut self, identifier: &Identifier) {
        if let Some(Slot::Defined(entry)) = self.slots.get_mut(identifier) {
            entry.referenced = true;
        }
    }

    /// Compile `name(params) = formula` and install it
    ///
    /// The identifier is reserved before the formula body is parsed, so a
    /// body calling its own identifier is caught. Any failure removes the
    /// reservation again.
    fn define(&mut self, ident: &str, formula: &str) -> Result<Arc<Definition>, Error> {
        let raw = format!("{}={}", ident, formula);
        let signature = Signature::parse(ident, self.options.max_parameters)
            .map_err(|reason| Error::formula(raw.as_str(), reason))?;
        let body = lex::strip_spaces(formula)
            .and_then(|body| lex::count_bracket_pairs(&body).map(|_| body))
            .map_err(|reason| Error::formula(raw.as_str(), reason))?;
        let expression = format!("{}={}", signature.text(), body);

        self.claim(signature.identifier())
            .map_err(|reason| Error::formula(expression.as_str(), reason))?;

        let compiled = Compiler::new(self, &signature, &body)
            .compile()
            .and_then(|compiled| self.call_depth(&compiled.callees).map(|depth| (compiled, depth)));
        let (compiled, depth) = match compiled {
            Ok(compiled) => compiled,
            Err(reason) => {
                self.slots.remove(signature.identifier());
                debug!("Rejected '{}': {}", expression, reason);
                return Err(Error::formula(expression, reason));
            }
        };

        trace!("Compiled '{}' to '{}'", expression, compiled.program);
        let definition = Arc::new(Definition::compiled(
            signature.identifier().clone(),
            expression,
            compiled.program,
            depth,
        ));
        self.slots.insert(
            signature.identifier().clone(),
            Slot::Defined(Entry {
                definition: Arc::clone(&definition),
                referenced: false,
            }),
        );
        compiled
            .callees
            .iter()
            .for_each(|callee| self.mark_referenced(callee));
        debug!("Defined {}", definition.identifier());
        Ok(definition)
    }

    /// Depth of a definition invoking `callees`, checked against the limit
    ///
    /// Evaluation recurses once per level, so the limit bounds the stack an
    /// invocation can use.
    fn call_depth(&self, callees: &[Identifier]) -> Result<usize, FormulaError> {
        let depth = 1 + callees
            .iter()
            .filter_map(|callee| self.resolve(callee))
            .map(|callee| callee.depth())
            .max()
            .unwrap_or(0);
        if depth > self.options.max_depth {
            return Err(FormulaError::CallChainTooDeep {
                limit: self.options.max_depth,
                actual: depth,
            });
        }
        Ok(depth)
    }

    fn unregister(&mut self, identifier: &Identifier) -> Result<Arc<Definition>, Error> {
        match self.entry(identifier) {
            None => return Err(Error::UndefinedFunction(identifier.clone())),
            Some(entry) if entry.referenced => {
                warn!("Refusing to remove {}: still referenced", identifier);
                return Err(Error::ReferencedFunction(identifier.clone()));
            }
            Some(_) => {}
        }
        match self.slots.remove(identifier) {
            Some(Slot::Defined(entry)) => {
                debug!("Removed {}", identifier);
                Ok(entry.definition)
            }
            _ => Err(Error::UndefinedFunction(identifier.clone())),
        }
    }

    /// Hand a dropped caller-owned definition back to the table
    fn release(&mut self, definition: &Arc<Definition>) {
        let identifier = definition.identifier();
        let referenced = match self.entry(identifier) {
            Some(entry) if Arc::ptr_eq(&entry.definition, definition) => entry.referenced,
            // The entry was removed or now belongs to someone else
            _ => return,
        };
        if referenced {
            // The table keeps the same body alive in place of the dropped
            // handle, so existing Invoke instructions stay valid.
            debug!(
                "{} dropped while referenced; namespace keeps its definition",
                identifier
            );
        } else {
            self.slots.remove(identifier);
            debug!("{} dropped and removed", identifier);
        }
    }
}

/// A shared handle to a symbol table of functions
///
/// Cloning a `Namespace` is cheap and yields another handle to the same
/// table. Functions compiled against a namespace can invoke any function
/// that was defined in it before them, matched by name and argument count.
///
/// ```rust
/// use mathfunc_rs::{Function, Identifier, Namespace};
///
/// let ns = Namespace::new();
/// let f = Function::new_in(&ns, "f(a, b, c)", "(a + b) ^ c").unwrap();
/// let g = Function::new_in(&ns, "g(x)", "f(x, 1, 2) * 2").unwrap();
///
/// assert_eq!(g.invoke(&[2.0]).unwrap(), 18.0);
/// assert!(ns.contains(&Identifier::new("f", 3)));
/// assert!(f.is_referenced());
/// ```
#[derive(Clone)]
pub struct Namespace {
    table: Arc<RwLock<SymbolTable>>,
}

impl Namespace {
    /// An empty namespace with default options
    pub fn new() -> Self {
        Self::with_options(NamespaceOptions::default())
    }

    pub fn with_options(options: NamespaceOptions) -> Self {
        Self {
            table: Arc::new(RwLock::new(SymbolTable::new(options))),
        }
    }

    /// The process-wide default namespace, with the built-in functions
    /// (`sin`, `log`, `atan2`, ...) pre-registered
    pub fn global() -> Self {
        DEFAULT_NAMESPACE.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, SymbolTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SymbolTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn options(&self) -> NamespaceOptions {
        self.read().options().clone()
    }

    /// Compile a function owned by the namespace itself
    ///
    /// Unlike [`Function::new_in`](crate::Function::new_in), no handle is
    /// returned; the function lives until it is unregistered.
    pub fn define(&self, ident: &str, formula: &str) -> Result<Identifier, Error> {
        self.compile(ident, formula)
            .map(|definition| definition.identifier().clone())
    }

    pub(crate) fn compile(&self, ident: &str, formula: &str) -> Result<Arc<Definition>, Error> {
        self.write().define(ident, formula)
    }

    /// Add a prebuilt definition, such as a native function
    ///
    /// A definition whose identifier is already taken is rejected, never
    /// overwritten.
    pub fn register(&self, definition: Definition) -> Result<Arc<Definition>, Error> {
        let definition = Arc::new(definition);
        self.write()
            .register(Arc::clone(&definition))
            .map_err(|reason| Error::formula(definition.expression(), reason))?;
        debug!("Registered {}", definition.identifier());
        Ok(definition)
    }

    pub fn lookup(&self, identifier: &Identifier) -> Option<Arc<Definition>> {
        self.read().resolve(identifier).cloned()
    }

    /// Remove a function, unless another function's program invokes it
    pub fn unregister(&self, identifier: &Identifier) -> Result<(), Error> {
        self.write().unregister(identifier).map(|_| ())
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.read().resolve(identifier).is_some()
    }

    /// Whether some compiled program invokes `identifier`
    pub fn is_referenced(&self, identifier: &Identifier) -> bool {
        self.read()
            .entry(identifier)
            .map(|entry| entry.referenced)
            .unwrap_or(false)
    }

    pub(crate) fn is_referenced_definition(&self, definition: &Arc<Definition>) -> bool {
        self.read()
            .entry(definition.identifier())
            .map(|entry| Arc::ptr_eq(&entry.definition, definition) && entry.referenced)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All defined identifiers, sorted
    pub fn identifiers(&self) -> Vec<Identifier> {
        let mut identifiers = self
            .read()
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Defined(_)))
            .map(|(identifier, _)| identifier.clone())
            .collect::<Vec<Identifier>>();
        identifiers.sort();
        identifiers
    }

    /// Look up and invoke a function by identifier
    pub fn invoke(&self, identifier: &Identifier, arguments: &[f64]) -> Result<f64, Error> {
        let definition = self
            .lookup(identifier)
            .ok_or_else(|| Error::UndefinedFunction(identifier.clone()))?;
        definition.invoke(arguments)
    }

    pub(crate) fn release(&self, definition: &Arc<Definition>) {
        self.write().release(definition)
    }

    /// Whether both handles refer to the same table
    pub fn ptr_eq(&self, other: &Namespace) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("functions", &self.identifiers())
            .finish()
    }
}
