//! The operation type catalog.
//!
//! A [`Catalog`] is a process-wide table mapping an operation type's name
//! (`"add"`, `"print"`, ...) to its declared socket shape and, for types
//! that do real work, the function that computes its outputs. Embedders
//! extend the catalog by registering their own [`OperationType`]s before
//! handing it to a [`crate::scheduled::Scheduler`]; nothing about the
//! scheduler or the parser is specific to the five built-ins.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::CatalogError;

/// A single declared input of an operation type.
#[derive(Debug, Clone, Copy)]
pub struct InputSocketType {
    /// The socket's name, as it appears on the left of `=` in an argument.
    pub name: &'static str,
    /// The value used when an instruction omits this argument.
    pub default: f64,
}

/// A single declared output of an operation type.
#[derive(Debug, Clone, Copy)]
pub struct OutputSocketType {
    /// The socket's name, as it appears after the `.` in a reference
    /// argument (`$other.result`).
    pub name: &'static str,
}

/// The function that computes an operation type's outputs from its bound
/// inputs, in declaration order. Returns one value per declared output, in
/// declaration order.
///
/// Built-in types never fail; the `Result` exists so embedders can register
/// types that do (a network fetch, a parse of user data, ...) without the
/// scheduler needing a second execution path. An execution failure does not
/// abort the run -- see [`crate::scheduled::Scheduler::wait`].
pub type ExecFn = fn(inputs: &[f64]) -> Result<Vec<f64>, String>;

/// The declared shape -- and, usually, the behavior -- of one kind of
/// operation.
#[derive(Clone)]
pub struct OperationType {
    /// The name instructions use after the `:` (`$name: add(...)`).
    pub name: &'static str,
    /// Declared inputs, in the order arguments are matched against them.
    pub inputs: Vec<InputSocketType>,
    /// Declared outputs, in the order an execution's return values are
    /// assigned to them.
    pub outputs: Vec<OutputSocketType>,
    /// `None` for types with no outputs to compute (currently only
    /// `value`, whose single output is supplied directly at submission
    /// time rather than produced by running anything).
    pub execfunc: Option<ExecFn>,
}

/// The set of operation types a scheduler run knows how to execute.
pub struct Catalog {
    types: HashMap<&'static str, OperationType>,
}

impl Catalog {
    /// An empty catalog with no registered types, not even the built-ins.
    pub fn empty() -> Self {
        Catalog {
            types: HashMap::new(),
        }
    }

    /// A catalog pre-loaded with the five built-in operation types, in the
    /// order `value`, `add`, `sub`, `mul`, `div`, `print`.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::empty();
        for op_type in crate::ops::builtins() {
            catalog
                .register(op_type)
                .expect("builtin operation type names are unique");
        }
        catalog
    }

    /// Adds an operation type to the catalog.
    ///
    /// Returns an error if a type with the same name is already
    /// registered; the catalog never silently shadows one type with
    /// another.
    pub fn register(&mut self, op_type: OperationType) -> Result<(), CatalogError> {
        if self.types.contains_key(op_type.name) {
            return Err(CatalogError::OperationTypeAlreadyExists(op_type.name.into()));
        }
        self.types.insert(op_type.name, op_type);
        Ok(())
    }

    /// Looks up a registered operation type by name.
    pub fn find(&self, name: &str) -> Result<&OperationType, CatalogError> {
        self.types
            .get(name)
            .ok_or_else(|| CatalogError::OperationTypeNotFound(name.to_string()))
    }
}

static BUILTIN_CATALOG: OnceLock<Catalog> = OnceLock::new();

/// The process-wide catalog of built-in operation types: built eagerly on
/// first access, in registration order, then shared read-only for the
/// remainder of the process. The CLI binary uses this directly; embedders
/// wanting a different or extended set of types construct their own
/// [`Catalog`] instead.
pub fn builtin_catalog() -> &'static Catalog {
    BUILTIN_CATALOG.get_or_init(Catalog::with_builtins)
}
