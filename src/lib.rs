//! Daffy is a runtime for a small dataflow assembly language: instructions
//! declare named operations wired to each other's outputs, and a
//! concurrent scheduler runs them as soon as their dependencies are
//! satisfied.
//!
//! ```text
//! $x: value(value=42.0)
//! $p: print(value=$x.value)
//! ```
//!
//! The pieces, roughly bottom-up:
//!
//! - [`catalog`] declares what an operation type looks like and holds the
//!   built-in types (`value`, `add`, `sub`, `mul`, `div`, `print`).
//! - [`operation`] is the runtime instance of a type: an
//!   [`operation::Operation`] node in the dependency graph, with bound
//!   inputs and computed outputs.
//! - [`parser`] turns one instruction line into `(optype, name, args)`.
//! - [`scheduled`] is the concurrent engine: a worker pool executes
//!   runnable operations, a single updater thread tracks who becomes
//!   runnable next.
//! - [`interpreter`] drives a whole program's instructions through the
//!   parser and scheduler.
//! - [`cli`] is the `daffy` binary's command-line front end.

pub mod catalog;
pub mod cli;
pub mod error;
mod format;
pub mod interpreter;
pub mod operation;
pub mod ops;
pub mod parser;
pub mod scheduled;
