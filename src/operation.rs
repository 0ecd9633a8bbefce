//! A single node in the dataflow graph.
//!
//! An [`Operation`] is the runtime instance created when an instruction is
//! submitted: it knows its type, its bound inputs (either a literal default
//! or a reference to another operation's output socket), its output
//! values, and the bookkeeping the scheduler needs to know when it becomes
//! runnable and who to wake once it finishes.

/// One bound input of an operation.
#[derive(Debug, Clone)]
pub struct InputSocket {
    /// The socket name, matching an [`crate::catalog::InputSocketType`] on
    /// the operation's type.
    pub name: &'static str,
    /// The value used if `source` is `None`.
    pub default: f64,
    /// When bound to another operation's output: its index in the
    /// scheduler's table, and the name of the output socket being read.
    pub source: Option<(usize, &'static str)>,
}

/// One output of an operation, written once by its execution.
#[derive(Debug, Clone)]
pub struct OutputSocket {
    /// The socket name, matching an
    /// [`crate::catalog::OutputSocketType`] on the operation's type.
    pub name: &'static str,
    /// The value produced by execution. Reads of another operation's
    /// output socket are only valid after that operation's `finished`
    /// flag is observed true; the scheduler's queue handoffs are what
    /// make that ordering visible across threads.
    pub value: f64,
}

/// A node in the dataflow graph, as tracked by the scheduler's table.
#[derive(Debug, Clone)]
pub struct Operation {
    /// The name of its [`crate::catalog::OperationType`].
    pub type_name: &'static str,
    /// The name given in the instruction that created it.
    pub name: String,
    /// Bound inputs, in the type's declared order.
    pub inputs: Vec<InputSocket>,
    /// Outputs, in the type's declared order. Holds zeroed placeholders
    /// until the operation executes.
    pub outputs: Vec<OutputSocket>,
    /// Count of unfinished operations this one is waiting on. The
    /// operation becomes runnable exactly when this reaches zero.
    pub waiting_on: u32,
    /// Indices, in the scheduler's table, of operations whose inputs
    /// reference one of this operation's outputs. Drained by the updater
    /// each time this operation finishes.
    pub blocking: Vec<usize>,
    /// Set by the updater once this operation's execution (or, for
    /// `value`, its construction) has completed.
    pub finished: bool,
}

impl Operation {
    /// The ordered input values to hand to the operation type's execution
    /// function: each bound input's source value if finished, its default
    /// otherwise (defaults are also used for `value` operations, which are
    /// never executed).
    pub fn resolved_inputs(&self, outputs_of: impl Fn(usize, &str) -> f64) -> Vec<f64> {
        self.inputs
            .iter()
            .map(|socket| match socket.source {
                Some((src_idx, output_name)) => outputs_of(src_idx, output_name),
                None => socket.default,
            })
            .collect()
    }
}
