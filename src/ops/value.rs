//! `value` -- a literal float with no inputs, one output.
//!
//! `value` operations are never placed on the runnable queue: their single
//! output is written directly from the submitted literal when the
//! operation is added to the table, so they are born finished. `execfunc`
//! is `None` to make that short-circuit explicit rather than implicit in
//! the scheduler.

use crate::catalog::{OperationType, OutputSocketType};

pub fn operation_type() -> OperationType {
    OperationType {
        name: "value",
        inputs: vec![],
        outputs: vec![OutputSocketType { name: "value" }],
        execfunc: None,
    }
}
