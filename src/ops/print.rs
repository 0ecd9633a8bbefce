//! `print` -- one input, no outputs, writes its bound value to standard
//! output.
//!
//! This is the only built-in with a side effect. It runs on whichever
//! worker thread picks it up, so concurrent `print` operations can
//! interleave at the line level the same way concurrent `println!` calls
//! from any other multi-threaded program would; stdout's own lock keeps
//! each line intact.

use crate::catalog::{InputSocketType, OperationType};
use crate::format::format_float;

pub fn operation_type() -> OperationType {
    OperationType {
        name: "print",
        inputs: vec![InputSocketType {
            name: "value",
            default: 0.0,
        }],
        outputs: vec![],
        execfunc: Some(|inputs| {
            println!("{}", format_float(inputs[0]));
            Ok(vec![])
        }),
    }
}
