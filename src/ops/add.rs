//! `add` -- two-input, one-output sum.

use crate::catalog::{InputSocketType, OperationType, OutputSocketType};

pub fn operation_type() -> OperationType {
    OperationType {
        name: "add",
        inputs: vec![
            InputSocketType {
                name: "a",
                default: 0.0,
            },
            InputSocketType {
                name: "b",
                default: 0.0,
            },
        ],
        outputs: vec![OutputSocketType { name: "result" }],
        execfunc: Some(|inputs| Ok(vec![inputs[0] + inputs[1]])),
    }
}
