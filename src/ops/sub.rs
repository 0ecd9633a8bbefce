//! `sub` -- two-input, one-output difference (`a - b`).

use crate::catalog::{InputSocketType, OperationType, OutputSocketType};

pub fn operation_type() -> OperationType {
    OperationType {
        name: "sub",
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
        execfunc: Some(|inputs| Ok(vec![inputs[0] - inputs[1]])),
    }
}
