//! `div` -- two-input, one-output quotient (`a / b`).
//!
//! Division by zero is treated as an execution failure rather than let
//! through to produce an infinity or NaN: it is reported on the worker's
//! failure channel like any other `execfunc` error, per the run-level
//! failure handling in [`crate::scheduled`].

use crate::catalog::{InputSocketType, OperationType, OutputSocketType};

pub fn operation_type() -> OperationType {
    OperationType {
        name: "div",
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
        execfunc: Some(|inputs| {
            if inputs[1] == 0.0 {
                Err("division by zero".to_string())
            } else {
                Ok(vec![inputs[0] / inputs[1]])
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides_a_by_b() {
        let op = operation_type();
        let outputs = (op.execfunc.unwrap())(&[10.0, 4.0]).unwrap();
        assert_eq!(outputs, vec![2.5]);
    }

    #[test]
    fn division_by_zero_fails() {
        let op = operation_type();
        let result = (op.execfunc.unwrap())(&[1.0, 0.0]);
        assert!(result.is_err());
    }
}
