//! End-to-end scenarios driving the parser and scheduler together, the way
//! the CLI front end does for each line of a program.

use daffy::catalog::builtin_catalog;
use daffy::error::{DaffyError, SchedulerError};
use daffy::interpreter::run_program;
use daffy::parser::parse_instruction;
use daffy::scheduled::Scheduler;

fn fresh_scheduler() -> Scheduler {
    Scheduler::new(builtin_catalog())
}

#[test]
fn scenario_a_literal_print() {
    let scheduler = fresh_scheduler();
    let program = ["$x: value(value=42.0)", "$p: print(value=$x.value)"];
    assert!(run_program(program, &scheduler));
    assert_eq!(scheduler.output_value("x", "value"), Some(42.0));
}

#[test]
fn scenario_b_arithmetic_chain() {
    let scheduler = fresh_scheduler();
    let program = [
        "$a: value(value=6.0)",
        "$b: value(value=7.0)",
        "$m: mul(a=$a.value, b=$b.value)",
        "$p: print(value=$m.result)",
    ];
    assert!(run_program(program, &scheduler));
    assert_eq!(scheduler.output_value("m", "result"), Some(42.0));
}

#[test]
fn scenario_c_inline_literals_synthesize_value_carriers() {
    let scheduler = fresh_scheduler();
    let program = ["$s: add(a=3.0, b=4.0)", "$p: print(value=$s.result)"];
    assert!(run_program(program, &scheduler));
    assert_eq!(scheduler.output_value("s", "result"), Some(7.0));
    assert_eq!(scheduler.output_value("_s_arg_0", "value"), Some(3.0));
    assert_eq!(scheduler.output_value("_s_arg_1", "value"), Some(4.0));
}

#[test]
fn scenario_d_forward_reference_fails() {
    let scheduler = fresh_scheduler();
    assert!(!run_program(["$p: print(value=$missing.value)"], &scheduler));
    assert_eq!(scheduler.output_value("p", "value"), None);
}

#[test]
fn scenario_e_duplicate_name_fails() {
    let scheduler = fresh_scheduler();
    let program = ["$x: value(value=1.0)", "$x: value(value=2.0)"];
    assert!(!run_program(program, &scheduler));
    // the first declaration wins; the duplicate is abandoned
    assert_eq!(scheduler.output_value("x", "value"), Some(1.0));
}

#[test]
fn scenario_f_syntax_error_points_at_the_offending_character() {
    let err = parse_instruction("$1x: add()").unwrap_err();
    match err {
        daffy::error::ParseError::Syntax { column, .. } => assert_eq!(column, 1),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn scenario_g_diamond_dependency() {
    let scheduler = fresh_scheduler();
    let program = [
        "$a: value(value=1.0)",
        "$b: add(a=$a.value, b=$a.value)",
        "$c: add(a=$a.value, b=$a.value)",
        "$d: mul(a=$b.result, b=$c.result)",
        "$p: print(value=$d.result)",
    ];
    assert!(run_program(program, &scheduler));
    assert_eq!(scheduler.output_value("d", "result"), Some(4.0));
}

#[test]
fn an_operation_with_two_edges_to_the_same_source_still_terminates() {
    // $sq binds both of its inputs to $n: waiting_on must start at 2 and
    // reach 0 once $n finishes, not get stuck at 1 forever.
    let scheduler = fresh_scheduler();
    let program = [
        "$n: add(a=1.0, b=1.0)",
        "$sq: mul(a=$n.result, b=$n.result)",
        "$p: print(value=$sq.result)",
    ];
    assert!(run_program(program, &scheduler));
    assert_eq!(scheduler.output_value("sq", "result"), Some(4.0));
}

#[test]
fn unknown_operation_type_is_rejected() {
    let scheduler = fresh_scheduler();
    assert!(!run_program(["$x: frobnicate(value=1.0)"], &scheduler));
}

#[test]
fn scheduling_through_daffy_error_distinguishes_parse_from_submit_failures() {
    let bad_syntax = parse_instruction("no dollar sign").unwrap_err();
    let as_daffy_error: DaffyError = bad_syntax.into();
    assert!(matches!(as_daffy_error, DaffyError::Parse(_)));

    let scheduler = fresh_scheduler();
    scheduler
        .submit("value", "x", vec![daffy::parser::Arg::Literal {
            name: "value".into(),
            value: 1.0,
        }])
        .unwrap();
    let err = scheduler
        .submit("value", "x", vec![daffy::parser::Arg::Literal {
            name: "value".into(),
            value: 2.0,
        }])
        .unwrap_err();
    assert!(matches!(err, SchedulerError::OperationAlreadyExists(_)));
}
