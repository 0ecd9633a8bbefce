//! The concurrent scheduler: a table of operations, a worker pool that
//! executes runnable ones, and a single updater thread that serializes all
//! bookkeeping about which operation becomes runnable next.
//!
//! A [`Scheduler`] owns one submission mutex guarding its operation table.
//! Submission itself (`submit`) is meant to be called from a single
//! thread -- the program's instruction loop -- so the mutex exists to
//! keep the table consistent for the worker pool and updater thread, not
//! to make `submit` itself safe to call concurrently from many callers.

mod handoff;

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, warn};

use crate::catalog::{Catalog, OperationType};
use crate::error::SchedulerError;
use crate::operation::{InputSocket, Operation, OutputSocket};
use crate::parser::Arg;
use handoff::Handoff;

/// Default worker thread count, used unless `DAFFY_WORKERS` overrides it.
pub const DEFAULT_WORKERS: usize = 4;

/// Resolves the worker pool size from `DAFFY_WORKERS`'s raw value, if set:
/// any positive integer overrides [`DEFAULT_WORKERS`]; anything else
/// (unset, non-numeric, zero) falls back to the default rather than
/// spawning a pool with no workers.
fn resolve_worker_count(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_WORKERS)
}

struct Table {
    ops: Vec<Operation>,
    by_name: HashMap<String, usize>,
}

impl Table {
    fn new() -> Self {
        Table {
            ops: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

/// A counting join barrier: `add` for every operation that must execute,
/// `done` when it finishes, `wait` blocks until the count drains to zero.
/// Plays the role the original design's `waiting_counter` joinable queue
/// played, implemented here with a `Condvar` since the count itself, not
/// the identity of each token, is all that matters.
struct Barrier {
    outstanding: Mutex<usize>,
    cvar: Condvar,
}

impl Barrier {
    fn new() -> Self {
        Barrier {
            outstanding: Mutex::new(0),
            cvar: Condvar::new(),
        }
    }

    fn add(&self) {
        *self.outstanding.lock().unwrap() += 1;
    }

    fn done(&self) {
        let mut outstanding = self.outstanding.lock().unwrap();
        *outstanding -= 1;
        if *outstanding == 0 {
            self.cvar.notify_all();
        }
    }

    fn wait(&self) {
        let mut outstanding = self.outstanding.lock().unwrap();
        while *outstanding != 0 {
            outstanding = self.cvar.wait(outstanding).unwrap();
        }
    }
}

/// Runs a daffy program's operations: accepts submissions one instruction
/// at a time, fans their execution out across a worker pool once their
/// dependencies are satisfied, and reports when every submitted operation
/// has finished.
pub struct Scheduler {
    catalog: &'static Catalog,
    table: Arc<Mutex<Table>>,
    barrier: Arc<Barrier>,
    failures: Arc<Mutex<Vec<(String, String)>>>,
    runnable_tx: Sender<usize>,
    _workers: Vec<JoinHandle<()>>,
    _updater: JoinHandle<()>,
}

impl Scheduler {
    /// Builds a scheduler over `catalog`, spawning its worker pool and
    /// updater thread immediately. Worker count defaults to
    /// [`DEFAULT_WORKERS`] and can be overridden by setting `DAFFY_WORKERS`
    /// to a positive integer before the process starts.
    pub fn new(catalog: &'static Catalog) -> Self {
        let workers = resolve_worker_count(env::var("DAFFY_WORKERS").ok().as_deref());

        let table = Arc::new(Mutex::new(Table::new()));
        let barrier = Arc::new(Barrier::new());
        let failures = Arc::new(Mutex::new(Vec::new()));

        let runnable = Handoff::new();
        let finished = Handoff::new();

        let mut worker_handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let table = Arc::clone(&table);
            let failures = Arc::clone(&failures);
            let runnable_rx = runnable.receiver();
            let finished_tx = finished.sender();
            let handle = thread::Builder::new()
                .name(format!("daffy-worker-{id}"))
                .spawn(move || worker_loop(id, catalog, table, failures, runnable_rx, finished_tx))
                .expect("failed to spawn daffy worker thread");
            worker_handles.push(handle);
        }

        let updater_handle = {
            let table = Arc::clone(&table);
            let barrier = Arc::clone(&barrier);
            let finished_rx = finished.receiver();
            let runnable_tx = runnable.sender();
            thread::Builder::new()
                .name("daffy-updater".into())
                .spawn(move || updater_loop(table, barrier, finished_rx, runnable_tx))
                .expect("failed to spawn daffy updater thread")
        };

        Scheduler {
            catalog,
            table,
            barrier,
            failures,
            runnable_tx: runnable.sender(),
            _workers: worker_handles,
            _updater: updater_handle,
        }
    }

    /// Creates an operation from a parsed instruction and adds it to the
    /// table, resolving every argument against operations already present
    /// (forward references are impossible by construction: an argument
    /// can only name an operation submitted on an earlier line). If every
    /// input is already satisfied, it is handed to the worker pool
    /// immediately; otherwise the updater will do so once its last
    /// dependency finishes.
    pub fn submit(&self, type_name: &str, name: &str, args: Vec<Arg>) -> Result<(), SchedulerError> {
        let op_type = self
            .catalog
            .find(type_name)
            .map_err(|_| SchedulerError::OperationTypeNotFound(type_name.to_string()))?;
        let mut table = self.table.lock().unwrap();
        self.submit_locked(&mut table, op_type, name, args)
    }

    fn submit_locked(
        &self,
        table: &mut Table,
        op_type: &OperationType,
        name: &str,
        args: Vec<Arg>,
    ) -> Result<(), SchedulerError> {
        if table.by_name.contains_key(name) {
            return Err(SchedulerError::OperationAlreadyExists(name.to_string()));
        }

        if op_type.name == "value" {
            if args.len() != 1 {
                return Err(SchedulerError::WrongArgument(format!(
                    "value takes exactly one argument, got {}",
                    args.len()
                )));
            }
            let value = match &args[0] {
                Arg::Literal { value, .. } => *value,
                Arg::Reference { .. } => {
                    return Err(SchedulerError::WrongArgument(
                        "value requires a literal argument, not a reference".to_string(),
                    ));
                }
            };
            debug!(op = name, value, "adding value operation");
            let op = Operation {
                type_name: "value",
                name: name.to_string(),
                inputs: vec![],
                outputs: vec![OutputSocket {
                    name: "value",
                    value,
                }],
                waiting_on: 0,
                blocking: vec![],
                // born finished: a value operation never goes through the
                // worker pool, so it needs no barrier token either.
                finished: true,
            };
            table.ops.push(op);
            table.by_name.insert(name.to_string(), table.ops.len() - 1);
            return Ok(());
        }

        let mut inputs: Vec<InputSocket> = op_type
            .inputs
            .iter()
            .map(|socket_type| InputSocket {
                name: socket_type.name,
                default: socket_type.default,
                source: None,
            })
            .collect();

        for (i, arg) in args.into_iter().enumerate() {
            let (arg_name, source) = match arg {
                Arg::Literal {
                    name: arg_name,
                    value,
                } => {
                    let synth_name = format!("_{name}_arg_{i}");
                    let value_type = self
                        .catalog
                        .find("value")
                        .expect("the value type is always registered");
                    self.submit_locked(
                        table,
                        value_type,
                        &synth_name,
                        vec![Arg::Literal {
                            name: "value".to_string(),
                            value,
                        }],
                    )?;
                    let src_idx = table.by_name[&synth_name];
                    (arg_name, (src_idx, "value"))
                }
                Arg::Reference {
                    name: arg_name,
                    target,
                    output,
                } => {
                    let src_idx = *table
                        .by_name
                        .get(&target)
                        .ok_or_else(|| SchedulerError::OperationNotFound(target.clone()))?;
                    let output_name = table.ops[src_idx]
                        .outputs
                        .iter()
                        .find(|socket| socket.name == output)
                        .map(|socket| socket.name)
                        .ok_or_else(|| {
                            SchedulerError::WrongArgument(format!(
                                "{target} has no output named {output}"
                            ))
                        })?;
                    (arg_name, (src_idx, output_name))
                }
            };

            let socket = inputs
                .iter_mut()
                .find(|socket| socket.name == arg_name)
                .ok_or_else(|| {
                    SchedulerError::WrongArgument(format!(
                        "{name} has no input named {arg_name}"
                    ))
                })?;
            socket.source = Some(source);
        }

        let outputs = op_type
            .outputs
            .iter()
            .map(|socket_type| OutputSocket {
                name: socket_type.name,
                value: 0.0,
            })
            .collect();

        let op = Operation {
            type_name: op_type.name,
            name: name.to_string(),
            inputs,
            outputs,
            waiting_on: 0,
            blocking: vec![],
            finished: false,
        };

        let idx = table.ops.len();
        table.ops.push(op);
        table.by_name.insert(name.to_string(), idx);
        self.barrier.add();

        let source_indices: Vec<usize> = table.ops[idx]
            .inputs
            .iter()
            .filter_map(|socket| socket.source.map(|(src_idx, _)| src_idx))
            .collect();

        // `waiting_on` counts unfinished *edges*, not distinct unfinished
        // sources: an operation with two inputs bound to the same
        // upstream source is waiting on that source twice. `blocking`
        // must carry one entry per such edge too (no dedup by `idx`), so
        // that source's single completion drains exactly as many
        // dependent decrements as there are edges.
        let mut waiting = 0u32;
        for src_idx in source_indices {
            if !table.ops[src_idx].finished {
                waiting += 1;
                table.ops[src_idx].blocking.push(idx);
            }
        }
        table.ops[idx].waiting_on = waiting;

        if waiting == 0 {
            self.runnable_tx
                .send(idx)
                .expect("runnable handoff should not be disconnected");
        }

        Ok(())
    }

    /// Blocks until every operation submitted so far has finished
    /// executing. Returns an error naming how many operations failed
    /// during execution, if any did; per the resolved design choice, a
    /// failure inside one operation does not stop independent siblings
    /// from finishing, it only marks the overall run as failed.
    pub fn wait(&self) -> Result<(), SchedulerError> {
        self.barrier.wait();
        let failures = self.failures.lock().unwrap();
        if failures.is_empty() {
            Ok(())
        } else {
            let detail = failures
                .iter()
                .map(|(op, message)| format!("{op}: {message}"))
                .collect::<Vec<_>>()
                .join("; ");
            Err(SchedulerError::ExecutionFailed(detail))
        }
    }

    /// Reads a finished operation's output value, for callers (tests, an
    /// embedding host) that want a result besides what `print` wrote to
    /// standard output.
    pub fn output_value(&self, op_name: &str, output_name: &str) -> Option<f64> {
        let table = self.table.lock().unwrap();
        let idx = *table.by_name.get(op_name)?;
        table.ops[idx]
            .outputs
            .iter()
            .find(|socket| socket.name == output_name)
            .map(|socket| socket.value)
    }
}

fn worker_loop(
    id: usize,
    catalog: &'static Catalog,
    table: Arc<Mutex<Table>>,
    failures: Arc<Mutex<Vec<(String, String)>>>,
    runnable_rx: Receiver<usize>,
    finished_tx: Sender<usize>,
) {
    while let Ok(idx) = runnable_rx.recv() {
        let (type_name, op_name, inputs) = {
            let table = table.lock().unwrap();
            let op = &table.ops[idx];
            let inputs = op.resolved_inputs(|src_idx, output_name| {
                table.ops[src_idx]
                    .outputs
                    .iter()
                    .find(|out| out.name == output_name)
                    .map(|out| out.value)
                    .unwrap_or(0.0)
            });
            (op.type_name, op.name.clone(), inputs)
        };

        debug!(worker = id, op = %op_name, "executing");

        let op_type = catalog
            .find(type_name)
            .expect("the scheduler only ever tables operations of registered types");
        let outcome = match op_type.execfunc {
            Some(execfunc) => execfunc(&inputs),
            None => Ok(Vec::new()),
        };

        match outcome {
            Ok(values) => {
                let mut table = table.lock().unwrap();
                for (socket, value) in table.ops[idx].outputs.iter_mut().zip(values) {
                    socket.value = value;
                }
            }
            Err(message) => {
                error!(op = %op_name, error = %message, "operation execution failed");
                failures.lock().unwrap().push((op_name, message));
            }
        }

        finished_tx
            .send(idx)
            .expect("finished handoff should not be disconnected");
    }
}

fn updater_loop(
    table: Arc<Mutex<Table>>,
    barrier: Arc<Barrier>,
    finished_rx: Receiver<usize>,
    runnable_tx: Sender<usize>,
) {
    loop {
        match finished_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(idx) => {
                let newly_runnable = {
                    let mut table = table.lock().unwrap();
                    table.ops[idx].finished = true;
                    let dependents = std::mem::take(&mut table.ops[idx].blocking);
                    let mut runnable = Vec::new();
                    for dep_idx in dependents {
                        table.ops[dep_idx].waiting_on -= 1;
                        if table.ops[dep_idx].waiting_on == 0 {
                            runnable.push(dep_idx);
                        }
                    }
                    runnable
                };
                for dep_idx in newly_runnable {
                    runnable_tx
                        .send(dep_idx)
                        .expect("runnable handoff should not be disconnected");
                }
                barrier.done();
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("updater idle for 5s waiting on a finished operation");
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::sync::OnceLock;

    fn test_catalog() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(Catalog::with_builtins)
    }

    #[test]
    fn worker_count_falls_back_to_default_when_unset_or_invalid() {
        assert_eq!(resolve_worker_count(None), DEFAULT_WORKERS);
        assert_eq!(resolve_worker_count(Some("not a number")), DEFAULT_WORKERS);
        assert_eq!(resolve_worker_count(Some("0")), DEFAULT_WORKERS);
        assert_eq!(resolve_worker_count(Some("-1")), DEFAULT_WORKERS);
    }

    #[test]
    fn worker_count_honors_a_positive_override() {
        assert_eq!(resolve_worker_count(Some("7")), 7);
        assert_eq!(resolve_worker_count(Some("1")), 1);
    }

    #[test]
    fn independent_operations_execute_concurrently() {
        use crate::catalog::{InputSocketType, OutputSocketType};
        use std::sync::Barrier as StdBarrier;

        // Two independent operations that each block on a two-party
        // rendezvous before returning: this can only complete if both
        // are, at some point, executing at once. If the scheduler
        // serialized unrelated operations, this test would hang rather
        // than fail -- a deliberate smoke test for real parallel
        // dispatch rather than a timing-based heuristic.
        static RENDEZVOUS: OnceLock<StdBarrier> = OnceLock::new();
        RENDEZVOUS.get_or_init(|| StdBarrier::new(2));

        fn meet(inputs: &[f64]) -> Result<Vec<f64>, String> {
            RENDEZVOUS.get().unwrap().wait();
            Ok(vec![inputs[0]])
        }

        let mut catalog = Catalog::empty();
        catalog
            .register(crate::catalog::OperationType {
                name: "rendezvous",
                inputs: vec![InputSocketType {
                    name: "value",
                    default: 0.0,
                }],
                outputs: vec![OutputSocketType { name: "value" }],
                execfunc: Some(meet),
            })
            .unwrap();
        for op_type in crate::ops::builtins() {
            catalog.register(op_type).unwrap();
        }
        let catalog: &'static Catalog = Box::leak(Box::new(catalog));

        let scheduler = Scheduler::new(catalog);
        scheduler
            .submit(
                "rendezvous",
                "p",
                vec![Arg::Literal {
                    name: "value".into(),
                    value: 1.0,
                }],
            )
            .unwrap();
        scheduler
            .submit(
                "rendezvous",
                "q",
                vec![Arg::Literal {
                    name: "value".into(),
                    value: 2.0,
                }],
            )
            .unwrap();
        scheduler.wait().unwrap();
        assert_eq!(scheduler.output_value("p", "value"), Some(1.0));
        assert_eq!(scheduler.output_value("q", "value"), Some(2.0));
    }

    #[test]
    fn a_value_operation_is_immediately_finished() {
        let scheduler = Scheduler::new(test_catalog());
        scheduler
            .submit(
                "value",
                "x",
                vec![Arg::Literal {
                    name: "value".into(),
                    value: 7.0,
                }],
            )
            .unwrap();
        assert_eq!(scheduler.output_value("x", "value"), Some(7.0));
    }

    #[test]
    fn add_waits_on_its_dependencies_then_runs() {
        let scheduler = Scheduler::new(test_catalog());
        scheduler
            .submit(
                "value",
                "a",
                vec![Arg::Literal {
                    name: "value".into(),
                    value: 2.0,
                }],
            )
            .unwrap();
        scheduler
            .submit(
                "value",
                "b",
                vec![Arg::Literal {
                    name: "value".into(),
                    value: 3.0,
                }],
            )
            .unwrap();
        scheduler
            .submit(
                "add",
                "s",
                vec![
                    Arg::Reference {
                        name: "a".into(),
                        target: "a".into(),
                        output: "value".into(),
                    },
                    Arg::Reference {
                        name: "b".into(),
                        target: "b".into(),
                        output: "value".into(),
                    },
                ],
            )
            .unwrap();
        scheduler.wait().unwrap();
        assert_eq!(scheduler.output_value("s", "result"), Some(5.0));
    }

    #[test]
    fn literal_arguments_create_synthetic_value_operations() {
        let scheduler = Scheduler::new(test_catalog());
        scheduler
            .submit(
                "add",
                "s",
                vec![
                    Arg::Literal {
                        name: "a".into(),
                        value: 4.0,
                    },
                    Arg::Literal {
                        name: "b".into(),
                        value: 1.5,
                    },
                ],
            )
            .unwrap();
        scheduler.wait().unwrap();
        assert_eq!(scheduler.output_value("s", "result"), Some(5.5));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let scheduler = Scheduler::new(test_catalog());
        scheduler
            .submit(
                "value",
                "x",
                vec![Arg::Literal {
                    name: "value".into(),
                    value: 1.0,
                }],
            )
            .unwrap();
        let err = scheduler
            .submit(
                "value",
                "x",
                vec![Arg::Literal {
                    name: "value".into(),
                    value: 2.0,
                }],
            )
            .unwrap_err();
        assert!(matches!(err, SchedulerError::OperationAlreadyExists(_)));
    }

    #[test]
    fn forward_references_are_rejected() {
        let scheduler = Scheduler::new(test_catalog());
        let err = scheduler
            .submit(
                "print",
                "p",
                vec![Arg::Reference {
                    name: "value".into(),
                    target: "not_yet_defined".into(),
                    output: "value".into(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, SchedulerError::OperationNotFound(_)));
    }

    #[test]
    fn division_by_zero_fails_the_run_without_aborting_siblings() {
        let scheduler = Scheduler::new(test_catalog());
        scheduler
            .submit(
                "div",
                "bad",
                vec![
                    Arg::Literal {
                        name: "a".into(),
                        value: 1.0,
                    },
                    Arg::Literal {
                        name: "b".into(),
                        value: 0.0,
                    },
                ],
            )
            .unwrap();
        scheduler
            .submit(
                "add",
                "fine",
                vec![
                    Arg::Literal {
                        name: "a".into(),
                        value: 1.0,
                    },
                    Arg::Literal {
                        name: "b".into(),
                        value: 1.0,
                    },
                ],
            )
            .unwrap();
        let result = scheduler.wait();
        assert!(result.is_err());
        assert_eq!(scheduler.output_value("fine", "result"), Some(2.0));
    }
}
