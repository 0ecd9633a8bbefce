//! Drives a program's instructions through the parser and scheduler.
//!
//! This is the thin layer between raw text and [`crate::scheduled::Scheduler`]:
//! it owns the "parse, then submit, log and keep going on failure" policy
//! that both CLI modes (`-c CMD` and a program file) share.

use tracing::error;

use crate::error::DaffyError;
use crate::parser::parse_instruction;
use crate::scheduled::Scheduler;

/// Parses one instruction and submits the operation it describes.
fn schedule_instruction(instruction: &str, scheduler: &Scheduler) -> Result<(), DaffyError> {
    let (optype, name, args) = parse_instruction(instruction)?;
    scheduler.submit(&optype, &name, args)?;
    Ok(())
}

/// Runs a single instruction to completion: schedules it, then waits for
/// the scheduler to drain. Returns `true` if the instruction parsed,
/// submitted and executed without error.
pub fn run_instruction(instruction: &str, scheduler: &Scheduler) -> bool {
    let scheduled = schedule_instruction(instruction, scheduler);
    if let Err(error) = &scheduled {
        error!(%error, instruction, "failed to schedule instruction");
    }
    let executed = scheduler.wait();
    if let Err(error) = &executed {
        error!(%error, "execution failed");
    }
    scheduled.is_ok() && executed.is_ok()
}

/// Runs a whole program, one instruction per non-blank line. A line that
/// fails to parse or submit is logged and skipped; the rest of the
/// program still runs. Returns `true` if every instruction, and the run
/// as a whole, succeeded.
pub fn run_program<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    scheduler: &Scheduler,
) -> bool {
    let mut all_ok = true;
    for line in lines {
        let instruction = line.trim();
        if instruction.is_empty() {
            continue;
        }
        if let Err(error) = schedule_instruction(instruction, scheduler) {
            error!(%error, instruction, "failed to schedule instruction");
            all_ok = false;
        }
    }
    if let Err(error) = scheduler.wait() {
        error!(%error, "execution failed");
        all_ok = false;
    }
    all_ok
}
