//! Driver: module iteration, workset construction, statistics, and the
//! `equiv_induct` command.

use crate::command::Command;
use crate::induct::{InductOptions, InductWorker, WorkerOutcome};
use crate::{EngineError, EngineResult};
use log::info;
use sequent_netlist::{Design, Selection};

/// Aggregate result of one `equiv_induct` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquivInductStats {
    /// Modules that had a non-empty workset.
    pub modules_visited: usize,
    /// Markers rewritten to proven this run.
    pub proved: usize,
    /// Markers left unproven.
    pub unproven: usize,
    /// Modules abandoned because a base case was unsatisfiable.
    pub diverged_modules: usize,
}

/// Prove selected equivalence markers module by module.
///
/// The workset of a module is its selected markers whose `A` and `B` ports
/// are syntactically unequal; markers already aliased (including zero-width
/// ones) are trivially proven and never touch a solver. Modules with an
/// empty workset are skipped with a log line.
pub fn run_equiv_induct(
    design: &mut Design,
    selection: &Selection,
    options: &InductOptions,
) -> EquivInductStats {
    let mut stats = EquivInductStats::default();
    for module in design.selected_modules_mut(selection) {
        let workset: Vec<usize> = module
            .selected_cells(selection)
            .filter(|(_, cell)| cell.is_equiv() && cell.port("A") != cell.port("B"))
            .map(|(idx, _)| idx)
            .collect();
        if workset.is_empty() {
            info!(
                "No selected unproven equivalence markers found in {}.",
                module.name
            );
            continue;
        }
        stats.modules_visited += 1;
        let total = workset.len();
        let mut worker = InductWorker::new(module, selection, workset, options.clone());
        match worker.run(module) {
            WorkerOutcome::AllProven { proved } => stats.proved += proved,
            WorkerOutcome::Diverged => {
                stats.diverged_modules += 1;
                stats.unproven += total;
            }
            WorkerOutcome::Partial { proved, unproven } => {
                stats.proved += proved;
                stats.unproven += unproven;
            }
        }
    }
    info!("Proved {} previously unproven equivalences.", stats.proved);
    stats
}

/// The `equiv_induct` command: `equiv_induct [-seq N] [selection]`.
#[derive(Debug, Default)]
pub struct EquivInductCommand;

impl EquivInductCommand {
    fn parse_args(args: &[String]) -> EngineResult<(InductOptions, Selection)> {
        let mut options = InductOptions::default();
        let mut patterns = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-seq" => {
                    let value = iter.next().ok_or_else(|| {
                        EngineError::BadArguments("-seq expects an integer".to_string())
                    })?;
                    let parsed: u32 = value.parse().map_err(|_| {
                        EngineError::BadArguments(format!("invalid -seq value: {value}"))
                    })?;
                    if parsed < 1 {
                        return Err(EngineError::BadArguments(
                            "-seq must be at least 1".to_string(),
                        ));
                    }
                    options.max_seq = parsed;
                }
                other if other.starts_with('-') => {
                    return Err(EngineError::BadArguments(format!(
                        "unknown option: {other}"
                    )));
                }
                other => patterns.push(other.to_string()),
            }
        }
        Ok((options, Selection::parse(&patterns)))
    }
}

impl Command for EquivInductCommand {
    fn name(&self) -> &'static str {
        "equiv_induct"
    }

    fn help(&self) -> &'static str {
        "equiv_induct [-seq N] [selection] -- prove equivalence markers by temporal induction"
    }

    fn execute(&self, args: &[String], design: &mut Design) -> EngineResult<()> {
        let (options, selection) = Self::parse_args(args)?;
        info!("Executing equiv_induct pass (max {} time steps).", options.max_seq);
        run_equiv_induct(design, &selection, &options);
        Ok(())
    }
}
