//! Per-module induction worker.

use log::{info, warn};
use sequent_netlist::{Module, Selection, SigBit};
use sequent_sat::{new_solver, BackendKind, Lit, SatGen, SolverExt};
use std::collections::{HashMap, HashSet};

/// Worker parameters.
#[derive(Debug, Clone)]
pub struct InductOptions {
    /// Maximum induction depth (the `-seq` option), at least 1.
    pub max_seq: u32,
    /// Also assert `consistent[max_seq + 1]` while running the per-marker
    /// fallback. Off by default: each marker is then proven under the
    /// hypothesis chain only, without circular reliance on the final step.
    pub assume_final_step: bool,
    pub backend: BackendKind,
}

impl Default for InductOptions {
    fn default() -> Self {
        InductOptions {
            max_seq: 4,
            assume_final_step: false,
            backend: BackendKind::default(),
        }
    }
}

/// How a worker run ended. Markers are rewritten before returning; the
/// counts record what was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The induction step held: every workset marker was proven.
    AllProven { proved: usize },
    /// A base case was unsatisfiable: the circuit inherently diverges under
    /// the marker constraints. Nothing was rewritten.
    Diverged,
    /// Bound exhausted (or the solver gave up); the per-marker fallback
    /// proved `proved` markers individually.
    Partial { proved: usize, unproven: usize },
}

/// One module's proof attempt. The worker owns its solver and encoding
/// state for the duration of the run; only marker rewrites outlive it.
pub struct InductWorker {
    satgen: SatGen,
    cell_order: Vec<usize>,
    workset: Vec<usize>,
    consistent: HashMap<u32, Lit>,
    options: InductOptions,
}

impl InductWorker {
    /// `workset` holds indices of the unproven equivalence markers in
    /// `module`; the driver guarantees it is non-empty.
    pub fn new(
        module: &Module,
        selection: &Selection,
        workset: Vec<usize>,
        options: InductOptions,
    ) -> Self {
        let satgen = SatGen::new(module, new_solver(options.backend));
        let cell_order = module.selected_cells(selection).map(|(idx, _)| idx).collect();
        InductWorker {
            satgen,
            cell_order,
            workset,
            consistent: HashMap::new(),
            options,
        }
    }

    /// Encode every selected cell at `step` and define `consistent[step]`:
    /// the conjunction of `A ↔ B` over all marker bit pairs that are not
    /// already canonically equal, deduplicated by canonical pair.
    fn create_timestep(&mut self, module: &Module, step: u32) {
        assert!(
            !self.consistent.contains_key(&step),
            "consistent[{step}] defined twice"
        );
        let mut terms = Vec::new();
        let mut seen: HashSet<(SigBit, SigBit)> = HashSet::new();
        for pos in 0..self.cell_order.len() {
            let idx = self.cell_order[pos];
            let cell = &module.cells()[idx];
            self.satgen.encode_cell(cell, step);
            if !cell.is_equiv() {
                continue;
            }
            let (Some(a), Some(b)) = (cell.port("A"), cell.port("B")) else {
                continue;
            };
            for (&bit_a, &bit_b) in a.bits().iter().zip(b.bits()) {
                let ca = self.satgen.sigmap().canon(bit_a);
                let cb = self.satgen.sigmap().canon(bit_b);
                if ca == cb {
                    continue;
                }
                let key = if ca <= cb { (ca, cb) } else { (cb, ca) };
                if !seen.insert(key) {
                    continue;
                }
                let la = self.satgen.sig_lit(bit_a, step);
                let lb = self.satgen.sig_lit(bit_b, step);
                let term = self.satgen.solver_mut().iff_lit(la, lb);
                terms.push(term);
            }
        }
        let lit = self.satgen.and_all(&terms);
        self.consistent.insert(step, lit);
    }

    pub fn run(&mut self, module: &mut Module) -> WorkerOutcome {
        let max_seq = self.options.max_seq;
        info!(
            "Found {} unproven equivalence markers in module {}.",
            self.workset.len(),
            module.name
        );

        self.create_timestep(module, 1);
        for step in 1..=max_seq {
            let hypothesis = self.consistent[&step];
            self.satgen.solver_mut().assume(hypothesis);

            info!(
                "  Proving existence of base case for step {}. ({} clauses over {} variables)",
                step,
                self.satgen.num_clauses(),
                self.satgen.num_variables()
            );
            match self.satgen.solver_mut().solve() {
                Ok(true) => {}
                Ok(false) => {
                    info!("  Proof for base case failed. Circuit inherently diverges!");
                    return WorkerOutcome::Diverged;
                }
                Err(err) => {
                    warn!("  Solver gave up during base case for step {step}: {err}");
                    return WorkerOutcome::Partial {
                        proved: 0,
                        unproven: self.workset.len(),
                    };
                }
            }

            self.create_timestep(module, step + 1);
            let next = self.consistent[&(step + 1)];

            info!(
                "  Proving induction step {}. ({} clauses over {} variables)",
                step,
                self.satgen.num_clauses(),
                self.satgen.num_variables()
            );
            match self.satgen.solver_mut().solve_with(&[!next]) {
                Ok(false) => {
                    info!(
                        "  Proof for induction step holds. Entire workset of {} markers proven!",
                        self.workset.len()
                    );
                    let proved = self.workset.len();
                    for pos in 0..proved {
                        Self::rewrite_marker(module, self.workset[pos]);
                    }
                    return WorkerOutcome::AllProven { proved };
                }
                Ok(true) => {
                    info!(
                        "  Proof for induction step failed. {}",
                        if step != max_seq {
                            "Extending to next time step."
                        } else {
                            "Trying to prove individual markers from workset."
                        }
                    );
                }
                Err(err) => {
                    warn!("  Solver gave up during induction step {step}: {err}");
                    return WorkerOutcome::Partial {
                        proved: 0,
                        unproven: self.workset.len(),
                    };
                }
            }
        }

        self.fallback(module)
    }

    /// Per-marker proofs at step `max_seq + 1`, each under the hypothesis
    /// chain `consistent[1..=max_seq]` accumulated by the main loop.
    fn fallback(&mut self, module: &mut Module) -> WorkerOutcome {
        let step = self.options.max_seq + 1;
        if self.options.assume_final_step {
            let lit = self.consistent[&step];
            self.satgen.solver_mut().assume(lit);
        }

        let mut proved = 0;
        for pos in 0..self.workset.len() {
            let idx = self.workset[pos];
            let (name, pairs) = {
                let cell = &module.cells()[idx];
                let mut pairs = Vec::new();
                if let (Some(a), Some(b)) = (cell.port("A"), cell.port("B")) {
                    for (&bit_a, &bit_b) in a.bits().iter().zip(b.bits()) {
                        if self.satgen.sigmap().canon(bit_a) != self.satgen.sigmap().canon(bit_b) {
                            pairs.push((bit_a, bit_b));
                        }
                    }
                }
                (cell.name.clone(), pairs)
            };

            if pairs.is_empty() {
                // Canonically equal already: trivially proven.
                Self::rewrite_marker(module, idx);
                proved += 1;
                info!("  Trying to prove equivalence marker {name}: success!");
                continue;
            }

            let mut diffs = Vec::with_capacity(pairs.len());
            for (bit_a, bit_b) in pairs {
                let la = self.satgen.sig_lit(bit_a, step);
                let lb = self.satgen.sig_lit(bit_b, step);
                diffs.push(self.satgen.solver_mut().xor_lit(la, lb));
            }
            let diff = self.satgen.or_all(&diffs);
            match self.satgen.solver_mut().solve_with(&[diff]) {
                Ok(false) => {
                    Self::rewrite_marker(module, idx);
                    proved += 1;
                    info!("  Trying to prove equivalence marker {name}: success!");
                }
                Ok(true) => {
                    info!("  Trying to prove equivalence marker {name}: failed.");
                }
                Err(err) => {
                    warn!("  Solver gave up on equivalence marker {name}: {err}");
                }
            }
        }

        WorkerOutcome::Partial {
            proved,
            unproven: self.workset.len() - proved,
        }
    }

    /// Commit a proof: alias port `B` to port `A`. The marker is then
    /// syntactically proven and outside any future workset.
    fn rewrite_marker(module: &mut Module, idx: usize) {
        let a = module.cells()[idx].port("A").cloned().unwrap_or_default();
        module.cells_mut()[idx].set_port("B", a);
    }
}
