//! Solver adapter: own literal types, an object-safe incremental interface
//! and eager Tseitin builders for the boolean connectives.

use crate::{SatError, SatResult};
use varisat::ExtendFormula;

/// A SAT variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(pub u32);

impl Var {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A SAT literal (variable with polarity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    var: Var,
    negated: bool,
}

impl Lit {
    pub fn positive(var: Var) -> Self {
        Lit {
            var,
            negated: false,
        }
    }

    pub fn negative(var: Var) -> Self {
        Lit { var, negated: true }
    }

    pub fn var(&self) -> Var {
        self.var
    }

    pub fn is_positive(&self) -> bool {
        !self.negated
    }

    /// DIMACS form: 1-indexed, negative when negated.
    pub fn to_dimacs(&self) -> i32 {
        let var = (self.var.0 + 1) as i32;
        if self.negated {
            -var
        } else {
            var
        }
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit {
            var: self.var,
            negated: !self.negated,
        }
    }
}

/// Incremental SAT backend interface.
///
/// Clauses are permanent; assumptions passed to [`SatSolver::solve_with`]
/// are retracted when the call returns. Variable and clause counts are
/// maintained by the adapter for progress logging.
pub trait SatSolver {
    fn fresh_var(&mut self) -> Var;

    fn add_clause(&mut self, clause: &[Lit]);

    /// SAT = `Ok(true)`, UNSAT = `Ok(false)`. A backend give-up surfaces as
    /// [`SatError::Unknown`].
    fn solve_with(&mut self, assumptions: &[Lit]) -> SatResult<bool>;

    fn num_variables(&self) -> usize;

    fn num_clauses(&self) -> usize;
}

/// Connective builders over any [`SatSolver`]. Each builder returns a fresh
/// literal with eager Tseitin clauses tying it to its operands.
pub trait SolverExt: SatSolver {
    fn fresh_lit(&mut self) -> Lit {
        Lit::positive(self.fresh_var())
    }

    fn solve(&mut self) -> SatResult<bool> {
        self.solve_with(&[])
    }

    /// Permanently assert a literal. Used for the inductive hypothesis
    /// chain; there is no retraction.
    fn assume(&mut self, lit: Lit) {
        self.add_clause(&[lit]);
    }

    /// `y ↔ a ∧ b`
    fn and_lit(&mut self, a: Lit, b: Lit) -> Lit {
        let y = self.fresh_lit();
        self.add_clause(&[!y, a]);
        self.add_clause(&[!y, b]);
        self.add_clause(&[y, !a, !b]);
        y
    }

    /// `y ↔ a ∨ b`
    fn or_lit(&mut self, a: Lit, b: Lit) -> Lit {
        let y = self.fresh_lit();
        self.add_clause(&[y, !a]);
        self.add_clause(&[y, !b]);
        self.add_clause(&[!y, a, b]);
        y
    }

    /// `y ↔ a ⊕ b`
    fn xor_lit(&mut self, a: Lit, b: Lit) -> Lit {
        let y = self.fresh_lit();
        self.add_clause(&[!y, !a, !b]);
        self.add_clause(&[!y, a, b]);
        self.add_clause(&[y, a, !b]);
        self.add_clause(&[y, !a, b]);
        y
    }

    /// `y ↔ (a ↔ b)`
    fn iff_lit(&mut self, a: Lit, b: Lit) -> Lit {
        !self.xor_lit(a, b)
    }

    /// `y ↔ (s ? b : a)`
    fn mux_lit(&mut self, s: Lit, a: Lit, b: Lit) -> Lit {
        let y = self.fresh_lit();
        self.add_clause(&[!s, !b, y]);
        self.add_clause(&[!s, b, !y]);
        self.add_clause(&[s, !a, y]);
        self.add_clause(&[s, a, !y]);
        // Redundant but helps propagation.
        self.add_clause(&[!a, !b, y]);
        self.add_clause(&[a, b, !y]);
        y
    }

    /// `y ↔ ⋀ lits`; `None` for an empty conjunction.
    fn and_many(&mut self, lits: &[Lit]) -> Option<Lit> {
        match lits {
            [] => None,
            [single] => Some(*single),
            _ => {
                let y = self.fresh_lit();
                let mut long = Vec::with_capacity(lits.len() + 1);
                long.push(y);
                for &lit in lits {
                    self.add_clause(&[!y, lit]);
                    long.push(!lit);
                }
                self.add_clause(&long);
                Some(y)
            }
        }
    }

    /// `y ↔ ⋁ lits`; `None` for an empty disjunction.
    fn or_many(&mut self, lits: &[Lit]) -> Option<Lit> {
        match lits {
            [] => None,
            [single] => Some(*single),
            _ => {
                let y = self.fresh_lit();
                let mut long = Vec::with_capacity(lits.len() + 1);
                long.push(!y);
                for &lit in lits {
                    self.add_clause(&[y, !lit]);
                    long.push(lit);
                }
                self.add_clause(&long);
                Some(y)
            }
        }
    }
}

impl<S: SatSolver + ?Sized> SolverExt for S {}

/// Selectable SAT backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Varisat,
    Cadical,
}

pub fn new_solver(kind: BackendKind) -> Box<dyn SatSolver> {
    match kind {
        BackendKind::Varisat => Box::new(VarisatSolver::new()),
        BackendKind::Cadical => Box::new(CadicalSolver::new()),
    }
}

/// Default backend: varisat, whose assume/solve API is natively
/// incremental.
pub struct VarisatSolver {
    solver: varisat::Solver<'static>,
    num_vars: usize,
    num_clauses: usize,
}

impl VarisatSolver {
    pub fn new() -> Self {
        VarisatSolver {
            solver: varisat::Solver::new(),
            num_vars: 0,
            num_clauses: 0,
        }
    }

    fn to_backend(lit: Lit) -> varisat::Lit {
        varisat::Lit::from_dimacs(lit.to_dimacs() as isize)
    }
}

impl Default for VarisatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatSolver for VarisatSolver {
    fn fresh_var(&mut self) -> Var {
        let lit = self.solver.new_lit();
        let var = Var((lit.to_dimacs() - 1) as u32);
        self.num_vars += 1;
        var
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        let backend: Vec<varisat::Lit> = clause.iter().map(|&lit| Self::to_backend(lit)).collect();
        self.solver.add_clause(&backend);
        self.num_clauses += 1;
    }

    fn solve_with(&mut self, assumptions: &[Lit]) -> SatResult<bool> {
        let backend: Vec<varisat::Lit> = assumptions
            .iter()
            .map(|&lit| Self::to_backend(lit))
            .collect();
        self.solver.assume(&backend);
        let result = self
            .solver
            .solve()
            .map_err(|err| SatError::Backend(format!("{err:?}")));
        // Retract before surfacing the result; assumptions would otherwise
        // leak into the next query.
        self.solver.assume(&[]);
        result
    }

    fn num_variables(&self) -> usize {
        self.num_vars
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}

/// Alternative backend over CaDiCaL.
pub struct CadicalSolver {
    solver: cadical::Solver,
    num_vars: usize,
    num_clauses: usize,
}

impl CadicalSolver {
    pub fn new() -> Self {
        CadicalSolver {
            solver: cadical::Solver::new(),
            num_vars: 0,
            num_clauses: 0,
        }
    }
}

impl Default for CadicalSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatSolver for CadicalSolver {
    fn fresh_var(&mut self) -> Var {
        // CaDiCaL allocates variables implicitly on first use.
        let var = Var(self.num_vars as u32);
        self.num_vars += 1;
        var
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        self.solver
            .add_clause(clause.iter().map(|lit| lit.to_dimacs()));
        self.num_clauses += 1;
    }

    fn solve_with(&mut self, assumptions: &[Lit]) -> SatResult<bool> {
        let result = self
            .solver
            .solve_with(assumptions.iter().map(|lit| lit.to_dimacs()));
        result.ok_or(SatError::Unknown)
    }

    fn num_variables(&self) -> usize {
        self.num_vars
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Box<dyn SatSolver>> {
        vec![new_solver(BackendKind::Varisat), new_solver(BackendKind::Cadical)]
    }

    #[test]
    fn simple_sat_and_unsat() {
        for mut solver in backends() {
            // (x1 ∨ x2) ∧ (¬x1 ∨ x2) is SAT; adding ¬x2 makes it UNSAT.
            let x1 = solver.fresh_lit();
            let x2 = solver.fresh_lit();
            solver.add_clause(&[x1, x2]);
            solver.add_clause(&[!x1, x2]);
            assert!(solver.solve().unwrap());
            solver.add_clause(&[!x2]);
            assert!(!solver.solve().unwrap());
        }
    }

    #[test]
    fn assumptions_are_retracted() {
        for mut solver in backends() {
            let x = solver.fresh_lit();
            solver.add_clause(&[x]);
            assert!(!solver.solve_with(&[!x]).unwrap());
            // The conflicting assumption must not persist.
            assert!(solver.solve().unwrap());
        }
    }

    #[test]
    fn and_builder_truth_table() {
        for mut solver in backends() {
            let a = solver.fresh_lit();
            let b = solver.fresh_lit();
            let y = solver.and_lit(a, b);
            assert!(solver.solve_with(&[a, b, y]).unwrap());
            assert!(!solver.solve_with(&[a, !b, y]).unwrap());
            assert!(!solver.solve_with(&[!a, b, y]).unwrap());
            assert!(solver.solve_with(&[!a, !b, !y]).unwrap());
        }
    }

    #[test]
    fn xor_and_iff_builders_disagree() {
        for mut solver in backends() {
            let a = solver.fresh_lit();
            let b = solver.fresh_lit();
            let x = solver.xor_lit(a, b);
            let e = solver.iff_lit(a, b);
            // xor and iff of the same operands can never both hold.
            assert!(!solver.solve_with(&[x, e]).unwrap());
            assert!(solver.solve_with(&[x, !e]).unwrap());
        }
    }

    #[test]
    fn mux_selects_b_when_set() {
        for mut solver in backends() {
            let s = solver.fresh_lit();
            let a = solver.fresh_lit();
            let b = solver.fresh_lit();
            let y = solver.mux_lit(s, a, b);
            assert!(!solver.solve_with(&[s, b, !y]).unwrap());
            assert!(!solver.solve_with(&[!s, a, !y]).unwrap());
            assert!(solver.solve_with(&[s, !b, !y]).unwrap());
        }
    }

    #[test]
    fn and_many_requires_all_operands() {
        for mut solver in backends() {
            let lits: Vec<Lit> = (0..4).map(|_| solver.fresh_lit()).collect();
            let y = solver.and_many(&lits).unwrap();
            assert!(!solver.solve_with(&[y, !lits[2]]).unwrap());
            let all: Vec<Lit> = lits.iter().copied().chain([y]).collect();
            assert!(solver.solve_with(&all).unwrap());
            assert!(solver.and_many(&[]).is_none());
        }
    }

    #[test]
    fn counters_track_allocation() {
        let mut solver = VarisatSolver::new();
        let a = solver.fresh_lit();
        let b = solver.fresh_lit();
        solver.add_clause(&[a, b]);
        assert_eq!(solver.num_variables(), 2);
        assert_eq!(solver.num_clauses(), 1);
    }
}
