//! Incremental SAT machinery for the sequent equivalence prover.
//!
//! [`solver`] is a thin façade over an incremental SAT backend: variable
//! allocation, permanent clauses, solve-under-assumptions and eager Tseitin
//! builders for the boolean connectives, behind an object-safe trait so
//! backends can be swapped without touching the induction engine. Two
//! backends ship: varisat (default) and CaDiCaL.
//!
//! [`satgen`] turns netlist cells into CNF, one time step at a time.

pub mod satgen;
pub mod solver;

pub use satgen::SatGen;
pub use solver::{new_solver, BackendKind, CadicalSolver, Lit, SatSolver, SolverExt, Var, VarisatSolver};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SatError {
    /// The backend gave up (timeout, interrupt, resource limit). The
    /// induction engine treats this as proof failure, never as success.
    #[error("solver returned unknown")]
    Unknown,
    #[error("solver backend error: {0}")]
    Backend(String),
}

pub type SatResult<T> = Result<T, SatError>;
