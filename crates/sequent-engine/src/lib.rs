//! Temporal-induction equivalence proving engine.
//!
//! The engine discharges equivalence-marker cells by k-step induction over
//! an incremental SAT encoding of the module: if all markers agreeing for
//! steps 1..=i forces them to agree at step i+1, every marker holds on all
//! reachable behavior from an arbitrary starting state (weak equivalence).
//! Proven markers are committed by rewriting their `B` port to alias `A`.
//!
//! [`induct`] holds the per-module worker, [`driver`] the module iteration
//! and the `equiv_induct` command, [`command`] the host-owned command
//! registry.

pub mod command;
pub mod driver;
pub mod induct;

pub use command::{Command, CommandRegistry};
pub use driver::{run_equiv_induct, EquivInductCommand, EquivInductStats};
pub use induct::{InductOptions, InductWorker, WorkerOutcome};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid arguments: {0}")]
    BadArguments(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
