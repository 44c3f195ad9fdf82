//! Netlist intermediate representation for the sequent equivalence prover.
//!
//! The IR is bit-granular: every signal is a vector of [`SigBit`]s, where a
//! bit is either a position in a named wire or a constant. Cells carry a
//! typed [`CellKind`] and named ports holding [`SigSpec`] vectors. Modules
//! own their wires, cells and the wire-alias connection list; [`SigMap`]
//! folds that alias relation into a canonical representative per bit.
//!
//! All IR types serialize with serde, which is also the design interchange
//! format of the command-line front end.

pub mod cell;
pub mod design;
pub mod selection;
pub mod sig;
pub mod sigmap;

pub use cell::{Cell, CellKind};
pub use design::{Design, DesignStats, Module, ModuleStats, Wire};
pub use selection::Selection;
pub use sig::{Const, SigBit, SigSpec, WireId};
pub use sigmap::SigMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetlistError {
    #[error("connection width mismatch: {left} bits vs {right} bits")]
    WidthMismatch { left: usize, right: usize },
}

pub type NetlistResult<T> = Result<T, NetlistError>;
