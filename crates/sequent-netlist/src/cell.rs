//! Logic cells: typed functions over named ports.

use crate::sig::SigSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The function computed by a cell.
///
/// Operand signedness for the arithmetic and comparison families is carried
/// on the variant; operand widths are the port vector lengths. Cell types
/// the encoder has no model for are preserved as [`CellKind::Unknown`] with
/// their original type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    // Bitwise combinational.
    Buf,
    Not,
    And,
    Or,
    Xor,
    Xnor,
    /// 2:1 multiplexer: `Y = S ? B : A`.
    Mux,

    // Reductions and boolean casts. Output is a single bit in Y[0].
    ReduceAnd,
    ReduceOr,
    ReduceXor,
    ReduceBool,
    LogicNot,
    LogicAnd,
    LogicOr,

    // Equality.
    Eq { signed: bool },
    Ne { signed: bool },

    // Arithmetic.
    Add { signed: bool },
    Sub { signed: bool },
    Lt { signed: bool },
    Le { signed: bool },
    Gt { signed: bool },
    Ge { signed: bool },
    Shl,
    Shr,
    /// Arithmetic (sign-preserving) right shift.
    Sshr,
    Mul { signed: bool },

    // Sequential state elements.
    Dff,
    Dlatch,

    /// Equivalence marker: asserts `A ≡ B`, drives `Y = A`.
    Equiv,

    /// Foreign cell type with no model; outputs stay unconstrained.
    Unknown(String),
}

impl CellKind {
    /// True for state-holding cells whose output at step `i` is tied to
    /// their data input at step `i - 1`.
    pub fn is_sequential(&self) -> bool {
        matches!(self, CellKind::Dff | CellKind::Dlatch)
    }

    /// Short type name used in logs and statistics.
    pub fn type_name(&self) -> &str {
        match self {
            CellKind::Buf => "buf",
            CellKind::Not => "not",
            CellKind::And => "and",
            CellKind::Or => "or",
            CellKind::Xor => "xor",
            CellKind::Xnor => "xnor",
            CellKind::Mux => "mux",
            CellKind::ReduceAnd => "reduce_and",
            CellKind::ReduceOr => "reduce_or",
            CellKind::ReduceXor => "reduce_xor",
            CellKind::ReduceBool => "reduce_bool",
            CellKind::LogicNot => "logic_not",
            CellKind::LogicAnd => "logic_and",
            CellKind::LogicOr => "logic_or",
            CellKind::Eq { .. } => "eq",
            CellKind::Ne { .. } => "ne",
            CellKind::Add { .. } => "add",
            CellKind::Sub { .. } => "sub",
            CellKind::Lt { .. } => "lt",
            CellKind::Le { .. } => "le",
            CellKind::Gt { .. } => "gt",
            CellKind::Ge { .. } => "ge",
            CellKind::Shl => "shl",
            CellKind::Shr => "shr",
            CellKind::Sshr => "sshr",
            CellKind::Mul { .. } => "mul",
            CellKind::Dff => "dff",
            CellKind::Dlatch => "dlatch",
            CellKind::Equiv => "equiv",
            CellKind::Unknown(name) => name,
        }
    }
}

/// A cell instance: a named node with a typed function and named ports.
///
/// Port names follow the usual conventions: `A`/`B` operands, `S` select,
/// `Y` output, `D`/`Q` for state elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub name: String,
    pub kind: CellKind,
    ports: BTreeMap<String, SigSpec>,
}

impl Cell {
    pub fn new(name: impl Into<String>, kind: CellKind) -> Self {
        Cell {
            name: name.into(),
            kind,
            ports: BTreeMap::new(),
        }
    }

    /// Builder-style port assignment.
    pub fn with_port(mut self, port: &str, spec: SigSpec) -> Self {
        self.ports.insert(port.to_string(), spec);
        self
    }

    pub fn port(&self, port: &str) -> Option<&SigSpec> {
        self.ports.get(port)
    }

    /// Reassign a port. The equivalence engine uses this for exactly one
    /// mutation: aliasing port `B` to port `A` after a successful proof.
    pub fn set_port(&mut self, port: &str, spec: SigSpec) {
        self.ports.insert(port.to_string(), spec);
    }

    pub fn ports(&self) -> impl Iterator<Item = (&str, &SigSpec)> {
        self.ports.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn is_sequential(&self) -> bool {
        self.kind.is_sequential()
    }

    pub fn is_equiv(&self) -> bool {
        matches!(self.kind, CellKind::Equiv)
    }

    /// An equivalence marker counts as proven once its `A` and `B` ports
    /// are syntactically the same signal.
    pub fn is_proven_equiv(&self) -> bool {
        self.is_equiv() && self.port("A") == self.port("B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sig::{SigSpec, WireId};

    #[test]
    fn builder_assigns_ports() {
        let cell = Cell::new("g1", CellKind::And)
            .with_port("A", SigSpec::from_wire(WireId(0), 4))
            .with_port("B", SigSpec::from_wire(WireId(1), 4))
            .with_port("Y", SigSpec::from_wire(WireId(2), 4));
        assert_eq!(cell.port("A").unwrap().len(), 4);
        assert!(cell.port("S").is_none());
        assert!(!cell.is_sequential());
    }

    #[test]
    fn set_port_rewrites_in_place() {
        let mut cell = Cell::new("eq1", CellKind::Equiv)
            .with_port("A", SigSpec::from_wire(WireId(0), 1))
            .with_port("B", SigSpec::from_wire(WireId(1), 1));
        assert!(!cell.is_proven_equiv());
        let a = cell.port("A").cloned().unwrap();
        cell.set_port("B", a);
        assert!(cell.is_proven_equiv());
    }

    #[test]
    fn sequential_kinds() {
        assert!(CellKind::Dff.is_sequential());
        assert!(CellKind::Dlatch.is_sequential());
        assert!(!CellKind::Equiv.is_sequential());
    }

    #[test]
    fn unknown_kind_keeps_type_name() {
        let kind = CellKind::Unknown("acme_macro".to_string());
        assert_eq!(kind.type_name(), "acme_macro");
    }
}
