//! Signal bits and bit vectors.

use serde::{Deserialize, Serialize};

/// Unique identifier for a wire within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireId(pub u32);

/// Constant signal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Const {
    Zero,
    One,
    /// Unknown value.
    X,
    /// High impedance.
    Z,
}

impl Const {
    /// True for `Zero` and `One`.
    pub fn is_defined(&self) -> bool {
        matches!(self, Const::Zero | Const::One)
    }
}

/// An atomic one-bit signal: a position in a wire, or a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SigBit {
    Const(Const),
    Wire { wire: WireId, bit: u32 },
}

impl SigBit {
    pub fn wire(wire: WireId, bit: u32) -> Self {
        SigBit::Wire { wire, bit }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, SigBit::Const(_))
    }
}

/// An ordered vector of signal bits, LSB first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigSpec(Vec<SigBit>);

impl SigSpec {
    pub fn new() -> Self {
        SigSpec(Vec::new())
    }

    pub fn from_bits(bits: Vec<SigBit>) -> Self {
        SigSpec(bits)
    }

    /// All bits of a wire, LSB first.
    pub fn from_wire(wire: WireId, width: u32) -> Self {
        SigSpec((0..width).map(|bit| SigBit::Wire { wire, bit }).collect())
    }

    /// Unsigned constant of the given width, LSB first.
    pub fn constant(value: u64, width: u32) -> Self {
        SigSpec(
            (0..width)
                .map(|bit| {
                    if bit < 64 && (value >> bit) & 1 == 1 {
                        SigBit::Const(Const::One)
                    } else {
                        SigBit::Const(Const::Zero)
                    }
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bit(&self, index: usize) -> SigBit {
        self.0[index]
    }

    pub fn bits(&self) -> &[SigBit] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SigBit> {
        self.0.iter()
    }

    pub fn push(&mut self, bit: SigBit) {
        self.0.push(bit);
    }

    /// Append another vector (LSB-first concatenation).
    pub fn extend(&mut self, other: &SigSpec) {
        self.0.extend_from_slice(&other.0);
    }

    pub fn is_fully_const(&self) -> bool {
        self.0.iter().all(SigBit::is_const)
    }
}

impl From<SigBit> for SigSpec {
    fn from(bit: SigBit) -> Self {
        SigSpec(vec![bit])
    }
}

impl FromIterator<SigBit> for SigSpec {
    fn from_iter<I: IntoIterator<Item = SigBit>>(iter: I) -> Self {
        SigSpec(iter.into_iter().collect())
    }
}
