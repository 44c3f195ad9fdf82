//! Signal canonicalization over wire aliases.

use crate::design::Module;
use crate::sig::{SigBit, SigSpec};
use std::collections::HashMap;

/// Union-find over signal bits, built from a module's connection list.
///
/// `canon` maps every bit to the unique representative of its alias group.
/// Constant bits always win representative elections, so a wire bit tied to
/// a constant canonicalizes to that constant. Two bits are semantically the
/// same signal iff their canonical forms are equal.
#[derive(Debug, Clone, Default)]
pub struct SigMap {
    // Only non-root bits have an entry; roots are absent.
    parent: HashMap<SigBit, SigBit>,
}

impl SigMap {
    /// One linear sweep over the module's connections.
    pub fn new(module: &Module) -> Self {
        let mut map = SigMap::default();
        for (left, right) in module.connections() {
            for (&a, &b) in left.bits().iter().zip(right.bits()) {
                map.union(a, b);
            }
        }
        map
    }

    /// Canonical representative of `bit`.
    pub fn canon(&self, mut bit: SigBit) -> SigBit {
        while let Some(&up) = self.parent.get(&bit) {
            bit = up;
        }
        bit
    }

    /// Canonicalize every bit of a vector.
    pub fn canon_spec(&self, spec: &SigSpec) -> SigSpec {
        spec.iter().map(|&bit| self.canon(bit)).collect()
    }

    fn find(&mut self, mut bit: SigBit) -> SigBit {
        // Path halving keeps chains short without a rank table.
        while let Some(&up) = self.parent.get(&bit) {
            if let Some(&grand) = self.parent.get(&up) {
                self.parent.insert(bit, grand);
            }
            bit = up;
        }
        bit
    }

    fn union(&mut self, a: SigBit, b: SigBit) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        // Constants must stay representatives. With two distinct non-const
        // roots the first-seen one wins, which keeps construction
        // deterministic.
        match (ra.is_const(), rb.is_const()) {
            (true, true) => {
                // Two distinct constants tied together (e.g. bus-merge
                // artifacts aliasing a 0-net with a 1-net). A constant bit
                // is one shared value module-wide, so merging here would
                // corrupt canon() for every use of that constant. Leave
                // both groups untouched; the conflict surfaces as an
                // unsatisfiable consistency term instead.
            }
            (false, true) => {
                self.parent.insert(ra, rb);
            }
            _ => {
                self.parent.insert(rb, ra);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Module;
    use crate::sig::{Const, SigSpec};

    #[test]
    fn chained_aliases_share_a_representative() {
        let mut module = Module::new("top");
        let a = module.wire("a", 1);
        let b = module.wire("b", 1);
        let c = module.wire("c", 1);
        module.connect(a.clone(), b.clone()).unwrap();
        module.connect(b.clone(), c.clone()).unwrap();
        let sigmap = SigMap::new(&module);
        let ra = sigmap.canon(a.bit(0));
        assert_eq!(ra, sigmap.canon(b.bit(0)));
        assert_eq!(ra, sigmap.canon(c.bit(0)));
    }

    #[test]
    fn unaliased_bits_stay_distinct() {
        let mut module = Module::new("top");
        let a = module.wire("a", 1);
        let b = module.wire("b", 1);
        let sigmap = SigMap::new(&module);
        assert_ne!(sigmap.canon(a.bit(0)), sigmap.canon(b.bit(0)));
    }

    #[test]
    fn constants_win_elections() {
        let mut module = Module::new("top");
        let a = module.wire("a", 1);
        let b = module.wire("b", 1);
        module.connect(a.clone(), b.clone()).unwrap();
        module.connect(b.clone(), SigSpec::constant(1, 1)).unwrap();
        let sigmap = SigMap::new(&module);
        assert_eq!(sigmap.canon(a.bit(0)), SigBit::Const(Const::One));
        assert_eq!(sigmap.canon(b.bit(0)), SigBit::Const(Const::One));
    }

    #[test]
    fn conflicting_constants_stay_distinct() {
        let mut module = Module::new("top");
        let a = module.wire("a", 1);
        let b = module.wire("b", 1);
        module.connect(a.clone(), SigSpec::constant(0, 1)).unwrap();
        module.connect(b.clone(), SigSpec::constant(1, 1)).unwrap();
        // Ties 0 to 1. Neither constant may end up aliased to the other.
        module.connect(a.clone(), b.clone()).unwrap();
        let sigmap = SigMap::new(&module);
        assert_eq!(
            sigmap.canon(SigBit::Const(Const::Zero)),
            SigBit::Const(Const::Zero)
        );
        assert_eq!(
            sigmap.canon(SigBit::Const(Const::One)),
            SigBit::Const(Const::One)
        );
        assert_eq!(sigmap.canon(a.bit(0)), SigBit::Const(Const::Zero));
        assert_eq!(sigmap.canon(b.bit(0)), SigBit::Const(Const::One));
    }

    #[test]
    fn canon_spec_is_bitwise() {
        let mut module = Module::new("top");
        let a = module.wire("a", 2);
        let b = module.wire("b", 2);
        module.connect(a.clone(), b.clone()).unwrap();
        let sigmap = SigMap::new(&module);
        assert_eq!(sigmap.canon_spec(&a), sigmap.canon_spec(&b));
    }
}
