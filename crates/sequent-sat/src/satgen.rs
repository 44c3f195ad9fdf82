//! Cell-to-CNF encoder.
//!
//! `SatGen` unrolls a module's cells over time steps. For each (canonical
//! signal bit, step) pair it keeps exactly one solver literal; encoding a
//! cell at a step adds clauses tying its output literals at that step to
//! its input literals at the same step, or at the previous step for the
//! state-holding input of sequential cells. Step 1 state bits stay
//! unconstrained, which is what gives proofs their arbitrary-starting-state
//! character.
//!
//! Cells are visited in module order and ports in a fixed order per cell
//! family, so two runs over the same module produce identical CNF up to
//! variable numbering.

use crate::solver::{Lit, SatSolver, SolverExt};
use log::warn;
use sequent_netlist::{Cell, CellKind, Const, Module, SigBit, SigMap, SigSpec};
use std::collections::{HashMap, HashSet};

pub struct SatGen {
    solver: Box<dyn SatSolver>,
    sigmap: SigMap,
    lit_map: HashMap<(SigBit, u32), Lit>,
    warned: HashSet<String>,
    lit_true: Lit,
    lit_false: Lit,
}

impl SatGen {
    pub fn new(module: &Module, mut solver: Box<dyn SatSolver>) -> Self {
        let lit_true = solver.fresh_lit();
        solver.add_clause(&[lit_true]);
        SatGen {
            solver,
            sigmap: SigMap::new(module),
            lit_map: HashMap::new(),
            warned: HashSet::new(),
            lit_true,
            lit_false: !lit_true,
        }
    }

    pub fn sigmap(&self) -> &SigMap {
        &self.sigmap
    }

    pub fn solver_mut(&mut self) -> &mut dyn SatSolver {
        self.solver.as_mut()
    }

    pub fn num_variables(&self) -> usize {
        self.solver.num_variables()
    }

    pub fn num_clauses(&self) -> usize {
        self.solver.num_clauses()
    }

    pub fn lit_true(&self) -> Lit {
        self.lit_true
    }

    pub fn lit_false(&self) -> Lit {
        self.lit_false
    }

    /// Number of distinct unmodellable cell types seen so far.
    pub fn unmodelled_warnings(&self) -> usize {
        self.warned.len()
    }

    /// The solver literal for `bit` at `step`. Bits canonicalize first, so
    /// aliased bits share a literal; `0`/`1` map to the constant literals;
    /// `x`/`z` get one free variable per (constant, step).
    pub fn sig_lit(&mut self, bit: SigBit, step: u32) -> Lit {
        let bit = self.sigmap.canon(bit);
        match bit {
            SigBit::Const(Const::Zero) => self.lit_false,
            SigBit::Const(Const::One) => self.lit_true,
            other => {
                if let Some(&lit) = self.lit_map.get(&(other, step)) {
                    return lit;
                }
                let lit = self.solver.fresh_lit();
                self.lit_map.insert((other, step), lit);
                lit
            }
        }
    }

    pub fn sig_lits(&mut self, spec: &SigSpec, step: u32) -> Vec<Lit> {
        spec.iter().map(|&bit| self.sig_lit(bit, step)).collect()
    }

    fn port_lits(&mut self, cell: &Cell, port: &str, step: u32) -> Vec<Lit> {
        match cell.port(port) {
            Some(spec) => self.sig_lits(spec, step),
            None => Vec::new(),
        }
    }

    /// `⋀ lits`, `true` for the empty conjunction.
    pub fn and_all(&mut self, lits: &[Lit]) -> Lit {
        let t = self.lit_true;
        self.solver.and_many(lits).unwrap_or(t)
    }

    /// `⋁ lits`, `false` for the empty disjunction.
    pub fn or_all(&mut self, lits: &[Lit]) -> Lit {
        let f = self.lit_false;
        self.solver.or_many(lits).unwrap_or(f)
    }

    /// Encode one cell at one time step. Returns false when the cell's type
    /// has no model; its outputs then stay free variables and a warning is
    /// logged once per type per run.
    pub fn encode_cell(&mut self, cell: &Cell, step: u32) -> bool {
        match &cell.kind {
            CellKind::Buf => {
                let a = self.port_lits(cell, "A", step);
                let y = self.port_lits(cell, "Y", step);
                let a = self.extend(a, y.len(), false);
                for i in 0..y.len() {
                    self.tie(y[i], a[i]);
                }
                true
            }

            CellKind::Not => {
                let a = self.port_lits(cell, "A", step);
                let y = self.port_lits(cell, "Y", step);
                let a = self.extend(a, y.len(), false);
                for i in 0..y.len() {
                    self.tie(y[i], !a[i]);
                }
                true
            }

            kind @ (CellKind::And | CellKind::Or | CellKind::Xor | CellKind::Xnor) => {
                let kind = kind.clone();
                let a = self.port_lits(cell, "A", step);
                let b = self.port_lits(cell, "B", step);
                let y = self.port_lits(cell, "Y", step);
                let a = self.extend(a, y.len(), false);
                let b = self.extend(b, y.len(), false);
                for i in 0..y.len() {
                    match kind {
                        CellKind::And => self.def_and(y[i], a[i], b[i]),
                        CellKind::Or => self.def_or(y[i], a[i], b[i]),
                        CellKind::Xor => self.def_xor(y[i], a[i], b[i]),
                        _ => self.def_xor(y[i], a[i], !b[i]),
                    }
                }
                true
            }

            CellKind::Mux => {
                let a = self.port_lits(cell, "A", step);
                let b = self.port_lits(cell, "B", step);
                let s = self.port_lits(cell, "S", step);
                let y = self.port_lits(cell, "Y", step);
                let a = self.extend(a, y.len(), false);
                let b = self.extend(b, y.len(), false);
                let s = s.first().copied().unwrap_or(self.lit_false);
                for i in 0..y.len() {
                    self.def_mux(y[i], s, a[i], b[i]);
                }
                true
            }

            kind @ (CellKind::ReduceAnd
            | CellKind::ReduceOr
            | CellKind::ReduceXor
            | CellKind::ReduceBool) => {
                let kind = kind.clone();
                let a = self.port_lits(cell, "A", step);
                let y = self.port_lits(cell, "Y", step);
                if y.is_empty() {
                    return true;
                }
                match kind {
                    CellKind::ReduceAnd => self.def_and_many(y[0], &a),
                    CellKind::ReduceXor => {
                        let mut acc = self.lit_false;
                        for &lit in &a {
                            acc = self.solver.xor_lit(acc, lit);
                        }
                        self.tie(y[0], acc);
                    }
                    _ => self.def_or_many(y[0], &a),
                }
                self.zero_upper(&y);
                true
            }

            CellKind::LogicNot => {
                let a = self.port_lits(cell, "A", step);
                let y = self.port_lits(cell, "Y", step);
                if y.is_empty() {
                    return true;
                }
                let any = self.or_all(&a);
                self.tie(y[0], !any);
                self.zero_upper(&y);
                true
            }

            kind @ (CellKind::LogicAnd | CellKind::LogicOr) => {
                let kind = kind.clone();
                let a = self.port_lits(cell, "A", step);
                let b = self.port_lits(cell, "B", step);
                let y = self.port_lits(cell, "Y", step);
                if y.is_empty() {
                    return true;
                }
                let ra = self.or_all(&a);
                let rb = self.or_all(&b);
                match kind {
                    CellKind::LogicAnd => self.def_and(y[0], ra, rb),
                    _ => self.def_or(y[0], ra, rb),
                }
                self.zero_upper(&y);
                true
            }

            CellKind::Eq { signed } | CellKind::Ne { signed } => {
                let negate = matches!(cell.kind, CellKind::Ne { .. });
                let signed = *signed;
                let (a, b) = self.binary_operands(cell, step, signed);
                let y = self.port_lits(cell, "Y", step);
                if y.is_empty() {
                    return true;
                }
                let eqs: Vec<Lit> = (0..a.len())
                    .map(|i| self.solver.iff_lit(a[i], b[i]))
                    .collect();
                let all = self.and_all(&eqs);
                self.tie(y[0], if negate { !all } else { all });
                self.zero_upper(&y);
                true
            }

            CellKind::Lt { signed }
            | CellKind::Le { signed }
            | CellKind::Gt { signed }
            | CellKind::Ge { signed } => {
                let kind = cell.kind.clone();
                let signed = *signed;
                let (mut a, mut b) = self.binary_operands(cell, step, signed);
                let y = self.port_lits(cell, "Y", step);
                if y.is_empty() {
                    return true;
                }
                if signed && !a.is_empty() {
                    // Flipping the sign bits reduces signed comparison to
                    // the unsigned borrow circuit.
                    let msb = a.len() - 1;
                    a[msb] = !a[msb];
                    b[msb] = !b[msb];
                }
                let result = match kind {
                    CellKind::Lt { .. } => self.less_than(&a, &b),
                    CellKind::Gt { .. } => self.less_than(&b, &a),
                    CellKind::Le { .. } => !self.less_than(&b, &a),
                    _ => !self.less_than(&a, &b),
                };
                self.tie(y[0], result);
                self.zero_upper(&y);
                true
            }

            CellKind::Add { signed } | CellKind::Sub { signed } => {
                let subtract = matches!(cell.kind, CellKind::Sub { .. });
                let signed = *signed;
                let a = self.port_lits(cell, "A", step);
                let b = self.port_lits(cell, "B", step);
                let y = self.port_lits(cell, "Y", step);
                let a = self.extend(a, y.len(), signed);
                let b = self.extend(b, y.len(), signed);
                self.def_ripple(&y, &a, &b, subtract);
                true
            }

            CellKind::Shl | CellKind::Shr | CellKind::Sshr => {
                let arith = matches!(cell.kind, CellKind::Sshr);
                let left = matches!(cell.kind, CellKind::Shl);
                let a_raw = self.port_lits(cell, "A", step);
                let b = self.port_lits(cell, "B", step);
                let y = self.port_lits(cell, "Y", step);
                let w = y.len();
                let fill = if arith {
                    a_raw.last().copied().unwrap_or(self.lit_false)
                } else {
                    self.lit_false
                };
                let mut cur = self.extend(a_raw, w, arith);
                for (j, &bj) in b.iter().enumerate() {
                    // Shift stages beyond 2^30 move every bit out.
                    let amount = if j < 31 { Some(1usize << j) } else { None };
                    let mut next = Vec::with_capacity(w);
                    for i in 0..w {
                        let shifted = match amount {
                            Some(am) if left && i >= am => cur[i - am],
                            Some(am) if !left && i + am < w => cur[i + am],
                            _ => {
                                if left {
                                    self.lit_false
                                } else {
                                    fill
                                }
                            }
                        };
                        next.push(self.solver.mux_lit(bj, cur[i], shifted));
                    }
                    cur = next;
                }
                for i in 0..w {
                    self.tie(y[i], cur[i]);
                }
                true
            }

            CellKind::Mul { signed } => {
                let signed = *signed;
                let a = self.port_lits(cell, "A", step);
                let b = self.port_lits(cell, "B", step);
                let y = self.port_lits(cell, "Y", step);
                let w = y.len();
                let a = self.extend(a, w, signed);
                let b = self.extend(b, w, signed);
                let mut acc = vec![self.lit_false; w];
                for i in 0..w {
                    let mut addend = Vec::with_capacity(w);
                    for j in 0..w {
                        if j >= i {
                            addend.push(self.solver.and_lit(a[j - i], b[i]));
                        } else {
                            addend.push(self.lit_false);
                        }
                    }
                    acc = self.ripple_add_fresh(&acc, &addend);
                }
                for i in 0..w {
                    self.tie(y[i], acc[i]);
                }
                true
            }

            CellKind::Dff | CellKind::Dlatch => {
                let q = self.port_lits(cell, "Q", step);
                if step > 1 {
                    let d = self.port_lits(cell, "D", step - 1);
                    let d = self.extend(d, q.len(), false);
                    for i in 0..q.len() {
                        self.tie(q[i], d[i]);
                    }
                }
                // Step 1 state stays free: arbitrary starting state.
                true
            }

            CellKind::Equiv => {
                // Y buffers A. The A↔B consistency terms belong to the
                // induction worker, which also deduplicates them.
                let a = self.port_lits(cell, "A", step);
                let y = self.port_lits(cell, "Y", step);
                for i in 0..y.len().min(a.len()) {
                    self.tie(y[i], a[i]);
                }
                true
            }

            CellKind::Unknown(name) => {
                if self.warned.insert(name.clone()) {
                    warn!("No SAT model available for cell {} ({}).", cell.name, name);
                }
                // Outputs stay free variables; allocating them here keeps
                // later queries stable.
                let _ = self.port_lits(cell, "Y", step);
                let _ = self.port_lits(cell, "Q", step);
                false
            }
        }
    }

    /// Zero- or sign-extend to `width`, truncating a wider operand.
    fn extend(&self, mut lits: Vec<Lit>, width: usize, signed: bool) -> Vec<Lit> {
        let fill = if signed {
            lits.last().copied().unwrap_or(self.lit_false)
        } else {
            self.lit_false
        };
        lits.truncate(width);
        while lits.len() < width {
            lits.push(fill);
        }
        lits
    }

    /// Extend both operands to their common width, per signedness.
    fn binary_operands(&mut self, cell: &Cell, step: u32, signed: bool) -> (Vec<Lit>, Vec<Lit>) {
        let a = self.port_lits(cell, "A", step);
        let b = self.port_lits(cell, "B", step);
        let width = a.len().max(b.len());
        (self.extend(a, width, signed), self.extend(b, width, signed))
    }

    /// `y ↔ x`
    fn tie(&mut self, y: Lit, x: Lit) {
        self.solver.add_clause(&[!y, x]);
        self.solver.add_clause(&[y, !x]);
    }

    fn zero_upper(&mut self, y: &[Lit]) {
        let f = self.lit_false;
        for &bit in &y[1..] {
            self.tie(bit, f);
        }
    }

    fn def_and(&mut self, y: Lit, a: Lit, b: Lit) {
        self.solver.add_clause(&[!y, a]);
        self.solver.add_clause(&[!y, b]);
        self.solver.add_clause(&[y, !a, !b]);
    }

    fn def_or(&mut self, y: Lit, a: Lit, b: Lit) {
        self.solver.add_clause(&[y, !a]);
        self.solver.add_clause(&[y, !b]);
        self.solver.add_clause(&[!y, a, b]);
    }

    fn def_xor(&mut self, y: Lit, a: Lit, b: Lit) {
        self.solver.add_clause(&[!y, !a, !b]);
        self.solver.add_clause(&[!y, a, b]);
        self.solver.add_clause(&[y, a, !b]);
        self.solver.add_clause(&[y, !a, b]);
    }

    fn def_mux(&mut self, y: Lit, s: Lit, a: Lit, b: Lit) {
        self.solver.add_clause(&[!s, !b, y]);
        self.solver.add_clause(&[!s, b, !y]);
        self.solver.add_clause(&[s, !a, y]);
        self.solver.add_clause(&[s, a, !y]);
    }

    fn def_and_many(&mut self, y: Lit, lits: &[Lit]) {
        if lits.is_empty() {
            self.solver.add_clause(&[y]);
            return;
        }
        let mut long = Vec::with_capacity(lits.len() + 1);
        long.push(y);
        for &lit in lits {
            self.solver.add_clause(&[!y, lit]);
            long.push(!lit);
        }
        self.solver.add_clause(&long);
    }

    fn def_or_many(&mut self, y: Lit, lits: &[Lit]) {
        if lits.is_empty() {
            self.solver.add_clause(&[!y]);
            return;
        }
        let mut long = Vec::with_capacity(lits.len() + 1);
        long.push(!y);
        for &lit in lits {
            self.solver.add_clause(&[y, !lit]);
            long.push(lit);
        }
        self.solver.add_clause(&long);
    }

    fn def_ripple(&mut self, y: &[Lit], a: &[Lit], b: &[Lit], subtract: bool) {
        let mut carry = self.lit_false;
        for i in 0..y.len() {
            let axb = self.solver.xor_lit(a[i], b[i]);
            self.def_xor(y[i], axb, carry);
            carry = if subtract {
                let t1 = self.solver.and_lit(!a[i], b[i]);
                let t2 = self.solver.and_lit(carry, !axb);
                self.solver.or_lit(t1, t2)
            } else {
                let t1 = self.solver.and_lit(a[i], b[i]);
                let t2 = self.solver.and_lit(carry, axb);
                self.solver.or_lit(t1, t2)
            };
        }
    }

    fn ripple_add_fresh(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        let mut carry = self.lit_false;
        let mut out = Vec::with_capacity(a.len());
        for i in 0..a.len() {
            let axb = self.solver.xor_lit(a[i], b[i]);
            out.push(self.solver.xor_lit(axb, carry));
            let ab = self.solver.and_lit(a[i], b[i]);
            let ca = self.solver.and_lit(carry, axb);
            carry = self.solver.or_lit(ab, ca);
        }
        out
    }

    /// Unsigned `a < b` as the borrow out of `a - b`.
    fn less_than(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let mut borrow = self.lit_false;
        for i in 0..a.len() {
            let nab = self.solver.and_lit(!a[i], b[i]);
            let axb = self.solver.xor_lit(a[i], b[i]);
            let keep = self.solver.and_lit(borrow, !axb);
            borrow = self.solver.or_lit(nab, keep);
        }
        borrow
    }
}
