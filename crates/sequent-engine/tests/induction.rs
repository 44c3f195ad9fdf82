//! End-to-end induction scenarios over programmatically built modules.

use sequent_engine::{
    run_equiv_induct, CommandRegistry, EngineError, EquivInductCommand, InductOptions,
};
use sequent_netlist::{Cell, CellKind, Design, Module, Selection, SigSpec};
use sequent_sat::BackendKind;

fn options(max_seq: u32) -> InductOptions {
    InductOptions {
        max_seq,
        ..InductOptions::default()
    }
}

/// Two isomorphic AND trees over the same primary inputs, with a marker
/// across their roots. Returns the marker's cell index.
fn add_and_tree_pair(module: &mut Module, tag: &str) -> usize {
    let x = module.wire(format!("{tag}_x"), 1);
    let y = module.wire(format!("{tag}_y"), 1);
    let t1 = module.wire(format!("{tag}_t1"), 1);
    let t2 = module.wire(format!("{tag}_t2"), 1);
    let o = module.wire(format!("{tag}_o"), 1);
    module.add_cell(
        Cell::new(format!("{tag}_g1"), CellKind::And)
            .with_port("A", x.clone())
            .with_port("B", y.clone())
            .with_port("Y", t1.clone()),
    );
    module.add_cell(
        Cell::new(format!("{tag}_g2"), CellKind::And)
            .with_port("A", x)
            .with_port("B", y)
            .with_port("Y", t2.clone()),
    );
    module.add_cell(
        Cell::new(format!("{tag}_m"), CellKind::Equiv)
            .with_port("A", t1)
            .with_port("B", t2)
            .with_port("Y", o),
    )
}

/// Two two-stage pipelines fed by the same input, with a marker across the
/// second-stage registers. Needs two induction steps to prove.
fn pipeline_pair_module() -> (Design, usize) {
    let mut module = Module::new("top");
    let x = module.wire("x", 1);
    let pa = module.wire("pa", 1);
    let qa = module.wire("qa", 1);
    let pb = module.wire("pb", 1);
    let qb = module.wire("qb", 1);
    let o = module.wire("o", 1);
    module.add_cell(
        Cell::new("ffa0", CellKind::Dff)
            .with_port("D", x.clone())
            .with_port("Q", pa.clone()),
    );
    module.add_cell(
        Cell::new("ffa1", CellKind::Dff)
            .with_port("D", pa)
            .with_port("Q", qa.clone()),
    );
    module.add_cell(
        Cell::new("ffb0", CellKind::Dff)
            .with_port("D", x)
            .with_port("Q", pb.clone()),
    );
    module.add_cell(
        Cell::new("ffb1", CellKind::Dff)
            .with_port("D", pb)
            .with_port("Q", qb.clone()),
    );
    let marker = module.add_cell(
        Cell::new("m", CellKind::Equiv)
            .with_port("A", qa)
            .with_port("B", qb)
            .with_port("Y", o),
    );
    let mut design = Design::new();
    design.add_module(module);
    (design, marker)
}

#[test]
fn combinational_identity_proves_at_depth_one() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let marker = add_and_tree_pair(module, "a");
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(1));
    assert_eq!(stats.proved, 1);
    assert_eq!(stats.unproven, 0);
    assert!(design.modules[0].cells()[marker].is_proven_equiv());
}

#[test]
fn pipeline_pair_needs_two_steps() {
    let (mut design, marker) = pipeline_pair_module();
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(2));
    assert_eq!(stats.proved, 1);
    assert!(design.modules[0].cells()[marker].is_proven_equiv());

    // At depth 1 the induction step fails and the fallback query at step 2
    // still sees free first-stage state: the marker stays open.
    let (mut design, marker) = pipeline_pair_module();
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(1));
    assert_eq!(stats.proved, 0);
    assert_eq!(stats.unproven, 1);
    assert!(!design.modules[0].cells()[marker].is_proven_equiv());
}

#[test]
fn constant_mismatch_diverges_without_rewrites() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let o = module.wire("o", 1);
    let marker = module.add_cell(
        Cell::new("m", CellKind::Equiv)
            .with_port("A", SigSpec::constant(0, 1))
            .with_port("B", SigSpec::constant(1, 1))
            .with_port("Y", o),
    );
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(4));
    assert_eq!(stats.proved, 0);
    assert_eq!(stats.unproven, 1);
    assert_eq!(stats.diverged_modules, 1);
    assert!(!design.modules[0].cells()[marker].is_proven_equiv());
}

#[test]
fn fallback_separates_good_markers_from_bad() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let m1 = add_and_tree_pair(module, "a");
    let m2 = add_and_tree_pair(module, "b");
    let u = module.wire("u", 1);
    let v = module.wire("v", 1);
    let o = module.wire("bad_o", 1);
    let m3 = module.add_cell(
        Cell::new("bad_m", CellKind::Equiv)
            .with_port("A", u)
            .with_port("B", v)
            .with_port("Y", o),
    );

    // The genuinely non-equivalent marker defeats whole-workset induction
    // at every depth; the fallback then proves the two valid markers
    // individually and leaves the third.
    for depth in [1, 4] {
        let mut design = design.clone();
        let stats = run_equiv_induct(&mut design, &Selection::all(), &options(depth));
        assert_eq!(stats.proved, 2, "depth {depth}");
        assert_eq!(stats.unproven, 1, "depth {depth}");
        let cells = design.modules[0].cells();
        assert!(cells[m1].is_proven_equiv());
        assert!(cells[m2].is_proven_equiv());
        assert!(!cells[m3].is_proven_equiv());
    }
}

#[test]
fn unknown_cell_weakens_but_does_not_block() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let marker = add_and_tree_pair(module, "a");
    let w = module.wire("w", 1);
    module.add_cell(Cell::new("mystery", CellKind::Unknown("acme_macro".to_string())).with_port("Y", w));
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(4));
    assert_eq!(stats.proved, 1);
    assert!(design.modules[0].cells()[marker].is_proven_equiv());
}

#[test]
fn syntactically_aliased_marker_is_skipped() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let a = module.wire("a", 1);
    let o = module.wire("o", 1);
    module.add_cell(
        Cell::new("m", CellKind::Equiv)
            .with_port("A", a.clone())
            .with_port("B", a)
            .with_port("Y", o),
    );
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(4));
    assert_eq!(stats.modules_visited, 0);
    assert_eq!(stats.proved, 0);
    assert_eq!(stats.unproven, 0);
}

#[test]
fn zero_width_marker_is_trivially_proven() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    module.add_cell(
        Cell::new("m", CellKind::Equiv)
            .with_port("A", SigSpec::new())
            .with_port("B", SigSpec::new())
            .with_port("Y", SigSpec::new()),
    );
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(4));
    assert_eq!(stats.modules_visited, 0);
    assert_eq!(stats.proved, 0);
    assert!(design.modules[0].cells()[0].is_proven_equiv());
}

#[test]
fn wire_aliased_marker_stays_in_workset_and_rewrites() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let w1 = module.wire("w1", 1);
    let w2 = module.wire("w2", 1);
    let o = module.wire("o", 1);
    module.connect(w1.clone(), w2.clone()).unwrap();
    let marker = module.add_cell(
        Cell::new("m", CellKind::Equiv)
            .with_port("A", w1)
            .with_port("B", w2)
            .with_port("Y", o),
    );
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(4));
    // Canonically equal but syntactically distinct: it stays in the
    // workset, contributes nothing to the consistency terms, and must
    // still be rewritten.
    assert_eq!(stats.modules_visited, 1);
    assert_eq!(stats.proved, 1);
    assert!(design.modules[0].cells()[marker].is_proven_equiv());
}

#[test]
fn second_run_is_idempotent() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    add_and_tree_pair(module, "a");
    let first = run_equiv_induct(&mut design, &Selection::all(), &options(4));
    assert_eq!(first.proved, 1);
    let second = run_equiv_induct(&mut design, &Selection::all(), &options(4));
    assert_eq!(second.proved, 0);
    assert_eq!(second.modules_visited, 0);
}

#[test]
fn selection_restricts_modules() {
    let mut design = Design::new();
    let first = design.add_module(Module::new("first"));
    let m1 = add_and_tree_pair(first, "a");
    let second = design.add_module(Module::new("second"));
    let m2 = add_and_tree_pair(second, "b");

    let selection = Selection::parse(&["first"]);
    let stats = run_equiv_induct(&mut design, &selection, &options(4));
    assert_eq!(stats.proved, 1);
    assert!(design.modules[0].cells()[m1].is_proven_equiv());
    assert!(!design.modules[1].cells()[m2].is_proven_equiv());
}

#[test]
fn cadical_backend_proves_the_same() {
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let marker = add_and_tree_pair(module, "a");
    let opts = InductOptions {
        backend: BackendKind::Cadical,
        ..options(4)
    };
    let stats = run_equiv_induct(&mut design, &Selection::all(), &opts);
    assert_eq!(stats.proved, 1);
    assert!(design.modules[0].cells()[marker].is_proven_equiv());
}

#[test]
fn sequential_toggle_registers_prove_inductively() {
    // Two toggle registers: D = !Q on both sides. Once they agree they
    // agree forever, which one induction step establishes.
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let qa = module.wire("qa", 1);
    let da = module.wire("da", 1);
    let qb = module.wire("qb", 1);
    let db = module.wire("db", 1);
    let o = module.wire("o", 1);
    module.add_cell(
        Cell::new("inva", CellKind::Not)
            .with_port("A", qa.clone())
            .with_port("Y", da.clone()),
    );
    module.add_cell(
        Cell::new("ffa", CellKind::Dff)
            .with_port("D", da)
            .with_port("Q", qa.clone()),
    );
    module.add_cell(
        Cell::new("invb", CellKind::Not)
            .with_port("A", qb.clone())
            .with_port("Y", db.clone()),
    );
    module.add_cell(
        Cell::new("ffb", CellKind::Dff)
            .with_port("D", db)
            .with_port("Q", qb.clone()),
    );
    let marker = module.add_cell(
        Cell::new("m", CellKind::Equiv)
            .with_port("A", qa)
            .with_port("B", qb)
            .with_port("Y", o),
    );
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(1));
    assert_eq!(stats.proved, 1);
    assert!(design.modules[0].cells()[marker].is_proven_equiv());
}

#[test]
fn command_line_drives_the_engine() {
    let mut registry = CommandRegistry::new();
    registry.register(Box::new(EquivInductCommand));

    let (mut design, marker) = pipeline_pair_module();
    registry
        .execute_line("equiv_induct -seq 2 top", &mut design)
        .unwrap();
    assert!(design.modules[0].cells()[marker].is_proven_equiv());

    let err = registry
        .execute_line("equiv_induct -seq many", &mut design)
        .unwrap_err();
    assert!(matches!(err, EngineError::BadArguments(_)));
}

#[test]
fn multi_bit_marker_proves_bitwise() {
    // A 2-bit marker across an adder and its re-association.
    let mut design = Design::new();
    let module = design.add_module(Module::new("top"));
    let a = module.wire("a", 2);
    let b = module.wire("b", 2);
    let s1 = module.wire("s1", 2);
    let s2 = module.wire("s2", 2);
    let o = module.wire("o", 2);
    module.add_cell(
        Cell::new("add1", CellKind::Add { signed: false })
            .with_port("A", a.clone())
            .with_port("B", b.clone())
            .with_port("Y", s1.clone()),
    );
    module.add_cell(
        Cell::new("add2", CellKind::Add { signed: false })
            .with_port("A", b)
            .with_port("B", a)
            .with_port("Y", s2.clone()),
    );
    let marker = module.add_cell(
        Cell::new("m", CellKind::Equiv)
            .with_port("A", s1)
            .with_port("B", s2)
            .with_port("Y", o),
    );
    let stats = run_equiv_induct(&mut design, &Selection::all(), &options(1));
    assert_eq!(stats.proved, 1);
    assert!(design.modules[0].cells()[marker].is_proven_equiv());
}
