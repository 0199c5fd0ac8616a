//! Property tests: field activity closure, category reset, staleness
//! monotonicity, and name uniqueness under random edit sequences.

use cfdcase_core::{
    FaceSet, FieldKind, FieldValue, FlowRegime, PhaseModel, PhysicsPatch, ShapeRef, ViscousModel,
};
use cfdcase_model::{Artifact, CaseModel, EditKind, EscalationTable, StalenessTracker};
use cfdcase_registry::{BoundaryRegistry, Category};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Add(usize),
    SetCategory(usize, usize),
    SetType(usize, usize),
    SetChoice(usize, usize, usize),
    ToggleFlag(usize, usize),
    Viscous(usize),
    Flow(usize),
    Phase(usize),
    Remove(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..6).prop_map(Op::Add),
        (0usize..8, 0usize..6).prop_map(|(b, c)| Op::SetCategory(b, c)),
        (0usize..8, 0usize..5).prop_map(|(b, t)| Op::SetType(b, t)),
        (0usize..8, 0usize..4, 0usize..5).prop_map(|(b, f, o)| Op::SetChoice(b, f, o)),
        (0usize..8, 0usize..4).prop_map(|(b, f)| Op::ToggleFlag(b, f)),
        (0usize..5).prop_map(Op::Viscous),
        (0usize..3).prop_map(Op::Flow),
        (0usize..2).prop_map(Op::Phase),
        (0usize..8).prop_map(Op::Remove),
    ]
}

const VISCOUS: [ViscousModel; 5] = [
    ViscousModel::Inviscid,
    ViscousModel::Laminar,
    ViscousModel::Rans,
    ViscousModel::Les,
    ViscousModel::Des,
];
const FLOW: [FlowRegime; 3] = [
    FlowRegime::Isothermal,
    FlowRegime::NonIsothermal,
    FlowRegime::HighMachCompressible,
];
const PHASE: [PhaseModel; 2] = [PhaseModel::Single, PhaseModel::FreeSurface];

fn nth_boundary(model: &CaseModel, n: usize) -> Option<cfdcase_core::BoundaryId> {
    let count = model.boundaries().count();
    if count == 0 {
        return None;
    }
    model.boundaries().nth(n % count).map(|b| b.id())
}

/// Apply an edit, ignoring rejections: rejected edits must leave the model
/// consistent too.
fn apply(model: &mut CaseModel, op: &Op, serial: &mut u32) {
    let registry = BoundaryRegistry::global();
    match *op {
        Op::Add(c) => {
            *serial += 1;
            let name = format!("b{serial}");
            let faces = FaceSet::new([ShapeRef::from(name.as_str())]);
            let _ = model.add_boundary_condition(&name, faces, Category::ALL[c]);
        }
        Op::SetCategory(b, c) => {
            if let Some(id) = nth_boundary(model, b) {
                let _ = model.set_category(id, Category::ALL[c]);
            }
        }
        Op::SetType(b, t) => {
            if let Some(id) = nth_boundary(model, b) {
                let category = model.boundary(id).map(|bc| bc.category());
                if let Some(category) = category {
                    let types = registry.legal_types(category);
                    let _ = model.set_type(id, types[t % types.len()]);
                }
            }
        }
        Op::SetChoice(b, f, o) => {
            if let Some(id) = nth_boundary(model, b) {
                let bc = model.boundary(id).unwrap();
                let choices: Vec<_> = registry
                    .active_fields(&bc.variant(), model.physics(), bc.values())
                    .into_iter()
                    .filter_map(|s| match &s.kind {
                        FieldKind::Choice { options } => Some((s.name, *options)),
                        _ => None,
                    })
                    .collect();
                if !choices.is_empty() {
                    let (name, options) = choices[f % choices.len()];
                    let option = options[o % options.len()].id;
                    let _ = model.set_field(id, name, FieldValue::choice(option));
                }
            }
        }
        Op::ToggleFlag(b, f) => {
            if let Some(id) = nth_boundary(model, b) {
                let bc = model.boundary(id).unwrap();
                let flags: Vec<_> = bc
                    .values()
                    .iter()
                    .filter_map(|(name, v)| {
                        v.and_then(FieldValue::as_bool)
                            .map(|on| (name.to_string(), on))
                    })
                    .collect();
                if !flags.is_empty() {
                    let (name, on) = &flags[f % flags.len()];
                    let _ = model.set_field(id, name, FieldValue::Boolean(!on));
                }
            }
        }
        Op::Viscous(v) => {
            let _ = model.set_physics(&PhysicsPatch::default().viscous(VISCOUS[v]));
        }
        Op::Flow(f) => {
            let _ = model.set_physics(&PhysicsPatch::default().flow(FLOW[f]));
        }
        Op::Phase(p) => {
            let _ = model.set_physics(&PhysicsPatch::default().phase(PHASE[p]));
        }
        Op::Remove(b) => {
            if let Some(id) = nth_boundary(model, b) {
                let _ = model.remove_boundary_condition(id);
            }
        }
    }
}

proptest! {
    #[test]
    fn values_always_match_active_fields(ops in prop::collection::vec(arb_op(), 1..40)) {
        let registry = BoundaryRegistry::global();
        let mut model = CaseModel::default();
        let mut serial = 0;
        for op in &ops {
            apply(&mut model, op, &mut serial);
            for bc in model.boundaries() {
                let active: Vec<_> = registry
                    .active_fields(&bc.variant(), model.physics(), bc.values())
                    .into_iter()
                    .map(|s| s.name)
                    .collect();
                let stored: Vec<_> = bc.values().names().collect();
                prop_assert_eq!(active, stored, "after {:?} on {}", op, bc.name());
            }
        }
    }

    #[test]
    fn variants_stay_legal_for_their_category(ops in prop::collection::vec(arb_op(), 1..40)) {
        let registry = BoundaryRegistry::global();
        let mut model = CaseModel::default();
        let mut serial = 0;
        for op in &ops {
            apply(&mut model, op, &mut serial);
            for bc in model.boundaries() {
                prop_assert!(registry.legal_types(bc.category()).contains(&bc.ty()));
                let subs = registry.legal_subtypes(bc.category(), bc.ty());
                match bc.sub_type() {
                    Some(sub) => prop_assert!(subs.contains(&sub)),
                    None => prop_assert!(subs.is_empty()),
                }
            }
        }
    }

    #[test]
    fn category_change_lands_on_first_variant(from in 0usize..6, to in 0usize..6) {
        let mut model = CaseModel::default();
        let faces = FaceSet::new([ShapeRef::from("f")]);
        let id = model
            .add_boundary_condition("b", faces, Category::ALL[from])
            .unwrap()
            .value;
        model.set_category(id, Category::ALL[to]).unwrap();
        let expected = BoundaryRegistry::global().first_variant(Category::ALL[to]);
        prop_assert_eq!(model.boundary(id).unwrap().variant(), expected);
    }

    #[test]
    fn edits_never_clear_flags(edits in prop::collection::vec(0usize..EditKind::ALL.len(), 0..40), write_at in 0usize..40) {
        let table = EscalationTable::default();
        let mut tracker = StalenessTracker::new();
        for (i, e) in edits.iter().enumerate() {
            if i == write_at {
                let before = tracker.clone();
                tracker.record_write(Artifact::MeshCase);
                prop_assert!(!tracker.mesh_stale());
                prop_assert!(tracker.mesher_must_rerun());
                prop_assert_eq!(tracker.case_stale(), before.case_stale());
            }
            let before = tracker.flags();
            tracker.mark(table.implication(EditKind::ALL[*e]));
            let after = tracker.flags();
            prop_assert!(after.0 >= before.0 && after.1 >= before.1 && after.2 >= before.2);
        }
    }

    #[test]
    fn duplicate_names_add_nothing(name in "[a-z][a-z0-9_]{0,8}", c1 in 0usize..6, c2 in 0usize..6) {
        let mut model = CaseModel::default();
        let faces = || FaceSet::new([ShapeRef::from("f")]);
        model.add_boundary_condition(&name, faces(), Category::ALL[c1]).unwrap();
        let second = model.add_boundary_condition(&name, faces(), Category::ALL[c2]);
        let is_duplicate = matches!(
            second,
            Err(cfdcase_core::ValidationError::DuplicateName { .. })
        );
        prop_assert!(is_duplicate);
        prop_assert_eq!(model.boundaries().count(), 1);
    }
}
