//! Structural checks over the whole boundary and zone catalogue.

use std::collections::HashSet;

use cfdcase_core::{
    Activation, FieldKind, FieldSchema, FieldValue, FieldValues, FlowRegime, PhaseModel,
    PhysicsModel, PhysicsPatch, TimeDependence, ViscousModel,
};
use cfdcase_registry::{BoundaryRegistry, Category, ZoneKind, ZoneRegistry};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────

fn sibling_refs(activation: &Activation, out: &mut Vec<&'static str>) {
    match activation {
        Activation::ChoiceIs { field, .. }
        | Activation::ChoiceIn { field, .. }
        | Activation::Flag { field, .. } => out.push(*field),
        Activation::All(inner) => inner.iter().for_each(|a| sibling_refs(a, out)),
        Activation::Always | Activation::Physics(_) => {}
    }
}

fn check_schema_list(what: &str, schemas: &[FieldSchema]) {
    let mut seen = HashSet::new();
    for schema in schemas {
        let mut refs = Vec::new();
        sibling_refs(&schema.activation, &mut refs);
        for r in refs {
            assert!(
                seen.contains(r),
                "{what}: '{}' is gated on '{r}', which is not declared before it",
                schema.name
            );
        }
        assert!(seen.insert(schema.name), "{what}: duplicate field '{}'", schema.name);
        if let (FieldKind::Choice { options }, Some(FieldValue::Choice(id))) =
            (&schema.kind, &schema.default)
        {
            assert!(options.iter().any(|o| o.id == id.as_str()), "{what}: bad default");
        }
    }
}

fn arb_physics() -> impl Strategy<Value = PhysicsModel> {
    (
        prop::sample::select(vec![TimeDependence::Steady, TimeDependence::Transient]),
        prop::sample::select(vec![PhaseModel::Single, PhaseModel::FreeSurface]),
        prop::sample::select(vec![FlowRegime::Isothermal, FlowRegime::NonIsothermal]),
        prop::sample::select(vec![
            ViscousModel::Inviscid,
            ViscousModel::Laminar,
            ViscousModel::Rans,
            ViscousModel::Les,
            ViscousModel::Des,
        ]),
    )
        .prop_map(|(time, phase, flow, viscous)| {
            let patch = PhysicsPatch::default()
                .time(time)
                .phase(phase)
                .flow(flow)
                .viscous(viscous);
            // LES and DES need a transient run; fall back to one.
            PhysicsModel::default()
                .apply(&patch)
                .or_else(|_| {
                    PhysicsModel::default().apply(&patch.clone().time(TimeDependence::Transient))
                })
                .unwrap_or_default()
        })
}

// ── Tests ───────────────────────────────────────────────────────

#[test]
fn every_boundary_variant_declares_siblings_before_use() {
    let registry = BoundaryRegistry::global();
    for variant in registry.variants() {
        check_schema_list(&variant.to_string(), registry.schemas(&variant));
    }
}

#[test]
fn every_zone_kind_declares_siblings_before_use() {
    let registry = ZoneRegistry::global();
    for kind in ZoneKind::ALL {
        check_schema_list(&kind.to_string(), registry.schemas(kind));
    }
}

#[test]
fn every_legal_pair_resolves() {
    let registry = BoundaryRegistry::global();
    for category in Category::ALL {
        for ty in registry.legal_types(category) {
            let subs = registry.legal_subtypes(category, ty);
            if subs.is_empty() {
                registry.resolve(category, ty, None).unwrap();
            } else {
                for sub in subs {
                    registry.resolve(category, ty, Some(sub)).unwrap();
                }
            }
        }
    }
}

#[test]
fn resolved_variant_round_trips_through_serde() {
    let registry = BoundaryRegistry::global();
    for variant in registry.variants() {
        let json = serde_json::to_string(&variant).unwrap();
        let back: cfdcase_registry::ResolvedVariant = serde_json::from_str(&json).unwrap();
        assert_eq!(variant, back);
    }
    let bogus = r#"{"category":"Wall","type":"FlowRate"}"#;
    assert!(serde_json::from_str::<cfdcase_registry::ResolvedVariant>(bogus).is_err());
}

proptest! {
    #[test]
    fn active_fields_match_reconciled_keys(
        idx in 0usize..64,
        physics in arb_physics(),
    ) {
        let registry = BoundaryRegistry::global();
        let variants: Vec<_> = registry.variants().collect();
        let variant = variants[idx % variants.len()];
        let active: Vec<_> = registry
            .active_fields(&variant, &physics, &FieldValues::new())
            .into_iter()
            .map(|s| s.name)
            .collect();
        let values = registry.reconcile(
            &variant,
            &cfdcase_core::EntityRef::Boundary("b".to_string()),
            &FieldValues::new(),
            &physics,
        );
        prop_assert_eq!(active, values.names().collect::<Vec<_>>());
        if !physics.viscous.requires_turbulence_model() {
            prop_assert!(!values.is_active("turbulence_spec"));
        }
    }
}
