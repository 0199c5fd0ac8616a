//! Field schemas, activation predicates, and value reconciliation.
//!
//! A [`FieldSchema`] describes one configurable quantity: its name, value
//! kind, unit class, default, and an [`Activation`] predicate deciding
//! whether the field currently applies. Predicates are pure functions of
//! an [`ActivationContext`]: the entity's sibling values plus the physics
//! selection. Nothing else is consulted.

use std::fmt;

use crate::error::{EntityRef, ValidationError};
use crate::physics::PhysicsModel;
use crate::unit::UnitClass;
use crate::value::{FieldValue, FieldValues, Quantity};

// ── Bounds ─────────────────────────────────────────────────────────

/// One side of a scalar range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bound {
    /// No limit on this side.
    Unbounded,
    /// The limit value itself is allowed.
    Inclusive(f64),
    /// The limit value itself is rejected.
    Exclusive(f64),
}

/// Allowed range of a scalar field, in the SI unit of its class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Lower limit.
    pub lower: Bound,
    /// Upper limit.
    pub upper: Bound,
}

impl Bounds {
    /// Any finite value.
    pub const ANY: Self = Self {
        lower: Bound::Unbounded,
        upper: Bound::Unbounded,
    };

    /// `[0, +inf)`.
    pub const NON_NEGATIVE: Self = Self {
        lower: Bound::Inclusive(0.0),
        upper: Bound::Unbounded,
    };

    /// `(0, +inf)`.
    pub const POSITIVE: Self = Self {
        lower: Bound::Exclusive(0.0),
        upper: Bound::Unbounded,
    };

    /// `[0, 1]`.
    pub const UNIT_INTERVAL: Self = Self {
        lower: Bound::Inclusive(0.0),
        upper: Bound::Inclusive(1.0),
    };

    /// `[min, max]`.
    pub const fn inclusive(min: f64, max: f64) -> Self {
        Self {
            lower: Bound::Inclusive(min),
            upper: Bound::Inclusive(max),
        }
    }

    /// Whether `v` is finite and within both limits.
    pub fn contains(&self, v: f64) -> bool {
        if !v.is_finite() {
            return false;
        }
        let lower_ok = match self.lower {
            Bound::Unbounded => true,
            Bound::Inclusive(min) => v >= min,
            Bound::Exclusive(min) => v > min,
        };
        let upper_ok = match self.upper {
            Bound::Unbounded => true,
            Bound::Inclusive(max) => v <= max,
            Bound::Exclusive(max) => v < max,
        };
        lower_ok && upper_ok
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower {
            Bound::Unbounded => write!(f, "(-inf")?,
            Bound::Inclusive(v) => write!(f, "[{v}")?,
            Bound::Exclusive(v) => write!(f, "({v}")?,
        }
        match self.upper {
            Bound::Unbounded => write!(f, ", +inf)"),
            Bound::Inclusive(v) => write!(f, ", {v}]"),
            Bound::Exclusive(v) => write!(f, ", {v})"),
        }
    }
}

// ── FieldKind ──────────────────────────────────────────────────────

/// One option of an enumerated field.
///
/// `id` is the internal identifier stored in [`FieldValue::Choice`];
/// `external` is the token written to the solver case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Internal identifier.
    pub id: &'static str,
    /// Solver-facing name.
    pub external: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// Classification of a field's value type.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// A single quantity.
    Scalar {
        /// Physical dimension.
        unit: UnitClass,
        /// Allowed range in the SI unit of `unit`.
        bounds: Bounds,
    },
    /// A `(x, y, z)` triple.
    Vector {
        /// Physical dimension.
        unit: UnitClass,
        /// Reject the zero vector (directions and axes).
        non_zero: bool,
    },
    /// A flag.
    Boolean,
    /// One of a fixed list of options.
    Choice {
        /// Allowed options, first one is the conventional default.
        options: &'static [ChoiceOption],
    },
    /// Non-empty free text.
    Text,
}

impl FieldKind {
    /// Short name of the kind, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar { .. } => "scalar",
            Self::Vector { .. } => "vector",
            Self::Boolean => "boolean",
            Self::Choice { .. } => "choice",
            Self::Text => "text",
        }
    }

    /// The unit class, for scalar and vector kinds.
    pub fn unit_class(&self) -> Option<UnitClass> {
        match self {
            Self::Scalar { unit, .. } | Self::Vector { unit, .. } => Some(*unit),
            _ => None,
        }
    }

    /// Look up an option of a choice kind by internal id.
    pub fn option(&self, id: &str) -> Option<&'static ChoiceOption> {
        match self {
            Self::Choice { options } => options.iter().find(|o| o.id == id),
            _ => None,
        }
    }
}

// ── Activation ─────────────────────────────────────────────────────

/// A gate on the physics selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicsGate {
    /// The viscous model carries a turbulence model.
    Turbulent,
    /// The energy equation is solved.
    Thermal,
    /// Free-surface multiphase flow.
    Multiphase,
}

impl PhysicsGate {
    fn holds(self, physics: &PhysicsModel) -> bool {
        match self {
            Self::Turbulent => physics.viscous.requires_turbulence_model(),
            Self::Thermal => physics.flow.is_thermal(),
            Self::Multiphase => physics.phase.is_multiphase(),
        }
    }
}

/// Pure predicate deciding whether a field currently applies.
///
/// Sibling references must name fields declared earlier in the same
/// schema list; [`reconcile_fields`] evaluates in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub enum Activation {
    /// Always active.
    Always,
    /// Active while the named choice field holds the given option.
    ChoiceIs {
        /// Sibling choice field.
        field: &'static str,
        /// Option id.
        option: &'static str,
    },
    /// Active while the named choice field holds any of the options.
    ChoiceIn {
        /// Sibling choice field.
        field: &'static str,
        /// Option ids.
        options: &'static [&'static str],
    },
    /// Active while the named boolean field equals `value`.
    Flag {
        /// Sibling boolean field.
        field: &'static str,
        /// Required value.
        value: bool,
    },
    /// Active while the physics gate holds.
    Physics(PhysicsGate),
    /// Active while every inner predicate holds.
    All(Vec<Activation>),
}

/// Snapshot of everything an [`Activation`] may inspect.
#[derive(Clone, Copy, Debug)]
pub struct ActivationContext<'a> {
    /// Sibling values, as reconciled so far.
    pub values: &'a FieldValues,
    /// The current physics selection.
    pub physics: &'a PhysicsModel,
}

impl Activation {
    /// Evaluate the predicate.
    pub fn holds(&self, ctx: &ActivationContext<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::ChoiceIs { field, option } => {
                ctx.values.get(field).and_then(FieldValue::as_choice) == Some(*option)
            }
            Self::ChoiceIn { field, options } => ctx
                .values
                .get(field)
                .and_then(FieldValue::as_choice)
                .is_some_and(|id| options.iter().any(|o| *o == id)),
            Self::Flag { field, value } => {
                ctx.values.get(field).and_then(FieldValue::as_bool) == Some(*value)
            }
            Self::Physics(gate) => gate.holds(ctx.physics),
            Self::All(inner) => inner.iter().all(|a| a.holds(ctx)),
        }
    }

    /// Combine with a physics gate.
    pub fn and_physics(self, gate: PhysicsGate) -> Self {
        match self {
            Self::Always => Self::Physics(gate),
            Self::All(mut inner) => {
                inner.push(Self::Physics(gate));
                Self::All(inner)
            }
            other => Self::All(vec![other, Self::Physics(gate)]),
        }
    }
}

// ── FieldSchema ────────────────────────────────────────────────────

/// Description of one configurable quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name; also the key in [`FieldValues`] and the on-disk key.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Value kind, unit class, and range.
    pub kind: FieldKind,
    /// Value used when the field becomes active. `None` makes the field
    /// required: it must be set before the case can be written.
    pub default: Option<FieldValue>,
    /// When the field applies.
    pub activation: Activation,
}

impl FieldSchema {
    /// A scalar field.
    pub fn scalar(
        name: &'static str,
        label: &'static str,
        unit: UnitClass,
        bounds: Bounds,
        default: Option<f64>,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Scalar { unit, bounds },
            default: default.map(|v| FieldValue::scalar(v, unit.si_unit())),
            activation: Activation::Always,
        }
    }

    /// A vector field.
    pub fn vector(
        name: &'static str,
        label: &'static str,
        unit: UnitClass,
        non_zero: bool,
        default: Option<[f64; 3]>,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Vector { unit, non_zero },
            default: default.map(|v| FieldValue::vector(v, unit.si_unit())),
            activation: Activation::Always,
        }
    }

    /// A boolean field.
    pub fn flag(name: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Boolean,
            default: Some(FieldValue::Boolean(default)),
            activation: Activation::Always,
        }
    }

    /// A choice field defaulting to its first option.
    pub fn choice(
        name: &'static str,
        label: &'static str,
        options: &'static [ChoiceOption],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Choice { options },
            default: options.first().map(|o| FieldValue::choice(o.id)),
            activation: Activation::Always,
        }
    }

    /// A required text field.
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            default: None,
            activation: Activation::Always,
        }
    }

    /// Replace the activation predicate.
    pub fn when(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Whether this field is active in `ctx`.
    pub fn is_active(&self, ctx: &ActivationContext<'_>) -> bool {
        self.activation.holds(ctx)
    }

    /// Check `value` against this schema and convert it to storage form.
    ///
    /// Quantities are converted to the SI unit of the declared class
    /// before the range check, so bounds are always compared in SI.
    pub fn normalize(
        &self,
        entity: &EntityRef,
        value: FieldValue,
    ) -> Result<FieldValue, ValidationError> {
        let out_of_range = |reason: String| ValidationError::OutOfRange {
            entity: entity.clone(),
            field: self.name.to_string(),
            reason,
        };
        let wrong_unit = |found| ValidationError::WrongUnit {
            entity: entity.clone(),
            field: self.name.to_string(),
            expected: self.kind.unit_class().unwrap_or(UnitClass::Dimensionless),
            found,
        };

        match (&self.kind, value) {
            (FieldKind::Scalar { unit, bounds }, FieldValue::Scalar(q)) => {
                if q.unit.class() != *unit {
                    return Err(wrong_unit(q.unit));
                }
                let si = q.unit.to_si(q.value);
                if !bounds.contains(si) {
                    return Err(out_of_range(format!(
                        "{si} {} is outside {bounds}",
                        unit.si_unit()
                    )));
                }
                Ok(FieldValue::Scalar(Quantity {
                    value: si,
                    unit: unit.si_unit(),
                }))
            }
            (
                FieldKind::Vector { unit, non_zero },
                FieldValue::Vector {
                    components,
                    unit: given,
                },
            ) => {
                if given.class() != *unit {
                    return Err(wrong_unit(given));
                }
                let si = given.vector_to_si(components);
                if si.iter().any(|c| !c.is_finite()) {
                    return Err(out_of_range("components must be finite".to_string()));
                }
                if *non_zero && si.iter().all(|c| *c == 0.0) {
                    return Err(out_of_range("vector must not be zero".to_string()));
                }
                Ok(FieldValue::vector(si, unit.si_unit()))
            }
            (FieldKind::Boolean, v @ FieldValue::Boolean(_)) => Ok(v),
            (FieldKind::Choice { options }, FieldValue::Choice(id)) => {
                if options.iter().any(|o| o.id == id) {
                    Ok(FieldValue::Choice(id))
                } else {
                    Err(ValidationError::InvalidChoice {
                        entity: entity.clone(),
                        field: self.name.to_string(),
                        value: id,
                        allowed: options.iter().map(|o| o.id).collect(),
                    })
                }
            }
            (FieldKind::Text, FieldValue::Text(text)) => {
                if text.trim().is_empty() {
                    Err(out_of_range("text must not be empty".to_string()))
                } else {
                    Ok(FieldValue::Text(text))
                }
            }
            (kind, other) => Err(ValidationError::WrongKind {
                entity: entity.clone(),
                field: self.name.to_string(),
                expected: kind.name(),
                found: other.kind_name(),
            }),
        }
    }
}

// ── Reconciliation ─────────────────────────────────────────────────

/// Re-evaluate activity for every schema and rebuild the value map.
///
/// Walks `schemas` in declaration order. Each field whose predicate holds
/// (evaluated against the fields reconciled so far) gets a slot: its
/// previous value if that value still satisfies the schema, else the
/// schema default, else an empty slot. Fields whose predicate fails are
/// dropped. The result's key set is exactly the active field set.
pub fn reconcile_fields(
    entity: &EntityRef,
    schemas: &[FieldSchema],
    previous: &FieldValues,
    physics: &PhysicsModel,
) -> FieldValues {
    let mut next = FieldValues::new();
    for schema in schemas {
        let active = {
            let ctx = ActivationContext {
                values: &next,
                physics,
            };
            schema.is_active(&ctx)
        };
        if !active || next.is_active(schema.name) {
            continue;
        }
        let kept = previous
            .get(schema.name)
            .cloned()
            .and_then(|v| schema.normalize(entity, v).ok());
        next.insert_slot(schema.name, kept.or_else(|| schema.default.clone()));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;

    const SPEC_OPTIONS: &[ChoiceOption] = &[
        ChoiceOption {
            id: "Components",
            external: "components",
            label: "Components",
        },
        ChoiceOption {
            id: "MagnitudeDirection",
            external: "magnitudeNormal",
            label: "Magnitude and direction",
        },
    ];

    fn schemas() -> Vec<FieldSchema> {
        vec![
            FieldSchema::choice("velocity_spec", "Velocity specification", SPEC_OPTIONS),
            FieldSchema::vector("velocity", "Velocity", UnitClass::Velocity, false, Some([0.0; 3]))
                .when(Activation::ChoiceIs {
                    field: "velocity_spec",
                    option: "Components",
                }),
            FieldSchema::scalar(
                "velocity_magnitude",
                "Speed",
                UnitClass::Velocity,
                Bounds::NON_NEGATIVE,
                None,
            )
            .when(Activation::ChoiceIs {
                field: "velocity_spec",
                option: "MagnitudeDirection",
            }),
            FieldSchema::scalar(
                "turbulence_intensity",
                "Intensity",
                UnitClass::Dimensionless,
                Bounds::UNIT_INTERVAL,
                Some(0.05),
            )
            .when(Activation::Physics(PhysicsGate::Turbulent)),
        ]
    }

    fn entity() -> EntityRef {
        EntityRef::Boundary("inlet".to_string())
    }

    #[test]
    fn reconcile_applies_defaults_and_gates() {
        let physics = PhysicsModel::default();
        let values = reconcile_fields(&entity(), &schemas(), &FieldValues::new(), &physics);
        let names: Vec<_> = values.names().collect();
        assert_eq!(names, ["velocity_spec", "velocity", "turbulence_intensity"]);
    }

    #[test]
    fn reconcile_switches_sibling_gated_fields() {
        let physics = PhysicsModel::default();
        let mut values = reconcile_fields(&entity(), &schemas(), &FieldValues::new(), &physics);
        assert!(values.replace("velocity_spec", FieldValue::choice("MagnitudeDirection")));
        let values = reconcile_fields(&entity(), &schemas(), &values, &physics);
        assert!(!values.is_active("velocity"));
        assert!(values.is_active("velocity_magnitude"));
        assert!(!values.is_set("velocity_magnitude"));
        assert_eq!(values.unset().collect::<Vec<_>>(), ["velocity_magnitude"]);
    }

    #[test]
    fn reconcile_preserves_values_of_fields_that_stay_active() {
        let physics = PhysicsModel::default();
        let mut values = reconcile_fields(&entity(), &schemas(), &FieldValues::new(), &physics);
        values.replace(
            "turbulence_intensity",
            FieldValue::scalar(0.1, Unit::Dimensionless),
        );
        let values = reconcile_fields(&entity(), &schemas(), &values, &physics);
        assert_eq!(values.get("turbulence_intensity").and_then(FieldValue::as_scalar), Some(0.1));
    }

    #[test]
    fn normalize_converts_to_si_before_range_check() {
        let schema = FieldSchema::scalar(
            "roughness_height",
            "Roughness",
            UnitClass::Length,
            Bounds::NON_NEGATIVE,
            None,
        );
        let v = schema
            .normalize(&entity(), FieldValue::scalar(2.0, Unit::Millimetre))
            .unwrap();
        assert_eq!(v, FieldValue::scalar(0.002, Unit::Metre));
    }

    #[test]
    fn normalize_rejects_wrong_unit_class() {
        let schema = FieldSchema::scalar("p", "p", UnitClass::Pressure, Bounds::ANY, Some(0.0));
        match schema.normalize(&entity(), FieldValue::scalar(1.0, Unit::Metre)) {
            Err(ValidationError::WrongUnit { expected, found, .. }) => {
                assert_eq!(expected, UnitClass::Pressure);
                assert_eq!(found, Unit::Metre);
            }
            other => panic!("expected WrongUnit, got {other:?}"),
        }
    }

    #[test]
    fn normalize_rejects_out_of_range_and_nan() {
        let schema = FieldSchema::scalar(
            "turbulence_intensity",
            "I",
            UnitClass::Dimensionless,
            Bounds::UNIT_INTERVAL,
            None,
        );
        for bad in [1.5, -0.1, f64::NAN, f64::INFINITY] {
            match schema.normalize(&entity(), FieldValue::scalar(bad, Unit::Dimensionless)) {
                Err(ValidationError::OutOfRange { .. }) => {}
                other => panic!("expected OutOfRange for {bad}, got {other:?}"),
            }
        }
        let percent = schema
            .normalize(&entity(), FieldValue::scalar(5.0, Unit::Percent))
            .unwrap();
        assert_eq!(percent.as_scalar(), Some(0.05));
    }

    #[test]
    fn normalize_rejects_zero_direction_and_unknown_choice() {
        let axis = FieldSchema::vector("rotation_axis", "Axis", UnitClass::Length, true, None);
        match axis.normalize(&entity(), FieldValue::vector([0.0; 3], Unit::Metre)) {
            Err(ValidationError::OutOfRange { .. }) => {}
            other => panic!("expected OutOfRange, got {other:?}"),
        }
        let spec = FieldSchema::choice("velocity_spec", "spec", SPEC_OPTIONS);
        match spec.normalize(&entity(), FieldValue::choice("Sideways")) {
            Err(ValidationError::InvalidChoice { allowed, .. }) => {
                assert_eq!(allowed, ["Components", "MagnitudeDirection"]);
            }
            other => panic!("expected InvalidChoice, got {other:?}"),
        }
        match spec.normalize(&entity(), FieldValue::Boolean(true)) {
            Err(ValidationError::WrongKind { expected, found, .. }) => {
                assert_eq!((expected, found), ("choice", "boolean"));
            }
            other => panic!("expected WrongKind, got {other:?}"),
        }
    }

    #[test]
    fn bounds_display() {
        assert_eq!(Bounds::UNIT_INTERVAL.to_string(), "[0, 1]");
        assert_eq!(Bounds::POSITIVE.to_string(), "(0, +inf)");
    }
}
