//! The boundary condition variant registry.
//!
//! A fixed three-level lookup table (category, type, sub-type) mapping each
//! registered variant to its field schemas and help text. The table is
//! built once per process from the static catalogue; [`BoundaryRegistry::resolve`]
//! is the single choke point through which a triple becomes a
//! [`ResolvedVariant`].

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::sync::OnceLock;

use cfdcase_core::{
    reconcile_fields, EntityRef, FieldSchema, FieldValues, PhysicsModel, SchemaError,
};

use crate::catalogue::{self, CATALOGUE};
use crate::groups;
use crate::variant::{BoundaryType, Category, ResolvedVariant, SubType, VariantKey};

/// Legal types of one category.
pub type TypeList = SmallVec<[BoundaryType; 6]>;

/// Legal sub-types of one type (possibly empty).
pub type SubTypeList = SmallVec<[SubType; 2]>;

/// Human-readable description of a resolved variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantInfo {
    /// Short label of the category.
    pub category_label: &'static str,
    /// Short label of the type.
    pub type_label: &'static str,
    /// Short label of the sub-type, if any.
    pub sub_type_label: Option<&'static str>,
    /// One-sentence description of the most specific level.
    pub description: &'static str,
    /// Longer help text for the type.
    pub help: &'static str,
}

/// Registry of every boundary variant and its field schemas.
///
/// # Examples
///
/// ```
/// use cfdcase_registry::{BoundaryRegistry, BoundaryType, Category};
///
/// let registry = BoundaryRegistry::global();
/// let wall = registry.resolve(Category::Wall, BoundaryType::Rough, None).unwrap();
/// assert!(registry.schema(&wall, "roughness_height").is_some());
/// assert!(registry.resolve(Category::Wall, BoundaryType::Velocity, None).is_err());
/// ```
#[derive(Debug)]
pub struct BoundaryRegistry {
    variants: IndexMap<VariantKey, Vec<FieldSchema>>,
    first: IndexMap<Category, ResolvedVariant>,
}

impl BoundaryRegistry {
    /// Build a registry from the static catalogue.
    pub fn new() -> Self {
        let mut variants = IndexMap::new();
        let mut first = IndexMap::new();
        for category in CATALOGUE {
            for ty in category.types {
                if ty.sub_types.is_empty() {
                    let key = VariantKey::new(category.category, ty.ty, None);
                    variants.insert(key, variant_schemas(key));
                } else {
                    for sub in ty.sub_types {
                        let key = VariantKey::new(category.category, ty.ty, Some(sub.sub_type));
                        variants.insert(key, variant_schemas(key));
                    }
                }
            }
        }
        for (key, _) in &variants {
            first
                .entry(key.category)
                .or_insert_with(|| ResolvedVariant::new_unchecked(*key));
        }
        for category in Category::ALL {
            assert!(
                first.contains_key(&category),
                "catalogue lists no variant for {category}"
            );
        }
        Self { variants, first }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<BoundaryRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Resolve a triple to a registered variant.
    ///
    /// Types with sub-types require one; types without reject one. Nothing
    /// is defaulted here: an unregistered combination is always an error.
    pub fn resolve(
        &self,
        category: Category,
        ty: BoundaryType,
        sub_type: Option<SubType>,
    ) -> Result<ResolvedVariant, SchemaError> {
        let key = VariantKey::new(category, ty, sub_type);
        if self.variants.contains_key(&key) {
            Ok(ResolvedVariant::new_unchecked(key))
        } else {
            Err(key.unknown())
        }
    }

    /// Legal types of `category`, in catalogue order.
    pub fn legal_types(&self, category: Category) -> TypeList {
        catalogue::category(category)
            .map(|c| c.types.iter().map(|t| t.ty).collect())
            .unwrap_or_default()
    }

    /// Legal sub-types of `ty` under `category`, in catalogue order.
    ///
    /// Empty both for types without sub-types and for illegal pairs.
    pub fn legal_subtypes(&self, category: Category, ty: BoundaryType) -> SubTypeList {
        catalogue::entry(category, ty)
            .map(|t| t.sub_types.iter().map(|s| s.sub_type).collect())
            .unwrap_or_default()
    }

    /// The variant a boundary takes when its category is (re)selected:
    /// the category's first type and that type's first sub-type.
    pub fn first_variant(&self, category: Category) -> ResolvedVariant {
        self.first[&category]
    }

    /// Resolve `ty` under `category`, picking the first sub-type when the
    /// type has sub-types.
    pub fn resolve_with_default_subtype(
        &self,
        category: Category,
        ty: BoundaryType,
    ) -> Result<ResolvedVariant, SchemaError> {
        let sub_type = self.legal_subtypes(category, ty).first().copied();
        self.resolve(category, ty, sub_type)
    }

    /// Every registered variant, in catalogue order.
    pub fn variants(&self) -> impl Iterator<Item = ResolvedVariant> + '_ {
        self.variants
            .keys()
            .map(|k| ResolvedVariant::new_unchecked(*k))
    }

    /// All schemas of a variant: intrinsic fields first, then the
    /// cross-cutting groups that apply to its category.
    pub fn schemas(&self, variant: &ResolvedVariant) -> &[FieldSchema] {
        self.variants
            .get(&variant.key())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The schema of one field of a variant.
    pub fn schema(&self, variant: &ResolvedVariant, name: &str) -> Option<&FieldSchema> {
        self.schemas(variant).iter().find(|s| s.name == name)
    }

    /// Rebuild the value map of a boundary of `variant`.
    pub fn reconcile(
        &self,
        variant: &ResolvedVariant,
        entity: &EntityRef,
        previous: &FieldValues,
        physics: &PhysicsModel,
    ) -> FieldValues {
        reconcile_fields(entity, self.schemas(variant), previous, physics)
    }

    /// The schemas currently active for a boundary of `variant`, given its
    /// sibling values and the physics selection.
    ///
    /// With an empty `values` map this yields the fields a freshly created
    /// boundary of the variant would carry.
    pub fn active_fields(
        &self,
        variant: &ResolvedVariant,
        physics: &PhysicsModel,
        values: &FieldValues,
    ) -> Vec<&FieldSchema> {
        let entity = EntityRef::Boundary(String::new());
        let reconciled = self.reconcile(variant, &entity, values, physics);
        self.schemas(variant)
            .iter()
            .filter(|s| reconciled.is_active(s.name))
            .collect()
    }

    /// Labels, description and help text of a variant.
    pub fn describe(&self, variant: &ResolvedVariant) -> VariantInfo {
        let category = catalogue::category(variant.category());
        let ty = catalogue::entry(variant.category(), variant.ty());
        let sub = ty.and_then(|t| {
            t.sub_types
                .iter()
                .find(|s| Some(s.sub_type) == variant.sub_type())
        });
        VariantInfo {
            category_label: category.map_or("", |c| c.label),
            type_label: ty.map_or("", |t| t.label),
            sub_type_label: sub.map(|s| s.label),
            description: sub
                .map(|s| s.description)
                .or(ty.map(|t| t.description))
                .or(category.map(|c| c.description))
                .unwrap_or_default(),
            help: ty.map_or("", |t| t.help),
        }
    }
}

impl Default for BoundaryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve against the global registry.
pub fn resolve(
    category: Category,
    ty: BoundaryType,
    sub_type: Option<SubType>,
) -> Result<ResolvedVariant, SchemaError> {
    BoundaryRegistry::global().resolve(category, ty, sub_type)
}

// ── Schema assembly ────────────────────────────────────────────────

fn intrinsic(key: VariantKey) -> Vec<FieldSchema> {
    use cfdcase_core::{Bounds, UnitClass};
    use BoundaryType as T;

    let pressure = |name, label| {
        FieldSchema::scalar(name, label, UnitClass::Pressure, Bounds::ANY, Some(0.0))
    };

    match (key.category, key.ty, key.sub_type) {
        (Category::Wall, T::PartialSlip, _) => vec![FieldSchema::scalar(
            "slip_ratio",
            "Slip ratio",
            UnitClass::Dimensionless,
            Bounds::UNIT_INTERVAL,
            Some(0.5),
        )],
        (Category::Wall, T::Moving, Some(SubType::Translating)) => vec![FieldSchema::vector(
            "wall_velocity",
            "Wall velocity",
            UnitClass::Velocity,
            false,
            Some([0.0; 3]),
        )],
        (Category::Wall, T::Moving, Some(SubType::Rotating)) => vec![
            FieldSchema::vector(
                "rotation_axis",
                "Rotation axis",
                UnitClass::Dimensionless,
                true,
                Some([0.0, 0.0, 1.0]),
            ),
            FieldSchema::vector(
                "rotation_origin",
                "Point on axis",
                UnitClass::Length,
                false,
                Some([0.0; 3]),
            ),
            FieldSchema::scalar(
                "angular_velocity",
                "Angular velocity",
                UnitClass::AngularVelocity,
                Bounds::ANY,
                None,
            ),
        ],
        (Category::Wall, T::Rough, _) => vec![
            FieldSchema::scalar(
                "roughness_height",
                "Sand-grain roughness height",
                UnitClass::Length,
                Bounds::NON_NEGATIVE,
                None,
            ),
            FieldSchema::scalar(
                "roughness_constant",
                "Roughness constant",
                UnitClass::Dimensionless,
                Bounds::inclusive(0.5, 1.0),
                Some(0.5),
            ),
        ],
        (Category::Inlet | Category::Outlet, T::Velocity, _) => groups::velocity(),
        (Category::Inlet, T::FlowRate, Some(SubType::Volumetric)) => vec![FieldSchema::scalar(
            "volumetric_flow_rate",
            "Volumetric flow rate",
            UnitClass::VolumetricFlowRate,
            Bounds::NON_NEGATIVE,
            None,
        )],
        (Category::Inlet, T::FlowRate, Some(SubType::Mass)) => vec![FieldSchema::scalar(
            "mass_flow_rate",
            "Mass flow rate",
            UnitClass::MassFlowRate,
            Bounds::NON_NEGATIVE,
            None,
        )],
        (_, T::Pressure, Some(SubType::Total)) => vec![pressure("total_pressure", "Total pressure")],
        (_, T::Pressure, Some(SubType::Static)) => {
            vec![pressure("static_pressure", "Static pressure")]
        }
        (Category::Open, T::FarField, _) => {
            let mut fields = groups::velocity();
            fields.push(pressure("static_pressure", "Free-stream pressure"));
            fields
        }
        (Category::Constraint, T::Cyclic, sub) => groups::periodicity(sub),
        (Category::Baffle, T::Porous, _) => vec![FieldSchema::scalar(
            "pressure_drop_coefficient",
            "Pressure drop coefficient",
            UnitClass::Dimensionless,
            Bounds::NON_NEGATIVE,
            None,
        )],
        _ => Vec::new(),
    }
}

fn variant_schemas(key: VariantKey) -> Vec<FieldSchema> {
    let mut fields = intrinsic(key);
    match key.category {
        Category::Wall => fields.extend(groups::wall_thermal()),
        Category::Inlet | Category::Open => {
            fields.extend(groups::turbulence());
            fields.extend(groups::flow_thermal());
            fields.extend(groups::phase());
        }
        Category::Outlet | Category::Constraint | Category::Baffle => {}
    }
    fields
}
