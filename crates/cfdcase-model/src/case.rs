//! The case model aggregate.
//!
//! [`CaseModel`] owns the physics selection, the boundary conditions, the
//! zones, the refinement regions, and the mesh settings. Every mutation
//! keeps each entity's value map equal to its active field set, and
//! reports which generated artifacts it makes stale so the owner can
//! update its [`StalenessTracker`](crate::StalenessTracker) together with
//! the edit.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cfdcase_core::{
    BoundaryId, EntityRef, FaceSet, FieldValue, PhysicsModel, PhysicsPatch, RegionId,
    SchemaError, ShapeRef, ValidationError, ZoneId,
};
use cfdcase_registry::{
    BoundaryRegistry, BoundaryType, Category, ResolvedVariant, SubType, ZoneKind, ZoneRegistry,
};

use crate::boundary::BoundaryCondition;
use crate::mesh::{
    check_extrusion, check_region_settings, Extrusion, MeshSettings, RefinementRegion,
    RegionSettings,
};
use crate::staleness::{EditKind, EscalationTable, StaleImplication};
use crate::zone::Zone;

/// Name of the text field that couples a cyclic boundary to its partner.
pub const PARTNER_FIELD: &str = "partner";

/// The outcome of a creating mutation: the new entity's ID plus what the
/// edit made stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Applied<T> {
    /// The created entity.
    pub value: T,
    /// Artifacts made stale.
    pub implication: StaleImplication,
}

/// The configuration of one simulation case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseModel {
    physics: PhysicsModel,
    #[serde(default)]
    mesh: MeshSettings,
    #[serde(with = "entity_list")]
    boundaries: IndexMap<BoundaryId, BoundaryCondition>,
    #[serde(default, with = "entity_list")]
    zones: IndexMap<ZoneId, Zone>,
    #[serde(default, with = "entity_list")]
    regions: IndexMap<RegionId, RefinementRegion>,
    next_boundary: u32,
    next_zone: u32,
    next_region: u32,
    #[serde(skip)]
    escalation: EscalationTable,
}

impl Default for CaseModel {
    fn default() -> Self {
        Self::new(EscalationTable::default())
    }
}

fn boundary_not_found(id: BoundaryId) -> ValidationError {
    ValidationError::NotFound {
        collection: "boundary",
        id: id.0,
    }
}

fn zone_not_found(id: ZoneId) -> ValidationError {
    ValidationError::NotFound {
        collection: "zone",
        id: id.0,
    }
}

fn region_not_found(id: RegionId) -> ValidationError {
    ValidationError::NotFound {
        collection: "refinement region",
        id: id.0,
    }
}

/// Dictionary key every generated file already opens with.
const HEADER_KEY: &str = "FoamFile";

/// Accept `name` as a dictionary key: non-empty after trimming, made only
/// of ASCII letters, digits, `_`, `-`, and `.`, and not the header key.
fn check_name(collection: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    let usable = !trimmed.is_empty()
        && trimmed != HEADER_KEY
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if usable {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidName {
            collection,
            name: name.to_string(),
        })
    }
}

/// Take the next ID from `counter`.
fn allocate_id(collection: &'static str, counter: &mut u32) -> Result<u32, ValidationError> {
    let id = *counter;
    *counter = id
        .checked_add(1)
        .ok_or(ValidationError::IdsExhausted { collection })?;
    Ok(id)
}

/// The counter value that cannot hand out any ID up to `max`.
fn counter_after(
    collection: &'static str,
    max: Option<u32>,
    counter: u32,
) -> Result<u32, ValidationError> {
    match max {
        None => Ok(counter),
        Some(max) => max
            .checked_add(1)
            .map(|next| next.max(counter))
            .ok_or(ValidationError::IdsExhausted { collection }),
    }
}

fn ensure_unique<'a>(
    collection: &'static str,
    name: &str,
    mut existing: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    if existing.any(|n| n == name) {
        Err(ValidationError::DuplicateName {
            collection,
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

impl CaseModel {
    /// An empty case with default physics.
    pub fn new(escalation: EscalationTable) -> Self {
        Self {
            physics: PhysicsModel::default(),
            mesh: MeshSettings::default(),
            boundaries: IndexMap::new(),
            zones: IndexMap::new(),
            regions: IndexMap::new(),
            next_boundary: 0,
            next_zone: 0,
            next_region: 0,
            escalation,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// The physics selection.
    pub fn physics(&self) -> &PhysicsModel {
        &self.physics
    }

    /// Mesh settings.
    pub fn mesh_settings(&self) -> &MeshSettings {
        &self.mesh
    }

    /// The escalation table in use.
    pub fn escalation(&self) -> &EscalationTable {
        &self.escalation
    }

    /// Replace the escalation table. Affects later edits only.
    pub fn set_escalation(&mut self, escalation: EscalationTable) {
        self.escalation = escalation;
    }

    /// Boundary conditions in insertion order.
    pub fn boundaries(&self) -> impl Iterator<Item = &BoundaryCondition> {
        self.boundaries.values()
    }

    /// One boundary condition.
    pub fn boundary(&self, id: BoundaryId) -> Option<&BoundaryCondition> {
        self.boundaries.get(&id)
    }

    /// Look up a boundary condition by name.
    pub fn boundary_by_name(&self, name: &str) -> Option<&BoundaryCondition> {
        self.boundaries.values().find(|b| b.name == name)
    }

    /// The boundary that receives unmatched faces, if any.
    pub fn default_boundary(&self) -> Option<&BoundaryCondition> {
        self.boundaries.values().find(|b| b.default_for_unmatched)
    }

    /// Zones in insertion order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// One zone.
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    /// Refinement regions in insertion order.
    pub fn regions(&self) -> impl Iterator<Item = &RefinementRegion> {
        self.regions.values()
    }

    /// One refinement region.
    pub fn region(&self, id: RegionId) -> Option<&RefinementRegion> {
        self.regions.get(&id)
    }

    fn implication(&self, kind: EditKind) -> StaleImplication {
        let implication = self.escalation.implication(kind);
        log::debug!("{kind:?} edit marks {implication:?}");
        implication
    }

    // ── Physics ────────────────────────────────────────────────────

    /// Apply a patch to the physics selection.
    ///
    /// Either the patch is rejected as a whole and nothing changes, or the
    /// new selection is committed and every boundary and zone is
    /// reconciled against it (fields that became inactive are pruned,
    /// newly active fields take their defaults).
    pub fn set_physics(
        &mut self,
        patch: &PhysicsPatch,
    ) -> Result<StaleImplication, ValidationError> {
        let next = self.physics.apply(patch)?;
        let boundary_registry = BoundaryRegistry::global();
        for bc in self.boundaries.values_mut() {
            bc.values = boundary_registry.reconcile(&bc.variant, &bc.entity(), &bc.values, &next);
        }
        let zone_registry = ZoneRegistry::global();
        for zone in self.zones.values_mut() {
            zone.values = zone_registry.reconcile(zone.kind, &zone.entity(), &zone.values, &next);
        }
        self.physics = next;
        Ok(self.implication(EditKind::PhysicsChanged))
    }

    // ── Boundaries ─────────────────────────────────────────────────

    /// Create a boundary condition of `category`, with the category's first
    /// type and sub-type and their default field values.
    pub fn add_boundary_condition(
        &mut self,
        name: &str,
        face_set: FaceSet,
        category: Category,
    ) -> Result<Applied<BoundaryId>, ValidationError> {
        let name = check_name("boundary", name)?;
        ensure_unique("boundary", &name, self.boundaries.values().map(|b| b.name.as_str()))?;

        let registry = BoundaryRegistry::global();
        let variant = registry.first_variant(category);
        let id = BoundaryId(allocate_id("boundary", &mut self.next_boundary)?);
        let entity = EntityRef::Boundary(name.clone());
        let values = registry.reconcile(&variant, &entity, &Default::default(), &self.physics);
        log::debug!("adding boundary '{name}' ({variant})");
        self.boundaries.insert(
            id,
            BoundaryCondition {
                id,
                name,
                face_set,
                variant,
                values,
                default_for_unmatched: false,
            },
        );
        Ok(Applied {
            value: id,
            implication: self.implication(EditKind::BoundaryAdded),
        })
    }

    /// Remove a boundary condition.
    pub fn remove_boundary_condition(
        &mut self,
        id: BoundaryId,
    ) -> Result<StaleImplication, ValidationError> {
        let removed = self
            .boundaries
            .shift_remove(&id)
            .ok_or_else(|| boundary_not_found(id))?;
        log::debug!("removed boundary '{}'", removed.name);
        Ok(self.implication(EditKind::BoundaryRemoved))
    }

    fn commit_variant(
        &mut self,
        id: BoundaryId,
        variant: ResolvedVariant,
    ) -> Result<StaleImplication, ValidationError> {
        let bc = self
            .boundaries
            .get_mut(&id)
            .ok_or_else(|| boundary_not_found(id))?;
        if bc.variant == variant {
            return Ok(StaleImplication::NONE);
        }
        log::debug!("boundary '{}': {} -> {variant}", bc.name, bc.variant);
        bc.variant = variant;
        bc.values = BoundaryRegistry::global().reconcile(
            &variant,
            &bc.entity(),
            &bc.values,
            &self.physics,
        );
        Ok(self.implication(EditKind::BoundaryVariantChanged))
    }

    /// Change the category. Type and sub-type reset to the category's
    /// first legal values; values of fields that remain active are kept.
    pub fn set_category(
        &mut self,
        id: BoundaryId,
        category: Category,
    ) -> Result<StaleImplication, ValidationError> {
        let bc = self.boundary(id).ok_or_else(|| boundary_not_found(id))?;
        if bc.category() == category {
            return Ok(StaleImplication::NONE);
        }
        let variant = BoundaryRegistry::global().first_variant(category);
        self.commit_variant(id, variant)
    }

    /// Change type and sub-type within the current category.
    ///
    /// The pair must resolve exactly; nothing is defaulted.
    pub fn set_variant(
        &mut self,
        id: BoundaryId,
        ty: BoundaryType,
        sub_type: Option<SubType>,
    ) -> Result<StaleImplication, ValidationError> {
        let bc = self.boundary(id).ok_or_else(|| boundary_not_found(id))?;
        let variant = BoundaryRegistry::global()
            .resolve(bc.category(), ty, sub_type)
            .map_err(|source| ValidationError::Schema {
                entity: bc.entity(),
                source,
            })?;
        self.commit_variant(id, variant)
    }

    /// Change the type within the current category, selecting its first
    /// sub-type if it has any.
    pub fn set_type(
        &mut self,
        id: BoundaryId,
        ty: BoundaryType,
    ) -> Result<StaleImplication, ValidationError> {
        let bc = self.boundary(id).ok_or_else(|| boundary_not_found(id))?;
        let variant = BoundaryRegistry::global()
            .resolve_with_default_subtype(bc.category(), ty)
            .map_err(|source| ValidationError::Schema {
                entity: bc.entity(),
                source,
            })?;
        self.commit_variant(id, variant)
    }

    /// Set one field of a boundary condition.
    ///
    /// The field must be currently active. The value is checked against
    /// the schema and stored in SI; sibling-gated fields are re-evaluated
    /// afterwards.
    pub fn set_field(
        &mut self,
        id: BoundaryId,
        field: &str,
        value: FieldValue,
    ) -> Result<StaleImplication, ValidationError> {
        let registry = BoundaryRegistry::global();
        let bc = self.boundary(id).ok_or_else(|| boundary_not_found(id))?;
        let entity = bc.entity();
        let schema = registry
            .schema(&bc.variant, field)
            .ok_or_else(|| ValidationError::Schema {
                entity: entity.clone(),
                source: SchemaError::UnknownField {
                    field: field.to_string(),
                },
            })?;
        if !bc.values.is_active(field) {
            return Err(ValidationError::FieldInactive {
                entity,
                field: field.to_string(),
            });
        }
        let value = schema.normalize(&entity, value)?;
        if field == PARTNER_FIELD {
            if let Some(partner) = value.as_text() {
                let exists = self
                    .boundaries
                    .values()
                    .any(|b| b.id != id && b.name == partner);
                if !exists {
                    return Err(ValidationError::UnknownPartner {
                        entity,
                        partner: partner.to_string(),
                    });
                }
            }
        }

        let bc = self
            .boundaries
            .get_mut(&id)
            .ok_or_else(|| boundary_not_found(id))?;
        bc.values.replace(field, value);
        bc.values = registry.reconcile(&bc.variant, &entity, &bc.values, &self.physics);
        log::debug!("boundary '{}': set {field}", bc.name);
        Ok(self.implication(EditKind::BoundaryFieldEdited))
    }

    /// Rebind a boundary condition to a different set of faces.
    pub fn set_face_set(
        &mut self,
        id: BoundaryId,
        face_set: FaceSet,
    ) -> Result<StaleImplication, ValidationError> {
        let bc = self
            .boundaries
            .get_mut(&id)
            .ok_or_else(|| boundary_not_found(id))?;
        if bc.face_set == face_set {
            return Ok(StaleImplication::NONE);
        }
        bc.face_set = face_set;
        Ok(self.implication(EditKind::BoundaryFaceSetChanged))
    }

    /// Rename a boundary condition. Cyclic partners naming it follow.
    pub fn rename_boundary(
        &mut self,
        id: BoundaryId,
        name: &str,
    ) -> Result<StaleImplication, ValidationError> {
        let name = check_name("boundary", name)?;
        let old = self
            .boundary(id)
            .ok_or_else(|| boundary_not_found(id))?
            .name
            .clone();
        if old == name {
            return Ok(StaleImplication::NONE);
        }
        ensure_unique(
            "boundary",
            &name,
            self.boundaries
                .values()
                .filter(|b| b.id != id)
                .map(|b| b.name.as_str()),
        )?;
        for bc in self.boundaries.values_mut() {
            if bc.id == id {
                bc.name = name.clone();
            } else if bc.values.get(PARTNER_FIELD).and_then(FieldValue::as_text)
                == Some(old.as_str())
            {
                bc.values.replace(PARTNER_FIELD, FieldValue::text(name.clone()));
            }
        }
        log::debug!("renamed boundary '{old}' to '{name}'");
        Ok(self.implication(EditKind::BoundaryRenamed))
    }

    /// Mark or unmark the boundary that receives faces matched by no
    /// other boundary. At most one boundary may be marked.
    pub fn set_default_boundary(
        &mut self,
        id: BoundaryId,
        is_default: bool,
    ) -> Result<StaleImplication, ValidationError> {
        let bc = self.boundary(id).ok_or_else(|| boundary_not_found(id))?;
        if bc.default_for_unmatched == is_default {
            return Ok(StaleImplication::NONE);
        }
        if is_default {
            if let Some(existing) = self.default_boundary() {
                return Err(ValidationError::DefaultBoundaryConflict {
                    existing: existing.name.clone(),
                    requested: bc.name.clone(),
                });
            }
        }
        if let Some(bc) = self.boundaries.get_mut(&id) {
            bc.default_for_unmatched = is_default;
        }
        Ok(self.implication(EditKind::BoundaryFaceSetChanged))
    }

    // ── Geometry ───────────────────────────────────────────────────

    /// Record that the referenced host geometry changed shape.
    pub fn geometry_changed(&self) -> StaleImplication {
        self.implication(EditKind::Geometry)
    }

    /// Drop references to shapes that no longer exist.
    ///
    /// Boundaries whose face set becomes empty are removed; their IDs are
    /// returned. Zones and regions keep their (possibly empty) shape lists.
    pub fn prune_shapes(&mut self, exists: impl Fn(&ShapeRef) -> bool) -> Applied<Vec<BoundaryId>> {
        let mut implication = StaleImplication::NONE;
        let mut touched = Vec::new();
        let mut emptied = Vec::new();
        for bc in self.boundaries.values_mut() {
            let before = bc.face_set.0.len();
            bc.face_set.0.retain(|s| exists(s));
            if bc.face_set.0.len() != before {
                touched.push(bc.id);
                if bc.face_set.is_empty() {
                    emptied.push(bc.id);
                }
            }
        }
        if !touched.is_empty() {
            implication = implication.union(self.implication(EditKind::BoundaryFaceSetChanged));
        }
        for id in &emptied {
            if let Some(bc) = self.boundaries.shift_remove(id) {
                log::debug!("removed boundary '{}': no faces left", bc.name);
            }
        }
        if !emptied.is_empty() {
            implication = implication.union(self.implication(EditKind::BoundaryRemoved));
        }

        let mut zones_touched = false;
        for zone in self.zones.values_mut() {
            let before = zone.shape_refs.len();
            zone.shape_refs.retain(|s| exists(s));
            zones_touched |= zone.shape_refs.len() != before;
        }
        if zones_touched {
            implication = implication.union(self.implication(EditKind::ZoneShapeChanged));
        }

        let mut regions_touched = false;
        for region in self.regions.values_mut() {
            let before = region.shape_refs.len();
            region.shape_refs.retain(|s| exists(s));
            regions_touched |= region.shape_refs.len() != before;
        }
        if regions_touched {
            implication = implication.union(self.implication(EditKind::RefinementRegionEdited));
        }

        Applied {
            value: emptied,
            implication,
        }
    }

    // ── Zones ──────────────────────────────────────────────────────

    /// Create a zone with default field values.
    pub fn add_zone(
        &mut self,
        name: &str,
        kind: ZoneKind,
        shape_refs: Vec<ShapeRef>,
    ) -> Result<Applied<ZoneId>, ValidationError> {
        let name = check_name("zone", name)?;
        ensure_unique("zone", &name, self.zones.values().map(|z| z.name.as_str()))?;
        let id = ZoneId(allocate_id("zone", &mut self.next_zone)?);
        let values = ZoneRegistry::global().reconcile(
            kind,
            &EntityRef::Zone(name.clone()),
            &Default::default(),
            &self.physics,
        );
        log::debug!("adding zone '{name}' ({kind})");
        self.zones.insert(
            id,
            Zone {
                id,
                name,
                kind,
                shape_refs,
                values,
            },
        );
        Ok(Applied {
            value: id,
            implication: self.implication(EditKind::ZoneAdded),
        })
    }

    /// Remove a zone.
    pub fn remove_zone(&mut self, id: ZoneId) -> Result<StaleImplication, ValidationError> {
        self.zones
            .shift_remove(&id)
            .ok_or_else(|| zone_not_found(id))?;
        Ok(self.implication(EditKind::ZoneRemoved))
    }

    /// Rename a zone.
    pub fn rename_zone(
        &mut self,
        id: ZoneId,
        name: &str,
    ) -> Result<StaleImplication, ValidationError> {
        let name = check_name("zone", name)?;
        ensure_unique(
            "zone",
            &name,
            self.zones
                .values()
                .filter(|z| z.id != id)
                .map(|z| z.name.as_str()),
        )?;
        let zone = self.zones.get_mut(&id).ok_or_else(|| zone_not_found(id))?;
        if zone.name == name {
            return Ok(StaleImplication::NONE);
        }
        zone.name = name;
        Ok(self.implication(EditKind::ZoneRenamed))
    }

    /// Change the kind of a zone, keeping values of fields both kinds share.
    pub fn set_zone_kind(
        &mut self,
        id: ZoneId,
        kind: ZoneKind,
    ) -> Result<StaleImplication, ValidationError> {
        let zone = self.zones.get_mut(&id).ok_or_else(|| zone_not_found(id))?;
        if zone.kind == kind {
            return Ok(StaleImplication::NONE);
        }
        zone.kind = kind;
        zone.values =
            ZoneRegistry::global().reconcile(kind, &zone.entity(), &zone.values, &self.physics);
        Ok(self.implication(EditKind::ZoneFieldEdited))
    }

    /// Set one field of a zone. Same rules as [`set_field`](Self::set_field).
    pub fn set_zone_field(
        &mut self,
        id: ZoneId,
        field: &str,
        value: FieldValue,
    ) -> Result<StaleImplication, ValidationError> {
        let registry = ZoneRegistry::global();
        let zone = self.zones.get_mut(&id).ok_or_else(|| zone_not_found(id))?;
        let entity = zone.entity();
        let schema = registry
            .schema(zone.kind, field)
            .ok_or_else(|| ValidationError::Schema {
                entity: entity.clone(),
                source: SchemaError::UnknownField {
                    field: field.to_string(),
                },
            })?;
        if !zone.values.is_active(field) {
            return Err(ValidationError::FieldInactive {
                entity,
                field: field.to_string(),
            });
        }
        let value = schema.normalize(&entity, value)?;
        zone.values.replace(field, value);
        zone.values = registry.reconcile(zone.kind, &entity, &zone.values, &self.physics);
        Ok(self.implication(EditKind::ZoneFieldEdited))
    }

    /// Replace the geometry a zone covers.
    pub fn set_zone_shapes(
        &mut self,
        id: ZoneId,
        shape_refs: Vec<ShapeRef>,
    ) -> Result<StaleImplication, ValidationError> {
        let zone = self.zones.get_mut(&id).ok_or_else(|| zone_not_found(id))?;
        if zone.shape_refs == shape_refs {
            return Ok(StaleImplication::NONE);
        }
        zone.shape_refs = shape_refs;
        Ok(self.implication(EditKind::ZoneShapeChanged))
    }

    // ── Refinement regions ─────────────────────────────────────────

    /// Create a refinement region with default settings.
    pub fn add_region(
        &mut self,
        name: &str,
        shape_refs: Vec<ShapeRef>,
    ) -> Result<Applied<RegionId>, ValidationError> {
        let name = check_name("refinement region", name)?;
        ensure_unique(
            "refinement region",
            &name,
            self.regions.values().map(|r| r.name.as_str()),
        )?;
        let id = RegionId(allocate_id("refinement region", &mut self.next_region)?);
        self.regions.insert(
            id,
            RefinementRegion {
                id,
                name,
                shape_refs,
                settings: RegionSettings::default(),
                extrusion: None,
            },
        );
        Ok(Applied {
            value: id,
            implication: self.implication(EditKind::RefinementRegionAdded),
        })
    }

    /// Remove a refinement region.
    pub fn remove_region(&mut self, id: RegionId) -> Result<StaleImplication, ValidationError> {
        self.regions
            .shift_remove(&id)
            .ok_or_else(|| region_not_found(id))?;
        Ok(self.implication(EditKind::RefinementRegionRemoved))
    }

    /// Rename a refinement region.
    pub fn rename_region(
        &mut self,
        id: RegionId,
        name: &str,
    ) -> Result<StaleImplication, ValidationError> {
        let name = check_name("refinement region", name)?;
        ensure_unique(
            "refinement region",
            &name,
            self.regions
                .values()
                .filter(|r| r.id != id)
                .map(|r| r.name.as_str()),
        )?;
        let region = self.regions.get_mut(&id).ok_or_else(|| region_not_found(id))?;
        if region.name == name {
            return Ok(StaleImplication::NONE);
        }
        region.name = name;
        Ok(self.implication(EditKind::RefinementRegionEdited))
    }

    /// Change the size parameters of a region.
    pub fn set_region_settings(
        &mut self,
        id: RegionId,
        settings: RegionSettings,
    ) -> Result<StaleImplication, ValidationError> {
        let region = self.regions.get_mut(&id).ok_or_else(|| region_not_found(id))?;
        if let Some(problem) = check_region_settings(&region.entity(), &settings)
            .into_iter()
            .next()
        {
            return Err(problem);
        }
        region.settings = settings;
        Ok(self.implication(EditKind::RefinementRegionEdited))
    }

    /// Replace the geometry a region refines.
    pub fn set_region_shapes(
        &mut self,
        id: RegionId,
        shape_refs: Vec<ShapeRef>,
    ) -> Result<StaleImplication, ValidationError> {
        let region = self.regions.get_mut(&id).ok_or_else(|| region_not_found(id))?;
        if region.shape_refs == shape_refs {
            return Ok(StaleImplication::NONE);
        }
        region.shape_refs = shape_refs;
        Ok(self.implication(EditKind::RefinementRegionEdited))
    }

    /// Set or clear the extrusion of a region.
    pub fn set_extrusion(
        &mut self,
        id: RegionId,
        extrusion: Option<Extrusion>,
    ) -> Result<StaleImplication, ValidationError> {
        let region = self.regions.get_mut(&id).ok_or_else(|| region_not_found(id))?;
        if let Some(e) = &extrusion {
            if let Some(problem) = check_extrusion(&region.entity(), e).into_iter().next() {
                return Err(problem);
            }
        }
        region.extrusion = extrusion;
        Ok(self.implication(EditKind::ExtrusionEdited))
    }

    // ── Mesh settings ──────────────────────────────────────────────

    /// Replace the mesh settings.
    pub fn set_mesh_settings(
        &mut self,
        settings: MeshSettings,
    ) -> Result<StaleImplication, ValidationError> {
        settings.check_edit()?;
        self.mesh = settings;
        Ok(self.implication(EditKind::MeshSettings))
    }

    // ── Validation ─────────────────────────────────────────────────

    /// Every problem preventing the mesh case from being written.
    pub fn validate_mesh_case(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = self.mesh.problems();
        duplicate_names(
            "boundary",
            self.boundaries.values().map(|b| b.name.as_str()),
            &mut errors,
        );
        duplicate_names(
            "refinement region",
            self.regions.values().map(|r| r.name.as_str()),
            &mut errors,
        );
        for bc in self.boundaries.values() {
            if bc.face_set.is_empty() && !bc.default_for_unmatched {
                errors.push(ValidationError::InvalidSetting {
                    entity: bc.entity(),
                    reason: "boundary has no faces".to_string(),
                });
            }
        }
        for region in self.regions.values() {
            let entity = region.entity();
            errors.extend(check_region_settings(&entity, &region.settings));
            if let Some(e) = &region.extrusion {
                errors.extend(check_extrusion(&entity, e));
            }
        }
        into_result(errors)
    }

    /// Every problem preventing the solver case from being written.
    ///
    /// Never stops at the first problem.
    pub fn validate_solver_case(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.physics.validate() {
            errors.push(e);
        }
        duplicate_names(
            "boundary",
            self.boundaries.values().map(|b| b.name.as_str()),
            &mut errors,
        );
        duplicate_names("zone", self.zones.values().map(|z| z.name.as_str()), &mut errors);

        let defaults: Vec<_> = self
            .boundaries
            .values()
            .filter(|b| b.default_for_unmatched)
            .collect();
        for extra in defaults.iter().skip(1) {
            errors.push(ValidationError::DefaultBoundaryConflict {
                existing: defaults[0].name.clone(),
                requested: extra.name.clone(),
            });
        }

        let boundary_registry = BoundaryRegistry::global();
        for bc in self.boundaries.values() {
            let entity = bc.entity();
            check_values(
                &entity,
                boundary_registry.schemas(&bc.variant),
                &bc.values,
                &mut errors,
            );
            if let Some(partner) = bc.values.get(PARTNER_FIELD).and_then(FieldValue::as_text) {
                if !self
                    .boundaries
                    .values()
                    .any(|b| b.id != bc.id && b.name == partner)
                {
                    errors.push(ValidationError::UnknownPartner {
                        entity,
                        partner: partner.to_string(),
                    });
                }
            }
        }
        let zone_registry = ZoneRegistry::global();
        for zone in self.zones.values() {
            check_values(
                &zone.entity(),
                zone_registry.schemas(zone.kind),
                &zone.values,
                &mut errors,
            );
        }
        into_result(errors)
    }

    /// Both mesh and solver case validation, all problems combined.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = self.validate_mesh_case().err().unwrap_or_default();
        for e in self.validate_solver_case().err().unwrap_or_default() {
            if !errors.contains(&e) {
                errors.push(e);
            }
        }
        into_result(errors)
    }

    // ── Restoration ────────────────────────────────────────────────

    /// Bring a deserialized model back to a consistent state.
    ///
    /// Rejects an inconsistent physics selection, advances the ID counters
    /// past every stored ID, and reconciles every entity's values against
    /// the registries so stored maps are never trusted blindly.
    pub fn normalize_restored(&mut self) -> Result<(), ValidationError> {
        self.physics.validate()?;
        self.next_boundary = counter_after(
            "boundary",
            self.boundaries.keys().map(|k| k.0).max(),
            self.next_boundary,
        )?;
        self.next_zone =
            counter_after("zone", self.zones.keys().map(|k| k.0).max(), self.next_zone)?;
        self.next_region = counter_after(
            "refinement region",
            self.regions.keys().map(|k| k.0).max(),
            self.next_region,
        )?;

        let boundary_registry = BoundaryRegistry::global();
        for bc in self.boundaries.values_mut() {
            bc.values =
                boundary_registry.reconcile(&bc.variant, &bc.entity(), &bc.values, &self.physics);
        }
        let zone_registry = ZoneRegistry::global();
        for zone in self.zones.values_mut() {
            zone.values =
                zone_registry.reconcile(zone.kind, &zone.entity(), &zone.values, &self.physics);
        }
        Ok(())
    }
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn duplicate_names<'a>(
    collection: &'static str,
    names: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = std::collections::HashSet::new();
    let mut reported = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            errors.push(ValidationError::DuplicateName {
                collection,
                name: name.to_string(),
            });
        }
    }
}

fn check_values(
    entity: &EntityRef,
    schemas: &[cfdcase_core::FieldSchema],
    values: &cfdcase_core::FieldValues,
    errors: &mut Vec<ValidationError>,
) {
    for (name, slot) in values.iter() {
        let Some(schema) = schemas.iter().find(|s| s.name == name) else {
            errors.push(ValidationError::Schema {
                entity: entity.clone(),
                source: SchemaError::UnknownField {
                    field: name.to_string(),
                },
            });
            continue;
        };
        match slot {
            None => errors.push(ValidationError::MissingValue {
                entity: entity.clone(),
                field: name.to_string(),
            }),
            Some(value) => {
                if let Err(e) = schema.normalize(entity, value.clone()) {
                    errors.push(e);
                }
            }
        }
    }
}

/// Serialize an ID-keyed map as a plain list; entities carry their own IDs.
mod entity_list {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::hash::Hash;

    use crate::boundary::BoundaryCondition;
    use crate::mesh::RefinementRegion;
    use crate::zone::Zone;
    use cfdcase_core::{BoundaryId, RegionId, ZoneId};

    pub(super) trait Keyed {
        type Key: Copy + Eq + Hash;
        fn key(&self) -> Self::Key;
    }

    impl Keyed for BoundaryCondition {
        type Key = BoundaryId;
        fn key(&self) -> BoundaryId {
            self.id
        }
    }

    impl Keyed for Zone {
        type Key = ZoneId;
        fn key(&self) -> ZoneId {
            self.id
        }
    }

    impl Keyed for RefinementRegion {
        type Key = RegionId;
        fn key(&self) -> RegionId {
            self.id
        }
    }

    pub(super) fn serialize<K, V, S>(map: &IndexMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub(super) fn deserialize<'de, V, D>(deserializer: D) -> Result<IndexMap<V::Key, V>, D::Error>
    where
        V: Keyed + Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let list = Vec::<V>::deserialize(deserializer)?;
        let mut map = IndexMap::with_capacity(list.len());
        for entity in list {
            if map.insert(entity.key(), entity).is_some() {
                return Err(serde::de::Error::custom("duplicate entity id"));
            }
        }
        Ok(map)
    }
}
