//! Rendering of a case model into dictionary files.
//!
//! Rendering is pure: it reads the model and produces file contents in
//! memory. Entities appear in the model's insertion order and every value
//! is written in SI, so rendering an unchanged model always yields the
//! same bytes.

use std::path::PathBuf;

use cfdcase_core::{FieldSchema, FieldValue, FieldValues, PhysicsModel, RotatingFrame};
use cfdcase_model::{CaseModel, RefinementRegion};
use cfdcase_registry::{BoundaryRegistry, ZoneRegistry};

use crate::dict::{self, DictWriter};

/// Relative path of the mesher dictionary inside the mesh case.
pub const MESH_DICT: &str = "system/meshDict";
/// Relative path of the physics dictionary inside the solver case.
pub const PHYSICS_PROPERTIES: &str = "constant/physicsProperties";
/// Relative path of the boundary dictionary inside the solver case.
pub const BOUNDARY_CONDITIONS: &str = "system/boundaryConditions";
/// Relative path of the zone dictionary inside the solver case.
pub const ZONES: &str = "system/zones";

/// One file of a rendered case, relative to the case root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the case directory.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
}

impl RenderedFile {
    fn new(path: &str, contents: String) -> Self {
        Self {
            path: PathBuf::from(path),
            contents,
        }
    }
}

/// The solver-facing token for a stored value.
///
/// Choices are written as the option's external name, never its internal id.
pub fn value_token(schema: &FieldSchema, value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(q) => dict::number(q.value),
        FieldValue::Vector { components, .. } => dict::vector(*components),
        FieldValue::Boolean(b) => dict::boolean(*b).to_string(),
        FieldValue::Choice(id) => schema
            .kind
            .option(id)
            .map_or_else(|| id.clone(), |o| o.external.to_string()),
        FieldValue::Text(text) => dict::quoted(text),
    }
}

fn write_values<'a>(
    w: &mut DictWriter,
    values: &FieldValues,
    schema_of: impl Fn(&str) -> Option<&'a FieldSchema>,
) {
    for (name, slot) in values.iter() {
        if let (Some(value), Some(schema)) = (slot, schema_of(name)) {
            w.entry(name, &value_token(schema, value));
        }
    }
}

// ── Mesh case ──────────────────────────────────────────────────────

/// Render the mesh case: one `system/meshDict`.
pub fn render_mesh_case(case: &CaseModel) -> Vec<RenderedFile> {
    let settings = case.mesh_settings();
    let mut w = DictWriter::new("system", "meshDict");

    w.begin("mesh");
    w.entry("utility", settings.utility.external_name());
    w.entry("baseCellSize", &dict::number(settings.base_cell_size));
    if let Some(point) = settings.point_in_mesh {
        w.entry("pointInMesh", &dict::vector(point));
    }
    if let Some(geometry) = &settings.geometry {
        w.entry("geometry", &dict::quoted(&geometry.0));
    }
    w.end();
    w.blank();

    w.begin("refinementRegions");
    for region in case.regions() {
        write_region(&mut w, region);
    }
    w.end();
    w.blank();

    w.begin("cellZones");
    for zone in case.zones() {
        w.begin(zone.name());
        w.entry(
            "shapes",
            &dict::word_list(zone.shape_refs().iter().map(|s| s.0.as_str())),
        );
        w.end();
    }
    w.end();
    w.blank();

    w.begin("patches");
    for bc in case.boundaries() {
        w.begin(bc.name());
        w.entry("faces", &dict::word_list(bc.face_set().iter().map(|s| s.0.as_str())));
        if bc.is_default_for_unmatched() {
            w.entry("defaultForUnmatched", dict::boolean(true));
        }
        w.end();
    }
    w.end();

    vec![RenderedFile::new(MESH_DICT, w.finish())]
}

fn write_region(w: &mut DictWriter, region: &RefinementRegion) {
    let settings = region.settings();
    w.begin(region.name());
    w.entry(
        "shapes",
        &dict::word_list(region.shape_refs().iter().map(|s| s.0.as_str())),
    );
    w.entry("relativeSize", &dict::number(settings.relative_size));
    w.entry("thickness", &dict::number(settings.thickness));
    if let Some(layers) = settings.boundary_layers {
        w.begin("boundaryLayers");
        w.entry("count", &layers.count.to_string());
        w.entry("expansionRatio", &dict::number(layers.expansion_ratio));
        w.entry("firstLayerHeight", &dict::number(layers.first_layer_height));
        w.end();
    }
    if let Some(extrusion) = region.extrusion() {
        w.begin("extrusion");
        w.entry("type", extrusion.kind.external_name());
        w.entry("layers", &extrusion.layers.to_string());
        w.entry("thickness", &dict::number(extrusion.thickness));
        w.end();
    }
    w.end();
}

// ── Solver case ────────────────────────────────────────────────────

/// Render the solver case: physics, boundary conditions, and zones.
pub fn render_solver_case(case: &CaseModel) -> Vec<RenderedFile> {
    vec![
        RenderedFile::new(PHYSICS_PROPERTIES, render_physics(case.physics())),
        RenderedFile::new(BOUNDARY_CONDITIONS, render_boundaries(case)),
        RenderedFile::new(ZONES, render_zones(case)),
    ]
}

fn render_physics(physics: &PhysicsModel) -> String {
    let mut w = DictWriter::new("constant", "physicsProperties");
    w.begin("physics");
    w.entry("timeDependence", physics.time.external_name());
    w.entry("phase", physics.phase.external_name());
    w.entry("flow", physics.flow.external_name());
    w.entry("viscousModel", physics.viscous.external_name());
    if let Some(model) = physics.turbulence {
        w.entry("turbulenceModel", model.external_name());
    }
    match physics.rotating_frame {
        RotatingFrame::Off => w.entry("rotatingFrame", dict::boolean(false)),
        RotatingFrame::On {
            axis,
            origin,
            speed,
        } => {
            w.begin("rotatingFrame");
            w.entry("axis", &dict::vector(axis));
            w.entry("origin", &dict::vector(origin));
            w.entry("omega", &dict::number(speed));
            w.end();
        }
    }
    w.entry("gravity", &dict::vector(physics.gravity));
    w.end();
    w.finish()
}

fn render_boundaries(case: &CaseModel) -> String {
    let registry = BoundaryRegistry::global();
    let mut w = DictWriter::new("system", "boundaryConditions");
    for (i, bc) in case.boundaries().enumerate() {
        if i > 0 {
            w.blank();
        }
        let variant = bc.variant();
        w.begin(bc.name());
        w.entry("category", bc.category().external_name());
        w.entry("type", bc.ty().external_name());
        if let Some(sub) = bc.sub_type() {
            w.entry("subType", sub.external_name());
        }
        if bc.is_default_for_unmatched() {
            w.entry("defaultForUnmatched", dict::boolean(true));
        }
        write_values(&mut w, bc.values(), |name| registry.schema(&variant, name));
        w.end();
    }
    w.finish()
}

fn render_zones(case: &CaseModel) -> String {
    let registry = ZoneRegistry::global();
    let mut w = DictWriter::new("system", "zones");
    let porous = case.zones().filter(|z| z.kind().is_porous());
    let initialisation = case.zones().filter(|z| !z.kind().is_porous());
    for (i, zone) in porous.chain(initialisation).enumerate() {
        if i > 0 {
            w.blank();
        }
        let kind = zone.kind();
        w.begin(zone.name());
        w.entry("type", if kind.is_porous() { "porous" } else { "initialisation" });
        if kind.is_porous() {
            w.entry("model", kind.external_name());
        }
        w.entry(
            "shapes",
            &dict::word_list(zone.shape_refs().iter().map(|s| s.0.as_str())),
        );
        write_values(&mut w, zone.values(), |name| registry.schema(kind, name));
        w.end();
    }
    w.finish()
}
