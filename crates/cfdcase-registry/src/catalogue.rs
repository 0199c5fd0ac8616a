//! Static description of every registered boundary variant.
//!
//! The order of entries is significant: the first type of a category and
//! the first sub-type of a type are the values a category change resets to.

use crate::variant::{BoundaryType, Category, SubType};

pub(crate) struct CategoryEntry {
    pub category: Category,
    pub label: &'static str,
    pub description: &'static str,
    pub types: &'static [TypeEntry],
}

pub(crate) struct TypeEntry {
    pub ty: BoundaryType,
    pub label: &'static str,
    pub description: &'static str,
    pub help: &'static str,
    pub sub_types: &'static [SubTypeEntry],
}

pub(crate) struct SubTypeEntry {
    pub sub_type: SubType,
    pub label: &'static str,
    pub description: &'static str,
}

const fn ty(
    ty: BoundaryType,
    label: &'static str,
    description: &'static str,
    help: &'static str,
    sub_types: &'static [SubTypeEntry],
) -> TypeEntry {
    TypeEntry {
        ty,
        label,
        description,
        help,
        sub_types,
    }
}

const fn sub(sub_type: SubType, label: &'static str, description: &'static str) -> SubTypeEntry {
    SubTypeEntry {
        sub_type,
        label,
        description,
    }
}

const TOTAL_STATIC: &[SubTypeEntry] = &[
    sub(
        SubType::Total,
        "Total pressure",
        "Total pressure is prescribed; the static pressure follows from the local velocity.",
    ),
    sub(
        SubType::Static,
        "Static pressure",
        "Static pressure is prescribed directly.",
    ),
];

const MOVING: &[SubTypeEntry] = &[
    sub(
        SubType::Translating,
        "Translating",
        "Uniform wall velocity.",
    ),
    sub(
        SubType::Rotating,
        "Rotating",
        "Solid-body rotation about an axis.",
    ),
];

const FLOW_RATE: &[SubTypeEntry] = &[
    sub(SubType::Volumetric, "Volumetric", "Volumetric flow rate."),
    sub(SubType::Mass, "Mass", "Mass flow rate."),
];

const STATIC_ONLY: &[SubTypeEntry] = &[sub(
    SubType::Static,
    "Static pressure",
    "Static pressure is prescribed directly.",
)];

const CYCLIC: &[SubTypeEntry] = &[
    sub(
        SubType::Rotational,
        "Rotational",
        "Partner is related by a rotation.",
    ),
    sub(
        SubType::Translational,
        "Translational",
        "Partner is related by a translation.",
    ),
];

pub(crate) static CATALOGUE: &[CategoryEntry] = &[
    CategoryEntry {
        category: Category::Wall,
        label: "Wall",
        description: "Solid, impermeable boundary.",
        types: &[
            ty(
                BoundaryType::NoSlip,
                "No-slip",
                "Zero velocity relative to the wall.",
                "Standard stationary wall. Turbulent cases use wall functions.",
                &[],
            ),
            ty(
                BoundaryType::Slip,
                "Slip",
                "Frictionless wall.",
                "Only the wall-normal velocity component is constrained to zero.",
                &[],
            ),
            ty(
                BoundaryType::PartialSlip,
                "Partial slip",
                "Blend between no-slip and slip.",
                "A slip ratio of 0 is a no-slip wall, 1 is a frictionless wall.",
                &[],
            ),
            ty(
                BoundaryType::Moving,
                "Moving wall",
                "Wall with a prescribed tangential motion.",
                "The wall geometry does not move; only its surface velocity is imposed.",
                MOVING,
            ),
            ty(
                BoundaryType::Rough,
                "Rough wall",
                "No-slip wall with sand-grain roughness.",
                "Roughness is modelled through the wall functions of the turbulence model.",
                &[],
            ),
        ],
    },
    CategoryEntry {
        category: Category::Inlet,
        label: "Inlet",
        description: "Boundary through which fluid enters the domain.",
        types: &[
            ty(
                BoundaryType::Velocity,
                "Uniform velocity",
                "Inflow velocity is prescribed.",
                "Specify either Cartesian components or a magnitude and a direction.",
                &[],
            ),
            ty(
                BoundaryType::FlowRate,
                "Flow rate",
                "Inflow rate is prescribed.",
                "The velocity is scaled so the integrated flux matches the given rate.",
                FLOW_RATE,
            ),
            ty(
                BoundaryType::Pressure,
                "Pressure",
                "Inflow driven by a prescribed pressure.",
                "The inflow velocity is computed from the pressure difference.",
                TOTAL_STATIC,
            ),
        ],
    },
    CategoryEntry {
        category: Category::Outlet,
        label: "Outlet",
        description: "Boundary through which fluid leaves the domain.",
        types: &[
            ty(
                BoundaryType::Pressure,
                "Static pressure",
                "Static pressure is prescribed at the outlet.",
                "Backflow is treated with a zero-gradient velocity.",
                STATIC_ONLY,
            ),
            ty(
                BoundaryType::Velocity,
                "Uniform velocity",
                "Outflow velocity is prescribed.",
                "Specify either Cartesian components or a magnitude and a direction.",
                &[],
            ),
            ty(
                BoundaryType::Outflow,
                "Outflow",
                "Zero-gradient outflow.",
                "All quantities are extrapolated from the interior.",
                &[],
            ),
        ],
    },
    CategoryEntry {
        category: Category::Open,
        label: "Open",
        description: "Boundary where fluid may enter or leave.",
        types: &[
            ty(
                BoundaryType::FarField,
                "Far-field",
                "Undisturbed free stream.",
                "Inflow takes the given free-stream state; outflow is extrapolated.",
                &[],
            ),
            ty(
                BoundaryType::Pressure,
                "Pressure",
                "Open boundary at a prescribed pressure.",
                "Entrainment and outflow are both permitted.",
                TOTAL_STATIC,
            ),
        ],
    },
    CategoryEntry {
        category: Category::Constraint,
        label: "Constraint",
        description: "Geometric constraint on the flow.",
        types: &[
            ty(
                BoundaryType::Symmetry,
                "Symmetry plane",
                "Mirror plane of the flow.",
                "The boundary must be planar.",
                &[],
            ),
            ty(
                BoundaryType::Empty,
                "2D (empty)",
                "Front and back planes of a 2D mesh.",
                "No equations are solved in the direction normal to this boundary.",
                &[],
            ),
            ty(
                BoundaryType::Cyclic,
                "Cyclic",
                "Coupled to a partner boundary.",
                "Both boundaries must have matching face layouts.",
                CYCLIC,
            ),
        ],
    },
    CategoryEntry {
        category: Category::Baffle,
        label: "Baffle",
        description: "Internal surface inside the fluid.",
        types: &[
            ty(
                BoundaryType::Porous,
                "Porous baffle",
                "Permeable baffle with a pressure drop.",
                "The pressure drop is proportional to the dynamic pressure.",
                &[],
            ),
            ty(
                BoundaryType::Thin,
                "Thin wall",
                "Zero-thickness impermeable wall.",
                "Both sides of the baffle are treated as no-slip walls.",
                &[],
            ),
        ],
    },
];

pub(crate) fn category(category: Category) -> Option<&'static CategoryEntry> {
    CATALOGUE.iter().find(|c| c.category == category)
}

pub(crate) fn entry(
    category: Category,
    ty: BoundaryType,
) -> Option<&'static TypeEntry> {
    self::category(category)?.types.iter().find(|t| t.ty == ty)
}
