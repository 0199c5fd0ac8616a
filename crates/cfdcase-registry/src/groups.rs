//! Field groups shared by several boundary variants.
//!
//! Each group is a list of schemas in declaration order. Sibling gates
//! inside a group only refer to fields declared earlier in the same group.

use cfdcase_core::{Activation, Bounds, ChoiceOption, FieldSchema, PhysicsGate, UnitClass};

use crate::variant::SubType;

const fn option(id: &'static str, external: &'static str, label: &'static str) -> ChoiceOption {
    ChoiceOption {
        id,
        external,
        label,
    }
}

/// Options of `velocity_spec`.
pub const VELOCITY_SPEC: &[ChoiceOption] = &[
    option("Components", "components", "Cartesian components"),
    option("MagnitudeDirection", "magnitudeNormal", "Magnitude and direction"),
];

/// Options of `turbulence_spec`.
pub const TURBULENCE_SPEC: &[ChoiceOption] = &[
    option(
        "IntensityLengthScale",
        "intensityLengthScale",
        "Intensity and length scale",
    ),
    option(
        "IntensityViscosityRatio",
        "intensityViscosityRatio",
        "Intensity and viscosity ratio",
    ),
    option(
        "KineticEnergyDissipation",
        "kineticEnergyDissipation",
        "Kinetic energy and dissipation rate",
    ),
    option(
        "KineticEnergySpecificDissipation",
        "kineticEnergySpecificDissipation",
        "Kinetic energy and specific dissipation rate",
    ),
    option(
        "TransportedViscosity",
        "transportedViscosity",
        "Transported viscosity",
    ),
];

/// Options of `thermal_spec`.
pub const THERMAL_SPEC: &[ChoiceOption] = &[
    option("Adiabatic", "adiabatic", "Adiabatic"),
    option("FixedTemperature", "fixedTemperature", "Fixed temperature"),
    option("FixedHeatFlux", "fixedHeatFlux", "Fixed heat flux"),
    option(
        "HeatTransferCoefficient",
        "heatTransferCoefficient",
        "Heat transfer coefficient",
    ),
];

/// Reference temperature used as the default for temperature fields, in K.
pub const REFERENCE_TEMPERATURE: f64 = 290.0;

fn choice_is(field: &'static str, option: &'static str) -> Activation {
    Activation::ChoiceIs { field, option }
}

/// Velocity given as components, or as a magnitude plus a direction.
pub(crate) fn velocity() -> Vec<FieldSchema> {
    vec![
        FieldSchema::choice("velocity_spec", "Velocity specification", VELOCITY_SPEC),
        FieldSchema::vector(
            "velocity",
            "Velocity",
            UnitClass::Velocity,
            false,
            Some([0.0; 3]),
        )
        .when(choice_is("velocity_spec", "Components")),
        FieldSchema::scalar(
            "velocity_magnitude",
            "Velocity magnitude",
            UnitClass::Velocity,
            Bounds::NON_NEGATIVE,
            None,
        )
        .when(choice_is("velocity_spec", "MagnitudeDirection")),
        FieldSchema::vector(
            "flow_direction",
            "Flow direction",
            UnitClass::Dimensionless,
            true,
            None,
        )
        .when(choice_is("velocity_spec", "MagnitudeDirection")),
    ]
}

/// Inflow turbulence quantities. The whole group hangs off
/// `turbulence_spec`, which is only active for turbulent physics.
pub(crate) fn turbulence() -> Vec<FieldSchema> {
    const INTENSITY: &[&str] = &["IntensityLengthScale", "IntensityViscosityRatio"];
    const KINETIC: &[&str] = &[
        "KineticEnergyDissipation",
        "KineticEnergySpecificDissipation",
    ];
    vec![
        FieldSchema::choice("turbulence_spec", "Turbulence specification", TURBULENCE_SPEC)
            .when(Activation::Physics(PhysicsGate::Turbulent)),
        FieldSchema::scalar(
            "turbulence_intensity",
            "Turbulence intensity",
            UnitClass::Dimensionless,
            Bounds::UNIT_INTERVAL,
            Some(0.01),
        )
        .when(Activation::ChoiceIn {
            field: "turbulence_spec",
            options: INTENSITY,
        }),
        FieldSchema::scalar(
            "length_scale",
            "Turbulent length scale",
            UnitClass::Length,
            Bounds::POSITIVE,
            Some(0.1),
        )
        .when(choice_is("turbulence_spec", "IntensityLengthScale")),
        FieldSchema::scalar(
            "viscosity_ratio",
            "Turbulent viscosity ratio",
            UnitClass::Dimensionless,
            Bounds::POSITIVE,
            Some(10.0),
        )
        .when(choice_is("turbulence_spec", "IntensityViscosityRatio")),
        FieldSchema::scalar(
            "turbulent_kinetic_energy",
            "Turbulent kinetic energy",
            UnitClass::TurbulentKineticEnergy,
            Bounds::NON_NEGATIVE,
            Some(0.01),
        )
        .when(Activation::ChoiceIn {
            field: "turbulence_spec",
            options: KINETIC,
        }),
        FieldSchema::scalar(
            "dissipation_rate",
            "Dissipation rate",
            UnitClass::DissipationRate,
            Bounds::NON_NEGATIVE,
            Some(0.01),
        )
        .when(choice_is("turbulence_spec", "KineticEnergyDissipation")),
        FieldSchema::scalar(
            "specific_dissipation_rate",
            "Specific dissipation rate",
            UnitClass::SpecificDissipationRate,
            Bounds::NON_NEGATIVE,
            Some(1.0),
        )
        .when(choice_is(
            "turbulence_spec",
            "KineticEnergySpecificDissipation",
        )),
        FieldSchema::scalar(
            "transported_viscosity",
            "Transported viscosity",
            UnitClass::KinematicViscosity,
            Bounds::NON_NEGATIVE,
            Some(1e-5),
        )
        .when(choice_is("turbulence_spec", "TransportedViscosity")),
    ]
}

/// Wall heat transfer, active only when the energy equation is solved.
pub(crate) fn wall_thermal() -> Vec<FieldSchema> {
    vec![
        FieldSchema::choice("thermal_spec", "Thermal condition", THERMAL_SPEC)
            .when(Activation::Physics(PhysicsGate::Thermal)),
        FieldSchema::scalar(
            "temperature",
            "Wall temperature",
            UnitClass::Temperature,
            Bounds::POSITIVE,
            Some(REFERENCE_TEMPERATURE),
        )
        .when(choice_is("thermal_spec", "FixedTemperature")),
        FieldSchema::scalar(
            "heat_flux",
            "Heat flux",
            UnitClass::HeatFlux,
            Bounds::ANY,
            Some(0.0),
        )
        .when(choice_is("thermal_spec", "FixedHeatFlux")),
        FieldSchema::scalar(
            "heat_transfer_coefficient",
            "Heat transfer coefficient",
            UnitClass::HeatTransferCoefficient,
            Bounds::NON_NEGATIVE,
            None,
        )
        .when(choice_is("thermal_spec", "HeatTransferCoefficient")),
        FieldSchema::scalar(
            "ambient_temperature",
            "Ambient temperature",
            UnitClass::Temperature,
            Bounds::POSITIVE,
            Some(REFERENCE_TEMPERATURE),
        )
        .when(choice_is("thermal_spec", "HeatTransferCoefficient")),
    ]
}

/// Inflow temperature for inlets and openings.
pub(crate) fn flow_thermal() -> Vec<FieldSchema> {
    vec![FieldSchema::scalar(
        "temperature",
        "Temperature",
        UnitClass::Temperature,
        Bounds::POSITIVE,
        Some(REFERENCE_TEMPERATURE),
    )
    .when(Activation::Physics(PhysicsGate::Thermal))]
}

/// Inflow phase fraction for inlets and openings.
pub(crate) fn phase() -> Vec<FieldSchema> {
    vec![FieldSchema::scalar(
        "volume_fraction",
        "Volume fraction",
        UnitClass::Dimensionless,
        Bounds::UNIT_INTERVAL,
        Some(1.0),
    )
    .when(Activation::Physics(PhysicsGate::Multiphase))]
}

/// Cyclic coupling. The transform fields only apply to periodic pairs.
pub(crate) fn periodicity(sub_type: Option<SubType>) -> Vec<FieldSchema> {
    let periodic = || Activation::Flag {
        field: "periodic",
        value: true,
    };
    let mut fields = vec![
        FieldSchema::text("partner", "Partner boundary"),
        FieldSchema::flag("periodic", "Periodic transform", false),
    ];
    match sub_type {
        Some(SubType::Rotational) => {
            fields.push(
                FieldSchema::vector(
                    "rotation_axis",
                    "Rotation axis",
                    UnitClass::Dimensionless,
                    true,
                    Some([0.0, 0.0, 1.0]),
                )
                .when(periodic()),
            );
            fields.push(
                FieldSchema::vector(
                    "rotation_centre",
                    "Centre of rotation",
                    UnitClass::Length,
                    false,
                    Some([0.0; 3]),
                )
                .when(periodic()),
            );
        }
        Some(SubType::Translational) => {
            fields.push(
                FieldSchema::vector(
                    "separation_vector",
                    "Separation vector",
                    UnitClass::Length,
                    true,
                    None,
                )
                .when(periodic()),
            );
        }
        _ => {}
    }
    fields
}
