//! Unit classes and the concrete units accepted for each class.
//!
//! Every scalar and vector field schema declares a [`UnitClass`]. Values
//! arrive tagged with a concrete [`Unit`]; a unit from the wrong class is
//! rejected, and accepted values are converted to the SI base unit of
//! their class before they are stored or written.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The physical dimension of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    /// Ratios, coefficients, fractions.
    Dimensionless,
    /// Lengths and positions.
    Length,
    /// Linear velocity.
    Velocity,
    /// Static or total pressure.
    Pressure,
    /// Absolute temperature.
    Temperature,
    /// Volumetric flow rate.
    VolumetricFlowRate,
    /// Mass flow rate.
    MassFlowRate,
    /// Heat flux through a surface.
    HeatFlux,
    /// Convective heat transfer coefficient.
    HeatTransferCoefficient,
    /// Turbulent kinetic energy `k`.
    TurbulentKineticEnergy,
    /// Turbulent dissipation rate `epsilon`.
    DissipationRate,
    /// Specific dissipation rate `omega`.
    SpecificDissipationRate,
    /// Kinematic viscosity (also the Spalart-Allmaras working variable).
    KinematicViscosity,
    /// Angular velocity.
    AngularVelocity,
    /// Linear acceleration (gravity).
    Acceleration,
    /// Inverse area (Darcy coefficients).
    InverseArea,
    /// Inverse length (Forchheimer coefficients).
    InverseLength,
}

impl UnitClass {
    /// The SI base unit values of this class are stored in.
    pub fn si_unit(self) -> Unit {
        match self {
            Self::Dimensionless => Unit::Dimensionless,
            Self::Length => Unit::Metre,
            Self::Velocity => Unit::MetrePerSecond,
            Self::Pressure => Unit::Pascal,
            Self::Temperature => Unit::Kelvin,
            Self::VolumetricFlowRate => Unit::CubicMetrePerSecond,
            Self::MassFlowRate => Unit::KilogramPerSecond,
            Self::HeatFlux => Unit::WattPerSquareMetre,
            Self::HeatTransferCoefficient => Unit::WattPerSquareMetreKelvin,
            Self::TurbulentKineticEnergy => Unit::SquareMetrePerSecondSquared,
            Self::DissipationRate => Unit::SquareMetrePerSecondCubed,
            Self::SpecificDissipationRate => Unit::PerSecond,
            Self::KinematicViscosity => Unit::SquareMetrePerSecond,
            Self::AngularVelocity => Unit::RadianPerSecond,
            Self::Acceleration => Unit::MetrePerSecondSquared,
            Self::InverseArea => Unit::PerSquareMetre,
            Self::InverseLength => Unit::PerMetre,
        }
    }
}

impl fmt::Display for UnitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dimensionless => "dimensionless",
            Self::Length => "length",
            Self::Velocity => "velocity",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::VolumetricFlowRate => "volumetric flow rate",
            Self::MassFlowRate => "mass flow rate",
            Self::HeatFlux => "heat flux",
            Self::HeatTransferCoefficient => "heat transfer coefficient",
            Self::TurbulentKineticEnergy => "turbulent kinetic energy",
            Self::DissipationRate => "dissipation rate",
            Self::SpecificDissipationRate => "specific dissipation rate",
            Self::KinematicViscosity => "kinematic viscosity",
            Self::AngularVelocity => "angular velocity",
            Self::Acceleration => "acceleration",
            Self::InverseArea => "inverse area",
            Self::InverseLength => "inverse length",
        };
        f.write_str(name)
    }
}

/// A concrete unit a value may be supplied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Unit {
    Dimensionless,
    Percent,
    Metre,
    Centimetre,
    Millimetre,
    MetrePerSecond,
    KilometrePerHour,
    Pascal,
    Kilopascal,
    Bar,
    Kelvin,
    Celsius,
    CubicMetrePerSecond,
    LitrePerSecond,
    KilogramPerSecond,
    WattPerSquareMetre,
    WattPerSquareMetreKelvin,
    SquareMetrePerSecondSquared,
    SquareMetrePerSecondCubed,
    PerSecond,
    SquareMetrePerSecond,
    RadianPerSecond,
    RevolutionPerMinute,
    MetrePerSecondSquared,
    PerSquareMetre,
    PerMetre,
}

impl Unit {
    /// The class this unit measures.
    pub fn class(self) -> UnitClass {
        match self {
            Self::Dimensionless | Self::Percent => UnitClass::Dimensionless,
            Self::Metre | Self::Centimetre | Self::Millimetre => UnitClass::Length,
            Self::MetrePerSecond | Self::KilometrePerHour => UnitClass::Velocity,
            Self::Pascal | Self::Kilopascal | Self::Bar => UnitClass::Pressure,
            Self::Kelvin | Self::Celsius => UnitClass::Temperature,
            Self::CubicMetrePerSecond | Self::LitrePerSecond => UnitClass::VolumetricFlowRate,
            Self::KilogramPerSecond => UnitClass::MassFlowRate,
            Self::WattPerSquareMetre => UnitClass::HeatFlux,
            Self::WattPerSquareMetreKelvin => UnitClass::HeatTransferCoefficient,
            Self::SquareMetrePerSecondSquared => UnitClass::TurbulentKineticEnergy,
            Self::SquareMetrePerSecondCubed => UnitClass::DissipationRate,
            Self::PerSecond => UnitClass::SpecificDissipationRate,
            Self::SquareMetrePerSecond => UnitClass::KinematicViscosity,
            Self::RadianPerSecond | Self::RevolutionPerMinute => UnitClass::AngularVelocity,
            Self::MetrePerSecondSquared => UnitClass::Acceleration,
            Self::PerSquareMetre => UnitClass::InverseArea,
            Self::PerMetre => UnitClass::InverseLength,
        }
    }

    /// Multiplicative factor and additive offset to the class SI unit.
    fn to_si_affine(self) -> (f64, f64) {
        match self {
            Self::Percent => (0.01, 0.0),
            Self::Centimetre => (1e-2, 0.0),
            Self::Millimetre => (1e-3, 0.0),
            Self::KilometrePerHour => (1.0 / 3.6, 0.0),
            Self::Kilopascal => (1e3, 0.0),
            Self::Bar => (1e5, 0.0),
            Self::Celsius => (1.0, 273.15),
            Self::LitrePerSecond => (1e-3, 0.0),
            Self::RevolutionPerMinute => (std::f64::consts::TAU / 60.0, 0.0),
            _ => (1.0, 0.0),
        }
    }

    /// Convert an absolute value in this unit to the class SI unit.
    pub fn to_si(self, value: f64) -> f64 {
        let (scale, offset) = self.to_si_affine();
        value * scale + offset
    }

    /// Convert a vector component to the class SI unit.
    ///
    /// Vectors are differences, so affine offsets do not apply.
    pub fn vector_to_si(self, v: [f64; 3]) -> [f64; 3] {
        let (scale, _) = self.to_si_affine();
        [v[0] * scale, v[1] * scale, v[2] * scale]
    }

    /// Whether this unit is the SI base unit of its class.
    pub fn is_si(self) -> bool {
        self.class().si_unit() == self
    }

    /// Short display symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Dimensionless => "-",
            Self::Percent => "%",
            Self::Metre => "m",
            Self::Centimetre => "cm",
            Self::Millimetre => "mm",
            Self::MetrePerSecond => "m/s",
            Self::KilometrePerHour => "km/h",
            Self::Pascal => "Pa",
            Self::Kilopascal => "kPa",
            Self::Bar => "bar",
            Self::Kelvin => "K",
            Self::Celsius => "degC",
            Self::CubicMetrePerSecond => "m^3/s",
            Self::LitrePerSecond => "L/s",
            Self::KilogramPerSecond => "kg/s",
            Self::WattPerSquareMetre => "W/m^2",
            Self::WattPerSquareMetreKelvin => "W/m^2/K",
            Self::SquareMetrePerSecondSquared => "m^2/s^2",
            Self::SquareMetrePerSecondCubed => "m^2/s^3",
            Self::PerSecond => "1/s",
            Self::SquareMetrePerSecond => "m^2/s",
            Self::RadianPerSecond => "rad/s",
            Self::RevolutionPerMinute => "rpm",
            Self::MetrePerSecondSquared => "m/s^2",
            Self::PerSquareMetre => "1/m^2",
            Self::PerMetre => "1/m",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn si_units_round_trip_through_class() {
        for class in [
            UnitClass::Dimensionless,
            UnitClass::Length,
            UnitClass::Pressure,
            UnitClass::Temperature,
            UnitClass::AngularVelocity,
            UnitClass::InverseLength,
        ] {
            assert_eq!(class.si_unit().class(), class);
            assert!(class.si_unit().is_si());
        }
    }

    #[test]
    fn celsius_applies_offset_but_not_to_vectors() {
        assert!((Unit::Celsius.to_si(20.0) - 293.15).abs() < 1e-12);
        assert_eq!(Unit::Celsius.vector_to_si([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn scaled_units_convert() {
        assert_eq!(Unit::Kilopascal.to_si(1.5), 1500.0);
        assert_eq!(Unit::Millimetre.vector_to_si([1.0, 0.0, 2.0]), [1e-3, 0.0, 2e-3]);
        let rpm = Unit::RevolutionPerMinute.to_si(60.0);
        assert!((rpm - std::f64::consts::TAU).abs() < 1e-12);
    }
}
