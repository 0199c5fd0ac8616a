//! The physics model selector and atomic patches to it.
//!
//! [`PhysicsModel`] records the orthogonal physics choices of a case.
//! Changes go through [`PhysicsModel::apply`], which either returns a
//! complete, consistent model or rejects the whole [`PhysicsPatch`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Steady-state or time-accurate solution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeDependence {
    /// Steady state.
    #[default]
    Steady,
    /// Transient.
    Transient,
}

impl TimeDependence {
    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::Steady => "steady",
            Self::Transient => "transient",
        }
    }
}

/// Number of phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseModel {
    /// One fluid.
    #[default]
    Single,
    /// Two immiscible fluids with a tracked free surface.
    FreeSurface,
}

impl PhaseModel {
    /// Whether volume-fraction fields apply.
    pub fn is_multiphase(self) -> bool {
        matches!(self, Self::FreeSurface)
    }

    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::Single => "singlePhase",
            Self::FreeSurface => "freeSurface",
        }
    }
}

/// Energy treatment of the flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowRegime {
    /// Incompressible, no energy equation.
    #[default]
    Isothermal,
    /// Energy equation with low-speed (buoyant) flow.
    NonIsothermal,
    /// Fully compressible, high Mach number.
    HighMachCompressible,
}

impl FlowRegime {
    /// Whether thermal fields apply.
    pub fn is_thermal(self) -> bool {
        !matches!(self, Self::Isothermal)
    }

    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::Isothermal => "isothermal",
            Self::NonIsothermal => "nonIsothermal",
            Self::HighMachCompressible => "highMachCompressible",
        }
    }
}

/// Viscous treatment of the flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViscousModel {
    /// Euler equations.
    Inviscid,
    /// Resolved laminar flow.
    Laminar,
    /// Reynolds-averaged turbulence.
    #[default]
    Rans,
    /// Large-eddy simulation.
    Les,
    /// Detached-eddy simulation.
    Des,
}

impl ViscousModel {
    /// Whether this model needs a [`TurbulenceModel`].
    pub fn requires_turbulence_model(self) -> bool {
        matches!(self, Self::Rans | Self::Les | Self::Des)
    }

    /// Whether this model is only meaningful for transient runs.
    pub fn requires_transient(self) -> bool {
        matches!(self, Self::Les | Self::Des)
    }

    /// The turbulence model selected when switching to this family.
    pub fn default_turbulence_model(self) -> Option<TurbulenceModel> {
        match self {
            Self::Inviscid | Self::Laminar => None,
            Self::Rans => Some(TurbulenceModel::KOmegaSst),
            Self::Les => Some(TurbulenceModel::Wale),
            Self::Des => Some(TurbulenceModel::SpalartAllmarasDdes),
        }
    }

    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::Inviscid => "inviscid",
            Self::Laminar => "laminar",
            Self::Rans => "RAS",
            Self::Les => "LES",
            Self::Des => "DES",
        }
    }
}

impl fmt::Display for ViscousModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.external_name())
    }
}

/// Turbulence closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum TurbulenceModel {
    KEpsilon,
    RealizableKe,
    KOmega,
    KOmegaSst,
    SpalartAllmaras,
    Smagorinsky,
    Wale,
    KEquation,
    SpalartAllmarasDes,
    SpalartAllmarasDdes,
    SpalartAllmarasIddes,
    KOmegaSstDes,
}

impl TurbulenceModel {
    /// The viscous model family this closure belongs to.
    pub fn family(self) -> ViscousModel {
        match self {
            Self::KEpsilon
            | Self::RealizableKe
            | Self::KOmega
            | Self::KOmegaSst
            | Self::SpalartAllmaras => ViscousModel::Rans,
            Self::Smagorinsky | Self::Wale | Self::KEquation => ViscousModel::Les,
            Self::SpalartAllmarasDes
            | Self::SpalartAllmarasDdes
            | Self::SpalartAllmarasIddes
            | Self::KOmegaSstDes => ViscousModel::Des,
        }
    }

    /// Solver-facing name.
    pub fn external_name(self) -> &'static str {
        match self {
            Self::KEpsilon => "kEpsilon",
            Self::RealizableKe => "realizableKE",
            Self::KOmega => "kOmega",
            Self::KOmegaSst => "kOmegaSST",
            Self::SpalartAllmaras => "SpalartAllmaras",
            Self::Smagorinsky => "Smagorinsky",
            Self::Wale => "WALE",
            Self::KEquation => "kEqn",
            Self::SpalartAllmarasDes => "SpalartAllmarasDES",
            Self::SpalartAllmarasDdes => "SpalartAllmarasDDES",
            Self::SpalartAllmarasIddes => "SpalartAllmarasIDDES",
            Self::KOmegaSstDes => "kOmegaSSTDES",
        }
    }
}

impl fmt::Display for TurbulenceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.external_name())
    }
}

/// Multiple-reference-frame rotation of the whole domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum RotatingFrame {
    /// Inertial frame.
    #[default]
    Off,
    /// Rotating frame.
    On {
        /// Rotation axis (need not be normalised, must not be zero).
        axis: [f64; 3],
        /// A point on the axis, in metres.
        origin: [f64; 3],
        /// Angular speed in rad/s.
        speed: f64,
    },
}

/// The physics selection of a case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsModel {
    /// Steady or transient.
    pub time: TimeDependence,
    /// Single phase or free surface.
    pub phase: PhaseModel,
    /// Energy treatment.
    pub flow: FlowRegime,
    /// Viscous treatment.
    pub viscous: ViscousModel,
    /// Turbulence closure; `Some` exactly when `viscous` requires one.
    pub turbulence: Option<TurbulenceModel>,
    /// Domain rotation.
    pub rotating_frame: RotatingFrame,
    /// Gravitational acceleration in m/s^2.
    pub gravity: [f64; 3],
}

impl Default for PhysicsModel {
    fn default() -> Self {
        Self {
            time: TimeDependence::Steady,
            phase: PhaseModel::Single,
            flow: FlowRegime::Isothermal,
            viscous: ViscousModel::Rans,
            turbulence: ViscousModel::Rans.default_turbulence_model(),
            rotating_frame: RotatingFrame::Off,
            gravity: [0.0, -9.81, 0.0],
        }
    }
}

impl PhysicsModel {
    /// Check every cross-field invariant of the selection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let incompatible = |reason: String| Err(ValidationError::IncompatiblePhysics { reason });

        match (self.viscous.requires_turbulence_model(), self.turbulence) {
            (false, Some(model)) => {
                return incompatible(format!(
                    "turbulence model {model} cannot be used with viscous model {}",
                    self.viscous
                ));
            }
            (true, None) => {
                return incompatible(format!(
                    "viscous model {} requires a turbulence model",
                    self.viscous
                ));
            }
            (true, Some(model)) if model.family() != self.viscous => {
                return incompatible(format!(
                    "turbulence model {model} belongs to {}, not {}",
                    model.family(),
                    self.viscous
                ));
            }
            _ => {}
        }
        if self.viscous.requires_transient() && self.time == TimeDependence::Steady {
            return incompatible(format!(
                "viscous model {} requires a transient simulation",
                self.viscous
            ));
        }
        if self.phase.is_multiphase() && self.flow == FlowRegime::HighMachCompressible {
            return incompatible(
                "free-surface multiphase flow cannot be high-Mach compressible".to_string(),
            );
        }
        if let RotatingFrame::On {
            axis,
            origin,
            speed,
        } = self.rotating_frame
        {
            let finite = axis.iter().chain(origin.iter()).all(|c| c.is_finite());
            if !finite || !speed.is_finite() {
                return incompatible("rotating frame values must be finite".to_string());
            }
            if axis.iter().all(|c| *c == 0.0) {
                return incompatible("rotating frame axis must not be zero".to_string());
            }
        }
        if self.gravity.iter().any(|c| !c.is_finite()) {
            return incompatible("gravity must be finite".to_string());
        }
        Ok(())
    }

    /// Apply a patch, returning the resulting model or rejecting the patch.
    ///
    /// When the patch changes the viscous model without naming a
    /// turbulence model, the current closure is kept if it belongs to the
    /// new family, replaced by the family default otherwise, and cleared
    /// for families without one. `self` is never modified.
    pub fn apply(&self, patch: &PhysicsPatch) -> Result<PhysicsModel, ValidationError> {
        let mut next = self.clone();
        if let Some(time) = patch.time {
            next.time = time;
        }
        if let Some(phase) = patch.phase {
            next.phase = phase;
        }
        if let Some(flow) = patch.flow {
            next.flow = flow;
        }
        if let Some(viscous) = patch.viscous {
            next.viscous = viscous;
        }
        if let Some(frame) = patch.rotating_frame {
            next.rotating_frame = frame;
        }
        if let Some(gravity) = patch.gravity {
            next.gravity = gravity;
        }
        match patch.turbulence {
            Some(explicit) => next.turbulence = explicit,
            None if patch.viscous.is_some() => {
                next.turbulence = match next.turbulence {
                    Some(model) if model.family() == next.viscous => Some(model),
                    _ => next.viscous.default_turbulence_model(),
                };
            }
            None => {}
        }
        next.validate()?;
        Ok(next)
    }
}

/// A partial update to a [`PhysicsModel`]. `None` leaves a choice as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhysicsPatch {
    /// New time dependence.
    pub time: Option<TimeDependence>,
    /// New phase model.
    pub phase: Option<PhaseModel>,
    /// New flow regime.
    pub flow: Option<FlowRegime>,
    /// New viscous model.
    pub viscous: Option<ViscousModel>,
    /// New turbulence model; `Some(None)` clears it explicitly.
    pub turbulence: Option<Option<TurbulenceModel>>,
    /// New rotating frame.
    pub rotating_frame: Option<RotatingFrame>,
    /// New gravity vector.
    pub gravity: Option<[f64; 3]>,
}

impl PhysicsPatch {
    /// Set the time dependence.
    pub fn time(mut self, time: TimeDependence) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the phase model.
    pub fn phase(mut self, phase: PhaseModel) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Set the flow regime.
    pub fn flow(mut self, flow: FlowRegime) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Set the viscous model.
    pub fn viscous(mut self, viscous: ViscousModel) -> Self {
        self.viscous = Some(viscous);
        self
    }

    /// Set (or clear) the turbulence model.
    pub fn turbulence(mut self, model: Option<TurbulenceModel>) -> Self {
        self.turbulence = Some(model);
        self
    }

    /// Set the rotating frame.
    pub fn rotating_frame(mut self, frame: RotatingFrame) -> Self {
        self.rotating_frame = Some(frame);
        self
    }

    /// Set the gravity vector.
    pub fn gravity(mut self, gravity: [f64; 3]) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_valid() {
        assert!(PhysicsModel::default().validate().is_ok());
    }

    #[test]
    fn switching_to_inviscid_clears_turbulence() {
        let next = PhysicsModel::default()
            .apply(&PhysicsPatch::default().viscous(ViscousModel::Inviscid))
            .unwrap();
        assert_eq!(next.turbulence, None);
    }

    #[test]
    fn turbulence_model_with_inviscid_is_rejected() {
        let patch = PhysicsPatch::default()
            .viscous(ViscousModel::Inviscid)
            .turbulence(Some(TurbulenceModel::KEpsilon));
        match PhysicsModel::default().apply(&patch) {
            Err(ValidationError::IncompatiblePhysics { .. }) => {}
            other => panic!("expected IncompatiblePhysics, got {other:?}"),
        }
    }

    #[test]
    fn switching_family_picks_family_default() {
        let base = PhysicsModel::default()
            .apply(&PhysicsPatch::default().time(TimeDependence::Transient))
            .unwrap();
        let les = base
            .apply(&PhysicsPatch::default().viscous(ViscousModel::Les))
            .unwrap();
        assert_eq!(les.turbulence, Some(TurbulenceModel::Wale));
    }

    #[test]
    fn switching_within_family_keeps_model() {
        let base = PhysicsModel::default()
            .apply(&PhysicsPatch::default().turbulence(Some(TurbulenceModel::KEpsilon)))
            .unwrap();
        let again = base
            .apply(&PhysicsPatch::default().viscous(ViscousModel::Rans))
            .unwrap();
        assert_eq!(again.turbulence, Some(TurbulenceModel::KEpsilon));
    }

    #[test]
    fn les_in_steady_state_is_rejected_and_model_untouched() {
        let base = PhysicsModel::default();
        let patch = PhysicsPatch::default().viscous(ViscousModel::Les);
        assert!(base.apply(&patch).is_err());
        assert_eq!(base, PhysicsModel::default());
    }

    #[test]
    fn compressible_free_surface_is_rejected() {
        let patch = PhysicsPatch::default()
            .phase(PhaseModel::FreeSurface)
            .flow(FlowRegime::HighMachCompressible);
        assert!(PhysicsModel::default().apply(&patch).is_err());
    }

    #[test]
    fn rotating_frame_needs_axis() {
        let patch = PhysicsPatch::default().rotating_frame(RotatingFrame::On {
            axis: [0.0; 3],
            origin: [0.0; 3],
            speed: 10.0,
        });
        assert!(PhysicsModel::default().apply(&patch).is_err());
    }

    #[test]
    fn wrong_family_is_rejected() {
        let patch = PhysicsPatch::default().turbulence(Some(TurbulenceModel::Smagorinsky));
        assert!(PhysicsModel::default().apply(&patch).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let model = PhysicsModel::default();
        let json = serde_json::to_string(&model).unwrap();
        let back: PhysicsModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
