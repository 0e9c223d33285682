use nalgebra::Vector3;

use crate::prelude::{Constellation, SV};

/// Earth-centered, earth-fixed frame an [OrbitState] is expressed in.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ReferenceFrame {
    /// WGS84 (GPS and others). Galileo's GTRF is a distinct ITRS
    /// realization that agrees with WGS84 at the centimeter level,
    /// below broadcast accuracy: GTRF states share this tag, while the
    /// propagation itself uses the GTRF gravitational constant.
    #[default]
    Wgs84,
    /// CGCS2000 (BeiDou)
    Cgcs2000,
    /// PZ90 (Glonass)
    Pz90,
}

impl ReferenceFrame {
    pub(crate) fn of(sv: SV) -> Self {
        match sv.constellation {
            Constellation::BeiDou => Self::Cgcs2000,
            Constellation::Glonass => Self::Pz90,
            _ => Self::Wgs84,
        }
    }
}

/// Satellite kinematic and clock state, resolved from one [Ephemeris]
/// frame at one instant. Has no persistent identity: recomputed per query.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitState {
    /// ECEF position, in meters
    pub position_m: Vector3<f64>,
    /// ECEF velocity, in m/s
    pub velocity_m_s: Vector3<f64>,
    /// Onboard clock bias, in seconds
    pub clock_bias_s: f64,
    /// Onboard clock drift, in s/s
    pub clock_drift_s_s: f64,
    /// Relativistic clock correction, in seconds.
    /// Not folded into [OrbitState::clock_bias_s]: applying it is the
    /// caller's modeling decision.
    pub relativistic_correction_s: f64,
    /// [ReferenceFrame] the state is expressed in
    pub frame: ReferenceFrame,
}
