use std::f64::consts::PI;

use crate::prelude::{Constellation, SV};

/// Earth angular velocity in WGS84 frame, in rad/s
pub const EARTH_ANGULAR_VEL_WGS84_RAD_S: f64 = 7.2921151467E-5;

/// Earth angular velocity in CGCS2000 (BeiDou) frame, in rad/s
pub const EARTH_ANGULAR_VEL_CGCS2000_RAD_S: f64 = 7.292115E-5;

/// Earth gravitational constant, WGS84 ellipsoid (m³/s²)
pub const EARTH_GRAVITATION_MU_WGS84_M3_S2: f64 = 3.9860050E14;

/// Earth gravitational constant, CGCS2000 and GTRF ellipsoids (m³/s²)
pub const EARTH_GRAVITATION_MU_CGCS2000_M3_S2: f64 = 3.986004418E14;

/// Earth gravitational constant, PZ90 ellipsoid (m³/s²)
pub const EARTH_GRAVITATION_MU_PZ90_M3_S2: f64 = 3.9860044E14;

/// BeiDou GEO orbital frame tilt about the X axis, in radians.
/// Modeling constant (nominal -5° inclination offset of the GEO fleet,
/// in the ICD rotation convention), not derived from the message.
pub const BEIDOU_GEO_TILT_RAD: f64 = 5.0 * PI / 180.0;

/// Earth gravitational constant to apply for this [SV]
pub(crate) const fn gravitation_mu_m3_s2(sv: SV) -> f64 {
    match sv.constellation {
        Constellation::BeiDou | Constellation::Galileo => EARTH_GRAVITATION_MU_CGCS2000_M3_S2,
        Constellation::Glonass => EARTH_GRAVITATION_MU_PZ90_M3_S2,
        _ => EARTH_GRAVITATION_MU_WGS84_M3_S2,
    }
}

/// Earth rotation rate to apply for this [SV]
pub(crate) const fn earth_angular_vel_rad_s(sv: SV) -> f64 {
    match sv.constellation {
        Constellation::BeiDou | Constellation::Glonass => EARTH_ANGULAR_VEL_CGCS2000_RAD_S,
        _ => EARTH_ANGULAR_VEL_WGS84_RAD_S,
    }
}

/// -2√μ/c², relativistic clock correction factor for this [SV]
pub(crate) const fn relativistic_clock_factor(sv: SV) -> f64 {
    match sv.constellation {
        Constellation::BeiDou | Constellation::Galileo => -0.00000000044428073090439775,
        _ => -0.000000000444280763339306,
    }
}
