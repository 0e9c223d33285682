//! Kepler + second harmonic perturbation orbit propagation
use log::{debug, error};
use nalgebra::{Matrix3, Rotation3, SMatrix, Vector3, Vector4};

use crate::{
    cfg::Config,
    constants,
    error::Error,
    orbit::{OrbitState, ReferenceFrame},
    prelude::{Ephemeris, Epoch, SV},
};

/// Solves Kepler's equation for the eccentric anomaly (radians), by
/// Newton iteration seeded with E = M + e·sin(M). Exceeding the
/// configured iteration cap without meeting the convergence criterion
/// is a hard failure, never accepted as a converged answer.
pub(crate) fn solve_kepler(sv: SV, m_rad: f64, e: f64, cfg: &Config) -> Result<f64, Error> {
    let mut e_k = m_rad + e * m_rad.sin();
    let mut delta = m_rad - (e_k - e * e_k.sin());

    for _ in 0..cfg.max_kepler_iter {
        delta = (m_rad - e_k + e * e_k.sin()) / (1.0 - e * e_k.cos());
        e_k += delta;
        if delta.abs() < cfg.kepler_tolerance_rad {
            return Ok(e_k);
        }
    }

    error!(
        "{} - kepler solver did not converge (|dE|={:.3e})",
        sv,
        delta.abs()
    );

    Err(Error::KeplerNonConvergence {
        sv,
        iterations: cfg.max_kepler_iter,
        residual: delta.abs(),
    })
}

/// Intermediate terms of one propagation, shared by both
/// coordinates transform variants.
struct Helper {
    /// Elapsed time since ToE (s)
    t_k: f64,
    /// Corrected argument of latitude (rad)
    u_k: f64,
    /// Corrected radius (m)
    r_k: f64,
    /// Corrected inclination (rad)
    i_k: f64,
    /// Ascending node longitude (rad)
    omega_k: f64,
    /// First derivative of [Helper::u_k]
    fd_u_k: f64,
    /// First derivative of [Helper::r_k]
    fd_r_k: f64,
    /// First derivative of [Helper::i_k]
    fd_i_k: f64,
    /// First derivative of [Helper::omega_k]
    fd_omega_k: f64,
    /// Relativistic clock correction (s)
    dtr: f64,
    /// Earth rotation rate (rad/s)
    earth_rate: f64,
}

impl Helper {
    /// Position in the orbital plane (m)
    fn orbital_position(&self) -> (f64, f64) {
        (self.r_k * self.u_k.cos(), self.r_k * self.u_k.sin())
    }

    /// ẋ and ẏ temporal derivatives in the orbital plane (m/s)
    fn orbital_velocity(&self) -> (f64, f64) {
        let (sin_u_k, cos_u_k) = self.u_k.sin_cos();
        let fd_x = self.fd_r_k * cos_u_k - self.r_k * self.fd_u_k * sin_u_k;
        let fd_y = self.fd_r_k * sin_u_k + self.r_k * self.fd_u_k * cos_u_k;
        (fd_x, fd_y)
    }

    /// In-plane position rotated by ascending node and inclination.
    /// Directly earth fixed for the standard variant, whose node
    /// longitude absorbs earth rotation. Intermediate inertial-like
    /// vector for the GEO variant.
    fn node_rotated_position(&self) -> Vector3<f64> {
        let (x, y) = self.orbital_position();
        let rot_x = Rotation3::from_axis_angle(&Vector3::x_axis(), self.i_k);
        let rot_z = Rotation3::from_axis_angle(&Vector3::z_axis(), self.omega_k);
        rot_z * rot_x * Vector3::new(x, y, 0.0)
    }

    /// Analytical differentiation of [Helper::node_rotated_position]
    fn node_rotated_velocity(&self) -> Vector3<f64> {
        let (x, y) = self.orbital_position();
        let (fd_x, fd_y) = self.orbital_velocity();
        let (sin_omega_k, cos_omega_k) = self.omega_k.sin_cos();
        let (sin_i_k, cos_i_k) = self.i_k.sin_cos();

        // First derivative of the rotation, against
        // (ẋ, ẏ, node rate, inclination rate)
        let mut fd_r = SMatrix::<f64, 3, 4>::zeros();
        fd_r[(0, 0)] = cos_omega_k;
        fd_r[(0, 1)] = -sin_omega_k * cos_i_k;
        fd_r[(0, 2)] = -(x * sin_omega_k + y * cos_omega_k * cos_i_k);
        fd_r[(0, 3)] = y * sin_omega_k * sin_i_k;
        fd_r[(1, 0)] = sin_omega_k;
        fd_r[(1, 1)] = cos_omega_k * cos_i_k;
        fd_r[(1, 2)] = x * cos_omega_k - y * sin_omega_k * cos_i_k;
        fd_r[(1, 3)] = -y * cos_omega_k * sin_i_k;
        fd_r[(2, 1)] = sin_i_k;
        fd_r[(2, 3)] = y * cos_i_k;

        fd_r * Vector4::new(fd_x, fd_y, self.fd_omega_k, self.fd_i_k)
    }

    /// (earth rotation, frame tilt) [Rotation3] pair completing the
    /// GEO transform, in counterclockwise convention.
    fn geo_rotations(&self) -> (Rotation3<f64>, Rotation3<f64>) {
        let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), constants::BEIDOU_GEO_TILT_RAD);
        let spin =
            Rotation3::from_axis_angle(&Vector3::z_axis(), -self.earth_rate * self.t_k);
        (spin, tilt)
    }

    /// ECEF position (m), BeiDou GEO vehicles specifically
    fn beidou_geo_position(&self) -> Vector3<f64> {
        let (spin, tilt) = self.geo_rotations();
        spin * (tilt * self.node_rotated_position())
    }

    /// ECEF velocity (m/s), BeiDou GEO vehicles specifically:
    /// v = Ṙz·Rx·p + Rz·Rx·ṗ, with the node rotated vector and its
    /// analytical derivative.
    fn beidou_geo_velocity(&self) -> Vector3<f64> {
        let (spin, tilt) = self.geo_rotations();

        let theta = -self.earth_rate * self.t_k;
        let (sin_theta, cos_theta) = theta.sin_cos();

        // Ṙz, with θ̇ = -ωe
        let fd_spin = -self.earth_rate
            * Matrix3::new(
                -sin_theta, -cos_theta, 0.0, //
                cos_theta, -sin_theta, 0.0, //
                0.0, 0.0, 0.0,
            );

        let p_gk = self.node_rotated_position();
        let fd_p_gk = self.node_rotated_velocity();

        fd_spin * (tilt * p_gk) + spin * (tilt * fd_p_gk)
    }
}

impl Ephemeris {
    /// Solves the in-plane Kepler problem at instant t and forms all
    /// intermediate terms both transform variants build on.
    fn helper(&self, t: Epoch, cfg: &Config) -> Result<Helper, Error> {
        let sv = self.sv;

        let mu = constants::gravitation_mu_m3_s2(sv);
        let earth_rate = constants::earth_angular_vel_rad_s(sv);
        let dtr_f = constants::relativistic_clock_factor(sv);

        let timescale = self.timescale()?;
        let t_k = (t.to_time_scale(timescale) - self.toe).to_seconds();

        let kepler = &self.keplerian;
        let e = kepler.e;
        let (cus, cuc) = self.perturbations.cus_cuc_rad;
        let (cis, cic) = self.perturbations.cis_cic_rad;
        let (crs, crc) = self.perturbations.crs_crc_m;

        let a_k = kepler.a_m + kepler.a_dot_m_s * t_k;

        // mean motion: the equation specifies A0, not Ak
        let n0 = (mu / kepler.a_m.powi(3)).sqrt();
        let n = n0 + kepler.dn_rad_s + 0.5 * kepler.dn_dot_rad_s2 * t_k;
        let m_k = kepler.m0_rad + n * t_k;

        let e_k = solve_kepler(sv, m_k, e, cfg)?;
        let (sin_e_k, cos_e_k) = e_k.sin_cos();

        // true anomaly, quadrant safe
        let v_k = ((1.0 - e.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - e);

        // argument of latitude, second harmonic corrections evaluated
        // at twice the uncorrected argument
        let phi_k = v_k + kepler.omega_rad;
        let (sin_2phi_k, cos_2phi_k) = (2.0 * phi_k).sin_cos();

        let du_k = cus * sin_2phi_k + cuc * cos_2phi_k;
        let dr_k = crs * sin_2phi_k + crc * cos_2phi_k;
        let di_k = cis * sin_2phi_k + cic * cos_2phi_k;

        let u_k = phi_k + du_k;
        let r_k = a_k * (1.0 - e * cos_e_k) + dr_k;
        let i_k = kepler.i0_rad + kepler.i_dot_rad_s * t_k + di_k;

        let is_geo = self.is_geo();
        let toe_sow = self.weekly_toe_seconds();

        // Ascending node longitude. The GEO variant keeps an
        // inertial-like node: earth rotation enters through the final
        // Rz rotation instead.
        let omega_k = if is_geo {
            kepler.omega0_rad + kepler.omega_dot_rad_s * t_k - earth_rate * toe_sow
        } else {
            kepler.omega0_rad + (kepler.omega_dot_rad_s - earth_rate) * t_k - earth_rate * toe_sow
        };

        // first derivatives, for the analytical velocity
        let fd_e_k = n / (1.0 - e * cos_e_k);
        let fd_phi_k = (1.0 - e.powi(2)).sqrt() * fd_e_k / (1.0 - e * cos_e_k);

        let fd_u_k = fd_phi_k + 2.0 * (cus * cos_2phi_k - cuc * sin_2phi_k) * fd_phi_k;
        let fd_r_k =
            a_k * e * sin_e_k * fd_e_k + 2.0 * (crs * cos_2phi_k - crc * sin_2phi_k) * fd_phi_k;
        let fd_i_k =
            kepler.i_dot_rad_s + 2.0 * (cis * cos_2phi_k - cic * sin_2phi_k) * fd_phi_k;

        let fd_omega_k = if is_geo {
            kepler.omega_dot_rad_s
        } else {
            kepler.omega_dot_rad_s - earth_rate
        };

        // relativistic clock correction
        let dtr = dtr_f * e * a_k.sqrt() * sin_e_k;

        debug!(
            "{}({}) - kepler solved: e_k={:.9} u_k={:.9} r_k={:.3} i_k={:.9} omega_k={:.9} t_k={:.3}",
            t, sv, e_k, u_k, r_k, i_k, omega_k, t_k,
        );

        Ok(Helper {
            t_k,
            u_k,
            r_k,
            i_k,
            omega_k,
            fd_u_k,
            fd_r_k,
            fd_i_k,
            fd_omega_k,
            dtr,
            earth_rate,
        })
    }

    /// Resolves this frame to the [SV] [OrbitState] at instant t.
    /// Pure function of (self, t): no shared state, safe to invoke
    /// concurrently on stored frames.
    pub fn resolve_state(&self, t: Epoch, cfg: &Config) -> Result<OrbitState, Error> {
        self.ensure_loaded()?;

        let helper = self.helper(t, cfg)?;

        let (position_m, velocity_m_s) = if self.is_geo() {
            (helper.beidou_geo_position(), helper.beidou_geo_velocity())
        } else {
            (
                helper.node_rotated_position(),
                helper.node_rotated_velocity(),
            )
        };

        let (clock_bias_s, clock_drift_s_s) = self.clock_correction(t)?;

        Ok(OrbitState {
            position_m,
            velocity_m_s,
            clock_bias_s,
            clock_drift_s_s,
            relativistic_correction_s: helper.dtr,
            frame: ReferenceFrame::of(self.sv),
        })
    }
}
