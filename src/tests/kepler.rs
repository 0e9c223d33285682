use std::f64::consts::PI;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use rstest::*;

use crate::{
    ephemeris::kepler::solve_kepler,
    prelude::{
        Config, Constellation, Duration, Ephemeris, Epoch, Error, ReferenceFrame, Vector3, SV,
    },
    tests::{beidou_geo_ephemeris, beidou_meo_ephemeris, gps_meo_ephemeris, init_logger},
};

#[rstest]
#[case(0.0)]
#[case(0.05)]
#[case(0.1)]
#[case(0.15)]
#[case(0.2)]
fn kepler_solver_converges(#[case] e: f64) {
    let cfg = Config::default();
    let sv = SV::new(Constellation::GPS, 1);

    let mut m = 0.0;
    while m < 2.0 * PI {
        let e_k = solve_kepler(sv, m, e, &cfg)
            .unwrap_or_else(|err| panic!("no convergence for m={} e={}: {}", m, e, err));

        let residual = (m - (e_k - e * e_k.sin())).abs();
        assert!(
            residual < 1.0E-9,
            "kepler equation residual too large for m={} e={}: {:.3e}",
            m,
            e,
            residual
        );
        m += 0.01;
    }
}

#[test]
fn kepler_solver_converges_fuzz() {
    let cfg = Config::default();
    let sv = SV::new(Constellation::BeiDou, 11);
    let mut rng = SmallRng::seed_from_u64(0x67);

    for _ in 0..1000 {
        let e = rng.random_range(0.0..0.2);
        let m = rng.random_range(-2.0 * PI..2.0 * PI);
        let e_k = solve_kepler(sv, m, e, &cfg)
            .unwrap_or_else(|err| panic!("no convergence for m={} e={}: {}", m, e, err));

        let residual = (m - (e_k - e * e_k.sin())).abs();
        assert!(residual < 1.0E-9);
    }
}

#[test]
fn kepler_non_convergence_is_surfaced() {
    // impossible criterion: the cap must be reported
    let cfg = Config {
        kepler_tolerance_rad: 0.0,
        ..Default::default()
    };

    let sv = SV::new(Constellation::GPS, 7);
    let result = solve_kepler(sv, 1.0, 0.1, &cfg);
    assert!(
        matches!(result, Err(Error::KeplerNonConvergence { .. })),
        "iteration cap excess must be distinguishable, got {:?}",
        result
    );
}

#[rstest]
#[case(1, true)]
#[case(5, true)]
#[case(6, false)]
#[case(11, false)]
#[case(58, false)]
#[case(59, true)]
#[case(63, true)]
fn beidou_geo_predicate(#[case] prn: u8, #[case] expected: bool) {
    let t = Epoch::default();
    let eph = Ephemeris::new(SV::new(Constellation::BeiDou, prn), t, t, t);
    assert_eq!(eph.is_geo(), expected);
}

#[test]
fn gps_is_never_geo() {
    let t = Epoch::default();
    let eph = Ephemeris::new(SV::new(Constellation::GPS, 1), t, t, t);
    assert!(!eph.is_geo());
}

#[test]
fn gps_meo_state_sanity() {
    init_logger();

    let cfg = Config::default();
    let eph = gps_meo_ephemeris();
    let t = eph.toe + Duration::from_seconds(300.0);

    let state = eph.resolve_state(t, &cfg).unwrap();

    let r = state.position_m.norm();
    assert!(
        (26.0E6..27.0E6).contains(&r),
        "unrealistic gps orbit radius: {:.3e} m",
        r
    );

    let v = state.velocity_m_s.norm();
    assert!(
        (2.0E3..5.0E3).contains(&v),
        "unrealistic gps ecef velocity: {:.3e} m/s",
        v
    );

    assert!(state.relativistic_correction_s.abs() > 0.0);
    assert!(state.relativistic_correction_s.abs() < 1.0E-7);
    assert!(state.clock_bias_s.abs() < 1.0E-3);
    assert_eq!(state.frame, ReferenceFrame::Wgs84);
}

#[test]
fn gps_meo_reference_state() {
    init_logger();

    let cfg = Config::default();
    let eph = gps_meo_ephemeris();
    let t = eph.toe + Duration::from_seconds(300.0);

    let state = eph.resolve_state(t, &cfg).unwrap();

    // IS-GPS-200 broadcast equations evaluated independently in double
    // precision, for this exact frame at ToE+300s (ToW 388800s)
    let reference = Vector3::new(-15702529.851727, -16758993.660527, -13089381.595533);
    assert!(
        (state.position_m - reference).norm() < 1.0E-3,
        "position diverges from reference by {:.3e} m",
        (state.position_m - reference).norm()
    );

    let reference = Vector3::new(-317.058085928, -1637.544883695, 2566.876592417);
    assert!(
        (state.velocity_m_s - reference).norm() < 1.0E-6,
        "velocity diverges from reference by {:.3e} m/s",
        (state.velocity_m_s - reference).norm()
    );

    assert!((state.relativistic_correction_s - 2.622962012E-8).abs() < 1.0E-14);
    assert!((state.clock_bias_s - 2.10938909E-4).abs() < 1.0E-12);
}

#[test]
fn beidou_geo_state_sanity() {
    init_logger();

    let cfg = Config::default();
    let eph = beidou_geo_ephemeris();
    let t = eph.toe + Duration::from_seconds(600.0);

    let state = eph.resolve_state(t, &cfg).unwrap();

    let r = state.position_m.norm();
    assert!(
        (41.5E6..42.8E6).contains(&r),
        "unrealistic geo orbit radius: {:.3e} m",
        r
    );

    // quasi stationary in earth fixed frame, yet never null
    let v = state.velocity_m_s.norm();
    assert!(v < 1.0E3, "unrealistic geo ecef velocity: {:.3e} m/s", v);
    assert!(v > 0.0, "geo ecef velocity must not degenerate to zero");

    assert_eq!(state.frame, ReferenceFrame::Cgcs2000);
}

#[rstest]
#[case(gps_meo_ephemeris())]
#[case(beidou_meo_ephemeris())]
#[case(beidou_geo_ephemeris())]
fn velocity_matches_numerical_differentiation(#[case] eph: Ephemeris) {
    init_logger();

    let cfg = Config::default();
    let h = 0.5;

    for dt_s in [60.0, 900.0, 1800.0] {
        let t = eph.toe + Duration::from_seconds(dt_s);

        let state = eph.resolve_state(t, &cfg).unwrap();

        let p_minus = eph
            .resolve_state(t - Duration::from_seconds(h), &cfg)
            .unwrap()
            .position_m;

        let p_plus = eph
            .resolve_state(t + Duration::from_seconds(h), &cfg)
            .unwrap()
            .position_m;

        let numerical = (p_plus - p_minus) / (2.0 * h);
        let err = (numerical - state.velocity_m_s).norm();

        assert!(
            err < 1.0E-3,
            "{} toe+{}s: analytical velocity diverges from numerical differentiation by {:.3e} m/s",
            eph.sv,
            dt_s,
            err
        );
    }
}

#[test]
fn clock_correction_polynomial() {
    let eph = gps_meo_ephemeris();
    let t = eph.toc + Duration::from_seconds(600.0);

    let (bias, drift) = eph.clock_correction(t).unwrap();
    let expected = eph.clock.bias_s + eph.clock.drift_s_s * 600.0;

    assert!((bias - expected).abs() < 1.0E-15);
    assert!((drift - eph.clock.drift_s_s).abs() < 1.0E-20);
}

#[test]
fn unpopulated_frame_is_rejected() {
    let cfg = Config::default();
    let t = Epoch::default();
    let mut eph = Ephemeris::new(SV::new(Constellation::GPS, 1), t, t, t);

    assert_eq!(eph.resolve_state(t, &cfg), Err(Error::DataNotLoaded));
    assert_eq!(eph.is_healthy(), Err(Error::DataNotLoaded));
    assert_eq!(eph.adjust_validity(), Err(Error::DataNotLoaded));
    assert!(!eph.data_loaded());
}
