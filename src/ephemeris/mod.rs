//! Broadcast ephemeris frame
use std::fmt;

use crate::{
    error::Error,
    prelude::{Constellation, Duration, Epoch, TimeScale, SV},
};

mod health;
mod validity;

pub(crate) mod kepler;

/// Keplerian orbital elements at the reference epoch (ToE).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Keplerian {
    /// Semi-major axis (in meters)
    pub a_m: f64,

    /// Semi-major axis rate (m/s), null in legacy messages
    pub a_dot_m_s: f64,

    /// Eccentricity
    pub e: f64,

    /// Inclination at reference epoch (in radians)
    pub i0_rad: f64,

    /// Inclination rate (in radians/s)
    pub i_dot_rad_s: f64,

    /// Longitude of ascending node at reference epoch (in radians)
    pub omega0_rad: f64,

    /// Right ascension rate (in radians/s)
    pub omega_dot_rad_s: f64,

    /// Argument of perigee (in radians)
    pub omega_rad: f64,

    /// Mean anomaly at reference epoch (in radians)
    pub m0_rad: f64,

    /// Mean motion correction (in radians/s)
    pub dn_rad_s: f64,

    /// Mean motion correction rate (radians/s²), null in legacy messages
    pub dn_dot_rad_s2: f64,
}

/// Second harmonic orbit perturbation coefficients.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Perturbations {
    /// Argument of latitude Sine / Cosine corrections (in radians)
    pub cus_cuc_rad: (f64, f64),

    /// Inclination Sine / Cosine corrections (in radians)
    pub cis_cic_rad: (f64, f64),

    /// Orbital radius Sine / Cosine corrections (in meters)
    pub crs_crc_m: (f64, f64),
}

/// Onboard clock polynomial and group delays.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClockModel {
    /// Clock bias (in seconds)
    pub bias_s: f64,

    /// Clock drift (in s/s)
    pub drift_s_s: f64,

    /// Clock drift rate (in s/s²)
    pub drift_rate_s_s2: f64,

    /// Total group delays (in seconds). Single delay constellations
    /// leave the second term null; BeiDou carries (B1/B3, B2/B3).
    pub tgd_s: (f64, f64),
}

/// One broadcast navigation message's worth of orbital and clock
/// parameters, for one [SV]. Immutable once stored: the [EphemerisStore]
/// derives and owns the validity window.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Ephemeris {
    /// [SV]
    pub sv: SV,

    /// Time of Issue of [Ephemeris], expressed in the correct timescale
    pub toe: Epoch,

    /// Time of Clock, expressed in the correct timescale
    pub toc: Epoch,

    /// First transmission time
    pub transmit_time: Epoch,

    /// Issue of Data (clock)
    pub iodc: u16,

    /// Issue of Data (ephemeris)
    pub iode: u16,

    /// Constellation specific health code
    pub health: u16,

    /// User Range Accuracy index
    pub ura_index: u8,

    /// Declared fit interval, when the message carries one
    pub fit_interval: Option<Duration>,

    /// [Keplerian] elements
    pub keplerian: Keplerian,

    /// [Perturbations] coefficients
    pub perturbations: Perturbations,

    /// [ClockModel]
    pub clock: ClockModel,

    /// Derived validity window opening, set by [Ephemeris::adjust_validity]
    pub(crate) begin_valid: Option<Epoch>,

    /// Derived validity window closing, set by [Ephemeris::adjust_validity]
    pub(crate) end_valid: Option<Epoch>,

    pub(crate) data_loaded: bool,
}

impl Ephemeris {
    /// Define a new [Ephemeris] from its identity. Orbital elements and
    /// clock terms are attached with the `with_` builders; the frame
    /// remains unusable ([Error::DataNotLoaded]) until the [Keplerian]
    /// elements are loaded.
    pub fn new(sv: SV, toe: Epoch, toc: Epoch, transmit_time: Epoch) -> Self {
        Self {
            sv,
            toe,
            toc,
            transmit_time,
            ..Default::default()
        }
    }

    /// Attach [Keplerian] elements, making this frame usable.
    pub fn with_keplerian(mut self, keplerian: Keplerian) -> Self {
        self.keplerian = keplerian;
        self.data_loaded = true;
        self
    }

    /// Attach [Perturbations] coefficients
    pub fn with_perturbations(mut self, perturbations: Perturbations) -> Self {
        self.perturbations = perturbations;
        self
    }

    /// Attach the [ClockModel]
    pub fn with_clock(mut self, clock: ClockModel) -> Self {
        self.clock = clock;
        self
    }

    /// Attach issue of data counters (IODC, IODE)
    pub fn with_issue_of_data(mut self, iodc: u16, iode: u16) -> Self {
        self.iodc = iodc;
        self.iode = iode;
        self
    }

    /// Attach the health code
    pub fn with_health(mut self, health: u16) -> Self {
        self.health = health;
        self
    }

    /// Attach the User Range Accuracy index
    pub fn with_ura_index(mut self, ura_index: u8) -> Self {
        self.ura_index = ura_index;
        self
    }

    /// Attach a declared fit interval, which takes precedence over the
    /// nominal per constellation validity duration.
    pub fn with_fit_interval(mut self, fit_interval: Duration) -> Self {
        self.fit_interval = Some(fit_interval);
        self
    }

    /// True once the required orbital elements have been populated.
    pub fn data_loaded(&self) -> bool {
        self.data_loaded
    }

    pub(crate) fn ensure_loaded(&self) -> Result<(), Error> {
        if self.data_loaded {
            Ok(())
        } else {
            Err(Error::DataNotLoaded)
        }
    }

    /// Validity window opening, once derived by [Ephemeris::adjust_validity]
    pub fn begin_valid(&self) -> Option<Epoch> {
        self.begin_valid
    }

    /// Validity window closing, once derived by [Ephemeris::adjust_validity]
    pub fn end_valid(&self) -> Option<Epoch> {
        self.end_valid
    }

    /// True if t falls within the derived validity window
    /// (inclusive on both edges). Always false prior to
    /// [Ephemeris::adjust_validity].
    pub fn is_valid_at(&self, t: Epoch) -> bool {
        match (self.begin_valid, self.end_valid) {
            (Some(begin), Some(end)) => t >= begin && t <= end,
            _ => false,
        }
    }

    /// True if this frame describes a BeiDou GEO vehicle (PRN 1-5 per
    /// BDS-2, 59-63 per BDS-3), which requires the dedicated coordinates
    /// transform. All other vehicles (MEO, IGSO, any constellation)
    /// follow the standard transform.
    pub fn is_geo(&self) -> bool {
        self.sv.constellation == Constellation::BeiDou
            && (self.sv.prn <= 5 || (59..=63).contains(&self.sv.prn))
    }

    /// User Range Accuracy (in meters), from the broadcast index.
    pub fn accuracy_m(&self) -> f64 {
        const URA_M: [f64; 16] = [
            2.4, 3.4, 4.85, 6.85, 9.65, 13.65, 24.0, 48.0, 96.0, 192.0, 384.0, 768.0, 1536.0,
            3072.0, 6144.0, 6144.0,
        ];
        URA_M[(self.ura_index as usize).min(15)]
    }

    /// Onboard clock (bias, drift) at instant t, in (s, s/s),
    /// from the broadcast polynomial referenced to ToC.
    pub fn clock_correction(&self, t: Epoch) -> Result<(f64, f64), Error> {
        self.ensure_loaded()?;
        let timescale = self.timescale()?;
        let dt_s = (t.to_time_scale(timescale) - self.toc).to_seconds();
        let (a0, a1, a2) = (
            self.clock.bias_s,
            self.clock.drift_s_s,
            self.clock.drift_rate_s_s2,
        );
        let bias = a0 + a1 * dt_s + a2 * dt_s.powi(2);
        let drift = a1 + 2.0 * a2 * dt_s;
        Ok((bias, drift))
    }

    /// [TimeScale] this frame's epochs are expressed in
    pub(crate) fn timescale(&self) -> Result<TimeScale, Error> {
        self.sv
            .constellation
            .timescale()
            .ok_or(Error::UnknownTimescale(self.sv))
    }

    /// Returns ToE in seconds of week
    pub(crate) fn weekly_toe_seconds(&self) -> f64 {
        (self.toe.to_time_of_week().1 as f64) / 1.0E9
    }
}

impl fmt::Display for Ephemeris {
    /// Terse single line dump: vehicle, transmission/reference/expiration
    /// times, accuracy, issue numbers and health.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ! {} ! {} ! ", self.sv, self.transmit_time, self.toe)?;
        match self.end_valid {
            Some(end) => write!(f, "{} !", end)?,
            None => write!(f, "???? !")?,
        }
        write!(
            f,
            "{:6.2} !{:4} !{:4} !{:6} !",
            self.accuracy_m(),
            self.iodc,
            self.iode,
            self.health
        )
    }
}
