use crate::{
    error::Error,
    prelude::{Constellation, Duration, Ephemeris},
};

impl Ephemeris {
    /// Nominal validity duration for one broadcast frame of this
    /// [Constellation], counted from ToE. These are operational
    /// heuristics, not protocol guarantees: in particular the BeiDou
    /// ICD mentions a fit interval but leaves it undefined, and one
    /// hour matches the observed transmission period. Frames that
    /// declare a fit interval bypass this table entirely.
    pub fn nominal_validity_duration(constellation: Constellation) -> Duration {
        match constellation {
            Constellation::BeiDou => Duration::from_seconds(3600.0),
            Constellation::GPS | Constellation::QZSS => Duration::from_seconds(7200.0),
            Constellation::Galileo => Duration::from_seconds(10800.0),
            Constellation::Glonass => Duration::from_seconds(1800.0),
            constellation => {
                if constellation.is_sbas() {
                    // GEO payloads typically publish one frame per day
                    Duration::from_days(1.0)
                } else {
                    Duration::from_seconds(7200.0)
                }
            },
        }
    }

    /// Derives the {begin_valid, end_valid} window during which this
    /// frame is authoritative:
    /// - the window opens at ToE, or at the transmission time when the
    ///   elements were updated during the broadcast period (data should
    ///   not be used prior to transmission),
    /// - it closes one declared fit interval (or one nominal validity
    ///   duration) past ToE.
    pub fn adjust_validity(&mut self) -> Result<(), Error> {
        self.ensure_loaded()?;

        let mut begin = self.toe;
        if self.transmit_time > begin {
            begin = self.transmit_time;
        }

        let duration = self
            .fit_interval
            .unwrap_or_else(|| Self::nominal_validity_duration(self.sv.constellation));

        self.begin_valid = Some(begin);
        self.end_valid = Some(self.toe + duration);
        Ok(())
    }
}
