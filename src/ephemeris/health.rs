use crate::{error::Error, prelude::Ephemeris};

impl Ephemeris {
    /// Interprets the broadcast health code. A null code means healthy
    /// for all supported legacy messages (GPS LNAV, BeiDou D1/D2,
    /// Galileo I/NAV marginal bits folded upstream by the decoder).
    /// Fails with [Error::DataNotLoaded] on an unpopulated frame.
    pub fn is_healthy(&self) -> Result<bool, Error> {
        self.ensure_loaded()?;
        Ok(self.health == 0)
    }
}
