use thiserror::Error;

use crate::prelude::{Constellation, Epoch, SV};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// [Ephemeris] was queried before its required fields were populated.
    /// Attach the orbital elements first.
    #[error("ephemeris data not loaded")]
    DataNotLoaded,

    /// This [SV] does not belong to the [Constellation] this store manages:
    /// no result will ever be returned for it.
    #[error("invalid request: {0} is not a {1} vehicle")]
    InvalidRequest(SV, Constellation),

    /// No stored frame is authoritative for this [SV] at the requested [Epoch].
    /// The caller decides whether to fall back to another source.
    #[error("no ephemeris found for {0} at {1}")]
    EphemerisNotFound(SV, Epoch),

    /// Kepler solver exceeded its iteration cap without meeting the
    /// convergence criterion. Surfaced as a failure, never accepted as
    /// a converged answer.
    #[error("kepler solver did not converge for {sv}: |dE|={residual:.3e} rad after {iterations} iterations")]
    KeplerNonConvergence {
        sv: SV,
        iterations: usize,
        residual: f64,
    },

    /// [SV] constellation is not tied to a supported [TimeScale]:
    /// cannot express elapsed time since the reference epoch.
    #[error("unknown timescale for {0}")]
    UnknownTimescale(SV),
}
