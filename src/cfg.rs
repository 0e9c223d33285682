#[cfg(feature = "serde")]
use serde::Deserialize;

fn default_max_kepler_iter() -> usize {
    30
}

fn default_kepler_tolerance() -> f64 {
    1.0E-11
}

/// [EphemerisStore] temporal search policy.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum SearchPolicy {
    /// Return the frame whose validity window contains t
    /// (most recently transmitted wins when windows overlap).
    #[default]
    ValidityWindow,
    /// Return the latest frame that became valid prior to t,
    /// even if its window already expired. Useful for post-processing
    /// sparse data sets.
    NearestPast,
}

/// Solver and store tuning. [Config::default] matches
/// broadcast navigation requirements and should rarely need adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Kepler solver iteration cap. Exceeding it without convergence
    /// is reported as [Error::KeplerNonConvergence].
    #[cfg_attr(feature = "serde", serde(default = "default_max_kepler_iter"))]
    pub max_kepler_iter: usize,

    /// Kepler solver convergence criterion, on the eccentric anomaly
    /// increment (radians).
    #[cfg_attr(feature = "serde", serde(default = "default_kepler_tolerance"))]
    pub kepler_tolerance_rad: f64,

    /// [SearchPolicy] applied by [EphemerisStore::find]
    #[cfg_attr(feature = "serde", serde(default))]
    pub search_policy: SearchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_kepler_iter: default_max_kepler_iter(),
            kepler_tolerance_rad: default_kepler_tolerance(),
            search_policy: SearchPolicy::default(),
        }
    }
}
