#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod cfg;
mod constants;
mod ephemeris;
mod error;
mod orbit;
mod store;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::{Config, SearchPolicy};
    pub use crate::ephemeris::{ClockModel, Ephemeris, Keplerian, Perturbations};
    pub use crate::error::Error;
    pub use crate::orbit::{OrbitState, ReferenceFrame};
    pub use crate::store::EphemerisStore;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
