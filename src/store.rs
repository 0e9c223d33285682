//! Broadcast ephemeris storage and retrieval
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use itertools::Itertools;
use log::debug;

use crate::{
    cfg::SearchPolicy,
    error::Error,
    prelude::{Constellation, Ephemeris, Epoch, SV},
};

/// Per constellation collection of broadcast [Ephemeris] frames, with
/// temporal indexing. The store owns every frame it indexes: snapshots
/// are cloned, never aliased. Loading (add / rationalize / clear) must
/// be serialized by the caller; concurrent [EphemerisStore::find] is
/// fine once loading completed.
#[derive(Debug, Clone)]
pub struct EphemerisStore {
    /// [Constellation] this store manages
    constellation: Constellation,
    /// [SearchPolicy] applied by [EphemerisStore::find]
    policy: SearchPolicy,
    /// ToE indexed frames, per [SV]
    inner: HashMap<SV, BTreeMap<Epoch, Ephemeris>>,
    /// Earliest validity opening, all vehicles
    initial_time: Option<Epoch>,
    /// Latest validity closing, all vehicles
    final_time: Option<Epoch>,
}

impl EphemerisStore {
    /// Allocate a new (empty) store for this [Constellation].
    pub fn new(constellation: Constellation, policy: SearchPolicy) -> Self {
        Self {
            constellation,
            policy,
            inner: HashMap::new(),
            initial_time: None,
            final_time: None,
        }
    }

    /// [Constellation] this store manages
    pub fn constellation(&self) -> Constellation {
        self.constellation
    }

    /// Earliest validity window opening, across all vehicles
    pub fn initial_time(&self) -> Option<Epoch> {
        self.initial_time
    }

    /// Latest validity window closing, across all vehicles
    pub fn final_time(&self) -> Option<Epoch> {
        self.final_time
    }

    /// Total number of stored frames
    pub fn len(&self) -> usize {
        self.inner.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Indexed vehicles, sorted by PRN
    pub fn satellites(&self) -> Vec<SV> {
        self.inner.keys().copied().sorted_by_key(|sv| sv.prn).collect()
    }

    /// Validates and indexes one [Ephemeris] frame, deriving its
    /// validity window first. On two frames sharing one ToE, the most
    /// recently transmitted wins. Returns a reference to the stored
    /// frame, [Error::InvalidRequest] on a constellation mismatch, and
    /// [Error::DataNotLoaded] on an unpopulated frame.
    pub fn add(&mut self, mut ephemeris: Ephemeris) -> Result<&Ephemeris, Error> {
        if ephemeris.sv.constellation != self.constellation {
            return Err(Error::InvalidRequest(ephemeris.sv, self.constellation));
        }

        ephemeris.adjust_validity()?;

        let sv = ephemeris.sv;
        let toe = ephemeris.toe;

        let (inserted, replaced) = {
            let records = self.inner.entry(sv).or_default();
            match records.get(&toe) {
                Some(existing) if ephemeris.transmit_time < existing.transmit_time => {
                    debug!("{}({}) - discarding late re-issue", toe, sv);
                    (false, false)
                },
                Some(_) => {
                    records.insert(toe, ephemeris);
                    (true, true)
                },
                None => {
                    records.insert(toe, ephemeris);
                    (true, false)
                },
            }
        };

        // bounds only account for frames that actually remain stored:
        // discarded re-issues leave them untouched, replacements drop
        // the superseded frame's window and require a rescan
        if replaced {
            self.update_bounds();
        } else if inserted {
            if let (Some(begin), Some(end)) = (ephemeris.begin_valid, ephemeris.end_valid) {
                if self.initial_time.map(|t| begin < t).unwrap_or(true) {
                    self.initial_time = Some(begin);
                }
                if self.final_time.map(|t| end > t).unwrap_or(true) {
                    self.final_time = Some(end);
                }
            }
        }

        Ok(&self.inner[&sv][&toe])
    }

    /// Returns the frame authoritative for this [SV] at instant t,
    /// according to the [SearchPolicy]:
    /// - [SearchPolicy::ValidityWindow]: frame whose window contains t
    ///   (inclusive edges), most recently transmitted on overlap,
    /// - [SearchPolicy::NearestPast]: latest frame valid prior to t.
    ///
    /// [Error::InvalidRequest] when the vehicle does not belong to this
    /// store's constellation, [Error::EphemerisNotFound] when no frame
    /// qualifies.
    pub fn find(&self, sv: SV, t: Epoch) -> Result<&Ephemeris, Error> {
        if sv.constellation != self.constellation {
            return Err(Error::InvalidRequest(sv, self.constellation));
        }

        let records = self
            .inner
            .get(&sv)
            .ok_or(Error::EphemerisNotFound(sv, t))?;

        let found = match self.policy {
            SearchPolicy::ValidityWindow => records
                .values()
                .filter(|eph| eph.is_valid_at(t))
                .max_by_key(|eph| eph.transmit_time),
            SearchPolicy::NearestPast => records
                .values()
                .filter(|eph| matches!(eph.begin_valid, Some(begin) if begin <= t))
                .next_back(),
        };

        found.ok_or(Error::EphemerisNotFound(sv, t))
    }

    /// Post load cleanup pass: per vehicle, drops frames superseded by
    /// an earlier (ToE wise) frame carrying the same issue of data
    /// counters and identical orbital elements - i.e. periodic
    /// re-broadcasts of the same message. Constellations without issue
    /// of data counters are unaffected (elements comparison never
    /// matches twice for genuinely new frames). Idempotent.
    pub fn rationalize(&mut self) {
        for (sv, records) in self.inner.iter_mut() {
            let mut kept = Vec::with_capacity(records.len());
            let before = records.len();

            records.retain(|_, eph| {
                let redundant = kept
                    .iter()
                    .any(|(iodc, iode, keplerian)| {
                        *iodc == eph.iodc && *iode == eph.iode && *keplerian == eph.keplerian
                    });
                if !redundant {
                    kept.push((eph.iodc, eph.iode, eph.keplerian));
                }
                !redundant
            });

            if records.len() != before {
                debug!("{} - dropped {} superseded frame(s)", sv, before - records.len());
            }
        }

        self.inner.retain(|_, records| !records.is_empty());
        self.update_bounds();
    }

    /// Empties the store back to its initial state.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.initial_time = None;
        self.final_time = None;
    }

    /// Drops all frames for this vehicle.
    pub fn remove(&mut self, sv: SV) {
        self.inner.remove(&sv);
        self.update_bounds();
    }

    /// Materializes a cloned snapshot of stored frames, in (PRN, ToE)
    /// order, optionally restricted to one vehicle. The snapshot never
    /// aliases internal storage: later add / clear calls do not
    /// invalidate it.
    pub fn records(&self, filter: Option<SV>) -> Vec<Ephemeris> {
        self.inner
            .iter()
            .filter(|(sv, _)| filter.map(|f| **sv == f).unwrap_or(true))
            .sorted_by_key(|(sv, _)| sv.prn)
            .flat_map(|(_, records)| records.values().copied())
            .collect()
    }

    /// Store-wide bounds, rescanned after removal passes.
    fn update_bounds(&mut self) {
        self.initial_time = self
            .inner
            .values()
            .flat_map(|records| records.values().filter_map(|eph| eph.begin_valid))
            .min();
        self.final_time = self
            .inner
            .values()
            .flat_map(|records| records.values().filter_map(|eph| eph.end_valid))
            .max();
    }
}

impl fmt::Display for EphemerisStore {
    /// Tabular dump of all stored frames, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:X} ephemeris store: {} frame(s) !  SV !     transmit !  ToE !  end valid ! acc ! IODC ! IODE ! health !",
            self.constellation,
            self.len(),
        )?;
        for ephemeris in self.records(None) {
            writeln!(f, "{}", ephemeris)?;
        }
        Ok(())
    }
}
