//! Bounded per-event records of the struct-layout ntuple.
//!
//! The ntuple stores every collection as a counter plus parallel arrays of
//! fixed capacity. Records here keep only the first `count` elements; a count
//! above the capacity (or above what the file's arrays hold) is an error,
//! never a silent truncation.

use emtf_core::{Error, Result};
use emtf_root::RecordColumn;

/// Generator muons per event.
pub const MAX_MUONS: usize = 2;
/// EMTF hits per event.
pub const MAX_HITS: usize = 24;
/// EMTF tracks per event.
pub const MAX_TRACKS: usize = 4;
/// Hit slots per track (one per station).
pub const HITS_PER_TRACK: usize = 4;

/// Generator-level muon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenMuon {
    pub pt: f64,
    pub eta: f64,
    pub theta: f64,
    pub phi: f64,
    pub charge: i32,
}

/// EMTF hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub eta: f64,
    pub theta: f64,
    pub phi: f64,
    /// Negative for unused slots.
    pub station: i32,
    pub sector: i32,
    pub endcap: i32,
}

/// One station slot of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackHit {
    /// Negative when the slot is empty.
    pub station: i32,
    pub eta: f64,
    pub phi: f64,
}

/// EMTF track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub pt: f64,
    pub eta: f64,
    pub theta: f64,
    pub phi: f64,
    /// Negative for unused slots.
    pub sector: i32,
    pub mode: i32,
    pub endcap: i32,
    pub charge: i32,
    /// All [`HITS_PER_TRACK`] slots, empty ones included.
    pub hits: Vec<TrackHit>,
}

/// Whether two pseudorapidities lie in the same endcap.
pub fn same_endcap(eta: f64, reference_eta: f64) -> bool {
    (eta > 0.0) == (reference_eta > 0.0)
}

/// One event of the struct layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    index: u64,
    muons: Vec<GenMuon>,
    hits: Vec<Hit>,
    tracks: Vec<Track>,
}

fn check_capacity(kind: &str, count: usize, capacity: usize) -> Result<()> {
    if count > capacity {
        return Err(Error::CapacityExceeded { kind: kind.to_string(), count, capacity });
    }
    Ok(())
}

impl Event {
    /// Build an event, enforcing every capacity.
    pub fn new(index: u64, muons: Vec<GenMuon>, hits: Vec<Hit>, tracks: Vec<Track>) -> Result<Self> {
        check_capacity("muon", muons.len(), MAX_MUONS)?;
        check_capacity("hit", hits.len(), MAX_HITS)?;
        check_capacity("track", tracks.len(), MAX_TRACKS)?;
        for t in &tracks {
            check_capacity("track hit", t.hits.len(), HITS_PER_TRACK)?;
        }
        Ok(Self { index, muons, hits, tracks })
    }

    /// Position in the source.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub(crate) fn reindexed(mut self, index: u64) -> Self {
        self.index = index;
        self
    }

    pub fn muons(&self) -> &[GenMuon] {
        &self.muons
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Decode one event from the three leaf-list branches, each given as a
    /// decoded column and the event's row inside it.
    pub fn from_records(
        index: u64,
        muon: (&RecordColumn, usize),
        hit: (&RecordColumn, usize),
        track: (&RecordColumn, usize),
    ) -> Result<Self> {
        let m = Fields::new(muon, "nMuons", "muon", MAX_MUONS)?;
        let muons = (0..m.count)
            .map(|i| {
                Ok(GenMuon {
                    pt: m.get("pt", i)?,
                    eta: m.get("eta", i)?,
                    theta: m.get("theta", i)?,
                    phi: m.get("phi", i)?,
                    charge: m.get("charge", i)? as i32,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let h = Fields::new(hit, "nHits", "hit", MAX_HITS)?;
        let hits = (0..h.count)
            .map(|i| {
                Ok(Hit {
                    eta: h.get("eta", i)?,
                    theta: h.get("theta", i)?,
                    phi: h.get("phi", i)?,
                    station: h.get("station", i)? as i32,
                    sector: h.get("sector", i)? as i32,
                    endcap: h.get("endcap", i)? as i32,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let t = Fields::new(track, "nTracks", "track", MAX_TRACKS)?;
        let tracks = (0..t.count)
            .map(|i| {
                let hits = (HITS_PER_TRACK * i..HITS_PER_TRACK * (i + 1))
                    .map(|slot| {
                        Ok(TrackHit {
                            station: t.get("hit_station", slot)? as i32,
                            eta: t.get("hit_eta", slot)?,
                            phi: t.get("hit_phi", slot)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Track {
                    pt: t.get("pt", i)?,
                    eta: t.get("eta", i)?,
                    theta: t.get("theta", i)?,
                    phi: t.get("phi", i)?,
                    sector: t.get("sector", i)? as i32,
                    mode: t.get("mode", i)? as i32,
                    endcap: t.get("endcap", i)? as i32,
                    charge: t.get("charge", i)? as i32,
                    hits,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(index, muons, hits, tracks)
    }
}

/// Bounds-checked access to one record of a leaf-list branch.
struct Fields<'a> {
    column: &'a RecordColumn,
    entry: usize,
    kind: &'static str,
    count: usize,
}

impl<'a> Fields<'a> {
    fn new(
        (column, entry): (&'a RecordColumn, usize),
        counter: &str,
        kind: &'static str,
        capacity: usize,
    ) -> Result<Self> {
        let raw = column.scalar(entry, counter)?;
        if !raw.is_finite() || raw < 0.0 {
            return Err(Error::Validation(format!("{kind}: invalid {counter} = {raw} in entry {entry}")));
        }
        let count = raw as usize;
        check_capacity(kind, count, capacity)?;
        Ok(Self { column, entry, kind, count })
    }

    fn get(&self, field: &str, i: usize) -> Result<f64> {
        let values = self.column.values(self.entry, field)?;
        values.get(i).copied().ok_or_else(|| Error::CapacityExceeded {
            kind: format!("{}.{field}", self.kind),
            count: i + 1,
            capacity: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(hits: usize) -> Track {
        Track {
            pt: 10.0,
            eta: 1.5,
            theta: 25.0,
            phi: 0.1,
            sector: 2,
            mode: 15,
            endcap: 1,
            charge: -1,
            hits: vec![TrackHit { station: 1, eta: 1.5, phi: 0.1 }; hits],
        }
    }

    #[test]
    fn capacities_are_enforced() {
        let mu = GenMuon { pt: 5.0, eta: 1.8, theta: 18.0, phi: 0.3, charge: 1 };
        assert!(Event::new(0, vec![mu; 2], vec![], vec![track(4)]).is_ok());
        assert!(matches!(
            Event::new(0, vec![mu; 3], vec![], vec![]),
            Err(Error::CapacityExceeded { count: 3, capacity: 2, .. })
        ));
        assert!(matches!(
            Event::new(0, vec![], vec![], vec![track(4); 5]),
            Err(Error::CapacityExceeded { capacity: MAX_TRACKS, .. })
        ));
        assert!(matches!(
            Event::new(0, vec![], vec![], vec![track(5)]),
            Err(Error::CapacityExceeded { capacity: HITS_PER_TRACK, .. })
        ));
    }

    #[test]
    fn endcap_by_eta_sign() {
        assert!(same_endcap(1.3, 2.1));
        assert!(same_endcap(-1.3, -2.1));
        assert!(!same_endcap(-1.3, 2.1));
        // zero counts with the negative endcap
        assert!(same_endcap(0.0, -1.0));
    }
}
