//! Text dumpers for both ntuple layouts.

use std::io::Write;

use emtf_core::{DumpConfig, Result};
use tracing::debug;

use crate::reco::RecoEvent;
use crate::records::{Event, same_endcap};
use crate::source::EventSource;

/// What a dump visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpSummary {
    /// Events read and printed.
    pub visited: u64,
    /// Events in the source.
    pub available: u64,
}

/// Event-loop printer with a hard cap on the event index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dumper {
    last_event: u64,
    print_every: u64,
}

impl Default for Dumper {
    fn default() -> Self {
        Self::new()
    }
}

impl Dumper {
    /// Cap at event 10, banner for every event.
    pub fn new() -> Self {
        Self { last_event: 10, print_every: 1 }
    }

    /// Settings from the analysis config.
    pub fn from_config(config: &DumpConfig) -> Self {
        Self::new().last_event(config.last_event).print_every(config.print_every)
    }

    /// Highest event index (struct layout) or label (flat layout) printed.
    pub fn last_event(mut self, last: u64) -> Self {
        self.last_event = last;
        self
    }

    /// Banner cadence; zero is treated as one.
    pub fn print_every(mut self, n: u64) -> Self {
        self.print_every = n.max(1);
        self
    }

    /// Dump struct-layout events `0..=last_event`.
    pub fn dump<S, W>(&self, source: &S, out: &mut W) -> Result<DumpSummary>
    where
        S: EventSource<Event = Event>,
        W: Write + ?Sized,
    {
        let available = source.n_events();
        let mut visited = 0;
        writeln!(out, "\n******* About to enter the event loop *******")?;
        for i in 0..available {
            if i > self.last_event {
                break;
            }
            if i % self.print_every == 0 {
                banner(out, i)?;
            }
            let event = source.event(i)?;
            write_event(out, &event)?;
            visited += 1;
        }
        writeln!(out, "\n******* Leaving the event loop *******")?;
        debug!(visited, available, "event loop done");
        Ok(DumpSummary { visited, available })
    }

    /// Dump flat-layout events. Events are labelled from 1 and the loop stops
    /// once the label passes `last_event`.
    pub fn dump_reco<S, W>(&self, source: &S, out: &mut W) -> Result<DumpSummary>
    where
        S: EventSource<Event = RecoEvent>,
        W: Write + ?Sized,
    {
        let available = source.n_events();
        let mut visited = 0;
        writeln!(out, "\n******* About to enter the event loop *******")?;
        for i in 0..available {
            let label = i + 1;
            if label > self.last_event {
                break;
            }
            if label % self.print_every == 0 {
                banner(out, label)?;
            }
            let event = source.event(i)?;
            write_reco_event(out, &event)?;
            visited += 1;
        }
        writeln!(out, "\n******* Leaving the event loop *******")?;
        debug!(visited, available, "reco event loop done");
        Ok(DumpSummary { visited, available })
    }
}

fn banner<W: Write + ?Sized>(out: &mut W, label: u64) -> std::io::Result<()> {
    writeln!(out, "\n*********************")?;
    writeln!(out, "Looking at event {label}")?;
    writeln!(out, "*********************")
}

fn write_event<W: Write + ?Sized>(out: &mut W, event: &Event) -> std::io::Result<()> {
    writeln!(out, "\nnMuons = {}", event.muons().len())?;
    writeln!(out, "nHits = {}", event.hits().len())?;
    writeln!(out, "nTracks = {}", event.tracks().len())?;

    for (k, mu) in event.muons().iter().enumerate() {
        writeln!(out, "\nMuon {}  has pT = {:.1}, eta = {:.2}, phi = {:.2}", k + 1, mu.pt, mu.eta, mu.phi)?;

        for hit in event.hits() {
            if hit.station < 0 || !same_endcap(hit.eta, mu.eta) {
                continue;
            }
            writeln!(out, "    * Station {} hit has eta = {:.2}, phi = {:.2}", hit.station, hit.eta, hit.phi)?;
        }

        for trk in event.tracks() {
            if trk.sector < 0 || !same_endcap(trk.eta, mu.eta) {
                continue;
            }
            writeln!(
                out,
                "  * Sector {} track has pT = {:.1}, eta = {:.2}, phi = {:.2}, mode = {}",
                trk.sector, trk.pt, trk.eta, trk.phi, trk.mode
            )?;
            for hit in trk.hits.iter().filter(|h| h.station >= 0) {
                writeln!(out, "    * Station {} hit has eta = {:.2}, phi = {:.2}", hit.station, hit.eta, hit.phi)?;
            }
        }
    }
    Ok(())
}

fn write_reco_event<W: Write + ?Sized>(out: &mut W, event: &RecoEvent) -> std::io::Result<()> {
    writeln!(out, "\nnumRecoMuons = {}", event.reco.len())?;
    writeln!(out, "numUnpTrks = {}", event.unpacked.len())?;
    writeln!(out, "numTrks = {}", event.emulated.len())?;
    writeln!(out, "numLegTrks = {}", event.legacy.len())?;

    for (k, mu) in event.reco.iter().enumerate() {
        writeln!(out, "\nRECO muon {} has pT = {:.1}, eta = {:.2}, phi = {:.2}", k + 1, mu.pt, mu.eta, mu.phi)?;
        for (what, tracks) in [("Unpacked EMTF", &event.unpacked), ("Emulated EMTF", &event.emulated)] {
            for t in tracks.iter().filter(|t| same_endcap(t.eta, mu.eta)) {
                writeln!(
                    out,
                    "  * {what} track has pT = {:.1}, eta = {:.2}, phi = {:.2}, mode = {}",
                    t.pt, t.eta, t.phi, t.mode
                )?;
            }
        }
        // legacy eta is unsigned, so no endcap match
        for t in &event.legacy {
            writeln!(
                out,
                "  * Legacy CSCTF track has pT = {:.1}, eta = +/-{:.2}, phi = {:.2}, mode = {}",
                t.pt, t.eta, t.phi, t.mode
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{GenMuon, Hit, Track, TrackHit};
    use crate::reco::{L1Track, RecoMuon};
    use crate::source::MemorySource;

    fn event(index: u64) -> Event {
        let mu = GenMuon { pt: 25.46, eta: 1.834, theta: 18.0, phi: 0.312, charge: -1 };
        let hits = vec![
            Hit { eta: 1.81, theta: 18.2, phi: 0.30, station: 1, sector: 2, endcap: 1 },
            Hit { eta: -1.6, theta: 22.0, phi: 2.0, station: 2, sector: 5, endcap: -1 },
            Hit { eta: 1.9, theta: 17.0, phi: 0.31, station: -99, sector: -99, endcap: -99 },
        ];
        let slot = |station| TrackHit { station, eta: 1.82, phi: 0.303 };
        let tracks = vec![Track {
            pt: 22.5,
            eta: 1.826,
            theta: 18.1,
            phi: 0.31,
            sector: 2,
            mode: 15,
            endcap: 1,
            charge: -1,
            hits: vec![slot(1), slot(2), slot(-99), slot(4)],
        }];
        Event::new(index, vec![mu], hits, tracks).unwrap()
    }

    fn dump_to_string(dumper: Dumper, n: u64) -> (String, DumpSummary) {
        let src = MemorySource::new((0..n).map(event).collect());
        let mut out = Vec::new();
        let summary = dumper.dump(&src, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn prints_same_endcap_objects_only() {
        let (text, _) = dump_to_string(Dumper::new(), 1);
        let expected = [
            "",
            "******* About to enter the event loop *******",
            "",
            "*********************",
            "Looking at event 0",
            "*********************",
            "",
            "nMuons = 1",
            "nHits = 3",
            "nTracks = 1",
            "",
            "Muon 1  has pT = 25.5, eta = 1.83, phi = 0.31",
            "    * Station 1 hit has eta = 1.81, phi = 0.30",
            "  * Sector 2 track has pT = 22.5, eta = 1.83, phi = 0.31, mode = 15",
            "    * Station 1 hit has eta = 1.82, phi = 0.30",
            "    * Station 2 hit has eta = 1.82, phi = 0.30",
            "    * Station 4 hit has eta = 1.82, phi = 0.30",
            "",
            "******* Leaving the event loop *******",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn cap_visits_at_most_eleven_events() {
        assert_eq!(dump_to_string(Dumper::new(), 30).1.visited, 11);
        assert_eq!(dump_to_string(Dumper::new(), 4).1.visited, 4);
        assert_eq!(dump_to_string(Dumper::new().last_event(0), 4).1.visited, 1);
    }

    #[test]
    fn banner_cadence() {
        let (text, _) = dump_to_string(Dumper::new().print_every(5), 11);
        let banners: Vec<&str> = text.lines().filter(|l| l.starts_with("Looking at event")).collect();
        assert_eq!(banners, vec!["Looking at event 0", "Looking at event 5", "Looking at event 10"]);
    }

    #[test]
    fn reco_dump_counts_from_one() {
        let ev = |index| RecoEvent {
            index,
            reco: vec![RecoMuon { pt: 41.27, eta: -1.52, phi: 2.9 }],
            unpacked: vec![
                L1Track { pt: 36.0, eta: -1.5, phi: 2.88, mode: 15 },
                L1Track { pt: 7.0, eta: 1.4, phi: 0.1, mode: 11 },
            ],
            emulated: vec![L1Track { pt: 38.5, eta: -1.51, phi: 2.89, mode: 15 }],
            legacy: vec![L1Track { pt: 30.0, eta: 1.5, phi: 2.9, mode: 13 }],
        };
        let src = MemorySource::new((0..20).map(ev).collect());
        let mut out = Vec::new();
        let summary = Dumper::new().dump_reco(&src, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(summary.visited, 10);
        assert!(text.contains("Looking at event 1\n"));
        assert!(text.contains("Looking at event 10\n"));
        assert!(!text.contains("Looking at event 0\n"));
        assert!(!text.contains("Looking at event 11\n"));
        assert!(text.contains("\nRECO muon 1 has pT = 41.3, eta = -1.52, phi = 2.90\n"));
        assert!(text.contains("  * Unpacked EMTF track has pT = 36.0, eta = -1.50, phi = 2.88, mode = 15\n"));
        assert!(!text.contains("mode = 11"));
        assert!(text.contains("  * Emulated EMTF track has pT = 38.5, eta = -1.51, phi = 2.89, mode = 15\n"));
        assert!(text.contains("  * Legacy CSCTF track has pT = 30.0, eta = +/-1.50, phi = 2.90, mode = 13\n"));
    }
}
