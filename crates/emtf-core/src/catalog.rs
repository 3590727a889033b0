//! Plot catalogs: weight schemes, kinematic bins, factories and MVAs.
//!
//! Every list is ordered and keyed by `id`. The first factory and the first
//! MVA together name the reference series; all image file names are derived
//! from catalog ids alone.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Histogram weighting variant (`""` or `"_wgt"` key suffix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightScheme {
    /// Key suffix.
    pub id: String,
    /// Appended to y-axis titles.
    pub label: String,
    /// Percent trimmed from each tail when windowing the x axis.
    pub pct: f64,
}

/// Transverse-momentum bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtBin {
    /// Key fragment, e.g. `8_15`.
    pub id: String,
    /// Lower bound in GeV.
    pub lo: f64,
    /// Upper bound in GeV.
    pub hi: f64,
    /// Display label (ROOT LaTeX).
    pub label: String,
}

/// Pseudorapidity bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtaBin {
    /// Key fragment.
    pub id: String,
    /// Lower |eta| bound.
    pub lo: f64,
    /// Upper |eta| bound.
    pub hi: f64,
    /// Display label (ROOT LaTeX).
    pub label: String,
}

/// TMVA training configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factory {
    /// Factory id, e.g. `f_0x001f31ff_0x4_invPt`.
    pub id: String,
    /// Legend label.
    pub label: String,
}

/// Regression method (or the EMTF reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mva {
    /// Method id, e.g. `BDTG_AWB`.
    pub id: String,
    /// Legend label.
    pub label: String,
}

/// One drawable series: a factory/MVA pair in iteration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Series<'a> {
    /// Position among drawn series (0 = reference).
    pub index: usize,
    /// The factory.
    pub factory: &'a Factory,
    /// The MVA.
    pub mva: &'a Mva,
    /// Whether this is the reference (first factory, first MVA).
    pub is_reference: bool,
}

/// The full set of plot categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub weights: Vec<WeightScheme>,
    pub pt_bins: Vec<PtBin>,
    pub eta_bins: Vec<EtaBin>,
    pub factories: Vec<Factory>,
    pub mvas: Vec<Mva>,
    /// ROOT color names (`kBlack`, `kViolet+2`, ...), cycled by series index.
    pub colors: Vec<String>,
}

fn weight(id: &str, label: &str, pct: f64) -> WeightScheme {
    WeightScheme { id: id.into(), label: label.into(), pct }
}

fn pt_bin(id: &str, lo: f64, hi: f64) -> PtBin {
    PtBin { id: id.into(), lo, hi, label: format!("{lo} < p_{{T}} < {hi} GeV") }
}

fn factory(id: &str, label: &str) -> Factory {
    Factory { id: id.into(), label: label.into() }
}

impl Default for Catalog {
    fn default() -> Self {
        let fr1 = "d#phi12/23/34 + comb, #theta, St1 ring, FR1";
        let mut pt_bins = vec![PtBin { label: "1 < p_{T} < 1000 GeV".into(), ..pt_bin("all", 0.0, 1000.0) }];
        for (id, lo, hi) in [
            ("1_4", 1.0, 4.0),
            ("4_8", 4.0, 8.0),
            ("8_15", 8.0, 15.0),
            ("15_30", 15.0, 30.0),
            ("30_60", 30.0, 60.0),
            ("60_120", 60.0, 120.0),
            ("120_250", 120.0, 250.0),
            ("250_1000", 250.0, 1000.0),
        ] {
            pt_bins.push(pt_bin(id, lo, hi));
        }
        Self {
            weights: vec![weight("", "", 0.25), weight("_wgt", " (weighted)", 1.00)],
            pt_bins,
            eta_bins: vec![EtaBin {
                id: "all".into(),
                lo: 1.2,
                hi: 2.4,
                label: "1.2 < |#eta| < 2.4".into(),
            }],
            factories: vec![
                factory("f_0x001f01ff_0x4_invPt", fr1),
                factory("f_0x001f11ff_0x4_invPt", &format!("{fr1}, bend 1")),
                factory("f_0x001f31ff_0x4_invPt", &format!("{fr1}, bend 1/2")),
                factory("f_0x001f51ff_0x4_invPt", &format!("{fr1}, bend 1/3")),
                factory("f_0x001f91ff_0x4_invPt", &format!("{fr1}, bend 1/4")),
                factory("f_0x001ff1ff_0x4_invPt", &format!("{fr1}, all bends")),
            ],
            mvas: vec![
                Mva { id: "EMTF_pt".into(), label: "EMTF".into() },
                Mva { id: "BDTG_AWB".into(), label: "BDT AWB".into() },
            ],
            colors: ["kBlack", "kViolet", "kBlue", "kSpring", "kRed"].map(String::from).to_vec(),
        }
    }
}

fn check_unique<'a>(what: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::Validation(format!("duplicate {what} id '{id}'")));
        }
    }
    Ok(())
}

impl Catalog {
    /// Reject duplicate ids, empty factory/MVA lists and bad percentages.
    pub fn validate(&self) -> Result<()> {
        if self.factories.is_empty() {
            return Err(Error::Validation("catalog has no factories".into()));
        }
        if self.mvas.is_empty() {
            return Err(Error::Validation("catalog has no MVAs".into()));
        }
        if self.colors.is_empty() {
            return Err(Error::Validation("catalog has no colors".into()));
        }
        check_unique("weight", self.weights.iter().map(|w| w.id.as_str()))?;
        check_unique("pT bin", self.pt_bins.iter().map(|b| b.id.as_str()))?;
        check_unique("eta bin", self.eta_bins.iter().map(|b| b.id.as_str()))?;
        check_unique("factory", self.factories.iter().map(|f| f.id.as_str()))?;
        check_unique("MVA", self.mvas.iter().map(|m| m.id.as_str()))?;
        for w in &self.weights {
            if !(0.0..50.0).contains(&w.pct) {
                return Err(Error::Validation(format!(
                    "weight '{}': tail percentage {} outside [0, 50)",
                    w.id, w.pct
                )));
            }
        }
        Ok(())
    }

    /// The reference pair (first factory, first MVA).
    pub fn reference(&self) -> Result<(&Factory, &Mva)> {
        match (self.factories.first(), self.mvas.first()) {
            (Some(f), Some(m)) => Ok((f, m)),
            _ => Err(Error::Validation("catalog has no reference series".into())),
        }
    }

    /// Drawn series in iteration order: factories outer, MVAs inner, with
    /// `(non-first factory, first MVA)` skipped since those repeat the reference.
    pub fn series(&self) -> Vec<Series<'_>> {
        let mut out = Vec::new();
        for (fi, f) in self.factories.iter().enumerate() {
            for (mi, m) in self.mvas.iter().enumerate() {
                if fi != 0 && mi == 0 {
                    continue;
                }
                out.push(Series { index: out.len(), factory: f, mva: m, is_reference: fi == 0 && mi == 0 });
            }
        }
        out
    }

    /// Legend label of a series.
    pub fn series_label(&self, s: &Series<'_>) -> String {
        let first_mva = self.mvas.first().is_some_and(|m| m.id == s.mva.id);
        if first_mva {
            s.mva.label.clone()
        } else if self.mvas.len() < 3 {
            s.factory.label.clone()
        } else if self.factories.len() < 2 {
            s.mva.label.clone()
        } else {
            format!("{} / {}", s.factory.label, s.mva.label)
        }
    }

    /// Palette entry for a running series index.
    pub fn color(&self, index: usize) -> &str {
        match self.colors.len() {
            0 => "kBlack",
            n => &self.colors[index % n],
        }
    }

    /// Every (weight, pT, eta) combination, weights outermost.
    pub fn combinations(&self) -> impl Iterator<Item = (&WeightScheme, &PtBin, &EtaBin)> + '_ {
        self.weights.iter().flat_map(move |w| {
            self.pt_bins
                .iter()
                .flat_map(move |pt| self.eta_bins.iter().map(move |eta| (w, pt, eta)))
        })
    }

    /// Rewrite score-graph bin labels (which embed factory and MVA ids) into
    /// display labels.
    ///
    /// With fewer than 3 MVAs a label containing a factory id becomes that
    /// factory's label, each factory being used at most once; with fewer than
    /// 2 factories the same applies to MVA ids; otherwise ids are replaced in
    /// place.
    pub fn relabel(&self, labels: &[String]) -> Vec<String> {
        let mut used_factories: HashSet<&str> = HashSet::new();
        let mut used_mvas: HashSet<&str> = HashSet::new();
        labels
            .iter()
            .map(|label| {
                if self.mvas.len() < 3 {
                    let hit = self
                        .factories
                        .iter()
                        .find(|f| !used_factories.contains(f.id.as_str()) && label.contains(&f.id));
                    match hit {
                        Some(f) => {
                            used_factories.insert(&f.id);
                            f.label.clone()
                        }
                        None => label.clone(),
                    }
                } else if self.factories.len() < 2 {
                    let hit =
                        self.mvas.iter().find(|m| !used_mvas.contains(m.id.as_str()) && label.contains(&m.id));
                    match hit {
                        Some(m) => {
                            used_mvas.insert(&m.id);
                            m.label.clone()
                        }
                        None => label.clone(),
                    }
                } else {
                    let mut out = label.clone();
                    for f in &self.factories {
                        out = out.replace(&f.id, &format!("{} / ", f.label));
                    }
                    for m in &self.mvas {
                        out = out.replace(&m.id, &m.label);
                    }
                    out
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_valid() {
        let c = Catalog::default();
        c.validate().unwrap();
        assert_eq!(c.pt_bins.len(), 9);
        assert_eq!(c.pt_bins[3].label, "8 < p_{T} < 15 GeV");
        assert_eq!(c.factories.len(), 6);
        assert_eq!(c.reference().unwrap().1.id, "EMTF_pt");
    }

    #[test]
    fn series_skip_repeated_reference() {
        let c = Catalog::default();
        let s = c.series();
        // reference + one BDT per factory
        assert_eq!(s.len(), 7);
        assert!(s[0].is_reference);
        assert!(s[1..].iter().all(|x| x.mva.id == "BDTG_AWB"));
        assert_eq!(s[6].index, 6);
        assert_eq!(c.series_label(&s[0]), "EMTF");
        assert!(c.series_label(&s[2]).ends_with("bend 1"));
    }

    #[test]
    fn labels_with_many_mvas() {
        let mut c = Catalog::default();
        c.mvas.push(Mva { id: "BDTG_Sq".into(), label: "BDT Sq".into() });
        let s = c.series();
        assert_eq!(s.len(), 1 + 6 * 2);
        assert_eq!(c.series_label(&s[1]), format!("{} / BDT AWB", c.factories[0].label));

        c.factories.truncate(1);
        let s = c.series();
        assert_eq!(c.series_label(&s[2]), "BDT Sq");
    }

    #[test]
    fn validation_rejects_duplicates_and_empties() {
        let mut c = Catalog::default();
        c.pt_bins.push(c.pt_bins[0].clone());
        assert!(matches!(c.validate(), Err(Error::Validation(_))));

        let mut c = Catalog::default();
        c.mvas.clear();
        assert!(c.validate().is_err());
        assert!(c.reference().is_err());
    }

    #[test]
    fn combinations_follow_weight_pt_eta_order() {
        let c = Catalog::default();
        let combos: Vec<_> = c.combinations().map(|(w, p, e)| (&w.id[..], &p.id[..], &e.id[..])).collect();
        assert_eq!(combos.len(), 2 * 9);
        assert_eq!(combos[0], ("", "all", "all"));
        assert_eq!(combos[9], ("_wgt", "all", "all"));
    }

    #[test]
    fn relabel_uses_each_factory_once() {
        let c = Catalog::default();
        let labels = vec![
            "f_0x001f11ff_0x4_invPt_BDTG_AWB".to_string(),
            "f_0x001f11ff_0x4_invPt_BDTG_AWB_again".to_string(),
            "unrelated".to_string(),
        ];
        let out = c.relabel(&labels);
        assert_eq!(out[0], c.factories[1].label);
        assert_eq!(out[1], labels[1]);
        assert_eq!(out[2], "unrelated");
    }

    #[test]
    fn relabel_in_place_for_large_grids() {
        let mut c = Catalog::default();
        c.mvas.push(Mva { id: "BDTG_Sq".into(), label: "BDT Sq".into() });
        let out = c.relabel(&["f_0x001f31ff_0x4_invPt_BDTG_Sq".to_string()]);
        assert_eq!(out[0], format!("{} / _BDT Sq", c.factories[2].label));
    }

    #[test]
    fn colors_cycle() {
        let c = Catalog::default();
        assert_eq!(c.color(0), "kBlack");
        assert_eq!(c.color(6), "kViolet");
    }
}
