//! Typed object keys for the results file.
//!
//! Histogram and graph names are built in exactly one place so that the
//! plotter, the score table and the fixtures agree on spelling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which events filled a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Split {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "train" => Ok(Split::Train),
            "test" => Ok(Split::Test),
            other => Err(crate::Error::Config(format!("unknown split '{other}' (train|test)"))),
        }
    }
}

/// Resolution series a histogram belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesId {
    /// The reference trigger pT, stored without a factory prefix.
    Reference { mva: String },
    /// A trained regression.
    Trained { factory: String, mva: String },
}

/// Key of a `log2(pT_trg / pT_true)` resolution histogram.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub series: SeriesId,
    pub split: Split,
    pub pt: String,
    pub eta: String,
    /// Weight-scheme suffix (`""` or `"_wgt"`).
    pub weight: String,
}

impl ResolutionKey {
    /// Key of the reference histogram.
    pub fn reference(mva: &str, split: Split, pt: &str, eta: &str, weight: &str) -> Self {
        Self {
            series: SeriesId::Reference { mva: mva.into() },
            split,
            pt: pt.into(),
            eta: eta.into(),
            weight: weight.into(),
        }
    }

    /// Key of a trained series.
    pub fn trained(factory: &str, mva: &str, split: Split, pt: &str, eta: &str, weight: &str) -> Self {
        Self {
            series: SeriesId::Trained { factory: factory.into(), mva: mva.into() },
            split,
            pt: pt.into(),
            eta: eta.into(),
            weight: weight.into(),
        }
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.series {
            SeriesId::Reference { mva } => write!(f, "h_res_{mva}")?,
            SeriesId::Trained { factory, mva } => write!(f, "h_res_{factory}_{mva}")?,
        }
        write!(f, "_{}_pt_{}_eta_{}{}", self.split, self.pt, self.eta, self.weight)
    }
}

/// Key of a score-ratio graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatioGraphKey {
    pub split: Split,
    /// pT bin id; `None` for the graph spanning all pT ranges.
    pub pt: Option<String>,
}

impl RatioGraphKey {
    pub fn new(split: Split, pt: Option<&str>) -> Self {
        Self { split, pt: pt.map(str::to_string) }
    }
}

impl fmt::Display for RatioGraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h_ratio_{}", self.split)?;
        if let Some(pt) = &self.pt {
            write!(f, "_pt_{pt}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_keys_render() {
        let r = ResolutionKey::reference("EMTF_pt", Split::Test, "all", "all", "");
        assert_eq!(r.to_string(), "h_res_EMTF_pt_test_pt_all_eta_all");
        let t = ResolutionKey::trained("f_0x001f31ff_0x4_invPt", "BDTG_AWB", Split::Test, "8_15", "all", "_wgt");
        assert_eq!(t.to_string(), "h_res_f_0x001f31ff_0x4_invPt_BDTG_AWB_test_pt_8_15_eta_all_wgt");
    }

    #[test]
    fn ratio_graph_keys_render() {
        assert_eq!(RatioGraphKey::new(Split::Train, Some("4_8")).to_string(), "h_ratio_train_pt_4_8");
        assert_eq!(RatioGraphKey::new(Split::Test, None).to_string(), "h_ratio_test");
    }

    #[test]
    fn split_parses() {
        assert_eq!("train".parse::<Split>().unwrap(), Split::Train);
        assert!("validation".parse::<Split>().is_err());
    }
}
