//! Analysis configuration (YAML).
//!
//! Every section has defaults, so an empty document or a partial override is
//! valid. The defaults reproduce the standard EMTF 2017 comparison.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::key::Split;

/// Top-level analysis configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub catalog: Catalog,
    pub dump: DumpConfig,
    pub plot: PlotConfig,
}

/// Event-dumper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Tree path inside each event file.
    pub tree: String,
    /// Highest event index visited (inclusive).
    pub last_event: u64,
    /// Print the event banner every this many events.
    pub print_every: u64,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self { tree: "ntuple/tree".into(), last_event: 10, print_every: 1 }
    }
}

/// Plotter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Name of the reference in ratio titles ("... ratio to EMTF").
    pub reference_label: String,
    pub out_dir: String,
    pub manifest: String,
    /// Split whose histograms are overlaid and scored.
    pub split: Split,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            reference_label: "EMTF".into(),
            out_dir: "plots/png".into(),
            manifest: "plots/DrawPtResolution.json".into(),
            split: Split::Test,
        }
    }
}

impl AnalysisConfig {
    /// Validate the catalog and dumper settings.
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        if self.dump.print_every == 0 {
            return Err(Error::Validation("dump.print_every must be at least 1".into()));
        }
        if self.dump.tree.trim_matches('/').is_empty() {
            return Err(Error::Validation("dump.tree is empty".into()));
        }
        Ok(())
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Resolve the analysis config from an optional YAML document.
/// Without one, the built-in defaults are used.
pub fn resolve_config(user_yaml: Option<&str>) -> Result<AnalysisConfig> {
    let config = match user_yaml {
        None => AnalysisConfig::default(),
        Some(yaml) => serde_yaml_ng::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_yaml() {
        let c = resolve_config(None).unwrap();
        assert_eq!(c.dump.last_event, 10);
        assert_eq!(c.plot.split, Split::Test);
        assert_eq!(c.catalog.mvas[0].id, "EMTF_pt");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let yaml = "dump:\n  last_event: 3\nplot:\n  split: train\n";
        let c = resolve_config(Some(yaml)).unwrap();
        assert_eq!(c.dump.last_event, 3);
        assert_eq!(c.dump.tree, "ntuple/tree");
        assert_eq!(c.plot.split, Split::Train);
        assert_eq!(c.catalog.pt_bins.len(), 9);
    }

    #[test]
    fn catalog_override_replaces_lists() {
        let yaml = r#"
catalog:
  factories:
    - { id: f_0x001f01ff_0x4_invPt, label: "FR1" }
  pt_bins:
    - { id: all, lo: 0, hi: 1000, label: "1 < p_{T} < 1000 GeV" }
"#;
        let c = resolve_config(Some(yaml)).unwrap();
        assert_eq!(c.catalog.factories.len(), 1);
        assert_eq!(c.catalog.pt_bins.len(), 1);
        assert_eq!(c.catalog.mvas.len(), 2);
    }

    #[test]
    fn yaml_round_trip() {
        let c = AnalysisConfig::default();
        let back = resolve_config(Some(&c.to_yaml().unwrap())).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn invalid_documents_are_config_errors() {
        assert!(matches!(resolve_config(Some("dump: [1, 2")), Err(Error::Config(_))));
        assert!(matches!(
            resolve_config(Some("catalog:\n  mvas: []\n")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            resolve_config(Some("dump:\n  print_every: 0\n")),
            Err(Error::Validation(_))
        ));
    }
}
