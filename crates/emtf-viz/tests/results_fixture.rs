use std::collections::HashSet;

use emtf_core::{Catalog, EtaBin, Error, Factory, Mva, PtBin, ResolutionKey, Split, WeightScheme};
use emtf_root::fixture::FixtureFile;
use emtf_root::{BinLabel, Graph, Histogram, RootFile};
use emtf_viz::{Artifact, PlotKind, ScoreTable, build_artifacts};

fn catalog() -> Catalog {
    let pt = |id: &str, lo: f64, hi: f64| PtBin { id: id.into(), lo, hi, label: format!("{lo} < p_{{T}} < {hi} GeV") };
    Catalog {
        weights: vec![
            WeightScheme { id: "".into(), label: "".into(), pct: 0.25 },
            WeightScheme { id: "_wgt".into(), label: " (weighted)".into(), pct: 1.0 },
        ],
        pt_bins: vec![pt("all", 0.0, 1000.0), pt("8_15", 8.0, 15.0)],
        eta_bins: vec![EtaBin { id: "all".into(), lo: 1.2, hi: 2.4, label: "1.2 < |#eta| < 2.4".into() }],
        factories: vec![
            Factory { id: "f_0x001f01ff_0x4_invPt".into(), label: "FR1".into() },
            Factory { id: "f_0x001f11ff_0x4_invPt".into(), label: "FR1, bend 1".into() },
        ],
        mvas: vec![
            Mva { id: "EMTF_pt".into(), label: "EMTF".into() },
            Mva { id: "BDTG_AWB".into(), label: "BDT AWB".into() },
        ],
        colors: vec!["kBlack".into(), "kViolet".into(), "kBlue".into()],
    }
}

fn res_hist(key: &ResolutionKey, shift: f64) -> Histogram {
    // a peak around `shift` on [-4, 4)
    let contents: Vec<f64> = (0..16)
        .map(|i| {
            let c = -3.75 + 0.5 * i as f64;
            (100.0 * (-(c - shift) * (c - shift)).exp()).round()
        })
        .collect();
    let mut h = Histogram::uniform(key.to_string(), -4.0, 4.0, contents);
    h.x_title = "log_{2}(p_{T}^{trg} / p_{T}^{gen})".into();
    h
}

fn ratio_graph(split: Split, pt: &str, y: Vec<f64>) -> Graph {
    let name = format!("h_ratio_{split}_pt_{pt}");
    let mut frame = Histogram::uniform(name.clone(), -0.5, 1.5, vec![0.0; 2]);
    frame.bin_labels = vec![
        BinLabel { bin: 1, text: "f_0x001f01ff_0x4_invPt_BDTG_AWB".into() },
        BinLabel { bin: 2, text: "f_0x001f11ff_0x4_invPt_BDTG_AWB".into() },
    ];
    Graph {
        name,
        title: "Resolution score ratio".into(),
        x: vec![0.0, 1.0],
        y,
        ex: Some(vec![0.0; 2]),
        ey: Some(vec![0.02, 0.03]),
        histogram: Some(frame),
    }
}

fn results(skip_graphs: bool) -> RootFile {
    let c = catalog();
    let mut file = FixtureFile::new().compressed(true);
    for (w, pt, eta) in c.combinations() {
        for s in c.series() {
            let key = if s.is_reference {
                ResolutionKey::reference(&s.mva.id, Split::Test, &pt.id, &eta.id, &w.id)
            } else {
                ResolutionKey::trained(&s.factory.id, &s.mva.id, Split::Test, &pt.id, &eta.id, &w.id)
            };
            let shift = if s.is_reference { -0.8 } else { 0.1 * s.index as f64 };
            file = file.histogram(res_hist(&key, shift));
        }
    }
    if !skip_graphs {
        for pt in &c.pt_bins {
            file = file
                .graph(ratio_graph(Split::Train, &pt.id, vec![0.82, 0.79]))
                .graph(ratio_graph(Split::Test, &pt.id, vec![0.85, 0.81]));
        }
    }
    RootFile::from_bytes(file.to_bytes(), "results.root").unwrap()
}

#[test]
fn one_artifact_per_combination() {
    let c = catalog();
    let arts = build_artifacts(&c, &results(false), &PlotKind::ALL, Split::Test).unwrap();
    // 2 weights x 2 pT x 1 eta, overlay + ratio each, plus 2 score graphs
    assert_eq!(arts.len(), 2 * 2 * 2 + 2);

    let names: Vec<&str> = arts.iter().map(Artifact::name).collect();
    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(unique.len(), names.len());
    for expected in [
        "res_pt_all_eta_all",
        "res_rat_pt_all_eta_all",
        "res_pt_8_15_eta_all_wgt",
        "res_rat_pt_8_15_eta_all_wgt",
        "ratio_graph_pt_all",
        "ratio_graph_pt_8_15",
    ] {
        assert!(unique.contains(expected), "missing {expected}");
    }
}

#[test]
fn overlays_read_back_from_root() {
    let c = catalog();
    let arts = build_artifacts(&c, &results(false), &[PlotKind::Resolution], Split::Test).unwrap();
    let Artifact::Resolution(first) = &arts[0] else {
        panic!("expected a resolution overlay");
    };
    assert_eq!(first.series.len(), 3);
    assert_eq!(first.series[0].label, "EMTF");
    assert_eq!(first.series[1].label, "FR1");
    assert_eq!(first.series[2].color, "kBlue");
    assert_eq!(first.x_title, "log_{2}(p_{T}^{trg} / p_{T}^{gen})");
    assert!(first.window.x_min < -0.8 && first.window.x_max > 0.2);
    assert!(!first.window.is_seed());
}

#[test]
fn score_graph_labels_come_from_the_catalog() {
    let c = catalog();
    let arts = build_artifacts(&c, &results(false), &[PlotKind::ScoreGraph], Split::Test).unwrap();
    let Artifact::ScoreGraph(g) = &arts[1] else {
        panic!("expected a score graph");
    };
    assert_eq!(g.name, "ratio_graph_pt_8_15");
    let labels: Vec<&str> = g.labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(labels, vec!["FR1", "FR1, bend 1"]);
    assert_eq!(g.series[1].y, vec![0.85, 0.81]);
}

#[test]
fn missing_graph_is_reported_by_key() {
    let c = catalog();
    let err = build_artifacts(&c, &results(true), &[PlotKind::ScoreGraph], Split::Test).unwrap_err();
    match err {
        Error::MissingObject { key, source_name } => {
            assert_eq!(key, "h_ratio_train_pt_all");
            assert_eq!(source_name, "results.root");
        }
        other => panic!("expected MissingObject, got {other}"),
    }
}

#[test]
fn score_table_from_root() {
    let table = ScoreTable::build(&catalog(), &results(false), Split::Test).unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0].cells.len(), 2);
    assert!(table.rows[1..].iter().all(|r| r.cells.iter().all(|c| c.ratio.is_some())));
    assert!(table.to_string().contains("FR1, bend 1 (test) score ratio"));
}
