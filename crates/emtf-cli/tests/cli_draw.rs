use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use emtf_core::{AnalysisConfig, Catalog, EtaBin, Factory, Mva, PtBin, RatioGraphKey, ResolutionKey, Split, WeightScheme};
use emtf_root::fixture::FixtureFile;
use emtf_root::{BinLabel, Graph, Histogram};
use emtf_viz::PlotManifest;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_emtf"))
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("emtf_cli_{}_{}_{}", std::process::id(), nanos, name));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn catalog() -> Catalog {
    Catalog {
        weights: vec![WeightScheme { id: "".into(), label: "".into(), pct: 0.25 }],
        pt_bins: vec![
            PtBin { id: "all".into(), lo: 1.0, hi: 1000.0, label: "1 < p_{T} < 1000 GeV".into() },
            PtBin { id: "8_15".into(), lo: 8.0, hi: 15.0, label: "8 < p_{T} < 15 GeV".into() },
        ],
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

fn peak(name: String, shift: f64) -> Histogram {
    let contents = (0..16)
        .map(|i| {
            let c = -3.75 + 0.5 * i as f64;
            (100.0 * (-(c - shift) * (c - shift)).exp()).round()
        })
        .collect();
    let mut h = Histogram::uniform(name, -4.0, 4.0, contents);
    h.x_title = "log_{2}(p_{T}^{trg} / p_{T}^{gen})".into();
    h
}

fn ratio_graph(split: Split, pt: &str, y: Vec<f64>) -> Graph {
    let name = RatioGraphKey::new(split, Some(pt)).to_string();
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
        ex: None,
        ey: Some(vec![0.02, 0.03]),
        histogram: Some(frame),
    }
}

/// Results file and matching config in `dir`.
fn setup(dir: &Path) -> (PathBuf, PathBuf) {
    let c = catalog();
    let mut file = FixtureFile::new().compressed(true);
    for (w, pt, eta) in c.combinations() {
        for series in c.series() {
            let key = if series.is_reference {
                ResolutionKey::reference(&series.mva.id, Split::Test, &pt.id, &eta.id, &w.id)
            } else {
                ResolutionKey::trained(&series.factory.id, &series.mva.id, Split::Test, &pt.id, &eta.id, &w.id)
            };
            let shift = if series.is_reference { -0.8 } else { 0.1 * series.index as f64 };
            file = file.histogram(peak(key.to_string(), shift));
        }
    }
    for pt in &c.pt_bins {
        file = file
            .graph(ratio_graph(Split::Train, &pt.id, vec![0.82, 0.79]))
            .graph(ratio_graph(Split::Test, &pt.id, vec![0.85, 0.81]));
    }
    let results = dir.join("results.root");
    file.write_to(&results).unwrap();

    let config = AnalysisConfig { catalog: c, ..Default::default() };
    let config_path = dir.join("analysis.yaml");
    std::fs::write(&config_path, config.to_yaml().unwrap()).unwrap();
    (results, config_path)
}

#[test]
fn draw_all_writes_images_and_manifest() {
    let dir = tmp_dir("draw_all");
    let (results, config) = setup(&dir);
    let out_dir = dir.join("png");
    let manifest = dir.join("DrawPtResolution.json");

    let out = run(&[
        "draw",
        "all",
        "--input",
        s(&results),
        "--config",
        s(&config),
        "--out-dir",
        s(&out_dir),
        "--manifest",
        s(&manifest),
        "--format",
        "svg",
    ]);
    assert!(out.status.success(), "draw should succeed, stderr={}", String::from_utf8_lossy(&out.stderr));

    let m: PlotManifest = serde_json::from_str(&std::fs::read_to_string(&manifest).unwrap()).unwrap();
    assert_eq!(m.schema_version, "emtf_plot_manifest_v1");
    assert_eq!(m.meta.tool, "emtf");
    // 2 pT bins x (overlay + ratio) + 2 score graphs
    assert_eq!(m.artifacts.len(), 6);
    for a in &m.artifacts {
        assert!(a.path.exists(), "missing {}", a.path.display());
        assert_eq!(a.path.extension().unwrap(), "svg");
    }

    let overlay = m.artifacts.iter().find(|a| a.name == "res_pt_8_15_eta_all").unwrap();
    assert_eq!(overlay.kind, "resolution");
    assert_eq!(overlay.series, vec!["EMTF", "FR1", "FR1, bend 1"]);
    assert!(overlay.window.is_some());

    let svg = std::fs::read_to_string(out_dir.join("ratio_graph_pt_8_15.svg")).unwrap();
    assert!(svg.contains(">FR1, bend 1</text>"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn draw_png_by_default() {
    let dir = tmp_dir("draw_png");
    let (results, config) = setup(&dir);
    let out_dir = dir.join("png");

    let out = run(&[
        "draw",
        "res",
        "--input",
        s(&results),
        "--config",
        s(&config),
        "--out-dir",
        s(&out_dir),
        "--manifest",
        s(&dir.join("m.json")),
    ]);
    assert!(out.status.success(), "draw should succeed, stderr={}", String::from_utf8_lossy(&out.stderr));
    let png = std::fs::read(out_dir.join("res_pt_all_eta_all.png")).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    assert!(!out_dir.join("res_rat_pt_all_eta_all.png").exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn draw_rejects_unknown_formats_and_missing_objects() {
    let dir = tmp_dir("draw_errors");
    let (results, config) = setup(&dir);

    let out = run(&["draw", "res", "--input", s(&results), "--config", s(&config), "--format", "gif"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("gif"));

    // the built-in catalog names histograms the fixture does not have
    let out = run(&["draw", "res", "--input", s(&results), "--out-dir", s(&dir.join("x")), "--format", "svg"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("results.root"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn scores_prints_and_writes_the_table() {
    let dir = tmp_dir("scores");
    let (results, config) = setup(&dir);
    let table = dir.join("table.json");

    let out = run(&["scores", "--input", s(&results), "--config", s(&config), "--output", s(&table)]);
    assert!(out.status.success(), "scores should succeed, stderr={}", String::from_utf8_lossy(&out.stderr));
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("FR1 (test) score ratio"));
    assert!(text.contains(" +/- "));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&table).unwrap()).unwrap();
    assert_eq!(json["split"], "test");
    assert_eq!(json["rows"].as_array().unwrap().len(), 3);
    std::fs::remove_dir_all(&dir).ok();
}
