use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use emtf_root::LeafType;
use emtf_root::fixture::{FixtureBranch, FixtureFile, FixtureTree};

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

fn stdout(out: &Output) -> String {
    assert!(out.status.success(), "emtf failed, stderr={}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8(out.stdout.clone()).unwrap()
}

/// `n` events with one positive-endcap muon each and nothing else.
fn ntuple(path: &Path, n: usize) {
    use LeafType::{F32, I32};
    let empty = |len: usize| vec![-999.0; len];
    // nMuons, pt[2], eta[2], theta[2], phi[2], charge[2]
    let muon_row = |i: usize| vec![1.0, 10.0 + i as f64, -999.0, 1.5, -999.0, 0.0, -999.0, 0.5, -999.0, 1.0, -999.0];
    let hit_row = || [vec![0.0], empty(24 * 6)].concat();
    let track_row = || [vec![0.0], empty(4 * 8 + 16 * 3)].concat();

    let muon = FixtureBranch::records(
        "muon",
        &[("nMuons", I32), ("pt[2]", F32), ("eta[2]", F32), ("theta[2]", F32), ("phi[2]", F32), ("charge[2]", I32)],
        (0..n).map(muon_row).collect(),
    );
    let hit = FixtureBranch::records(
        "hit",
        &[
            ("nHits", I32),
            ("eta[24]", F32),
            ("theta[24]", F32),
            ("phi[24]", F32),
            ("station[24]", I32),
            ("sector[24]", I32),
            ("endcap[24]", I32),
        ],
        (0..n).map(|_| hit_row()).collect(),
    );
    let track = FixtureBranch::records(
        "track",
        &[
            ("nTracks", I32),
            ("pt[4]", F32),
            ("eta[4]", F32),
            ("theta[4]", F32),
            ("phi[4]", F32),
            ("sector[4]", I32),
            ("mode[4]", I32),
            ("endcap[4]", I32),
            ("charge[4]", I32),
            ("hit_station[4][4]", I32),
            ("hit_eta[4][4]", F32),
            ("hit_phi[4][4]", F32),
        ],
        (0..n).map(|_| track_row()).collect(),
    );
    let tree = FixtureTree::new("tree").branch(muon).branch(hit).branch(track);
    FixtureFile::new().compressed(true).tree("ntuple", tree).write_to(path).unwrap();
}

#[test]
fn dump_stops_after_event_ten() {
    let dir = tmp_dir("dump");
    let input = dir.join("ntuple.root");
    ntuple(&input, 15);

    let text = stdout(&run(&["dump", "--input", input.to_str().unwrap()]));
    let banners = text.lines().filter(|l| l.starts_with("Looking at event")).count();
    assert_eq!(banners, 11);
    assert!(text.contains("\nMuon 1  has pT = 20.0, eta = 1.50, phi = 0.50\n"));
    assert!(text.trim_end().ends_with("******* Leaving the event loop *******"));
    assert!(!text.contains("Adding file"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn dump_chains_several_inputs() {
    let dir = tmp_dir("chain");
    let a = dir.join("a.root");
    let b = dir.join("b.root");
    ntuple(&a, 2);
    ntuple(&b, 3);

    let out = run(&[
        "dump",
        "--input",
        a.to_str().unwrap(),
        "--input",
        b.to_str().unwrap(),
        "--last-event",
        "20",
        "--print-every",
        "2",
        "--verbose",
    ]);
    let text = stdout(&out);
    assert!(text.starts_with(&format!("Adding file {}\nAdding file {}\n", a.display(), b.display())));
    assert!(text.contains("Chained 2 files, 5 entries"));
    let banners: Vec<&str> = text.lines().filter(|l| l.starts_with("Looking at event")).collect();
    assert_eq!(banners, vec!["Looking at event 0", "Looking at event 2", "Looking at event 4"]);
    // event 4 is the last event of the second file
    assert!(text.contains("\nMuon 1  has pT = 12.0, eta = 1.50, phi = 0.50\n"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn dump_reports_a_missing_tree() {
    let dir = tmp_dir("missing_tree");
    let input = dir.join("ntuple.root");
    ntuple(&input, 1);

    let out = run(&["dump", "--input", input.to_str().unwrap(), "--tree", "ntuple/nope"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("ntuple/nope"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn keys_lists_the_directory() {
    let dir = tmp_dir("keys");
    let input = dir.join("ntuple.root");
    ntuple(&input, 1);

    let top = stdout(&run(&["keys", "--input", input.to_str().unwrap()]));
    assert!(top.lines().any(|l| l.starts_with("ntuple\tTDirectory")));
    let inner = stdout(&run(&["keys", "--input", input.to_str().unwrap(), "--path", "ntuple"]));
    assert_eq!(inner.trim(), "tree\tTTree\t1");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn config_prints_defaults() {
    let text = stdout(&run(&["config"]));
    assert!(text.contains("last_event: 10"));
    assert!(text.contains("f_0x001f01ff_0x4_invPt"));
}
