use emtf_core::resolution::{median_ratio, res_score};
use emtf_core::{Catalog, Error, ResolutionKey, Score, Split, Window, percentile_window};
use emtf_root::fixture::FixtureFile;
use emtf_root::{Histogram, RootFile};

/// log2(trg/gen) distribution with a peak at `shift`.
fn resolution(key: &ResolutionKey, shift: f64, width: f64) -> Histogram {
    let contents = (0..40)
        .map(|i| {
            let c = -4.9 + 0.2 * i as f64;
            let z = (c - shift) / width;
            (200.0 * (-0.5 * z * z).exp()).round()
        })
        .collect();
    Histogram::uniform(key.to_string(), -5.0, 3.0, contents)
}

fn results() -> (Catalog, RootFile) {
    let catalog = Catalog::default();
    let (factory, mva) = catalog.reference().unwrap();
    let reference = ResolutionKey::reference(&mva.id, Split::Test, "all", "all", "");
    let trained = ResolutionKey::trained(&factory.id, "BDTG_AWB", Split::Test, "all", "all", "");
    let bytes = FixtureFile::new()
        .compressed(true)
        .histogram(resolution(&reference, -0.5, 0.6))
        .histogram(resolution(&trained, 0.0, 0.3))
        .to_bytes();
    (catalog, RootFile::from_bytes(bytes, "results.root").unwrap())
}

#[test]
fn keys_resolve_against_a_results_file() {
    let (catalog, file) = results();
    let (_, mva) = catalog.reference().unwrap();
    let key = ResolutionKey::reference(&mva.id, Split::Test, "all", "all", "").to_string();
    assert!(file.contains(&key));
    assert!(!file.contains(&ResolutionKey::reference(&mva.id, Split::Train, "all", "all", "").to_string()));
}

#[test]
fn windows_widen_across_series() {
    let (catalog, file) = results();
    let (factory, mva) = catalog.reference().unwrap();
    let pct = catalog.weights[0].pct;
    let reference = file
        .get_histogram(&ResolutionKey::reference(&mva.id, Split::Test, "all", "all", "").to_string())
        .unwrap();
    let trained = file
        .get_histogram(&ResolutionKey::trained(&factory.id, "BDTG_AWB", Split::Test, "all", "all", "").to_string())
        .unwrap();

    let alone = percentile_window(&trained, pct, pct, Window::SEED).unwrap();
    let both = percentile_window(&trained, pct, pct, percentile_window(&reference, pct, pct, Window::SEED).unwrap())
        .unwrap();
    assert!(both.contains(&alone));
    // the broader, shifted reference pulls the lower edge down
    assert!(both.x_min < alone.x_min);
}

#[test]
fn narrower_distribution_scores_better() {
    let (catalog, file) = results();
    let (factory, mva) = catalog.reference().unwrap();
    let reference = file
        .get_histogram(&ResolutionKey::reference(&mva.id, Split::Test, "all", "all", "").to_string())
        .unwrap();
    let trained = file
        .get_histogram(&ResolutionKey::trained(&factory.id, "BDTG_AWB", Split::Test, "all", "all", "").to_string())
        .unwrap();

    let ref_score = Score::of(&reference, median_ratio(&reference).unwrap()).unwrap();
    let trained_score = Score::of(&trained, median_ratio(&trained).unwrap()).unwrap();
    assert!(trained_score.value < ref_score.value);
    let ratio = trained_score.ratio_to(&ref_score).unwrap();
    assert!(ratio.value < 1.0 && ratio.error > 0.0);
    assert!(res_score(&trained, median_ratio(&trained).unwrap()).unwrap() >= 1.0);
}

#[test]
fn missing_histogram_surfaces_as_root_error() {
    let (_, file) = results();
    assert!(matches!(file.get_histogram("h_res_nothing").map_err(Error::from), Err(Error::Root(_))));
}
