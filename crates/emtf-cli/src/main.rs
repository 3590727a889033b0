//! EMTF CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use emtf_core::AnalysisConfig;
use emtf_ntuple::{ChainSource, Dumper, EventSource, RecoSource, TreeSource};
use emtf_root::RootFile;
use emtf_viz::{ManifestEntry, PlotKind, PlotManifest, ScoreTable, build_artifacts};
use emtf_viz_render::config::StyleConfig;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "emtf")]
#[command(about = "EMTF pT assignment - ntuple dumps and resolution plots")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the keys of a ROOT file
    Keys {
        /// Input ROOT file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory inside the file (e.g. "ntuple")
        #[arg(long)]
        path: Option<String>,
    },

    /// Print the generator muons, hits and tracks of the first events
    Dump {
        /// Input ntuple(s); several files are chained in order
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Analysis config (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tree path inside each file [default: ntuple/tree]
        #[arg(long)]
        tree: Option<String>,

        /// Highest event index printed [default: 10]
        #[arg(long)]
        last_event: Option<u64>,

        /// Print the event banner every N events [default: 1]
        #[arg(long)]
        print_every: Option<u64>,

        /// Report per-file entry counts
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the reco muons and unpacked, emulated and legacy tracks
    DumpReco {
        /// Input ntuple
        #[arg(short, long)]
        input: PathBuf,

        /// Analysis config (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tree path inside the file [default: ntuple/tree]
        #[arg(long)]
        tree: Option<String>,

        /// Highest event label printed [default: 10]
        #[arg(long)]
        last_event: Option<u64>,
    },

    /// Draw resolution plots from a results file
    Draw {
        /// Which plots to draw
        #[arg(value_enum)]
        what: DrawWhat,

        /// Results ROOT file with the resolution histograms
        #[arg(short, long)]
        input: PathBuf,

        /// Image directory [default: plots/png]
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Manifest path [default: plots/DrawPtResolution.json]
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Analysis config (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Plot style (YAML)
        #[arg(long)]
        style: Option<PathBuf>,

        /// Image format (png or svg) [default: from the style]
        #[arg(long)]
        format: Option<String>,
    },

    /// Print the resolution-score table
    Scores {
        /// Results ROOT file
        #[arg(short, long)]
        input: PathBuf,

        /// Analysis config (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write the table as pretty JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the analysis config as YAML (built-in defaults unless --config)
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DrawWhat {
    Res,
    ResRatio,
    ScoreGraph,
    All,
}

impl DrawWhat {
    fn kinds(self) -> Vec<PlotKind> {
        match self {
            DrawWhat::Res => vec![PlotKind::Resolution],
            DrawWhat::ResRatio => vec![PlotKind::ResolutionRatio],
            DrawWhat::ScoreGraph => vec![PlotKind::ScoreGraph],
            DrawWhat::All => PlotKind::ALL.to_vec(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_writer(std::io::stderr).with_target(false).init();

    match cli.command {
        Commands::Keys { input, path } => cmd_keys(&input, path.as_deref()),
        Commands::Dump { input, config, tree, last_event, print_every, verbose } => {
            cmd_dump(&input, config.as_ref(), tree, last_event, print_every, verbose)
        }
        Commands::DumpReco { input, config, tree, last_event } => {
            cmd_dump_reco(&input, config.as_ref(), tree, last_event)
        }
        Commands::Draw { what, input, out_dir, manifest, config, style, format } => {
            cmd_draw(what, &input, out_dir, manifest, config.as_ref(), style.as_ref(), format)
        }
        Commands::Scores { input, config, output } => cmd_scores(&input, config.as_ref(), output.as_ref()),
        Commands::Config { config } => {
            let config = load_config(config.as_ref())?;
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(emtf_core::resolve_config(None)?);
    };
    let yaml = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config = emtf_core::resolve_config(Some(&yaml)).with_context(|| format!("invalid config {}", path.display()))?;
    tracing::info!(path = %path.display(), "analysis config loaded");
    Ok(config)
}

fn load_style(path: Option<&PathBuf>) -> Result<StyleConfig> {
    let Some(path) = path else {
        return Ok(emtf_viz_render::config::resolve_config(None)?);
    };
    let yaml = std::fs::read_to_string(path).with_context(|| format!("reading style {}", path.display()))?;
    emtf_viz_render::config::resolve_config(Some(&yaml)).with_context(|| format!("invalid style {}", path.display()))
}

fn open_root(path: &Path) -> Result<RootFile> {
    RootFile::open(path).with_context(|| format!("opening {}", path.display()))
}

fn cmd_keys(input: &Path, dir: Option<&str>) -> Result<()> {
    let file = open_root(input)?;
    let keys = match dir {
        Some(d) => file.list_keys_in(d)?,
        None => file.list_keys()?,
    };
    let mut out = std::io::stdout().lock();
    for k in keys {
        writeln!(out, "{}\t{}\t{}", k.name, k.class_name, k.cycle)?;
    }
    Ok(())
}

fn cmd_dump(
    inputs: &[PathBuf],
    config: Option<&PathBuf>,
    tree: Option<String>,
    last_event: Option<u64>,
    print_every: Option<u64>,
    verbose: bool,
) -> Result<()> {
    let mut settings = load_config(config)?.dump;
    if let Some(t) = tree {
        settings.tree = t;
    }
    settings.last_event = last_event.unwrap_or(settings.last_event);
    settings.print_every = print_every.unwrap_or(settings.print_every);
    if settings.print_every == 0 {
        anyhow::bail!("--print-every must be at least 1");
    }
    let dumper = Dumper::from_config(&settings);

    let mut out = std::io::stdout().lock();
    let summary = if let [single] = inputs {
        let source = TreeSource::open(single, &settings.tree)
            .with_context(|| format!("reading {} from {}", settings.tree, single.display()))?;
        dumper.dump(&source, &mut out)?
    } else {
        for path in inputs {
            writeln!(out, "Adding file {}", path.display())?;
        }
        let chain = ChainSource::open(inputs, &settings.tree, verbose).context("building the input chain")?;
        if verbose {
            writeln!(out, "Chained {} files, {} entries", chain.parts().len(), chain.n_events())?;
        }
        dumper.dump(&chain, &mut out)?
    };
    out.flush()?;
    tracing::info!(visited = summary.visited, available = summary.available, "dump finished");
    Ok(())
}

fn cmd_dump_reco(input: &Path, config: Option<&PathBuf>, tree: Option<String>, last_event: Option<u64>) -> Result<()> {
    let settings = load_config(config)?.dump;
    let tree = tree.unwrap_or_else(|| settings.tree.clone());
    let dumper = Dumper::from_config(&settings).last_event(last_event.unwrap_or(settings.last_event));

    let source =
        RecoSource::open(input, &tree).with_context(|| format!("reading {tree} from {}", input.display()))?;
    let mut out = std::io::stdout().lock();
    let summary = dumper.dump_reco(&source, &mut out)?;
    out.flush()?;
    tracing::info!(visited = summary.visited, available = summary.available, "reco dump finished");
    Ok(())
}

fn cmd_draw(
    what: DrawWhat,
    input: &Path,
    out_dir: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
    config: Option<&PathBuf>,
    style: Option<&PathBuf>,
    format: Option<String>,
) -> Result<()> {
    let config = load_config(config)?;
    let style = load_style(style)?;
    let format = format.unwrap_or_else(|| style.output.format.clone());
    if !matches!(format.as_str(), "png" | "svg") {
        anyhow::bail!("unsupported image format '{format}' (expected png or svg)");
    }
    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from(&config.plot.out_dir));
    let manifest_path = manifest_path.unwrap_or_else(|| PathBuf::from(&config.plot.manifest));

    let file = open_root(input)?;
    let artifacts = build_artifacts(&config.catalog, &file, &what.kinds(), config.plot.split)
        .with_context(|| format!("assembling plots from {}", input.display()))?;

    let mut manifest = PlotManifest::new(input.display().to_string())?;
    for art in &artifacts {
        let path = out_dir.join(format!("{}.{format}", art.name()));
        let kind = art.kind();
        emtf_viz_render::render_to_file(&art.to_json()?, kind.as_str(), &path, &style)
            .with_context(|| format!("rendering {}", path.display()))?;
        tracing::debug!(path = %path.display(), %kind, "wrote plot");
        manifest.push(ManifestEntry {
            kind: kind.to_string(),
            name: art.name().to_string(),
            path,
            window: art.window(),
            series: art.series_labels(),
        });
    }
    manifest.write_to(&manifest_path).with_context(|| format!("writing {}", manifest_path.display()))?;
    tracing::info!(
        plots = manifest.artifacts.len(),
        out_dir = %out_dir.display(),
        manifest = %manifest_path.display(),
        "plots written"
    );
    Ok(())
}

fn cmd_scores(input: &Path, config: Option<&PathBuf>, output: Option<&PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let file = open_root(input)?;
    let table = ScoreTable::build(&config.catalog, &file, config.plot.split)
        .with_context(|| format!("scoring {}", input.display()))?;
    print!("{table}");
    if let Some(path) = output {
        std::fs::write(path, table.to_json()?).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
