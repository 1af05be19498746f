//! Molecula - simulated peripheral blood smear analysis.
//!
//! There is no trained model behind this tool. Detections are fabricated from the image size so
//! the rest of the workflow (counts, flags, annotated slide, white cell gallery) can be shown.

mod analysis;
mod annotations;
mod config;
mod image_utils;
mod simulation;

use analysis::pipeline::{Analyzer, write_outcome};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use config::AnalysisConfig;
use image_utils::image_io::collect_image_paths;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "molecula")]
#[command(about = "Simulated blood smear analysis (DEMO, not a medical device)")]
#[command(version)]
struct Cli {
    /// JSON config file; flags given on the command line take precedence
    #[arg(long, global = true, env = "MOLECULA_CONFIG")]
    config: Option<PathBuf>,

    /// Minimum confidence for a detection to be kept
    #[arg(long, global = true, env = "MOLECULA_CONFIDENCE")]
    confidence: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an image, or every image under a directory
    Analyze {
        /// Image file or directory of images
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Where annotated images, crops and reports are written
        #[arg(short, long, env = "MOLECULA_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Do not write the white cell crops
        #[arg(long)]
        no_crops: bool,

        /// Print the JSON report instead of the text summary
        #[arg(long)]
        json: bool,
    },
    /// Run the simulation for an image size without any image
    Simulate {
        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(confidence) = cli.confidence {
        config.confidence_threshold = confidence;
    }
    if let Commands::Analyze { output_dir, no_crops, .. } = &cli.command {
        if let Some(dir) = output_dir {
            config.output_dir = dir.clone();
        }
        if *no_crops {
            config.save_crops = false;
        }
    }
    config.validate()?;
    Ok(config)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Picks the output directory and file stem for every image found under `root`.
///
/// The image's directory relative to `root` is mirrored under `output_dir`. A stem already taken
/// in the same directory gets the file extension appended, then a counter.
fn output_targets(root: &Path, paths: &[PathBuf], output_dir: &Path) -> Vec<(PathBuf, String)> {
    let mut taken: HashSet<PathBuf> = HashSet::new();
    let mut targets: Vec<(PathBuf, String)> = Vec::with_capacity(paths.len());
    for path in paths {
        let relative_dir = path
            .strip_prefix(root)
            .ok()
            .and_then(Path::parent)
            .unwrap_or(Path::new(""));
        let dir = output_dir.join(relative_dir);
        let base = file_stem(path);
        let mut stem = base.clone();
        let mut attempt = 1;
        while !taken.insert(dir.join(&stem)) {
            attempt += 1;
            stem = match (attempt, path.extension()) {
                (2, Some(ext)) => format!("{}_{}", base, ext.to_string_lossy()),
                _ => format!("{}_{}", base, attempt),
            };
        }
        if stem != base {
            warn!(path = %path.display(), stem = %stem, "output name already taken, renamed");
        }
        targets.push((dir, stem));
    }
    targets
}

fn analyze<W: Write>(
    path: &Path,
    config: &AnalysisConfig,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let paths = collect_image_paths(path)
        .with_context(|| format!("Failed to list images under {}", path.display()))?;
    if paths.is_empty() {
        bail!("No supported images found under {}", path.display());
    }
    let targets = output_targets(path, &paths, &config.output_dir);
    let analyzer = Analyzer::from_config(config);
    let mut rng = StdRng::from_os_rng();
    let mut failures = 0_usize;
    for (image_path, (dir, stem)) in paths.iter().zip(targets.iter()) {
        let outcome = match analyzer.analyze_file(image_path, &mut rng) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(path = %image_path.display(), "{}", err);
                failures += 1;
                continue;
            }
        };
        let written = match write_outcome(&outcome, stem, dir, config.save_crops) {
            Ok(written) => written,
            Err(err) => {
                error!(path = %image_path.display(), dir = %dir.display(), "{}", err);
                failures += 1;
                continue;
            }
        };
        info!(
            path = %image_path.display(),
            cells = outcome.report.counts.total(),
            files = written.len(),
            "analysis written"
        );
        if json {
            writeln!(out, "{}", outcome.report.to_json()?)?;
        } else {
            writeln!(out, "{}\n", outcome.report)?;
        }
    }
    if failures == paths.len() {
        bail!("All {} image(s) failed to analyze", failures);
    } else if failures > 0 {
        warn!(failures, total = paths.len(), "some images failed to analyze");
    }
    Ok(())
}

fn simulate(width: u32, height: u32, config: &AnalysisConfig) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(config);
    let report = analyzer.simulate(width, height, None, &mut StdRng::from_os_rng())?;
    println!("{}", report.to_json()?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Analyze { path, json, .. } => {
            analyze(path, &config, *json, &mut std::io::stdout().lock())
        }
        Commands::Simulate { width, height } => simulate(*width, *height, &config),
    }
}
