use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use lumen_core::enhance::stretch::StretchMethod;
use lumen_core::metrics::PsnrSource;
use lumen_core::pipeline::config::{AggregateWeighting, NamingRule, PipelineConfig};
use lumen_core::pipeline::run_batch_reported;
use tracing::info;

use crate::progress::BarReporter;
use crate::summary::{print_batch_results, print_pipeline_summary};

#[derive(Clone, ValueEnum)]
pub enum StretchArg {
    Percentile,
    MinMax,
}

#[derive(Clone, ValueEnum)]
pub enum PsnrArg {
    Derived,
    Direct,
}

#[derive(Clone, ValueEnum)]
pub enum WeightingArg {
    PerFrame,
    PerVideo,
}

#[derive(Clone, ValueEnum)]
pub enum NamingArg {
    FirstDot,
    StripExtension,
}

#[derive(Args)]
pub struct RunArgs {
    /// Folder of input videos
    #[arg(env = "LUMEN_INPUT", required_unless_present = "config")]
    pub input: Option<PathBuf>,

    /// Output folder
    #[arg(env = "LUMEN_OUTPUT", required_unless_present = "config")]
    pub output: Option<PathBuf>,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Contrast stretch bounds
    #[arg(long, value_enum)]
    pub stretch: Option<StretchArg>,

    /// Low and high percentile for percentile stretching, e.g. "2,98"
    #[arg(long)]
    pub percentiles: Option<String>,

    /// CLAHE clip limit (0 disables clipping)
    #[arg(long)]
    pub clip_limit: Option<f32>,

    /// CLAHE tile grid, e.g. "8x8"
    #[arg(long)]
    pub tiles: Option<String>,

    /// Median filter kernel size (odd)
    #[arg(long)]
    pub kernel: Option<usize>,

    /// How PSNR is computed
    #[arg(long, value_enum)]
    pub psnr: Option<PsnrArg>,

    /// Only write reports, no per-frame images
    #[arg(long)]
    pub no_images: bool,

    /// Skip the overall cross-video report
    #[arg(long)]
    pub no_overall: bool,

    /// Weighting of the overall report
    #[arg(long, value_enum)]
    pub weighting: Option<WeightingArg>,

    /// Output folder naming
    #[arg(long, value_enum)]
    pub naming: Option<NamingArg>,

    /// Match video extensions case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    /// Comma-separated video extensions (default: mp4,avi,mov,mkv,flv)
    #[arg(long)]
    pub extensions: Option<String>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    print_pipeline_summary(&config);

    let reporter = Arc::new(BarReporter::new());
    let report = run_batch_reported(&config, reporter)
        .with_context(|| format!("Batch run over {} failed", config.input.display()))?;

    print_batch_results(&report);
    Ok(())
}

fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let config: PipelineConfig =
            toml::from_str(&contents).context("Invalid pipeline config")?;
        info!("Loaded config from {}", config_path.display());
        config
    } else {
        PipelineConfig::new(PathBuf::new(), PathBuf::new())
    };

    if let Some(ref input) = args.input {
        config.input = input.clone();
    }
    if let Some(ref output) = args.output {
        config.output = output.clone();
    }

    let enhance = &mut config.enhance;
    match (&args.stretch, &args.percentiles) {
        (Some(StretchArg::MinMax), _) => enhance.stretch = StretchMethod::MinMax,
        (_, Some(p)) => {
            let (low, high) = parse_pair::<f64>(p, ',')
                .context("Invalid percentiles (expected 'low,high', e.g. '2,98')")?;
            enhance.stretch = StretchMethod::Percentile { low, high };
        }
        (Some(StretchArg::Percentile), None) => enhance.stretch = StretchMethod::default(),
        (None, None) => {}
    }
    if let Some(clip) = args.clip_limit {
        enhance.clahe.clip_limit = clip;
    }
    if let Some(ref tiles) = args.tiles {
        let (x, y) = parse_pair::<usize>(tiles, 'x')
            .context("Invalid tile grid (expected 'COLSxROWS', e.g. '8x8')")?;
        enhance.clahe.tiles_x = x;
        enhance.clahe.tiles_y = y;
    }
    if let Some(kernel) = args.kernel {
        enhance.median_kernel = kernel;
    }

    if let Some(ref psnr) = args.psnr {
        config.metrics.psnr_source = match psnr {
            PsnrArg::Derived => PsnrSource::DerivedFromMse,
            PsnrArg::Direct => PsnrSource::Direct,
        };
    }
    if args.no_images {
        config.output_options.save_enhanced_images = false;
    }
    if let Some(ref naming) = args.naming {
        config.output_options.naming = match naming {
            NamingArg::FirstDot => NamingRule::FirstDot,
            NamingArg::StripExtension => NamingRule::StripExtension,
        };
    }

    if args.no_overall {
        config.batch.aggregate_across_videos = false;
    }
    if let Some(ref weighting) = args.weighting {
        config.batch.aggregate_weighting = match weighting {
            WeightingArg::PerFrame => AggregateWeighting::PerFrame,
            WeightingArg::PerVideo => AggregateWeighting::PerVideo,
        };
    }
    if args.ignore_case {
        config.batch.case_insensitive_extensions = true;
    }
    if let Some(ref exts) = args.extensions {
        config.batch.extensions = exts
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
    }

    if config.input.as_os_str().is_empty() || config.output.as_os_str().is_empty() {
        anyhow::bail!("Input and output folders are required (arguments, config, or LUMEN_INPUT/LUMEN_OUTPUT)");
    }
    config.validate()?;
    Ok(config)
}

fn parse_pair<T: std::str::FromStr>(s: &str, sep: char) -> Result<(T, T)> {
    let parts: Vec<&str> = s.split(sep).map(str::trim).collect();
    if parts.len() != 2 {
        anyhow::bail!("expected exactly 2 values separated by '{}'", sep);
    }
    let parse = |p: &str| {
        p.parse::<T>()
            .map_err(|_| anyhow::anyhow!("invalid value '{}'", p))
    };
    Ok((parse(parts[0])?, parse(parts[1])?))
}
