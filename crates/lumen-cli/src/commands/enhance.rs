use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lumen_core::enhance::{EnhanceConfig, FrameEnhancer};
use lumen_core::io::image_io::{load_image, save_png};
use lumen_core::metrics::{compute, PsnrSource};

use crate::summary::print_metric_table;

#[derive(Args)]
pub struct EnhanceArgs {
    /// Input image
    pub file: PathBuf,

    /// Output folder
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Median filter kernel size (odd)
    #[arg(long, default_value = "5")]
    pub kernel: usize,

    /// CLAHE clip limit (0 disables clipping)
    #[arg(long, default_value = "2.0")]
    pub clip_limit: f32,

    /// Also save the enhanced images before median filtering
    #[arg(long)]
    pub keep_unfiltered: bool,
}

pub fn run(args: &EnhanceArgs) -> Result<()> {
    let gray = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let mut config = EnhanceConfig {
        median_kernel: args.kernel,
        ..Default::default()
    };
    config.clahe.clip_limit = args.clip_limit;
    let enhanced = FrameEnhancer::new(config).enhance(&gray)?;

    let stem = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    std::fs::create_dir_all(&args.output)?;

    let mut rows = Vec::new();
    for v in enhanced.iter() {
        let path = args.output.join(format!("{}_{}.png", stem, v.variant.slug()));
        save_png(&v.filtered, &path)?;
        println!("Saved {}", path.display());

        if args.keep_unfiltered {
            let raw = args
                .output
                .join(format!("{}_{}_unfiltered.png", stem, v.variant.slug()));
            save_png(&v.enhanced, &raw)?;
            println!("Saved {}", raw.display());
        }

        rows.push((v.variant, compute(&gray, &v.filtered, PsnrSource::default())?));
    }

    println!();
    print_metric_table(&rows);
    Ok(())
}
