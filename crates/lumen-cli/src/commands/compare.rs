use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lumen_core::io::image_io::load_image;
use lumen_core::metrics::{compute, PsnrSource};

#[derive(Args)]
pub struct CompareArgs {
    /// Reference image
    pub original: PathBuf,

    /// Processed image
    pub processed: PathBuf,

    /// Compute PSNR from the squared error sum instead of from MSE
    #[arg(long)]
    pub direct: bool,
}

pub fn run(args: &CompareArgs) -> Result<()> {
    let original = load_image(&args.original)
        .with_context(|| format!("Failed to load {}", args.original.display()))?;
    let processed = load_image(&args.processed)
        .with_context(|| format!("Failed to load {}", args.processed.display()))?;

    let source = if args.direct {
        PsnrSource::Direct
    } else {
        PsnrSource::DerivedFromMse
    };
    let pair = compute(&original, &processed, source)?;

    println!("MSE:  {:.4}", pair.mse);
    println!("PSNR: {:.4} dB ({})", pair.psnr, source);
    Ok(())
}
