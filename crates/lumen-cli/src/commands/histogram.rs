use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lumen_core::chart::histogram_charts_for_dir;

#[derive(Args)]
pub struct HistogramArgs {
    /// Folder of .jpg/.png images
    pub input: PathBuf,

    /// Folder receiving the hist_<name> charts
    pub output: PathBuf,
}

pub fn run(args: &HistogramArgs) -> Result<()> {
    let run = histogram_charts_for_dir(&args.input, &args.output)?;

    println!(
        "Saved {} histogram(s) to {}",
        run.written.len(),
        args.output.display()
    );
    if !run.skipped.is_empty() {
        println!("Skipped {} unreadable image(s)", run.skipped.len());
    }
    Ok(())
}
