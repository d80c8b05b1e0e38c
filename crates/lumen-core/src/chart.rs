//! Intensity histogram bar charts.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use plotters::prelude::{
    BitMapBackend, ChartBuilder, Color, IntoDrawingArea, IntoFont, IntoSegmentedCoord, RGBColor,
    WHITE,
};
use plotters::series::Histogram as BarSeries;
use tracing::{debug, info, warn};

use crate::consts::{HISTOGRAM_BINS, HISTOGRAM_CHART_SIZE, HISTOGRAM_IMAGE_EXTENSIONS};
use crate::enhance::histogram::{intensity_histogram, Histogram};
use crate::error::{LumenError, Result};
use crate::io::image_io::load_image;

const BAR: RGBColor = RGBColor(31, 119, 180);

/// Smallest canvas that still fits the axis label areas.
const MIN_CHART_SIZE: (u32, u32) = (160, 120);

fn plot_error(e: impl std::fmt::Display) -> LumenError {
    LumenError::Plot(e.to_string())
}

/// Draw a 256-bin bar chart of `hist` with the x axis fixed to `[0, 256]`.
///
/// Canvases smaller than the label areas come back blank. When no font is
/// available the bars are drawn without caption and axis labels.
pub fn render_histogram_chart(
    hist: &Histogram,
    title: &str,
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let mut buffer = vec![255u8; width as usize * height as usize * 3];
    if width >= MIN_CHART_SIZE.0 && height >= MIN_CHART_SIZE.1 {
        if let Err(e) = draw_chart(&mut buffer, hist, title, (width, height), true) {
            debug!("Labelled chart failed ({}), drawing bars only", e);
            buffer.fill(255);
            draw_chart(&mut buffer, hist, title, (width, height), false)?;
        }
    }
    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| plot_error("chart buffer does not match canvas size"))
}

fn draw_chart(
    buffer: &mut [u8],
    hist: &Histogram,
    title: &str,
    size: (u32, u32),
    labelled: bool,
) -> Result<()> {
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let peak = hist.iter().copied().max().unwrap_or(0).max(1);
    let mut builder = ChartBuilder::on(&root);
    builder.margin(15);
    if labelled {
        builder
            .caption(title, ("sans-serif", 22).into_font())
            .x_label_area_size(45)
            .y_label_area_size(70);
    }
    let mut chart = builder
        .build_cartesian_2d((0u32..HISTOGRAM_BINS as u32).into_segmented(), 0u64..peak)
        .map_err(plot_error)?;

    if labelled {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Pixel intensity")
            .y_desc("Pixel count")
            .axis_desc_style(("sans-serif", 16))
            .label_style(("sans-serif", 12))
            .draw()
            .map_err(plot_error)?;
    }

    chart
        .draw_series(
            BarSeries::vertical(&chart)
                .style(BAR.filled())
                .margin(0)
                .data(hist.iter().enumerate().map(|(bin, &count)| (bin as u32, count))),
        )
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}

/// Write the histogram chart of the image at `input` to `output`.
pub fn save_histogram_chart(input: &Path, output: &Path) -> Result<()> {
    let frame = load_image(input)?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (w, h) = HISTOGRAM_CHART_SIZE;
    let chart = render_histogram_chart(
        &intensity_histogram(&frame),
        &format!("Histogram of {}", name),
        w,
        h,
    )?;
    chart.save(output)?;
    Ok(())
}

/// Charts written and images skipped by [`histogram_charts_for_dir`].
#[derive(Clone, Debug, Default)]
pub struct ChartRun {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Chart every `.jpg`/`.png` image of `input_dir` as `output_dir/hist_<name>`.
///
/// Unreadable images are logged and skipped.
pub fn histogram_charts_for_dir(input_dir: &Path, output_dir: &Path) -> Result<ChartRun> {
    fs::create_dir_all(output_dir)?;

    let mut names: Vec<String> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            HISTOGRAM_IMAGE_EXTENSIONS
                .iter()
                .any(|ext| name.ends_with(&format!(".{}", ext)))
        })
        .collect();
    names.sort();

    let mut run = ChartRun::default();
    for name in names {
        let input = input_dir.join(&name);
        let output = output_dir.join(format!("hist_{}", name));
        match save_histogram_chart(&input, &output) {
            Ok(()) => {
                info!(image = %name, "Saved histogram");
                run.written.push(output);
            }
            Err(e) => {
                warn!("Skipping {}: {}", input.display(), e);
                run.skipped.push(input);
            }
        }
    }
    Ok(run)
}
