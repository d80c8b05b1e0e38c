mod common;

use common::{constant_frame, gradient_frame};
use lumen_core::chart::{histogram_charts_for_dir, render_histogram_chart};
use lumen_core::enhance::histogram::intensity_histogram;
use lumen_core::io::image_io::save_png;

#[test]
fn test_chart_has_requested_size() {
    let hist = intensity_histogram(&gradient_frame(64, 4, 0, 255));
    let chart = render_histogram_chart(&hist, "gradient", 320, 200).unwrap();
    assert_eq!(chart.dimensions(), (320, 200));
}

#[test]
fn test_chart_draws_bars() {
    let hist = intensity_histogram(&constant_frame(8, 8, 128));
    let chart = render_histogram_chart(&hist, "constant", 320, 200).unwrap();
    let white = image::Rgb([255u8, 255, 255]);
    let colored = chart.pixels().filter(|&&p| p != white).count();
    assert!(colored > 0);
}

#[test]
fn test_single_bin_bar_sits_in_its_own_column() {
    // Only bin 255 is populated, so the left half of the plot holds no bars.
    let hist = intensity_histogram(&constant_frame(8, 8, 255));
    let chart = render_histogram_chart(&hist, "bright", 400, 300).unwrap();
    let bar = image::Rgb([31u8, 119, 180]);
    let bar_columns: Vec<u32> = (0..chart.width())
        .filter(|&x| (0..chart.height()).any(|y| *chart.get_pixel(x, y) == bar))
        .collect();
    assert!(!bar_columns.is_empty());
    assert!(bar_columns.iter().all(|&x| x > chart.width() / 2));
}

#[test]
fn test_tiny_canvas_is_blank() {
    let hist = intensity_histogram(&constant_frame(4, 4, 10));
    let chart = render_histogram_chart(&hist, "tiny", 10, 10).unwrap();
    assert!(chart.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn test_charts_for_dir() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    save_png(&gradient_frame(16, 16, 0, 200), &input.path().join("a.png")).unwrap();
    std::fs::write(input.path().join("broken.png"), b"not an image").unwrap();
    std::fs::write(input.path().join("notes.txt"), b"skip me").unwrap();

    let run = histogram_charts_for_dir(input.path(), output.path()).unwrap();
    assert_eq!(run.written, vec![output.path().join("hist_a.png")]);
    assert_eq!(run.skipped.len(), 1);
    assert!(output.path().join("hist_a.png").is_file());
    assert!(!output.path().join("hist_notes.txt").exists());
}
