mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;

use common::{constant_frame, gray_color, noise_frame, noise_video, FailingSource, VideoLibrary};
use lumen_core::enhance::Variant;
use lumen_core::io::source::MemorySource;
use lumen_core::metrics::accumulator::MetricAccumulator;
use lumen_core::pipeline::batch::aggregate;
use lumen_core::pipeline::config::{AggregateWeighting, NamingRule, PipelineConfig};
use lumen_core::pipeline::frame::{frame_dir_name, frame_file_name};
use lumen_core::pipeline::{
    run_batch, BatchReport, BatchRunner, FrameProcessor, ProgressReporter, VideoProcessor,
};

const W: usize = 16;
const H: usize = 12;

fn run_library(config: PipelineConfig, library: VideoLibrary) -> BatchReport {
    let opener = library.install(&config.input);
    BatchRunner::new(config).with_opener(opener).run().unwrap()
}

fn dir_entries(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[test]
fn test_frame_names() {
    assert_eq!(frame_dir_name(0), "frame_0000");
    assert_eq!(frame_dir_name(42), "frame_0042");
    assert_eq!(frame_file_name(7, Variant::Clahe), "frame_0007_clahe.png");
    assert_eq!(
        frame_file_name(12345, Variant::HistEq),
        "frame_12345_hist_eq.png"
    );
}

#[test]
fn test_constant_gray_video_scores_perfectly() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let frames = (0..10).map(|_| gray_color(&constant_frame(W, H, 128))).collect();
    let library = VideoLibrary::new().video("gray.mp4", frames);

    let report = run_library(PipelineConfig::new(input.path(), output.path()), library);
    assert_eq!(report.videos.len(), 1);
    let video = &report.videos[0];
    assert_eq!(video.frames, 10);

    for variant in Variant::ALL {
        let values = video.accumulator.values(variant);
        assert_eq!(values.len(), 10);
        for pair in values {
            assert_eq!(pair.mse, 0.0);
            assert_eq!(pair.psnr, f64::INFINITY);
        }
    }

    for index in 0..10 {
        for variant in Variant::ALL {
            let path = video
                .output_dir
                .join(frame_dir_name(index))
                .join(frame_file_name(index, variant));
            let img = image::open(&path).unwrap().to_luma8();
            assert!(img.pixels().all(|p| p.0[0] == 128), "{}", path.display());
        }
    }

    let text = fs::read_to_string(output.path().join("gray").join("gray_metrics.txt")).unwrap();
    assert_eq!(
        text,
        "Rata-rata MSE dan PSNR untuk video: gray.mp4\n\
         Histogram Equalization - MSE: 0.00, PSNR: inf dB\n\
         Contrast Stretching - MSE: 0.00, PSNR: inf dB\n\
         CLAHE - MSE: 0.00, PSNR: inf dB\n"
    );
}

#[test]
fn test_output_layout_for_three_frame_clip() {
    let output = tempfile::tempdir().unwrap();
    let frames = (0..3).map(|i| gray_color(&noise_frame(20, 10, i))).collect();
    let mut source = MemorySource::new("clip.mp4", frames);

    let config = PipelineConfig::new("unused", output.path());
    let report = VideoProcessor::new(&config)
        .process_source(&mut source, "clip.mp4", output.path())
        .unwrap();

    assert_eq!(dir_entries(output.path()), vec!["clip"]);
    let clip = output.path().join("clip");
    assert_eq!(
        dir_entries(&clip),
        vec!["clip_metrics.txt", "frame_0000", "frame_0001", "frame_0002"]
    );
    for i in 0..3 {
        assert_eq!(
            dir_entries(&clip.join(format!("frame_000{}", i))),
            vec![
                format!("frame_000{}_clahe.png", i),
                format!("frame_000{}_contrast_stretch.png", i),
                format!("frame_000{}_hist_eq.png", i),
            ]
        );
    }

    assert_eq!(report.base_name, "clip");
    assert_eq!(report.frames, 3);
    assert_eq!(report.report_path, clip.join("clip_metrics.txt"));
    let text = fs::read_to_string(&report.report_path).unwrap();
    assert!(text.starts_with("Rata-rata MSE dan PSNR untuk video: clip.mp4\n"));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn test_batch_layout_for_three_frame_clip() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let library = VideoLibrary::new().video("clip.mp4", noise_video(3, W, H, 0));

    run_library(PipelineConfig::new(input.path(), output.path()), library);

    assert_eq!(
        dir_entries(output.path()),
        vec!["clip", "overall_metrics.txt"]
    );
    assert_eq!(
        dir_entries(&output.path().join("clip")),
        vec!["clip_metrics.txt", "frame_0000", "frame_0001", "frame_0002"]
    );
}

#[test]
fn test_metrics_compare_filtered_variant_with_original() {
    let frame = noise_frame(24, 18, 4);
    let config = PipelineConfig::new("in", "out");
    let processor = FrameProcessor::new(&config);
    let out = tempfile::tempdir().unwrap();

    let metrics = processor.process_gray(&frame, 0, out.path()).unwrap();
    let enhanced = processor.enhancer().enhance(&frame).unwrap();
    for variant in Variant::ALL {
        let expected = lumen_core::metrics::mse(&frame, enhanced.filtered(variant)).unwrap();
        assert_relative_eq!(metrics.get(variant).mse, expected);
        assert!(metrics.get(variant).mse > 0.0);
    }
}

#[test]
fn test_unopenable_videos_are_skipped() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("broken.mp4"), b"definitely not a video").unwrap();
    fs::write(input.path().join("broken.mov"), b"nor this").unwrap();
    let library = VideoLibrary::new().video("good.mp4", noise_video(2, W, H, 10));

    let report = run_library(PipelineConfig::new(input.path(), output.path()), library);

    assert_eq!(report.videos.len(), 1);
    assert_eq!(report.videos[0].filename, "good.mp4");
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(skipped, vec!["broken.mov", "broken.mp4"]);

    // Only the good video contributes.
    let overall = report.overall.unwrap();
    assert_eq!(overall, report.videos[0].summary);
    let path = report.overall_report_path.unwrap();
    assert_eq!(path, output.path().join("overall_metrics.txt"));
    assert!(fs::read_to_string(path)
        .unwrap()
        .starts_with("Rata-rata MSE dan PSNR dari semua video:\n"));

    assert!(!output.path().join("broken").exists());
}

#[test]
fn test_process_video_missing_file_returns_none() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new(input.path(), output.path());
    let result = VideoProcessor::new(&config)
        .process_video(input.path(), "missing.mp4", output.path())
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_zero_frame_video_reports_zeros() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let library = VideoLibrary::new().video("empty.mp4", Vec::new());

    let report = run_library(PipelineConfig::new(input.path(), output.path()), library);
    assert_eq!(report.videos.len(), 1);
    assert_eq!(report.videos[0].frames, 0);

    let text = fs::read_to_string(&report.videos[0].report_path).unwrap();
    assert_eq!(text.matches("MSE: 0.00, PSNR: 0.00 dB").count(), 3);
    assert_eq!(
        dir_entries(&output.path().join("empty")),
        vec!["empty_metrics.txt"]
    );
}

#[test]
fn test_report_only_mode_writes_no_images() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let library = VideoLibrary::new().video("clip.mp4", noise_video(2, W, H, 0));

    let mut config = PipelineConfig::new(input.path(), output.path());
    config.output_options.save_enhanced_images = false;
    config.batch.aggregate_across_videos = false;
    let report = run_library(config, library);

    assert_eq!(report.videos[0].frames, 2);
    assert!(report.overall.is_none());
    assert_eq!(dir_entries(output.path()), vec!["clip"]);
    assert_eq!(
        dir_entries(&output.path().join("clip")),
        vec!["clip_metrics.txt"]
    );
}

#[test]
fn test_videos_are_listed_sorted_and_filtered() {
    let input = tempfile::tempdir().unwrap();
    for name in ["b.mp4", "a.avi", "c.MP4", "notes.txt", "d.flv"] {
        fs::write(input.path().join(name), b"").unwrap();
    }
    fs::create_dir(input.path().join("dir.mp4")).unwrap();

    let runner = BatchRunner::new(PipelineConfig::new(input.path(), "out"));
    assert_eq!(runner.list_videos().unwrap(), vec!["a.avi", "b.mp4", "d.flv"]);

    let mut config = PipelineConfig::new(input.path(), "out");
    config.batch.case_insensitive_extensions = true;
    assert_eq!(
        BatchRunner::new(config).list_videos().unwrap(),
        vec!["a.avi", "b.mp4", "c.MP4", "d.flv"]
    );
}

#[test]
fn test_strip_extension_naming_keeps_inner_dots() {
    let output = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::new("in", output.path());
    config.output_options.naming = NamingRule::StripExtension;
    config.output_options.save_enhanced_images = false;

    let mut source = MemorySource::new("my.video.mp4", vec![gray_color(&noise_frame(8, 8, 1))]);
    let report = VideoProcessor::new(&config)
        .process_source(&mut source, "my.video.mp4", output.path())
        .unwrap();
    assert_eq!(report.base_name, "my.video");
    assert!(output
        .path()
        .join("my.video")
        .join("my.video_metrics.txt")
        .is_file());
}

#[test]
fn test_aggregate_weighting() {
    let output = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::new("in", output.path());
    config.output_options.save_enhanced_images = false;
    let processor = VideoProcessor::new(&config);

    let run = |name: &str, frames: Vec<lumen_core::frame::ColorFrame>| {
        let mut source = MemorySource::new(name, frames);
        processor
            .process_source(&mut source, name, output.path())
            .unwrap()
    };
    let long = run(
        "long.mp4",
        (0..3).map(|i| gray_color(&noise_frame(16, 16, i))).collect(),
    );
    let short = run("short.mp4", vec![gray_color(&noise_frame(16, 16, 99))]);
    let empty = run("empty.mp4", Vec::new());
    let videos = vec![long.clone(), short.clone(), empty];

    let mut pooled = MetricAccumulator::new();
    pooled.extend(&long.accumulator);
    pooled.extend(&short.accumulator);
    assert_eq!(aggregate(&videos, AggregateWeighting::PerFrame), pooled.summary());

    let per_video = aggregate(&videos, AggregateWeighting::PerVideo);
    for variant in Variant::ALL {
        let expected = (long.summary.get(variant).mse + short.summary.get(variant).mse) / 2.0;
        assert_relative_eq!(per_video.get(variant).mse, expected, epsilon = 1e-9);
        assert_eq!(per_video.get(variant).samples, 2);
    }
}

#[test]
fn test_constant_memory_frames_match_constant_video() {
    let output = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new("in", output.path());
    let frames = (0..2).map(|_| gray_color(&constant_frame(9, 7, 128))).collect();
    let mut source = MemorySource::new("flat.mov", frames);

    let report = VideoProcessor::new(&config)
        .process_source(&mut source, "flat.mov", output.path())
        .unwrap();
    for (_, avg) in report.summary.iter() {
        assert_eq!(avg.mse, 0.0);
        assert_eq!(avg.psnr, f64::INFINITY);
    }
}

#[derive(Default)]
struct CountingReporter {
    begun: AtomicUsize,
    opened: AtomicUsize,
    advanced: AtomicUsize,
    finished: AtomicUsize,
}

impl ProgressReporter for CountingReporter {
    fn begin_video(&self, _filename: &str, _index: usize, total_videos: usize) {
        assert_eq!(total_videos, 3);
        self.begun.fetch_add(1, Ordering::SeqCst);
    }

    fn video_opened(&self, _total_frames: Option<usize>) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn advance(&self, _frames_done: usize) {
        self.advanced.fetch_add(1, Ordering::SeqCst);
    }

    fn finish_video(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_reporter_sees_every_video() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let opener = VideoLibrary::new()
        .video("a.mp4", noise_video(1, W, H, 1))
        .video("b.mp4", noise_video(2, W, H, 2))
        .install(input.path());
    fs::write(input.path().join("c.mp4"), b"junk").unwrap();

    let mut config = PipelineConfig::new(input.path(), output.path());
    config.output_options.save_enhanced_images = false;
    let reporter = Arc::new(CountingReporter::default());
    BatchRunner::with_reporter(config, reporter.clone())
        .with_opener(opener)
        .run()
        .unwrap();

    assert_eq!(reporter.begun.load(Ordering::SeqCst), 3);
    assert_eq!(reporter.opened.load(Ordering::SeqCst), 2);
    assert_eq!(reporter.advanced.load(Ordering::SeqCst), 3);
    assert_eq!(reporter.finished.load(Ordering::SeqCst), 3);
}

#[test]
fn test_invalid_config_fails_before_processing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::new(input.path(), output.path().join("results"));
    config.enhance.median_kernel = 2;
    assert!(run_batch(&config).is_err());
    assert!(!output.path().join("results").exists());
}

#[test]
fn test_missing_input_directory_is_an_error() {
    let output = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new(output.path().join("nope"), output.path());
    assert!(run_batch(&config).is_err());
}

#[test]
fn test_decode_error_mid_video_keeps_frames_read() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let library = VideoLibrary::new().failing("cut.mp4", noise_video(2, W, H, 5));

    let report = run_library(PipelineConfig::new(input.path(), output.path()), library);

    assert!(report.skipped.is_empty());
    let video = &report.videos[0];
    assert_eq!(video.frames, 2);
    for variant in Variant::ALL {
        assert_eq!(video.accumulator.values(variant).len(), 2);
    }
    assert_eq!(
        dir_entries(&output.path().join("cut")),
        vec!["cut_metrics.txt", "frame_0000", "frame_0001"]
    );
}

#[test]
fn test_decode_error_on_first_frame_skips_video() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let library = VideoLibrary::new()
        .failing("dead.mp4", Vec::new())
        .video("live.mp4", noise_video(1, W, H, 3));

    let report = run_library(PipelineConfig::new(input.path(), output.path()), library);

    assert_eq!(report.videos.len(), 1);
    assert_eq!(report.videos[0].filename, "live.mp4");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].filename, "dead.mp4");
    assert!(!output.path().join("dead").exists());
    assert_eq!(report.overall.unwrap(), report.videos[0].summary);
}

#[test]
fn test_process_source_returns_first_frame_error() {
    let output = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new("in", output.path());
    let mut source = FailingSource::new(Path::new("dead.mp4"), Vec::new());

    let result = VideoProcessor::new(&config).process_source(&mut source, "dead.mp4", output.path());
    assert!(result.is_err());
    assert!(!output.path().join("dead").exists());
}

#[test]
fn test_shared_output_folder_is_reported() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let library = VideoLibrary::new()
        .video("clip.avi", noise_video(1, W, H, 1))
        .video("clip.mp4", noise_video(2, W, H, 2))
        .video("other.mp4", noise_video(1, W, H, 3));

    let mut config = PipelineConfig::new(input.path(), output.path());
    config.output_options.save_enhanced_images = false;
    let report = run_library(config, library);

    assert_eq!(report.videos.len(), 3);
    assert_eq!(report.name_collisions, vec!["clip"]);
    // Listing is sorted, so clip.mp4 runs last and its report is kept.
    let text = fs::read_to_string(output.path().join("clip").join("clip_metrics.txt")).unwrap();
    assert!(text.starts_with("Rata-rata MSE dan PSNR untuk video: clip.mp4\n"));
}
