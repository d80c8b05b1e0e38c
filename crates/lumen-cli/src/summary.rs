use console::Style;
use lumen_core::enhance::Variant;
use lumen_core::metrics::MetricPair;
use lumen_core::pipeline::config::PipelineConfig;
use lumen_core::pipeline::BatchReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    warn: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            warn: Style::new().yellow(),
        }
    }
}

/// A heading and its double rule, sized to the heading's width.
fn title_lines(title: &str) -> (String, String) {
    (title.to_string(), "\u{2550}".repeat(title.chars().count()))
}

fn print_title(s: &Styles, title: &str) {
    let (heading, rule) = title_lines(title);
    println!();
    println!("  {}", s.title.apply_to(heading));
    println!("  {}", s.title.apply_to(rule));
    println!();
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    print_title(&s, "Lumen Batch");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Extensions"),
        s.value.apply_to(config.batch.extensions.join(", "))
    );
    println!();

    let enhance = &config.enhance;
    println!("  {}", s.header.apply_to("Enhancement"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Stretch"),
        s.method.apply_to(&enhance.stretch)
    );
    let clip = if enhance.clahe.clip_limit > 0.0 && enhance.clahe.clip_limit.is_finite() {
        format!("clip {}", enhance.clahe.clip_limit)
    } else {
        "no clip".to_string()
    };
    println!(
        "    {:<12}{}",
        s.label.apply_to("CLAHE"),
        s.value.apply_to(format!(
            "{}x{} tiles, {}",
            enhance.clahe.tiles_x, enhance.clahe.tiles_y, clip
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Median"),
        s.value.apply_to(format!("{0}x{0}", enhance.median_kernel))
    );
    println!();

    println!("  {}", s.header.apply_to("Output"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("PSNR"),
        s.method.apply_to(config.metrics.psnr_source)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Naming"),
        s.method.apply_to(config.output_options.naming)
    );
    if config.output_options.save_enhanced_images {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Images"),
            s.value.apply_to("per frame")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Images"),
            s.disabled.apply_to("reports only")
        );
    }
    if config.batch.aggregate_across_videos {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Overall"),
            s.method.apply_to(config.batch.aggregate_weighting)
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Overall"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

pub fn print_batch_results(report: &BatchReport) {
    let s = Styles::new();

    print_title(&s, "Results");

    for video in &report.videos {
        println!(
            "  {}  {}",
            s.header.apply_to(&video.filename),
            s.label.apply_to(format!("{} frames", video.frames))
        );
        for (variant, avg) in video.summary.iter() {
            print_metric_row(&s, variant, &avg.as_pair());
        }
        println!(
            "    {:<24}{}",
            s.label.apply_to("Report"),
            s.path.apply_to(video.report_path.display())
        );
        println!();
    }

    for skipped in &report.skipped {
        println!(
            "  {}  {}",
            s.warn.apply_to(format!("Skipped {}", skipped.filename)),
            s.label.apply_to(&skipped.reason)
        );
    }
    for base_name in &report.name_collisions {
        println!(
            "  {}  {}",
            s.warn.apply_to(format!("Overwritten {}/", base_name)),
            s.label.apply_to("several videos share this output folder")
        );
    }
    if !report.skipped.is_empty() || !report.name_collisions.is_empty() {
        println!();
    }

    if let Some(ref overall) = report.overall {
        println!(
            "  {}  {}",
            s.header.apply_to("All videos"),
            s.label.apply_to(format!("{} frames", report.total_frames()))
        );
        for (variant, avg) in overall.iter() {
            print_metric_row(&s, variant, &avg.as_pair());
        }
        if let Some(ref path) = report.overall_report_path {
            println!(
                "    {:<24}{}",
                s.label.apply_to("Report"),
                s.path.apply_to(path.display())
            );
        }
        println!();
    }
}

/// Metric rows for a single image, used by the `enhance` command.
pub fn print_metric_table(rows: &[(Variant, MetricPair)]) {
    let s = Styles::new();
    for (variant, pair) in rows {
        print_metric_row(&s, *variant, pair);
    }
}

fn print_metric_row(s: &Styles, variant: Variant, pair: &MetricPair) {
    println!(
        "    {:<24}{}  {}",
        s.label.apply_to(variant.label()),
        s.value.apply_to(format!("MSE {:>8.2}", pair.mse)),
        s.value.apply_to(format!("PSNR {:>6.2} dB", pair.psnr))
    );
}
