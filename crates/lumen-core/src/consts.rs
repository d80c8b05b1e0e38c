/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Peak sample value of an 8-bit grayscale frame.
pub const MAX_PIXEL_VALUE: f64 = 255.0;

/// Number of intensity bins of an 8-bit histogram.
pub const HISTOGRAM_BINS: usize = 256;

/// ITU-R BT.601 luma coefficients in 14-bit fixed point (R, G, B).
/// They sum to 1 << 14, so a neutral gray converts to itself.
pub const LUMA_R_FIXED: u32 = 4899;
pub const LUMA_G_FIXED: u32 = 9617;
pub const LUMA_B_FIXED: u32 = 1868;
pub const LUMA_SHIFT: u32 = 14;

/// Default lower/upper percentiles for contrast stretching.
pub const DEFAULT_STRETCH_LOW_PERCENTILE: f64 = 2.0;
pub const DEFAULT_STRETCH_HIGH_PERCENTILE: f64 = 98.0;

/// Default CLAHE tile grid and clip limit.
pub const DEFAULT_CLAHE_TILES: usize = 8;
pub const DEFAULT_CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Default median filter kernel (square, odd).
pub const DEFAULT_MEDIAN_KERNEL: usize = 5;

/// Zero-padding width of frame indices in output names.
pub const FRAME_INDEX_WIDTH: usize = 4;

/// Video file extensions picked up by the batch runner.
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "flv"];

/// Image file extensions picked up by the histogram chart tool.
pub const HISTOGRAM_IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// File name of the cross-video report.
pub const OVERALL_REPORT_FILENAME: &str = "overall_metrics.txt";

/// Histogram chart canvas size in pixels (width, height).
pub const HISTOGRAM_CHART_SIZE: (u32, u32) = (640, 480);
