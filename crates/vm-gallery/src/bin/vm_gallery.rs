use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{GrayImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use vm_core::{Image, ImageView, Point2i, to_f32};
use vm_nms::{
    LocalExtreme, NonMaxConfig, NonMaxExtractor, NonMaxInputs, NonMaxKind, NonMaxLimited,
    NonMaxLimitedConfig, NonMaxSuppression, PointList,
};

#[derive(Parser, Debug)]
#[command(name = "vm_gallery")]
#[command(about = "Run vision-metrology algorithms on external fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and rank local extrema of an 8-bit image.
    #[command(name = "nms")]
    Nms(NmsArgs),
    /// Check that dense and sliding-window extraction agree.
    #[command(name = "compare")]
    Compare(CompareArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum KindArg {
    Dense,
    Candidate,
    #[value(name = "sliding_window")]
    SlidingWindow,
}

impl From<KindArg> for NonMaxKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Dense => NonMaxKind::Dense,
            KindArg::Candidate => NonMaxKind::Candidate,
            KindArg::SlidingWindow => NonMaxKind::SlidingWindow,
        }
    }
}

/// Overrides on top of the defaults or the `--config` file.
#[derive(Args, Debug, Clone)]
struct TuningArgs {
    #[arg(long)]
    radius: Option<usize>,
    #[arg(long)]
    threshold: Option<f32>,
    /// Minimum threshold when it differs from `--threshold`.
    #[arg(long)]
    threshold_min: Option<f32>,
    #[arg(long)]
    ignore_border: Option<usize>,
    #[arg(long)]
    non_strict: bool,
    #[arg(long)]
    minimums: bool,
}

impl TuningArgs {
    fn apply(&self, cfg: &mut NonMaxConfig) {
        if let Some(radius) = self.radius {
            cfg.radius = radius;
        }
        if let Some(threshold) = self.threshold {
            cfg.threshold = threshold;
        }
        if let Some(threshold) = self.threshold_min {
            cfg.threshold_min = Some(threshold);
        }
        if let Some(border) = self.ignore_border {
            cfg.ignore_border = border;
        }
        if self.non_strict {
            cfg.strict = false;
        }
        if self.minimums {
            cfg.detect_minimums = true;
        }
    }
}

#[derive(Args, Debug, Clone)]
struct NmsArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    #[command(flatten)]
    tuning: TuningArgs,
    /// Zero keeps every detection.
    #[arg(long)]
    max_features: Option<usize>,
    /// JSON `NonMaxLimitedConfig`; flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct CompareArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Debug, Clone, Serialize)]
struct FeaturesDto<'a> {
    width: usize,
    height: usize,
    minima_found: usize,
    maxima_found: usize,
    features: &'a [LocalExtreme],
}

#[derive(Debug, Clone, Serialize)]
struct MetaNms<'a> {
    kind: &'static str,
    config: &'a NonMaxLimitedConfig,
    candidates: Option<usize>,
    elapsed_ms: f64,
    intensity: &'static str,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Nms(args) => run_nms(args),
        Command::Compare(args) => run_compare(args),
    }
}

fn run_nms(args: NmsArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            ensure_file_exists(path, "config")?;
            read_json::<NonMaxLimitedConfig>(path)?
        }
        None => NonMaxLimitedConfig::default(),
    };
    if let Some(kind) = args.kind {
        config.kind = kind.into();
    }
    args.tuning.apply(&mut config.nonmax);
    if let Some(max) = args.max_features {
        config.max_total = max;
    }

    let input = load_input_u8(&args.input)?;
    let intensity = to_f32(&input.as_view());
    let view = intensity.as_view();

    let mut pipeline = NonMaxLimited::from_config(&config)
        .with_context(|| format!("invalid non-max config {config:?}"))?;

    let (cand_min, cand_max) = if pipeline.extractor().uses_candidates() {
        threshold_candidates(&view, &config.nonmax)
    } else {
        (Vec::new(), Vec::new())
    };
    let inputs = if pipeline.extractor().uses_candidates() {
        NonMaxInputs::default().with_candidates(Some(&cand_min), Some(&cand_max))
    } else {
        NonMaxInputs::default()
    };

    let start = Instant::now();
    let features = pipeline.process(&view, &inputs).to_vec();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    tracing::info!(
        kind = config.kind.name(),
        minima = pipeline.found_min().len(),
        maxima = pipeline.found_max().len(),
        kept = features.len(),
        elapsed_ms,
        "non-max suppression finished"
    );

    let case_dir = args.out.join("nms");
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;

    write_json(
        case_dir.join("features.json"),
        &FeaturesDto {
            width: view.width(),
            height: view.height(),
            minima_found: pipeline.found_min().len(),
            maxima_found: pipeline.found_max().len(),
            features: &features,
        },
    )?;
    write_json(
        case_dir.join("meta.json"),
        &MetaNms {
            kind: config.kind.name(),
            config: &config,
            candidates: pipeline
                .extractor()
                .uses_candidates()
                .then(|| cand_min.len() + cand_max.len()),
            elapsed_ms,
            intensity: "8-bit luma as f32",
        },
    )?;

    let overlay = render_extrema_overlay(&input, &features)?;
    overlay
        .save(case_dir.join("overlay.png"))
        .with_context(|| format!("saving overlay in {}", case_dir.display()))?;

    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let mut cfg = NonMaxConfig::default();
    args.tuning.apply(&mut cfg);

    let input = load_input_u8(&args.input)?;
    let intensity = to_f32(&input.as_view());
    let view = intensity.as_view();

    let dense = extract(NonMaxKind::Dense, &cfg, &view)?;
    let sliding = extract(NonMaxKind::SlidingWindow, &cfg, &view)?;

    for (name, d, s) in [("minima", &dense.0, &sliding.0), ("maxima", &dense.1, &sliding.1)] {
        if d != s {
            let first = d
                .iter()
                .zip(s.iter())
                .position(|(a, b)| a != b)
                .unwrap_or(d.len().min(s.len()));
            bail!(
                "{name} differ: dense found {}, sliding window found {}, first mismatch at index {first}.",
                d.len(),
                s.len()
            );
        }
    }

    tracing::info!(
        minima = dense.0.len(),
        maxima = dense.1.len(),
        "dense and sliding-window outputs match"
    );
    Ok(())
}

fn extract(
    kind: NonMaxKind,
    cfg: &NonMaxConfig,
    view: &ImageView<'_, f32>,
) -> Result<(PointList, PointList)> {
    let mut extractor = NonMaxExtractor::new(kind, cfg.clone())
        .with_context(|| format!("invalid non-max config {cfg:?}"))?;
    let mut found_min = PointList::new();
    let mut found_max = PointList::new();

    let start = Instant::now();
    extractor.process(
        view,
        &NonMaxInputs::default(),
        Some(&mut found_min),
        Some(&mut found_max),
    );
    tracing::info!(
        kind = kind.name(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
        "extraction finished"
    );

    Ok((found_min, found_max))
}

/// Pixels passing the threshold, per polarity, in row-major order.
fn threshold_candidates(
    view: &ImageView<'_, f32>,
    cfg: &NonMaxConfig,
) -> (Vec<Point2i>, Vec<Point2i>) {
    let mut minima = Vec::new();
    let mut maxima = Vec::new();
    for y in 0..view.height() {
        for (x, &v) in view.row(y).iter().enumerate() {
            let p = Point2i::new(x as i32, y as i32);
            if cfg.detect_maximums && v >= cfg.threshold {
                maxima.push(p);
            }
            if cfg.detect_minimums && -v >= cfg.min_threshold() {
                minima.push(p);
            }
        }
    }
    (minima, maxima)
}

fn load_input_u8(path: &Path) -> Result<Image<u8>> {
    ensure_file_exists(path, "input")?;
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing vm-core image from {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

/// Maxima in red, minima in blue.
fn render_extrema_overlay(input: &Image<u8>, features: &[LocalExtreme]) -> Result<RgbImage> {
    let gray = GrayImage::from_raw(
        input.width() as u32,
        input.height() as u32,
        input.data().to_vec(),
    )
    .context("constructing GrayImage from raw bytes")?;
    let mut rgb = image::DynamicImage::ImageLuma8(gray).to_rgb8();

    for f in features {
        let color = if f.is_max {
            Rgb([255, 64, 64])
        } else {
            Rgb([64, 128, 255])
        };
        draw_dot(&mut rgb, f.location, color);
    }

    Ok(rgb)
}

fn draw_dot(img: &mut RgbImage, center: Point2i, color: Rgb<u8>) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let nx = center.x + dx;
            let ny = center.y + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (ux, uy) = (nx as u32, ny as u32);
            if ux >= img.width() || uy >= img.height() {
                continue;
            }
            img.put_pixel(ux, uy, color);
        }
    }
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
