//! Example: ranked peaks and valleys of a synthetic blob response.
//!
//! Builds a response map with a handful of Gaussian blobs of both signs,
//! extracts extrema with `NonMaxLimited` and prints the kept features as
//! JSON. An optional argument names a JSON file holding a
//! `NonMaxLimitedConfig`; missing fields take their defaults.
//!
//! Run from the workspace root:
//!   cargo run -p vision-metrology --example blob_peaks
//!   cargo run -p vision-metrology --example blob_peaks -- config.json

use anyhow::{Context, Result};
use serde::Serialize;
use vision_metrology::{
    Image, LocalExtreme, NonMaxConfig, NonMaxInputs, NonMaxKind, NonMaxLimited,
    NonMaxLimitedConfig,
};

// ── Scene ─────────────────────────────────────────────────────────────────────

/// `(cx, cy, sigma, amplitude)`; negative amplitudes are valleys.
const BLOBS: [(f32, f32, f32, f32); 6] = [
    (20.0, 18.0, 3.0, 12.0),
    (52.0, 14.0, 2.5, 7.5),
    (75.0, 40.0, 4.0, -15.0),
    (33.0, 50.0, 2.0, 4.0),
    (60.0, 62.0, 3.5, -6.0),
    (88.0, 12.0, 2.0, 9.0),
];

fn render_blobs(width: usize, height: usize) -> Result<Image<f32>> {
    let mut data = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            data[y * width + x] = BLOBS
                .iter()
                .map(|&(cx, cy, sigma, amp)| {
                    let dx = x as f32 - cx;
                    let dy = y as f32 - cy;
                    amp * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
                })
                .sum();
        }
    }
    Image::from_vec(width, height, data).context("building response map")
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report<'a> {
    config: &'a NonMaxLimitedConfig,
    minima_found: usize,
    maxima_found: usize,
    features: &'a [LocalExtreme],
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<NonMaxLimitedConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(NonMaxLimitedConfig {
            kind: NonMaxKind::SlidingWindow,
            nonmax: NonMaxConfig {
                threshold: 1.0,
                detect_minimums: true,
                ..NonMaxConfig::with_separation(3)
            },
            max_total: 4,
        });
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

fn main() -> Result<()> {
    let config = load_config()?;
    let response = render_blobs(100, 80)?;

    let mut extractor = NonMaxLimited::from_config(&config).context("invalid config")?;
    let features = extractor
        .process(&response.as_view(), &NonMaxInputs::default())
        .to_vec();
    let report = Report {
        config: &config,
        minima_found: extractor.found_min().len(),
        maxima_found: extractor.found_max().len(),
        features: &features,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
