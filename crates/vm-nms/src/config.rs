use serde::{Deserialize, Serialize};

use crate::Error;

/// Extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonMaxKind {
    /// Full-window test at every pixel.
    Dense,
    /// Full-window test at caller-supplied candidates only.
    Candidate,
    /// Dense output computed from per-column partial extrema.
    #[default]
    SlidingWindow,
}

impl NonMaxKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Candidate => "candidate",
            Self::SlidingWindow => "sliding_window",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonMaxConfig {
    /// Window half-width; the window spans `2 * radius + 1` pixels. Zero
    /// disables the neighborhood comparison.
    pub radius: usize,
    /// Maxima need `v >= threshold`.
    pub threshold: f32,
    /// Minima need `v <= -threshold_min`; `None` reuses `threshold`.
    pub threshold_min: Option<f32>,
    /// Margin, in pixels, that never produces a detection.
    pub ignore_border: usize,
    /// `>` / `<` against neighbors when set, `>=` / `<=` otherwise.
    pub strict: bool,
    pub detect_maximums: bool,
    pub detect_minimums: bool,
}

impl Default for NonMaxConfig {
    fn default() -> Self {
        Self {
            radius: 1,
            threshold: 0.0,
            threshold_min: None,
            ignore_border: 0,
            strict: true,
            detect_maximums: true,
            detect_minimums: false,
        }
    }
}

impl NonMaxConfig {
    /// Radius and ignored border both equal to `radius`, so every detection
    /// has a complete window.
    pub fn with_separation(radius: usize) -> Self {
        Self {
            radius,
            ignore_border: radius,
            ..Self::default()
        }
    }

    /// Threshold applied to minima.
    pub fn min_threshold(&self) -> f32 {
        self.threshold_min.unwrap_or(self.threshold)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for threshold in [self.threshold, self.min_threshold()] {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(Error::InvalidThreshold(threshold));
            }
        }
        if !self.detect_maximums && !self.detect_minimums {
            return Err(Error::NoPolarity);
        }
        Ok(())
    }
}
