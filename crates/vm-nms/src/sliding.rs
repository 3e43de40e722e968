//! Dense extraction with per-column partial extrema.
//!
//! For each scanned row the vertical span `[y - radius, y + radius]` of every
//! column is reduced once to its two largest keys (see [`Polarity::key`]).
//! Each window then merges `2 * radius + 1` column summaries instead of
//! visiting `(2 * radius + 1)^2` pixels, and successive windows along the row
//! share those summaries.
//!
//! Keeping the runner-up (with multiplicity) makes the strict rule exact: the
//! center beats every neighbor iff it equals the window maximum and the
//! runner-up is smaller.

use vm_core::ImageView;

use crate::exclude::Exclusions;
use crate::extractor::{Sink, validated};
use crate::rule::{Polarity, Rule, scan_range, window};
use crate::{Error, NonMaxConfig, NonMaxInputs, NonMaxSuppression, PointList};

/// Largest and second-largest key of a multiset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Top2 {
    first: Option<f32>,
    second: Option<f32>,
}

impl Top2 {
    const EMPTY: Self = Self {
        first: None,
        second: None,
    };

    #[inline]
    fn push(&mut self, v: f32) {
        match self.first {
            None => self.first = Some(v),
            Some(f) if v > f => {
                self.second = Some(f);
                self.first = Some(v);
            }
            Some(_) => self.second = Some(self.second.map_or(v, |s| s.max(v))),
        }
    }

    #[inline]
    fn merge(&mut self, other: &Self) {
        if let Some(v) = other.first {
            self.push(v);
        }
        if let Some(v) = other.second {
            self.push(v);
        }
    }

    /// `key` is the window center, which is itself part of the multiset.
    #[inline]
    fn center_wins(&self, key: f32, strict: bool) -> bool {
        let Some(first) = self.first else {
            return true;
        };
        if key < first {
            return false;
        }
        !strict || self.second.is_none_or(|s| key > s)
    }
}

#[derive(Debug, Clone)]
pub struct SlidingNonMax {
    config: NonMaxConfig,
    exclusions: Exclusions,
    columns_max: Vec<Top2>,
    columns_min: Vec<Top2>,
}

impl SlidingNonMax {
    pub fn new(config: NonMaxConfig) -> Result<Self, Error> {
        Ok(Self {
            config: validated(config)?,
            exclusions: Exclusions::default(),
            columns_max: Vec::new(),
            columns_min: Vec::new(),
        })
    }
}

/// Reduces rows `[y0, y1]` of every column to its top-two keys.
fn summarize_columns(
    img: &ImageView<'_, f32>,
    y0: usize,
    y1: usize,
    polarity: Polarity,
    columns: &mut Vec<Top2>,
) {
    columns.clear();
    columns.resize(img.width(), Top2::EMPTY);
    for y in y0..=y1 {
        for (col, &v) in columns.iter_mut().zip(img.row(y)) {
            col.push(polarity.key(v));
        }
    }
}

#[inline]
fn window_wins(columns: &[Top2], x0: usize, x1: usize, key: f32, strict: bool) -> bool {
    let mut top = Top2::EMPTY;
    for col in &columns[x0..=x1] {
        top.merge(col);
    }
    top.center_wins(key, strict)
}

impl NonMaxSuppression for SlidingNonMax {
    fn config(&self) -> &NonMaxConfig {
        &self.config
    }

    fn set_config(&mut self, config: NonMaxConfig) -> Result<(), Error> {
        self.config = validated(config)?;
        tracing::debug!(config = ?self.config, "sliding-window non-max reconfigured");
        Ok(())
    }

    fn uses_candidates(&self) -> bool {
        false
    }

    fn process(
        &mut self,
        intensity: &ImageView<'_, f32>,
        inputs: &NonMaxInputs<'_>,
        found_min: Option<&mut PointList>,
        found_max: Option<&mut PointList>,
    ) {
        let Self {
            config,
            exclusions,
            columns_max,
            columns_min,
        } = self;

        let mut sink = Sink::new(found_min, found_max);
        let want = sink.wants(config);
        let (w, h) = (intensity.width(), intensity.height());
        let border = config.ignore_border;
        let (Some((x0, x1)), Some((y0, y1))) = (scan_range(w, border), scan_range(h, border))
        else {
            return;
        };
        if !want.any() {
            return;
        }

        let radius = config.radius;
        let rule = Rule::new(config);
        exclusions.rebuild(w, h, radius, inputs.exclude_max, inputs.exclude_min, want);

        // Maxima summaries are also needed to give maxima precedence.
        let need_max = config.detect_maximums;
        let need_min = want.min;

        for y in y0..y1 {
            let (wy0, wy1) = window(y, radius, h);
            if need_max {
                summarize_columns(intensity, wy0, wy1, Polarity::Max, columns_max);
            }
            if need_min {
                summarize_columns(intensity, wy0, wy1, Polarity::Min, columns_min);
            }

            let row = intensity.row(y);
            for x in x0..x1 {
                let v = row[x];
                let (wx0, wx1) = window(x, radius, w);
                let accepted = rule.decide(v, want, exclusions.blocked(x, y), |p| {
                    let columns = match p {
                        Polarity::Max => &columns_max[..],
                        Polarity::Min => &columns_min[..],
                    };
                    window_wins(columns, wx0, wx1, p.key(v), rule.strict)
                });
                sink.record(x, y, accepted);
            }
        }

        let (minima, maxima) = sink.counts();
        tracing::debug!(width = w, height = h, minima, maxima, "sliding-window non-max scan");
    }
}
