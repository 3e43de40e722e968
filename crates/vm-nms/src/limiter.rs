//! Ranking and truncation of extracted extrema.

use serde::{Deserialize, Serialize};
use vm_core::{ImageView, Point2i};

use crate::{
    Error, NonMaxConfig, NonMaxExtractor, NonMaxInputs, NonMaxKind, NonMaxSuppression, PointList,
};

/// Extremum with its unsigned response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalExtreme {
    /// Absolute intensity at `location`.
    pub intensity: f32,
    pub is_max: bool,
    pub location: Point2i,
}

impl LocalExtreme {
    pub fn signed_intensity(&self) -> f32 {
        if self.is_max {
            self.intensity
        } else {
            -self.intensity
        }
    }
}

/// Chooses at most `limit` entries out of `candidates`.
///
/// Implementations may take spatial layout into account; [`SelectNBest`]
/// ranks by intensity alone.
pub trait SelectLimit {
    fn select(
        &mut self,
        candidates: &[LocalExtreme],
        limit: usize,
        selected: &mut Vec<LocalExtreme>,
    );
}

/// Keeps the `limit` most intense entries, highest first. Equal intensities
/// keep their input order.
#[derive(Debug, Clone, Default)]
pub struct SelectNBest {
    order: Vec<usize>,
}

impl SelectLimit for SelectNBest {
    fn select(
        &mut self,
        candidates: &[LocalExtreme],
        limit: usize,
        selected: &mut Vec<LocalExtreme>,
    ) {
        selected.clear();
        if limit == 0 {
            return;
        }

        self.order.clear();
        self.order.extend(0..candidates.len());

        let by_rank = |a: &usize, b: &usize| {
            candidates[*b]
                .intensity
                .total_cmp(&candidates[*a].intensity)
                .then(a.cmp(b))
        };

        if limit < self.order.len() {
            self.order.select_nth_unstable_by(limit - 1, by_rank);
            self.order.truncate(limit);
        }
        self.order.sort_unstable_by(by_rank);
        selected.extend(self.order.iter().map(|&i| candidates[i]));
    }
}

/// Combines minima and maxima into [`LocalExtreme`]s and caps their count.
#[derive(Debug, Clone)]
pub struct FeatureLimiter<S = SelectNBest> {
    max_total: usize,
    selector: S,
    all: Vec<LocalExtreme>,
    selected: Vec<LocalExtreme>,
}

impl FeatureLimiter {
    /// `max_total == 0` disables the limit.
    pub fn new(max_total: usize) -> Self {
        Self::with_selector(max_total, SelectNBest::default())
    }
}

impl<S: SelectLimit> FeatureLimiter<S> {
    pub fn with_selector(max_total: usize, selector: S) -> Self {
        Self {
            max_total,
            selector,
            all: Vec::new(),
            selected: Vec::new(),
        }
    }

    pub fn max_total(&self) -> usize {
        self.max_total
    }

    pub fn set_max_total(&mut self, max_total: usize) {
        self.max_total = max_total;
    }

    pub fn selected(&self) -> &[LocalExtreme] {
        &self.selected
    }

    /// Without a limit, or when everything fits, the result is every minimum
    /// followed by every maximum in input order. Otherwise the selector
    /// decides. Locations outside `intensity` are dropped.
    pub fn process(
        &mut self,
        intensity: &ImageView<'_, f32>,
        found_min: &[Point2i],
        found_max: &[Point2i],
    ) -> &[LocalExtreme] {
        self.all.clear();
        push_extremes(&mut self.all, intensity, found_min, false);
        push_extremes(&mut self.all, intensity, found_max, true);

        if self.max_total == 0 || self.all.len() <= self.max_total {
            self.selected.clear();
            self.selected.extend_from_slice(&self.all);
        } else {
            self.selector
                .select(&self.all, self.max_total, &mut self.selected);
            tracing::debug!(
                available = self.all.len(),
                kept = self.selected.len(),
                "feature limit applied"
            );
        }

        &self.selected
    }
}

fn push_extremes(
    out: &mut Vec<LocalExtreme>,
    intensity: &ImageView<'_, f32>,
    points: &[Point2i],
    is_max: bool,
) {
    for &location in points {
        let (Ok(x), Ok(y)) = (usize::try_from(location.x), usize::try_from(location.y)) else {
            continue;
        };
        let Some(&v) = intensity.get(x, y) else {
            continue;
        };
        out.push(LocalExtreme {
            intensity: v.abs(),
            is_max,
            location,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonMaxLimitedConfig {
    pub kind: NonMaxKind,
    pub nonmax: NonMaxConfig,
    /// Zero keeps every detection.
    pub max_total: usize,
}

impl Default for NonMaxLimitedConfig {
    fn default() -> Self {
        Self {
            kind: NonMaxKind::default(),
            nonmax: NonMaxConfig::default(),
            max_total: 0,
        }
    }
}

/// Extractor, its output lists and a limiter bundled for per-frame use.
#[derive(Debug, Clone)]
pub struct NonMaxLimited {
    extractor: NonMaxExtractor,
    limiter: FeatureLimiter,
    found_min: PointList,
    found_max: PointList,
}

impl NonMaxLimited {
    pub fn new(extractor: NonMaxExtractor, max_total: usize) -> Self {
        Self {
            extractor,
            limiter: FeatureLimiter::new(max_total),
            found_min: PointList::new(),
            found_max: PointList::new(),
        }
    }

    pub fn from_config(config: &NonMaxLimitedConfig) -> Result<Self, Error> {
        let extractor = NonMaxExtractor::new(config.kind, config.nonmax.clone())?;
        Ok(Self::new(extractor, config.max_total))
    }

    pub fn extractor(&self) -> &NonMaxExtractor {
        &self.extractor
    }

    pub fn extractor_mut(&mut self) -> &mut NonMaxExtractor {
        &mut self.extractor
    }

    pub fn limiter_mut(&mut self) -> &mut FeatureLimiter {
        &mut self.limiter
    }

    /// Unlimited minima of the last call.
    pub fn found_min(&self) -> &PointList {
        &self.found_min
    }

    /// Unlimited maxima of the last call.
    pub fn found_max(&self) -> &PointList {
        &self.found_max
    }

    pub fn process(
        &mut self,
        intensity: &ImageView<'_, f32>,
        inputs: &NonMaxInputs<'_>,
    ) -> &[LocalExtreme] {
        self.extractor.process(
            intensity,
            inputs,
            Some(&mut self.found_min),
            Some(&mut self.found_max),
        );
        self.limiter
            .process(intensity, &self.found_min, &self.found_max)
    }
}

#[cfg(test)]
mod tests {
    use vm_core::{Image, Point2i};

    use super::{
        FeatureLimiter, LocalExtreme, NonMaxLimited, NonMaxLimitedConfig, SelectLimit,
        SelectNBest,
    };
    use crate::{NonMaxConfig, NonMaxInputs, NonMaxKind};

    fn ranking_image() -> Image<f32> {
        let mut img = Image::new_fill(8, 6, 0.0f32);
        img.set(1, 1, 5.0);
        img.set(5, 1, 9.0);
        img.set(3, 4, -20.0);
        img
    }

    #[test]
    fn ranks_by_absolute_intensity() {
        let img = ranking_image();
        let found_max = [Point2i::new(1, 1), Point2i::new(5, 1)];
        let found_min = [Point2i::new(3, 4)];

        let mut limiter = FeatureLimiter::new(2);
        let selected = limiter.process(&img.as_view(), &found_min, &found_max);

        assert_eq!(
            selected,
            &[
                LocalExtreme {
                    intensity: 20.0,
                    is_max: false,
                    location: Point2i::new(3, 4),
                },
                LocalExtreme {
                    intensity: 9.0,
                    is_max: true,
                    location: Point2i::new(5, 1),
                },
            ]
        );
        assert_eq!(selected[0].signed_intensity(), -20.0);
        assert!(selected.iter().all(|e| e.location != Point2i::new(1, 1)));
    }

    #[test]
    fn unlimited_returns_minima_then_maxima() {
        let img = ranking_image();
        let found_max = [Point2i::new(1, 1), Point2i::new(5, 1)];
        let found_min = [Point2i::new(3, 4)];

        for max_total in [0, 3, 10] {
            let mut limiter = FeatureLimiter::new(max_total);
            let first = limiter
                .process(&img.as_view(), &found_min, &found_max)
                .to_vec();
            let again = limiter.process(&img.as_view(), &found_min, &found_max);
            assert_eq!(first.as_slice(), again);

            let locations: Vec<Point2i> = first.iter().map(|e| e.location).collect();
            assert_eq!(
                locations,
                vec![Point2i::new(3, 4), Point2i::new(1, 1), Point2i::new(5, 1)]
            );
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let candidates: Vec<LocalExtreme> = (0..6)
            .map(|i| LocalExtreme {
                intensity: if i % 2 == 0 { 1.0 } else { 2.0 },
                is_max: true,
                location: Point2i::new(i, 0),
            })
            .collect();

        let mut selector = SelectNBest::default();
        let mut selected = Vec::new();
        selector.select(&candidates, 4, &mut selected);

        let xs: Vec<i32> = selected.iter().map(|e| e.location.x).collect();
        assert_eq!(xs, vec![1, 3, 5, 0]);

        selector.select(&candidates, 0, &mut selected);
        assert!(selected.is_empty());
    }

    #[test]
    fn signed_zero_maxima_tie_in_input_order() {
        let mut img = Image::new_fill(3, 1, 0.0f32);
        img.set(0, 0, -0.0);
        let found_max = [Point2i::new(1, 0), Point2i::new(0, 0), Point2i::new(2, 0)];

        let mut limiter = FeatureLimiter::new(2);
        let selected = limiter.process(&img.as_view(), &[], &found_max);

        let locations: Vec<Point2i> = selected.iter().map(|e| e.location).collect();
        assert_eq!(locations, vec![Point2i::new(1, 0), Point2i::new(0, 0)]);
        assert!(selected.iter().all(|e| e.intensity.is_sign_positive()));
    }

    #[test]
    fn drops_locations_outside_the_map() {
        let img = ranking_image();
        let mut limiter = FeatureLimiter::new(0);
        let selected = limiter.process(
            &img.as_view(),
            &[Point2i::new(-1, 0), Point2i::new(8, 0)],
            &[Point2i::new(5, 1)],
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].location, Point2i::new(5, 1));
    }

    #[test]
    fn limited_pipeline_reuses_buffers() {
        let img = ranking_image();
        let cfg = NonMaxLimitedConfig {
            kind: NonMaxKind::Dense,
            nonmax: NonMaxConfig {
                threshold: 1.0,
                detect_minimums: true,
                ..NonMaxConfig::default()
            },
            max_total: 2,
        };
        let mut pipeline = NonMaxLimited::from_config(&cfg).expect("valid config");

        for _ in 0..2 {
            let selected = pipeline
                .process(&img.as_view(), &NonMaxInputs::default())
                .to_vec();
            assert_eq!(selected.len(), 2);
            assert_eq!(selected[0].signed_intensity(), -20.0);
            assert_eq!(selected[1].signed_intensity(), 9.0);
            assert_eq!(pipeline.found_max().len(), 2);
            assert_eq!(pipeline.found_min().len(), 1);
        }

        pipeline.limiter_mut().set_max_total(0);
        assert_eq!(
            pipeline
                .process(&img.as_view(), &NonMaxInputs::default())
                .len(),
            3
        );
    }
}
