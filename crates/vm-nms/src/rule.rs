//! Threshold and neighborhood predicates shared by every extractor.

use vm_core::ImageView;

use crate::NonMaxConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Polarity {
    Max,
    Min,
}

impl Polarity {
    /// Maps a value so that an extremum of this polarity is a maximum of the
    /// key. Negation is exact, so minima reuse the maxima comparisons.
    #[inline]
    pub(crate) fn key(self, v: f32) -> f32 {
        match self {
            Self::Max => v,
            Self::Min => -v,
        }
    }

    #[inline]
    pub(crate) fn passes_threshold(self, v: f32, threshold: f32) -> bool {
        self.key(v) >= threshold
    }

    #[inline]
    pub(crate) fn beats(self, v: f32, neighbor: f32, strict: bool) -> bool {
        let (a, b) = (self.key(v), self.key(neighbor));
        if strict { a > b } else { a >= b }
    }
}

/// One flag per polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Flags {
    pub(crate) max: bool,
    pub(crate) min: bool,
}

impl Flags {
    pub(crate) const NONE: Self = Self {
        max: false,
        min: false,
    };

    pub(crate) fn any(self) -> bool {
        self.max || self.min
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rule {
    threshold_max: f32,
    threshold_min: f32,
    pub(crate) strict: bool,
    detect_max: bool,
}

impl Rule {
    pub(crate) fn new(cfg: &NonMaxConfig) -> Self {
        Self {
            threshold_max: cfg.threshold,
            threshold_min: cfg.min_threshold(),
            strict: cfg.strict,
            detect_max: cfg.detect_maximums,
        }
    }

    /// Accept/reject decision for one pixel of value `v`.
    ///
    /// `want` selects the polarities to report, `blocked` the polarities
    /// suppressed by exclusion at this pixel. `wins` runs the neighborhood
    /// comparison and is only invoked when the threshold passes. A pixel that
    /// passes the maximum test (threshold and neighborhood, exclusion
    /// ignored) is never reported as a minimum.
    #[inline]
    pub(crate) fn decide(
        &self,
        v: f32,
        want: Flags,
        blocked: Flags,
        mut wins: impl FnMut(Polarity) -> bool,
    ) -> Flags {
        let report_max = want.max && !blocked.max;
        let max_candidate = self.detect_max && Polarity::Max.passes_threshold(v, self.threshold_max);
        let min_candidate =
            want.min && !blocked.min && Polarity::Min.passes_threshold(v, self.threshold_min);

        let is_max = max_candidate && (report_max || min_candidate) && wins(Polarity::Max);
        let is_min = min_candidate && !is_max && wins(Polarity::Min);

        Flags {
            max: report_max && is_max,
            min: is_min,
        }
    }
}

/// Index range `[c - radius, c + radius]` clipped to `[0, len)`.
#[inline]
pub(crate) fn window(c: usize, radius: usize, len: usize) -> (usize, usize) {
    (c.saturating_sub(radius), c.saturating_add(radius).min(len - 1))
}

/// Reference neighborhood test: `(x, y)` beats every in-bounds pixel of its
/// window except itself.
pub(crate) fn neighborhood_wins(
    img: &ImageView<'_, f32>,
    x: usize,
    y: usize,
    radius: usize,
    polarity: Polarity,
    strict: bool,
) -> bool {
    let v = img.row(y)[x];
    let (x0, x1) = window(x, radius, img.width());
    let (y0, y1) = window(y, radius, img.height());

    for ny in y0..=y1 {
        let row = img.row(ny);
        for (nx, &n) in row[x0..=x1].iter().enumerate() {
            if ny == y && x0 + nx == x {
                continue;
            }
            if !polarity.beats(v, n, strict) {
                return false;
            }
        }
    }
    true
}

/// Scan region `[border, len - border)`; `None` when empty.
pub(crate) fn scan_range(len: usize, border: usize) -> Option<(usize, usize)> {
    let end = len.saturating_sub(border);
    (border < end).then_some((border, end))
}
