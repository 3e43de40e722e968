use vm_core::{ImageView, Point2i};

use crate::rule::Flags;
use crate::{
    CandidateNonMax, DenseNonMax, Error, NonMaxConfig, NonMaxKind, PointList, SlidingNonMax,
};

/// Optional read-only point sets consumed by a scan. `None` is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonMaxInputs<'a> {
    /// Candidate minima, used by [`NonMaxKind::Candidate`] only.
    pub candidates_min: Option<&'a [Point2i]>,
    /// Candidate maxima, used by [`NonMaxKind::Candidate`] only.
    pub candidates_max: Option<&'a [Point2i]>,
    /// Known minima that suppress detections around them.
    pub exclude_min: Option<&'a [Point2i]>,
    /// Known maxima that suppress detections around them.
    pub exclude_max: Option<&'a [Point2i]>,
}

impl<'a> NonMaxInputs<'a> {
    pub fn with_candidates(mut self, min: Option<&'a [Point2i]>, max: Option<&'a [Point2i]>) -> Self {
        self.candidates_min = min;
        self.candidates_max = max;
        self
    }

    pub fn with_excludes(mut self, min: Option<&'a [Point2i]>, max: Option<&'a [Point2i]>) -> Self {
        self.exclude_min = min;
        self.exclude_max = max;
        self
    }
}

/// Local extremum extraction from an intensity map.
pub trait NonMaxSuppression {
    fn config(&self) -> &NonMaxConfig;

    /// Validates and installs a new configuration. On error the previous
    /// configuration stays in effect.
    fn set_config(&mut self, config: NonMaxConfig) -> Result<(), Error>;

    /// True when the extractor reads `candidates_*` instead of every pixel.
    fn uses_candidates(&self) -> bool;

    fn can_detect_minimums(&self) -> bool {
        self.config().detect_minimums
    }

    fn can_detect_maximums(&self) -> bool {
        self.config().detect_maximums
    }

    /// Resets the provided output lists and fills them with detections in
    /// scan order. A polarity is scanned only when it is enabled and its
    /// output list is provided.
    fn process(
        &mut self,
        intensity: &ImageView<'_, f32>,
        inputs: &NonMaxInputs<'_>,
        found_min: Option<&mut PointList>,
        found_max: Option<&mut PointList>,
    );
}

/// Output lists of one scan.
pub(crate) struct Sink<'o> {
    min: Option<&'o mut PointList>,
    max: Option<&'o mut PointList>,
}

impl<'o> Sink<'o> {
    pub(crate) fn new(min: Option<&'o mut PointList>, max: Option<&'o mut PointList>) -> Self {
        let mut sink = Self { min, max };
        if let Some(list) = sink.min.as_deref_mut() {
            list.reset();
        }
        if let Some(list) = sink.max.as_deref_mut() {
            list.reset();
        }
        sink
    }

    pub(crate) fn wants(&self, cfg: &NonMaxConfig) -> Flags {
        Flags {
            max: cfg.detect_maximums && self.max.is_some(),
            min: cfg.detect_minimums && self.min.is_some(),
        }
    }

    #[inline]
    pub(crate) fn record(&mut self, x: usize, y: usize, accepted: Flags) {
        let p = Point2i::new(x as i32, y as i32);
        if accepted.max {
            if let Some(list) = self.max.as_deref_mut() {
                list.push(p);
            }
        }
        if accepted.min {
            if let Some(list) = self.min.as_deref_mut() {
                list.push(p);
            }
        }
    }

    pub(crate) fn counts(&self) -> (usize, usize) {
        (
            self.min.as_deref().map_or(0, |l| l.len()),
            self.max.as_deref().map_or(0, |l| l.len()),
        )
    }
}

pub(crate) fn validated(config: NonMaxConfig) -> Result<NonMaxConfig, Error> {
    config.validate()?;
    Ok(config)
}

/// Closed set of extraction strategies behind one interface.
#[derive(Debug, Clone)]
pub enum NonMaxExtractor {
    Dense(DenseNonMax),
    Candidate(CandidateNonMax),
    SlidingWindow(SlidingNonMax),
}

impl NonMaxExtractor {
    pub fn new(kind: NonMaxKind, config: NonMaxConfig) -> Result<Self, Error> {
        tracing::debug!(kind = kind.name(), ?config, "creating non-max extractor");
        Ok(match kind {
            NonMaxKind::Dense => Self::Dense(DenseNonMax::new(config)?),
            NonMaxKind::Candidate => Self::Candidate(CandidateNonMax::new(config)?),
            NonMaxKind::SlidingWindow => Self::SlidingWindow(SlidingNonMax::new(config)?),
        })
    }

    pub fn kind(&self) -> NonMaxKind {
        match self {
            Self::Dense(_) => NonMaxKind::Dense,
            Self::Candidate(_) => NonMaxKind::Candidate,
            Self::SlidingWindow(_) => NonMaxKind::SlidingWindow,
        }
    }

    fn inner(&self) -> &dyn NonMaxSuppression {
        match self {
            Self::Dense(e) => e,
            Self::Candidate(e) => e,
            Self::SlidingWindow(e) => e,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn NonMaxSuppression {
        match self {
            Self::Dense(e) => e,
            Self::Candidate(e) => e,
            Self::SlidingWindow(e) => e,
        }
    }
}

impl NonMaxSuppression for NonMaxExtractor {
    fn config(&self) -> &NonMaxConfig {
        self.inner().config()
    }

    fn set_config(&mut self, config: NonMaxConfig) -> Result<(), Error> {
        self.inner_mut().set_config(config)
    }

    fn uses_candidates(&self) -> bool {
        self.inner().uses_candidates()
    }

    fn process(
        &mut self,
        intensity: &ImageView<'_, f32>,
        inputs: &NonMaxInputs<'_>,
        found_min: Option<&mut PointList>,
        found_max: Option<&mut PointList>,
    ) {
        self.inner_mut()
            .process(intensity, inputs, found_min, found_max);
    }
}
