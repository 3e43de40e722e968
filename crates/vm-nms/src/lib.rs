//! Non-maximum suppression over dense intensity maps.
//!
//! An intensity map (corner response, blob response, ...) is scanned for
//! pixels that are local extrema inside a square window of half-width
//! `radius`. Three interchangeable strategies produce identical output:
//!
//! - [`DenseNonMax`] tests every pixel against its full window.
//! - [`CandidateNonMax`] tests only caller-supplied candidate pixels.
//! - [`SlidingNonMax`] tests every pixel but reuses per-column partial
//!   extrema between neighboring windows.
//!
//! [`NonMaxExtractor`] wraps the three behind [`NonMaxSuppression`] and is
//! built from a [`NonMaxKind`] plus a validated [`NonMaxConfig`].
//!
//! ## Acceptance Rule
//! A pixel `v` inside `[ignore_border, w - ignore_border) x [ignore_border,
//! h - ignore_border)` is a maximum when `v >= threshold` and `v` beats every
//! in-bounds neighbor of its window (`>` when strict, `>=` otherwise).
//! Minima mirror this with `v <= -threshold_min` (`threshold` unless set
//! separately) and `<` / `<=`. Neighbors outside the view are skipped. When
//! both polarities are enabled, a pixel that passes the maximum test is never
//! reported as a minimum.
//!
//! ## Exclusion
//! Exclude lists suppress every candidate within Chebyshev distance `radius`
//! of an excluded point. Suppression happens during the scan, so a known
//! feature keeps its neighborhood clear even though it is not re-reported.
//!
//! ## Buffer Reuse
//! Output [`PointList`]s are owned by the caller and reset at the start of
//! every `process` call. Extractors and [`FeatureLimiter`] keep their scratch
//! buffers between calls.

mod candidate;
mod config;
mod dense;
mod error;
mod exclude;
mod extractor;
mod limiter;
mod points;
mod rule;
mod sliding;

pub use candidate::CandidateNonMax;
pub use config::{NonMaxConfig, NonMaxKind};
pub use dense::DenseNonMax;
pub use error::Error;
pub use exclude::ExclusionMask;
pub use extractor::{NonMaxExtractor, NonMaxInputs, NonMaxSuppression};
pub use limiter::{
    FeatureLimiter, LocalExtreme, NonMaxLimited, NonMaxLimitedConfig, SelectLimit, SelectNBest,
};
pub use points::PointList;
pub use sliding::SlidingNonMax;
