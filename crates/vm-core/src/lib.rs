//! Foundational primitives for machine-vision metrology.
//!
//! ## Image Views and Stride
//! Images use element stride (not byte stride). `stride` is the distance, in
//! elements, between adjacent row starts and may be greater than `width`.
//! A subview keeps the parent stride and starts at an offset inside the parent
//! slice, so algorithms written against [`ImageView`] behave identically on a
//! full image and on any rectangular region of it.
//!
//! ## Pixel Coordinates
//! Integer coordinates address pixel `(x, y)` of the view they were produced
//! from, with `x` along a row. [`Point2i`] uses signed components so that
//! callers may hand in locations that fall outside a view; consumers decide
//! whether to skip or clip them.

mod error;
mod geom;
mod image;

pub use error::Error;
pub use geom::Point2i;
pub use image::{Image, ImageView, to_f32};
