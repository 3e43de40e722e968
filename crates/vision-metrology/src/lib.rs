//! Umbrella crate for the `vision-metrology` workspace.
//!
//! Re-exports the image containers of `vm-core` and the extrema extraction
//! of `vm-nms`. Each crate's error type keeps a distinct name here.

pub use vm_core::{Error as CoreError, Image, ImageView, Point2i, to_f32};
pub use vm_nms::{
    CandidateNonMax, DenseNonMax, Error as NonMaxError, ExclusionMask, FeatureLimiter,
    LocalExtreme, NonMaxConfig, NonMaxExtractor, NonMaxInputs, NonMaxKind, NonMaxLimited,
    NonMaxLimitedConfig, NonMaxSuppression, PointList, SelectLimit, SelectNBest, SlidingNonMax,
};

#[cfg(test)]
mod tests {
    use super::{CoreError, Image, NonMaxConfig, NonMaxError, NonMaxExtractor, NonMaxKind};

    #[test]
    fn both_error_types_are_reachable() {
        let core: CoreError = Image::from_vec(2, 2, vec![0.0f32; 3]).unwrap_err();
        assert_eq!(
            core,
            CoreError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );

        let cfg = NonMaxConfig {
            detect_maximums: false,
            ..NonMaxConfig::default()
        };
        let nms: NonMaxError = NonMaxExtractor::new(NonMaxKind::Dense, cfg).unwrap_err();
        assert_eq!(nms, NonMaxError::NoPolarity);
    }
}
