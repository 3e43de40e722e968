use vm_core::ImageView;

use crate::exclude::Exclusions;
use crate::extractor::{Sink, validated};
use crate::rule::{Flags, Rule, neighborhood_wins, scan_range};
use crate::{Error, NonMaxConfig, NonMaxInputs, NonMaxSuppression, PointList};

/// Sparse extractor: only caller-supplied candidates are tested, each against
/// its complete window in the intensity map.
///
/// Output follows candidate order. Candidates outside the scan region are
/// skipped.
#[derive(Debug, Clone)]
pub struct CandidateNonMax {
    config: NonMaxConfig,
    exclusions: Exclusions,
}

impl CandidateNonMax {
    pub fn new(config: NonMaxConfig) -> Result<Self, Error> {
        Ok(Self {
            config: validated(config)?,
            exclusions: Exclusions::default(),
        })
    }
}

impl NonMaxSuppression for CandidateNonMax {
    fn config(&self) -> &NonMaxConfig {
        &self.config
    }

    fn set_config(&mut self, config: NonMaxConfig) -> Result<(), Error> {
        self.config = validated(config)?;
        tracing::debug!(config = ?self.config, "candidate non-max reconfigured");
        Ok(())
    }

    fn uses_candidates(&self) -> bool {
        true
    }

    fn process(
        &mut self,
        intensity: &ImageView<'_, f32>,
        inputs: &NonMaxInputs<'_>,
        found_min: Option<&mut PointList>,
        found_max: Option<&mut PointList>,
    ) {
        let mut sink = Sink::new(found_min, found_max);
        let want = sink.wants(&self.config);
        let (w, h) = (intensity.width(), intensity.height());
        let border = self.config.ignore_border;
        let (Some((x0, x1)), Some((y0, y1))) = (scan_range(w, border), scan_range(h, border))
        else {
            return;
        };
        if !want.any() {
            return;
        }

        let radius = self.config.radius;
        let rule = Rule::new(&self.config);
        self.exclusions
            .rebuild(w, h, radius, inputs.exclude_max, inputs.exclude_min, want);

        let passes = [
            (
                Flags {
                    max: want.max,
                    ..Flags::NONE
                },
                inputs.candidates_max,
            ),
            (
                Flags {
                    min: want.min,
                    ..Flags::NONE
                },
                inputs.candidates_min,
            ),
        ];

        let (rx0, ry0, rx1, ry1) = (x0 as i32, y0 as i32, x1 as i32, y1 as i32);
        let mut skipped = 0usize;
        for (pass, candidates) in passes {
            if !pass.any() {
                continue;
            }
            for &p in candidates.unwrap_or_default() {
                if !p.in_region(rx0, ry0, rx1, ry1) {
                    skipped += 1;
                    continue;
                }
                let (x, y) = (p.x as usize, p.y as usize);
                let v = intensity.row(y)[x];
                let accepted = rule.decide(v, pass, self.exclusions.blocked(x, y), |pol| {
                    neighborhood_wins(intensity, x, y, radius, pol, rule.strict)
                });
                sink.record(x, y, accepted);
            }
        }

        if skipped > 0 {
            tracing::trace!(skipped, "candidates outside the scan region");
        }
        let (minima, maxima) = sink.counts();
        tracing::debug!(width = w, height = h, minima, maxima, "candidate non-max scan");
    }
}
