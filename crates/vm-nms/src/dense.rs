use vm_core::ImageView;

use crate::exclude::Exclusions;
use crate::extractor::{Sink, validated};
use crate::rule::{Rule, neighborhood_wins, scan_range};
use crate::{Error, NonMaxConfig, NonMaxInputs, NonMaxSuppression, PointList};

/// Reference extractor: every pixel of the scan region is compared against
/// its complete window.
#[derive(Debug, Clone)]
pub struct DenseNonMax {
    config: NonMaxConfig,
    exclusions: Exclusions,
}

impl DenseNonMax {
    pub fn new(config: NonMaxConfig) -> Result<Self, Error> {
        Ok(Self {
            config: validated(config)?,
            exclusions: Exclusions::default(),
        })
    }
}

impl NonMaxSuppression for DenseNonMax {
    fn config(&self) -> &NonMaxConfig {
        &self.config
    }

    fn set_config(&mut self, config: NonMaxConfig) -> Result<(), Error> {
        self.config = validated(config)?;
        tracing::debug!(config = ?self.config, "dense non-max reconfigured");
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

        for y in y0..y1 {
            let row = intensity.row(y);
            for x in x0..x1 {
                let accepted = rule.decide(row[x], want, self.exclusions.blocked(x, y), |p| {
                    neighborhood_wins(intensity, x, y, radius, p, rule.strict)
                });
                sink.record(x, y, accepted);
            }
        }

        let (minima, maxima) = sink.counts();
        tracing::debug!(width = w, height = h, minima, maxima, "dense non-max scan");
    }
}
