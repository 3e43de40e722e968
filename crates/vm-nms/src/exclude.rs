use vm_core::Point2i;

use crate::rule::Flags;

/// Raster of pixels suppressed by previously accepted features.
///
/// Every pixel within Chebyshev distance `radius` of an excluded point is
/// blocked, including pixels reached from points that lie outside the view.
/// The raster is sized to the current view and reused across frames.
#[derive(Debug, Clone, Default)]
pub struct ExclusionMask {
    width: usize,
    height: usize,
    active: bool,
    cells: Vec<bool>,
}

impl ExclusionMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the mask for a `width x height` view. `None` or an empty list
    /// deactivates it.
    pub fn rebuild(
        &mut self,
        width: usize,
        height: usize,
        radius: usize,
        points: Option<&[Point2i]>,
    ) {
        self.width = width;
        self.height = height;

        let points = match points {
            Some(p) if !p.is_empty() && width > 0 && height > 0 => p,
            _ => {
                self.active = false;
                return;
            }
        };

        self.active = true;
        self.cells.clear();
        self.cells.resize(width * height, false);

        let r = i64::try_from(radius).unwrap_or(i64::MAX);
        let (w, h) = (width as i64, height as i64);
        for p in points {
            let (px, py) = (i64::from(p.x), i64::from(p.y));
            let x0 = px.saturating_sub(r).max(0);
            let x1 = px.saturating_add(r).min(w - 1);
            let y0 = py.saturating_sub(r).max(0);
            let y1 = py.saturating_add(r).min(h - 1);
            if x0 > x1 || y0 > y1 {
                continue;
            }

            for y in y0 as usize..=y1 as usize {
                let row = y * width;
                self.cells[row + x0 as usize..=row + x1 as usize].fill(true);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Caller guarantees `x < width` and `y < height` of the last rebuild.
    #[inline]
    pub fn is_blocked(&self, x: usize, y: usize) -> bool {
        self.active && self.cells[y * self.width + x]
    }

    pub fn blocked_count(&self) -> usize {
        if !self.active {
            return 0;
        }
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Masks for both polarities.
#[derive(Debug, Clone, Default)]
pub(crate) struct Exclusions {
    max: ExclusionMask,
    min: ExclusionMask,
}

impl Exclusions {
    pub(crate) fn rebuild(
        &mut self,
        width: usize,
        height: usize,
        radius: usize,
        exclude_max: Option<&[Point2i]>,
        exclude_min: Option<&[Point2i]>,
        want: Flags,
    ) {
        self.max
            .rebuild(width, height, radius, exclude_max.filter(|_| want.max));
        self.min
            .rebuild(width, height, radius, exclude_min.filter(|_| want.min));
    }

    #[inline]
    pub(crate) fn blocked(&self, x: usize, y: usize) -> Flags {
        Flags {
            max: self.max.is_blocked(x, y),
            min: self.min.is_blocked(x, y),
        }
    }
}
