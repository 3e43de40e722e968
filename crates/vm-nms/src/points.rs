use core::ops::Deref;

use vm_core::Point2i;

/// Append-only point buffer that is reset, not reallocated, between frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointList {
    points: Vec<Point2i>,
}

impl PointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Empties the list and keeps its allocation.
    pub fn reset(&mut self) {
        self.points.clear();
    }

    pub fn push(&mut self, point: Point2i) {
        self.points.push(point);
    }

    pub fn add(&mut self, x: i32, y: i32) {
        self.points.push(Point2i::new(x, y));
    }

    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    pub fn as_slice(&self) -> &[Point2i] {
        &self.points
    }
}

impl Deref for PointList {
    type Target = [Point2i];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl From<Vec<Point2i>> for PointList {
    fn from(points: Vec<Point2i>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point2i> for PointList {
    fn from_iter<I: IntoIterator<Item = Point2i>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<Point2i> for PointList {
    fn extend<I: IntoIterator<Item = Point2i>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<'a> IntoIterator for &'a PointList {
    type Item = &'a Point2i;
    type IntoIter = core::slice::Iter<'a, Point2i>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
