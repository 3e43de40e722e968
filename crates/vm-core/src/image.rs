use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    /// Borrowed view of the region `[x, x + width) x [y, y + height)`.
    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageView<'_, T>, Error> {
        self.as_view().subview(x, y, width, height)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Writes one pixel; returns `false` when `(x, y)` is outside the image.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.width + x] = value;
        true
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        if stride < width {
            return Err(Error::InvalidStride);
        }

        let min_len = min_required_len(width, height, stride).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < min_len {
            return Err(Error::SizeMismatch {
                expected: min_len,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.stride + x;
        self.data.get(idx)
    }

    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageView<'a, T>, Error> {
        if x > self.width
            || y > self.height
            || width > (self.width - x)
            || height > (self.height - y)
        {
            return Err(Error::OutOfBounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(Error::OutOfBounds)?;
        let min_len = min_required_len(width, height, self.stride).ok_or(Error::OutOfBounds)?;
        let tail = self.data.get(start..).ok_or(Error::OutOfBounds)?;

        if tail.len() < min_len {
            return Err(Error::OutOfBounds);
        }

        Ok(ImageView {
            width,
            height,
            stride: self.stride,
            data: tail,
        })
    }

    pub fn is_contiguous(&self) -> bool {
        self.stride == self.width
    }
}

impl<T: Copy> ImageView<'_, T> {
    /// Copies the view into a tightly packed image.
    pub fn to_image(&self) -> Image<T> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            data.extend_from_slice(self.row(y));
        }
        Image {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }

    let rows_before_last = height.checked_sub(1)?;
    let base = rows_before_last.checked_mul(stride)?;
    base.checked_add(width)
}

pub fn to_f32(img: &ImageView<'_, u8>) -> Image<f32> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        for &px in img.row(y) {
            out.push(px as f32);
        }
    }

    Image {
        width: img.width(),
        height: img.height(),
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageView, to_f32};
    use crate::Error;

    #[test]
    fn view_indexing_with_stride() {
        let data = vec![1.0f32, 2.0, 3.0, 99.0, 4.0, 5.0, 6.0, 88.0];
        let view = ImageView::from_slice(3, 2, 4, &data).expect("valid view");

        assert_eq!(view.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(view.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(view.get(0, 1), Some(&4.0));
        assert_eq!(view.get(3, 1), None);
        assert!(!view.is_contiguous());
    }

    #[test]
    fn from_slice_rejects_bad_geometry() {
        let data = vec![0.0f32; 7];
        assert_eq!(
            ImageView::from_slice(4, 2, 3, &data).unwrap_err(),
            Error::InvalidStride
        );
        assert_eq!(
            ImageView::from_slice(4, 2, 5, &data).unwrap_err(),
            Error::SizeMismatch {
                expected: 9,
                actual: 7
            }
        );
    }

    #[test]
    fn subview_offsets_origin_and_keeps_stride() {
        let mut backing = Image::new_fill(6, 5, 0.0f32);
        backing.set(3, 2, 7.5);
        let sub = backing.subview(2, 1, 3, 3).expect("valid subview");

        assert_eq!(sub.width(), 3);
        assert_eq!(sub.height(), 3);
        assert_eq!(sub.stride(), 6);
        assert_eq!(sub.get(1, 1), Some(&7.5));
        assert_eq!(sub.row(1), &[0.0, 7.5, 0.0]);

        let nested = sub.subview(1, 1, 2, 2).expect("nested subview");
        assert_eq!(nested.get(0, 0), Some(&7.5));
        assert_eq!(nested.to_image().data(), &[7.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn subview_out_of_bounds() {
        let backing = Image::new_fill(4, 4, 1u8);
        assert_eq!(
            backing.subview(2, 2, 3, 1).unwrap_err(),
            Error::OutOfBounds
        );
        assert!(backing.subview(1, 1, 3, 3).is_ok());
    }

    #[test]
    fn convert_to_f32() {
        let img8 = Image::from_vec(2, 2, vec![1u8, 2, 3, 4]).expect("valid image");
        let out8 = to_f32(&img8.as_view());
        assert_eq!(out8.data(), &[1.0, 2.0, 3.0, 4.0]);
    }
}
