use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice;

/// Row-major 2D grid of samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// True when both buffers have the same width and height.
    #[inline]
    pub fn same_size<U>(&self, other: &Buffer2<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.pixels.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.pixels.iter_mut()
    }

    /// Build a new buffer of the same size by applying `f` to every sample.
    pub fn map<U, F>(&self, f: F) -> Buffer2<U>
    where
        F: FnMut(&T) -> U,
    {
        Buffer2 {
            pixels: self.pixels.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl<T> Deref for Buffer2<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl<T> DerefMut for Buffer2<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stores_dimensions() {
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.len(), 6);
        assert!(!buf.is_empty());
    }

    #[test]
    #[should_panic(expected = "pixels length must equal width * height")]
    fn test_new_panics_on_size_mismatch() {
        Buffer2::new(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_buffer() {
        let buf: Buffer2<f32> = Buffer2::new(0, 0, Vec::new());
        assert!(buf.is_empty());
        assert_eq!(buf.iter().count(), 0);
    }

    #[test]
    fn test_new_filled() {
        let filled = Buffer2::new_filled(2, 3, 42u8);
        assert_eq!(filled.len(), 6);
        assert!(filled.iter().all(|&v| v == 42));
    }

    #[test]
    fn test_index_is_row_major() {
        // row 0 = [10, 20, 30], row 1 = [40, 50, 60]
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(buf[(2, 0)], 30);
        assert_eq!(buf[(0, 1)], 40);
        assert_eq!(buf[(2, 1)], 60);
    }

    #[test]
    fn test_index_mut_and_iter_mut() {
        let mut buf = Buffer2::new(2, 2, vec![1, 2, 3, 4]);
        buf[(1, 1)] = 77;
        for v in buf.iter_mut() {
            *v += 1;
        }
        assert_eq!(buf.pixels(), &[2, 3, 4, 78]);
    }

    #[test]
    fn test_same_size_ignores_sample_type() {
        let a = Buffer2::new_filled(3, 2, 0.0f32);
        let b = Buffer2::new_filled(3, 2, 0u8);
        let c = Buffer2::new_filled(2, 3, 0u8);
        assert!(a.same_size(&b));
        // Same sample count, different shape
        assert!(!a.same_size(&c));
    }

    #[test]
    fn test_map_keeps_shape() {
        let buf = Buffer2::new(2, 1, vec![1.5f32, 2.5]);
        let mapped = buf.map(|&v| (v * 2.0) as u8);
        assert!(mapped.same_size(&buf));
        assert_eq!(mapped.pixels(), &[3, 5]);
    }
}
