use crate::{GridError, Mask, Sample, Shape};

/// Borrowed view over caller-owned samples (row-major, `len == shape.len()`).
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a, T: Sample> {
    shape: Shape,
    data: &'a [T],
}

impl<'a, T: Sample> GridView<'a, T> {
    pub fn new(shape: Shape, data: &'a [T]) -> Result<Self, GridError> {
        if data.len() != shape.len() {
            return Err(GridError::BufferLength {
                expected: shape.len(),
                got: data.len(),
                extents: shape.extents().to_vec(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Wrap a raw buffer described by its per-axis extents.
    pub fn from_slice(extents: &[usize], data: &'a [T]) -> Result<Self, GridError> {
        Self::new(Shape::new(extents)?, data)
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn extents(&self) -> &[usize] {
        self.shape.extents()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Bounds-checked read by multi-index.
    pub fn get(&self, index: &[usize]) -> Result<T, GridError> {
        Ok(self.data[self.shape.offset(index)?])
    }

    /// Samples widened to `f64`, in storage order.
    pub fn values_f64(&self) -> impl Iterator<Item = f64> + 'a {
        self.data.iter().map(|&v| v.to_f64())
    }

    /// Same-shape mask of the cells whose widened value satisfies `pred`.
    pub fn mask_where(&self, pred: impl Fn(f64) -> bool) -> Mask {
        Mask::from_parts(self.shape, self.values_f64().map(pred).collect())
    }
}

/// Owned dense grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T: Sample> {
    shape: Shape,
    data: Vec<T>,
}

impl<T: Sample> Grid<T> {
    pub fn new(shape: Shape, data: Vec<T>) -> Result<Self, GridError> {
        GridView::new(shape, &data)?;
        Ok(Self { shape, data })
    }

    /// Grid of `shape` with every cell set to `value`.
    pub fn filled(shape: Shape, value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }

    #[inline]
    pub fn view(&self) -> GridView<'_, T> {
        GridView {
            shape: self.shape,
            data: &self.data,
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn get(&self, index: &[usize]) -> Result<T, GridError> {
        self.view().get(index)
    }

    /// Bounds-checked write by multi-index.
    pub fn set(&mut self, index: &[usize], value: T) -> Result<(), GridError> {
        let offset = self.shape.offset(index)?;
        self.data[offset] = value;
        Ok(())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_checks_buffer_length() {
        let data = [0u8; 11];
        let err = GridView::from_slice(&[3, 4], &data).unwrap_err();
        assert_eq!(
            err,
            GridError::BufferLength {
                expected: 12,
                got: 11,
                extents: vec![3, 4],
            }
        );
    }

    #[test]
    fn get_reads_row_major() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let view = GridView::from_slice(&[3, 4], &data).expect("view");
        assert_eq!(view.get(&[2, 1]), Ok(9.0));
        assert!(matches!(
            view.get(&[3, 0]),
            Err(GridError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn owned_grid_set_and_get() {
        let shape = Shape::new_3d(2, 2, 2).expect("shape");
        let mut grid = Grid::filled(shape, 0i16);
        grid.set(&[1, 0, 1], -7).expect("set");
        assert_eq!(grid.get(&[1, 0, 1]), Ok(-7));
        assert_eq!(grid.view().as_slice()[5], -7);
        assert!(grid.set(&[2, 0, 0], 1).is_err());
    }
}
