//! Grid extents and index arithmetic.

use serde::{Deserialize, Serialize};

/// Errors raised by grid construction and indexed access.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("index {index:?} is out of bounds for extents {extents:?}")]
    OutOfBounds {
        index: Vec<usize>,
        extents: Vec<usize>,
    },
    #[error("unsupported grid rank {ndim} (expected 2 or 3)")]
    UnsupportedRank { ndim: usize },
    #[error("extents {extents:?} overflow the addressable element count")]
    Overflow { extents: Vec<usize> },
    #[error("buffer holds {got} samples but extents {extents:?} need {expected}")]
    BufferLength {
        expected: usize,
        got: usize,
        extents: Vec<usize>,
    },
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: Vec<usize>,
        right: Vec<usize>,
    },
}

/// Extents of a 2D `(rows, cols)` or 3D `(depth, rows, cols)` grid.
///
/// Storage is row-major with the last axis varying fastest. Internally a 2D
/// shape is carried as a volume of depth 1, so every algorithm can walk
/// `(z, y, x)` coordinates regardless of rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Shape {
    ndim: usize,
    dims: [usize; 3],
}

impl Shape {
    /// Build a shape from 2 or 3 per-axis extents.
    pub fn new(extents: &[usize]) -> Result<Self, GridError> {
        let dims = match *extents {
            [rows, cols] => [1, rows, cols],
            [depth, rows, cols] => [depth, rows, cols],
            _ => {
                return Err(GridError::UnsupportedRank {
                    ndim: extents.len(),
                })
            }
        };
        let shape = Self {
            ndim: extents.len(),
            dims,
        };
        dims.iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| GridError::Overflow {
                extents: extents.to_vec(),
            })?;
        Ok(shape)
    }

    /// 2D shape of `rows × cols`.
    pub fn new_2d(rows: usize, cols: usize) -> Result<Self, GridError> {
        Self::new(&[rows, cols])
    }

    /// 3D shape of `depth × rows × cols`.
    pub fn new_3d(depth: usize, rows: usize, cols: usize) -> Result<Self, GridError> {
        Self::new(&[depth, rows, cols])
    }

    /// Number of axes (2 or 3).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Per-axis extents, outermost axis first.
    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.dims[3 - self.ndim..]
    }

    /// Extents as a `(depth, rows, cols)` volume; depth is 1 for 2D shapes.
    #[inline]
    pub fn volume_dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear offset of a multi-index given in the shape's own rank.
    pub fn offset(&self, index: &[usize]) -> Result<usize, GridError> {
        let extents = self.extents();
        if index.len() != extents.len() || index.iter().zip(extents).any(|(&i, &e)| i >= e) {
            return Err(GridError::OutOfBounds {
                index: index.to_vec(),
                extents: extents.to_vec(),
            });
        }
        Ok(index
            .iter()
            .zip(extents)
            .fold(0usize, |acc, (&i, &e)| acc * e + i))
    }

    /// `(z, y, x)` volume coordinates of a linear offset.
    #[inline]
    pub fn volume_coords(&self, offset: usize) -> [usize; 3] {
        let [_, rows, cols] = self.dims;
        let plane = rows * cols;
        [offset / plane, (offset % plane) / cols, offset % cols]
    }

    /// Drop the padding axis of a volume-ordered triple for 2D shapes.
    #[inline]
    pub fn to_axes<T: Copy>(&self, volume: [T; 3]) -> Vec<T> {
        volume[3 - self.ndim..].to_vec()
    }

    /// Multi-index of a linear offset in the shape's own rank.
    pub fn index(&self, offset: usize) -> Vec<usize> {
        self.to_axes(self.volume_coords(offset))
    }

    /// Fail with [`GridError::ShapeMismatch`] unless both shapes agree.
    pub fn ensure_same(&self, other: &Shape) -> Result<(), GridError> {
        if self == other {
            Ok(())
        } else {
            Err(GridError::ShapeMismatch {
                left: self.extents().to_vec(),
                right: other.extents().to_vec(),
            })
        }
    }
}

impl TryFrom<Vec<usize>> for Shape {
    type Error = GridError;

    fn try_from(extents: Vec<usize>) -> Result<Self, Self::Error> {
        Shape::new(&extents)
    }
}

impl From<Shape> for Vec<usize> {
    fn from(shape: Shape) -> Self {
        shape.extents().to_vec()
    }
}
