use std::collections::BTreeMap;

use crate::{GridError, Shape};

/// Component id stored in a [`LabelField`]. `0` is background.
pub type Label = u32;

/// Binarized foreground of a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    shape: Shape,
    data: Vec<bool>,
}

impl Mask {
    pub fn new(shape: Shape, data: Vec<bool>) -> Result<Self, GridError> {
        check_len(shape, data.len())?;
        Ok(Self { shape, data })
    }

    pub(crate) fn from_parts(shape: Shape, data: Vec<bool>) -> Self {
        debug_assert_eq!(shape.len(), data.len());
        Self { shape, data }
    }

    /// All-background mask.
    pub fn empty(shape: Shape) -> Self {
        Self {
            shape,
            data: vec![false; shape.len()],
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
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
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    pub fn get(&self, index: &[usize]) -> Result<bool, GridError> {
        Ok(self.data[self.shape.offset(index)?])
    }

    pub fn set(&mut self, index: &[usize], value: bool) -> Result<(), GridError> {
        let offset = self.shape.offset(index)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Number of foreground cells.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Swap foreground and background.
    pub fn inverted(&self) -> Mask {
        Mask {
            shape: self.shape,
            data: self.data.iter().map(|&v| !v).collect(),
        }
    }
}

/// Connected-component labels over a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelField {
    shape: Shape,
    data: Vec<Label>,
}

impl LabelField {
    pub fn new(shape: Shape, data: Vec<Label>) -> Result<Self, GridError> {
        check_len(shape, data.len())?;
        Ok(Self { shape, data })
    }

    /// All-background field.
    pub fn zeros(shape: Shape) -> Self {
        Self {
            shape,
            data: vec![0; shape.len()],
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
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
    pub fn as_slice(&self) -> &[Label] {
        &self.data
    }

    /// Mutable access to the ids; the length (and so the shape) is fixed.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Label] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<Label> {
        self.data
    }

    /// New field with every id passed through `f`.
    pub fn map_labels(&self, f: impl Fn(Label) -> Label) -> LabelField {
        LabelField {
            shape: self.shape,
            data: self.data.iter().map(|&l| f(l)).collect(),
        }
    }

    pub fn get(&self, index: &[usize]) -> Result<Label, GridError> {
        Ok(self.data[self.shape.offset(index)?])
    }

    /// Largest id present, `0` for an all-background field.
    pub fn max_label(&self) -> Label {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Cells per non-zero id, ascending by id.
    ///
    /// Keyed by the ids present, so sparse ids cost nothing extra.
    pub fn counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for &l in self.data.iter().filter(|&&l| l != 0) {
            *counts.entry(l).or_insert(0) += 1;
        }
        counts
    }

    /// Number of distinct non-zero ids.
    pub fn num_components(&self) -> usize {
        self.counts().len()
    }

    /// Foreground mask of all labelled cells.
    pub fn foreground(&self) -> Mask {
        Mask {
            shape: self.shape,
            data: self.data.iter().map(|&l| l != 0).collect(),
        }
    }
}

fn check_len(shape: Shape, got: usize) -> Result<(), GridError> {
    if got != shape.len() {
        return Err(GridError::BufferLength {
            expected: shape.len(),
            got,
            extents: shape.extents().to_vec(),
        });
    }
    Ok(())
}
