//! Per-pixel grids
//!
//! Row-major 2D storage for direction fields, validity masks and lookup tables.

use std::ops::Index;

use glam::DVec3;
use rayon::prelude::*;

/// A row-major grid with one value per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Unit direction per pixel
pub type DirectionField = Grid<DVec3>;

/// Whether a projector pixel reaches the dome
pub type ValidityMask = Grid<bool>;

impl<T: Send> Grid<T> {
    /// Build a grid by evaluating `f(row, col)` for every pixel in parallel.
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> T + Sync + Send,
    {
        let data = (0..rows * cols)
            .into_par_iter()
            .map(|i| f(i / cols, i % cols))
            .collect();
        Self { rows, cols, data }
    }

    /// Map every value to a new grid of the same shape in parallel.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.par_iter().map(f).collect(),
        }
    }
}

impl<T> Grid<T> {
    /// Wrap row-major data. Returns `None` if the length does not match.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at (row, col), or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows && col < self.cols {
            self.data.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// One row of values.
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over `((row, col), value)` in row-major order.
    pub fn indexed_iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, value)| ((i / cols, i % cols), value))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "pixel ({}, {}) outside {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}
