// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Slide
//!
//! A sliding window of fixed-height columns.  The newest column is always at index 0 and every
//! push shifts the older columns one place to the right, discarding the last.  Storage is column
//! major so that a push is one `copy_within` followed by one `copy_from_slice`, and storage is
//! never resized after construction.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::vec::Vec;

/// Shape violations.  A slide never reshapes itself to fit its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideError {
    /// A pushed column did not match the slide height.
    Height { expected: usize, found: usize },
}

impl core::fmt::Display for SlideError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SlideError::Height { expected, found } => {
                write!(f, "column height {found} does not match slide height {expected}")
            }
        }
    }
}

impl core::error::Error for SlideError {}

/// Fixed-size history of columns, newest first.
#[derive(Debug, Clone)]
pub struct Slide<T> {
    height: usize,
    width: usize,
    storage: Vec<T>,
}

impl<T: Copy + Default> Slide<T> {
    /// Allocate a slide filled with `T::default()`.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            storage: alloc::vec![T::default(); height * width],
        }
    }

    /// Insert `column` at index 0 and drop the oldest column.  A rejected column changes nothing.
    pub fn push(&mut self, column: &[T]) -> Result<(), SlideError> {
        if column.len() != self.height {
            return Err(SlideError::Height {
                expected: self.height,
                found: column.len(),
            });
        }
        if self.width == 0 {
            return Ok(());
        }
        let h = self.height;
        self.storage.copy_within(0..(self.width - 1) * h, h);
        self.storage[..h].copy_from_slice(column);
        Ok(())
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Column `col`, where 0 is the newest.
    pub fn column(&self, col: usize) -> Option<&[T]> {
        if col >= self.width {
            return None;
        }
        let h = self.height;
        Some(&self.storage[col * h..(col + 1) * h])
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.height {
            return None;
        }
        self.column(col).map(|c| c[row])
    }

    /// Raw column-major contents.
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }
}
