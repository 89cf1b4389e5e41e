//! Sequence container with a hard length cap.

use std::ops::Index;

use thiserror::Error;

/// Default cap, large enough for any realistic build and small enough to
/// stop a runaway loop.
pub const MAX_ITERATION: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundedError {
    #[error("list cap of {cap} entries exceeded")]
    CapExceeded { cap: usize },
}

/// A `Vec` that refuses to grow past its cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedList<T> {
    items: Vec<T>,
    cap: usize,
}

impl<T> BoundedList<T> {
    pub fn new() -> Self {
        Self::with_cap(MAX_ITERATION)
    }

    pub fn with_cap(cap: usize) -> Self {
        BoundedList {
            items: Vec::new(),
            cap,
        }
    }

    /// Append an item. On error the list is left unchanged.
    pub fn push_back(&mut self, item: T) -> Result<&mut T, BoundedError> {
        if self.items.len() >= self.cap {
            return Err(BoundedError::CapExceeded { cap: self.cap });
        }
        self.items.push(item);
        let last = self.items.len() - 1;
        Ok(&mut self.items[last])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for BoundedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for BoundedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a BoundedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for BoundedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
