use std::ops::Deref;

use super::tuple::{FieldGetFailure, Tuple};

/// A tuple decoded from one row, with any fields that failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub tuple: T,
    pub failures: Vec<FieldGetFailure>,
}

impl<T> Decoded<T> {
    /// True when every field decoded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_inner(self) -> T {
        self.tuple
    }
}

impl<T> Deref for Decoded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.tuple
    }
}

/// A field failure together with the index of the row it occurred in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub failure: FieldGetFailure,
}

/// Every tuple of a query result, in row order.
///
/// Rows with undecodable fields are still present; their failures are listed
/// in [`TupleList::failures`].
#[derive(Debug, Clone, PartialEq)]
pub struct TupleList<T> {
    tuples: Vec<T>,
    failures: Vec<RowFailure>,
}

impl<T> Default for TupleList<T> {
    fn default() -> Self {
        Self {
            tuples: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T: Tuple> TupleList<T> {
    pub fn push(&mut self, decoded: Decoded<T>) {
        let row = self.tuples.len();
        self.failures.extend(
            decoded
                .failures
                .into_iter()
                .map(|failure| RowFailure { row, failure }),
        );
        self.tuples.push(decoded.tuple);
    }
}

impl<T> TupleList<T> {
    #[must_use]
    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.tuples
    }
}

impl<T> Deref for TupleList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.tuples
    }
}

impl<T> IntoIterator for TupleList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a TupleList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}
