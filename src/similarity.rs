/**
 * ItemKNN
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use crate::error::{BuildError, BuildResult, SimilarityError};
use crate::types::ItemId;
use crate::vectors::SparseVector;

/// A pluggable item similarity function.
///
/// Implementations must be pure: the score may only depend on the four arguments. Builds rely
/// on this to mirror symmetric scores, to skip pairs without co-raters and to run in parallel.
pub trait ItemSimilarity: Sync {

    /// Whether pairs of items without a common rater can be skipped without changing the
    /// result, i.e. their similarity is zero.
    fn is_sparse(&self) -> bool;

    /// Whether `similarity(a, b) == similarity(b, a)` holds for all pairs.
    fn is_symmetric(&self) -> bool;

    fn similarity(
        &self,
        first: ItemId,
        first_vector: &SparseVector,
        second: ItemId,
        second_vector: &SparseVector,
    ) -> Result<f64, SimilarityError>;
}

impl<'a, S: ItemSimilarity + ?Sized> ItemSimilarity for &'a S {

    fn is_sparse(&self) -> bool {
        (**self).is_sparse()
    }

    fn is_symmetric(&self) -> bool {
        (**self).is_symmetric()
    }

    fn similarity(
        &self,
        first: ItemId,
        first_vector: &SparseVector,
        second: ItemId,
        second_vector: &SparseVector,
    ) -> Result<f64, SimilarityError> {
        (**self).similarity(first, first_vector, second, second_vector)
    }
}

/// Adapts a closure into an `ItemSimilarity` with explicitly declared capabilities.
pub struct FunctionSimilarity<F> {
    function: F,
    sparse: bool,
    symmetric: bool,
}

impl<F> FunctionSimilarity<F>
    where F: Fn(ItemId, &SparseVector, ItemId, &SparseVector) -> Result<f64, SimilarityError>
        + Sync {

    pub fn new(function: F, sparse: bool, symmetric: bool) -> Self {
        FunctionSimilarity { function, sparse, symmetric }
    }
}

impl<F> ItemSimilarity for FunctionSimilarity<F>
    where F: Fn(ItemId, &SparseVector, ItemId, &SparseVector) -> Result<f64, SimilarityError>
        + Sync {

    fn is_sparse(&self) -> bool {
        self.sparse
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    fn similarity(
        &self,
        first: ItemId,
        first_vector: &SparseVector,
        second: ItemId,
        second_vector: &SparseVector,
    ) -> Result<f64, SimilarityError> {
        (self.function)(first, first_vector, second, second_vector)
    }
}

/// Cosine similarity of two rating vectors, optionally damped by adding a constant to the
/// denominator. Items without common raters have a similarity of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosineSimilarity {
    damping: f64,
}

impl CosineSimilarity {

    pub fn new() -> Self {
        CosineSimilarity { damping: 0.0 }
    }

    pub fn with_damping(damping: f64) -> Self {
        CosineSimilarity { damping }
    }

    /// Like `with_damping`, but rejects negative or NaN damping.
    pub fn try_with_damping(damping: f64) -> BuildResult<Self> {
        if damping >= 0.0 {
            Ok(CosineSimilarity { damping })
        } else {
            Err(BuildError::InvalidArgument(
                format!("damping must be non-negative, got {}", damping)))
        }
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }
}

impl Default for CosineSimilarity {
    fn default() -> Self {
        CosineSimilarity::new()
    }
}

impl ItemSimilarity for CosineSimilarity {

    fn is_sparse(&self) -> bool {
        true
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn similarity(
        &self,
        first: ItemId,
        first_vector: &SparseVector,
        second: ItemId,
        second_vector: &SparseVector,
    ) -> Result<f64, SimilarityError> {

        let dot = first_vector.dot(second_vector);
        if dot == 0.0 {
            return Ok(0.0);
        }

        let denominator = first_vector.norm() * second_vector.norm() + self.damping;
        let similarity = dot / denominator;

        if similarity.is_nan() {
            Err(SimilarityError::NotANumber { first, second })
        } else {
            Ok(similarity)
        }
    }
}

/// Checks the symmetry claim of a wrapped similarity function by computing every pair in both
/// directions. Doubles the cost of a build, meant for debugging similarity implementations.
pub struct VerifySymmetry<S> {
    inner: S,
    tolerance: f64,
}

impl<S: ItemSimilarity> VerifySymmetry<S> {

    pub fn new(inner: S) -> Self {
        VerifySymmetry { inner, tolerance: 1e-9 }
    }

    pub fn with_tolerance(inner: S, tolerance: f64) -> Self {
        VerifySymmetry { inner, tolerance }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ItemSimilarity> ItemSimilarity for VerifySymmetry<S> {

    fn is_sparse(&self) -> bool {
        self.inner.is_sparse()
    }

    fn is_symmetric(&self) -> bool {
        self.inner.is_symmetric()
    }

    fn similarity(
        &self,
        first: ItemId,
        first_vector: &SparseVector,
        second: ItemId,
        second_vector: &SparseVector,
    ) -> Result<f64, SimilarityError> {

        let forward = self.inner.similarity(first, first_vector, second, second_vector)?;

        if self.inner.is_symmetric() {
            let backward = self.inner.similarity(second, second_vector, first, first_vector)?;
            if (forward - backward).abs() > self.tolerance {
                return Err(SimilarityError::Asymmetric { first, second, forward, backward });
            }
        }

        Ok(forward)
    }
}
