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

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use scoped_pool::Pool;
use tracing::{debug, info};

use crate::accumulator::SimilarityMatrixAccumulator;
use crate::error::{BuildError, BuildResult};
use crate::index::BuildContext;
use crate::similarity::ItemSimilarity;
use crate::types::{self, CandidateSet, ItemId};
use crate::utils;

/// Build strategy that avoids computing similarities between items with disjoint sets of
/// raters. Candidate neighbors of an item are gathered from the histories of its raters. For
/// symmetric similarity functions, only candidates with a smaller id are scored and the score
/// is mirrored, so that every unordered pair is computed exactly once.
pub struct SparseModelBuildStrategy<S> {
    similarity: S,
    symmetric: bool,
}

/// Build strategy that scores all pairs of items, as required by similarity functions which
/// can be non-zero for items without common raters.
pub struct DenseModelBuildStrategy<S> {
    similarity: S,
    symmetric: bool,
}

/// The build strategy for a similarity function, fixed once from its declared capabilities.
pub enum BuildStrategy<S> {
    Dense(DenseModelBuildStrategy<S>),
    Sparse(SparseModelBuildStrategy<S>),
}

impl<S: ItemSimilarity> SparseModelBuildStrategy<S> {

    /// Fails with `BuildError::InvalidArgument` if the similarity function is not sparse, as
    /// the strategy would silently omit pairs the function expects to see.
    pub fn new(similarity: S) -> BuildResult<Self> {
        if !similarity.is_sparse() {
            return Err(BuildError::InvalidArgument(
                String::from("similarity function is not sparse")));
        }
        let symmetric = similarity.is_symmetric();
        Ok(SparseModelBuildStrategy { similarity, symmetric })
    }

    pub fn needs_user_item_sets(&self) -> bool {
        true
    }

    pub fn similarity(&self) -> &S {
        &self.similarity
    }

    pub fn build_matrix<C, A>(&self, context: &C, accumulator: &A) -> BuildResult<()>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        check_user_item_sets(context)?;

        let build_start = Instant::now();
        let mut candidates = types::new_candidate_set();
        let mut num_scored: usize = 0;

        for item in context.items().iter() {
            num_scored += self.build_row(*item, context, accumulator, &mut candidates)?;
        }

        log_build("sparse", context.items().len(), num_scored, build_start);

        Ok(())
    }

    /// Partitions the items across `num_threads` workers, each with a private candidate set.
    pub fn build_matrix_parallel<C, A>(
        &self,
        context: &C,
        accumulator: &A,
        num_threads: usize,
    ) -> BuildResult<()>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        check_user_item_sets(context)?;
        check_num_threads(num_threads)?;

        let build_start = Instant::now();

        let num_scored = build_in_parallel(
            context.items().as_slice(),
            num_threads,
            |item, candidates| self.build_row(item, context, accumulator, candidates),
        )?;

        log_build("sparse", context.items().len(), num_scored, build_start);

        Ok(())
    }

    /// Scores all candidate neighbors of `item` and returns how many similarities were
    /// computed.
    fn build_row<C, A>(
        &self,
        item: ItemId,
        context: &C,
        accumulator: &A,
        candidates: &mut CandidateSet,
    ) -> BuildResult<usize>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        candidates.clear();

        let vector = context.item_vector(item);

        for user in vector.key_set().iter() {
            let user_items = context.user_items(*user);
            let user_items = if self.symmetric {
                user_items.head_set(item)
            } else {
                user_items.as_slice()
            };
            candidates.extend(user_items.iter().cloned());
        }

        let mut num_scored = 0;

        for other_item in candidates.iter() {
            let other_item = *other_item;

            if other_item == item {
                continue;
            }

            let score = self.similarity
                .similarity(other_item, context.item_vector(other_item), item, vector)
                .map_err(|source| {
                    BuildError::Similarity { row: item, column: other_item, source }
                })?;

            accumulator.put(item, other_item, score);
            if self.symmetric {
                accumulator.put(other_item, item, score);
            }
            num_scored += 1;
        }

        candidates.clear();

        Ok(num_scored)
    }
}

impl<S: ItemSimilarity> DenseModelBuildStrategy<S> {

    pub fn new(similarity: S) -> Self {
        let symmetric = similarity.is_symmetric();
        DenseModelBuildStrategy { similarity, symmetric }
    }

    pub fn needs_user_item_sets(&self) -> bool {
        false
    }

    pub fn similarity(&self) -> &S {
        &self.similarity
    }

    pub fn build_matrix<C, A>(&self, context: &C, accumulator: &A) -> BuildResult<()>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        let build_start = Instant::now();
        let mut num_scored: usize = 0;

        for item in context.items().iter() {
            num_scored += self.build_row(*item, context, accumulator)?;
        }

        log_build("dense", context.items().len(), num_scored, build_start);

        Ok(())
    }

    pub fn build_matrix_parallel<C, A>(
        &self,
        context: &C,
        accumulator: &A,
        num_threads: usize,
    ) -> BuildResult<()>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        check_num_threads(num_threads)?;

        let build_start = Instant::now();

        let num_scored = build_in_parallel(
            context.items().as_slice(),
            num_threads,
            |item, _| self.build_row(item, context, accumulator),
        )?;

        log_build("dense", context.items().len(), num_scored, build_start);

        Ok(())
    }

    fn build_row<C, A>(&self, item: ItemId, context: &C, accumulator: &A) -> BuildResult<usize>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        let vector = context.item_vector(item);

        let other_items = if self.symmetric {
            context.items().head_set(item)
        } else {
            context.items().as_slice()
        };

        let mut num_scored = 0;

        for other_item in other_items.iter() {
            let other_item = *other_item;

            if other_item == item {
                continue;
            }

            let score = self.similarity
                .similarity(other_item, context.item_vector(other_item), item, vector)
                .map_err(|source| {
                    BuildError::Similarity { row: item, column: other_item, source }
                })?;

            accumulator.put(item, other_item, score);
            if self.symmetric {
                accumulator.put(other_item, item, score);
            }
            num_scored += 1;
        }

        Ok(num_scored)
    }
}

impl<S: ItemSimilarity> BuildStrategy<S> {

    /// Picks the sparse strategy for sparse similarity functions and the dense one otherwise.
    pub fn select(similarity: S) -> Self {
        let symmetric = similarity.is_symmetric();
        if similarity.is_sparse() {
            BuildStrategy::Sparse(SparseModelBuildStrategy { similarity, symmetric })
        } else {
            BuildStrategy::Dense(DenseModelBuildStrategy { similarity, symmetric })
        }
    }

    pub fn is_sparse(&self) -> bool {
        match self {
            BuildStrategy::Dense(_) => false,
            BuildStrategy::Sparse(_) => true,
        }
    }

    /// Whether the rating index must materialize the user->items reverse index.
    pub fn needs_user_item_sets(&self) -> bool {
        match self {
            BuildStrategy::Dense(strategy) => strategy.needs_user_item_sets(),
            BuildStrategy::Sparse(strategy) => strategy.needs_user_item_sets(),
        }
    }

    pub fn build_matrix<C, A>(&self, context: &C, accumulator: &A) -> BuildResult<()>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        match self {
            BuildStrategy::Dense(strategy) => strategy.build_matrix(context, accumulator),
            BuildStrategy::Sparse(strategy) => strategy.build_matrix(context, accumulator),
        }
    }

    pub fn build_matrix_parallel<C, A>(
        &self,
        context: &C,
        accumulator: &A,
        num_threads: usize,
    ) -> BuildResult<()>
        where C: BuildContext + ?Sized, A: SimilarityMatrixAccumulator + ?Sized {

        match self {
            BuildStrategy::Dense(strategy) =>
                strategy.build_matrix_parallel(context, accumulator, num_threads),
            BuildStrategy::Sparse(strategy) =>
                strategy.build_matrix_parallel(context, accumulator, num_threads),
        }
    }
}

fn check_user_item_sets<C: BuildContext + ?Sized>(context: &C) -> BuildResult<()> {
    if context.has_user_item_sets() {
        Ok(())
    } else {
        Err(BuildError::MissingUserItemSets)
    }
}

fn check_num_threads(num_threads: usize) -> BuildResult<()> {
    if num_threads == 0 {
        Err(BuildError::InvalidArgument(String::from("number of threads must be positive")))
    } else {
        Ok(())
    }
}

fn log_build(strategy: &str, num_items: usize, num_scored: usize, build_start: Instant) {
    info!(
        strategy,
        num_items,
        num_scored,
        millis = utils::to_millis(build_start.elapsed()),
        "built similarity matrix"
    );
}

/// Runs `build_row` for all items on a pool of `num_threads` workers. The first failure stops
/// the remaining workers at their next row and is returned; the accumulator must then be
/// discarded.
fn build_in_parallel<F>(items: &[ItemId], num_threads: usize, build_row: F) -> BuildResult<usize>
    where F: Fn(ItemId, &mut CandidateSet) -> BuildResult<usize> + Sync {

    let pool = Pool::new(num_threads);

    let failure: Mutex<Option<BuildError>> = Mutex::new(None);
    let aborted = AtomicBool::new(false);
    let num_scored = AtomicUsize::new(0);

    pool.scoped(|scope| {
        for chunk in items.chunks(utils::chunk_size(items.len(), num_threads)) {

            let build_row = &build_row;
            let failure = &failure;
            let aborted = &aborted;
            let num_scored = &num_scored;

            scope.execute(move || {
                let mut candidates = types::new_candidate_set();
                let mut num_scored_in_chunk: usize = 0;

                for item in chunk {
                    if aborted.load(Ordering::Relaxed) {
                        return;
                    }

                    match build_row(*item, &mut candidates) {
                        Ok(num_scored_for_item) => num_scored_in_chunk += num_scored_for_item,
                        Err(error) => {
                            aborted.store(true, Ordering::Relaxed);
                            let mut failure = failure.lock().unwrap();
                            if failure.is_none() {
                                *failure = Some(error);
                            }
                            return;
                        }
                    }
                }

                num_scored.fetch_add(num_scored_in_chunk, Ordering::Relaxed);
                debug!(num_items = chunk.len(), num_scored = num_scored_in_chunk, "finished chunk");
            });
        }
    });

    pool.shutdown();

    match failure.into_inner().unwrap() {
        Some(error) => Err(error),
        None => Ok(num_scored.into_inner()),
    }
}
