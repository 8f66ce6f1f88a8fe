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

use std::collections::BinaryHeap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use fnv::FnvHashMap;
use tracing::{debug, warn};

use crate::model::SimilarityMatrixModel;
use crate::types::{ItemId, ScoredItem};
use crate::vectors::SortedIdSet;

/// Sink for the `(row, column, score)` triples produced by a build strategy. Implementations
/// must tolerate concurrent `put` calls for distinct rows, parallel builds never write the same
/// row from two tasks. No ordering of the calls may be assumed.
pub trait SimilarityMatrixAccumulator: Sync {
    fn put(&self, row: ItemId, column: ItemId, score: f64);
}

/// Records every triple as it arrives.
#[derive(Debug, Default)]
pub struct TripleAccumulator {
    triples: Mutex<Vec<(ItemId, ItemId, f64)>>,
}

impl TripleAccumulator {

    pub fn new() -> Self {
        TripleAccumulator { triples: Mutex::new(Vec::new()) }
    }

    pub fn len(&self) -> usize {
        self.triples.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The triples in insertion order.
    pub fn triples(&self) -> Vec<(ItemId, ItemId, f64)> {
        self.triples.lock().unwrap().clone()
    }

    /// The triples ordered by row and column, for comparisons independent of insertion order.
    pub fn sorted_triples(&self) -> Vec<(ItemId, ItemId, f64)> {
        let mut triples = self.triples();
        triples.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        triples
    }

    pub fn into_triples(self) -> Vec<(ItemId, ItemId, f64)> {
        self.triples.into_inner().unwrap()
    }
}

impl SimilarityMatrixAccumulator for TripleAccumulator {
    fn put(&self, row: ItemId, column: ItemId, score: f64) {
        self.triples.lock().unwrap().push((row, column, score));
    }
}

/// Retains the `model_size` highest scored neighbors per row (all of them if `model_size` is
/// zero), considering only scores above an optional threshold. Rows are sharded, every item of
/// the training population owns a separately locked heap.
pub struct TruncatingAccumulator {
    items: SortedIdSet,
    rows: Vec<Mutex<BinaryHeap<ScoredItem>>>,
    model_size: usize,
    threshold: Option<f64>,
    num_rejected: AtomicUsize,
    num_unknown: AtomicUsize,
}

impl TruncatingAccumulator {

    pub fn new(items: &SortedIdSet, model_size: usize, threshold: Option<f64>) -> Self {

        let capacity = if model_size == 0 { 10 } else { model_size };

        let mut rows: Vec<Mutex<BinaryHeap<ScoredItem>>> = Vec::with_capacity(items.len());
        for _ in 0..items.len() {
            rows.push(Mutex::new(BinaryHeap::with_capacity(capacity)));
        }

        TruncatingAccumulator {
            items: items.clone(),
            rows,
            model_size,
            threshold,
            num_rejected: AtomicUsize::new(0),
            num_unknown: AtomicUsize::new(0),
        }
    }

    /// Number of scores dropped by the threshold so far.
    pub fn num_rejected(&self) -> usize {
        self.num_rejected.load(Ordering::Relaxed)
    }

    /// Number of scores dropped so far because their row is not a known item.
    pub fn num_unknown(&self) -> usize {
        self.num_unknown.load(Ordering::Relaxed)
    }

    fn accepts(&self, score: f64) -> bool {
        match self.threshold {
            Some(threshold) => score > threshold,
            None => !score.is_nan(),
        }
    }

    /// Assembles the finished model, every neighbor list sorted by descending score.
    pub fn build(self) -> SimilarityMatrixModel {

        let num_rejected = self.num_rejected();
        let num_unknown = self.num_unknown();

        if num_unknown > 0 {
            warn!(num_unknown, "ignored scores for items outside of the training data");
        }

        let mut neighbors: FnvHashMap<ItemId, Vec<ScoredItem>> =
            FnvHashMap::with_capacity_and_hasher(self.items.len(), Default::default());

        for (item, row) in self.items.iter().zip(self.rows.into_iter()) {
            let heap = row.into_inner().unwrap();
            if !heap.is_empty() {
                // The reversed ordering of ScoredItem sorts the best neighbors first
                neighbors.insert(*item, heap.into_sorted_vec());
            }
        }

        debug!(num_rejected, num_unknown, "finalized similarity matrix");

        SimilarityMatrixModel::new(self.items, neighbors)
    }
}

impl SimilarityMatrixAccumulator for TruncatingAccumulator {

    fn put(&self, row: ItemId, column: ItemId, score: f64) {

        if !self.accepts(score) {
            self.num_rejected.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let row_index = match self.items.binary_search(&row) {
            Ok(row_index) => row_index,
            Err(_) => {
                self.num_unknown.fetch_add(1, Ordering::Relaxed);
                debug!(row, column, "ignoring score for an item outside of the training data");
                return;
            }
        };

        let scored_item = ScoredItem::new(column, score);
        let mut neighbors = self.rows[row_index].lock().unwrap();

        if self.model_size == 0 || neighbors.len() < self.model_size {
            neighbors.push(scored_item);
        } else {
            let mut top = neighbors.peek_mut().unwrap();
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }
}


#[cfg(test)]
mod tests {

    use crate::accumulator::{SimilarityMatrixAccumulator, TripleAccumulator, TruncatingAccumulator};
    use crate::vectors::SortedIdSet;

    fn items() -> SortedIdSet {
        vec![1, 2, 3, 4].into_iter().collect()
    }

    #[test]
    fn triples_are_recorded_in_insertion_order() {
        let accumulator = TripleAccumulator::new();
        accumulator.put(2, 1, 0.5);
        accumulator.put(1, 2, 0.5);

        assert_eq!(accumulator.len(), 2);
        assert_eq!(accumulator.triples(), vec![(2, 1, 0.5), (1, 2, 0.5)]);
        assert_eq!(accumulator.sorted_triples(), vec![(1, 2, 0.5), (2, 1, 0.5)]);
        assert_eq!(accumulator.into_triples().len(), 2);
    }

    #[test]
    fn keeps_top_k_per_row() {
        let accumulator = TruncatingAccumulator::new(&items(), 2, None);
        accumulator.put(1, 2, 0.1);
        accumulator.put(1, 3, 0.9);
        accumulator.put(1, 4, 0.5);
        accumulator.put(2, 1, 0.1);

        let model = accumulator.build();

        let neighbors: Vec<(u64, f64)> = model.neighbors(1).iter()
            .map(|neighbor| (neighbor.item, neighbor.score))
            .collect();
        assert_eq!(neighbors, vec![(3, 0.9), (4, 0.5)]);
        assert_eq!(model.neighbors(2).len(), 1);
        assert!(model.neighbors(3).is_empty());
    }

    #[test]
    fn unlimited_model_size_keeps_everything() {
        let accumulator = TruncatingAccumulator::new(&items(), 0, None);
        for column in 2..5 {
            accumulator.put(1, column, column as f64);
        }

        let model = accumulator.build();
        let columns: Vec<u64> = model.neighbors(1).iter().map(|neighbor| neighbor.item).collect();
        assert_eq!(columns, vec![4, 3, 2]);
    }

    #[test]
    fn threshold_and_unknown_rows_are_dropped() {
        let accumulator = TruncatingAccumulator::new(&items(), 0, Some(0.0));
        accumulator.put(1, 2, 0.0);
        accumulator.put(1, 3, -0.5);
        accumulator.put(1, 4, 0.25);
        accumulator.put(99, 1, 1.0);
        accumulator.put(98, 1, 1.0);

        assert_eq!(accumulator.num_rejected(), 2);
        assert_eq!(accumulator.num_unknown(), 2);

        let model = accumulator.build();
        assert_eq!(model.neighbors(1).len(), 1);
        assert_eq!(model.neighbors(1)[0].item, 4);
        assert!(model.neighbors(99).is_empty());
        assert_eq!(model.num_neighbors(), 1);
    }

    #[test]
    fn nan_scores_are_never_kept() {
        let accumulator = TruncatingAccumulator::new(&items(), 0, None);
        accumulator.put(1, 2, std::f64::NAN);

        assert!(accumulator.build().neighbors(1).is_empty());
    }
}
