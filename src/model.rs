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

use fnv::FnvHashMap;

use crate::types::{ItemId, ScoredItem};
use crate::vectors::SortedIdSet;

/// The finished item-item model: for every item, its neighbors ordered by descending score.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrixModel {
    items: SortedIdSet,
    neighbors: FnvHashMap<ItemId, Vec<ScoredItem>>,
}

/// Struct used for JSON serialization of the neighbors of an item.
#[derive(Serialize)]
pub struct ItemNeighbors<'a> {
    pub item: ItemId,
    pub neighbors: &'a [ScoredItem],
}

impl SimilarityMatrixModel {

    pub(crate) fn new(items: SortedIdSet, neighbors: FnvHashMap<ItemId, Vec<ScoredItem>>) -> Self {
        SimilarityMatrixModel { items, neighbors }
    }

    /// All items of the training population, including those without neighbors.
    pub fn items(&self) -> &SortedIdSet {
        &self.items
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Total number of stored neighbor entries.
    pub fn num_neighbors(&self) -> usize {
        self.neighbors.values().map(|neighbors| neighbors.len()).sum()
    }

    pub fn neighbors(&self, item: ItemId) -> &[ScoredItem] {
        self.neighbors.get(&item).map(|neighbors| neighbors.as_slice()).unwrap_or(&[])
    }

    /// Neighbor lists of all items, in ascending item order.
    pub fn iter(&self) -> impl Iterator<Item = ItemNeighbors<'_>> + '_ {
        self.items.iter().map(move |item| {
            ItemNeighbors { item: *item, neighbors: self.neighbors(*item) }
        })
    }
}
