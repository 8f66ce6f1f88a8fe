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

use std::cmp::Ordering;

use fnv::FnvHashSet;

pub type ItemId = u64;
pub type UserId = u64;

/// Transient per-item scratch set of neighbor candidates.
pub type CandidateSet = FnvHashSet<ItemId>;

pub fn new_candidate_set() -> CandidateSet {
    FnvHashSet::with_capacity_and_hasher(100, Default::default())
}

/// A neighbor item together with its similarity score. The ordering is reversed, so that a
/// `BinaryHeap<ScoredItem>` keeps the lowest scored item at its top, which is what we need for
/// retaining the top-k neighbors of an item.
#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
pub struct ScoredItem {
    pub item: ItemId,
    pub score: f64,
}

impl ScoredItem {
    pub fn new(item: ItemId, score: f64) -> Self {
        ScoredItem { item, score }
    }
}

/// There is no total order on floating point numbers, NaN scores compare equal to everything.
/// Ties on the score are broken by preferring the smaller item id.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        _ => scored_item_a.item.cmp(&scored_item_b.item),
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}
