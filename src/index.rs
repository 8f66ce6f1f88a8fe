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
use tracing::debug;

use crate::types::{ItemId, UserId};
use crate::vectors::{SortedIdSet, SparseVector};

/// Read-only view of the training data which build strategies operate on.
pub trait BuildContext: Sync {

    /// All items with at least one rating, in ascending order.
    fn items(&self) -> &SortedIdSet;

    /// The ratings of an item, keyed by user. Unknown items yield an empty vector.
    fn item_vector(&self, item: ItemId) -> &SparseVector;

    /// The items rated by a user. Unknown users (and indexes built without user item sets)
    /// yield an empty set.
    fn user_items(&self, user: UserId) -> &SortedIdSet;

    /// Whether `user_items` is backed by a materialized reverse index.
    fn has_user_item_sets(&self) -> bool;
}

/// Ratings indexed by item and, optionally, by user.
#[derive(Debug, Clone)]
pub struct RatingIndex {
    items: SortedIdSet,
    item_vectors: FnvHashMap<ItemId, SparseVector>,
    user_items: Option<FnvHashMap<UserId, SortedIdSet>>,
    empty_vector: SparseVector,
    empty_set: SortedIdSet,
}

impl RatingIndex {

    /// Indexes `(user, item, rating)` triples, including the user->items reverse index.
    pub fn from_ratings<I>(ratings: I) -> Self
        where I: IntoIterator<Item = (UserId, ItemId, f64)> {

        RatingIndexBuilder::new().with_user_item_sets(true).build(ratings)
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_users(&self) -> Option<usize> {
        self.user_items.as_ref().map(|user_items| user_items.len())
    }

    pub fn num_ratings(&self) -> usize {
        self.item_vectors.values().map(|vector| vector.len()).sum()
    }
}

impl BuildContext for RatingIndex {

    fn items(&self) -> &SortedIdSet {
        &self.items
    }

    fn item_vector(&self, item: ItemId) -> &SparseVector {
        self.item_vectors.get(&item).unwrap_or(&self.empty_vector)
    }

    fn user_items(&self, user: UserId) -> &SortedIdSet {
        self.user_items.as_ref()
            .and_then(|user_items| user_items.get(&user))
            .unwrap_or(&self.empty_set)
    }

    fn has_user_item_sets(&self) -> bool {
        self.user_items.is_some()
    }
}

/// Builds a `RatingIndex`, materializing the reverse index only on request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingIndexBuilder {
    user_item_sets: bool,
}

impl RatingIndexBuilder {

    pub fn new() -> Self {
        RatingIndexBuilder { user_item_sets: false }
    }

    pub fn with_user_item_sets(mut self, user_item_sets: bool) -> Self {
        self.user_item_sets = user_item_sets;
        self
    }

    /// If a user rated the same item more than once, the last rating wins.
    pub fn build<I>(&self, ratings: I) -> RatingIndex
        where I: IntoIterator<Item = (UserId, ItemId, f64)> {

        let mut item_entries: FnvHashMap<ItemId, Vec<(UserId, f64)>> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());
        let mut user_entries: FnvHashMap<UserId, Vec<ItemId>> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut num_ratings: u64 = 0;

        for (user, item, rating) in ratings {
            item_entries.entry(item).or_insert_with(Vec::new).push((user, rating));

            if self.user_item_sets {
                user_entries.entry(user).or_insert_with(Vec::new).push(item);
            }

            num_ratings += 1;
        }

        let items: SortedIdSet = item_entries.keys().cloned().collect();

        let item_vectors: FnvHashMap<ItemId, SparseVector> = item_entries.into_iter()
            .map(|(item, entries)| (item, SparseVector::from_entries(entries)))
            .collect();

        let user_items = if self.user_item_sets {
            let user_items: FnvHashMap<UserId, SortedIdSet> = user_entries.into_iter()
                .map(|(user, items)| (user, items.into_iter().collect()))
                .collect();
            Some(user_items)
        } else {
            None
        };

        debug!(
            num_ratings,
            num_items = items.len(),
            user_item_sets = self.user_item_sets,
            "indexed ratings"
        );

        RatingIndex {
            items,
            item_vectors,
            user_items,
            empty_vector: SparseVector::empty(),
            empty_set: SortedIdSet::empty(),
        }
    }
}


#[cfg(test)]
mod tests {

    use crate::index::{BuildContext, RatingIndex, RatingIndexBuilder};

    fn ratings() -> Vec<(u64, u64, f64)> {
        vec![
            (10, 1, 4.0),
            (10, 2, 3.0),
            (20, 2, 5.0),
            (20, 3, 1.0),
        ]
    }

    #[test]
    fn indexes_items_and_users() {
        let index = RatingIndex::from_ratings(ratings());

        assert_eq!(index.items().as_slice(), &[1, 2, 3]);
        assert_eq!(index.num_items(), 3);
        assert_eq!(index.num_users(), Some(2));
        assert_eq!(index.num_ratings(), 4);

        let item_two = index.item_vector(2);
        assert_eq!(item_two.key_set().as_slice(), &[10, 20]);
        assert_eq!(item_two.get(20), Some(5.0));

        assert_eq!(index.user_items(10).as_slice(), &[1, 2]);
        assert_eq!(index.user_items(20).as_slice(), &[2, 3]);
        assert!(index.has_user_item_sets());
    }

    #[test]
    fn unknown_ids_yield_empty_results() {
        let index = RatingIndex::from_ratings(ratings());

        assert!(index.item_vector(42).is_empty());
        assert!(index.user_items(42).is_empty());
    }

    #[test]
    fn reverse_index_is_optional() {
        let index = RatingIndexBuilder::new().build(ratings());

        assert!(!index.has_user_item_sets());
        assert_eq!(index.num_users(), None);
        assert!(index.user_items(10).is_empty());
        assert_eq!(index.items().as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn repeated_ratings_keep_the_last_value() {
        let index = RatingIndex::from_ratings(vec![(1, 7, 1.0), (1, 7, 2.5)]);

        assert_eq!(index.item_vector(7).get(1), Some(2.5));
        assert_eq!(index.user_items(1).as_slice(), &[7]);
    }
}
