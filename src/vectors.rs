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

use std::iter::FromIterator;
use std::ops::Deref;

/// An immutable set of ids, held in ascending order without duplicates. Range views are plain
/// slices into the backing storage and are located via binary search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SortedIdSet {
    ids: Vec<u64>,
}

impl SortedIdSet {

    pub fn empty() -> Self {
        SortedIdSet { ids: Vec::new() }
    }

    /// Wraps ids which the caller guarantees to be strictly ascending.
    pub(crate) fn from_sorted_unchecked(ids: Vec<u64>) -> Self {
        debug_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        SortedIdSet { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn first(&self) -> Option<u64> {
        self.ids.first().cloned()
    }

    pub fn last(&self) -> Option<u64> {
        self.ids.last().cloned()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.ids
    }

    /// All ids strictly less than `upper`.
    pub fn head_set(&self, upper: u64) -> &[u64] {
        &self.ids[..lower_bound(&self.ids, upper)]
    }

    /// All ids greater than or equal to `lower`.
    pub fn tail_set(&self, lower: u64) -> &[u64] {
        &self.ids[lower_bound(&self.ids, lower)..]
    }

    /// All ids in `[lower, upper)`.
    pub fn sub_set(&self, lower: u64, upper: u64) -> &[u64] {
        if upper <= lower {
            return &[];
        }
        &self.ids[lower_bound(&self.ids, lower)..lower_bound(&self.ids, upper)]
    }
}

impl Deref for SortedIdSet {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        &self.ids
    }
}

impl FromIterator<u64> for SortedIdSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut ids: Vec<u64> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        SortedIdSet { ids }
    }
}

impl<'a> IntoIterator for &'a SortedIdSet {
    type Item = &'a u64;
    type IntoIter = std::slice::Iter<'a, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// Index of the first entry which is not less than `key`.
fn lower_bound(ids: &[u64], key: u64) -> usize {
    match ids.binary_search(&key) {
        Ok(position) => position,
        Err(position) => position,
    }
}

/// An immutable sparse vector, mapping ids (users or items) to real values. Keys are stored in
/// ascending order in parallel with their values, every key present has a defined value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SparseVector {
    keys: SortedIdSet,
    values: Vec<f64>,
}

/// A borrowed, contiguous key range of a `SparseVector`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseVectorView<'a> {
    keys: &'a [u64],
    values: &'a [f64],
}

impl SparseVector {

    pub fn empty() -> Self {
        SparseVector { keys: SortedIdSet::empty(), values: Vec::new() }
    }

    /// Builds a vector from arbitrary `(key, value)` entries. If a key occurs more than once, the
    /// last value wins.
    pub fn from_entries<I>(entries: I) -> Self
        where I: IntoIterator<Item = (u64, f64)> {

        let mut entries: Vec<(u64, f64)> = entries.into_iter().collect();
        // Stable sort, so that later duplicates stay behind earlier ones
        entries.sort_by_key(|&(key, _)| key);

        let mut keys: Vec<u64> = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            if keys.last() == Some(&key) {
                *values.last_mut().unwrap() = value;
            } else {
                keys.push(key);
                values.push(value);
            }
        }

        SparseVector { keys: SortedIdSet::from_sorted_unchecked(keys), values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn key_set(&self) -> &SortedIdSet {
        &self.keys
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn contains_key(&self, key: u64) -> bool {
        self.keys.contains(key)
    }

    pub fn get(&self, key: u64) -> Option<f64> {
        self.keys.binary_search(&key).ok().map(|position| self.values[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.view().iter()
    }

    pub fn view(&self) -> SparseVectorView<'_> {
        SparseVectorView { keys: self.keys.as_slice(), values: &self.values }
    }

    /// Entries with keys strictly less than `upper`.
    pub fn head(&self, upper: u64) -> SparseVectorView<'_> {
        self.range(0, upper)
    }

    /// Entries with keys greater than or equal to `lower`.
    pub fn tail(&self, lower: u64) -> SparseVectorView<'_> {
        let start = lower_bound(self.keys.as_slice(), lower);
        SparseVectorView { keys: &self.keys.as_slice()[start..], values: &self.values[start..] }
    }

    /// Entries with keys in `[lower, upper)`.
    pub fn range(&self, lower: u64, upper: u64) -> SparseVectorView<'_> {
        if upper <= lower {
            return SparseVectorView { keys: &[], values: &[] };
        }
        let start = lower_bound(self.keys.as_slice(), lower);
        let end = lower_bound(self.keys.as_slice(), upper);
        SparseVectorView {
            keys: &self.keys.as_slice()[start..end],
            values: &self.values[start..end],
        }
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum() / self.values.len() as f64
        }
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|value| value * value).sum::<f64>().sqrt()
    }

    /// Inner product over the keys both vectors share, computed by a merge over the sorted keys.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut dot = 0.0;
        for (_, value, other_value) in self.co_entries(other) {
            dot += value * other_value;
        }
        dot
    }

    /// Iterates `(key, self[key], other[key])` for all keys present in both vectors.
    pub fn co_entries<'a>(
        &'a self,
        other: &'a SparseVector
    ) -> impl Iterator<Item = (u64, f64, f64)> + 'a {
        CoEntries { left: self.view(), right: other.view(), left_position: 0, right_position: 0 }
    }
}

impl<'a> SparseVectorView<'a> {

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &'a [u64] {
        self.keys
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + 'a {
        self.keys.iter().cloned().zip(self.values.iter().cloned())
    }

    pub fn to_vector(&self) -> SparseVector {
        SparseVector {
            keys: SortedIdSet::from_sorted_unchecked(self.keys.to_vec()),
            values: self.values.to_vec(),
        }
    }
}

struct CoEntries<'a> {
    left: SparseVectorView<'a>,
    right: SparseVectorView<'a>,
    left_position: usize,
    right_position: usize,
}

impl<'a> Iterator for CoEntries<'a> {
    type Item = (u64, f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.left_position < self.left.keys.len()
            && self.right_position < self.right.keys.len() {

            let left_key = self.left.keys[self.left_position];
            let right_key = self.right.keys[self.right_position];

            if left_key < right_key {
                self.left_position += 1;
            } else if right_key < left_key {
                self.right_position += 1;
            } else {
                let entry = (
                    left_key,
                    self.left.values[self.left_position],
                    self.right.values[self.right_position],
                );
                self.left_position += 1;
                self.right_position += 1;
                return Some(entry);
            }
        }
        None
    }
}
