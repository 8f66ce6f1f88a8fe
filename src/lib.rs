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

#[macro_use]
extern crate serde_derive;

pub mod accumulator;
pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod io;
pub mod metric;
pub mod model;
pub mod similarity;
pub mod strategy;
pub mod types;
pub mod utils;
pub mod vectors;

mod usage_tests;

use crate::builder::ItemItemModelBuilder;
use crate::config::BuildConfig;
use crate::error::BuildResult;
use crate::model::SimilarityMatrixModel;
use crate::similarity::ItemSimilarity;
use crate::types::{ItemId, UserId};

/// Computes an item-item similarity model from `(user, item, rating)` triples. Sparse
/// similarity functions only score items with common raters, symmetric ones score every pair
/// once.
pub fn item_similarities<I, S>(
    ratings: I,
    similarity: S,
    config: BuildConfig,
) -> BuildResult<SimilarityMatrixModel>
    where I: IntoIterator<Item = (UserId, ItemId, f64)>, S: ItemSimilarity {

    ItemItemModelBuilder::new(similarity, config)?.build(ratings)
}
