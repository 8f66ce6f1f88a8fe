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

use std::time::Instant;

use tracing::info;

use crate::accumulator::TruncatingAccumulator;
use crate::config::BuildConfig;
use crate::error::BuildResult;
use crate::index::{BuildContext, RatingIndex, RatingIndexBuilder};
use crate::model::SimilarityMatrixModel;
use crate::similarity::ItemSimilarity;
use crate::strategy::BuildStrategy;
use crate::types::{ItemId, UserId};
use crate::utils;

/// Builds item-item models: fixes the build strategy for the similarity function, indexes the
/// ratings as that strategy requires and finalizes the accumulated scores into a model.
pub struct ItemItemModelBuilder<S> {
    strategy: BuildStrategy<S>,
    config: BuildConfig,
}

impl<S: ItemSimilarity> ItemItemModelBuilder<S> {

    pub fn new(similarity: S, config: BuildConfig) -> BuildResult<Self> {
        config.validate()?;
        let strategy = BuildStrategy::select(similarity);
        Ok(ItemItemModelBuilder { strategy, config })
    }

    pub fn strategy(&self) -> &BuildStrategy<S> {
        &self.strategy
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Indexes ratings, with the user->items reverse index only if the strategy needs it.
    pub fn index<I>(&self, ratings: I) -> RatingIndex
        where I: IntoIterator<Item = (UserId, ItemId, f64)> {

        RatingIndexBuilder::new()
            .with_user_item_sets(self.strategy.needs_user_item_sets())
            .build(ratings)
    }

    pub fn build_from_index<C>(&self, context: &C) -> BuildResult<SimilarityMatrixModel>
        where C: BuildContext + ?Sized {

        let accumulator = TruncatingAccumulator::new(
            context.items(),
            self.config.model_size,
            self.config.threshold,
        );

        if self.config.threads > 1 {
            self.strategy.build_matrix_parallel(context, &accumulator, self.config.threads)?;
        } else {
            self.strategy.build_matrix(context, &accumulator)?;
        }

        Ok(accumulator.build())
    }

    pub fn build<I>(&self, ratings: I) -> BuildResult<SimilarityMatrixModel>
        where I: IntoIterator<Item = (UserId, ItemId, f64)> {

        let index_start = Instant::now();
        let index = self.index(ratings);

        info!(
            num_items = index.num_items(),
            num_ratings = index.num_ratings(),
            millis = utils::to_millis(index_start.elapsed()),
            "indexed ratings"
        );

        let model = self.build_from_index(&index)?;

        info!(
            num_items = model.num_items(),
            num_neighbors = model.num_neighbors(),
            "finalized model"
        );

        Ok(model)
    }
}
