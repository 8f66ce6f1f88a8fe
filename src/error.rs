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

use std::io;

use thiserror::Error;

use crate::types::ItemId;

/// Failure raised by a similarity function while scoring a pair of items.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimilarityError {
    #[error("similarity of items {first} and {second} is not a number")]
    NotANumber { first: ItemId, second: ItemId },

    #[error("similarity is asymmetric for items {first} and {second}: {forward} vs {backward}")]
    Asymmetric { first: ItemId, second: ItemId, forward: f64, backward: f64 },

    #[error("{0}")]
    Custom(String),
}

/// Errors aborting the construction of a similarity model.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A component was configured with an argument it cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The strategy needs the user->items reverse index, but the rating index was built
    /// without it.
    #[error("the rating index holds no user item sets, which the sparse build strategy requires")]
    MissingUserItemSets,

    #[error("computing the similarity of row {row} and column {column} failed: {source}")]
    Similarity {
        row: ItemId,
        column: ItemId,
        #[source]
        source: SimilarityError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by offline evaluation metrics.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type BuildResult<T> = Result<T, BuildError>;
