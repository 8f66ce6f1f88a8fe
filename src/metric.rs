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

use std::marker::PhantomData;

use serde_json::Value;
use tracing::warn;

use crate::error::MetricError;
use crate::model::SimilarityMatrixModel;
use crate::types::UserId;
use crate::vectors::SparseVector;

/// Name and attributes of an evaluated algorithm.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributed {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Attributed {
    pub fn new(name: &str) -> Self {
        Attributed { name: String::from(name), attributes: Vec::new() }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((String::from(key), String::from(value)));
        self
    }
}

/// Identifies the train/test split an algorithm is evaluated on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSetInfo {
    pub name: String,
}

/// A user of the test set with their held-out ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct TestUser {
    pub user: UserId,
    pub test_ratings: SparseVector,
}

/// Produces named columns of values for an evaluation run over a built recommender `R`.
///
/// A context is created once per algorithm, data set and recommender. Metrics may fail to
/// produce one, which is an expected state: `results` then returns one null per column, so
/// that tabular output stays well-formed.
pub trait Metric<R> {
    type Context;

    fn column_labels(&self) -> &[String];

    fn user_column_labels(&self) -> &[String];

    fn create_context(
        &self,
        algorithm: &Attributed,
        data_set: &DataSetInfo,
        recommender: &R,
    ) -> Option<Self::Context>;

    /// One value per user column.
    fn measure_user(&self, user: &TestUser, context: &Self::Context) -> Vec<Value>;

    /// One value per column.
    fn results(&self, context: Option<&Self::Context>) -> Vec<Value>;

    fn close(&mut self) -> Result<(), MetricError> {
        Ok(())
    }
}

/// Model metric backed by an arbitrary function of the recommender, without per-user columns.
pub struct FunctionModelMetric<R, F> {
    column_labels: Vec<String>,
    function: F,
    recommender: PhantomData<fn(&R)>,
}

impl<R, F> FunctionModelMetric<R, F>
    where F: Fn(&R) -> Vec<Value> {

    pub fn new(column_labels: Vec<String>, function: F) -> Self {
        FunctionModelMetric { column_labels, function, recommender: PhantomData }
    }
}

impl<R, F> Metric<R> for FunctionModelMetric<R, F>
    where F: Fn(&R) -> Vec<Value> {

    type Context = Vec<Value>;

    fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    fn user_column_labels(&self) -> &[String] {
        &[]
    }

    fn create_context(
        &self,
        algorithm: &Attributed,
        _data_set: &DataSetInfo,
        recommender: &R,
    ) -> Option<Vec<Value>> {

        let values = (self.function)(recommender);

        if values.len() == self.column_labels.len() {
            Some(values)
        } else {
            warn!(
                algorithm = algorithm.name.as_str(),
                expected = self.column_labels.len(),
                actual = values.len(),
                "model metric produced the wrong number of values"
            );
            None
        }
    }

    fn measure_user(&self, _user: &TestUser, _context: &Vec<Value>) -> Vec<Value> {
        Vec::new()
    }

    fn results(&self, context: Option<&Vec<Value>>) -> Vec<Value> {
        match context {
            Some(values) => values.clone(),
            None => vec![Value::Null; self.column_labels.len()],
        }
    }
}

/// Reports the number of items and of retained neighbor entries of a similarity model.
pub fn model_statistics_metric() -> impl Metric<SimilarityMatrixModel, Context = Vec<Value>> {
    FunctionModelMetric::new(
        vec![String::from("ModelItems"), String::from("ModelNeighbors")],
        |model: &SimilarityMatrixModel| {
            vec![Value::from(model.num_items()), Value::from(model.num_neighbors())]
        },
    )
}
