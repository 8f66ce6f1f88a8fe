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

#[cfg(test)]
mod tests {

    use crate::accumulator::TripleAccumulator;
    use crate::config::BuildConfig;
    use crate::index::RatingIndex;
    use crate::item_similarities;
    use crate::metric::{self, Attributed, DataSetInfo, Metric};
    use crate::similarity::{CosineSimilarity, VerifySymmetry};
    use crate::strategy::BuildStrategy;

    #[test]
    fn programmatic_usage() {

        /* Our input data comprises of ratings, given as (user, item, rating) triples with
           integer identifiers. */
        let ratings = vec![
            (1, 100, 5.0),
            (1, 200, 3.0),
            (1, 300, 4.0),
            (2, 100, 4.0),
            (2, 300, 5.0),
            (3, 200, 2.0),
            (3, 400, 5.0),
            (4, 500, 1.0),
        ];

        /* The config controls how many neighbors we retain per item, which scores we drop and
           how many threads compute the model. */
        let config = BuildConfig {
            model_size: 2,
            threshold: Some(0.0),
            threads: 2,
        };

        /* Cosine similarity is sparse and symmetric, so only items with common raters get
           compared, and each such pair only once. */
        let model = item_similarities(ratings.clone(), CosineSimilarity::new(), config).unwrap();

        /* Every item gets at most two neighbors, sorted by descending similarity. */
        for item_neighbors in model.iter() {
            assert!(item_neighbors.neighbors.len() <= 2);
            for pair in item_neighbors.neighbors.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }

        assert_eq!(model.neighbors(100)[0].item, 300);
        assert!(model.neighbors(500).is_empty());

        /* Evaluation harnesses can collect statistics about the model via metrics. */
        let metric = metric::model_statistics_metric();
        let context = metric.create_context(
            &Attributed::new("ItemItem"),
            &DataSetInfo { name: String::from("example") },
            &model,
        );
        assert_eq!(metric.results(context.as_ref()).len(), metric.column_labels().len());
    }

    #[test]
    fn lower_level_usage() {

        /* Strategies can also be driven directly, writing into any accumulator. Wrapping the
           similarity function lets us double check its symmetry claim along the way. */
        let index = RatingIndex::from_ratings(vec![
            (1, 1, 2.0), (1, 2, 1.0), (2, 2, 4.0), (2, 3, 3.0),
        ]);

        let strategy = BuildStrategy::select(VerifySymmetry::new(CosineSimilarity::new()));
        let accumulator = TripleAccumulator::new();

        strategy.build_matrix(&index, &accumulator).unwrap();

        let triples = accumulator.sorted_triples();
        let pairs: Vec<(u64, u64)> = triples.iter()
            .map(|&(row, column, _)| (row, column))
            .collect();
        assert_eq!(pairs, vec![(1, 2), (2, 1), (2, 3), (3, 2)]);
        assert_eq!(triples[0].2, triples[1].2);
    }
}
