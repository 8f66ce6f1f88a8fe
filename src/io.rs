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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use crate::error::BuildResult;
use crate::model::SimilarityMatrixModel;
use crate::types::{ItemId, UserId};

/// Reads a CSV input file. We expect NO headers, and a user-item-rating triple per line with
/// tab separation.
pub fn csv_reader(file: &str) -> Result<csv::Reader<File>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_path(file)
}

/// Reads all ratings, failing on the first malformed line.
pub fn ratings_from_csv<R>(reader: &mut csv::Reader<R>) -> BuildResult<Vec<(UserId, ItemId, f64)>>
    where R: io::Read {

    let mut ratings = Vec::new();

    for result in reader.deserialize() {
        let (user, item, rating): (UserId, ItemId, f64) = result?;
        ratings.push((user, item, rating));
    }

    Ok(ratings)
}

/// Output the neighbors of every item in JSON format, one item per line. If a `model_path` is
/// supplied, we write to a file at the specified path, otherwise, we output to stdout.
pub fn write_model(model: &SimilarityMatrixModel, model_path: Option<String>) -> BuildResult<()> {

    let out: Box<dyn Write> = match model_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    write_model_to(model, out)
}

pub fn write_model_to<W: Write>(model: &SimilarityMatrixModel, out: W) -> BuildResult<()> {

    let mut out = io::BufWriter::new(out);

    for item_neighbors in model.iter() {
        serde_json::to_writer(&mut out, &item_neighbors)?;
        writeln!(out)?;
    }

    out.flush()?;

    Ok(())
}


#[cfg(test)]
mod tests {

    use crate::builder::ItemItemModelBuilder;
    use crate::config::BuildConfig;
    use crate::error::BuildError;
    use crate::io;
    use crate::similarity::CosineSimilarity;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .from_reader(data.as_bytes())
    }

    #[test]
    fn reads_tab_separated_ratings() {
        let ratings = io::ratings_from_csv(&mut reader("1\t10\t4.5\n2\t10\t3\n")).unwrap();
        assert_eq!(ratings, vec![(1, 10, 4.5), (2, 10, 3.0)]);
    }

    #[test]
    fn malformed_lines_fail() {
        match io::ratings_from_csv(&mut reader("1\tapple\t4.5\n")) {
            Err(BuildError::Csv(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn writes_one_json_line_per_item() {
        let config = BuildConfig { threads: 1, ..BuildConfig::default() };
        let model = ItemItemModelBuilder::new(CosineSimilarity::new(), config)
            .unwrap()
            .build(vec![(1, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)])
            .unwrap();

        let mut out: Vec<u8> = Vec::new();
        io::write_model_to(&model, &mut out).unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(out).unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["item"], 1);
        assert_eq!(lines[0]["neighbors"][0]["item"], 2);
        assert!(lines[2]["neighbors"].as_array().unwrap().is_empty());
    }
}
