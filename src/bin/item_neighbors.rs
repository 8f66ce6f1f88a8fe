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

use std::env;
use std::error::Error;
use std::process;
use std::str::FromStr;

use getopts::{Matches, Options};
use tracing::info;
use tracing_subscriber::EnvFilter;

use itemknn::builder::ItemItemModelBuilder;
use itemknn::config::BuildConfig;
use itemknn::io;
use itemknn::similarity::CosineSimilarity;

fn main() {

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let opts = options();

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        print_usage_and_exit(&program, opts, None);
    }

    let ratings_path = match matches.opt_str("i") {
        Some(path) => path,
        None => print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        ),
    };

    let model_path = matches.opt_str("o");

    let (config, similarity) = match build_parameters(&matches) {
        Ok(parameters) => parameters,
        Err(failure) => {
            let hint = format!("Problem with the build parameters: {}", failure);
            print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if let Err(failure) = compute_neighbors(&ratings_path, config, similarity, model_path) {
        eprintln!("Failed to compute item neighbors: {}", failure);
        process::exit(1);
    }
}

fn options() -> Options {

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of ratings \
        of items by users. The input file must contain a user id, an item id and a rating per \
        line, separated by tabs.", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("n", "num-neighbors", "Number of neighbors to retain per item (optional, \
        0 retains all of them).", "NUMBER");
    opts.optopt("t", "threshold", "Only retain similarities above this value (optional, \
        defaults to 0).", "NUMBER");
    opts.optopt("d", "damping", "Damping added to the denominator of the cosine similarity \
        (optional, defaults to 0).", "NUMBER");
    opts.optopt("p", "threads", "Number of threads to use (optional, defaults to the number of \
        CPUs).", "NUMBER");
    opts.optopt("c", "config", "JSON file with build parameters (optional, command line options \
        take precedence).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    opts
}

/// Asking for help is the only way to see the usage without failing.
fn usage_exit_code(hint: Option<&str>) -> i32 {
    if hint.is_some() { 1 } else { 0 }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) -> ! {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    process::exit(usage_exit_code(hint));
}

fn build_parameters(
    matches: &Matches
) -> Result<(BuildConfig, CosineSimilarity), Box<dyn Error>> {

    let mut config = match matches.opt_str("c") {
        Some(path) => BuildConfig::from_json_file(path)?,
        None => BuildConfig::default(),
    };

    if let Some(model_size) = parse_opt::<usize>(matches, "n")? {
        config.model_size = model_size;
    }
    if let Some(threshold) = parse_opt::<f64>(matches, "t")? {
        config.threshold = Some(threshold);
    }
    if let Some(threads) = parse_opt::<usize>(matches, "p")? {
        config.threads = threads;
    }

    config.validate()?;

    let damping = parse_opt::<f64>(matches, "d")?.unwrap_or(0.0);
    let similarity = CosineSimilarity::try_with_damping(damping)?;

    Ok((config, similarity))
}

fn parse_opt<T>(matches: &Matches, name: &str) -> Result<Option<T>, Box<dyn Error>>
    where T: FromStr, T::Err: Error + 'static {

    match matches.opt_get::<T>(name) {
        Ok(value) => Ok(value),
        Err(failure) => Err(format!("option '{}': {}", name, failure).into()),
    }
}

fn compute_neighbors(
    ratings_path: &str,
    config: BuildConfig,
    similarity: CosineSimilarity,
    model_path: Option<String>
) -> Result<(), Box<dyn Error>> {

    info!(path = ratings_path, "reading ratings");

    let mut reader = io::csv_reader(ratings_path)?;
    let ratings = io::ratings_from_csv(&mut reader)?;

    info!(num_ratings = ratings.len(), "computing item neighbors");

    let builder = ItemItemModelBuilder::new(similarity, config)?;
    let model = builder.build(ratings)?;

    info!("writing item neighbors");
    io::write_model(&model, model_path)?;

    Ok(())
}


#[cfg(test)]
mod tests {

    use super::{build_parameters, options, usage_exit_code};

    fn parameters(args: &[&str]) -> Result<(itemknn::config::BuildConfig, f64), String> {
        let matches = options().parse(args).map_err(|failure| failure.to_string())?;
        build_parameters(&matches)
            .map(|(config, similarity)| (config, similarity.damping()))
            .map_err(|failure| failure.to_string())
    }

    #[test]
    fn usage_errors_exit_with_failure() {
        assert_eq!(usage_exit_code(Some("Please specify an inputfile via --inputfile.")), 1);
        assert_eq!(usage_exit_code(None), 0);
    }

    #[test]
    fn options_override_defaults() {
        let (config, damping) = parameters(&["-i", "ratings.tsv", "-n", "5", "-t", "0.1",
            "-p", "2", "-d", "0.5"]).unwrap();

        assert_eq!(config.model_size, 5);
        assert_eq!(config.threshold, Some(0.1));
        assert_eq!(config.threads, 2);
        assert_eq!(damping, 0.5);
    }

    #[test]
    fn invalid_options_are_reported() {
        let failure = parameters(&["-n", "abc"]).unwrap_err();
        assert!(failure.starts_with("option 'n'"));

        assert!(parameters(&["-p", "0"]).is_err());
        let failure = parameters(&["--damping=-1"]).unwrap_err();
        assert!(failure.contains("damping"));
    }
}
