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
use std::io::BufReader;
use std::path::Path;

use crate::error::{BuildError, BuildResult};

/// Parameters of a model build. Missing fields in JSON input take their default values, unknown
/// fields are rejected. Parameters of the similarity function belong to the function itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Number of neighbors to retain per item, zero retains all of them.
    pub model_size: usize,
    /// Only scores strictly above the threshold are retained, `None` retains all of them.
    pub threshold: Option<f64>,
    /// Number of worker threads, a single thread builds sequentially.
    pub threads: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            model_size: 0,
            threshold: Some(0.0),
            threads: num_cpus::get(),
        }
    }
}

impl BuildConfig {

    pub fn from_json_str(json: &str) -> BuildResult<Self> {
        let config: BuildConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> BuildResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: BuildConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BuildResult<()> {
        if self.threads == 0 {
            return Err(BuildError::InvalidArgument(
                String::from("number of threads must be positive")));
        }

        if let Some(threshold) = self.threshold {
            if threshold.is_nan() {
                return Err(BuildError::InvalidArgument(String::from("threshold is not a number")));
            }
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {

    use crate::config::BuildConfig;
    use crate::error::BuildError;

    #[test]
    fn defaults() {
        let config = BuildConfig::default();

        assert_eq!(config.model_size, 0);
        assert_eq!(config.threshold, Some(0.0));
        assert!(config.threads >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BuildConfig::from_json_str(r#"{ "model_size": 20, "threads": 2 }"#).unwrap();

        assert_eq!(config.model_size, 20);
        assert_eq!(config.threads, 2);
        assert_eq!(config.threshold, Some(0.0));
    }

    #[test]
    fn similarity_parameters_are_not_build_parameters() {
        match BuildConfig::from_json_str(r#"{ "damping": 1.0 }"#) {
            Err(BuildError::Json(failure)) => assert!(failure.to_string().contains("damping")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn null_threshold_disables_filtering() {
        let config = BuildConfig::from_json_str(r#"{ "threshold": null }"#).unwrap();
        assert_eq!(config.threshold, None);
    }

    #[test]
    fn rejects_invalid_values() {
        match BuildConfig::from_json_str(r#"{ "threads": 0 }"#) {
            Err(BuildError::InvalidArgument(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }

        match BuildConfig::from_json_str(r#"{ "threshold": 0.5, "theshold": 0.9 }"#) {
            Err(BuildError::Json(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }

        match BuildConfig::from_json_str("{ model_size: ") {
            Err(BuildError::Json(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }
}
