//! Run configuration file

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tricache::CacheConfig;

/// `{"inputFile": ..., "outputFile": ..., "errorLogFile": ..., "fifoListSize": 5, "hashTableSize": 5}`
///
/// The sectioned layout
/// `{"<name>": [{"files": [{...}], "defaultVariables": [{"FIFOListSize": 5, ...}]}]}`
/// is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub input_file: PathBuf,

    #[serde(default)]
    pub output_file: Option<PathBuf>,

    #[serde(default)]
    pub error_log_file: Option<PathBuf>,

    #[serde(default = "default_fifo_list_size", alias = "FIFOListSize")]
    pub fifo_list_size: usize,

    #[serde(default = "default_hash_table_size")]
    pub hash_table_size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Flat(RunConfig),
    Sectioned(BTreeMap<String, Vec<Section>>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Section {
    files: Vec<Files>,
    #[serde(default)]
    default_variables: Vec<Variables>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Files {
    input_file: PathBuf,
    #[serde(default)]
    output_file: Option<PathBuf>,
    #[serde(default)]
    error_log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Variables {
    #[serde(default = "default_fifo_list_size", alias = "FIFOListSize")]
    fifo_list_size: usize,
    #[serde(default = "default_hash_table_size")]
    hash_table_size: usize,
}

fn default_fifo_list_size() -> usize {
    CacheConfig::default().capacity
}

fn default_hash_table_size() -> usize {
    CacheConfig::default().bucket_count
}

impl RunConfig {
    /// Config that only names an input file
    pub fn for_input(input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: None,
            error_log_file: None,
            fifo_list_size: default_fifo_list_size(),
            hash_table_size: default_hash_table_size(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse either the flat or the sectioned layout. A sectioned file uses
    /// the first entry of its first section.
    pub fn parse(raw: &str) -> Result<Self> {
        let sections = match serde_json::from_str(raw).context("Invalid config JSON")? {
            ConfigFile::Flat(config) => return Ok(config),
            ConfigFile::Sectioned(sections) => sections,
        };

        let (name, section) = sections
            .into_iter()
            .find_map(|(name, entries)| entries.into_iter().next().map(|s| (name, s)))
            .ok_or_else(|| anyhow!("Config has no sections"))?;
        let files = section
            .files
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Config section {} has no files entry", name))?;
        let variables = section.default_variables.into_iter().next();

        let mut config = Self::for_input(files.input_file);
        config.output_file = files.output_file;
        config.error_log_file = files.error_log_file;
        if let Some(variables) = variables {
            config.fifo_list_size = variables.fifo_list_size;
            config.hash_table_size = variables.hash_table_size;
        }
        Ok(config)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::with_capacity(self.fifo_list_size).bucket_count(self.hash_table_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "inputFile": "cases.json",
                "outputFile": "out.txt",
                "errorLogFile": "err.log",
                "fifoListSize": 5,
                "hashTableSize": 7
            }}"#
        )
        .unwrap();

        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.input_file, PathBuf::from("cases.json"));
        assert_eq!(config.output_file, Some(PathBuf::from("out.txt")));
        assert_eq!(config.error_log_file, Some(PathBuf::from("err.log")));

        let cache = config.cache_config();
        assert_eq!(cache.capacity, 5);
        assert_eq!(cache.bucket_count, 7);
        assert_eq!(cache.effective_capacity(), 7);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: RunConfig = serde_json::from_str(r#"{"inputFile": "in.json"}"#).unwrap();
        assert_eq!(config, RunConfig::for_input("in.json"));
        assert_eq!(config.cache_config(), CacheConfig::default());
    }

    #[test]
    fn test_sectioned_layout() {
        let config = RunConfig::parse(
            r#"{ "Milestone6": [ {
                "files": [ { "inputFile": "cases.json", "outputFile": "out.txt",
                             "errorLogFile": "err.log" } ],
                "defaultVariables": [ { "hashTableSize": 7, "FIFOListSize": 3 } ]
            } ] }"#,
        )
        .unwrap();

        assert_eq!(config.input_file, PathBuf::from("cases.json"));
        assert_eq!(config.output_file, Some(PathBuf::from("out.txt")));
        assert_eq!(config.error_log_file, Some(PathBuf::from("err.log")));
        assert_eq!(config.fifo_list_size, 3);
        assert_eq!(config.hash_table_size, 7);
    }

    #[test]
    fn test_flat_layout_accepts_upper_case_fifo_size() {
        let config =
            RunConfig::parse(r#"{"inputFile": "in.json", "FIFOListSize": 9}"#).unwrap();
        assert_eq!(config.fifo_list_size, 9);
    }

    #[test]
    fn test_sectioned_layout_needs_files() {
        assert!(RunConfig::parse(r#"{ "Milestone6": [ { "files": [] } ] }"#).is_err());
        assert!(RunConfig::parse(r#"{ "Milestone6": [] }"#).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = RunConfig::load(Path::new("/nonexistent/tricache.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/tricache.json"));
    }
}
