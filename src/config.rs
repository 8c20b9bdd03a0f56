//! File-based configuration for the YAML tag workflow.
//!
//! ```yaml
//! extensions: ["*.yaml", "*.yml"]
//! paths: [specs, extra/one.yaml]
//! tags: [smoke]          # omit or null to keep every file
//! threads: 4
//! missing_paths: error   # or skip (default)
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;

use crate::builder::CollectorBuilder;
use crate::collector::FileCollector;
use crate::engine::MissingPath;
use crate::error::{CollectError, Result};
use crate::tags::{TagFilter, TagOptions};
use crate::yaml::YamlParser;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    pub extensions:    Vec<String>,
    pub paths:         Vec<PathBuf>,
    pub tags:          Option<Vec<String>>,
    pub follow_links:  bool,
    pub max_depth:     Option<usize>,
    pub threads:       Option<usize>,
    pub missing_paths: MissingPath,
}

impl CollectorConfig {
    /// Deserialize a config from YAML text.
    ///
    /// # Errors
    ///
    /// [`CollectError::ConfigText`] if the text is not a valid config. Use
    /// [`from_file`](Self::from_file) to get the file path in the error.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(CollectError::ConfigText)
    }

    /// Read and deserialize a YAML config file.
    ///
    /// # Errors
    ///
    /// [`CollectError::Io`] if the file cannot be read, [`CollectError::Config`]
    /// if it is not a valid config.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CollectError::io(path, e))?;
        serde_yaml::from_str(&text).map_err(|source| CollectError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn tag_options(&self) -> TagOptions {
        match &self.tags {
            Some(tags) => TagOptions::tags(tags.iter().cloned()),
            None => TagOptions::unfiltered(),
        }
    }

    /// A builder wired with [`YamlParser`] and [`TagFilter`].
    pub fn into_builder(self) -> CollectorBuilder<Value, TagOptions> {
        let options = self.tag_options();
        let mut builder = FileCollector::builder()
            .extensions(self.extensions)
            .paths(self.paths)
            .parser(YamlParser)
            .filter(TagFilter)
            .options(options)
            .follow_links(self.follow_links)
            .missing_paths(self.missing_paths);
        if let Some(depth) = self.max_depth {
            builder = builder.max_depth(depth);
        }
        if let Some(threads) = self.threads {
            builder = builder.threads(threads);
        }
        builder
    }
}
