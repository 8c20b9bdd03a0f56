use std::path::PathBuf;

use globset::GlobSet;
use serde_yaml::Value;
use tracing::info;

use crate::builder::CollectorBuilder;
use crate::descriptor::{FileDescriptor, SharedParser};
use crate::engine::{run, EngineOptions, WalkConfig};
use crate::error::Result;
use crate::stats::CollectStats;
use crate::tags::TagOptions;
use crate::traits::Predicate;

/// Walks root paths and keeps the files that match, parse and pass the filter.
///
/// The result list is append-only: every [`iterate`](Self::iterate) call
/// walks all roots again and appends what it finds, so a second call on an
/// unchanged tree doubles the results. Build a fresh collector to start over.
///
/// The type defaults fit the YAML tag workflow
/// ([`YamlParser`](crate::YamlParser) + [`TagFilter`](crate::TagFilter)).
pub struct FileCollector<T = Value, O = TagOptions> {
    extensions: Vec<String>,
    patterns:   GlobSet,
    paths:      Vec<PathBuf>,
    parser:     Option<SharedParser<T>>,
    filter:     Box<dyn Predicate<T, O>>,
    options:    O,
    config:     WalkConfig,
    results:    Vec<FileDescriptor<T>>,
    stats:      CollectStats,
}

impl<T, O> FileCollector<T, O> {
    /// Start configuring a collector.
    pub fn builder() -> CollectorBuilder<T, O> {
        CollectorBuilder::default()
    }

    pub(crate) fn from_parts(
        extensions: Vec<String>,
        patterns: GlobSet,
        paths: Vec<PathBuf>,
        parser: Option<SharedParser<T>>,
        filter: Box<dyn Predicate<T, O>>,
        options: O,
        config: WalkConfig,
    ) -> Self {
        Self {
            extensions,
            patterns,
            paths,
            parser,
            filter,
            options,
            config,
            results: Vec::new(),
            stats: CollectStats::default(),
        }
    }

    /// Descriptors collected so far, in discovery order.
    pub fn results(&self) -> &[FileDescriptor<T>] {
        &self.results
    }

    /// Consume the collector and keep its descriptors.
    pub fn into_results(self) -> Vec<FileDescriptor<T>> {
        self.results
    }

    /// Filename patterns, as configured.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Root paths, in walk order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Options record handed to the filter.
    pub fn options(&self) -> &O {
        &self.options
    }

    /// Traversal settings shared by every root.
    pub fn walk_config(&self) -> &WalkConfig {
        &self.config
    }

    /// Counters from the most recent successful [`iterate`](Self::iterate).
    pub fn stats(&self) -> &CollectStats {
        &self.stats
    }
}

impl<T, O> FileCollector<T, O>
where
    T: Send + Sync,
    O: Sync,
{
    /// Walk every root path in order and append the accepted descriptors.
    ///
    /// Returns all results collected so far, not only this call's.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable file, parser error, or traversal error
    /// under a root directory. Nothing from a failed call is appended.
    pub fn iterate(&mut self) -> Result<&[FileDescriptor<T>]> {
        let opts = EngineOptions {
            config:   &self.config,
            patterns: &self.patterns,
            parser:   self.parser.as_ref(),
            filter:   self.filter.as_ref(),
            options:  &self.options,
        };
        let outcome = run(&self.paths, &opts)?;

        info!(
            files = outcome.stats.files,
            dirs = outcome.stats.dirs,
            matched = outcome.stats.matched,
            accepted = outcome.stats.accepted,
            elapsed_ms = outcome.stats.duration.as_millis() as u64,
            "collection finished"
        );

        self.results.extend(outcome.found);
        self.stats = outcome.stats;
        Ok(self.results.as_slice())
    }
}
