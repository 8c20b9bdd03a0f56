use std::path::PathBuf;
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::collector::FileCollector;
use crate::descriptor::SharedParser;
use crate::engine::{MissingPath, WalkConfig};
use crate::error::{CollectError, Result};
use crate::traits::{AcceptAll, Parser, Predicate};

// ---------------------------------------------------------------------------
// CollectorBuilder
// ---------------------------------------------------------------------------

/// Configures a [`FileCollector`].
///
/// Created via [`FileCollector::builder()`]. Chain the setters, then call
/// [`build()`](CollectorBuilder::build).
///
/// # Example
///
/// ```rust,ignore
/// let mut collector = FileCollector::builder()
///     .extensions(["*.yaml", "*.yml"])
///     .paths(["tests/specs"])
///     .parser(YamlParser)
///     .filter(TagFilter)
///     .options(TagOptions::tags(["smoke"]))
///     .build()?;
/// let files = collector.iterate()?;
/// ```
pub struct CollectorBuilder<T, O> {
    extensions: Vec<String>,
    paths:      Vec<PathBuf>,
    parser:     Option<SharedParser<T>>,
    filter:     Option<Box<dyn Predicate<T, O>>>,
    options:    Option<O>,
    config:     WalkConfig,
}

impl<T, O> Default for CollectorBuilder<T, O> {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            paths:      Vec::new(),
            parser:     None,
            filter:     None,
            options:    None,
            config:     WalkConfig::default(),
        }
    }
}

impl<T, O> CollectorBuilder<T, O> {
    // ── Discovery ─────────────────────────────────────────────────────────

    /// Add filename glob patterns such as `*.yaml`.
    ///
    /// Patterns are matched case-sensitively against the base name of each
    /// walked file. A file is kept for parsing if any pattern matches.
    pub fn extensions<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add root paths. Each root is either a file, collected as-is, or a
    /// directory, walked recursively.
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    // ── Extension points ──────────────────────────────────────────────────

    /// Set the parser applied to every matched file.
    ///
    /// Without one, descriptors report `None` from
    /// [`parsed()`](crate::FileDescriptor::parsed).
    pub fn parser(mut self, parser: impl Parser<Output = T> + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Set the predicate that decides which matched files are kept.
    ///
    /// Defaults to [`AcceptAll`].
    pub fn filter(mut self, filter: impl Predicate<T, O> + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Set the options record passed to the filter. Defaults to `O::default()`.
    pub fn options(mut self, options: O) -> Self {
        self.options = Some(options);
        self
    }

    // ── Walk options ──────────────────────────────────────────────────────

    /// Number of walker threads. `1` (the default) walks sequentially.
    ///
    /// See [`WalkConfig::threads`] for how result order differs.
    pub fn threads(mut self, n: usize) -> Self {
        self.config.threads = n.max(1);
        self
    }

    /// Maximum traversal depth below each root directory. Unlimited by default.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Follow symbolic links into directories while walking. Off by default.
    ///
    /// Symlinked files are collected whether or not this is set.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.config.follow_links = yes;
        self
    }

    /// Policy for roots that are neither a file nor a directory.
    pub fn missing_paths(mut self, policy: MissingPath) -> Self {
        self.config.missing_paths = policy;
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Compile the patterns and produce the collector.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidPattern`] if a pattern is not a valid glob.
    pub fn build(self) -> Result<FileCollector<T, O>>
    where
        O: Default,
    {
        let patterns = compile_patterns(&self.extensions)?;
        let filter = self.filter.unwrap_or_else(|| Box::new(AcceptAll));

        Ok(FileCollector::from_parts(
            self.extensions,
            patterns,
            self.paths,
            self.parser,
            filter,
            self.options.unwrap_or_default(),
            self.config,
        ))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compile_patterns(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| CollectError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| CollectError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}
