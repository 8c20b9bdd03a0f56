use std::cmp::Ordering as CmpOrdering;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use globset::GlobSet;
use ignore::{DirEntry, WalkBuilder, WalkState};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::descriptor::{FileDescriptor, SharedParser};
use crate::error::{CollectError, Result};
use crate::stats::CollectStats;
use crate::traits::Predicate;

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// What to do with a root path that is neither a file nor a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPath {
    /// Log a warning and move on to the next root.
    #[default]
    Skip,

    /// Stop with [`CollectError::NotFound`].
    Error,
}

/// Traversal parameters shared by every root of one collector.
///
/// Callers set these through the builder (`.threads()`, `.max_depth()`,
/// `.follow_links()`, `.missing_paths()`).
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Worker threads. `1` walks sequentially in a fixed order; more threads
    /// walk in parallel and sort each root's results by path afterwards.
    pub threads: usize,

    /// Maximum depth below a root directory. `0` is the root itself.
    pub max_depth: Option<usize>,

    /// Follow symbolic links into directories. Symlinked files are collected
    /// either way.
    pub follow_links: bool,

    pub missing_paths: MissingPath,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            threads:       1,
            max_depth:     None,
            follow_links:  false,
            missing_paths: MissingPath::Skip,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Borrowed view of a collector's configuration for one `run()`.
pub(crate) struct EngineOptions<'a, T, O> {
    pub config:   &'a WalkConfig,
    pub patterns: &'a GlobSet,
    pub parser:   Option<&'a SharedParser<T>>,
    pub filter:   &'a dyn Predicate<T, O>,
    pub options:  &'a O,
}

/// Descriptors accepted by one `run()`, in result order.
pub(crate) struct Outcome<T> {
    pub found: Vec<FileDescriptor<T>>,
    pub stats: CollectStats,
}

#[derive(Default)]
struct Counters {
    files:    AtomicUsize,
    dirs:     AtomicUsize,
    matched:  AtomicUsize,
    accepted: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, start: Instant) -> CollectStats {
        CollectStats::compute(
            self.files.load(Ordering::Relaxed),
            self.dirs.load(Ordering::Relaxed),
            self.matched.load(Ordering::Relaxed),
            self.accepted.load(Ordering::Relaxed),
            start.elapsed(),
        )
    }
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Walk every root in order and collect the accepted descriptors.
///
/// A root that is a file is taken as-is: no pattern match, no parser, no
/// filter. A root directory is walked recursively and each file whose base
/// name matches a pattern is parsed, then handed to the filter.
///
/// The first read, parse or traversal error aborts the run.
pub(crate) fn run<T, O>(roots: &[PathBuf], opts: &EngineOptions<'_, T, O>) -> Result<Outcome<T>>
where
    T: Send + Sync,
    O: Sync,
{
    let start = Instant::now();
    let counters = Counters::default();
    let mut found = Vec::new();

    for root in roots {
        if root.is_file() {
            debug!(path = %root.display(), "collecting explicit file");
            Counters::bump(&counters.files);
            Counters::bump(&counters.accepted);
            found.push(FileDescriptor::new(root.clone()));
        } else if root.is_dir() {
            if opts.config.threads > 1 {
                found.extend(walk_parallel(root, opts, &counters)?);
            } else {
                walk_sequential(root, opts, &counters, &mut found)?;
            }
        } else {
            match opts.config.missing_paths {
                MissingPath::Skip => {
                    warn!(path = %root.display(), "skipping root that is neither file nor directory");
                }
                MissingPath::Error => return Err(CollectError::NotFound(root.clone())),
            }
        }
    }

    Ok(Outcome {
        found,
        stats: counters.snapshot(start),
    })
}

// ---------------------------------------------------------------------------
// Walkers
// ---------------------------------------------------------------------------

fn walk_builder(root: &Path, config: &WalkConfig) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(config.follow_links)
        .same_file_system(false)
        .max_depth(config.max_depth);
    builder
}

/// A directory's files first, then its subdirectories, each group by name.
fn files_first(a: &Path, b: &Path) -> CmpOrdering {
    (a.is_dir(), a.file_name()).cmp(&(b.is_dir(), b.file_name()))
}

fn walk_sequential<T, O>(
    root: &Path,
    opts: &EngineOptions<'_, T, O>,
    counters: &Counters,
    found: &mut Vec<FileDescriptor<T>>,
) -> Result<()> {
    let mut builder = walk_builder(root, opts.config);
    builder.sort_by_file_path(files_first);

    for res in builder.build() {
        let entry = res.map_err(|e| map_ignore_error(root, e))?;
        if let Some(descriptor) = visit(&entry, opts, counters)? {
            found.push(descriptor);
        }
    }
    Ok(())
}

fn walk_parallel<T, O>(
    root: &Path,
    opts: &EngineOptions<'_, T, O>,
    counters: &Counters,
) -> Result<Vec<FileDescriptor<T>>>
where
    T: Send + Sync,
    O: Sync,
{
    let mut builder = walk_builder(root, opts.config);
    builder.threads(opts.config.threads);
    let walker = builder.build_parallel();

    // Shared state across threads
    let found = Mutex::new(Vec::<FileDescriptor<T>>::new());
    let failure = Mutex::new(None::<CollectError>);

    walker.run(|| {
        let found = &found;
        let failure = &failure;

        Box::new(move |res: std::result::Result<DirEntry, ignore::Error>| -> WalkState {
            let outcome = res
                .map_err(|e| map_ignore_error(root, e))
                .and_then(|entry| visit(&entry, opts, counters));

            match outcome {
                Ok(Some(descriptor)) => {
                    if let Ok(mut found) = found.lock() {
                        found.push(descriptor);
                    }
                    WalkState::Continue
                }
                Ok(None) => WalkState::Continue,
                Err(err) => {
                    if let Ok(mut slot) = failure.lock() {
                        // Keep the first error; later ones are usually fallout.
                        slot.get_or_insert(err);
                    }
                    WalkState::Quit
                }
            }
        })
    });

    let failure = failure
        .into_inner()
        .map_err(|_| CollectError::ThreadPool("error slot poisoned".into()))?;
    if let Some(err) = failure {
        return Err(err);
    }

    let mut found = found
        .into_inner()
        .map_err(|_| CollectError::ThreadPool("result list poisoned".into()))?;
    found.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(found)
}

// ---------------------------------------------------------------------------
// Per-entry decision
// ---------------------------------------------------------------------------

/// Match, parse and filter one walked entry.
fn visit<T, O>(
    entry: &DirEntry,
    opts: &EngineOptions<'_, T, O>,
    counters: &Counters,
) -> Result<Option<FileDescriptor<T>>> {
    let Some(ft) = entry.file_type() else {
        return Ok(None);
    };

    if ft.is_dir() {
        // The root itself is not counted.
        if entry.depth() > 0 {
            Counters::bump(&counters.dirs);
        }
        return Ok(None);
    }
    // Symlinks to files count as files even when links are not followed;
    // symlinked directories are never descended into in that mode.
    let linked_file = ft.is_symlink() && entry.path().is_file();
    if !ft.is_file() && !linked_file {
        trace!(path = %entry.path().display(), "skipping non-regular entry");
        return Ok(None);
    }
    Counters::bump(&counters.files);

    if !opts.patterns.is_match(entry.file_name()) {
        trace!(path = %entry.path().display(), "no pattern matches");
        return Ok(None);
    }
    Counters::bump(&counters.matched);

    let path = entry.path().to_path_buf();
    let descriptor = match opts.parser {
        Some(parser) => FileDescriptor::with_parser(path, parser.clone()),
        None => FileDescriptor::new(path),
    };

    // Parsing happens before filtering for every matched file, so a parse
    // failure surfaces even if the filter would have rejected the file.
    if opts.filter.accepts(descriptor.parsed()?, opts.options) {
        debug!(path = %descriptor.path().display(), "accepted");
        Counters::bump(&counters.accepted);
        Ok(Some(descriptor))
    } else {
        debug!(path = %descriptor.path().display(), "rejected by filter");
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to CollectError
// ---------------------------------------------------------------------------

fn map_ignore_error(root: &Path, e: ignore::Error) -> CollectError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => CollectError::io(path, io_err),
            other => map_ignore_error(&path, other),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(root, *err),
        ignore::Error::Loop { child, .. } => CollectError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => CollectError::io(root, io_err),
        other => CollectError::Walk(other.to_string()),
    }
}
