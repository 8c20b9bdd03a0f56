//! # filecollect
//!
//! Lazy file discovery with pluggable parsing and metadata filtering.
//!
//! A [`FileCollector`] walks a list of root paths, keeps the files whose
//! base name matches one of its glob patterns, parses them with an injected
//! [`Parser`] and keeps those an injected [`Predicate`] accepts. Each kept
//! file is a [`FileDescriptor`]: the path plus its raw text and parsed view,
//! both read on first access and cached.
//!
//! The crate ships one concrete policy, the YAML tag filter: [`YamlParser`]
//! turns a file into a list of records and [`TagFilter`] keeps files whose
//! `meta.tags` intersect the requested [`TagOptions`].
//!
//! # Quick Start
//!
//! ```rust
//! use filecollect::{FileCollector, TagFilter, TagOptions, YamlParser};
//!
//! # fn main() -> Result<(), filecollect::CollectError> {
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("x.yaml"), "- meta:\n    tags: [smoke]\n").unwrap();
//! std::fs::write(dir.path().join("y.txt"), "not collected").unwrap();
//! std::fs::write(dir.path().join("z.yml"), "[]").unwrap();
//!
//! let mut collector = FileCollector::builder()
//!     .extensions(["*.yaml", "*.yml"])
//!     .paths([dir.path()])
//!     .parser(YamlParser)
//!     .filter(TagFilter)
//!     .options(TagOptions::tags(["smoke"]))
//!     .build()?;
//!
//! let files = collector.iterate()?;
//! assert_eq!(files.len(), 1);
//! assert_eq!(files[0].base_name(), "x.yaml");
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Parsers and Predicates
//!
//! Implement [`Parser`] for any text format, and [`Predicate`] (or pass a
//! closure) for any selection rule over its output:
//!
//! ```rust
//! use filecollect::{BoxError, FileCollector, Parser};
//!
//! struct Lines;
//!
//! impl Parser for Lines {
//!     type Output = Vec<String>;
//!
//!     fn parse(&self, content: &str) -> Result<Vec<String>, BoxError> {
//!         Ok(content.lines().map(str::to_owned).collect())
//!     }
//! }
//!
//! let collector = FileCollector::builder()
//!     .extensions(["*.txt"])
//!     .paths(["notes"])
//!     .parser(Lines)
//!     .filter(|lines: Option<&Vec<String>>, min: &usize| {
//!         lines.is_some_and(|l| l.len() >= *min)
//!     })
//!     .options(10_usize)
//!     .build();
//! assert!(collector.is_ok());
//! ```
//!
//! # Ordering
//!
//! With one thread (the default) each root directory is walked depth
//! first, and within a directory its files come before its subdirectories,
//! each group sorted by name. With more threads, each root's results are
//! sorted by full path instead. Roots are always processed in the order
//! given.

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod tags;

mod builder;
mod collector;
mod descriptor;
mod error;
mod stats;
mod timer;
mod traits;
mod yaml;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::CollectorBuilder;
pub use collector::FileCollector;
pub use config::CollectorConfig;
pub use descriptor::{FileDescriptor, SharedParser};
pub use engine::{MissingPath, WalkConfig};
pub use error::{BoxError, CollectError, Result};
pub use stats::CollectStats;
pub use tags::{TagFilter, TagOptions, TagSelection};
pub use timer::{Timer, TimerError};
pub use traits::{AcceptAll, Parser, Predicate};
pub use yaml::YamlParser;
