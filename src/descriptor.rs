use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::error::{CollectError, Result};
use crate::traits::Parser;

/// Shared handle to the parser a descriptor was built with.
pub type SharedParser<T> = Arc<dyn Parser<Output = T>>;

/// One file discovered by the collector, or handed to it directly.
///
/// The path is fixed at construction. Everything else is derived from it:
/// `base_name` and `dir_name` are pure path operations, while the raw text
/// and parsed value are read and computed on first access, then cached for
/// the lifetime of the descriptor.
///
/// A failed read or parse is returned to the caller and leaves the cache
/// empty, so the descriptor never remembers a failure as content.
///
/// Loads are serialized per field: threads sharing one descriptor wait for
/// the first reader instead of reading the file again.
pub struct FileDescriptor<T> {
    path:       PathBuf,
    parser:     Option<SharedParser<T>>,
    raw:        OnceLock<String>,
    parsed:     OnceLock<Option<T>>,
    read_lock:  Mutex<()>,
    parse_lock: Mutex<()>,
}

impl<T> FileDescriptor<T> {
    /// A descriptor with no parser. [`parsed`](Self::parsed) yields `None`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:       path.into(),
            parser:     None,
            raw:        OnceLock::new(),
            parsed:     OnceLock::new(),
            read_lock:  Mutex::new(()),
            parse_lock: Mutex::new(()),
        }
    }

    /// A descriptor whose parsed view is produced by `parser`.
    pub fn with_parser(path: impl Into<PathBuf>, parser: SharedParser<T>) -> Self {
        Self {
            parser: Some(parser),
            ..Self::new(path)
        }
    }

    /// The path as given at construction.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, or an empty string when there is none.
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The path without its last component.
    pub fn dir_name(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Full text of the file, read on first call.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Io`] if the file cannot be read. The read is
    /// attempted once per call; nothing is cached on failure.
    pub fn raw_content(&self) -> Result<&str> {
        if let Some(raw) = self.raw.get() {
            return Ok(raw.as_str());
        }
        let _guard = lock(&self.read_lock);
        if let Some(raw) = self.raw.get() {
            return Ok(raw.as_str());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| CollectError::io(&self.path, e))?;
        tracing::trace!(path = %self.path.display(), bytes = content.len(), "read file");
        Ok(self.raw.get_or_init(|| content).as_str())
    }

    /// The parsed view of the file, computed on first call.
    ///
    /// Returns `Ok(None)` when the descriptor has no parser; the file is not
    /// read in that case.
    ///
    /// # Errors
    ///
    /// Propagates read failures from [`raw_content`](Self::raw_content) and
    /// parser failures as [`CollectError::Parse`].
    pub fn parsed(&self) -> Result<Option<&T>> {
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed.as_ref());
        }
        let _guard = lock(&self.parse_lock);
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed.as_ref());
        }
        let value = match &self.parser {
            Some(parser) => {
                let raw = self.raw_content()?;
                let value = parser.parse(raw).map_err(|source| CollectError::Parse {
                    path: self.path.clone(),
                    source,
                })?;
                Some(value)
            }
            None => None,
        };
        Ok(self.parsed.get_or_init(|| value).as_ref())
    }

    /// Whether the raw content has been read.
    pub fn is_loaded(&self) -> bool {
        self.raw.get().is_some()
    }

    /// Whether the parsed view has been computed.
    pub fn is_parsed(&self) -> bool {
        self.parsed.get().is_some()
    }
}

/// A poisoned lock only means another loader panicked; the cells it guards
/// are still consistent.
fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T> fmt::Debug for FileDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("path", &self.path)
            .field("has_parser", &self.parser.is_some())
            .field("loaded", &self.is_loaded())
            .field("parsed", &self.is_parsed())
            .finish()
    }
}
