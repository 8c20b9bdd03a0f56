use crate::error::BoxError;

/// Turns the raw text of a file into a structured value.
///
/// The collector calls the parser at most once per descriptor, the first
/// time [`FileDescriptor::parsed`](crate::FileDescriptor::parsed) is read.
/// A parser error is surfaced to the caller as
/// [`CollectError::Parse`](crate::CollectError::Parse).
///
/// # Thread Safety
///
/// `Send + Sync` are required — a parser is shared by every descriptor the
/// collector creates, and by the workers of a parallel walk.
///
/// # Example
///
/// ```rust
/// use filecollect::{BoxError, Parser};
///
/// struct LineCount;
///
/// impl Parser for LineCount {
///     type Output = usize;
///
///     fn parse(&self, content: &str) -> Result<usize, BoxError> {
///         Ok(content.lines().count())
///     }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// The structured value produced from a file's text.
    type Output;

    /// Parse the full content of one file.
    fn parse(&self, content: &str) -> Result<Self::Output, BoxError>;
}

/// Decides whether a matched, parsed file is kept.
///
/// `parsed` is `None` when the descriptor was built without a parser.
/// `options` is the opaque record configured on the collector.
///
/// Closures with the signature `Fn(Option<&T>, &O) -> bool` implement this
/// trait directly.
pub trait Predicate<T, O>: Send + Sync {
    /// Returns `true` if the file should be added to the results.
    fn accepts(&self, parsed: Option<&T>, options: &O) -> bool;
}

impl<T, O, F> Predicate<T, O> for F
where
    F: Fn(Option<&T>, &O) -> bool + Send + Sync,
{
    fn accepts(&self, parsed: Option<&T>, options: &O) -> bool {
        self(parsed, options)
    }
}

/// Accepts every file. Used when no filter is specified.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T, O> Predicate<T, O> for AcceptAll {
    fn accepts(&self, _parsed: Option<&T>, _options: &O) -> bool {
        true
    }
}
