//! Keyed stopwatch for measuring repeated spans of work.
//!
//! Each tag accumulates elapsed time across any number of start/stop pairs.
//!
//! ```rust
//! use filecollect::Timer;
//!
//! let mut timer = Timer::new();
//! timer.start("walk");
//! // ... work ...
//! timer.stop("walk").unwrap();
//! assert!(timer.elapsed("walk").is_some());
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimerError {
    #[error("stop() called for unknown tag {0:?}")]
    UnknownTag(String),

    #[error("stop() called for stopped tag {0:?}")]
    NotRunning(String),
}

#[derive(Debug, Default, Clone)]
struct Span {
    started: Option<Instant>,
    total:   Duration,
}

#[derive(Debug, Default, Clone)]
pub struct Timer {
    spans: HashMap<String, Span>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or resume) the span for `tag`, keeping previously accumulated time.
    pub fn start(&mut self, tag: impl Into<String>) {
        let span = self.spans.entry(tag.into()).or_default();
        span.started = Some(Instant::now());
    }

    /// Start the span for `tag` from zero.
    pub fn start_reset(&mut self, tag: impl Into<String>) {
        self.spans.insert(
            tag.into(),
            Span {
                started: Some(Instant::now()),
                total:   Duration::ZERO,
            },
        );
    }

    /// Stop the running span for `tag` and add its time to the total.
    pub fn stop(&mut self, tag: &str) -> Result<(), TimerError> {
        let now = Instant::now();
        let span = self
            .spans
            .get_mut(tag)
            .ok_or_else(|| TimerError::UnknownTag(tag.to_string()))?;
        let started = span
            .started
            .take()
            .ok_or_else(|| TimerError::NotRunning(tag.to_string()))?;
        span.total += now.duration_since(started);
        Ok(())
    }

    /// Clear `tag`: stopped, with nothing accumulated.
    pub fn reset(&mut self, tag: impl Into<String>) {
        self.spans.insert(tag.into(), Span::default());
    }

    /// Accumulated time for `tag`, excluding a span still running.
    pub fn elapsed(&self, tag: &str) -> Option<Duration> {
        self.spans.get(tag).map(|span| span.total)
    }

    pub fn is_running(&self, tag: &str) -> bool {
        self.spans.get(tag).is_some_and(|span| span.started.is_some())
    }

    /// One `tag: seconds` line per tag, longest first.
    pub fn report(&self) -> String {
        let mut rows: Vec<(&str, Duration)> = self
            .spans
            .iter()
            .map(|(tag, span)| (tag.as_str(), span.total))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows.iter()
            .map(|(tag, total)| format!("{tag:<12}: {:.4}", total.as_secs_f64()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
