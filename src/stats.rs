use std::time::Duration;

/// Counters for one [`iterate`](crate::FileCollector::iterate) call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectStats {
    /// Regular files seen, matched or not. Explicit file roots count here.
    pub files: usize,

    /// Directories seen below the roots.
    pub dirs: usize,

    /// Files whose base name matched an extension pattern.
    pub matched: usize,

    /// Descriptors added to the results.
    pub accepted: usize,

    /// Wall-clock time of the walk, including reads and parsing.
    pub duration: Duration,

    /// `files / duration`, clamped to 0 on zero-duration runs.
    pub files_per_sec: usize,
}

impl CollectStats {
    pub(crate) fn compute(
        files: usize,
        dirs: usize,
        matched: usize,
        accepted: usize,
        duration: Duration,
    ) -> Self {
        let fps = if duration.as_secs_f64() > 0.0 {
            (files as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            matched,
            accepted,
            duration,
            files_per_sec: fps,
        }
    }
}
