//! Progress and error reporting.

use std::error::Error;

use tracing::{error, info};

/// Receives progress and failures from a generation run.
pub trait Reporter {
    /// A new phase begins.
    fn title(&mut self, title: &str);

    fn progress_start(&mut self, total: usize);

    fn progress_advance(&mut self, step: usize);

    fn progress_finish(&mut self);

    fn success(&mut self, message: &str);

    fn error(&mut self, report: &ErrorReport);
}

/// A fatal error flattened for display: its message, where it happened, and
/// every underlying cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub location: Option<String>,
    pub causes: Vec<String>,
}

impl ErrorReport {
    pub fn new(err: &(dyn Error + 'static), location: Option<String>) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            message: err.to_string(),
            location,
            causes,
        }
    }

    /// Human readable rendering, one entry per line.
    pub fn lines(&self) -> Vec<String> {
        let rule = "=".repeat(80);
        let mut lines = vec!["An error occurred".to_string(), rule.clone(), self.message.clone()];
        if let Some(location) = &self.location {
            lines.push(format!("in {location}"));
        }
        for cause in &self.causes {
            lines.push(String::new());
            lines.push("Caused by".to_string());
            lines.push(rule.clone());
            lines.push(cause.clone());
        }
        lines
    }
}

/// Reports through `tracing`, logging progress every tenth of the way.
#[derive(Debug, Default)]
pub struct TracingReporter {
    title: String,
    total: usize,
    done: usize,
    last_logged_decile: usize,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for TracingReporter {
    fn title(&mut self, title: &str) {
        self.title = title.to_string();
        info!("{title}");
    }

    fn progress_start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.last_logged_decile = 0;
    }

    fn progress_advance(&mut self, step: usize) {
        self.done = (self.done + step).min(self.total);
        if self.total == 0 {
            return;
        }

        let decile = self.done * 10 / self.total;
        if decile > self.last_logged_decile {
            self.last_logged_decile = decile;
            info!("  {}: {}/{} ({}%)", self.title, self.done, self.total, decile * 10);
        }
    }

    fn progress_finish(&mut self) {
        if self.done < self.total {
            info!("  {}: finished at {}/{}", self.title, self.done, self.total);
        }
    }

    fn success(&mut self, message: &str) {
        info!("{message}");
    }

    fn error(&mut self, report: &ErrorReport) {
        for line in report.lines() {
            error!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("inner failure")]
    struct Inner;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer(#[source] Inner);

    #[test]
    fn test_error_report_walks_sources() {
        let report = ErrorReport::new(&Outer(Inner), Some("create_reviews".into()));
        assert_eq!(report.message, "outer failure");
        assert_eq!(report.causes, vec!["inner failure"]);

        let lines = report.lines();
        assert_eq!(lines[2], "outer failure");
        assert_eq!(lines[3], "in create_reviews");
        assert_eq!(lines.last().unwrap(), "inner failure");
    }

    #[test]
    fn test_progress_clamps_to_total() {
        let mut reporter = TracingReporter::new();
        reporter.title("Creating users");
        reporter.progress_start(20);
        reporter.progress_advance(15);
        reporter.progress_advance(15);
        assert_eq!(reporter.done, 20);
        assert_eq!(reporter.last_logged_decile, 10);
        reporter.progress_finish();
    }
}
