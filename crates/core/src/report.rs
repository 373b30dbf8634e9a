//! The reporting seam between the loading core and the host console.

use parking_lot::Mutex;

use crate::error::{CoreError, CoreWarning, ErrorKind};

/// Sink for operator-facing diagnostics.
///
/// Subsystems report through this and carry on; escalating a fatal
/// condition into a halt is the host's call, not the core's.
pub trait Reporter: Send + Sync {
	/// Routine progress worth showing an operator.
	fn message(&self, text: &str);
	/// A degraded-but-working condition.
	fn warning(&self, warning: &CoreWarning);
	/// A recoverable failure; the unit of work was skipped.
	fn error(&self, error: &CoreError);
	/// A condition the host should treat as unrecoverable.
	fn fatal(&self, text: &str);
}

/// Forwards reports onto the `tracing` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
	fn message(&self, text: &str) {
		tracing::info!("{text}");
	}

	fn warning(&self, warning: &CoreWarning) {
		tracing::warn!("{warning}");
	}

	fn error(&self, error: &CoreError) {
		tracing::error!(kind = ?error.kind(), "{error}");
	}

	fn fatal(&self, text: &str) {
		tracing::error!(fatal = true, "{text}");
	}
}

/// One report captured by [`RecordingReporter`].
///
/// Errors are stored as their kind plus rendered text; that keeps the
/// report cloneable and is what tests assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
	Message(String),
	Warning(CoreWarning),
	Error(ErrorKind, String),
	Fatal(String),
}

/// Buffers reports for later inspection.
#[derive(Debug, Default)]
pub struct RecordingReporter {
	reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Everything reported so far, in order.
	pub fn reports(&self) -> Vec<Report> {
		self.reports.lock().clone()
	}

	/// How many errors of `kind` were reported.
	pub fn errors_of(&self, kind: ErrorKind) -> usize {
		self.reports
			.lock()
			.iter()
			.filter(|report| matches!(report, Report::Error(k, _) if *k == kind))
			.count()
	}

	/// The warnings reported so far, in order.
	pub fn warnings(&self) -> Vec<CoreWarning> {
		self.reports
			.lock()
			.iter()
			.filter_map(|report| match report {
				Report::Warning(warning) => Some(warning.clone()),
				_ => None,
			})
			.collect()
	}

	pub fn is_empty(&self) -> bool {
		self.reports.lock().is_empty()
	}

	pub fn clear(&self) {
		self.reports.lock().clear();
	}
}

impl Reporter for RecordingReporter {
	fn message(&self, text: &str) {
		self.reports.lock().push(Report::Message(text.to_owned()));
	}

	fn warning(&self, warning: &CoreWarning) {
		self.reports.lock().push(Report::Warning(warning.clone()));
	}

	fn error(&self, error: &CoreError) {
		self.reports
			.lock()
			.push(Report::Error(error.kind(), error.to_string()));
	}

	fn fatal(&self, text: &str) {
		self.reports.lock().push(Report::Fatal(text.to_owned()));
	}
}

#[cfg(test)]
mod tests {
	use basalt_modid::{KeyError, ModIdEntry};

	use super::*;

	#[test]
	fn records_in_order() {
		let reporter = RecordingReporter::new();
		reporter.message("loading");
		reporter.error(&CoreError::InvalidKey {
			input: "x".to_owned(),
			source: KeyError::MissingSeparator("x".to_owned()),
		});
		reporter.warning(&CoreWarning::LocaleMiss {
			key: ModIdEntry::parse("Base.UI.Missing").unwrap(),
		});

		let reports = reporter.reports();
		assert_eq!(reports.len(), 3);
		assert!(matches!(reports[0], Report::Message(ref text) if text == "loading"));
		assert!(matches!(reports[1], Report::Error(ErrorKind::InvalidKey, _)));
		assert!(matches!(reports[2], Report::Warning(CoreWarning::LocaleMiss { .. })));
	}

	#[test]
	fn counts_by_kind() {
		let reporter = RecordingReporter::new();
		reporter.error(&CoreError::DecodeFailure {
			path: "Entries/a.json".to_owned(),
			detail: "bad".to_owned(),
		});
		reporter.error(&CoreError::DecodeFailure {
			path: "Entries/b.json".to_owned(),
			detail: "worse".to_owned(),
		});
		assert_eq!(reporter.errors_of(ErrorKind::DecodeFailure), 2);
		assert_eq!(reporter.errors_of(ErrorKind::InvalidKey), 0);
	}
}
