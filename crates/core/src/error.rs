//! Shared error and warning vocabulary for the loading core.

use std::fmt;
use std::io;

use basalt_modid::{KeyError, ModId, ModIdEntry};
use thiserror::Error;

/// Errors reported by the loading core.
///
/// Every kind is recoverable: the failing unit of work (one file, one
/// entry, one lookup) is reported and abandoned while its siblings
/// continue. Nothing here aborts the host on its own.
#[derive(Debug, Error)]
pub enum CoreError {
	/// A string failed the namespace-key grammar.
	#[error("invalid key `{input}`: {source}")]
	InvalidKey {
		input: String,
		#[source]
		source: KeyError,
	},
	/// A package directory or file was absent or unreadable.
	#[error("missing resource `{path}` in pack `{pack}`")]
	MissingResource {
		pack: ModId,
		path: String,
		#[source]
		source: Option<io::Error>,
	},
	/// A document failed to decode.
	#[error("failed to decode `{path}`: {detail}")]
	DecodeFailure { path: String, detail: String },
	/// A declared type key has no registered decoder.
	#[error("type `{key}` is not registered")]
	UnresolvedType { key: ModIdEntry },
	/// A locale template and its arguments did not line up.
	#[error("failed to format `{key}`: {detail}")]
	FormatFailure { key: ModIdEntry, detail: String },
	/// A staged-lifecycle call arrived out of order and was skipped.
	#[error("{operation} rejected: {reason}")]
	InvalidState {
		operation: &'static str,
		reason: String,
	},
}

impl CoreError {
	/// The kind discriminant, for structural assertions on reports.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::InvalidKey { .. } => ErrorKind::InvalidKey,
			Self::MissingResource { .. } => ErrorKind::MissingResource,
			Self::DecodeFailure { .. } => ErrorKind::DecodeFailure,
			Self::UnresolvedType { .. } => ErrorKind::UnresolvedType,
			Self::FormatFailure { .. } => ErrorKind::FormatFailure,
			Self::InvalidState { .. } => ErrorKind::InvalidState,
		}
	}
}

/// Discriminant of [`CoreError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	InvalidKey,
	MissingResource,
	DecodeFailure,
	UnresolvedType,
	FormatFailure,
	InvalidState,
}

/// Degraded-but-working conditions surfaced during lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreWarning {
	/// The selected locale had no text; the fallback locale supplied it.
	LocaleFallback { key: ModIdEntry },
	/// Neither locale had text; the raw key stood in.
	LocaleMiss { key: ModIdEntry },
}

impl fmt::Display for CoreWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::LocaleFallback { key } => {
				write!(f, "`{key}` resolved through the fallback locale")
			}
			Self::LocaleMiss { key } => {
				write!(f, "`{key}` has no text in either locale")
			}
		}
	}
}
