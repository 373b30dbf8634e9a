use thiserror::Error;

/// Reasons a string fails the namespace-key grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
	/// The input was empty.
	#[error("empty key")]
	Empty,
	/// A full key needs an owner segment and at least one entry segment.
	#[error("`{0}` has no `.` separator")]
	MissingSeparator(String),
	/// Two separators ran together, or the key started or ended with one.
	#[error("`{input}` has an empty segment at position {index}")]
	EmptySegment { input: String, index: usize },
	/// Segments must not start with a digit.
	#[error("segment `{segment}` in `{input}` starts with a digit")]
	LeadingDigit { input: String, segment: String },
	/// Segments are limited to ASCII alphanumerics and `_`.
	#[error("segment `{segment}` in `{input}` contains `{found}`")]
	InvalidCharacter {
		input: String,
		segment: String,
		found: char,
	},
	/// Categories are exactly two segments, `Owner.Segment`.
	#[error("`{0}` is not a two-segment category key")]
	NotACategory(String),
}
