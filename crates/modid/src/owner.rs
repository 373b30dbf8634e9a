use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;
use crate::segment::check_segment;

/// Identifier of an owning package: a single grammar segment.
///
/// Doubles as the owner prefix of every key the package contributes, so
/// unloading a package is a prefix sweep over its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModId(String);

impl ModId {
	/// Parses a package id. The whole input must be one segment; a dotted
	/// string is rejected at its first `.`.
	pub fn parse(input: &str) -> Result<Self, KeyError> {
		if input.is_empty() {
			return Err(KeyError::Empty);
		}
		check_segment(input, 0, input)?;
		Ok(Self(input.to_owned()))
	}

	/// Wraps text already known to satisfy the segment grammar.
	pub(crate) fn from_valid(text: &str) -> Self {
		Self(text.to_owned())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ModId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for ModId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl TryFrom<String> for ModId {
	type Error = KeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<ModId> for String {
	fn from(id: ModId) -> Self {
		id.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_single_segment() {
		let id = ModId::parse("Base").unwrap();
		assert_eq!(id.as_str(), "Base");
		assert_eq!(id.to_string(), "Base");
	}

	#[test]
	fn rejects_dotted_input() {
		assert!(matches!(
			ModId::parse("Base.Sub"),
			Err(KeyError::InvalidCharacter { found: '.', .. })
		));
	}

	#[test]
	fn rejects_empty() {
		assert_eq!(ModId::parse(""), Err(KeyError::Empty));
	}

	#[test]
	fn serde_rejects_invalid_text() {
		let ok: ModId = serde_json::from_str("\"Mod1\"").unwrap();
		assert_eq!(ok.as_str(), "Mod1");
		assert!(serde_json::from_str::<ModId>("\"1Mod\"").is_err());
		assert!(serde_json::from_str::<ModId>("\"a.b\"").is_err());
	}
}
