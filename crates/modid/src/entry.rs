use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;
use crate::owner::ModId;
use crate::segment::check_segment;

/// A validated namespace key: `Owner.Segment[.Segment...]`.
///
/// Keys address every registry and locale lookup, and the first segment
/// scopes the key to its owning package. The owner and category boundaries
/// are computed once at parse time, so the derived views are plain slices.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModIdEntry {
	raw: String,
	/// Byte offset of the first `.`.
	owner_end: usize,
	/// Byte offset of the second `.`, or the key length for two-segment keys.
	category_end: usize,
}

impl ModIdEntry {
	/// Parses a full key. Every segment must satisfy the grammar
	/// `[A-Za-z_][A-Za-z0-9_]*` and at least two segments must be present.
	pub fn parse(input: &str) -> Result<Self, KeyError> {
		if input.is_empty() {
			return Err(KeyError::Empty);
		}
		if !input.contains('.') {
			return Err(KeyError::MissingSeparator(input.to_owned()));
		}
		let mut owner_end = 0;
		let mut category_end = 0;
		for (index, segment) in input.split('.').enumerate() {
			check_segment(input, index, segment)?;
			match index {
				0 => owner_end = segment.len(),
				1 => category_end = owner_end + 1 + segment.len(),
				_ => {}
			}
		}
		Ok(Self {
			raw: input.to_owned(),
			owner_end,
			category_end,
		})
	}

	/// Joins parts with `.` and runs the result through the normal parse
	/// gate, so composed keys obey the same grammar as literal ones.
	pub fn compose<I, S>(parts: I) -> Result<Self, KeyError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let joined = parts
			.into_iter()
			.map(|part| part.as_ref().to_owned())
			.collect::<Vec<_>>()
			.join(".");
		Self::parse(&joined)
	}

	/// True if `input` would parse as a full key.
	pub fn is_valid(input: &str) -> bool {
		Self::parse(input).is_ok()
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// The owner segment as a slice.
	pub fn owner_str(&self) -> &str {
		&self.raw[..self.owner_end]
	}

	/// The owner segment as a typed id.
	pub fn owner(&self) -> ModId {
		ModId::from_valid(self.owner_str())
	}

	/// Everything after the owner segment.
	pub fn entry_path(&self) -> &str {
		&self.raw[self.owner_end + 1..]
	}

	/// The first two segments as a slice.
	pub fn category_str(&self) -> &str {
		&self.raw[..self.category_end]
	}

	/// The first two segments as a typed category.
	pub fn category(&self) -> Category {
		Category::from_valid(self.category_str())
	}

	/// True if the key's owner segment equals `owner`. Avoids allocating
	/// for the common unload sweep.
	pub fn is_owned_by(&self, owner: &ModId) -> bool {
		self.owner_str() == owner.as_str()
	}
}

impl fmt::Debug for ModIdEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ModIdEntry({})", self.raw)
	}
}

impl fmt::Display for ModIdEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

impl AsRef<str> for ModIdEntry {
	fn as_ref(&self) -> &str {
		&self.raw
	}
}

impl TryFrom<String> for ModIdEntry {
	type Error = KeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<ModIdEntry> for String {
	fn from(entry: ModIdEntry) -> Self {
		entry.raw
	}
}

/// Grouping key: the first two segments of a full key.
///
/// Categories back set-style lookups ("all weapons", "all UI strings");
/// they index keys, they never store values.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
	/// Parses a category, which must be exactly two segments.
	pub fn parse(input: &str) -> Result<Self, KeyError> {
		let entry = ModIdEntry::parse(input)?;
		if entry.category_str().len() != input.len() {
			return Err(KeyError::NotACategory(input.to_owned()));
		}
		Ok(Self(input.to_owned()))
	}

	pub(crate) fn from_valid(text: &str) -> Self {
		Self(text.to_owned())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Category({})", self.0)
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl TryFrom<String> for Category {
	type Error = KeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<Category> for String {
	fn from(category: Category) -> Self {
		category.0
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn two_segment_key_views() {
		let key = ModIdEntry::parse("Base.Player").unwrap();
		assert_eq!(key.owner_str(), "Base");
		assert_eq!(key.entry_path(), "Player");
		assert_eq!(key.category_str(), "Base.Player");
		assert_eq!(key.category().as_str(), "Base.Player");
	}

	#[test]
	fn deep_key_views() {
		let key = ModIdEntry::parse("Base.Entries.Widget.default").unwrap();
		assert_eq!(key.owner_str(), "Base");
		assert_eq!(key.owner().as_str(), "Base");
		assert_eq!(key.entry_path(), "Entries.Widget.default");
		assert_eq!(key.category_str(), "Base.Entries");
	}

	#[test]
	fn ownership_check() {
		let key = ModIdEntry::parse("Mod1.Entries.Widget.x").unwrap();
		let mod1 = ModId::parse("Mod1").unwrap();
		let base = ModId::parse("Base").unwrap();
		assert!(key.is_owned_by(&mod1));
		assert!(!key.is_owned_by(&base));
	}

	#[test]
	fn owner_is_exact_segment_not_prefix() {
		let key = ModIdEntry::parse("Mod10.Thing").unwrap();
		let mod1 = ModId::parse("Mod1").unwrap();
		assert!(!key.is_owned_by(&mod1));
	}

	#[test]
	fn rejects_malformed_keys() {
		assert_eq!(ModIdEntry::parse(""), Err(KeyError::Empty));
		assert_eq!(
			ModIdEntry::parse("NoDots"),
			Err(KeyError::MissingSeparator("NoDots".to_owned()))
		);
		assert!(matches!(
			ModIdEntry::parse(".Leading"),
			Err(KeyError::EmptySegment { index: 0, .. })
		));
		assert!(matches!(
			ModIdEntry::parse("Trailing."),
			Err(KeyError::EmptySegment { index: 1, .. })
		));
		assert!(matches!(
			ModIdEntry::parse("A..B"),
			Err(KeyError::EmptySegment { index: 1, .. })
		));
		assert!(matches!(
			ModIdEntry::parse("A.2b"),
			Err(KeyError::LeadingDigit { .. })
		));
		assert!(matches!(
			ModIdEntry::parse("A.b-c"),
			Err(KeyError::InvalidCharacter { found: '-', .. })
		));
	}

	#[test]
	fn compose_goes_through_the_grammar_gate() {
		let key = ModIdEntry::compose(["Base", "Entries", "Widget", "default"]).unwrap();
		assert_eq!(key.as_str(), "Base.Entries.Widget.default");
		// A dotted part is fine as long as each joined segment is valid.
		let key = ModIdEntry::compose(["Base", "Entries.Widget", "x"]).unwrap();
		assert_eq!(key.category_str(), "Base.Entries");
		assert!(ModIdEntry::compose(["Base", "not valid"]).is_err());
	}

	#[test]
	fn category_requires_exactly_two_segments() {
		assert!(Category::parse("Base.Entries").is_ok());
		assert_eq!(
			Category::parse("Base.Entries.Widget"),
			Err(KeyError::NotACategory("Base.Entries.Widget".to_owned()))
		);
		assert!(Category::parse("Base").is_err());
	}

	#[test]
	fn derived_category_equals_parsed() {
		let key = ModIdEntry::parse("Base.Entries.Widget.default").unwrap();
		let parsed = Category::parse("Base.Entries").unwrap();
		assert_eq!(key.category(), parsed);
	}

	#[test]
	fn serde_round_trip_and_rejection() {
		let key = ModIdEntry::parse("Base.Entries.Widget.default").unwrap();
		let json = serde_json::to_string(&key).unwrap();
		assert_eq!(json, "\"Base.Entries.Widget.default\"");
		let back: ModIdEntry = serde_json::from_str(&json).unwrap();
		assert_eq!(back, key);
		assert!(serde_json::from_str::<ModIdEntry>("\"nodots\"").is_err());
	}

	const VALID_KEY: &str = "[A-Za-z_][A-Za-z0-9_]{0,8}(\\.[A-Za-z_][A-Za-z0-9_]{0,8}){1,4}";

	proptest! {
		/// Anything the grammar regex generates must parse, and the parsed
		/// key must render back to the input text.
		#[test]
		fn prop_grammar_strings_parse(input in VALID_KEY) {
			let key = ModIdEntry::parse(&input).unwrap();
			prop_assert_eq!(key.as_str(), input.as_str());
			prop_assert_eq!(key.to_string(), input);
		}

		/// The owner and category views are literal prefixes of the key.
		#[test]
		fn prop_views_are_prefixes(input in VALID_KEY) {
			let key = ModIdEntry::parse(&input).unwrap();
			let owner_prefix = format!("{}.", key.owner_str());
			prop_assert!(input.starts_with(&owner_prefix));
			prop_assert!(input.starts_with(key.category_str()));
			prop_assert!(key.is_owned_by(&key.owner()));
		}

		/// Arbitrary input never panics the parser, and `is_valid` agrees
		/// with `parse`.
		#[test]
		fn prop_parse_never_panics(input in ".{0,40}") {
			let parsed = ModIdEntry::parse(&input);
			prop_assert_eq!(parsed.is_ok(), ModIdEntry::is_valid(&input));
		}
	}
}
