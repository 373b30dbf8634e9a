//! The locale manifest and the host's locale settings.

use basalt_core::{CoreError, PackSource, Reporter};
use basalt_modid::ModId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where the base package declares its locales.
pub const MANIFEST_PATH: &str = "Locales/locales.json";

/// The locale every install can rely on.
pub const DEFAULT_LOCALE: &str = "en";

/// Locale ids to display names, from the base package's manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleManifest {
	locales: IndexMap<String, String>,
}

impl Default for LocaleManifest {
	fn default() -> Self {
		let mut locales = IndexMap::new();
		locales.insert(DEFAULT_LOCALE.to_owned(), "English".to_owned());
		Self { locales }
	}
}

impl LocaleManifest {
	/// Reads the manifest from `pack`. A missing or malformed manifest is
	/// reported and the English-only default stands in.
	pub fn load(source: &dyn PackSource, reporter: &dyn Reporter, pack: &ModId) -> Self {
		let text = match source.read_to_string(pack, MANIFEST_PATH) {
			Ok(text) => text,
			Err(error) => {
				reporter.error(&CoreError::MissingResource {
					pack: pack.clone(),
					path: MANIFEST_PATH.to_owned(),
					source: Some(error),
				});
				return Self::default();
			}
		};
		match serde_json::from_str(&text) {
			Ok(manifest) => manifest,
			Err(error) => {
				reporter.error(&CoreError::DecodeFailure {
					path: MANIFEST_PATH.to_owned(),
					detail: error.to_string(),
				});
				Self::default()
			}
		}
	}

	pub fn contains(&self, locale: &str) -> bool {
		self.locales.contains_key(locale)
	}

	/// The display name for `locale`, if listed.
	pub fn display_name(&self, locale: &str) -> Option<&str> {
		self.locales.get(locale).map(String::as_str)
	}

	/// Listed locale ids, manifest order.
	pub fn locales(&self) -> impl Iterator<Item = &str> {
		self.locales.keys().map(String::as_str)
	}
}

/// Which locale the host selected and which one backs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSettings {
	pub selected: String,
	pub fallback: String,
}

impl Default for LocaleSettings {
	fn default() -> Self {
		Self {
			selected: DEFAULT_LOCALE.to_owned(),
			fallback: DEFAULT_LOCALE.to_owned(),
		}
	}
}

impl LocaleSettings {
	pub fn new(selected: impl Into<String>, fallback: impl Into<String>) -> Self {
		Self {
			selected: selected.into(),
			fallback: fallback.into(),
		}
	}

	/// True when the two locales coincide; fallback loading is skipped and
	/// lookups can never warn about a fallback hit.
	pub fn selected_is_fallback(&self) -> bool {
		self.selected == self.fallback
	}

	/// Replaces locale ids the manifest does not list with the default.
	/// Compared after replacement, `selected == fallback` also catches a
	/// selection that only became the fallback by falling back.
	pub fn resolved_against(mut self, manifest: &LocaleManifest) -> Self {
		if !manifest.contains(&self.selected) {
			self.selected = DEFAULT_LOCALE.to_owned();
		}
		if !manifest.contains(&self.fallback) {
			self.fallback = DEFAULT_LOCALE.to_owned();
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use basalt_core::{ErrorKind, MemPackSource, RecordingReporter};

	use super::*;

	fn base() -> ModId {
		ModId::parse("Base").unwrap()
	}

	#[test]
	fn default_is_english_only() {
		let manifest = LocaleManifest::default();
		assert!(manifest.contains("en"));
		assert_eq!(manifest.display_name("en"), Some("English"));
		assert_eq!(manifest.locales().count(), 1);
	}

	#[test]
	fn load_parses_the_manifest_in_order() {
		let source = MemPackSource::new().with_file(
			&base(),
			MANIFEST_PATH,
			r#"{"en": "English", "fr": "Français"}"#,
		);
		let reporter = Arc::new(RecordingReporter::new());
		let manifest = LocaleManifest::load(&source, reporter.as_ref(), &base());

		assert!(reporter.is_empty());
		assert_eq!(manifest.display_name("fr"), Some("Français"));
		assert_eq!(manifest.locales().collect::<Vec<_>>(), vec!["en", "fr"]);
	}

	#[test]
	fn missing_manifest_degrades_to_default() {
		let reporter = Arc::new(RecordingReporter::new());
		let manifest = LocaleManifest::load(&MemPackSource::new(), reporter.as_ref(), &base());

		assert_eq!(manifest, LocaleManifest::default());
		assert_eq!(reporter.errors_of(ErrorKind::MissingResource), 1);
	}

	#[test]
	fn malformed_manifest_degrades_to_default() {
		let source = MemPackSource::new().with_file(&base(), MANIFEST_PATH, "not json");
		let reporter = Arc::new(RecordingReporter::new());
		let manifest = LocaleManifest::load(&source, reporter.as_ref(), &base());

		assert_eq!(manifest, LocaleManifest::default());
		assert_eq!(reporter.errors_of(ErrorKind::DecodeFailure), 1);
	}

	#[test]
	fn resolution_replaces_unknown_ids() {
		let manifest = LocaleManifest::default();

		let settings = LocaleSettings::new("kl", "xx").resolved_against(&manifest);
		assert_eq!(settings, LocaleSettings::new("en", "en"));
		assert!(settings.selected_is_fallback());

		// Known ids pass through untouched.
		let source = MemPackSource::new().with_file(
			&base(),
			MANIFEST_PATH,
			r#"{"en": "English", "fr": "Français"}"#,
		);
		let reporter = RecordingReporter::new();
		let manifest = LocaleManifest::load(&source, &reporter, &base());
		let settings = LocaleSettings::new("fr", "en").resolved_against(&manifest);
		assert_eq!(settings, LocaleSettings::new("fr", "en"));
		assert!(!settings.selected_is_fallback());
	}
}
