//! The layered locale text table.

use std::fmt;
use std::sync::Arc;

use basalt_core::{
	CoreError, CoreWarning, HostCtx, Layer, LayeredMap, ModInfo, PackSource, Reporter, Subsystem,
};
use basalt_modid::ModIdEntry;
use indexmap::IndexMap;

use crate::format;
use crate::manifest::LocaleSettings;

const LOCALES_DIR: &str = "Locales";

/// Locale text, selected locale shadowing the fallback locale.
///
/// Selected-locale text lives in the overlay and fallback text in the base,
/// so the layered read order is exactly selected-before-fallback. Within one
/// position writes are flat last-load-wins.
pub struct LocaleTable {
	texts: LayeredMap<String>,
	settings: LocaleSettings,
	reporter: Arc<dyn Reporter>,
	source: Arc<dyn PackSource>,
}

impl LocaleTable {
	/// Settings should already be resolved against the manifest; the table
	/// loads whatever ids it is given.
	pub fn new(ctx: &HostCtx, settings: LocaleSettings) -> Self {
		Self {
			texts: LayeredMap::new(),
			settings,
			reporter: ctx.reporter.clone(),
			source: ctx.source.clone(),
		}
	}

	pub fn settings(&self) -> &LocaleSettings {
		&self.settings
	}

	/// Number of distinct keys across both positions.
	pub fn len(&self) -> usize {
		self.texts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.texts.is_empty()
	}

	/// Loads one locale's files from `pack` into `position`. Selected text
	/// belongs in the overlay, fallback text in the base.
	pub fn load_locale(&mut self, pack: &ModInfo, locale: &str, position: Layer) {
		let dir = format!("{LOCALES_DIR}/{locale}");
		if !self.source.dir_exists(&pack.id, &dir) {
			self.reporter.error(&CoreError::MissingResource {
				pack: pack.id.clone(),
				path: dir,
				source: None,
			});
			return;
		}
		let files = match self.source.list_files(&pack.id, &dir) {
			Ok(files) => files,
			Err(error) => {
				self.reporter.error(&CoreError::MissingResource {
					pack: pack.id.clone(),
					path: dir,
					source: Some(error),
				});
				return;
			}
		};
		let mut loaded = 0;
		for name in files {
			if !name.ends_with(".json") {
				continue;
			}
			let path = format!("{dir}/{name}");
			loaded += self.load_file(pack, &path, position);
		}
		tracing::debug!(pack = %pack.id, locale, ?position, texts = loaded, "locale loaded");
	}

	/// Loads one flat key-to-text file; returns how many texts landed.
	fn load_file(&mut self, pack: &ModInfo, path: &str, position: Layer) -> usize {
		let text = match self.source.read_to_string(&pack.id, path) {
			Ok(text) => text,
			Err(error) => {
				self.reporter.error(&CoreError::MissingResource {
					pack: pack.id.clone(),
					path: path.to_owned(),
					source: Some(error),
				});
				return 0;
			}
		};
		let texts: IndexMap<String, String> = match serde_json::from_str(&text) {
			Ok(texts) => texts,
			Err(error) => {
				self.reporter.error(&CoreError::DecodeFailure {
					path: path.to_owned(),
					detail: error.to_string(),
				});
				return 0;
			}
		};
		let mut loaded = 0;
		for (raw, value) in texts {
			match ModIdEntry::parse(&raw) {
				Ok(key) => {
					self.texts.insert(position, key, value);
					loaded += 1;
				}
				Err(error) => {
					self.reporter.error(&CoreError::InvalidKey {
						input: raw,
						source: error,
					});
				}
			}
		}
		loaded
	}

	fn load_pack(&mut self, pack: &ModInfo) {
		let selected = self.settings.selected.clone();
		self.load_locale(pack, &selected, Layer::Overlay);
		if !self.settings.selected_is_fallback() {
			let fallback = self.settings.fallback.clone();
			self.load_locale(pack, &fallback, Layer::Base);
		}
	}

	fn check_key(&self, key: &str) -> Option<ModIdEntry> {
		match ModIdEntry::parse(key) {
			Ok(key) => Some(key),
			Err(error) => {
				self.reporter.error(&CoreError::InvalidKey {
					input: key.to_owned(),
					source: error,
				});
				None
			}
		}
	}

	/// Selected hit, or fallback hit with a warning, or `None` with a
	/// miss warning.
	fn resolve(&self, key: &ModIdEntry) -> Option<&str> {
		match self.texts.get_layered(key) {
			Some((Layer::Overlay, text)) => Some(text),
			Some((Layer::Base, text)) => {
				self.reporter
					.warning(&CoreWarning::LocaleFallback { key: key.clone() });
				Some(text)
			}
			None => {
				self.reporter
					.warning(&CoreWarning::LocaleMiss { key: key.clone() });
				None
			}
		}
	}

	/// Translates `key`, degrading instead of failing: an invalid key is
	/// reported and answers the empty string, a miss answers the raw key as
	/// a human-visible placeholder.
	pub fn translate(&self, key: &str) -> String {
		let Some(key) = self.check_key(key) else {
			return String::new();
		};
		match self.resolve(&key) {
			Some(text) => text.to_owned(),
			None => key.to_string(),
		}
	}

	/// [`translate`](Self::translate), then renders the text as a positional
	/// template. A template that does not fit its arguments is reported as a
	/// format failure and the raw key stands in.
	pub fn translate_args(&self, key: &str, args: &[&dyn fmt::Display]) -> String {
		let Some(key) = self.check_key(key) else {
			return String::new();
		};
		let Some(text) = self.resolve(&key) else {
			return key.to_string();
		};
		match format::render(text, args) {
			Ok(rendered) => rendered,
			Err(error) => {
				self.reporter.error(&CoreError::FormatFailure {
					key: key.clone(),
					detail: error.to_string(),
				});
				key.to_string()
			}
		}
	}
}

impl Subsystem for LocaleTable {
	fn name(&self) -> &'static str {
		"locale"
	}

	fn init(&mut self) {
		self.texts.clear();
	}

	fn clear(&mut self) {
		self.texts.clear();
	}

	// Locale text has no core/mod precedence; both stages load the same way.
	fn init_core(&mut self, pack: &ModInfo) {
		self.load_pack(pack);
	}

	fn init_mod(&mut self, pack: &ModInfo) {
		self.load_pack(pack);
	}

	fn clear_mod(&mut self, pack: &ModInfo) {
		// Both positions, by owner. Flat last-write-wins maps cannot restore
		// text the mod overwrote in another namespace; those overrides
		// outlive the mod.
		let removed = self.texts.remove_by_owner(&pack.id);
		tracing::debug!(pack = %pack.id, removed, "mod locale text cleared");
	}
}

impl fmt::Debug for LocaleTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocaleTable")
			.field("texts", &self.texts.len())
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}
