//! The content entry registry.
//!
//! Packages declare entries in JSON files under `Entries/`. Each file maps
//! declared type keys to documents keyed by discriminator; loading runs every
//! document through the type table and stores the payload bytes under a
//! derived key:
//!
//! ```text
//! {type owner}.Entries.{type entry path}.{discriminator}
//! ```
//!
//! Core-stage content lands in the base layer and mod-stage content in the
//! overlay, so an override shadows instead of overwriting and unloading the
//! mod re-exposes whatever it shadowed.

use std::fmt;
use std::sync::Arc;

use basalt_core::{
	CoreError, HostCtx, Layer, LayeredMap, ModInfo, PackSource, Reporter, Subsystem,
};
use basalt_modid::{Category, ModId, ModIdEntry};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;

use crate::categories::CategoryIndex;
use crate::types::TypeTable;

const ENTRIES_DIR: &str = "Entries";

/// One stored entry: opaque payload bytes plus the type key they decode as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
	pub payload: Vec<u8>,
	pub type_key: ModIdEntry,
}

impl EntryRecord {
	pub fn new(payload: Vec<u8>, type_key: ModIdEntry) -> Self {
		Self { payload, type_key }
	}
}

/// The layered entry store with its category index and type table.
///
/// Overlay inserts log the contributing package, so unloading a mod retracts
/// both its own-namespace keys and the overrides it wrote into other
/// namespaces.
pub struct EntryRegistry {
	entries: LayeredMap<EntryRecord>,
	categories: CategoryIndex,
	types: TypeTable,
	contributors: FxHashMap<ModIdEntry, ModId>,
	reporter: Arc<dyn Reporter>,
	source: Arc<dyn PackSource>,
}

impl EntryRegistry {
	/// The type table is fixed at construction; every decodable type is
	/// registered before loading begins.
	pub fn new(ctx: &HostCtx, types: TypeTable) -> Self {
		Self {
			entries: LayeredMap::new(),
			categories: CategoryIndex::new(),
			types,
			contributors: FxHashMap::default(),
			reporter: ctx.reporter.clone(),
			source: ctx.source.clone(),
		}
	}

	pub fn types(&self) -> &TypeTable {
		&self.types
	}

	/// Registers one base-layer entry under `key`.
	pub fn add_core_entry(&mut self, key: ModIdEntry, record: EntryRecord) {
		self.categories.insert(Layer::Base, key.clone());
		self.entries.insert_base(key, record);
	}

	/// Registers one overlay entry under `key`, logging `contributor` so the
	/// entry is retracted when that package unloads.
	pub fn add_mod_entry(&mut self, contributor: &ModId, key: ModIdEntry, record: EntryRecord) {
		self.categories.insert(Layer::Overlay, key.clone());
		self.contributors.insert(key.clone(), contributor.clone());
		self.entries.insert_overlay(key, record);
	}

	/// Layered lookup: overlay first, then base.
	pub fn get(&self, key: &ModIdEntry) -> Option<&EntryRecord> {
		self.entries.get(key)
	}

	/// Lookup by raw text. An unparseable key is reported and answers
	/// `None` instead of poisoning the caller.
	pub fn get_str(&self, key: &str) -> Option<&EntryRecord> {
		match ModIdEntry::parse(key) {
			Ok(key) => self.entries.get(&key),
			Err(error) => {
				self.reporter.error(&CoreError::InvalidKey {
					input: key.to_owned(),
					source: error,
				});
				None
			}
		}
	}

	/// Decodes the payload under `key` as `T`. A payload that does not fit
	/// `T` is reported as a decode failure and answers `None`.
	pub fn decode<T>(&self, key: &ModIdEntry) -> Option<T>
	where
		T: DeserializeOwned,
	{
		let record = self.entries.get(key)?;
		match rmp_serde::from_slice(&record.payload) {
			Ok(value) => Some(value),
			Err(error) => {
				self.reporter.error(&CoreError::DecodeFailure {
					path: key.to_string(),
					detail: error.to_string(),
				});
				None
			}
		}
	}

	/// Every key in `category`, across both layers.
	pub fn in_category(&self, category: &Category) -> IndexSet<ModIdEntry> {
		self.categories.lookup(category)
	}

	/// The merged view: overlay entries shadow base entries per key.
	pub fn iter(&self) -> impl Iterator<Item = (&ModIdEntry, &EntryRecord)> {
		self.entries.iter_merged()
	}

	/// Number of distinct keys across both layers.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn load_entries(&mut self, pack: &ModInfo, layer: Layer) {
		if !self.source.dir_exists(&pack.id, ENTRIES_DIR) {
			self.reporter.error(&CoreError::MissingResource {
				pack: pack.id.clone(),
				path: ENTRIES_DIR.to_owned(),
				source: None,
			});
			return;
		}
		let files = match self.source.list_files(&pack.id, ENTRIES_DIR) {
			Ok(files) => files,
			Err(error) => {
				self.reporter.error(&CoreError::MissingResource {
					pack: pack.id.clone(),
					path: ENTRIES_DIR.to_owned(),
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
			let path = format!("{ENTRIES_DIR}/{name}");
			loaded += self.load_file(pack, &path, layer);
		}
		tracing::debug!(pack = %pack.id, ?layer, entries = loaded, "entries loaded");
	}

	/// Loads one entries file; returns how many documents became entries.
	/// Each failing unit (the file, one declared type, one document) is
	/// reported and skipped while its siblings continue.
	fn load_file(&mut self, pack: &ModInfo, path: &str, layer: Layer) -> usize {
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
		let documents: IndexMap<String, IndexMap<String, serde_json::Value>> =
			match serde_json::from_str(&text) {
				Ok(documents) => documents,
				Err(error) => {
					self.reporter.error(&CoreError::DecodeFailure {
						path: path.to_owned(),
						detail: error.to_string(),
					});
					return 0;
				}
			};

		// Decode first, insert after: the decoder borrows the type table,
		// inserts need the registry mutable.
		let mut ready: Vec<(ModIdEntry, EntryRecord)> = Vec::new();
		for (declared, group) in &documents {
			let type_key = match ModIdEntry::parse(declared) {
				Ok(type_key) => type_key,
				Err(error) => {
					self.reporter.error(&CoreError::InvalidKey {
						input: declared.clone(),
						source: error,
					});
					continue;
				}
			};
			let Some(decoder) = self.types.resolve(&type_key) else {
				self.reporter.error(&CoreError::UnresolvedType { key: type_key });
				continue;
			};
			for (discriminator, document) in group {
				let key = match ModIdEntry::compose([
					type_key.owner_str(),
					ENTRIES_DIR,
					type_key.entry_path(),
					discriminator.as_str(),
				]) {
					Ok(key) => key,
					Err(error) => {
						self.reporter.error(&CoreError::InvalidKey {
							input: discriminator.clone(),
							source: error,
						});
						continue;
					}
				};
				match decoder.decode(document) {
					Ok(payload) => {
						ready.push((key, EntryRecord::new(payload, type_key.clone())));
					}
					Err(error) => {
						self.reporter.error(&CoreError::DecodeFailure {
							path: path.to_owned(),
							detail: format!("`{key}`: {error}"),
						});
					}
				}
			}
		}

		let count = ready.len();
		for (key, record) in ready {
			match layer {
				Layer::Base => self.add_core_entry(key, record),
				Layer::Overlay => self.add_mod_entry(&pack.id, key, record),
			}
		}
		count
	}
}

impl Subsystem for EntryRegistry {
	fn name(&self) -> &'static str {
		"entries"
	}

	// The type table survives init and clear; it is startup configuration,
	// not layer state, and a cleared registry must be able to reload.
	fn init(&mut self) {
		self.entries.clear();
		self.categories.clear();
		self.contributors.clear();
	}

	fn clear(&mut self) {
		self.entries.clear();
		self.categories.clear();
		self.contributors.clear();
	}

	fn init_core(&mut self, pack: &ModInfo) {
		self.load_entries(pack, Layer::Base);
	}

	fn init_mod(&mut self, pack: &ModInfo) {
		self.load_entries(pack, Layer::Overlay);
	}

	fn clear_mod(&mut self, pack: &ModInfo) {
		// Overlay keys in the pack's own namespace, plus the overrides it
		// contributed into other namespaces (logged at insert time). The
		// base layer is never touched here.
		let mut removed = self.entries.remove_overlay_by_owner(&pack.id);
		let foreign: Vec<ModIdEntry> = self
			.contributors
			.iter()
			.filter(|(key, contributor)| **contributor == pack.id && !key.is_owned_by(&pack.id))
			.map(|(key, _)| key.clone())
			.collect();
		for key in foreign {
			if self.entries.remove_overlay(&key).is_some() {
				removed.push(key);
			}
		}
		for key in &removed {
			self.categories.remove_key(Layer::Overlay, key);
			self.contributors.remove(key);
		}
		tracing::debug!(pack = %pack.id, removed = removed.len(), "mod entries cleared");
	}
}

impl fmt::Debug for EntryRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EntryRegistry")
			.field("entries", &self.entries.len())
			.field("types", &self.types)
			.finish_non_exhaustive()
	}
}
