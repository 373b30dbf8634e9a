//! Category membership, kept alongside the entry store.
//!
//! Every entry key belongs to exactly one category, its first two segments.
//! The index records membership per layer so an unload can retract exactly
//! the keys a mod stage added, and lookups see the union of both layers.

use basalt_core::Layer;
use basalt_modid::{Category, ModId, ModIdEntry};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

/// Per-layer sets of entry keys, grouped by category.
#[derive(Debug, Default)]
pub struct CategoryIndex {
	base: FxHashMap<Category, IndexSet<ModIdEntry>>,
	overlay: FxHashMap<Category, IndexSet<ModIdEntry>>,
}

impl CategoryIndex {
	pub fn new() -> Self {
		Self::default()
	}

	fn layer(&self, layer: Layer) -> &FxHashMap<Category, IndexSet<ModIdEntry>> {
		match layer {
			Layer::Base => &self.base,
			Layer::Overlay => &self.overlay,
		}
	}

	fn layer_mut(&mut self, layer: Layer) -> &mut FxHashMap<Category, IndexSet<ModIdEntry>> {
		match layer {
			Layer::Base => &mut self.base,
			Layer::Overlay => &mut self.overlay,
		}
	}

	/// Records `key` as a member of its category on `layer`.
	pub fn insert(&mut self, layer: Layer, key: ModIdEntry) {
		self.layer_mut(layer)
			.entry(key.category())
			.or_default()
			.insert(key);
	}

	/// Drops `key` from its category on `layer`. Empty member sets are
	/// removed so a stale category never answers lookups.
	pub fn remove_key(&mut self, layer: Layer, key: &ModIdEntry) {
		let category = key.category();
		let sets = self.layer_mut(layer);
		if let Some(members) = sets.get_mut(&category) {
			members.shift_remove(key);
			if members.is_empty() {
				sets.remove(&category);
			}
		}
	}

	/// Drops every key owned by `owner` from `layer`, returning how many
	/// memberships were removed.
	pub fn remove_by_owner(&mut self, layer: Layer, owner: &ModId) -> usize {
		let sets = self.layer_mut(layer);
		let mut removed = 0;
		sets.retain(|_, members| {
			members.retain(|key| {
				let keep = !key.is_owned_by(owner);
				if !keep {
					removed += 1;
				}
				keep
			});
			!members.is_empty()
		});
		removed
	}

	/// The members of `category` across both layers, base entries first.
	pub fn lookup(&self, category: &Category) -> IndexSet<ModIdEntry> {
		let mut members = IndexSet::new();
		if let Some(base) = self.base.get(category) {
			members.extend(base.iter().cloned());
		}
		if let Some(overlay) = self.overlay.get(category) {
			members.extend(overlay.iter().cloned());
		}
		members
	}

	/// Whether `key` is recorded on `layer`.
	pub fn contains(&self, layer: Layer, key: &ModIdEntry) -> bool {
		self.layer(layer)
			.get(&key.category())
			.is_some_and(|members| members.contains(key))
	}

	pub fn clear(&mut self) {
		self.base.clear();
		self.overlay.clear();
	}
}
