//! The two-layer override store.

use basalt_modid::{ModId, ModIdEntry};
use rustc_hash::FxHashMap;

/// Which layer of a [`LayeredMap`] a value lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
	/// The default layer. The content registry fills it during the core
	/// stage; the locale table keeps fallback-locale text here.
	Base,
	/// The shadowing layer. Mod-stage content and selected-locale text.
	Overlay,
}

/// A two-layer keyed map with override-on-read.
///
/// The overlay strictly shadows the base per key; values never merge.
/// Writes within one layer are last-write-wins. Removing an overlay value
/// re-exposes whatever the base holds for that key, which is the whole
/// reason the layers are kept separate.
#[derive(Debug, Clone)]
pub struct LayeredMap<V> {
	base: FxHashMap<ModIdEntry, V>,
	overlay: FxHashMap<ModIdEntry, V>,
}

impl<V> Default for LayeredMap<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> LayeredMap<V> {
	pub fn new() -> Self {
		Self {
			base: FxHashMap::default(),
			overlay: FxHashMap::default(),
		}
	}

	/// Inserts into the named layer, returning the value it replaced there.
	pub fn insert(&mut self, layer: Layer, key: ModIdEntry, value: V) -> Option<V> {
		match layer {
			Layer::Base => self.base.insert(key, value),
			Layer::Overlay => self.overlay.insert(key, value),
		}
	}

	pub fn insert_base(&mut self, key: ModIdEntry, value: V) -> Option<V> {
		self.insert(Layer::Base, key, value)
	}

	pub fn insert_overlay(&mut self, key: ModIdEntry, value: V) -> Option<V> {
		self.insert(Layer::Overlay, key, value)
	}

	/// Layered lookup: overlay first, then base.
	pub fn get(&self, key: &ModIdEntry) -> Option<&V> {
		self.overlay.get(key).or_else(|| self.base.get(key))
	}

	/// Layered lookup that also says which layer answered.
	pub fn get_layered(&self, key: &ModIdEntry) -> Option<(Layer, &V)> {
		if let Some(value) = self.overlay.get(key) {
			return Some((Layer::Overlay, value));
		}
		self.base.get(key).map(|value| (Layer::Base, value))
	}

	/// Lookup in one layer only, no shadowing.
	pub fn layer_get(&self, layer: Layer, key: &ModIdEntry) -> Option<&V> {
		match layer {
			Layer::Base => self.base.get(key),
			Layer::Overlay => self.overlay.get(key),
		}
	}

	pub fn contains(&self, key: &ModIdEntry) -> bool {
		self.overlay.contains_key(key) || self.base.contains_key(key)
	}

	/// Number of distinct keys across both layers.
	pub fn len(&self) -> usize {
		let unshadowed = self
			.base
			.keys()
			.filter(|key| !self.overlay.contains_key(*key))
			.count();
		self.overlay.len() + unshadowed
	}

	pub fn is_empty(&self) -> bool {
		self.base.is_empty() && self.overlay.is_empty()
	}

	pub fn base_len(&self) -> usize {
		self.base.len()
	}

	pub fn overlay_len(&self) -> usize {
		self.overlay.len()
	}

	/// Removes one overlay value, re-exposing the base value if any.
	pub fn remove_overlay(&mut self, key: &ModIdEntry) -> Option<V> {
		self.overlay.remove(key)
	}

	/// Removes every overlay value whose key `owner` owns, returning the
	/// removed keys. Base values stay untouched.
	pub fn remove_overlay_by_owner(&mut self, owner: &ModId) -> Vec<ModIdEntry> {
		let removed: Vec<ModIdEntry> = self
			.overlay
			.keys()
			.filter(|key| key.is_owned_by(owner))
			.cloned()
			.collect();
		for key in &removed {
			self.overlay.remove(key);
		}
		removed
	}

	/// Removes every value whose key `owner` owns, in both layers.
	/// Returns how many values were dropped.
	pub fn remove_by_owner(&mut self, owner: &ModId) -> usize {
		let before = self.base.len() + self.overlay.len();
		self.base.retain(|key, _| !key.is_owned_by(owner));
		self.overlay.retain(|key, _| !key.is_owned_by(owner));
		before - (self.base.len() + self.overlay.len())
	}

	pub fn clear(&mut self) {
		self.base.clear();
		self.overlay.clear();
	}

	/// Iterates the merged view: every overlay pair, plus base pairs whose
	/// keys the overlay does not shadow. Order is unspecified.
	pub fn iter_merged(&self) -> impl Iterator<Item = (&ModIdEntry, &V)> {
		self.overlay.iter().chain(
			self.base
				.iter()
				.filter(|(key, _)| !self.overlay.contains_key(*key)),
		)
	}
}
