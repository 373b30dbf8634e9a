//! Named registries synchronized between a server and its clients.
//!
//! The server is authoritative: clients receive a full snapshot on join and
//! incremental deltas afterwards. Deltas flow only once the first snapshot
//! has been exported; before that there is nobody to keep consistent.

use std::fmt;
use std::sync::Arc;

use basalt_core::{
	CoreError, HostCtx, ModInfo, RegistryDelta, RegistrySnapshot, Reporter, Role, Subsystem,
	SyncPayload, SyncTransport,
};
use basalt_modid::ModIdEntry;
use indexmap::{IndexMap, IndexSet};

/// Named sets of entry keys, kept in insertion order on both sides.
///
/// Order matters on the wire: a key's position within its registry is its
/// implicit id, so the snapshot and every delta preserve it.
pub struct RegistryHub {
	registries: IndexMap<String, IndexSet<ModIdEntry>>,
	role: Role,
	synced: bool,
	transport: Option<Arc<dyn SyncTransport>>,
	reporter: Arc<dyn Reporter>,
}

impl RegistryHub {
	pub fn new(ctx: &HostCtx, role: Role) -> Self {
		Self {
			registries: IndexMap::new(),
			role,
			synced: false,
			transport: None,
			reporter: ctx.reporter.clone(),
		}
	}

	/// Attaches the outbound delta path. Servers without a transport still
	/// track state; they just cannot push increments.
	pub fn with_transport(mut self, transport: Arc<dyn SyncTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn role(&self) -> Role {
		self.role
	}

	/// True once this side has taken part in a snapshot exchange.
	pub fn is_synced(&self) -> bool {
		self.synced
	}

	/// Adds `entry` to the named registry. Returns whether the set changed;
	/// only an actual change is broadcast.
	pub fn add_entry(&mut self, registry: &str, entry: ModIdEntry) -> bool {
		let inserted = self
			.registries
			.entry(registry.to_owned())
			.or_default()
			.insert(entry.clone());
		if inserted {
			self.broadcast(&RegistryDelta::Add {
				registry: registry.to_owned(),
				entry,
			});
		}
		inserted
	}

	/// Removes `entry` from the named registry. Returns whether the set
	/// changed; only an actual change is broadcast.
	pub fn remove_entry(&mut self, registry: &str, entry: &ModIdEntry) -> bool {
		let removed = self
			.registries
			.get_mut(registry)
			.is_some_and(|entries| entries.shift_remove(entry));
		if removed {
			self.broadcast(&RegistryDelta::Remove {
				registry: registry.to_owned(),
				entry: entry.clone(),
			});
		}
		removed
	}

	pub fn contains(&self, registry: &str, entry: &ModIdEntry) -> bool {
		self.registries
			.get(registry)
			.is_some_and(|entries| entries.contains(entry))
	}

	/// The named registry's keys in insertion order; empty if unknown.
	pub fn entries(&self, registry: &str) -> impl Iterator<Item = &ModIdEntry> {
		self.registries.get(registry).into_iter().flatten()
	}

	/// The full current state, insertion order preserved.
	pub fn snapshot(&self) -> RegistrySnapshot {
		RegistrySnapshot {
			registries: self
				.registries
				.iter()
				.map(|(name, entries)| (name.clone(), entries.iter().cloned().collect()))
				.collect(),
		}
	}

	/// Applies one incremental mutation received from the server.
	pub fn apply_delta(&mut self, delta: &RegistryDelta) {
		match delta {
			RegistryDelta::Add { registry, entry } => {
				self.registries
					.entry(registry.clone())
					.or_default()
					.insert(entry.clone());
			}
			RegistryDelta::Remove { registry, entry } => {
				if let Some(entries) = self.registries.get_mut(registry) {
					entries.shift_remove(entry);
				}
			}
		}
	}

	fn broadcast(&self, delta: &RegistryDelta) {
		if self.role != Role::Server || !self.synced {
			return;
		}
		if let Some(transport) = &self.transport {
			transport.broadcast(delta);
		}
	}
}

impl Subsystem for RegistryHub {
	fn name(&self) -> &'static str {
		"registry"
	}

	fn init(&mut self) {
		self.registries.clear();
		self.synced = false;
	}

	fn clear(&mut self) {
		self.registries.clear();
		self.synced = false;
	}

	/// Strips every key the pack owns from every named set, so no stale
	/// entries leak to peers after an unload.
	fn clear_mod(&mut self, pack: &ModInfo) {
		let mut stale = Vec::new();
		for (name, entries) in &self.registries {
			for entry in entries {
				if entry.is_owned_by(&pack.id) {
					stale.push((name.clone(), entry.clone()));
				}
			}
		}
		for (registry, entry) in stale {
			self.remove_entry(&registry, &entry);
		}
	}

	fn sync_out(&mut self) -> Option<SyncPayload> {
		if self.role != Role::Server {
			self.reporter.error(&CoreError::InvalidState {
				operation: "sync_out",
				reason: "only the server exports registry state".to_owned(),
			});
			return None;
		}
		self.synced = true;
		tracing::debug!(registries = self.registries.len(), "registry state exported");
		Some(SyncPayload::Registry(self.snapshot()))
	}

	fn sync_in(&mut self, payload: SyncPayload) {
		if self.role != Role::Client {
			self.reporter.error(&CoreError::InvalidState {
				operation: "sync_in",
				reason: "only a client imports registry state".to_owned(),
			});
			return;
		}
		let SyncPayload::Registry(snapshot) = payload;
		self.registries = snapshot
			.registries
			.into_iter()
			.map(|(name, entries)| (name, entries.into_iter().collect()))
			.collect();
		self.synced = true;
		tracing::debug!(registries = self.registries.len(), "registry state imported");
	}
}

impl fmt::Debug for RegistryHub {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegistryHub")
			.field("registries", &self.registries.len())
			.field("role", &self.role)
			.field("synced", &self.synced)
			.finish_non_exhaustive()
	}
}
