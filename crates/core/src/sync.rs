//! Payloads exchanged between server and client roles.

use basalt_modid::ModIdEntry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which side of a session this instance plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	Server,
	Client,
}

/// Full snapshot of every named registry.
///
/// Insertion order is preserved end to end, so a key's position within its
/// registry can serve as an implicit wire id. Consumers that don't need
/// ids may treat the lists as sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
	pub registries: IndexMap<String, Vec<ModIdEntry>>,
}

/// One incremental mutation to a named registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryDelta {
	/// An entry joined the named registry.
	Add { registry: String, entry: ModIdEntry },
	/// An entry left the named registry.
	Remove { registry: String, entry: ModIdEntry },
}

/// Sync state routed between same-named subsystems on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPayload {
	Registry(RegistrySnapshot),
}

/// Outbound path for incremental deltas to already-synced peers.
///
/// How deltas reach the wire is the host's concern; the core only needs
/// somewhere to hand them.
pub trait SyncTransport: Send + Sync {
	fn broadcast(&self, delta: &RegistryDelta);
}
