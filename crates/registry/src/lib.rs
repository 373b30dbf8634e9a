//! Layered content registry and synced registry hub.
//!
//! [`EntryRegistry`] holds every content definition packages contribute:
//! opaque payload bytes keyed by namespace key, two-layered so mod-stage
//! entries shadow core-stage entries per key, with a category index kept in
//! lockstep. Documents declare their shape by type key; [`TypeTable`] maps
//! those keys to decoders registered explicitly at startup.
//!
//! [`RegistryHub`] is the smaller, wire-facing sibling: named sets of entry
//! keys a server exports to joining clients and keeps aligned with deltas.

pub mod categories;
pub mod entries;
pub mod hub;
pub mod types;

pub use categories::CategoryIndex;
pub use entries::{EntryRecord, EntryRegistry};
pub use hub::RegistryHub;
pub use types::{DecodeError, EntryDecoder, TypeTable};
