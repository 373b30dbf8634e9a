//! The explicit type registration table.
//!
//! Entry documents declare their shape by type key. Every decodable type is
//! registered here up front, one decoder per key, and the load path resolves
//! declared keys against the table. Each package's initialization populates
//! the table during host startup, before any loading begins; a key the table
//! does not know surfaces as an unresolved-type report at load time.

use std::fmt;

use basalt_modid::ModIdEntry;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a document could not become payload bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// The document did not match the declared type's shape.
	#[error("document does not fit the declared type: {0}")]
	Shape(#[source] serde_json::Error),
	/// The decoded value failed to re-encode as payload bytes.
	#[error("failed to encode payload: {0}")]
	Encode(#[source] rmp_serde::encode::Error),
}

/// Decodes one JSON document into opaque payload bytes.
///
/// The bytes are the MessagePack encoding of the registered Rust type, so a
/// later [`decode`](crate::entries::EntryRegistry::decode) against the same
/// type round-trips losslessly. The registry treats the bytes as opaque.
pub struct EntryDecoder {
	decode: Box<dyn Fn(&serde_json::Value) -> Result<Vec<u8>, DecodeError> + Send + Sync>,
}

impl EntryDecoder {
	fn of<T>() -> Self
	where
		T: Serialize + DeserializeOwned + 'static,
	{
		Self {
			decode: Box::new(|document| {
				let value = T::deserialize(document).map_err(DecodeError::Shape)?;
				rmp_serde::to_vec(&value).map_err(DecodeError::Encode)
			}),
		}
	}

	/// Runs one document through the registered type.
	pub fn decode(&self, document: &serde_json::Value) -> Result<Vec<u8>, DecodeError> {
		(self.decode)(document)
	}
}

impl fmt::Debug for EntryDecoder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("EntryDecoder(..)")
	}
}

/// Type keys to decoders, populated at startup.
#[derive(Default)]
pub struct TypeTable {
	decoders: FxHashMap<ModIdEntry, EntryDecoder>,
}

impl TypeTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `T` under `type_key`, replacing any previous registration
	/// for the same key.
	pub fn register<T>(&mut self, type_key: ModIdEntry)
	where
		T: Serialize + DeserializeOwned + 'static,
	{
		self.decoders.insert(type_key, EntryDecoder::of::<T>());
	}

	/// The decoder registered for `type_key`, if any.
	pub fn resolve(&self, type_key: &ModIdEntry) -> Option<&EntryDecoder> {
		self.decoders.get(type_key)
	}

	pub fn len(&self) -> usize {
		self.decoders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decoders.is_empty()
	}
}

impl fmt::Debug for TypeTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeTable")
			.field("types", &self.decoders.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};

	use super::*;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Widget {
		label: String,
		width: u32,
	}

	fn widget_key() -> ModIdEntry {
		ModIdEntry::parse("Base.Widget").unwrap()
	}

	#[test]
	fn resolves_registered_keys_only() {
		let mut table = TypeTable::new();
		assert!(table.is_empty());
		table.register::<Widget>(widget_key());

		assert!(table.resolve(&widget_key()).is_some());
		assert!(
			table
				.resolve(&ModIdEntry::parse("Base.Gadget").unwrap())
				.is_none()
		);
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn decode_round_trips_through_payload_bytes() {
		let mut table = TypeTable::new();
		table.register::<Widget>(widget_key());
		let decoder = table.resolve(&widget_key()).unwrap();

		let document = serde_json::json!({"label": "crate", "width": 3});
		let bytes = decoder.decode(&document).unwrap();
		let back: Widget = rmp_serde::from_slice(&bytes).unwrap();
		assert_eq!(
			back,
			Widget {
				label: "crate".to_owned(),
				width: 3,
			}
		);
	}

	#[test]
	fn decode_rejects_wrong_shape() {
		let mut table = TypeTable::new();
		table.register::<Widget>(widget_key());
		let decoder = table.resolve(&widget_key()).unwrap();

		let document = serde_json::json!({"label": 7});
		assert!(matches!(
			decoder.decode(&document),
			Err(DecodeError::Shape(_))
		));
	}

	#[test]
	fn register_replaces_previous_decoder() {
		#[derive(Serialize, Deserialize)]
		struct Renamed {
			title: String,
		}

		let mut table = TypeTable::new();
		table.register::<Widget>(widget_key());
		table.register::<Renamed>(widget_key());
		assert_eq!(table.len(), 1);

		let decoder = table.resolve(&widget_key()).unwrap();
		assert!(decoder.decode(&serde_json::json!({"title": "x"})).is_ok());
		assert!(
			decoder
				.decode(&serde_json::json!({"label": "x", "width": 1}))
				.is_err()
		);
	}
}
