//! Localized text for basalt packages.
//!
//! [`LocaleTable`] keeps the selected locale's text shadowing the fallback
//! locale's through one layered store, so lookups prefer the player's
//! language and degrade observably: a fallback hit warns, a miss warns and
//! returns the raw key, and nothing here ever fails a caller.

pub mod format;
pub mod manifest;
pub mod table;

pub use format::{FormatError, render};
pub use manifest::{DEFAULT_LOCALE, LocaleManifest, LocaleSettings, MANIFEST_PATH};
pub use table::LocaleTable;
