//! Namespaced key grammar for basalt packages.
//!
//! Every definition and localized string a package contributes is addressed
//! by a [`ModIdEntry`]: a dotted key whose first segment names the owning
//! package. The grammar is validated once at the boundary; everything past
//! the parse works with typed keys and never re-checks them.
//!
//! Three views exist over the same text:
//!
//! - [`ModId`] is a single segment naming a package, and doubles as the
//!   owner prefix of every key that package contributes.
//! - [`ModIdEntry`] is the full key, `Owner.Segment[.Segment...]`.
//! - [`Category`] is the first two segments, used to group related keys
//!   for set-style lookups.

mod entry;
mod error;
mod owner;
mod segment;

pub use entry::{Category, ModIdEntry};
pub use error::KeyError;
pub use owner::ModId;
