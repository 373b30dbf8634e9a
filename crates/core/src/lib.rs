//! Loading core shared by every basalt subsystem.
//!
//! Three ideas live here and everything else composes them:
//!
//! - [`LayeredMap`]: a two-layer keyed store where the overlay strictly
//!   shadows the base per key. The content registry maps its core/mod
//!   stages onto it; the locale table maps its fallback/selected locales
//!   onto the same structure.
//! - [`Subsystem`] and [`Loader`]: the staged lifecycle protocol. The host
//!   registers its subsystems once and drives them through init, core
//!   loads, mod loads, unloads, and sync as a group.
//! - The collaborator seams: [`Reporter`] for operator-facing diagnostics
//!   and [`PackSource`] for package content. The core reports failures and
//!   carries on; halting is always the host's decision.

pub mod error;
pub mod layer;
pub mod lifecycle;
pub mod report;
pub mod source;
pub mod sync;

pub use basalt_modid::{Category, KeyError, ModId, ModIdEntry};
pub use error::{CoreError, CoreWarning, ErrorKind};
pub use layer::{Layer, LayeredMap};
pub use lifecycle::{HostCtx, Loader, ModInfo, SharedSubsystem, Subsystem};
pub use report::{RecordingReporter, Report, Reporter, TracingReporter};
pub use source::{DirPackSource, MemPackSource, PackSource};
pub use sync::{RegistryDelta, RegistrySnapshot, Role, SyncPayload, SyncTransport};
