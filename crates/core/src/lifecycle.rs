//! The staged lifecycle protocol and the loader that drives it.
//!
//! Subsystems implement [`Subsystem`] independently; the [`Loader`] walks a
//! heterogeneous collection of them through the same verbs in registration
//! order. Staging violations are reported as `InvalidState` and the call is
//! skipped. The protocol never panics over ordering.

use std::fmt;
use std::sync::Arc;

use basalt_modid::ModId;
use indexmap::IndexSet;
use parking_lot::RwLock;

use crate::error::CoreError;
use crate::report::Reporter;
use crate::source::PackSource;
use crate::sync::SyncPayload;

/// Identity of a loadable package.
///
/// `id` doubles as the owner segment of every key the package contributes;
/// unload scoping relies on that equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
	pub id: ModId,
	pub name: String,
}

impl ModInfo {
	pub fn new(id: ModId, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
		}
	}

	/// Uses the id text as the display name.
	pub fn from_id(id: ModId) -> Self {
		let name = id.as_str().to_owned();
		Self { id, name }
	}
}

/// Collaborators shared by every subsystem.
///
/// Built once by the host at startup. Subsystems clone the handles they
/// need at construction time; nothing reaches for process-wide state.
#[derive(Clone)]
pub struct HostCtx {
	pub reporter: Arc<dyn Reporter>,
	pub source: Arc<dyn PackSource>,
}

impl HostCtx {
	pub fn new(reporter: Arc<dyn Reporter>, source: Arc<dyn PackSource>) -> Self {
		Self { reporter, source }
	}
}

impl fmt::Debug for HostCtx {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HostCtx").finish_non_exhaustive()
	}
}

/// One staged subsystem.
///
/// `init` and `clear` bracket the whole lifetime; the stage verbs default
/// to no-ops so a subsystem only implements the stages it participates in.
pub trait Subsystem: Send + Sync {
	/// Stable name, used for sync routing and logs.
	fn name(&self) -> &'static str;

	/// Allocates empty state. Uninitialized → Ready.
	fn init(&mut self);

	/// Drops all state; afterwards the subsystem is as if never initialized.
	fn clear(&mut self);

	/// Loads one package's base-layer contributions.
	fn init_core(&mut self, pack: &ModInfo) {
		let _ = pack;
	}

	/// Loads one package's overlay-layer contributions.
	fn init_mod(&mut self, pack: &ModInfo) {
		let _ = pack;
	}

	/// Removes one package's overlay contributions only.
	fn clear_mod(&mut self, pack: &ModInfo) {
		let _ = pack;
	}

	/// Finalize hook fired once after a batch of `clear_mod` calls.
	fn cleared_mods(&mut self) {}

	/// Server-role export of syncable state.
	fn sync_out(&mut self) -> Option<SyncPayload> {
		None
	}

	/// Client-role import of a server's exported state.
	fn sync_in(&mut self, payload: SyncPayload) {
		let _ = payload;
	}
}

/// Shared handle the loader holds for each registered subsystem.
///
/// The host keeps its own typed `Arc<RwLock<...>>` clones for direct calls;
/// the loader only drives the protocol.
pub type SharedSubsystem = Arc<RwLock<dyn Subsystem>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoaderState {
	Uninitialized,
	Ready,
}

/// Drives every registered subsystem through the staged protocol.
///
/// Tracks which packages have passed each stage so ordering violations can
/// be rejected per call instead of corrupting layer contents.
pub struct Loader {
	systems: Vec<SharedSubsystem>,
	reporter: Arc<dyn Reporter>,
	state: LoaderState,
	core_loaded: IndexSet<ModId>,
	mods_loaded: IndexSet<ModId>,
	unload_pending: bool,
}

impl Loader {
	pub fn new(reporter: Arc<dyn Reporter>) -> Self {
		Self {
			systems: Vec::new(),
			reporter,
			state: LoaderState::Uninitialized,
			core_loaded: IndexSet::new(),
			mods_loaded: IndexSet::new(),
			unload_pending: false,
		}
	}

	/// Registers a subsystem. Order matters: every stage verb visits
	/// subsystems in registration order.
	pub fn register(&mut self, system: SharedSubsystem) {
		self.systems.push(system);
	}

	fn reject(&self, operation: &'static str, reason: impl Into<String>) {
		self.reporter.error(&CoreError::InvalidState {
			operation,
			reason: reason.into(),
		});
	}

	fn guard_ready(&self, operation: &'static str) -> bool {
		if self.state != LoaderState::Ready {
			self.reject(operation, "loader is not initialized");
			return false;
		}
		true
	}

	/// Initializes every subsystem. Valid only from the uninitialized state.
	pub fn init(&mut self) {
		if self.state != LoaderState::Uninitialized {
			self.reject("init", "already initialized");
			return;
		}
		for system in &self.systems {
			system.write().init();
		}
		self.state = LoaderState::Ready;
		tracing::debug!(systems = self.systems.len(), "lifecycle ready");
	}

	/// Runs the core (base-layer) stage for one package. A package's core
	/// stage must precede its own mod stage; once the mod stage has run the
	/// call is rejected.
	pub fn load_core(&mut self, pack: &ModInfo) {
		if !self.guard_ready("load_core") {
			return;
		}
		if self.mods_loaded.contains(&pack.id) {
			self.reject(
				"load_core",
				format!("mod stage already ran for `{}`", pack.id),
			);
			return;
		}
		tracing::info!(pack = %pack.id, "core stage");
		for system in &self.systems {
			system.write().init_core(pack);
		}
		self.core_loaded.insert(pack.id.clone());
	}

	/// Runs the mod (overlay-layer) stage for one package. Some package
	/// must have passed the core stage first, so overlays always land on a
	/// populated base layer; add-ons themselves need no core stage.
	pub fn load_mod(&mut self, pack: &ModInfo) {
		if !self.guard_ready("load_mod") {
			return;
		}
		if self.core_loaded.is_empty() {
			self.reject("load_mod", "no package has passed the core stage");
			return;
		}
		tracing::info!(pack = %pack.id, "mod stage");
		for system in &self.systems {
			system.write().init_mod(pack);
		}
		self.mods_loaded.insert(pack.id.clone());
	}

	/// Removes one package's overlay contributions from every subsystem.
	/// Call [`finish_unload`](Self::finish_unload) once the batch is done.
	pub fn unload_mod(&mut self, pack: &ModInfo) {
		if !self.guard_ready("unload_mod") {
			return;
		}
		tracing::info!(pack = %pack.id, "unloading mod");
		for system in &self.systems {
			system.write().clear_mod(pack);
		}
		self.mods_loaded.shift_remove(&pack.id);
		self.unload_pending = true;
	}

	/// Fires the batch-finalize hook after one or more unloads.
	pub fn finish_unload(&mut self) {
		if !self.guard_ready("finish_unload") {
			return;
		}
		if !self.unload_pending {
			self.reject("finish_unload", "no unload batch in progress");
			return;
		}
		for system in &self.systems {
			system.write().cleared_mods();
		}
		self.unload_pending = false;
		self.reporter.message("cleared mods");
	}

	/// Tears everything down. The loader returns to the uninitialized
	/// state and may be initialized again.
	pub fn clear(&mut self) {
		if !self.guard_ready("clear") {
			return;
		}
		for system in &self.systems {
			system.write().clear();
		}
		self.state = LoaderState::Uninitialized;
		self.core_loaded.clear();
		self.mods_loaded.clear();
		self.unload_pending = false;
		tracing::debug!("lifecycle cleared");
	}

	/// Collects every subsystem's exportable sync state, tagged by name.
	pub fn sync_out(&mut self) -> Vec<(&'static str, SyncPayload)> {
		if !self.guard_ready("sync_out") {
			return Vec::new();
		}
		let mut payloads = Vec::new();
		for system in &self.systems {
			let mut guard = system.write();
			if let Some(payload) = guard.sync_out() {
				payloads.push((guard.name(), payload));
			}
		}
		payloads
	}

	/// Routes one sync payload to the subsystem with the matching name.
	pub fn sync_in(&mut self, name: &str, payload: SyncPayload) {
		if !self.guard_ready("sync_in") {
			return;
		}
		for system in &self.systems {
			let mut guard = system.write();
			if guard.name() == name {
				guard.sync_in(payload);
				return;
			}
		}
		self.reject("sync_in", format!("no subsystem named `{name}`"));
	}

	pub fn is_core_loaded(&self, id: &ModId) -> bool {
		self.core_loaded.contains(id)
	}

	pub fn is_mod_loaded(&self, id: &ModId) -> bool {
		self.mods_loaded.contains(id)
	}

	/// Mods currently loaded, in load order.
	pub fn loaded_mods(&self) -> impl Iterator<Item = &ModId> {
		self.mods_loaded.iter()
	}
}

impl fmt::Debug for Loader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Loader")
			.field("systems", &self.systems.len())
			.field("state", &self.state)
			.field("core_loaded", &self.core_loaded)
			.field("mods_loaded", &self.mods_loaded)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use crate::error::ErrorKind;
	use crate::report::{RecordingReporter, Report};

	use super::*;

	/// Records every verb it receives, in order.
	#[derive(Default)]
	struct Probe {
		calls: Vec<String>,
	}

	impl Subsystem for Probe {
		fn name(&self) -> &'static str {
			"probe"
		}

		fn init(&mut self) {
			self.calls.push("init".to_owned());
		}

		fn clear(&mut self) {
			self.calls.push("clear".to_owned());
		}

		fn init_core(&mut self, pack: &ModInfo) {
			self.calls.push(format!("init_core:{}", pack.id));
		}

		fn init_mod(&mut self, pack: &ModInfo) {
			self.calls.push(format!("init_mod:{}", pack.id));
		}

		fn clear_mod(&mut self, pack: &ModInfo) {
			self.calls.push(format!("clear_mod:{}", pack.id));
		}

		fn cleared_mods(&mut self) {
			self.calls.push("cleared_mods".to_owned());
		}
	}

	fn pack(id: &str) -> ModInfo {
		ModInfo::from_id(ModId::parse(id).unwrap())
	}

	fn fixture() -> (Loader, Arc<RwLock<Probe>>, Arc<RecordingReporter>) {
		let reporter = Arc::new(RecordingReporter::new());
		let probe = Arc::new(RwLock::new(Probe::default()));
		let mut loader = Loader::new(reporter.clone());
		loader.register(probe.clone());
		(loader, probe, reporter)
	}

	#[test]
	fn full_staging_sequence_in_order() {
		let (mut loader, probe, reporter) = fixture();
		loader.init();
		loader.load_core(&pack("Base"));
		loader.load_core(&pack("Mod1"));
		loader.load_mod(&pack("Mod1"));
		loader.unload_mod(&pack("Mod1"));
		loader.finish_unload();
		loader.clear();

		assert_eq!(
			probe.read().calls,
			vec![
				"init",
				"init_core:Base",
				"init_core:Mod1",
				"init_mod:Mod1",
				"clear_mod:Mod1",
				"cleared_mods",
				"clear",
			]
		);
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 0);
	}

	#[test]
	fn stage_calls_before_init_are_rejected() {
		let (mut loader, probe, reporter) = fixture();
		loader.load_core(&pack("Base"));
		loader.load_mod(&pack("Base"));
		loader.clear();

		assert!(probe.read().calls.is_empty());
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 3);
	}

	#[test]
	fn double_init_is_rejected() {
		let (mut loader, probe, reporter) = fixture();
		loader.init();
		loader.init();
		assert_eq!(probe.read().calls, vec!["init"]);
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 1);
	}

	#[test]
	fn mod_stage_requires_a_loaded_base() {
		let (mut loader, probe, reporter) = fixture();
		loader.init();
		loader.load_mod(&pack("Mod1"));

		assert_eq!(probe.read().calls, vec!["init"]);
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 1);
		assert!(!loader.is_mod_loaded(&ModId::parse("Mod1").unwrap()));

		// Any package passing the core stage satisfies the precondition;
		// an add-on needs no core stage of its own.
		loader.load_core(&pack("Base"));
		loader.load_mod(&pack("Mod1"));
		assert!(loader.is_mod_loaded(&ModId::parse("Mod1").unwrap()));
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 1);
	}

	#[test]
	fn core_stage_after_own_mod_stage_is_rejected() {
		let (mut loader, probe, reporter) = fixture();
		loader.init();
		loader.load_core(&pack("Base"));
		loader.load_mod(&pack("Mod1"));
		loader.load_core(&pack("Mod1"));

		assert_eq!(
			probe.read().calls,
			vec!["init", "init_core:Base", "init_mod:Mod1"]
		);
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 1);
		assert!(!loader.is_core_loaded(&ModId::parse("Mod1").unwrap()));
	}

	#[test]
	fn finish_unload_fires_once_per_batch() {
		let (mut loader, probe, reporter) = fixture();
		loader.init();
		loader.load_core(&pack("Mod1"));
		loader.load_core(&pack("Mod2"));
		loader.load_mod(&pack("Mod1"));
		loader.load_mod(&pack("Mod2"));

		loader.unload_mod(&pack("Mod1"));
		loader.unload_mod(&pack("Mod2"));
		loader.finish_unload();
		// Without a new batch the hook is a staging violation.
		loader.finish_unload();

		let hook_count = probe
			.read()
			.calls
			.iter()
			.filter(|call| *call == "cleared_mods")
			.count();
		assert_eq!(hook_count, 1);
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 1);
		assert!(
			reporter
				.reports()
				.contains(&Report::Message("cleared mods".to_owned()))
		);
	}

	#[test]
	fn clear_returns_to_uninitialized() {
		let (mut loader, probe, _reporter) = fixture();
		loader.init();
		loader.load_core(&pack("Base"));
		loader.clear();
		assert!(!loader.is_core_loaded(&ModId::parse("Base").unwrap()));
		// A cleared loader may be initialized again.
		loader.init();
		assert_eq!(probe.read().calls, vec!["init", "init_core:Base", "clear", "init"]);
	}

	#[test]
	fn sync_in_routes_by_name() {
		struct Sink {
			received: usize,
		}

		impl Subsystem for Sink {
			fn name(&self) -> &'static str {
				"sink"
			}
			fn init(&mut self) {}
			fn clear(&mut self) {}
			fn sync_in(&mut self, _payload: SyncPayload) {
				self.received += 1;
			}
		}

		let reporter = Arc::new(RecordingReporter::new());
		let sink = Arc::new(RwLock::new(Sink { received: 0 }));
		let mut loader = Loader::new(reporter.clone());
		loader.register(sink.clone());
		loader.init();

		let payload = SyncPayload::Registry(crate::sync::RegistrySnapshot::default());
		loader.sync_in("sink", payload.clone());
		loader.sync_in("nobody", payload);

		assert_eq!(sink.read().received, 1);
		assert_eq!(reporter.errors_of(ErrorKind::InvalidState), 1);
	}
}
