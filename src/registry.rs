//! Append-only hidden module / type sets.
//!
//! Registrations are rare (typically once, around logger installation)
//! while membership checks run on every log call. The sets are therefore
//! published copy-on-write through an [`ArcSwap`]: readers load a complete
//! snapshot without taking any lock, and writers serialize on a mutex,
//! re-check membership, and swap in a fresh set. A reader can never observe
//! a partially-updated set, and concurrent registrations never lose an
//! entry.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::frame::{ModuleRef, TypeRef};

type NameSet = HashSet<Arc<str>>;

/// Registry of modules and types excluded from call-site consideration.
///
/// Owned by whoever drives resolution (the enrichment layer constructs one
/// and injects it into its resolver); sharing between components is the
/// caller's choice via `Arc<HiddenSetRegistry>`.
pub struct HiddenSetRegistry {
    modules: ArcSwap<NameSet>,
    types: ArcSwap<NameSet>,
    write_lock: Mutex<()>,
}

impl HiddenSetRegistry {
    /// Create an empty registry. Sets only ever grow from here.
    pub fn new() -> Self {
        Self {
            modules: ArcSwap::from_pointee(NameSet::new()),
            types: ArcSwap::from_pointee(NameSet::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Register a module whose frames must never resolve as the call site.
    ///
    /// Idempotent; re-registering an already-hidden module is a cheap
    /// lock-free no-op.
    pub fn add_hidden_module(&self, module: &ModuleRef) {
        if self.insert(&self.modules, module.name().into()) {
            log::debug!("Registered hidden module: {}", module.name());
        }
    }

    /// Register a type whose frames must never resolve as the call site.
    pub fn add_hidden_type(&self, ty: &TypeRef) {
        let full_name = ty.full_name();
        if self.insert(&self.types, full_name.as_str().into()) {
            log::debug!("Registered hidden type: {full_name}");
        }
    }

    pub fn is_hidden_module(&self, module: &ModuleRef) -> bool {
        let snapshot = self.modules.load();
        !snapshot.is_empty() && snapshot.contains(module.name())
    }

    pub fn is_hidden_type(&self, ty: &TypeRef) -> bool {
        let snapshot = self.types.load();
        !snapshot.is_empty() && snapshot.contains(ty.full_name().as_str())
    }

    /// Number of registered hidden modules (full snapshot read).
    pub fn hidden_module_count(&self) -> usize {
        self.modules.load().len()
    }

    /// Number of registered hidden types (full snapshot read).
    pub fn hidden_type_count(&self) -> usize {
        self.types.load().len()
    }

    /// Copy-on-write insertion. Returns true when `key` was newly added.
    ///
    /// Fast path is an unlocked membership check against the current
    /// snapshot. The slow path takes the writer lock and re-checks, which
    /// closes the race where two threads both miss the fast check; the
    /// replacement set is published wholesale so readers always see either
    /// the old or the new set, never an in-between state.
    fn insert(&self, slot: &ArcSwap<NameSet>, key: Arc<str>) -> bool {
        if slot.load().contains(&key) {
            return false;
        }

        let _guard = self.write_lock.lock();
        let current = slot.load_full();
        if current.contains(&key) {
            return false;
        }

        let mut next = (*current).clone();
        next.insert(key);
        slot.store(Arc::new(next));
        true
    }
}

impl Default for HiddenSetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
