//! Id-keyed registration table with revocable handles.

use crate::types::RegistrationId;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Zero-argument callback invoked after every state transition.
pub type Subscriber = Arc<dyn Fn() + Send + Sync>;

/// Something that can drop a registration by id.
pub trait Deregister: Send + Sync {
    /// Remove the entry. Returns false if it was already gone.
    fn deregister(&self, id: RegistrationId) -> bool;
}

/// Ordered table of registered callbacks.
pub struct Registry<T> {
    /// Entries by id. Ids only grow, so key order is registration order.
    entries: RwLock<BTreeMap<RegistrationId, T>>,
    /// Counter for generating ids.
    next_id: AtomicU64,
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Whether `id` is still registered.
    pub fn contains(&self, id: RegistrationId) -> bool {
        self.entries.read().contains_key(&id)
    }
}

impl<T: Send + Sync + 'static> Registry<T> {
    /// Register `entry` and return the handle that removes it.
    pub fn register(this: &Arc<Self>, entry: T) -> Unsubscribe {
        let id = RegistrationId(this.next_id.fetch_add(1, Ordering::SeqCst));
        this.entries.write().insert(id, entry);
        tracing::trace!(%id, "registered");

        let registry: Weak<dyn Deregister> = Arc::downgrade(this) as Weak<dyn Deregister>;
        Unsubscribe { id, registry }
    }
}

impl<T: Clone> Registry<T> {
    /// Copy of the current entries in registration order.
    ///
    /// Callers iterate the snapshot with no lock held, so entries may
    /// register or unregister themselves while being invoked.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.read().values().cloned().collect()
    }
}

impl<T: Send + Sync> Deregister for Registry<T> {
    fn deregister(&self, id: RegistrationId) -> bool {
        let removed = self.entries.write().remove(&id).is_some();
        if removed {
            tracing::trace!(%id, "unregistered");
        }
        removed
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by `subscribe` and `add_middleware`.
///
/// Dropping the handle leaves the registration in place; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[must_use = "dropping an Unsubscribe handle makes the registration permanent"]
pub struct Unsubscribe {
    id: RegistrationId,
    registry: Weak<dyn Deregister>,
}

impl Unsubscribe {
    /// Id of the registration this handle controls.
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Remove the registration. Idempotent.
    ///
    /// Returns true only for the call that actually removed it.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.deregister(self.id),
            None => false,
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}
