use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that can be shared
/// across threads. It uses an `Arc<RwLock<T>>` internally, so any number of worker threads
/// may read concurrently while writes are exclusive.
///
/// A panic on another thread while it held the lock does not make the resource unusable:
/// the guard is recovered from the poisoned lock. Voxel data is plain bytes, so there is no
/// invariant a half-finished writer could leave broken beyond stale contents.
///
/// # Examples
///
/// ```
/// use voxel_mesh_engine::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = std::thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard that allows reading the contained value.
    ///
    /// Blocks while a writer holds the lock.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard that allows modifying the contained value.
    ///
    /// Blocks until every reader and any other writer has released the lock.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a non-owning handle to this resource.
    ///
    /// The handle does not keep the value alive; see [`WeakMtResource::upgrade`].
    pub fn downgrade(&self) -> WeakMtResource<T> {
        WeakMtResource {
            resource: Arc::downgrade(&self.resource),
        }
    }

    /// Returns `true` if both handles point at the same underlying value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

/// A non-owning handle to an [`MtResource`].
///
/// Used for back-references that must not form ownership cycles, such as a chunk
/// pointing at the store that owns it.
pub struct WeakMtResource<T: Send + Sync> {
    resource: Weak<RwLock<T>>,
}

impl<T: Send + Sync> WeakMtResource<T> {
    /// A handle that never upgrades. Useful for values built outside of any store.
    pub fn dangling() -> Self {
        Self {
            resource: Weak::new(),
        }
    }

    /// Attempts to obtain an owning handle.
    ///
    /// Returns `None` once every owning `MtResource` has been dropped.
    pub fn upgrade(&self) -> Option<MtResource<T>> {
        self.resource
            .upgrade()
            .map(|resource| MtResource { resource })
    }
}

impl<T: Send + Sync> Clone for WeakMtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
