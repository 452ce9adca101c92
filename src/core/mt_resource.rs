use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` gives a worker thread and the main thread shared ownership of a
/// value. Chunk payloads live in one of these: the generating worker writes the
/// block array and mesh once, the main thread reads them after observing the
/// chunk's generation state.
///
/// A poisoned lock is recovered rather than propagated. Writers only ever
/// replace the value wholesale, so a panic on another thread cannot leave it
/// half-written.
///
/// # Examples
/// ```
/// use voxel_world::core::MtResource;
///
/// let slot: MtResource<Option<u32>> = MtResource::new(None);
/// let worker_slot = slot.clone();
///
/// std::thread::spawn(move || {
///     *worker_slot.get_mut() = Some(7);
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(*slot.get(), Some(7));
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

    /// Returns a read guard over the contained value.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a write guard over the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync + Default> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
