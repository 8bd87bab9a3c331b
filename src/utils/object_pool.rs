use super::handle::HandleLike;
use super::handle_pool::{HandlePool, Iter};

/// A `HandlePool` with a value attached to every live handle. `Device` keeps the
/// descriptor of each resource it created in one of these.
pub struct ObjectPool<H: HandleLike, T> {
    handles: HandlePool<H>,
    entries: Vec<Option<T>>,
}

impl<H: HandleLike, T> Default for ObjectPool<H, T> {
    fn default() -> Self {
        ObjectPool::new()
    }
}

impl<H: HandleLike, T> ObjectPool<H, T> {
    pub fn new() -> Self {
        ObjectPool {
            handles: HandlePool::new(),
            entries: Vec::new(),
        }
    }

    pub fn create(&mut self, value: T) -> H {
        let handle = self.handles.create();
        let index = handle.index() as usize;

        if index == self.entries.len() {
            self.entries.push(Some(value));
        } else {
            self.entries[index] = Some(value);
        }

        handle
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        if self.handles.contains(handle) {
            self.entries[handle.index() as usize].as_ref()
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        if self.handles.contains(handle) {
            self.entries[handle.index() as usize].as_mut()
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.handles.contains(handle)
    }

    /// Takes the value out and retires `handle`. Stale handles yield `None`.
    pub fn free(&mut self, handle: H) -> Option<T> {
        if self.handles.free(handle) {
            self.entries[handle.index() as usize].take()
        } else {
            None
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> Iter<H> {
        self.handles.iter()
    }

    /// Snapshots the live handles, so they could be freed while walking them.
    pub fn handles(&self) -> Vec<H> {
        self.handles.iter().collect()
    }
}
