use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use super::handle::{HandleIndex, HandleLike};

/// Issues generational handles and tells live ones from stale ones.
///
/// Freed slots are handed out again lowest index first, which keeps the resource
/// tables of the backends dense.
pub struct HandlePool<H: HandleLike> {
    versions: Vec<HandleIndex>,
    frees: BinaryHeap<Reverse<HandleIndex>>,
    _phantom: PhantomData<H>,
}

impl<H: HandleLike> Default for HandlePool<H> {
    fn default() -> Self {
        HandlePool::new()
    }
}

impl<H: HandleLike> HandlePool<H> {
    pub fn new() -> Self {
        HandlePool {
            versions: Vec::new(),
            frees: BinaryHeap::new(),
            _phantom: PhantomData,
        }
    }

    pub fn create(&mut self) -> H {
        match self.frees.pop() {
            Some(Reverse(index)) => {
                let version = &mut self.versions[index as usize];
                *version += 1;
                H::new(index, *version)
            }
            None => {
                self.versions.push(1);
                H::new((self.versions.len() - 1) as HandleIndex, 1)
            }
        }
    }

    /// Returns true if `handle` was issued by this pool and has not been freed.
    pub fn contains(&self, handle: H) -> bool {
        match self.versions.get(handle.index() as usize) {
            Some(&v) => v & 1 == 1 && v == handle.version(),
            None => false,
        }
    }

    /// Frees `handle`. Returns false if it is stale or has been freed already.
    pub fn free(&mut self, handle: H) -> bool {
        if !self.contains(handle) {
            return false;
        }

        self.versions[handle.index() as usize] += 1;
        self.frees.push(Reverse(handle.index()));
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.versions.len() - self.frees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the live handles in index order.
    pub fn iter(&self) -> Iter<H> {
        Iter {
            versions: self.versions.iter().enumerate(),
            _phantom: PhantomData,
        }
    }
}

impl<'a, H: HandleLike> IntoIterator for &'a HandlePool<H> {
    type Item = H;
    type IntoIter = Iter<'a, H>;

    fn into_iter(self) -> Iter<'a, H> {
        self.iter()
    }
}

pub struct Iter<'a, H: HandleLike> {
    versions: ::std::iter::Enumerate<::std::slice::Iter<'a, HandleIndex>>,
    _phantom: PhantomData<H>,
}

impl<'a, H: HandleLike> Iterator for Iter<'a, H> {
    type Item = H;

    fn next(&mut self) -> Option<H> {
        self.versions
            .by_ref()
            .find(|&(_, &v)| v & 1 == 1)
            .map(|(i, &v)| H::new(i as HandleIndex, v))
    }
}

#[cfg(test)]
mod test {
    use super::super::handle::Handle;
    use super::*;

    #[test]
    fn versions() {
        let mut pool: HandlePool<Handle> = HandlePool::new();

        let h1 = pool.create();
        assert_eq!(h1, Handle::new(0, 1));
        assert!(pool.free(h1));

        let h2 = pool.create();
        assert_eq!(h2, Handle::new(0, 3));
        assert!(!pool.contains(h1));
        assert!(!pool.contains(Handle::new(0, 2)));
        assert!(!pool.contains(Handle::new(7, 1)));
    }
}
