use std::fmt;
use std::hash::Hash;

pub type HandleIndex = u32;

/// A generational reference to a slot in a resource table.
///
/// The slot `index` is recycled once a resource is deleted. Live slots always carry
/// an odd `version`, bumped on every free, so a handle to a deleted resource never
/// resolves to whatever reused its slot. A zero version marks the null handle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    index: HandleIndex,
    version: HandleIndex,
}

impl Handle {
    #[inline]
    pub fn new(index: HandleIndex, version: HandleIndex) -> Self {
        Handle { index, version }
    }

    /// Returns false for the null handle.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.version != 0
    }

    #[inline]
    pub fn index(self) -> HandleIndex {
        self.index
    }

    #[inline]
    pub fn version(self) -> HandleIndex {
        self.version
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle({}:{})", self.index, self.version)
    }
}

/// Anything that could be issued by a `HandlePool`.
pub trait HandleLike: fmt::Debug + fmt::Display + Copy + Hash + Eq {
    fn new(index: HandleIndex, version: HandleIndex) -> Self;
    fn index(&self) -> HandleIndex;
    fn version(&self) -> HandleIndex;
}

impl HandleLike for Handle {
    #[inline]
    fn new(index: HandleIndex, version: HandleIndex) -> Self {
        Handle::new(index, version)
    }

    #[inline]
    fn index(&self) -> HandleIndex {
        self.index
    }

    #[inline]
    fn version(&self) -> HandleIndex {
        self.version
    }
}

/// Declares a handle type of its own for one kind of resource, so a
/// `TextureHandle` is never accepted where a `BufferHandle` is expected.
#[macro_export]
macro_rules! impl_handle {
    ($name:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::utils::handle::Handle);

        impl $name {
            /// Returns false for the null handle.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl From<$name> for $crate::utils::handle::Handle {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl From<$crate::utils::handle::Handle> for $name {
            fn from(handle: $crate::utils::handle::Handle) -> Self {
                $name(handle)
            }
        }

        impl $crate::utils::handle::HandleLike for $name {
            #[inline]
            fn new(
                index: $crate::utils::handle::HandleIndex,
                version: $crate::utils::handle::HandleIndex,
            ) -> Self {
                $name($crate::utils::handle::Handle::new(index, version))
            }

            #[inline]
            fn index(&self) -> $crate::utils::handle::HandleIndex {
                self.0.index()
            }

            #[inline]
            fn version(&self) -> $crate::utils::handle::HandleIndex {
                self.0.version()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(
                    f,
                    "{}({}:{})",
                    stringify!($name),
                    self.0.index(),
                    self.0.version()
                )
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    impl_handle!(MeshHandle);

    #[test]
    fn null() {
        assert!(!Handle::default().is_valid());
        assert!(!MeshHandle::default().is_valid());
        assert!(Handle::new(0, 1).is_valid());
    }

    #[test]
    fn typed() {
        let h = MeshHandle::from(Handle::new(3, 1));
        assert_eq!(HandleLike::index(&h), 3);
        assert_eq!(Handle::from(h), Handle::new(3, 1));
        assert_eq!(format!("{}", h), "MeshHandle(3:1)");
    }
}
