use core::alloc::Layout;

/// An error returned by [`List::try_alloc`](crate::List::try_alloc) when the
/// global allocator could not provide memory for a list header.
///
/// This is the only failure a [`List`](crate::List) ever reports. No memory is
/// allocated when this error is returned, so there is nothing to clean up.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("out of memory: failed to allocate {} bytes for a list header", .layout.size())]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    pub(crate) const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Returns the [`Layout`] of the allocation request that failed.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }
}
