use super::List;
use crate::AllocError;
use alloc::boxed::Box;
use core::{alloc::Layout, mem::MaybeUninit, ptr::NonNull};

impl<'a, T: ?Sized> List<'a, T> {
    /// Allocates memory for a list on the heap, without initializing it.
    ///
    /// The returned slot is **uninitialized**: it must be passed to
    /// [`List::init_boxed`] (or [`List::init`]) before it can be used as a
    /// list. Nothing about its contents, including whether it is zeroed, may be
    /// assumed.
    ///
    /// This performs exactly one allocation, using the global allocator.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the global allocator could not satisfy the
    /// request. Unlike [`Box::new`], this never aborts the process on
    /// allocation failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use hypha::{list::Links, List, Linked};
    /// # use core::ptr::NonNull;
    /// # #[repr(C)]
    /// # struct Node { links: Links<Node> }
    /// # unsafe impl Linked<Links<Node>> for Node {
    /// #     unsafe fn links(ptr: NonNull<Node>) -> NonNull<Links<Node>> { ptr.cast() }
    /// # }
    ///
    /// let slot = List::<Node>::try_alloc()?;
    /// let list = List::init_boxed(slot);
    /// assert!(list.is_empty());
    ///
    /// // Dropping the box frees the list header, and nothing else.
    /// drop(list);
    /// # Ok::<(), hypha::AllocError>(())
    /// ```
    pub fn try_alloc() -> Result<Box<MaybeUninit<Self>>, AllocError> {
        let layout = Layout::new::<MaybeUninit<Self>>();
        // Safety: a list always contains two pointers and a length, so its
        // layout is never zero-sized.
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(ptr.cast::<MaybeUninit<Self>>()) else {
            debug!(
                size = layout.size(),
                align = layout.align(),
                "List::try_alloc: out of memory"
            );
            return Err(AllocError::new(layout));
        };

        trace!(?ptr, size = layout.size(), "List::try_alloc");
        // Safety: `ptr` was just allocated by the global allocator with the
        // layout of `MaybeUninit<Self>`, which is exactly what `Box` expects.
        Ok(unsafe { Box::from_raw(ptr.as_ptr()) })
    }

    /// Initializes a heap slot returned by [`List::try_alloc`] as an empty
    /// list.
    ///
    /// The slot is initialized in place; this does not allocate.
    #[must_use]
    pub fn init_boxed(mut slot: Box<MaybeUninit<Self>>) -> Box<Self> {
        Self::init(&mut *slot);
        let ptr = Box::into_raw(slot).cast::<Self>();
        // Safety: `init` wrote a valid empty list into the slot, and
        // `MaybeUninit<Self>` has the same layout as `Self`.
        unsafe { Box::from_raw(ptr) }
    }

    /// Allocates and initializes an empty list on the heap.
    ///
    /// This is [`List::try_alloc`] followed by [`List::init_boxed`].
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the global allocator could not satisfy the
    /// request.
    pub fn try_boxed() -> Result<Box<Self>, AllocError> {
        Self::try_alloc().map(Self::init_boxed)
    }
}
