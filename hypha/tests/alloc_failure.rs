//! Running out of memory while allocating a list header is reported as an
//! [`AllocError`], rather than aborting the process.
use core::{alloc::Layout, cell::Cell, ptr::NonNull};
use hypha::{list::Links, AllocError, Linked, List};
use std::{
    alloc::{GlobalAlloc, System},
    ptr,
};

/// Forwards to the system allocator, unless the current thread has asked for
/// its next allocation to fail.
struct Allocator;

thread_local! {
    static FAIL_NEXT: Cell<bool> = const { Cell::new(false) };
}

unsafe impl GlobalAlloc for Allocator {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let fail = FAIL_NEXT
            .try_with(|fail| fail.replace(false))
            .unwrap_or(false);
        if fail {
            return ptr::null_mut();
        }
        GlobalAlloc::alloc(&System, layout)
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        GlobalAlloc::dealloc(&System, ptr, layout)
    }
}

#[global_allocator]
static ALLOC: Allocator = Allocator;

fn fail_next_alloc() {
    FAIL_NEXT.with(|fail| fail.set(true));
}

#[repr(C)]
#[derive(Debug)]
struct Node {
    links: Links<Node>,
    val: u32,
}

unsafe impl Linked<Links<Self>> for Node {
    unsafe fn links(target: NonNull<Self>) -> NonNull<Links<Self>> {
        // Safety: `Node` is `repr(C)`, and the links are its first field.
        target.cast()
    }
}

fn node(val: u32) -> Node {
    Node {
        links: Links::new(),
        val,
    }
}

#[test]
fn try_alloc_out_of_memory() {
    fail_next_alloc();
    let err: AllocError = List::<Node>::try_alloc()
        .expect_err("allocation should fail while the allocator is out of memory");
    assert_eq!(err.layout(), Layout::new::<List<'_, Node>>());

    // The failure is not sticky: the next allocation succeeds.
    let mut a = Box::pin(node(1));
    let slot = List::<Node>::try_alloc().expect("allocating a list header should succeed");
    let mut list = List::init_boxed(slot);
    list.append(a.as_mut());
    assert_eq!(list.len(), 1);
    list.assert_valid();
}

#[test]
fn try_boxed_out_of_memory() {
    fail_next_alloc();
    let err = List::<Node>::try_boxed()
        .expect_err("allocation should fail while the allocator is out of memory");
    assert_eq!(err.layout(), Layout::new::<List<'_, Node>>());
    assert_eq!(
        err.to_string(),
        format!(
            "out of memory: failed to allocate {} bytes for a list header",
            Layout::new::<List<'_, Node>>().size()
        )
    );

    let mut a = Box::pin(node(1));
    let mut b = Box::pin(node(2));
    let mut list = List::try_boxed().expect("allocating a list header should succeed");
    list.append(a.as_mut());
    list.append(b.as_mut());
    let vals = list.iter().map(|node| node.val).collect::<Vec<_>>();
    assert_eq!(vals, [1, 2]);
}
