#![cfg_attr(docsrs, doc = include_str!("../README.md"))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg, doc_cfg_hide))]
#![cfg_attr(docsrs, deny(missing_docs))]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;
#[cfg(test)]
extern crate std;

#[macro_use]
pub(crate) mod util;

feature! {
    #![any(feature = "alloc", test)]
    mod error;
    pub use error::AllocError;
}

pub mod list;

#[doc(inline)]
pub use list::List;

use core::ptr::NonNull;

/// Trait implemented by types which can be members of an [intrusive] list.
///
/// In order to be part of a [`List`], a type must contain a [`list::Links`]
/// value that stores the pointer to the next node in that list, and must
/// implement this trait for `Links<Self>` so that the list can find it. This
/// is the "structural embedding" of a node in a larger record: the links are
/// just a field, and the rest of the record is whatever the consumer wants.
///
/// Unlike an owning collection, a [`List`] never takes ownership of its
/// elements. It borrows each element, pinned, for the lifetime of the list,
/// so this trait has no notion of an owning handle.
///
/// # Safety
///
/// This is unsafe to implement because it's the implementation's
/// responsibility to ensure that types implementing this trait are valid
/// intrusive list nodes. In particular:
///
/// - [`Linked::links`] **must** return a pointer to a `L` that lives inside
///   the value pointed to by `ptr`, and it **must** always return the same
///   field for the same value.
/// - Two distinct values **must not** share the same links.
/// - The type implementing this trait **must not** implement [`Unpin`]. This
///   is automatic as long as the links are stored inline, since
///   [`list::Links`] is `!Unpin`.
/// - The links **must** be structurally pinned: once a value has been pinned,
///   the implementation (and any projection it offers) **must not** expose a
///   `&mut L` to that value's links. A list trusts the `next` link of every
///   node it has borrowed, and a node's links may still point into a list
///   that has since been dropped; moving them (such as with
///   [`core::mem::swap`]) would splice foreign nodes into a live list.
///
/// Failure to uphold these invariants will result in corruption of the list,
/// including dangling pointers.
///
/// # Examples
///
/// If the links are the first field of a `#[repr(C)]` struct, a pointer to the
/// struct is also a pointer to its links:
///
/// ```
/// use hypha::{list::Links, Linked};
/// use core::ptr::NonNull;
///
/// #[repr(C)]
/// struct Argument {
///     links: Links<Argument>,
///     name: &'static str,
/// }
///
/// unsafe impl Linked<Links<Self>> for Argument {
///     unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
///         // Safety: `Argument` is `repr(C)`, and the links are the first
///         // field.
///         ptr.cast()
///     }
/// }
/// ```
///
/// Otherwise, the links field can be projected to with [`core::ptr::addr_of_mut`],
/// which works regardless of where the field is:
///
/// ```
/// use hypha::{list::Links, Linked};
/// use core::ptr::{self, NonNull};
///
/// struct Statement {
///     line: usize,
///     links: Links<Statement>,
/// }
///
/// unsafe impl Linked<Links<Self>> for Statement {
///     unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
///         let links = ptr::addr_of_mut!((*ptr.as_ptr()).links);
///         // Safety: `ptr` is non-null, so a field offset from it is too.
///         NonNull::new_unchecked(links)
///     }
/// }
/// ```
///
/// [intrusive]: crate#intrusive-data-structures
/// [`Unpin`]: core::marker::Unpin
pub unsafe trait Linked<L> {
    /// Return the links of the node pointed to by `ptr`.
    ///
    /// # Safety
    ///
    /// This function is safe to call when the pointer points to a valid
    /// instance of `Self` (e.g. it does not dangle).
    unsafe fn links(ptr: NonNull<Self>) -> NonNull<L>;
}
