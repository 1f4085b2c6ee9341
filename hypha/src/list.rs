//! An intrusive, append-only singly-linked list.
//!
//! See the [`List`] type for details.
use super::Linked;
use crate::util::FmtOption;
use core::{
    cell::UnsafeCell,
    fmt,
    iter::FusedIterator,
    marker::{PhantomData, PhantomPinned},
    mem::{self, MaybeUninit},
    pin::Pin,
    ptr::NonNull,
};

feature! {
    #![any(feature = "alloc", test)]
    mod boxed;
}


/// An [intrusive] singly-linked list that only grows at its tail.
///
/// A `List` tracks both its first (head) and last (tail) node, so
/// [`append`](Self::append), [`is_empty`](Self::is_empty), [`head`](Self::head)
/// and [`tail`](Self::tail) are all *O*(1) operations. Nodes are visited in the
/// order they were appended, by walking from the head along each node's `next`
/// link, using [`iter`](Self::iter) or [`iter_mut`](Self::iter_mut).
///
/// In order to be part of a `List`, a type `T` must implement [`Linked`] for
/// [`list::Links<T>`].
///
/// # Ownership
///
/// A `List` never owns its nodes. Appending a node *borrows* it, pinned, for
/// the list's lifetime `'a`; the memory backing every node belongs to whoever
/// created it. While the list is alive, the borrow checker ensures that a node
/// cannot be moved, freed, or appended to a second list. When the list is
/// dropped, only the list itself goes away: its nodes are not visited, and
/// their owner regains full access to them.
///
/// A list can live anywhere: on the stack via [`List::new`], in a slot of
/// uninitialized memory via [`List::init`], or on the heap via
/// [`List::try_alloc`] and [`List::init_boxed`] (with the "alloc" feature).
///
/// # Examples
///
/// ```
/// use hypha::{
///     Linked,
///     list::{self, List},
/// };
/// use core::{pin::pin, ptr::NonNull};
///
/// /// A parsed call argument.
/// // This type must be `repr(C)` in order for the cast in `Linked::links`
/// // to be sound.
/// #[repr(C)]
/// #[derive(Debug, Default)]
/// struct Argument {
///     links: list::Links<Argument>,
///     val: i32,
/// }
///
/// unsafe impl Linked<list::Links<Argument>> for Argument {
///     unsafe fn links(target: NonNull<Argument>) -> NonNull<list::Links<Argument>> {
///         // Safety: this cast is safe only because `Argument` is `repr(C)`
///         // and the links is the first field.
///         target.cast()
///     }
/// }
///
/// impl Argument {
///     fn new(val: i32) -> Self {
///         Self {
///             val,
///             ..Self::default()
///         }
///     }
/// }
///
/// // The arguments are owned by this stack frame, not by the list.
/// let mut a = pin!(Argument::new(1));
/// let mut b = pin!(Argument::new(2));
///
/// let mut list = List::new();
/// assert!(list.is_empty());
///
/// list.append(a.as_mut());
/// list.append(b.as_mut());
/// assert!(!list.is_empty());
///
/// let vals = list.iter().map(|arg| arg.val).collect::<Vec<_>>();
/// assert_eq!(vals, [1, 2]);
///
/// // Dropping the list leaves the arguments untouched.
/// drop(list);
/// assert_eq!(a.val, 1);
/// assert_eq!(b.val, 2);
/// ```
///
/// [intrusive]: crate#intrusive-data-structures
/// [`list::Links<T>`]: crate::list::Links
/// [`List::try_alloc`]: List::try_alloc
/// [`List::init_boxed`]: List::init_boxed
pub struct List<'a, T: ?Sized> {
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _nodes: PhantomData<&'a mut T>,
}

/// Links to other nodes in a [`List`].
///
/// In order to be part of a [`List`], a type must contain an instance of this
/// type, and must implement the [`Linked`] trait for `Links<Self>`.
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

/// Iterates over the nodes in a [`List`] by reference, in append order.
///
/// Returned by [`List::iter`].
pub struct Iter<'list, T: Linked<Links<T>> + ?Sized> {
    curr: Link<T>,
    len: usize,
    _list: PhantomData<&'list T>,
}

/// Iterates over the nodes in a [`List`] by pinned mutable reference, in
/// append order.
///
/// Returned by [`List::iter_mut`].
pub struct IterMut<'list, T: Linked<Links<T>> + ?Sized> {
    curr: Link<T>,
    len: usize,
    _list: PhantomData<&'list mut T>,
}

type Link<T> = Option<NonNull<T>>;

#[repr(C)]
struct LinksInner<T: ?Sized> {
    next: Link<T>,
    /// Linked list links must always be `!Unpin`, in order to ensure that they
    /// never recieve LLVM `noalias` annotations; see also
    /// <https://github.com/rust-lang/rust/issues/63818>.
    _unpin: PhantomPinned,
}

// ==== impl List ====

impl<'a, T: ?Sized> List<'a, T> {
    /// Returns a new empty list.
    #[must_use]
    pub const fn new() -> Self {
        List {
            head: None,
            tail: None,
            len: 0,
            _nodes: PhantomData,
        }
    }

    /// Initializes `slot` as an empty list, returning a reference to the
    /// initialized list.
    ///
    /// `slot` may be freshly allocated memory (such as the slot returned by
    /// [`List::try_alloc`]), or part of some larger structure that is being
    /// built in place. No assumption is made about its previous contents, and
    /// no memory is allocated.
    ///
    /// To return an already initialized list to the empty state, assign
    /// [`List::new()`] to it.
    ///
    /// [`List::try_alloc`]: List::try_alloc
    pub fn init(slot: &mut MaybeUninit<Self>) -> &mut Self {
        trace!(slot = ?slot.as_ptr(), "List::init");
        slot.write(Self::new())
    }

    /// Returns `true` if this list is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        if self.head.is_none() {
            debug_assert!(
                self.tail.is_none(),
                "inconsistent state: a list had a tail but no head!"
            );
            return true;
        }

        false
    }

    /// Returns the number of nodes in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns a pinned reference to the first node in the list, or `None` if
    /// the list is empty.
    #[must_use]
    pub fn head(&self) -> Option<Pin<&T>> {
        // Safety: every node in the list was pinned and borrowed for `'a` when
        // it was appended, and we borrow the list immutably.
        self.head
            .map(|head| unsafe { Pin::new_unchecked(head.as_ref()) })
    }

    /// Returns a pinned reference to the last node in the list, or `None` if
    /// the list is empty.
    ///
    /// This is always the node most recently passed to
    /// [`append`](Self::append).
    #[must_use]
    pub fn tail(&self) -> Option<Pin<&T>> {
        // Safety: see `head`.
        self.tail
            .map(|tail| unsafe { Pin::new_unchecked(tail.as_ref()) })
    }

    /// Returns a pinned mutable reference to the first node in the list, or
    /// `None` if the list is empty.
    #[must_use]
    pub fn head_mut(&mut self) -> Option<Pin<&mut T>> {
        // Safety: the list holds the only borrow of its nodes, and we borrow
        // the list mutably.
        self.head
            .map(|mut head| unsafe { Pin::new_unchecked(head.as_mut()) })
    }

    /// Returns a pinned mutable reference to the last node in the list, or
    /// `None` if the list is empty.
    #[must_use]
    pub fn tail_mut(&mut self) -> Option<Pin<&mut T>> {
        // Safety: see `head_mut`.
        self.tail
            .map(|mut tail| unsafe { Pin::new_unchecked(tail.as_mut()) })
    }
}

impl<'a, T: Linked<Links<T>> + ?Sized> List<'a, T> {
    /// Asserts as many of the linked list's invariants as possible.
    ///
    /// This walks the whole list, so it is *O*(*n*).
    pub fn assert_valid(&self) {
        let head = match self.head {
            Some(head) => head,
            None => {
                assert!(
                    self.tail.is_none(),
                    "if the linked list's head is null, the tail must also be null"
                );
                assert_eq!(
                    self.len, 0,
                    "if the linked list's head is null, its length must be 0"
                );
                return;
            }
        };

        let tail = self
            .tail
            .expect("if the linked list has a head, it must also have a tail");

        let mut curr = head;
        let mut seen = 1;
        while seen < self.len {
            // Safety: the first `len` nodes reachable from the head are
            // borrowed for `'a`.
            let next = unsafe { T::links(curr).as_ref().next() }
                .expect("the list's length must equal the number of reachable nodes");
            test_trace!(?curr, ?next, seen, "List::assert_valid");
            assert_ne!(curr, tail, "tail node must be the last node in the list");
            assert_ne!(curr, next, "node's next link cannot be to itself");
            seen += 1;
            curr = next;
        }

        assert_eq!(
            curr, tail,
            "the list's length must equal the number of reachable nodes"
        );
        // Safety: the tail is borrowed for `'a`.
        let tail_next = unsafe { T::links(tail).as_ref().next() };
        assert!(
            tail_next.is_none(),
            "tail node must not have a next link, but it links to {:?}",
            tail_next,
        );
    }

    /// Appends `node` to the end of the list.
    ///
    /// `node` becomes the list's new tail, and its `next` link is cleared. If
    /// the list was empty, `node` also becomes its head.
    ///
    /// This is an *O*(1) operation that does not allocate memory. It will never
    /// loop.
    ///
    /// The list borrows `node` for its entire lifetime, so a node can only be a
    /// member of one list at a time, and cannot be moved or dropped until the
    /// list is.
    pub fn append(&mut self, node: Pin<&'a mut T>) {
        // Safety: the list never moves the node; it only stores its address.
        let ptr = NonNull::from(unsafe { Pin::into_inner_unchecked(node) });
        trace!(
            ?ptr,
            tail = ?FmtOption::new(&self.tail),
            len = self.len,
            "List::append"
        );

        unsafe {
            // Safety: the list holds the only borrow of `node`, which may have
            // been linked into a (now dropped) list before.
            T::links(ptr).as_mut().set_next(None);
        }

        if self.is_empty() {
            self.head = Some(ptr);
        } else if let Some(tail) = self.tail {
            unsafe {
                // Safety: `tail` is a member of this list, and we have
                // exclusive access to the list and therefore to its nodes.
                let prev = T::links(tail).as_mut().set_next(Some(ptr));
                debug_assert_eq!(prev, None, "the tail node must not have a next link");
            }
        }

        self.tail = Some(ptr);
        self.len += 1;
    }

    /// Moves every node of `other` onto the end of this list, leaving `other`
    /// empty.
    ///
    /// This is an *O*(1) operation that does not allocate memory: the chain
    /// of nodes in `other` is linked after this list's tail as a whole, without
    /// visiting any of its nodes.
    pub fn append_list(&mut self, other: &mut List<'a, T>) {
        let (head, tail) = match (other.head.take(), other.tail.take()) {
            (Some(head), Some(tail)) => (head, tail),
            (None, None) => return,
            _ => unreachable!("inconsistent state: a list had a tail but no head!"),
        };
        let len = mem::replace(&mut other.len, 0);
        trace!(
            other.head = ?head,
            other.tail = ?tail,
            other.len = len,
            len = self.len,
            "List::append_list"
        );

        match self.tail.replace(tail) {
            Some(prev) => unsafe {
                // Safety: `prev` is this list's old tail, and we have exclusive
                // access to both lists' nodes.
                T::links(prev).as_mut().set_next(Some(head));
            },
            None => self.head = Some(head),
        }

        self.len += len;
    }

    /// Returns an iterator over the nodes in this list, in the order they were
    /// appended.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            curr: self.head,
            len: self.len,
            _list: PhantomData,
        }
    }

    /// Returns an iterator over pinned mutable references to the nodes in this
    /// list, in the order they were appended.
    ///
    /// Nodes are yielded as [`Pin`]`<&mut T>` so that their links can never be
    /// swapped or overwritten while they are part of the list.
    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            curr: self.head,
            len: self.len,
            _list: PhantomData,
        }
    }
}

/// # Safety
///
/// A `List` is semantically a collection of `&'a mut T`, so it is `Send` when
/// `T` is `Send`.
unsafe impl<T: ?Sized + Send> Send for List<'_, T> {}

/// # Safety
///
/// A `List` is semantically a collection of `&'a mut T`, so it is `Sync` when
/// `T` is `Sync`.
unsafe impl<T: ?Sized + Sync> Sync for List<'_, T> {}

impl<T: ?Sized> fmt::Debug for List<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("head", &FmtOption::new(&self.head))
            .field("tail", &FmtOption::new(&self.tail))
            .field("len", &self.len)
            .finish()
    }
}

impl<T: ?Sized> Default for List<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Linked<Links<T>> + ?Sized> Extend<Pin<&'a mut T>> for List<'a, T> {
    fn extend<I: IntoIterator<Item = Pin<&'a mut T>>>(&mut self, iter: I) {
        for node in iter {
            self.append(node);
        }
    }
}

impl<'a, T: Linked<Links<T>> + ?Sized> FromIterator<Pin<&'a mut T>> for List<'a, T> {
    fn from_iter<I: IntoIterator<Item = Pin<&'a mut T>>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'list, T: Linked<Links<T>> + ?Sized> IntoIterator for &'list List<'_, T> {
    type Item = Pin<&'list T>;
    type IntoIter = Iter<'list, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'list, T: Linked<Links<T>> + ?Sized> IntoIterator for &'list mut List<'_, T> {
    type Item = Pin<&'list mut T>;
    type IntoIter = IterMut<'list, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// ==== impl Links ====

impl<T: ?Sized> Links<T> {
    /// Returns new links for an [intrusive singly-linked list](List).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                next: None,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn next(&self) -> Link<T> {
        unsafe { (*self.inner.get()).next }
    }

    #[inline]
    fn set_next(&mut self, next: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().next, next)
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("self", &format_args!("{:p}", self))
            .field("next", &FmtOption::new(&self.next()))
            .finish()
    }
}

/// # Safety
///
/// Types containing [`Links`] may be `Send`: the pointers within the `Links` may
/// mutably alias another value, but the links can only be _accessed_ by the
/// owner of the [`List`] itself, because the pointers are private. As long as
/// [`List`] upholds its own invariants, `Links` should not make a type `!Send`.
unsafe impl<T: Send> Send for Links<T> {}

/// # Safety
///
/// Types containing [`Links`] may be `Sync`: the pointers within the `Links` may
/// mutably alias another value, but the links can only be _accessed_ by the
/// owner of the [`List`] itself, because the pointers are private. As long as
/// [`List`] upholds its own invariants, `Links` should not make a type `!Sync`.
unsafe impl<T: Sync> Sync for Links<T> {}

// === impl Iter ====

impl<'list, T: Linked<Links<T>> + ?Sized> Iterator for Iter<'list, T> {
    type Item = Pin<&'list T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let curr = self.curr.take()?;
        self.len -= 1;
        unsafe {
            // Safety: the iterator borrows the list immutably for `'list`, and
            // the first `len` nodes reachable from the head are pinned and
            // borrowed for at least that long. The tail's next link is never
            // followed.
            if self.len > 0 {
                self.curr = T::links(curr).as_ref().next();
            }
            Some(Pin::new_unchecked(curr.as_ref()))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T: Linked<Links<T>> + ?Sized> ExactSizeIterator for Iter<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

impl<T: Linked<Links<T>> + ?Sized> FusedIterator for Iter<'_, T> {}

impl<T: Linked<Links<T>> + ?Sized> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            curr: self.curr,
            len: self.len,
            _list: PhantomData,
        }
    }
}

impl<T: Linked<Links<T>> + ?Sized> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("curr", &FmtOption::new(&self.curr))
            .field("len", &self.len)
            .finish()
    }
}

unsafe impl<T: Linked<Links<T>> + ?Sized + Sync> Send for Iter<'_, T> {}
unsafe impl<T: Linked<Links<T>> + ?Sized + Sync> Sync for Iter<'_, T> {}

// === impl IterMut ====

impl<'list, T: Linked<Links<T>> + ?Sized> Iterator for IterMut<'list, T> {
    type Item = Pin<&'list mut T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let mut curr = self.curr.take()?;
        self.len -= 1;
        unsafe {
            // Safety: the iterator borrows the list mutably for `'list`, and
            // each of the first `len` nodes is yielded at most once, so the
            // returned references never alias. The next link is read before
            // the node is handed out, and the tail's next link is never
            // followed.
            if self.len > 0 {
                self.curr = T::links(curr).as_ref().next();
            }
            Some(Pin::new_unchecked(curr.as_mut()))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T: Linked<Links<T>> + ?Sized> ExactSizeIterator for IterMut<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

impl<T: Linked<Links<T>> + ?Sized> FusedIterator for IterMut<'_, T> {}

impl<T: Linked<Links<T>> + ?Sized> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("curr", &FmtOption::new(&self.curr))
            .field("len", &self.len)
            .finish()
    }
}

unsafe impl<T: Linked<Links<T>> + ?Sized + Send> Send for IterMut<'_, T> {}
unsafe impl<T: Linked<Links<T>> + ?Sized + Sync> Sync for IterMut<'_, T> {}
