//! Node ownership policies and transient edit tokens.
//!
//! A [`Policy`] decides how tree nodes are shared: [`RcPolicy`] uses
//! non-atomic reference counts, [`ArcPolicy`] atomic ones. Sharing is expressed
//! purely through the count; a node may be edited in place only while its
//! pointer is the single live reference.

use std::fmt;
use std::num::NonZeroU64;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Reference-counting strategy for tree nodes.
///
/// `alloc` acquires a fresh node, cloning a pointer increments its count and
/// dropping one decrements it. Children are released depth-first when a node's
/// count reaches zero.
pub trait Policy: Sized + 'static {
    /// Shared pointer to a node.
    type Ptr<T>: Clone + Deref<Target = T>;

    /// Allocates a node holding `value` with a reference count of one.
    fn alloc<T>(value: T) -> Self::Ptr<T>;

    /// Returns `true` if `ptr` is the only reference to its node.
    fn is_unique<T>(ptr: &Self::Ptr<T>) -> bool;

    /// Returns mutable access to the node if `ptr` is unique.
    fn get_mut<T>(ptr: &mut Self::Ptr<T>) -> Option<&mut T>;

    /// Takes the node out of a unique pointer, or hands the pointer back.
    ///
    /// # Errors
    ///
    /// Returns the pointer unchanged if other references exist.
    fn try_unwrap<T>(ptr: Self::Ptr<T>) -> Result<T, Self::Ptr<T>>;

    /// Returns `true` if both pointers refer to the same node.
    fn ptr_eq<T>(a: &Self::Ptr<T>, b: &Self::Ptr<T>) -> bool;

    /// Number of strong references to the node.
    fn ref_count<T>(ptr: &Self::Ptr<T>) -> usize;
}

/// Single-threaded policy backed by [`Rc`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RcPolicy;

/// Thread-safe policy backed by [`Arc`].
///
/// Handles built with it are `Send + Sync` whenever their elements are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArcPolicy;

impl Policy for RcPolicy {
    type Ptr<T> = Rc<T>;

    #[inline]
    fn alloc<T>(value: T) -> Rc<T> {
        Rc::new(value)
    }

    #[inline]
    fn is_unique<T>(ptr: &Rc<T>) -> bool {
        Rc::strong_count(ptr) == 1 && Rc::weak_count(ptr) == 0
    }

    #[inline]
    fn get_mut<T>(ptr: &mut Rc<T>) -> Option<&mut T> {
        Rc::get_mut(ptr)
    }

    #[inline]
    fn try_unwrap<T>(ptr: Rc<T>) -> Result<T, Rc<T>> {
        Rc::try_unwrap(ptr)
    }

    #[inline]
    fn ptr_eq<T>(a: &Rc<T>, b: &Rc<T>) -> bool {
        Rc::ptr_eq(a, b)
    }

    #[inline]
    fn ref_count<T>(ptr: &Rc<T>) -> usize {
        Rc::strong_count(ptr)
    }
}

impl Policy for ArcPolicy {
    type Ptr<T> = Arc<T>;

    #[inline]
    fn alloc<T>(value: T) -> Arc<T> {
        Arc::new(value)
    }

    #[inline]
    fn is_unique<T>(ptr: &Arc<T>) -> bool {
        Arc::strong_count(ptr) == 1 && Arc::weak_count(ptr) == 0
    }

    #[inline]
    fn get_mut<T>(ptr: &mut Arc<T>) -> Option<&mut T> {
        Arc::get_mut(ptr)
    }

    #[inline]
    fn try_unwrap<T>(ptr: Arc<T>) -> Result<T, Arc<T>> {
        Arc::try_unwrap(ptr)
    }

    #[inline]
    fn ptr_eq<T>(a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }

    #[inline]
    fn ref_count<T>(ptr: &Arc<T>) -> usize {
        Arc::strong_count(ptr)
    }
}

/// Returns `true` if the node behind `ptr` may be edited in place.
///
/// Holding an [`Edit`] never grants mutation by itself: any node reachable from
/// another handle has a count above one and is always copied first.
#[inline]
#[must_use]
pub fn can_mutate<P: Policy, T>(ptr: &P::Ptr<T>) -> bool {
    P::is_unique::<T>(ptr)
}

// ---------------------------------------------------------------------------
// Edit tokens
// ---------------------------------------------------------------------------

/// Identity of one transient editing session.
///
/// Nodes copied or claimed by a session are stamped with its token and given
/// spare capacity, so repeated edits through the same transient grow them
/// without reallocating.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit(NonZeroU64);

impl Edit {
    /// Mints a token distinct from every other token in the process.
    #[must_use]
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let id = NEXT.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::MIN.saturating_add(id))
    }

    /// Raw numeric identity, for diagnostics.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0.get()
    }
}

impl Default for Edit {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edit(#{})", self.0)
    }
}
