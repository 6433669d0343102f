use core::cmp::Ordering;

use crate::Link;

/// Binds a value type to the [`Link`] field a tree threads through.
///
/// A value type may carry several links and so take part in several trees at
/// once; each link gets its own adapter. Adapters are zero-sized marker types
/// and are never instantiated.
///
/// # Examples
///
/// ```
/// use wabi_mmap::{Adapter, Link};
///
/// struct Job {
///     queue: Link,
///     id: u32,
/// }
///
/// struct JobQueue;
///
/// impl Adapter for JobQueue {
///     type Value = Job;
///
///     fn link(value: &Job) -> &Link {
///         &value.queue
///     }
///
///     fn link_mut(value: &mut Job) -> &mut Link {
///         &mut value.queue
///     }
/// }
/// ```
pub trait Adapter {
    /// The caller-owned type holding the link.
    type Value;

    /// Returns the link this adapter threads through.
    fn link(value: &Self::Value) -> &Link;

    /// Returns the link this adapter threads through, mutably.
    fn link_mut(value: &mut Self::Value) -> &mut Link;
}

/// Extends an [`Adapter`] with a key and a three-way comparison, giving key
/// order to a [`Multimap`](crate::Multimap).
///
/// The key lives inside the value; the map only ever borrows it. `compare`
/// must be a consistent total order. Values whose keys compare
/// [`Ordering::Equal`] form a duplicate run whose order is chosen by the
/// caller at insertion.
pub trait KeyAdapter: Adapter {
    /// The key type. Unsized keys such as `str` are allowed.
    type Key: ?Sized;

    /// Extracts the key of a value. Must not change while the value is linked.
    fn key(value: &Self::Value) -> &Self::Key;

    /// Compares two keys.
    fn compare(a: &Self::Key, b: &Self::Key) -> Ordering;
}
