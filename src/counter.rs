//! Per-type instance counting.
//!
//! A type opts in by holding a [`Tracked<Self>`] field. Creating or cloning
//! the guard increments the live and total counts for that type; dropping it
//! decrements the live count. Moves are not counted: a moved-from value is
//! never dropped, so the live count stays paired without them.
//!
//! Counters are created lazily on the first construction of a type and live
//! for the rest of the process. Each type has its own pair; no two tracked
//! types ever share one. [`counters`] lists them in registration order, which
//! is what [`Aggregator::finish`] prints.
//!
//! ```
//! use tally::Tracked;
//!
//! #[derive(Clone, Default)]
//! struct Particle {
//!     mass: f64,
//!     _tracked: Tracked<Particle>,
//! }
//!
//! let a = Particle::default();
//! let b = a.clone();
//! drop(a);
//! let counts = tally::instances::<Particle>().unwrap();
//! assert_eq!((counts.live, counts.total), (1, 2));
//! # drop(b);
//! ```
//!
//! [`Aggregator::finish`]: crate::aggregator::Aggregator::finish

use std::any::TypeId;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};

// ---------------------------------------------------------------------------
// Counter state
// ---------------------------------------------------------------------------

/// Live/total counts for one tracked type.
#[derive(Debug)]
pub struct CounterState {
    type_name: &'static str,
    live: AtomicI64,
    total: AtomicU64,
}

impl CounterState {
    const fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            live: AtomicI64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record one construction.
    ///
    /// `total` is bumped before `live`, so a snapshot that sees the new live
    /// count also sees the new total.
    pub fn increment(&self) {
        self.total.fetch_add(1, Ordering::Release);
        self.live.fetch_add(1, Ordering::Release);
    }

    /// Record one destruction. Unpaired calls drive the live count negative;
    /// that is reported, not corrected.
    pub fn decrement(&self) {
        self.live.fetch_sub(1, Ordering::Release);
    }

    /// Current counts. `live` is loaded first, so `live <= total` holds for
    /// paired constructions and destructions.
    pub fn snapshot(&self) -> CounterSnapshot {
        let live = self.live.load(Ordering::Acquire);
        let total = self.total.load(Ordering::Acquire);
        CounterSnapshot {
            type_name: self.type_name,
            live,
            total,
        }
    }
}

/// Point-in-time counts for one tracked type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Fully qualified type name.
    pub type_name: &'static str,
    /// Instances currently alive.
    pub live: i64,
    /// Instances ever created.
    pub total: u64,
}

impl CounterSnapshot {
    /// `true` when instances are still alive (a likely leak at teardown).
    #[must_use]
    pub const fn is_leaking(&self) -> bool {
        self.live > 0
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The remaining number of objects of type {} at the end of the program is {}",
            self.type_name, self.live
        )?;
        if self.is_leaking() {
            write!(f, " (NOT zero!)")?;
        }
        write!(f, "\nThe total number of objects created was {}", self.total)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Registry {
    by_type: HashMap<TypeId, &'static CounterState>,
    order: Vec<&'static CounterState>,
}

static REGISTRY: LazyLock<Mutex<Registry>> = LazyLock::new(|| Mutex::new(Registry::default()));

/// The counter for `T`, created on first use.
pub fn counter_for<T: 'static>() -> &'static CounterState {
    let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(state) = registry.by_type.get(&TypeId::of::<T>()) {
        return *state;
    }
    // Counters are process-lifetime singletons.
    let state: &'static CounterState =
        Box::leak(Box::new(CounterState::new(std::any::type_name::<T>())));
    registry.by_type.insert(TypeId::of::<T>(), state);
    registry.order.push(state);
    tracing::trace!(type_name = state.type_name, "instance counter created");
    state
}

/// Counts for `T`, or `None` if no `T` was ever tracked.
pub fn instances<T: 'static>() -> Option<CounterSnapshot> {
    let registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    registry
        .by_type
        .get(&TypeId::of::<T>())
        .map(|state| state.snapshot())
}

/// Counts for every tracked type, in the order they were first constructed.
pub fn counters() -> Vec<CounterSnapshot> {
    let registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    registry.order.iter().map(|state| state.snapshot()).collect()
}

// ---------------------------------------------------------------------------
// Tracked guard
// ---------------------------------------------------------------------------

/// Membership guard that counts instances of `T`.
///
/// Comparison and hashing treat all guards as equal so that deriving
/// `PartialEq`, `Ord` or `Hash` on the owning type is unaffected.
pub struct Tracked<T: 'static> {
    state: &'static CounterState,
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> Tracked<T> {
    /// Count one new instance of `T`.
    #[must_use]
    pub fn new() -> Self {
        let state = counter_for::<T>();
        state.increment();
        Self {
            state,
            _type: PhantomData,
        }
    }

    /// Current counts for `T`.
    pub fn counts(&self) -> CounterSnapshot {
        self.state.snapshot()
    }
}

impl<T: 'static> Default for Tracked<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        self.state.increment();
        Self {
            state: self.state,
            _type: PhantomData,
        }
    }
}

impl<T: 'static> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.state.decrement();
    }
}

impl<T: 'static> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.state.type_name).finish()
    }
}

impl<T: 'static> PartialEq for Tracked<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: 'static> Eq for Tracked<T> {}

impl<T: 'static> PartialOrd for Tracked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl<T: 'static> Ord for Tracked<T> {
    fn cmp(&self, _other: &Self) -> CmpOrdering {
        CmpOrdering::Equal
    }
}

impl<T: 'static> Hash for Tracked<T> {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Widget {
        _tracked: Tracked<Self>,
    }

    struct Gadget {
        _tracked: Tracked<Self>,
    }

    struct Never;

    #[test]
    fn construct_and_drop_pairs_up() {
        let widgets: Vec<Widget> = (0..5).map(|_| Widget::default()).collect();
        let mut widgets = widgets;
        widgets.truncate(2);

        let counts = instances::<Widget>().unwrap();
        assert_eq!(counts.live, 2);
        assert_eq!(counts.total, 5);
        assert!(counts.is_leaking());

        drop(widgets);
        assert_eq!(instances::<Widget>().unwrap().live, 0);
    }

    #[test]
    fn clone_counts_as_construction_and_move_does_not() {
        let first = Gadget {
            _tracked: Tracked::new(),
        };
        let copy = Gadget {
            _tracked: first._tracked.clone(),
        };
        let moved = first;

        let counts = moved._tracked.counts();
        assert_eq!((counts.live, counts.total), (2, 2));
        drop(copy);
        drop(moved);
        assert_eq!(instances::<Gadget>().unwrap().live, 0);
    }

    #[test]
    fn untracked_types_have_no_counter() {
        assert!(instances::<Never>().is_none());
    }

    #[test]
    fn types_never_share_counters() {
        struct Left;
        struct Right;
        let _l1 = Tracked::<Left>::new();
        let _l2 = Tracked::<Left>::new();
        let _r = Tracked::<Right>::new();
        assert_eq!(instances::<Left>().unwrap().total, 2);
        assert_eq!(instances::<Right>().unwrap().total, 1);
    }

    #[test]
    fn registration_order_is_kept() {
        struct First;
        struct Second;
        let _a = Tracked::<First>::new();
        let _b = Tracked::<Second>::new();
        let names: Vec<_> = counters().iter().map(|c| c.type_name).collect();
        let first = names.iter().position(|n| n.ends_with("First")).unwrap();
        let second = names.iter().position(|n| n.ends_with("Second")).unwrap();
        assert!(first < second);
    }

    #[test]
    fn unpaired_decrement_goes_negative() {
        struct Orphan;
        let state = counter_for::<Orphan>();
        state.decrement();
        let counts = state.snapshot();
        assert_eq!(counts.live, -1);
        assert!(!counts.is_leaking());
    }

    #[test]
    fn report_flags_leaks() {
        let leaking = CounterSnapshot {
            type_name: "demo::Node",
            live: 3,
            total: 7,
        };
        assert_eq!(
            leaking.to_string(),
            "The remaining number of objects of type demo::Node at the end of the program is 3 (NOT zero!)\nThe total number of objects created was 7"
        );

        let clean = CounterSnapshot { live: 0, ..leaking };
        assert!(!clean.to_string().contains("NOT zero"));
    }

    #[test]
    fn guards_compare_equal() {
        struct Keyed;
        assert_eq!(Tracked::<Keyed>::new(), Tracked::<Keyed>::new());
    }

    #[test]
    fn concurrent_construction_is_exact() {
        struct Shared;
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    let guards: Vec<_> = (0..250).map(|_| Tracked::<Shared>::new()).collect();
                    drop(guards);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let counts = instances::<Shared>().unwrap();
        assert_eq!((counts.live, counts.total), (0, 2000));
    }

    #[test]
    fn concurrent_snapshots_never_show_more_live_than_created() {
        use std::sync::atomic::AtomicBool;

        struct Churn;
        let done = AtomicBool::new(false);
        std::thread::scope(|scope| {
            let reader = scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    if let Some(counts) = instances::<Churn>() {
                        assert!(counts.live >= 0, "{counts:?}");
                        assert!(counts.live.unsigned_abs() <= counts.total, "{counts:?}");
                    }
                    std::thread::yield_now();
                }
            });
            let writers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        for _ in 0..2_000 {
                            drop(Tracked::<Churn>::new());
                        }
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }
            done.store(true, Ordering::Release);
            reader.join().unwrap();
        });
        assert_eq!(instances::<Churn>().unwrap().total, 8_000);
    }
}
