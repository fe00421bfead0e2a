// Copyright 2026 the Waypost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellation handles for host-scheduled callbacks.
//!
//! Every callback source a view starts (a recurring interval, a one-shot
//! timeout, an animation-frame loop, a geolocation watch) is represented by a
//! handle implementing [`Cancel`]. The view parks those handles in a
//! [`Subscriptions`] bag; [`Subscriptions::teardown`] cancels each live
//! handle exactly once, and dropping the bag tears it down too, so every exit
//! path releases what was started.
//!
//! A one-shot source that has already fired reports itself through
//! [`Cancel::is_spent`]. The bag releases spent handles on the next
//! [`push`](Subscriptions::push) and reuses their slots, so a view that keeps
//! scheduling timeouts does not grow its bag.
//!
//! Backends implement [`Cancel`] for their native handles (see
//! `waypost_backend_web`). Tests implement it with counting fakes.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// A handle to a callback source that can be stopped.
///
/// Implementations must tolerate being dropped after `cancel`, and a second
/// `cancel` must be a no-op.
pub trait Cancel {
    /// Stops the callback source. No further callbacks are delivered.
    fn cancel(&mut self);

    /// Returns `true` once the source can no longer call back, such as a
    /// timeout that has fired.
    fn is_spent(&self) -> bool {
        false
    }
}

/// What kind of host callback a handle stands for. Used for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    /// A recurring timer.
    Interval,
    /// A one-shot timer.
    Timeout,
    /// A per-frame animation callback.
    AnimationFrame,
    /// A continuous location watch.
    LocationWatch,
    /// A DOM event listener.
    Listener,
    /// Work to run when the view goes away.
    Cleanup,
}

/// Runs a closure the first time it is cancelled.
///
/// For view state that has no host handle of its own but still has to be
/// undone at teardown.
pub struct OnCancel<F: FnOnce()> {
    f: Option<F>,
}

impl<F: FnOnce()> OnCancel<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f: Some(f) }
    }
}

impl<F: FnOnce()> Cancel for OnCancel<F> {
    fn cancel(&mut self) {
        if let Some(f) = self.f.take() {
            f();
        }
    }
}

impl<F: FnOnce()> fmt::Debug for OnCancel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnCancel")
            .field("pending", &self.f.is_some())
            .finish_non_exhaustive()
    }
}

/// Identifies one handle within a [`Subscriptions`] bag.
///
/// An id goes stale when its handle is cancelled or released; a stale id
/// never matches the handle that later reuses the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    index: usize,
    generation: u32,
}

struct Slot {
    kind: SubscriptionKind,
    handle: Box<dyn Cancel>,
}

#[derive(Default)]
struct Entry {
    generation: u32,
    slot: Option<Slot>,
}

/// The set of live callback handles owned by one view.
#[derive(Default)]
pub struct Subscriptions {
    entries: Vec<Entry>,
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("live", &self.len())
            .finish_non_exhaustive()
    }
}

impl Subscriptions {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a handle and returns its id.
    ///
    /// Spent handles are released first and their slots reused.
    pub fn push(&mut self, kind: SubscriptionKind, handle: impl Cancel + 'static) -> SubscriptionId {
        self.release_spent();
        let index = match self.entries.iter().position(|e| e.slot.is_none()) {
            Some(index) => index,
            None => {
                self.entries.push(Entry::default());
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[index];
        entry.generation = entry.generation.wrapping_add(1);
        entry.slot = Some(Slot {
            kind,
            handle: Box::new(handle),
        });
        SubscriptionId {
            index,
            generation: entry.generation,
        }
    }

    /// Cancels and releases a single handle ahead of teardown.
    ///
    /// Returns `false` if the handle was already cancelled or released.
    pub fn cancel(&mut self, id: SubscriptionId) -> bool {
        match self.entry_mut(id).and_then(|e| e.slot.take()) {
            Some(mut slot) => {
                slot.handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the handle has not been cancelled or released yet.
    #[must_use]
    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.entries
            .get(id.index)
            .is_some_and(|e| e.generation == id.generation && e.slot.is_some())
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.slot.is_some()).count()
    }

    /// Returns `true` when no handle is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live handles of the given kind.
    #[must_use]
    pub fn count(&self, kind: SubscriptionKind) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.slot.as_ref())
            .filter(|slot| slot.kind == kind)
            .count()
    }

    /// Cancels every live handle exactly once and returns how many there were.
    pub fn teardown(&mut self) -> usize {
        let mut cancelled = 0;
        for mut slot in self.entries.drain(..).filter_map(|e| e.slot) {
            slot.handle.cancel();
            cancelled += 1;
        }
        cancelled
    }

    fn entry_mut(&mut self, id: SubscriptionId) -> Option<&mut Entry> {
        self.entries
            .get_mut(id.index)
            .filter(|e| e.generation == id.generation)
    }

    fn release_spent(&mut self) {
        for entry in &mut self.entries {
            if entry.slot.as_ref().is_some_and(|s| s.handle.is_spent())
                && let Some(mut slot) = entry.slot.take()
            {
                slot.handle.cancel();
            }
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    struct Counting(Rc<Cell<u32>>);

    impl Cancel for Counting {
        fn cancel(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn teardown_cancels_each_handle_once() {
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let mut subs = Subscriptions::new();
        subs.push(SubscriptionKind::Interval, Counting(Rc::clone(&a)));
        subs.push(SubscriptionKind::LocationWatch, Counting(Rc::clone(&b)));
        assert_eq!(subs.len(), 2);

        assert_eq!(subs.teardown(), 2);
        assert_eq!(subs.teardown(), 0, "second teardown finds nothing");
        drop(subs);

        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn early_cancel_is_not_repeated_at_teardown() {
        let hits = Rc::new(Cell::new(0));
        let mut subs = Subscriptions::new();
        let id = subs.push(SubscriptionKind::Timeout, Counting(Rc::clone(&hits)));

        assert!(subs.cancel(id));
        assert!(!subs.is_live(id));
        assert!(!subs.cancel(id), "already cancelled");
        subs.teardown();

        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn drop_tears_down() {
        let hits = Rc::new(Cell::new(0));
        {
            let mut subs = Subscriptions::new();
            subs.push(SubscriptionKind::AnimationFrame, Counting(Rc::clone(&hits)));
            subs.push(SubscriptionKind::Timeout, Counting(Rc::clone(&hits)));
        }
        assert_eq!(hits.get(), 2);
    }

    /// A one-shot fake that can be marked as fired.
    struct OneShot {
        fired: Rc<Cell<bool>>,
        cancels: Rc<Cell<u32>>,
    }

    impl Cancel for OneShot {
        fn cancel(&mut self) {
            self.cancels.set(self.cancels.get() + 1);
        }

        fn is_spent(&self) -> bool {
            self.fired.get()
        }
    }

    #[test]
    fn fired_timeouts_do_not_accumulate() {
        let cancels = Rc::new(Cell::new(0));
        let mut subs = Subscriptions::new();
        subs.push(SubscriptionKind::Listener, Counting(Rc::new(Cell::new(0))));
        for _ in 0..50 {
            let fired = Rc::new(Cell::new(false));
            subs.push(
                SubscriptionKind::Timeout,
                OneShot {
                    fired: Rc::clone(&fired),
                    cancels: Rc::clone(&cancels),
                },
            );
            fired.set(true);
        }
        assert_eq!(subs.entries.len(), 2, "spent slots are reused");
        assert_eq!(cancels.get(), 49, "each spent timeout is released once");
        assert_eq!(subs.count(SubscriptionKind::Listener), 1);
    }

    #[test]
    fn stale_id_does_not_cancel_reused_slot() {
        let hits = Rc::new(Cell::new(0));
        let mut subs = Subscriptions::new();
        let old = subs.push(SubscriptionKind::Timeout, Counting(Rc::clone(&hits)));
        assert!(subs.cancel(old));
        let new = subs.push(SubscriptionKind::Timeout, Counting(Rc::clone(&hits)));
        assert_ne!(old, new);
        assert!(!subs.cancel(old), "stale id");
        assert!(subs.is_live(new));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn cleanup_runs_once_at_teardown() {
        let runs = Rc::new(Cell::new(0));
        let mut subs = Subscriptions::new();
        let counter = Rc::clone(&runs);
        subs.push(
            SubscriptionKind::Cleanup,
            OnCancel::new(move || counter.set(counter.get() + 1)),
        );
        assert_eq!(runs.get(), 0, "nothing runs while mounted");
        subs.teardown();
        drop(subs);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn count_by_kind() {
        let hits = Rc::new(Cell::new(0));
        let mut subs = Subscriptions::new();
        subs.push(SubscriptionKind::Timeout, Counting(Rc::clone(&hits)));
        let t2 = subs.push(SubscriptionKind::Timeout, Counting(Rc::clone(&hits)));
        subs.push(SubscriptionKind::Interval, Counting(Rc::clone(&hits)));
        assert_eq!(subs.count(SubscriptionKind::Timeout), 2);
        subs.cancel(t2);
        assert_eq!(subs.count(SubscriptionKind::Timeout), 1);
        assert_eq!(subs.count(SubscriptionKind::LocationWatch), 0);
    }
}
