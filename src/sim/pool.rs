//! Fixed-capacity object recycler
//!
//! Every instance is created up front. Slots are handed out from a FIFO free
//! list and returned on release; the pool never grows. Handles carry the
//! issuing pool's id and the slot generation so that foreign or recycled
//! handles are rejected instead of corrupting the free list.

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::PoolError;

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(1);

/// Objects stored in a [`FixedPool`]
pub trait Poolable {
    /// Put the object back into its dormant state (release and force reset)
    fn deactivate(&mut self);
}

/// Typed reference to a live pool slot
pub struct Handle<T> {
    pool: u32,
    slot: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Stable slot index inside the issuing pool
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot as usize
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.slot == other.slot && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.hash(state);
        self.slot.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}:{}@{})", self.pool, self.slot, self.generation)
    }
}

/// Fixed-capacity pool; `live_count() + free_count() == capacity()` always holds
pub struct FixedPool<T> {
    id: u32,
    items: Vec<T>,
    generations: Vec<u32>,
    live: Vec<bool>,
    free: VecDeque<usize>,
    live_count: usize,
}

impl<T: Poolable> FixedPool<T> {
    /// Pre-allocate `capacity` dormant instances; `factory` receives the slot index
    pub fn new(capacity: usize, mut factory: impl FnMut(usize) -> T) -> Self {
        let mut items = Vec::with_capacity(capacity);
        for slot in 0..capacity {
            let mut item = factory(slot);
            item.deactivate();
            items.push(item);
        }

        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            items,
            generations: vec![0; capacity],
            live: vec![false; capacity],
            free: (0..capacity).collect(),
            live_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Take the next free slot, or `None` when exhausted. The caller activates it.
    pub fn try_acquire(&mut self) -> Option<Handle<T>> {
        let Some(slot) = self.free.pop_front() else {
            log::trace!("Pool {} exhausted ({} live)", self.id, self.live_count);
            return None;
        };

        self.live[slot] = true;
        self.live_count += 1;
        self.generations[slot] = self.generations[slot].wrapping_add(1);

        Some(Handle {
            pool: self.id,
            slot: slot as u32,
            generation: self.generations[slot],
            _marker: PhantomData,
        })
    }

    /// Like [`try_acquire`](Self::try_acquire) but reports exhaustion as an error
    pub fn acquire(&mut self) -> Result<Handle<T>, PoolError> {
        self.try_acquire().ok_or(PoolError::Exhausted {
            capacity: self.capacity(),
        })
    }

    /// Return a live object to the free list
    ///
    /// Foreign, already released or recycled handles are reported and
    /// leave the pool untouched.
    pub fn release(&mut self, handle: Handle<T>) -> Result<(), PoolError> {
        let slot = match self.check(handle) {
            Ok(slot) => slot,
            Err(err) => {
                log::error!("Rejected pool release: {err}");
                return Err(err);
            }
        };

        self.items[slot].deactivate();
        self.live[slot] = false;
        self.live_count -= 1;
        self.free.push_back(slot);
        Ok(())
    }

    /// Force-reclaim every slot regardless of holder; returns how many were live
    pub fn reset_all(&mut self) -> usize {
        let reclaimed = self.live_count;
        for item in &mut self.items {
            item.deactivate();
        }
        self.live.iter_mut().for_each(|live| *live = false);
        self.free.clear();
        self.free.extend(0..self.items.len());
        self.live_count = 0;
        reclaimed
    }

    pub fn is_live(&self, handle: Handle<T>) -> bool {
        self.check(handle).is_ok()
    }

    /// Validate a handle without touching the pool
    pub fn check(&self, handle: Handle<T>) -> Result<usize, PoolError> {
        let slot = handle.slot();
        if handle.pool != self.id || slot >= self.items.len() {
            return Err(PoolError::InvalidRelease {
                slot,
                reason: "handle was not issued by this pool",
            });
        }
        if !self.live[slot] {
            return Err(PoolError::InvalidRelease {
                slot,
                reason: "slot is not live",
            });
        }
        if self.generations[slot] != handle.generation {
            return Err(PoolError::StaleHandle {
                slot,
                generation: handle.generation,
                live: self.generations[slot],
            });
        }
        Ok(slot)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.try_get(handle).ok()
    }

    pub fn try_get(&self, handle: Handle<T>) -> Result<&T, PoolError> {
        let slot = self.check(handle)?;
        Ok(&self.items[slot])
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.try_get_mut(handle).ok()
    }

    pub fn try_get_mut(&mut self, handle: Handle<T>) -> Result<&mut T, PoolError> {
        let slot = self.check(handle)?;
        Ok(&mut self.items[slot])
    }

    /// Live objects in slot order
    pub fn iter_live(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(slot, _)| self.live[*slot])
            .map(|(slot, item)| (self.handle_for(slot), item))
    }

    /// Mutable access to live objects in slot order
    pub fn for_each_live_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for (slot, item) in self.items.iter_mut().enumerate() {
            if self.live[slot] {
                f(item);
            }
        }
    }

    /// Snapshot of live handles (for sweeps that release while iterating)
    pub fn live_handles(&self) -> Vec<Handle<T>> {
        (0..self.items.len())
            .filter(|&slot| self.live[slot])
            .map(|slot| self.handle_for(slot))
            .collect()
    }

    fn handle_for(&self, slot: usize) -> Handle<T> {
        Handle {
            pool: self.id,
            slot: slot as u32,
            generation: self.generations[slot],
            _marker: PhantomData,
        }
    }
}
