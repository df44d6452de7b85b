//! # Processor Pool
//!
//! Reusable per-operation buffers. A processor call acquires a [`Pooled`]
//! guard, works in the buffer, moves its results out, and drops the guard.
//! Dropping resets the buffer before it returns to the pool, so nothing a
//! previous operation loaded can be observed by the next one.
//!
//! The guard borrows the pool and lives on the processor call's stack; it
//! cannot be stored alongside the directives the call returns.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A buffer that can be returned to its zero state.
pub trait Reset {
    /// Clear every per-operation field.
    fn reset(&mut self);
}

/// A bounded free list of reusable buffers.
#[derive(Debug)]
pub struct ProcessorPool<T> {
    name: &'static str,
    capacity: usize,
    idle: Mutex<Vec<T>>,
}

impl<T: Reset + Default> ProcessorPool<T> {
    /// An empty pool keeping at most `capacity` idle buffers.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            idle: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Take an idle buffer, or a fresh one when none is idle.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let value = self.lock().pop().unwrap_or_default();
        tracing::debug!(pool = self.name, "processor acquired");
        Pooled { pool: self, value }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, mut value: T) {
        value.reset();
        let mut idle = self.lock();
        if idle.len() < self.capacity {
            idle.push(value);
        }
        tracing::debug!(pool = self.name, idle = idle.len(), "processor released");
    }

    // A panic while holding the lock leaves only reset buffers behind.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An acquired buffer; returned to its pool on drop.
pub struct Pooled<'p, T: Reset + Default> {
    pool: &'p ProcessorPool<T>,
    value: T,
}

impl<T: Reset + Default> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Reset + Default> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Reset + Default> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        let value = std::mem::take(&mut self.value);
        self.pool.release(value);
    }
}
