//! Memory Arena

use bumpalo::Bump;

/// Default arena capacity in bytes.
pub const DEFAULT_ARENA_CAPACITY: usize = 256 * 1024;

/// Per-task bump allocator for short lived values such as BSDFs. Values
/// allocated in the arena are never dropped individually; the whole arena
/// is cleared with `reset()` after each camera sample.
pub struct MemoryArena {
    bump: Bump,
}

impl MemoryArena {
    /// Creates a new arena with an initial capacity.
    ///
    /// * `capacity` - Initial capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Moves a value into the arena and returns a reference to it.
    ///
    /// * `value` - The value.
    #[inline]
    pub fn alloc<T>(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    /// Copies a slice into the arena.
    ///
    /// * `src` - The values to copy.
    #[inline]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(src)
    }

    /// Allocates a slice of `n` default values.
    ///
    /// * `n` - Number of elements.
    pub fn alloc_slice<T: Default>(&self, n: usize) -> &mut [T] {
        self.bump.alloc_slice_fill_default(n)
    }

    /// Releases all allocations. Requires exclusive access so that no
    /// references into the arena survive.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    /// Returns the number of bytes currently allocated from the system.
    pub fn total_allocated(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for MemoryArena {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA_CAPACITY)
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_values_are_readable() {
        let arena = MemoryArena::new(1024);
        let a = arena.alloc(41_u32);
        let s = arena.alloc_slice_copy(&[1.0_f32, 2.0, 3.0]);
        assert_eq!(*a + 1, 42);
        assert_eq!(s, &[1.0, 2.0, 3.0]);
        let d: &mut [u8] = arena.alloc_slice(4);
        assert_eq!(d, &[0, 0, 0, 0]);
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut arena = MemoryArena::new(1024);
        for i in 0..1000 {
            arena.alloc(i as u64);
        }
        let before = arena.total_allocated();
        arena.reset();
        for i in 0..1000 {
            arena.alloc(i as u64);
        }
        assert_eq!(arena.total_allocated(), before);
    }
}
