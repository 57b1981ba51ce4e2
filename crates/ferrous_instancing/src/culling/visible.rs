//! Fixed-capacity output buffer for the culling kernel.
//!
//! Workers append through a shared [`VisibleWriter`]: each push reserves
//! the next index with one atomic `fetch_add` and writes the matrix there.
//! No locks, no reallocation, no ordering between workers. The buffer is
//! allocated once at the worst-case size (one segment's capacity) and
//! reused every frame.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Mat4;

pub struct VisibleList {
    matrices: Box<[Mat4]>,
    len: AtomicUsize,
}

impl VisibleList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            matrices: vec![Mat4::ZERO; capacity].into_boxed_slice(),
            len: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.matrices.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        // A writer that overflowed has already panicked, but it may have
        // bumped the counter first.
        self.len.load(Ordering::Relaxed).min(self.matrices.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Matrices appended since the last [`clear`](Self::clear), in
    /// unspecified order.
    #[inline]
    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices[..self.len()]
    }

    #[inline]
    pub fn clear(&mut self) {
        *self.len.get_mut() = 0;
    }

    /// Single-threaded append.
    ///
    /// # Panics
    /// If the list is full.
    pub fn push(&mut self, matrix: Mat4) {
        let index = *self.len.get_mut();
        assert!(index < self.matrices.len(), "visible list full ({} matrices)", self.matrices.len());
        self.matrices[index] = matrix;
        *self.len.get_mut() = index + 1;
    }

    /// Shared append handle for parallel workers.
    ///
    /// The list stays mutably borrowed until every writer is gone, so no
    /// reader can observe a half-written slot.
    pub fn writer(&mut self) -> VisibleWriter<'_> {
        VisibleWriter {
            ptr: self.matrices.as_mut_ptr(),
            capacity: self.matrices.len(),
            len: &self.len,
            _buffer: PhantomData,
        }
    }
}

/// Lock-free append handle obtained from [`VisibleList::writer`].
pub struct VisibleWriter<'a> {
    ptr: *mut Mat4,
    capacity: usize,
    len: &'a AtomicUsize,
    _buffer: PhantomData<&'a mut [Mat4]>,
}

// SAFETY: every `push` writes a distinct index reserved by `fetch_add`, and
// the writer holds the list's exclusive borrow for its whole lifetime.
unsafe impl Send for VisibleWriter<'_> {}
unsafe impl Sync for VisibleWriter<'_> {}

impl VisibleWriter<'_> {
    /// # Panics
    /// If more matrices are pushed than the list can hold.
    #[inline]
    pub fn push(&self, matrix: Mat4) {
        let index = self.len.fetch_add(1, Ordering::Relaxed);
        assert!(index < self.capacity, "visible list overflow ({} matrices)", self.capacity);
        // SAFETY: `index` is in bounds and no other push received it.
        unsafe { self.ptr.add(index).write(matrix) };
    }
}
