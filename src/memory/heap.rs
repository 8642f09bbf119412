/*!
 * Kernel Heap
 *
 * Byte-budgeted allocator backing kernel bookkeeping records.
 *
 * # Design
 *
 * - Each allocation is an RAII [`HeapBlock`]; dropping the block returns its
 *   bytes to the heap
 * - Accounting is lock-free (CAS on the used counter) so a heap can be shared
 *   between tables without another lock
 * - An unbounded heap never fails and only counts
 */

use super::types::{MemoryError, MemoryResult, MemoryStats};
use log::trace;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct HeapInner {
    total: Option<usize>,
    used: AtomicUsize,
    blocks: AtomicUsize,
}

/// Shared kernel heap handle
#[derive(Clone)]
pub struct KernelHeap {
    inner: Arc<HeapInner>,
}

impl KernelHeap {
    /// Create a heap that fails once `total` bytes are in use
    pub fn new(total: usize) -> Self {
        Self {
            inner: Arc::new(HeapInner {
                total: Some(total),
                used: AtomicUsize::new(0),
                blocks: AtomicUsize::new(0),
            }),
        }
    }

    /// Create a heap with no budget
    pub fn unbounded() -> Self {
        Self {
            inner: Arc::new(HeapInner {
                total: None,
                used: AtomicUsize::new(0),
                blocks: AtomicUsize::new(0),
            }),
        }
    }

    /// Reserve `size` bytes
    pub fn alloc(&self, size: usize) -> MemoryResult<HeapBlock> {
        if size == 0 {
            return Err(MemoryError::InvalidSize(size));
        }

        match self.inner.total {
            None => {
                self.inner.used.fetch_add(size, Ordering::AcqRel);
            }
            Some(total) => {
                self.inner
                    .used
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                        used.checked_add(size).filter(|&next| next <= total)
                    })
                    .map_err(|used| MemoryError::OutOfMemory {
                        requested: size,
                        available: total.saturating_sub(used),
                        used,
                        total,
                    })?;
            }
        }

        self.inner.blocks.fetch_add(1, Ordering::AcqRel);
        trace!("Heap allocated {} bytes", size);

        Ok(HeapBlock {
            heap: Arc::clone(&self.inner),
            size,
        })
    }

    pub fn stats(&self) -> MemoryStats {
        let used = self.inner.used.load(Ordering::Acquire);
        MemoryStats {
            total_memory: self.inner.total,
            used_memory: used,
            available_memory: self.inner.total.map(|t| t.saturating_sub(used)),
            allocated_blocks: self.inner.blocks.load(Ordering::Acquire),
        }
    }
}

impl Default for KernelHeap {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for KernelHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelHeap")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Bytes reserved from a [`KernelHeap`], released on drop
pub struct HeapBlock {
    heap: Arc<HeapInner>,
    size: usize,
}

impl HeapBlock {
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        self.heap.used.fetch_sub(self.size, Ordering::AcqRel);
        self.heap.blocks.fetch_sub(1, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for HeapBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapBlock").field("size", &self.size).finish()
    }
}
