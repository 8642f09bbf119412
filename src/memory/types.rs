/*!
 * Memory Types
 * Common types for kernel heap management
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes, available {available} bytes ({used} used / {total} total)")]
    OutOfMemory {
        requested: usize,
        available: usize,
        used: usize,
        total: usize,
    },

    #[error("Invalid allocation size: {0}")]
    InvalidSize(usize),
}

/// Kernel heap statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Heap budget in bytes, `None` when unbounded
    pub total_memory: Option<usize>,
    pub used_memory: usize,
    /// Bytes left before allocation fails, `None` when unbounded
    pub available_memory: Option<usize>,
    pub allocated_blocks: usize,
}
