/*!
 * Memory Module
 * Kernel heap backing process records
 */

pub mod heap;
pub mod types;

// Re-export for convenience
pub use heap::{HeapBlock, KernelHeap};
pub use types::*;
