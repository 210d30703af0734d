//! Abstract planner contract
//!
//! Graph executors drive memory planning through this trait so the planning
//! strategy can be swapped without touching execution code. Failures are
//! reported both ways: a diagnostic message to the sink and a `false`/`None`
//! return.

use super::sink::DiagnosticSink;

/// Interface for planning the layout of memory buffers used while executing
/// a graph.
///
/// Reads that depend on offsets (`maximum_memory_size`,
/// `offset_for_buffer`) take `&mut self`: implementations recompute the plan
/// lazily when buffers were added since the last computation.
pub trait MemoryPlanner {
    /// Record one buffer: `size` bytes, live over the closed step interval
    /// `[first_time_used, last_time_used]`. Returns `false` and reports to
    /// `sink` when the planner is full.
    fn add_buffer(
        &mut self,
        sink: &mut dyn DiagnosticSink,
        size: usize,
        first_time_used: i32,
        last_time_used: i32,
    ) -> bool;

    /// High-water mark of the planned arena: the minimum number of bytes an
    /// arena must have to hold every buffer at its planned offset.
    fn maximum_memory_size(&mut self) -> usize;

    /// How many buffers have been recorded.
    fn buffer_count(&self) -> usize;

    /// Planned byte offset of buffer `buffer_index`. Returns `None` and
    /// reports to `sink` when the index is out of range.
    fn offset_for_buffer(
        &mut self,
        sink: &mut dyn DiagnosticSink,
        buffer_index: usize,
    ) -> Option<usize>;
}
