//! Memory layout planning for single-arena graph execution
//!
//! A graph executor knows, for every tensor and scratch buffer, how many
//! bytes it needs and the execution steps during which it must stay intact.
//! This module turns that information into byte offsets inside one contiguous
//! arena: buffers whose lifetimes never overlap may share bytes, so the arena
//! can be much smaller than the sum of buffer sizes.
//!
//! # Pattern
//!
//! 1. Record every buffer up front with [`GreedyMemoryPlanner::add_buffer`]
//! 2. Size the arena with [`GreedyMemoryPlanner::maximum_memory_size`]
//! 3. Read each buffer's offset with [`GreedyMemoryPlanner::offset_for_buffer`]
//!
//! The plan is recomputed lazily: adding a buffer marks it stale, and the
//! next offset-dependent read rebuilds it. Executors that want to swap
//! planning strategies depend on the [`MemoryPlanner`] trait instead of the
//! concrete type.

mod greedy;
mod planner;
mod sink;
mod types;

pub use greedy::GreedyMemoryPlanner;
pub use planner::MemoryPlanner;
pub use sink::{CollectSink, DiagnosticSink, TracingSink, WriteSink};
pub use types::{BufferRequirements, ListEntry, PlanStats, PlannerError, PlannerResult};
