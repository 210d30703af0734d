//! Greedy arena layout
//!
//! Home of [`GreedyMemoryPlanner`], the planner used for single-arena
//! execution. Placement quality matters here: on-device graphs live or die by
//! arena size, so the planner packs buffers with overlapping lifetimes around
//! each other instead of summing their sizes.

use super::planner::MemoryPlanner;
use super::sink::{CollectSink, DiagnosticSink};
use super::types::{BufferRequirements, ListEntry, PlanStats, PlannerError, PlannerResult};

/// Width of one ASCII plan line in characters.
const PLAN_LINE_WIDTH: usize = 80;

/// A memory planner that uses a greedy algorithm to arrange buffers in a
/// single arena, keeping the overall arena size small.
///
/// The algorithm:
/// - Clients record buffer information through [`add_buffer`].
/// - Any read that depends on offsets recomputes the plan if buffers were
///   added since the last computation.
/// - Buffers are sorted in descending order of size.
/// - The largest buffer is placed at offset zero.
/// - Each remaining buffer is placed in the first gap between buffers active
///   in its time range that is large enough, or after the last such buffer
///   when no gap fits.
///
/// Optimal placement is NP-hard, so this is a heuristic; the layouts it
/// produces are deterministic and decent in practice.
///
/// The planner is single-owner: no operation suspends or blocks, and shared
/// use requires external serialization.
///
/// [`add_buffer`]: GreedyMemoryPlanner::add_buffer
#[derive(Debug)]
pub struct GreedyMemoryPlanner {
    /// Maximum number of buffers this planner accepts.
    capacity: usize,
    /// Client-recorded buffer requirements, in insertion order.
    requirements: Vec<BufferRequirements>,
    /// Planned offset per buffer; meaningful only while `needs_layout` is false.
    buffer_offsets: Vec<usize>,
    /// Node pool for the offset-ordered list, rebuilt each layout pass.
    /// Index 0 is the head once any buffer is placed.
    entries: Vec<ListEntry>,
    /// Scratch for the descending-size sort.
    sorted_sizes: Vec<usize>,
    sorted_ids: Vec<usize>,
    /// Whether buffers were added since the last plan computation.
    needs_layout: bool,
}

impl GreedyMemoryPlanner {
    /// Default buffer capacity, sized for typical on-device graphs.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Create a planner with [`DEFAULT_CAPACITY`].
    ///
    /// [`DEFAULT_CAPACITY`]: GreedyMemoryPlanner::DEFAULT_CAPACITY
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a planner accepting at most `capacity` buffers.
    ///
    /// All storage is pre-allocated here; layout passes reuse it and never
    /// allocate.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            requirements: Vec::with_capacity(capacity),
            buffer_offsets: Vec::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
            sorted_sizes: Vec::with_capacity(capacity),
            sorted_ids: Vec::with_capacity(capacity),
            needs_layout: true,
        }
    }

    /// Record one buffer: `size` bytes, live over the closed step interval
    /// `[first_time_used, last_time_used]`.
    ///
    /// Returns the buffer's id (its insertion index, starting at 0).
    ///
    /// # Errors
    /// [`PlannerError::CapacityExceeded`] when the planner is full; the
    /// planner state is unchanged.
    pub fn add_buffer(
        &mut self,
        size: usize,
        first_time_used: i32,
        last_time_used: i32,
    ) -> PlannerResult<usize> {
        debug_assert!(
            first_time_used <= last_time_used,
            "buffer live interval is inverted"
        );
        if self.requirements.len() >= self.capacity {
            let err = PlannerError::CapacityExceeded {
                capacity: self.capacity,
            };
            tracing::warn!("{}", err);
            return Err(err);
        }

        let id = self.requirements.len();
        self.requirements.push(BufferRequirements {
            size,
            first_time_used,
            last_time_used,
        });
        self.buffer_offsets.push(0);
        self.needs_layout = true;
        tracing::trace!(
            "buffer {} recorded: {} bytes, live over [{}, {}]",
            id,
            size,
            first_time_used,
            last_time_used
        );
        Ok(id)
    }

    /// Number of buffers recorded so far.
    pub fn buffer_count(&self) -> usize {
        self.requirements.len()
    }

    /// Maximum number of buffers this planner accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many more buffers can be added.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.requirements.len()
    }

    /// The requirements recorded for buffer `buffer_index`.
    ///
    /// # Errors
    /// [`PlannerError::IndexOutOfRange`] when the index was never assigned.
    pub fn buffer_requirements(&self, buffer_index: usize) -> PlannerResult<&BufferRequirements> {
        self.requirements
            .get(buffer_index)
            .ok_or(PlannerError::IndexOutOfRange {
                index: buffer_index,
                count: self.requirements.len(),
            })
    }

    /// Planned byte offset of buffer `buffer_index` in the arena.
    ///
    /// Recomputes the plan first if buffers were added since the last
    /// computation.
    ///
    /// # Errors
    /// [`PlannerError::IndexOutOfRange`] when the index was never assigned;
    /// no layout pass runs in that case.
    pub fn offset_for_buffer(&mut self, buffer_index: usize) -> PlannerResult<usize> {
        if buffer_index >= self.requirements.len() {
            let err = PlannerError::IndexOutOfRange {
                index: buffer_index,
                count: self.requirements.len(),
            };
            tracing::warn!("{}", err);
            return Err(err);
        }
        self.calculate_offsets_if_needed();
        Ok(self.buffer_offsets[buffer_index])
    }

    /// High-water mark of the planned arena: the minimum arena size in bytes
    /// that holds every buffer at its planned offset. 0 when no buffers were
    /// added.
    pub fn maximum_memory_size(&mut self) -> usize {
        self.calculate_offsets_if_needed();
        self.offset_ordered()
            .map(|entry| entry.offset + self.requirements[entry.requirements_index].size)
            .max()
            .unwrap_or(0)
    }

    /// Summary statistics of the current plan.
    pub fn plan_stats(&mut self) -> PlanStats {
        let arena_bytes = self.maximum_memory_size();
        PlanStats {
            buffer_count: self.requirements.len(),
            arena_bytes,
            requested_bytes: self.requirements.iter().map(|r| r.size).sum(),
        }
    }

    /// Emit an ASCII diagram of the plan, one 80-character line per execution
    /// step, to `sink`.
    ///
    /// Each buffer is drawn with the digit `id % 10` over the columns its
    /// byte range maps to; `!` marks columns where two live buffers would
    /// collide visually. The diagram is advisory output, not a correctness
    /// check.
    pub fn print_memory_plan(&mut self, sink: &mut dyn DiagnosticSink) {
        self.calculate_offsets_if_needed();

        let mut max_size = PLAN_LINE_WIDTH;
        let mut max_time = 0i32;
        for (id, requirements) in self.requirements.iter().enumerate() {
            let end = self.buffer_offsets[id] + requirements.size;
            if end > max_size {
                max_size = end;
            }
            if requirements.last_time_used > max_time {
                max_time = requirements.last_time_used;
            }
        }

        for t in 0..=max_time {
            let mut line = [b'.'; PLAN_LINE_WIDTH];
            for (id, requirements) in self.requirements.iter().enumerate() {
                if t < requirements.first_time_used || t > requirements.last_time_used {
                    continue;
                }
                let offset = self.buffer_offsets[id];
                let line_start = offset * PLAN_LINE_WIDTH / max_size;
                let line_end = (offset + requirements.size) * PLAN_LINE_WIDTH / max_size;
                for cell in &mut line[line_start..line_end] {
                    *cell = if *cell == b'.' {
                        b'0' + (id % 10) as u8
                    } else {
                        b'!'
                    };
                }
            }
            let rendered: String = line.iter().map(|&b| b as char).collect();
            sink.report(&rendered);
        }
    }

    /// The ASCII plan as one newline-joined string, for logging and debug
    /// dumps.
    pub fn memory_plan_string(&mut self) -> String {
        let mut sink = CollectSink::new();
        self.print_memory_plan(&mut sink);
        sink.take_messages().join("\n")
    }

    /// Rebuild the plan when it is stale. No-op for an empty planner.
    fn calculate_offsets_if_needed(&mut self) {
        if !self.needs_layout || self.requirements.is_empty() {
            return;
        }
        self.needs_layout = false;

        // Order the buffers by descending size. Placing the large buffers
        // first lets the small ones fit into the gaps, rather than the small
        // ones fragmenting the space up front.
        self.sorted_sizes.clear();
        self.sorted_ids.clear();
        for (id, requirements) in self.requirements.iter().enumerate() {
            self.sorted_sizes.push(requirements.size);
            self.sorted_ids.push(id);
        }
        // Naive sort; fine up to the capacities this planner is built for.
        reverse_sort_in_place(&mut self.sorted_sizes, &mut self.sorted_ids);

        // The largest buffer seeds the offset-ordered list at offset zero.
        self.entries.clear();
        let first_id = self.sorted_ids[0];
        self.entries.push(ListEntry {
            offset: 0,
            requirements_index: first_id,
            next_entry_index: None,
        });
        self.buffer_offsets[first_id] = 0;

        for i in 1..self.sorted_ids.len() {
            let buffer_id = self.sorted_ids[i];
            let wanted = self.requirements[buffer_id];

            // Find the first placed buffer active in our time range. The
            // candidate is the buffer we are considering placing ours after.
            let mut candidate = if self.entry_overlaps_in_time(
                0,
                wanted.first_time_used,
                wanted.last_time_used,
            ) {
                Some(0)
            } else {
                self.next_conflicting_entry(0, wanted.first_time_used, wanted.last_time_used)
            };

            // Walk the offset-ordered list looking for a large-enough gap
            // between buffers active in our time range.
            while let Some(current) = candidate {
                let next = match self.next_conflicting_entry(
                    current,
                    wanted.first_time_used,
                    wanted.last_time_used,
                ) {
                    Some(next) => next,
                    // End of the conflicting chain; append after `current`.
                    None => break,
                };
                let current_end = self.entries[current].offset
                    + self.requirements[self.entries[current].requirements_index].size;
                // A buffer that does not conflict with us may sit physically
                // between two that do, so the gap can come out negative.
                let gap = self.entries[next].offset as i64 - current_end as i64;
                if gap >= wanted.size as i64 {
                    break;
                }
                candidate = Some(next);
            }

            // Either a gap was found (possibly at the end of the chain), or
            // no placed buffer is active in this time range and offset zero
            // is free for the taking.
            let offset = match candidate {
                Some(current) => {
                    self.entries[current].offset
                        + self.requirements[self.entries[current].requirements_index].size
                }
                None => 0,
            };
            self.buffer_offsets[buffer_id] = offset;
            self.insert_entry(offset, buffer_id);
            tracing::trace!(
                "placed buffer {} ({} bytes) at offset {}",
                buffer_id,
                wanted.size,
                offset
            );
        }

        tracing::debug!(
            "memory plan recomputed for {} buffers",
            self.requirements.len()
        );
    }

    /// Whether the buffer behind `entry_index` is active anywhere inside the
    /// given time range.
    fn entry_overlaps_in_time(
        &self,
        entry_index: usize,
        first_time_used: i32,
        last_time_used: i32,
    ) -> bool {
        let requirements = &self.requirements[self.entries[entry_index].requirements_index];
        requirements.overlaps_in_time(first_time_used, last_time_used)
    }

    /// First successor of `start` in the offset-ordered list whose buffer is
    /// active in the given time range. Does not consider `start` itself.
    fn next_conflicting_entry(
        &self,
        start: usize,
        first_time_used: i32,
        last_time_used: i32,
    ) -> Option<usize> {
        let mut candidate = self.entries[start].next_entry_index;
        while let Some(index) = candidate {
            if self.entry_overlaps_in_time(index, first_time_used, last_time_used) {
                return Some(index);
            }
            candidate = self.entries[index].next_entry_index;
        }
        None
    }

    /// Allocate a node for the newly-placed buffer and link it into the list
    /// so ascending-offset order is kept. Equal offsets insert after existing
    /// entries.
    fn insert_entry(&mut self, offset: usize, buffer_id: usize) {
        let new_index = self.entries.len();
        self.entries.push(ListEntry {
            offset,
            requirements_index: buffer_id,
            next_entry_index: None,
        });

        let mut current = 0;
        loop {
            match self.entries[current].next_entry_index {
                None => {
                    self.entries[current].next_entry_index = Some(new_index);
                    break;
                }
                Some(next) => {
                    if self.entries[next].offset > offset {
                        self.entries[new_index].next_entry_index = Some(next);
                        self.entries[current].next_entry_index = Some(new_index);
                        break;
                    }
                    current = next;
                }
            }
        }
    }

    /// Walk the placement list in ascending offset order.
    fn offset_ordered(&self) -> OffsetOrdered<'_> {
        OffsetOrdered {
            entries: &self.entries,
            next: if self.entries.is_empty() { None } else { Some(0) },
        }
    }
}

impl Default for GreedyMemoryPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the offset-ordered placement list.
struct OffsetOrdered<'a> {
    entries: &'a [ListEntry],
    next: Option<usize>,
}

impl<'a> Iterator for OffsetOrdered<'a> {
    type Item = &'a ListEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let entry = &self.entries[index];
        self.next = entry.next_entry_index;
        Some(entry)
    }
}

impl MemoryPlanner for GreedyMemoryPlanner {
    fn add_buffer(
        &mut self,
        sink: &mut dyn DiagnosticSink,
        size: usize,
        first_time_used: i32,
        last_time_used: i32,
    ) -> bool {
        match GreedyMemoryPlanner::add_buffer(self, size, first_time_used, last_time_used) {
            Ok(_) => true,
            Err(err) => {
                sink.report(&err.to_string());
                false
            }
        }
    }

    fn maximum_memory_size(&mut self) -> usize {
        GreedyMemoryPlanner::maximum_memory_size(self)
    }

    fn buffer_count(&self) -> usize {
        GreedyMemoryPlanner::buffer_count(self)
    }

    fn offset_for_buffer(&mut self, sink: &mut dyn DiagnosticSink, buffer_index: usize) -> Option<usize> {
        match GreedyMemoryPlanner::offset_for_buffer(self, buffer_index) {
            Ok(offset) => Some(offset),
            Err(err) => {
                sink.report(&err.to_string());
                None
            }
        }
    }
}

/// Sort `sizes` in place in descending order, carrying `ids` along.
///
/// Insertion sort with strictly-less shifting: equal sizes keep their
/// original order, which makes the produced layouts deterministic. Quadratic,
/// and deliberately so; planner capacities are small.
fn reverse_sort_in_place(sizes: &mut [usize], ids: &mut [usize]) {
    debug_assert_eq!(sizes.len(), ids.len());
    for i in 1..sizes.len() {
        let size = sizes[i];
        let id = ids[i];
        let mut j = i;
        while j > 0 && sizes[j - 1] < size {
            sizes[j] = sizes[j - 1];
            ids[j] = ids[j - 1];
            j -= 1;
        }
        sizes[j] = size;
        ids[j] = id;
    }
}
