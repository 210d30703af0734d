//! Core types for the memory planner
//!
//! This module contains the error type, result alias, and the data structures
//! shared by the planner implementation: per-buffer requirements, the
//! offset-list node, and plan-level statistics.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("too many buffers (capacity is {capacity})")]
    CapacityExceeded { capacity: usize },
    #[error("buffer index {index} is outside range 0 to {count}")]
    IndexOutOfRange { index: usize, count: usize },
}

pub type PlannerResult<T> = Result<T, PlannerError>;

/// What a client told us about one buffer: how many bytes it needs and the
/// closed interval of execution steps during which it must hold its contents.
///
/// Requirements are immutable once recorded; the planner never mutates or
/// removes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRequirements {
    /// Size in bytes.
    pub size: usize,
    /// First execution step at which the buffer is live.
    pub first_time_used: i32,
    /// Last execution step at which the buffer is live (inclusive).
    pub last_time_used: i32,
}

impl BufferRequirements {
    /// Two buffers conflict iff their live intervals overlap in time.
    pub fn overlaps_in_time(&self, first_time_used: i32, last_time_used: i32) -> bool {
        self.first_time_used <= last_time_used && first_time_used <= self.last_time_used
    }
}

/// Node in the offset-ordered placement list.
///
/// Nodes live in a fixed pool and refer to their successor by pool index, so
/// the whole list can be recycled by truncating the pool. Index 0 is the head
/// once any buffer has been placed.
#[derive(Debug, Clone, Copy)]
pub struct ListEntry {
    /// Byte offset of the placed buffer in the arena.
    pub offset: usize,
    /// Index of the buffer's record in the requirements store.
    pub requirements_index: usize,
    /// Pool index of the next entry in ascending offset order.
    pub next_entry_index: Option<usize>,
}

/// Summary of a computed plan
///
/// Snapshot of the layout outcome for logging and capacity sizing. A
/// `packing_ratio` above 1.0 means temporal reuse let buffers share arena
/// bytes; exactly 1.0 means every buffer got private space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanStats {
    /// Number of buffers in the plan.
    pub buffer_count: usize,
    /// Arena high-water mark in bytes (minimum arena size for this plan).
    pub arena_bytes: usize,
    /// Sum of all requested buffer sizes in bytes.
    pub requested_bytes: usize,
}

impl PlanStats {
    /// Requested bytes per arena byte. 0.0 for an empty plan.
    pub fn packing_ratio(&self) -> f64 {
        if self.arena_bytes > 0 {
            self.requested_bytes as f64 / self.arena_bytes as f64
        } else {
            0.0
        }
    }

    /// Format bytes as human readable (B, KB, MB, GB)
    pub fn format_bytes(bytes: usize) -> String {
        const KB: usize = 1024;
        const MB: usize = 1024 * 1024;
        const GB: usize = 1024 * 1024 * 1024;

        if bytes >= GB {
            format!("{:.2} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_in_time() {
        let req = BufferRequirements {
            size: 16,
            first_time_used: 2,
            last_time_used: 5,
        };

        assert!(req.overlaps_in_time(5, 7));
        assert!(req.overlaps_in_time(0, 2));
        assert!(req.overlaps_in_time(3, 4));
        assert!(req.overlaps_in_time(0, 10));

        assert!(!req.overlaps_in_time(6, 9));
        assert!(!req.overlaps_in_time(0, 1));
    }

    #[test]
    fn test_error_messages() {
        let err = PlannerError::CapacityExceeded { capacity: 1024 };
        assert_eq!(err.to_string(), "too many buffers (capacity is 1024)");

        let err = PlannerError::IndexOutOfRange { index: 7, count: 3 };
        assert_eq!(err.to_string(), "buffer index 7 is outside range 0 to 3");
    }

    #[test]
    fn test_packing_ratio() {
        let empty = PlanStats {
            buffer_count: 0,
            arena_bytes: 0,
            requested_bytes: 0,
        };
        assert_eq!(empty.packing_ratio(), 0.0);

        let reused = PlanStats {
            buffer_count: 2,
            arena_bytes: 80,
            requested_bytes: 130,
        };
        assert!(reused.packing_ratio() > 1.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(PlanStats::format_bytes(500), "500 B");
        assert_eq!(PlanStats::format_bytes(2048), "2.00 KB");
        assert_eq!(PlanStats::format_bytes(2_000_000), "1.91 MB");
        assert_eq!(PlanStats::format_bytes(2_000_000_000), "1.86 GB");
    }
}
