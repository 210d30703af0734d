//! TensorPlan - Static Memory Layout Planner
//!
//! Plans the placement of tensor and scratch buffers inside a single
//! contiguous memory arena for on-device neural-network inference. Buffers
//! whose live intervals never overlap can share bytes, so a good plan needs
//! far less memory than the sum of buffer sizes.

pub mod error;
pub mod logging;
pub mod planner;

pub use error::{ErrorCategory, PlanResult, TensorPlanError};
pub use planner::{
    BufferRequirements, CollectSink, DiagnosticSink, GreedyMemoryPlanner, MemoryPlanner,
    PlanStats, PlannerError, TracingSink, WriteSink,
};

#[cfg(test)]
mod library_tests {
    use super::*;

    #[test]
    fn test_public_surface_round_trip() {
        let mut planner = GreedyMemoryPlanner::new();
        planner.add_buffer(64, 0, 1).unwrap();
        assert_eq!(planner.maximum_memory_size(), 64);
    }
}
