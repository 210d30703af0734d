//! End-to-end tests for the greedy memory planner

use tensorplan::{
    CollectSink, GreedyMemoryPlanner, MemoryPlanner, PlannerError,
};

#[test]
fn test_empty_planner_reports_zero() {
    let mut planner = GreedyMemoryPlanner::new();

    assert_eq!(planner.buffer_count(), 0);
    assert_eq!(planner.maximum_memory_size(), 0);
}

#[test]
fn test_single_buffer_sits_at_zero() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(100, 0, 5).unwrap();

    assert_eq!(planner.buffer_count(), 1);
    assert_eq!(planner.offset_for_buffer(0).unwrap(), 0);
    assert_eq!(planner.maximum_memory_size(), 100);
}

#[test]
fn test_time_disjoint_buffers_share_offset_zero() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(50, 0, 1).unwrap();
    planner.add_buffer(80, 2, 3).unwrap();

    assert_eq!(planner.offset_for_buffer(0).unwrap(), 0);
    assert_eq!(planner.offset_for_buffer(1).unwrap(), 0);
    assert_eq!(planner.maximum_memory_size(), 80);
}

#[test]
fn test_time_overlapping_buffers_get_disjoint_ranges() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(100, 0, 9).unwrap();
    planner.add_buffer(40, 0, 9).unwrap();

    assert_eq!(planner.offset_for_buffer(0).unwrap(), 0);
    assert_eq!(planner.offset_for_buffer(1).unwrap(), 100);
    assert_eq!(planner.maximum_memory_size(), 140);
}

#[test]
fn test_buffer_with_no_fitting_gap_stacks_on_top() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(100, 0, 9).unwrap();
    planner.add_buffer(100, 0, 9).unwrap();
    planner.add_buffer(80, 2, 3).unwrap();

    assert_eq!(planner.offset_for_buffer(0).unwrap(), 0);
    assert_eq!(planner.offset_for_buffer(1).unwrap(), 100);
    assert_eq!(planner.offset_for_buffer(2).unwrap(), 200);
    assert_eq!(planner.maximum_memory_size(), 280);
}

#[test]
fn test_buffer_reuses_bytes_of_time_disjoint_neighbor() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(100, 0, 9).unwrap();
    planner.add_buffer(100, 5, 9).unwrap();
    planner.add_buffer(40, 0, 4).unwrap();

    // The third buffer conflicts only with the first, so it lands right
    // after it - on bytes the second buffer occupies at other times.
    assert_eq!(planner.offset_for_buffer(0).unwrap(), 0);
    assert_eq!(planner.offset_for_buffer(1).unwrap(), 100);
    assert_eq!(planner.offset_for_buffer(2).unwrap(), 100);
    assert_eq!(planner.maximum_memory_size(), 200);
}

#[test]
fn test_capacity_refusal_preserves_count() {
    let mut planner = GreedyMemoryPlanner::with_capacity(3);
    for _ in 0..3 {
        planner.add_buffer(10, 0, 1).unwrap();
    }

    let result = planner.add_buffer(10, 0, 1);
    assert!(matches!(
        result,
        Err(PlannerError::CapacityExceeded { capacity: 3 })
    ));
    assert_eq!(planner.buffer_count(), 3);
}

#[test]
fn test_identical_sequences_produce_identical_plans() {
    let inputs = [
        (64usize, 0, 3),
        (64, 2, 5),
        (32, 1, 4),
        (128, 0, 6),
        (32, 5, 8),
        (16, 7, 9),
    ];

    let mut first = GreedyMemoryPlanner::new();
    let mut second = GreedyMemoryPlanner::new();
    for &(size, from, to) in &inputs {
        first.add_buffer(size, from, to).unwrap();
        second.add_buffer(size, from, to).unwrap();
    }

    assert_eq!(first.maximum_memory_size(), second.maximum_memory_size());
    for i in 0..inputs.len() {
        assert_eq!(
            first.offset_for_buffer(i).unwrap(),
            second.offset_for_buffer(i).unwrap()
        );
    }
}

#[test]
fn test_reads_are_stable_until_next_add() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(64, 0, 3).unwrap();
    planner.add_buffer(48, 2, 5).unwrap();

    let size_before = planner.maximum_memory_size();
    let offset_before = planner.offset_for_buffer(1).unwrap();

    assert_eq!(planner.maximum_memory_size(), size_before);
    assert_eq!(planner.offset_for_buffer(1).unwrap(), offset_before);

    // A new buffer invalidates the plan and reads pick up the change.
    planner.add_buffer(200, 0, 5).unwrap();
    assert!(planner.maximum_memory_size() > size_before);
    assert_eq!(planner.buffer_count(), 3);
}

#[test]
fn test_executor_drives_planner_through_trait() {
    fn plan_graph(planner: &mut dyn MemoryPlanner) -> (usize, Vec<usize>) {
        let mut sink = CollectSink::new();
        let buffers = [(256usize, 0, 2), (256, 1, 3), (64, 2, 4)];
        for &(size, from, to) in &buffers {
            assert!(planner.add_buffer(&mut sink, size, from, to));
        }
        let arena = planner.maximum_memory_size();
        let offsets = (0..planner.buffer_count())
            .map(|i| planner.offset_for_buffer(&mut sink, i).unwrap())
            .collect();
        (arena, offsets)
    }

    let mut planner = GreedyMemoryPlanner::new();
    let (arena, offsets) = plan_graph(&mut planner);

    assert_eq!(offsets, vec![0, 256, 512]);
    assert_eq!(arena, 576);
}

#[test]
fn test_trait_reports_failures_through_sink() {
    let mut planner = GreedyMemoryPlanner::with_capacity(1);
    let mut sink = CollectSink::new();

    assert!(MemoryPlanner::add_buffer(&mut planner, &mut sink, 10, 0, 1));
    assert!(!MemoryPlanner::add_buffer(&mut planner, &mut sink, 10, 0, 1));
    assert!(MemoryPlanner::offset_for_buffer(&mut planner, &mut sink, 9).is_none());

    assert_eq!(sink.messages().len(), 2);
    assert_eq!(sink.messages()[0], "too many buffers (capacity is 1)");
    assert_eq!(sink.messages()[1], "buffer index 9 is outside range 0 to 1");
}

#[test]
fn test_memory_plan_lines_are_fixed_width() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(400, 0, 2).unwrap();
    planner.add_buffer(200, 1, 5).unwrap();
    planner.add_buffer(100, 4, 7).unwrap();

    let mut sink = CollectSink::new();
    planner.print_memory_plan(&mut sink);

    // One line per step 0..=7.
    assert_eq!(sink.messages().len(), 8);
    for line in sink.messages() {
        assert_eq!(line.chars().count(), 80);
    }
    // A correct plan never draws two live buffers over the same column.
    for line in sink.messages() {
        assert!(!line.contains('!'));
    }
}

#[test]
fn test_plan_stats_track_reuse() {
    let mut planner = GreedyMemoryPlanner::new();
    planner.add_buffer(100, 0, 1).unwrap();
    planner.add_buffer(100, 2, 3).unwrap();
    planner.add_buffer(100, 4, 5).unwrap();

    let stats = planner.plan_stats();
    assert_eq!(stats.buffer_count, 3);
    assert_eq!(stats.arena_bytes, 100);
    assert_eq!(stats.requested_bytes, 300);
    assert_eq!(stats.packing_ratio(), 3.0);
}
