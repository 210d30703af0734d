//! Diagnostic sink for planner output
//!
//! The planner reports human-readable diagnostics (rejected operations, ASCII
//! plan lines) through a sink it borrows per call. The sink outlives the
//! call; the planner takes no ownership.

use std::io::Write;

/// Receives formatted diagnostic messages from the planner.
pub trait DiagnosticSink {
    /// Accept one formatted message. Messages carry no trailing newline.
    fn report(&mut self, message: &str);
}

/// Forwards every message to the `tracing` subscriber at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, message: &str) {
        tracing::info!(target: "tensorplan", "{}", message);
    }
}

/// Buffers messages in memory.
///
/// Used by tests and by [`memory_plan_string`] to capture plan output.
///
/// [`memory_plan_string`]: crate::planner::GreedyMemoryPlanner::memory_plan_string
#[derive(Debug, Default)]
pub struct CollectSink {
    messages: Vec<String>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far, in order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Drain the collected messages.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl DiagnosticSink for CollectSink {
    fn report(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Writes each message as one line to an [`io::Write`] target.
///
/// Write failures are swallowed; diagnostics are advisory and must not fail
/// planner operations.
///
/// [`io::Write`]: std::io::Write
#[derive(Debug)]
pub struct WriteSink<W: Write>(pub W);

impl<W: Write> DiagnosticSink for WriteSink<W> {
    fn report(&mut self, message: &str) {
        let _ = writeln!(self.0, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_sink_orders_messages() {
        let mut sink = CollectSink::new();
        sink.report("first");
        sink.report("second");

        assert_eq!(sink.messages(), &["first", "second"]);

        let taken = sink.take_messages();
        assert_eq!(taken.len(), 2);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_write_sink_appends_newlines() {
        let mut sink = WriteSink(Vec::new());
        sink.report("alpha");
        sink.report("beta");

        assert_eq!(sink.0, b"alpha\nbeta\n");
    }
}
