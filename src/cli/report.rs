use chainrun::contexts::RunOutcome;
use chainrun::data::TraceRecord;

/// Renders the final result followed by the indented JSON trace
pub fn render_outcome(outcome: &RunOutcome) -> serde_json::Result<String> {
    Ok(format!(
        "Final Result:\n{}\n\nExecution Trace:\n{}",
        outcome.result,
        serde_json::to_string_pretty(&outcome.trace)?
    ))
}

/// Renders the steps that completed before a run failed
pub fn render_partial_trace(trace: &[TraceRecord]) -> serde_json::Result<String> {
    Ok(format!(
        "Partial Trace ({} completed step(s)):\n{}",
        trace.len(),
        serde_json::to_string_pretty(trace)?
    ))
}

/// Renders a per-step timing summary
pub fn render_summary(trace: &[TraceRecord]) -> String {
    let total: f64 = trace.iter().map(|r| r.elapsed_seconds).sum();
    let tool_steps = trace.iter().filter(|r| r.tool.is_some()).count();

    let mut lines = vec!["=".repeat(60), "Summary:".to_string()];
    for (index, record) in trace.iter().enumerate() {
        let target = record
            .tool
            .as_deref()
            .or(record.model.as_deref())
            .unwrap_or("-");
        lines.push(format!(
            "  {:>2}. {:<12} {:<20} {:.2}s",
            index + 1,
            record.role,
            target,
            record.elapsed_seconds
        ));
    }
    lines.push(format!("  Steps:     {}", trace.len()));
    lines.push(format!("  Model:     {}", trace.len() - tool_steps));
    lines.push(format!("  Tool:      {}", tool_steps));
    lines.push(format!("  Duration:  {:.2}s", total));
    lines.push("=".repeat(60));
    lines.join("\n")
}
