use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Execution metadata of a single step.
///
/// One record is created per executed step and appended to the run's trace in
/// step order; records are never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub role: String,
    /// Declared tool name, tool steps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Resolved model, model steps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Rendered prompt; always `None` for tool steps
    pub prompt: Option<String>,
    pub output: String,
    /// Wall-clock duration of the dispatch in seconds, rounded to two decimals
    #[serde(rename = "runtime")]
    pub elapsed_seconds: f64,
    pub timestamp: String,
}

impl TraceRecord {
    /// Record for a step that invoked a tool
    pub fn for_tool(
        role: &str,
        tool: &str,
        output: String,
        elapsed: Duration,
        at: DateTime<Local>,
    ) -> Self {
        Self {
            role: role.to_string(),
            tool: Some(tool.to_string()),
            model: None,
            prompt: None,
            output,
            elapsed_seconds: round_seconds(elapsed),
            timestamp: format_timestamp(at),
        }
    }

    /// Record for a step that called a model
    pub fn for_model(
        role: &str,
        model: &str,
        prompt: String,
        output: String,
        elapsed: Duration,
        at: DateTime<Local>,
    ) -> Self {
        Self {
            role: role.to_string(),
            tool: None,
            model: Some(model.to_string()),
            prompt: Some(prompt),
            output,
            elapsed_seconds: round_seconds(elapsed),
            timestamp: format_timestamp(at),
        }
    }
}

fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_elapsed_rounded_to_two_decimals() {
        let record = TraceRecord::for_tool(
            "executor",
            "calc",
            "4".to_string(),
            Duration::from_millis(1_236),
            fixed_time(),
        );
        assert_eq!(record.elapsed_seconds, 1.24);
        assert_eq!(record.timestamp, "2024-03-09 14:05:07");
        assert!(record.prompt.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let record = TraceRecord::for_model(
            "planner",
            "gpt-4o",
            "Plan: 1+1".to_string(),
            "ok".to_string(),
            Duration::from_millis(4),
            fixed_time(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["role"], "planner");
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["prompt"], "Plan: 1+1");
        assert_eq!(value["runtime"], 0.0);
        assert!(value.get("tool").is_none());
    }

    #[test]
    fn test_tool_record_serializes_null_prompt() {
        let record = TraceRecord::for_tool(
            "search",
            "web",
            "out".to_string(),
            Duration::ZERO,
            fixed_time(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["prompt"].is_null());
        assert_eq!(value["tool"], "web");
    }
}
