//! Library-level tests for running agent specs end to end
//!
//! All tests run in mock mode or against in-process model clients; none of
//! them reach a network provider.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chainrun::contexts::{mock_response, AgentRunner, AgentRunnerError, SpecLoader, StepError};
use chainrun::data::{AgentSpec, ModelClient, ModelClientError, SpecError, SpecFormat};
use chainrun::registries::{PromptRegistry, ToolError};

fn agents_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("agents")
}

fn load(raw: &str) -> AgentSpec {
    SpecLoader::default()
        .load_str(raw, SpecFormat::Yaml)
        .expect("spec should load")
}

/// Fails a fixed number of calls, then succeeds
struct CountingClient {
    failures: u32,
    calls: Arc<AtomicU32>,
}

impl ModelClient for CountingClient {
    fn name(&self) -> &str {
        "counting"
    }

    fn complete(&self, _model: &str, _prompt: &str) -> Result<String, ModelClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(ModelClientError::Network("connection reset".to_string()))
        } else {
            Ok("\n  7 * 6  \n".to_string())
        }
    }
}

#[test]
fn planner_then_calculator_scenario() {
    let spec = load(
        r#"
llm:
  default_model: gpt-4o-mini
tools:
  calculator:
    type: calculator
steps:
  - role: planner
  - role: executor
    tool: calculator
"#,
    );
    let runner = AgentRunner::new(spec, None).unwrap();
    let outcome = runner.run("1+1").unwrap();

    assert_eq!(outcome.trace.len(), 2);

    let planner = &outcome.trace[0];
    let expected_prompt = PromptRegistry::builtin().render("planner", "1+1");
    assert_eq!(planner.role, "planner");
    assert_eq!(planner.prompt.as_deref(), Some(expected_prompt.as_str()));
    assert_eq!(planner.output, mock_response("gpt-4o-mini", &expected_prompt));

    let executor = &outcome.trace[1];
    assert_eq!(executor.role, "executor");
    assert!(executor.prompt.is_none());
    assert!(executor.output.starts_with("Error: "));
    assert_eq!(outcome.result, executor.output);
}

#[test]
fn trace_matches_steps_and_threads_context() {
    let runner = AgentRunner::from_path(
        &agents_dir().join("research_summary.json"),
        &SpecLoader::default(),
        None,
    )
    .unwrap();
    let outcome = runner.run("ownership in Rust").unwrap();

    let roles: Vec<&str> = outcome.trace.iter().map(|r| r.role.as_str()).collect();
    assert_eq!(roles, vec!["researcher", "lookup", "summarizer"]);

    for pair in outcome.trace.windows(2) {
        let next_input = match &pair[1].prompt {
            Some(prompt) => prompt.clone(),
            None => pair[1].output.clone(),
        };
        assert!(next_input.contains(&pair[0].output));
    }
    assert_eq!(outcome.result, outcome.trace[2].output);
    assert!(outcome.trace[2].prompt.as_deref().unwrap().starts_with("Summarize these search results"));
    assert_eq!(outcome.trace[2].model.as_deref(), Some("gpt-4o"));
}

#[test]
fn tool_steps_have_no_prompt_and_model_steps_do() {
    let runner = AgentRunner::from_path(
        &agents_dir().join("plan_and_calculate.yml"),
        &SpecLoader::default(),
        None,
    )
    .unwrap();
    let outcome = runner.run("3*3").unwrap();

    for (record, step) in outcome.trace.iter().zip(&runner.spec().steps) {
        assert_eq!(record.prompt.is_none(), step.is_tool_step());
        assert!(record.elapsed_seconds >= 0.0);
        assert_eq!(record.timestamp.len(), "2024-01-01 00:00:00".len());
    }
}

#[test]
fn model_output_feeds_calculator() {
    let calls = Arc::new(AtomicU32::new(0));
    let client = CountingClient {
        failures: 2,
        calls: Arc::clone(&calls),
    };
    let spec = load(
        r#"
llm:
  default_model: m
retry: 3
tools:
  calc:
    type: calculator
steps:
  - role: planner
  - role: executor
    tool: calc
"#,
    );
    let runner = AgentRunner::new(spec, Some(Box::new(client)))
        .unwrap()
        .with_backoff(Duration::ZERO);

    let outcome = runner.run("what is seven times six").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.trace[0].output, "7 * 6");
    assert_eq!(outcome.result, "42");
}

#[test]
fn retry_exhaustion_aborts_run() {
    let calls = Arc::new(AtomicU32::new(0));
    let client = CountingClient {
        failures: 2,
        calls: Arc::clone(&calls),
    };
    let spec = load("llm:\n  default_model: m\nretry: 2\nsteps:\n  - role: planner\n");
    let runner = AgentRunner::new(spec, Some(Box::new(client)))
        .unwrap()
        .with_backoff(Duration::ZERO);

    let err = runner.run("x").unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(err.step_index, 0);
    assert!(err.partial_trace.is_empty());
    assert!(matches!(err.source, StepError::Model(ref e) if e.attempts == 2));
}

#[test]
fn mock_mode_is_deterministic() {
    let spec = load("llm:\n  default_model: m\nsteps:\n  - role: summarizer\n  - role: critic\n");
    let runner = AgentRunner::new(spec, None).unwrap();
    let first = runner.run("same input").unwrap();
    let second = runner.run("same input").unwrap();
    assert_eq!(first.result, second.result);
}

#[test]
fn unknown_tool_type_fails_before_running() {
    let spec = load(
        "llm:\n  default_model: m\ntools:\n  sh:\n    type: shell\nsteps:\n  - role: a\n    tool: sh\n",
    );
    let result = AgentRunner::new(spec, None);
    assert!(matches!(
        result,
        Err(AgentRunnerError::Tool(ToolError::UnknownToolType(ref t))) if t == "shell"
    ));
}

#[test]
fn undeclared_tool_reference_fails_validation() {
    let result = SpecLoader::default().load_str(
        "llm:\n  default_model: m\nsteps:\n  - role: a\n    tool: calculator\n",
        SpecFormat::Yaml,
    );
    assert!(matches!(result, Err(SpecError::Validation(_))));
}

#[test]
fn tool_step_with_model_and_extra_keys_runs_the_tool() {
    let spec = SpecLoader::default()
        .load_str(
            r#"{
                "name": "demo",
                "llm": {"default_model": "m"},
                "tools": {"calc": {"type": "calculator", "version": "1"}},
                "steps": [
                    {"role": "executor", "tool": "calc", "model": "gpt-4", "description": "x"}
                ]
            }"#,
            SpecFormat::Json,
        )
        .expect("extra keys should be ignored");
    let runner = AgentRunner::new(spec, None).unwrap();
    let outcome = runner.run("2+2").unwrap();

    assert_eq!(outcome.result, "4");
    assert_eq!(outcome.trace.len(), 1);
    assert!(outcome.trace[0].prompt.is_none());
}
