use crate::contexts::{ModelInvocationError, ModelInvoker, SpecLoader};
use crate::data::{AgentSpec, ModelClient, SpecError, StepSpec, TraceRecord};
use crate::registries::{PromptRegistry, ToolError, ToolRegistry};
use chrono::{DateTime, Local};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while executing a single step
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Model(#[from] ModelInvocationError),
}

/// A run that stopped at a failing step.
///
/// Carries the records of every step that completed before the failure.
#[derive(Debug, Error)]
#[error("step {step_index} ('{role}') failed: {source}")]
pub struct RunError {
    pub step_index: usize,
    pub role: String,
    #[source]
    pub source: StepError,
    pub partial_trace: Vec<TraceRecord>,
}

/// Errors that can occur in the agent runner
#[derive(Debug, Error)]
pub enum AgentRunnerError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Final context and complete trace of a successful run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: String,
    pub trace: Vec<TraceRecord>,
}

/// What a dispatched step produced, before it is timed and recorded
enum StepOutput {
    Tool {
        tool: String,
        output: String,
    },
    Model {
        model: String,
        prompt: String,
        output: String,
    },
}

impl StepOutput {
    fn into_record(self, role: &str, elapsed: Duration, at: DateTime<Local>) -> TraceRecord {
        match self {
            StepOutput::Tool { tool, output } => {
                TraceRecord::for_tool(role, &tool, output, elapsed, at)
            }
            StepOutput::Model {
                model,
                prompt,
                output,
            } => TraceRecord::for_model(role, &model, prompt, output, elapsed, at),
        }
    }
}

/// Agent Runner context executes the steps of a spec in order, threading the
/// context string through them and recording a trace.
pub struct AgentRunner {
    spec: AgentSpec,
    default_model: String,
    tools: ToolRegistry,
    prompts: PromptRegistry,
    invoker: ModelInvoker,
}

impl AgentRunner {
    /// Creates a new AgentRunner
    ///
    /// # Arguments
    /// * `spec` - The agent spec; validated before anything else is built
    /// * `client` - Live model client, or `None` to run in mock mode
    pub fn new(
        spec: AgentSpec,
        client: Option<Box<dyn ModelClient>>,
    ) -> Result<Self, AgentRunnerError> {
        spec.validate()?;

        let default_model = spec
            .default_model()
            .map(str::to_string)
            .ok_or_else(|| SpecError::Validation("llm.default_model is missing".to_string()))?;
        let tools = ToolRegistry::from_spec(&spec)?;
        let prompts = PromptRegistry::builtin().with_overrides(&spec.prompts);
        let invoker = ModelInvoker::new(client, spec.retry);

        for (index, step) in spec.steps.iter().enumerate() {
            if let (Some(tool), Some(model)) = (&step.tool, &step.model) {
                warn!(
                    step = index,
                    role = %step.role,
                    tool = %tool,
                    model = %model,
                    "step names a tool, ignoring its model override"
                );
            }
        }

        Ok(Self {
            spec,
            default_model,
            tools,
            prompts,
            invoker,
        })
    }

    /// Loads the spec at `path` and builds a runner for it
    pub fn from_path(
        path: &Path,
        loader: &SpecLoader,
        client: Option<Box<dyn ModelClient>>,
    ) -> Result<Self, AgentRunnerError> {
        let spec = loader.load_path(path)?;
        Self::new(spec, client)
    }

    /// Overrides the delay between attempts of a failing model call
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.invoker = self.invoker.with_backoff(backoff);
        self
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub fn is_live(&self) -> bool {
        self.invoker.is_live()
    }

    /// Public function: run
    ///
    /// Executes every step in order. The output of each step becomes the input
    /// of the next; the last output is returned together with the trace.
    pub fn run(&self, user_input: &str) -> Result<RunOutcome, RunError> {
        info!(
            steps = self.spec.steps.len(),
            tools = ?self.tools.names().collect::<Vec<_>>(),
            retry = self.invoker.retry_count(),
            live = self.invoker.is_live(),
            "starting agent run"
        );

        let mut context = user_input.to_string();
        let mut trace = Vec::with_capacity(self.spec.steps.len());

        for (index, step) in self.spec.steps.iter().enumerate() {
            debug!(step = index, role = %step.role, tool = ?step.tool, "dispatching step");

            let start = Instant::now();
            let dispatched = self.execute_step(step, &context);
            let elapsed = start.elapsed();

            let dispatched = match dispatched {
                Ok(out) => out,
                Err(source) => {
                    return Err(RunError {
                        step_index: index,
                        role: step.role.clone(),
                        source,
                        partial_trace: trace,
                    });
                }
            };

            let record = dispatched.into_record(&step.role, elapsed, Local::now());
            debug!(step = index, runtime = record.elapsed_seconds, "step completed");
            context = record.output.clone();
            trace.push(record);
        }

        info!(steps = trace.len(), "agent run finished");
        Ok(RunOutcome {
            result: context,
            trace,
        })
    }

    /// Dispatches one step to its tool or to the model
    fn execute_step(&self, step: &StepSpec, context: &str) -> Result<StepOutput, StepError> {
        if let Some(tool_name) = &step.tool {
            let tool = self.tools.get(tool_name)?;
            return Ok(StepOutput::Tool {
                tool: tool_name.clone(),
                output: tool.run(context),
            });
        }

        let model = step.model.as_deref().unwrap_or(&self.default_model);
        let prompt = self.prompts.render(&step.role, context);
        let output = self.invoker.invoke(model, &prompt)?;

        Ok(StepOutput::Model {
            model: model.to_string(),
            prompt,
            output,
        })
    }
}
