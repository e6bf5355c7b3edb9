mod agent_runner;
mod model_invoker;
mod spec_loader;

pub use agent_runner::{AgentRunner, AgentRunnerError, RunError, RunOutcome, StepError};
pub use model_invoker::{mock_response, ModelInvocationError, ModelInvoker, DEFAULT_BACKOFF};
pub use spec_loader::{JsonSpecParser, SpecLoader, SpecParser, YamlSpecParser};
