mod model_client;
mod spec;
mod tool;
mod trace;

pub use model_client::{ModelClient, ModelClientError};
pub use spec::{
    AgentSpec, SpecError, SpecFormat, StepSpec, ToolSpec, DEFAULT_MODEL_KEY, INPUT_PLACEHOLDER,
};
pub use tool::Tool;
pub use trace::TraceRecord;
