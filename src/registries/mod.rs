mod prompt_registry;
mod tool_registry;

pub use prompt_registry::{PromptRegistry, DEFAULT_TEMPLATE};
pub use tool_registry::{load_tool, ToolError, ToolKind, ToolRegistry};
