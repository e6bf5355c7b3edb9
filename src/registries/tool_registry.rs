use crate::data::{AgentSpec, Tool};
use crate::tools::{CalculatorTool, WebSearchTool};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised while building or querying the tool registry
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool type: {0}")]
    UnknownToolType(String),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),
}

/// The closed set of tools a spec can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    WebSearch,
    Calculator,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::WebSearch, ToolKind::Calculator];

    /// Type tag used in the `tools` section of a spec
    pub fn tag(self) -> &'static str {
        match self {
            ToolKind::WebSearch => "web_search",
            ToolKind::Calculator => "calculator",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn instantiate(self) -> Box<dyn Tool> {
        match self {
            ToolKind::WebSearch => Box::new(WebSearchTool),
            ToolKind::Calculator => Box::new(CalculatorTool),
        }
    }
}

/// Creates a tool from its type tag
pub fn load_tool(tool_type: &str) -> Result<Box<dyn Tool>, ToolError> {
    ToolKind::from_tag(tool_type)
        .map(ToolKind::instantiate)
        .ok_or_else(|| ToolError::UnknownToolType(tool_type.to_string()))
}

/// Instantiated tools of one spec, keyed by their declared name.
///
/// Built once before the first step runs and read-only afterwards.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Instantiates every tool the spec declares
    ///
    /// # Arguments
    /// * `spec` - The agent spec whose `tools` section is read
    pub fn from_spec(spec: &AgentSpec) -> Result<Self, ToolError> {
        let mut tools = BTreeMap::new();
        for (name, tool_spec) in &spec.tools {
            let tool = load_tool(&tool_spec.tool_type)?;
            debug!(tool = %name, tool_type = tool.name(), "registered tool");
            tools.insert(name.clone(), tool);
        }
        Ok(Self { tools })
    }

    /// Looks up a tool by its declared name
    pub fn get(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        self.tools
            .get(name)
            .map(|tool| tool.as_ref())
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))
    }

    /// Declared tool names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }
}
