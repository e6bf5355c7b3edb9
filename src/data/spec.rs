use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Placeholder substituted with the current context when a prompt template is rendered
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Key in the `llm` mapping naming the model used by steps without an override
pub const DEFAULT_MODEL_KEY: &str = "default_model";

/// Errors that can occur while loading an agent specification
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read agent spec {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no parser available for {0} agent specs")]
    Format(SpecFormat),

    #[error("malformed {format} agent spec: {message}")]
    Parse { format: SpecFormat, message: String },

    #[error("agent spec is invalid: {0}")]
    Validation(String),
}

/// Markup formats an agent spec can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecFormat {
    Yaml,
    Json,
}

impl SpecFormat {
    /// Detects the format from a file extension; anything that is not YAML is read as JSON
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => SpecFormat::Yaml,
            _ => SpecFormat::Json,
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SpecFormat::Yaml => write!(f, "YAML"),
            SpecFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Declaration of a tool available to the steps of a spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub tool_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of the pipeline: a model call, or a tool call when `tool` is set.
///
/// A tool reference takes precedence; `model` is ignored on tool steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl StepSpec {
    pub fn is_tool_step(&self) -> bool {
        self.tool.is_some()
    }
}

/// In-memory representation of an agent specification file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Global model configuration; must name a `default_model`
    #[serde(default)]
    pub llm: Map<String, Value>,
    /// How many times a failing model call is attempted
    #[serde(default = "default_retry")]
    pub retry: u32,
    #[serde(default)]
    pub tools: BTreeMap<String, ToolSpec>,
    pub steps: Vec<StepSpec>,
    /// Per-role prompt templates that take precedence over the built-in ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prompts: BTreeMap<String, String>,
}

fn default_retry() -> u32 {
    1
}

impl AgentSpec {
    /// Model used by steps that carry no override
    pub fn default_model(&self) -> Option<&str> {
        self.llm
            .get(DEFAULT_MODEL_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }

    /// Checks every structural invariant of the spec.
    ///
    /// Runs once when the spec is loaded so that execution never meets a
    /// half-valid spec.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.steps.is_empty() {
            return Err(SpecError::Validation(
                "at least one step is required".to_string(),
            ));
        }

        if self.retry < 1 {
            return Err(SpecError::Validation(format!(
                "retry must be at least 1, got {}",
                self.retry
            )));
        }

        if self.default_model().is_none() {
            return Err(SpecError::Validation(format!(
                "llm.{} must be a non-empty string",
                DEFAULT_MODEL_KEY
            )));
        }

        for (name, tool) in &self.tools {
            if tool.tool_type.trim().is_empty() {
                return Err(SpecError::Validation(format!(
                    "tool '{}' has an empty type",
                    name
                )));
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.role.trim().is_empty() {
                return Err(SpecError::Validation(format!(
                    "step {} has an empty role",
                    index
                )));
            }

            if let Some(tool) = &step.tool {
                if !self.tools.contains_key(tool) {
                    return Err(SpecError::Validation(format!(
                        "step {} ('{}') references undeclared tool '{}'",
                        index, step.role, tool
                    )));
                }
            }

            if let (None, Some(model)) = (&step.tool, &step.model) {
                if model.trim().is_empty() {
                    return Err(SpecError::Validation(format!(
                        "step {} ('{}') has an empty model override",
                        index, step.role
                    )));
                }
            }
        }

        for (role, template) in &self.prompts {
            if !template.contains(INPUT_PLACEHOLDER) {
                return Err(SpecError::Validation(format!(
                    "prompt template for role '{}' does not contain {}",
                    role, INPUT_PLACEHOLDER
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_from(value: Value) -> AgentSpec {
        serde_json::from_value(value).unwrap()
    }

    fn valid_spec() -> AgentSpec {
        spec_from(json!({
            "llm": { "default_model": "gpt-4o-mini" },
            "retry": 2,
            "tools": { "calc": { "type": "calculator" } },
            "steps": [
                { "role": "planner" },
                { "role": "executor", "tool": "calc" }
            ]
        }))
    }

    #[test]
    fn test_valid_spec_passes() {
        let spec = valid_spec();
        assert!(spec.validate().is_ok());
        assert_eq!(spec.default_model(), Some("gpt-4o-mini"));
        assert!(spec.steps[1].is_tool_step());
    }

    #[test]
    fn test_defaults_applied() {
        let spec = spec_from(json!({
            "llm": { "default_model": "m" },
            "steps": [{ "role": "planner" }]
        }));
        assert_eq!(spec.retry, 1);
        assert!(spec.tools.is_empty());
        assert!(spec.prompts.is_empty());
    }

    #[test]
    fn test_empty_steps_rejected() {
        let mut spec = valid_spec();
        spec.steps.clear();
        assert!(matches!(spec.validate(), Err(SpecError::Validation(_))));
    }

    #[test]
    fn test_undeclared_tool_rejected() {
        let mut spec = valid_spec();
        spec.steps[1].tool = Some("search".to_string());
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("undeclared tool 'search'"));
    }

    #[test]
    fn test_zero_retry_rejected() {
        let mut spec = valid_spec();
        spec.retry = 0;
        assert!(matches!(spec.validate(), Err(SpecError::Validation(_))));
    }

    #[test]
    fn test_missing_default_model_rejected() {
        let mut spec = valid_spec();
        spec.llm.clear();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("default_model"));

        spec.llm.insert(DEFAULT_MODEL_KEY.to_string(), json!(42));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_tool_step_may_carry_model() {
        let mut spec = valid_spec();
        spec.steps[1].model = Some("gpt-4".to_string());
        assert!(spec.validate().is_ok());
        assert!(spec.steps[1].is_tool_step());
    }

    #[test]
    fn test_prompt_override_without_placeholder_rejected() {
        let mut spec = valid_spec();
        spec.prompts
            .insert("planner".to_string(), "Plan something".to_string());
        assert!(spec.validate().is_err());

        spec.prompts
            .insert("planner".to_string(), "Plan: {input}".to_string());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_format_detection() {
        use std::path::Path;
        assert_eq!(SpecFormat::from_path(Path::new("a.yml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("a.yaml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("a.json")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_path(Path::new("spec")), SpecFormat::Json);
    }
}
