use crate::data::{AgentSpec, SpecError, SpecFormat};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const SPEC_KEYS: &[&str] = &["llm", "retry", "tools", "steps", "prompts"];
const STEP_KEYS: &[&str] = &["role", "model", "tool"];
const TOOL_KEYS: &[&str] = &["type", "description"];

/// Turns raw spec text of one format into a generic document tree
pub trait SpecParser {
    /// The format this parser understands
    fn format(&self) -> SpecFormat;

    /// Parses raw text, reporting syntax errors as a message
    fn parse(&self, raw: &str) -> Result<Value, String>;
}

/// YAML parser backed by serde_yaml
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSpecParser;

impl SpecParser for YamlSpecParser {
    fn format(&self) -> SpecFormat {
        SpecFormat::Yaml
    }

    fn parse(&self, raw: &str) -> Result<Value, String> {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    }
}

/// JSON parser backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSpecParser;

impl SpecParser for JsonSpecParser {
    fn format(&self) -> SpecFormat {
        SpecFormat::Json
    }

    fn parse(&self, raw: &str) -> Result<Value, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }
}

/// Lists keys of a spec document that no field of [`AgentSpec`] reads
fn ignored_keys(document: &Value) -> Vec<String> {
    fn unknown<'a>(
        object: Option<&'a serde_json::Map<String, Value>>,
        known: &'a [&str],
    ) -> impl Iterator<Item = &'a String> {
        object
            .into_iter()
            .flat_map(|map| map.keys())
            .filter(|key| !known.iter().any(|k| *k == key.as_str()))
    }

    let mut ignored: Vec<String> = unknown(document.as_object(), SPEC_KEYS)
        .cloned()
        .collect();

    if let Some(tools) = document["tools"].as_object() {
        for (name, tool) in tools {
            ignored.extend(
                unknown(tool.as_object(), TOOL_KEYS).map(|key| format!("tools.{}.{}", name, key)),
            );
        }
    }

    if let Some(steps) = document["steps"].as_array() {
        for (index, step) in steps.iter().enumerate() {
            ignored.extend(
                unknown(step.as_object(), STEP_KEYS)
                    .map(|key| format!("steps[{}].{}", index, key)),
            );
        }
    }

    ignored
}

/// Loads and validates agent specs using the parsers it was given.
///
/// Parsing is split in two: the format parser only checks syntax and yields a
/// document tree, then the tree is mapped onto [`AgentSpec`]. Shape problems
/// (missing or mistyped fields) are therefore validation errors regardless of
/// the markup they were written in. Keys the spec model does not know are
/// logged and ignored.
pub struct SpecLoader {
    parsers: Vec<Box<dyn SpecParser>>,
}

impl SpecLoader {
    /// Creates a loader without any parser registered
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Registers a parser, replacing any earlier one for the same format
    pub fn with_parser(mut self, parser: impl SpecParser + 'static) -> Self {
        self.parsers.retain(|p| p.format() != parser.format());
        self.parsers.push(Box::new(parser));
        self
    }

    pub fn supports(&self, format: SpecFormat) -> bool {
        self.parsers.iter().any(|p| p.format() == format)
    }

    /// Reads a spec file, detecting its format from the extension
    pub fn load_path(&self, path: &Path) -> Result<AgentSpec, SpecError> {
        let format = SpecFormat::from_path(path);
        if !self.supports(format) {
            return Err(SpecError::Format(format));
        }

        let raw = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let spec = self.load_str(&raw, format)?;
        info!(
            path = %path.display(),
            format = %format,
            steps = spec.steps.len(),
            tools = spec.tools.len(),
            "loaded agent spec"
        );
        Ok(spec)
    }

    /// Parses and validates spec text of a known format
    pub fn load_str(&self, raw: &str, format: SpecFormat) -> Result<AgentSpec, SpecError> {
        let parser = self
            .parsers
            .iter()
            .find(|p| p.format() == format)
            .ok_or(SpecError::Format(format))?;

        let document = parser
            .parse(raw)
            .map_err(|message| SpecError::Parse { format, message })?;

        if !document.is_object() {
            return Err(SpecError::Validation(
                "top level must be a mapping".to_string(),
            ));
        }

        let ignored = ignored_keys(&document);
        if !ignored.is_empty() {
            warn!(keys = ?ignored, "ignoring unrecognized agent spec keys");
        }

        let spec: AgentSpec =
            serde_json::from_value(document).map_err(|e| SpecError::Validation(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }
}

impl Default for SpecLoader {
    /// A loader understanding both YAML and JSON
    fn default() -> Self {
        Self::new()
            .with_parser(YamlSpecParser)
            .with_parser(JsonSpecParser)
    }
}
