use crate::data::INPUT_PLACEHOLDER;
use std::collections::{BTreeMap, HashMap};

/// Template used for roles without a dedicated entry; passes the context through verbatim
pub const DEFAULT_TEMPLATE: &str = INPUT_PLACEHOLDER;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "planner",
        "You are a planning agent. Break the following request into a short, \
         ordered list of concrete steps.\n\nRequest:\n{input}",
    ),
    (
        "executor",
        "You are an execution agent. Carry out the following plan and reply \
         with the result only.\n\nPlan:\n{input}",
    ),
    (
        "researcher",
        "You are a research agent. Collect the facts relevant to the following \
         topic.\n\nTopic:\n{input}",
    ),
    (
        "summarizer",
        "Summarize the following content in a few sentences.\n\nContent:\n{input}",
    ),
    (
        "critic",
        "Review the following answer and point out mistakes or gaps.\n\nAnswer:\n{input}",
    ),
];

/// Role-to-template mapping used to build prompts for model steps.
///
/// Lookups never fail: roles without an entry resolve to [`DEFAULT_TEMPLATE`].
#[derive(Clone, Debug)]
pub struct PromptRegistry {
    templates: HashMap<String, String>,
    default_template: String,
}

impl PromptRegistry {
    /// Creates a registry holding the built-in role templates
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN_TEMPLATES
                .iter()
                .map(|(role, template)| (role.to_string(), template.to_string()))
                .collect(),
            default_template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Layers spec-provided templates over the current ones
    ///
    /// # Arguments
    /// * `overrides` - Role-to-template entries that replace existing ones
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (role, template) in overrides {
            self.templates.insert(role.clone(), template.clone());
        }
        self
    }

    /// Returns the template for a role, falling back to the default entry
    pub fn template_for(&self, role: &str) -> &str {
        self.templates
            .get(role)
            .map(String::as_str)
            .unwrap_or(&self.default_template)
    }

    /// Builds the prompt for a role by substituting the context into its template
    pub fn render(&self, role: &str, input: &str) -> String {
        self.template_for(role).replace(INPUT_PLACEHOLDER, input)
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roles_embed_input() {
        let registry = PromptRegistry::builtin();
        for (role, _) in BUILTIN_TEMPLATES {
            let prompt = registry.render(role, "1+1");
            assert!(prompt.contains("1+1"), "role {} lost its input", role);
            assert!(!prompt.contains(INPUT_PLACEHOLDER));
        }
    }

    #[test]
    fn test_unknown_role_uses_default() {
        let registry = PromptRegistry::builtin();
        assert_eq!(registry.template_for("juggler"), DEFAULT_TEMPLATE);
        assert_eq!(registry.render("juggler", "raw input"), "raw input");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut overrides = BTreeMap::new();
        overrides.insert("planner".to_string(), "PLAN {input} NOW".to_string());
        overrides.insert("poet".to_string(), "Write a poem about {input}".to_string());

        let registry = PromptRegistry::builtin().with_overrides(&overrides);
        assert_eq!(registry.render("planner", "x"), "PLAN x NOW");
        assert_eq!(registry.render("poet", "rust"), "Write a poem about rust");
        assert!(registry.render("executor", "y").starts_with("You are an execution agent"));
    }

    #[test]
    fn test_input_with_braces_is_inserted_verbatim() {
        let registry = PromptRegistry::builtin();
        assert_eq!(registry.render("other", "{input} {x}"), "{input} {x}");
    }
}
