use crate::data::Tool;

use super::expression::evaluate;

/// Evaluates arithmetic expressions against a fixed table of math functions.
///
/// Failures come back as `Error: <reason>` strings so that a bad expression
/// becomes the next step's context instead of aborting the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorTool;

impl Tool for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculator"
    }

    fn run(&self, expression: &str) -> String {
        match evaluate(expression) {
            Ok(value) => value.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }
}
