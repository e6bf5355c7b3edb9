mod calculator;
pub mod expression;
mod web_search;

pub use calculator::CalculatorTool;
pub use web_search::WebSearchTool;
