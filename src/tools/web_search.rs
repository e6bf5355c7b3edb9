use crate::data::Tool;

/// Offline stand-in for a search engine; echoes the query inside a marker
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSearchTool;

impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn run(&self, query: &str) -> String {
        format!("[Mocked search results for '{}']", query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_wraps_query() {
        assert_eq!(
            WebSearchTool.run("rust borrow checker"),
            "[Mocked search results for 'rust borrow checker']"
        );
    }
}
