//! Limits and knobs for the article workflow.

/// Article workflow settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleConfig {
    /// Tool the researcher calls with `{"query": ...}`.
    pub search_tool: String,
    /// Plan items turned into extra search queries per research round.
    pub max_subqueries: usize,
    /// Searches in flight at once.
    pub search_concurrency: usize,
    /// A primary result shorter than this triggers one follow-up search.
    pub min_result_chars: usize,
    /// Writer revisions allowed after review feedback.
    pub max_revisions: u32,
    /// Research rounds allowed before writing starts regardless.
    pub max_research_rounds: u32,
    /// Recoveries allowed before the run is finalized with what it has.
    pub max_recoveries: u32,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            search_tool: "web_search".to_string(),
            max_subqueries: 3,
            search_concurrency: 3,
            min_result_chars: 200,
            max_revisions: 2,
            max_research_rounds: 2,
            max_recoveries: 3,
        }
    }
}

impl ArticleConfig {
    pub fn with_search_tool(mut self, name: impl Into<String>) -> Self {
        self.search_tool = name.into();
        self
    }

    pub fn with_max_revisions(mut self, n: u32) -> Self {
        self.max_revisions = n;
        self
    }

    pub fn with_max_research_rounds(mut self, n: u32) -> Self {
        self.max_research_rounds = n;
        self
    }

    pub fn with_max_recoveries(mut self, n: u32) -> Self {
        self.max_recoveries = n;
        self
    }
}
