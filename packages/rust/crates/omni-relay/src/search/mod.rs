//! Optional web-search augmentation for search-intent messages.

mod intent;
mod searxng;

use async_trait::async_trait;
pub use intent::{SEARCH_SCOPE_SUFFIX, is_search_intent, scoped_query};
pub use searxng::SearxngSearch;

/// One ranked search hit. Not deduplicated; `url` is not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Search collaborator.
///
/// Implementations must not fail: any transport, status or decoding problem yields an empty
/// list, so a broken search backend degrades to a plain completion.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// At most `limit` results, in relevance order.
    async fn search(&self, query: &str, limit: usize) -> Vec<SearchResult>;
}

/// Provider used when no search backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSearch;

#[async_trait]
impl SearchProvider for DisabledSearch {
    async fn search(&self, _query: &str, _limit: usize) -> Vec<SearchResult> {
        Vec::new()
    }
}

/// Numbered context block appended to the user turn. Empty input renders as empty string.
pub fn render_search_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }
    let mut block = String::from("Search results:\n");
    for (i, result) in results.iter().enumerate() {
        block.push_str(&format!(
            "{}. {}\n{}\n{}\n",
            i + 1,
            result.title,
            result.url,
            result.snippet
        ));
    }
    block.trim_end().to_string()
}
