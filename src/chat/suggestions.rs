//! Suggested questions, fetched at most once.

use crate::activity::logger;
use crate::api::{Backend, QuerySuggestion};

#[derive(Debug, Clone, Default)]
pub struct SuggestionCache {
    items: Option<Vec<QuerySuggestion>>,
}

impl SuggestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.items.is_some()
    }

    /// The catalog, fetching it on first use. A failed fetch is cached as an
    /// empty list.
    pub fn get<B: Backend + ?Sized>(&mut self, backend: &B) -> &[QuerySuggestion] {
        self.items.get_or_insert_with(|| {
            backend.suggestions().unwrap_or_else(|e| {
                logger::warn(&format!("could not load chat suggestions: {e}"));
                Vec::new()
            })
        })
    }
}
