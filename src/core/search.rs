use crate::config::toml_config::SearchConfig;
use crate::core::feeds::{decode, PROFILES_TABLE, PROFILE_COLUMNS};
use crate::core::query::{Direction, Query};
use crate::domain::model::Profile;
use crate::domain::ports::DataSource;
use crate::utils::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<Profile>),
    /// A newer search started before this one could apply its result.
    Superseded,
}

impl SearchOutcome {
    pub fn results(self) -> Option<Vec<Profile>> {
        match self {
            SearchOutcome::Results(profiles) => Some(profiles),
            SearchOutcome::Superseded => None,
        }
    }
}

/// Debounced people search over the profiles table.
///
/// Every call takes a ticket. A call only issues its request if no newer
/// ticket was taken during the debounce wait, and only returns results if no
/// newer ticket was taken while the request was in flight, so a slow older
/// response can never replace a newer one.
pub struct UserSearch<D: DataSource> {
    source: D,
    debounce: Duration,
    min_chars: usize,
    limit: usize,
    generation: AtomicU64,
}

impl<D: DataSource> UserSearch<D> {
    pub fn new(source: D, config: &SearchConfig) -> Self {
        Self {
            source,
            debounce: Duration::from_millis(config.debounce_ms),
            min_chars: config.min_chars,
            limit: config.limit,
            generation: AtomicU64::new(0),
        }
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    pub async fn search(&self, term: &str) -> Result<SearchOutcome> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let term = sanitize_term(term);

        if term.chars().count() < self.min_chars {
            return Ok(SearchOutcome::Results(Vec::new()));
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_current(ticket) {
            tracing::debug!("Search '{}' superseded during debounce", term);
            return Ok(SearchOutcome::Superseded);
        }

        let query = Query::table(PROFILES_TABLE)
            .select(&PROFILE_COLUMNS)
            .ilike("full_name", format!("*{}*", term))
            .order("full_name", Direction::Asc)
            .limit(self.limit);
        let rows = self.source.select(&query).await;

        // A newer search owns the result, failures included.
        if !self.is_current(ticket) {
            tracing::debug!("Discarding stale response for '{}'", term);
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Results(decode(PROFILES_TABLE, rows?)?))
    }
}

/// Drops characters with meaning in filter expressions (`*`, `,`, parentheses).
fn sanitize_term(term: &str) -> String {
    term.trim()
        .chars()
        .filter(|c| !matches!(c, '*' | '%' | ',' | '(' | ')'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DataSource for CountingSource {
        async fn select(&self, _query: &Query) -> Result<Vec<serde_json::Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![serde_json::json!({
                "id": "u1",
                "full_name": "Ana Souza",
                "email": "ana@metrocasa.com.br",
                "role": "broker"
            })])
        }

        fn public_object_url(&self, _bucket: &str, _path: &str) -> Result<String> {
            unreachable!()
        }
    }

    fn search_with(debounce_ms: u64) -> UserSearch<CountingSource> {
        UserSearch::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            &SearchConfig {
                debounce_ms,
                min_chars: 2,
                limit: 10,
            },
        )
    }

    #[test]
    fn test_sanitize_term() {
        assert_eq!(sanitize_term("  an*a,(x) "), "anax");
    }

    #[tokio::test]
    async fn test_short_term_skips_request() {
        let search = search_with(0);
        let outcome = search.search(" a ").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Results(Vec::new()));
        assert_eq!(search.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_search_returns_profiles() {
        let search = search_with(0);
        let profiles = search.search("ana").await.unwrap().results().unwrap();
        assert_eq!(profiles[0].full_name, "Ana Souza");
        assert_eq!(search.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_fast_typing() {
        let search = search_with(300);

        let (first, second) = tokio::join!(search.search("an"), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            search.search("ana").await
        });

        assert_eq!(first.unwrap(), SearchOutcome::Superseded);
        assert!(second.unwrap().results().is_some());
        assert_eq!(search.source.calls.load(Ordering::SeqCst), 1);
    }
}
