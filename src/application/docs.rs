//! # Docs Service
//!
//! Question answering and search over the documentation space.
//! Failures from the content API are logged and collapsed into `None`; the command layer
//! turns `None` into the generic "could not find / generate" replies.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::application::resolver::ReferenceResolver;
use crate::domain::traits::ContentApi;

/// Questions shorter than this (after greeting removal) are not worth an API call
const MIN_QUESTION_CHARS: usize = 15;
const MAX_ANSWER_CHARS: usize = 3800;
const MAX_SEARCH_RESULTS: usize = 5;

static GREETINGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((hello)|(hey)|(hi)|(everyone)|(thanks))\b,?!?\s?").expect("valid regex")
});

/// A generated answer together with the resolved reference links.
#[derive(Debug, Clone, PartialEq)]
pub struct DocsAnswer {
    pub text: String,
    pub references: Vec<String>,
}

pub struct DocsService {
    api: Arc<dyn ContentApi>,
    resolver: Arc<ReferenceResolver>,
    public_url: String,
}

impl DocsService {
    pub fn new(api: Arc<dyn ContentApi>, resolver: Arc<ReferenceResolver>, public_url: String) -> Self {
        Self {
            api,
            resolver,
            public_url,
        }
    }

    pub async fn ask(&self, question: &str) -> Option<DocsAnswer> {
        let question = clean_question(question)?;
        tracing::debug!("Question: {}", question);

        let answer = match self.api.ask(&question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Docs ask failed: {}", e);
                return None;
            }
        };

        let references = self
            .resolver
            .resolve_many(&answer.pages)
            .await
            .into_iter()
            .filter_map(Result::ok)
            .collect();

        Some(DocsAnswer {
            text: answer.text,
            references,
        })
    }

    /// Top search results as `(title, url)` pairs; `None` when nothing was found.
    pub async fn search(&self, query: &str) -> Option<Vec<(String, String)>> {
        if query.trim().is_empty() {
            return None;
        }
        match self.api.search(query).await {
            Ok(results) if !results.items.is_empty() => Some(
                results
                    .items
                    .into_iter()
                    .take(MAX_SEARCH_RESULTS)
                    .map(|item| (item.title, format!("{}{}", self.public_url, item.path)))
                    .collect(),
            ),
            Ok(_) => None,
            Err(e) => {
                tracing::error!("Docs search failed: {}", e);
                None
            }
        }
    }
}

/// Strips greetings and filler; `None` when too little question remains.
pub fn clean_question(question: &str) -> Option<String> {
    let cleaned = GREETINGS.replace_all(question, "").trim().to_string();
    (cleaned.chars().count() > MIN_QUESTION_CHARS).then_some(cleaned)
}

pub fn format_answer(answer: &DocsAnswer) -> String {
    let text: String = answer.text.chars().take(MAX_ANSWER_CHARS).collect();
    let mut out = format!("{}\n\nReferences:\n", text);
    for url in &answer.references {
        out.push_str(url);
        out.push('\n');
    }
    out.push_str(crate::strings::messages::LLM_DISCLAIMER);
    out
}

pub fn format_search(results: &[(String, String)]) -> String {
    let mut out = String::from("Documentation search results:\n");
    for (title, url) in results {
        out.push_str(&format!("{}: {}\n", title, url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache::ResolutionCache;
    use crate::domain::clock::SystemClock;
    use crate::domain::errors::ResolveError;
    use crate::domain::types::{Answer, ContentObject, ContentRef, SearchItem, SearchResults};
    use async_trait::async_trait;

    struct StubApi;

    #[async_trait]
    impl ContentApi for StubApi {
        async fn lookup(&self, id: &str) -> Result<ContentObject, ResolveError> {
            if id == "broken" {
                return Err(ResolveError::NotFound(id.into()));
            }
            Ok(ContentObject {
                path: format!("p/{id}"),
                ..Default::default()
            })
        }

        async fn search(&self, query: &str) -> Result<SearchResults, ResolveError> {
            if query == "nothing" {
                return Ok(SearchResults::default());
            }
            Ok(SearchResults {
                items: (0..7)
                    .map(|i| SearchItem {
                        title: format!("T{i}"),
                        path: format!("t{i}"),
                    })
                    .collect(),
            })
        }

        async fn ask(&self, _question: &str) -> Result<Answer, ResolveError> {
            Ok(Answer {
                text: "Add &push to the URL".into(),
                pages: vec![
                    ContentRef::new("a", vec![]),
                    ContentRef::new("broken", vec![]),
                    ContentRef::new("c", vec![]),
                    ContentRef::new("d", vec![]),
                ],
            })
        }
    }

    fn service() -> DocsService {
        let api: Arc<dyn ContentApi> = Arc::new(StubApi);
        let cache = ResolutionCache::new(chrono::Duration::days(7), Arc::new(SystemClock));
        let resolver = Arc::new(ReferenceResolver::new(api.clone(), "https://d/".into(), cache));
        DocsService::new(api, resolver, "https://d/".into())
    }

    #[test]
    fn test_clean_question() {
        assert_eq!(clean_question("hi"), None);
        assert_eq!(clean_question("Hello everyone, thanks"), None);
        assert_eq!(
            clean_question("Hey, how do I share my screen?").as_deref(),
            Some("how do I share my screen?")
        );
    }

    #[tokio::test]
    async fn test_ask_resolves_top_three_and_drops_failures() {
        let answer = service()
            .ask("how do I push a stream to a room?")
            .await
            .unwrap();
        assert_eq!(answer.references, vec!["https://d/p/a", "https://d/p/c"]);

        let text = format_answer(&answer);
        assert!(text.starts_with("Add &push to the URL\n\nReferences:\nhttps://d/p/a\n"));
        assert!(text.ends_with(crate::strings::messages::LLM_DISCLAIMER));
    }

    #[tokio::test]
    async fn test_short_question_skips_api() {
        assert_eq!(service().ask("hi there").await, None);
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let results = service().search("obs").await.unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0], ("T0".to_string(), "https://d/t0".to_string()));
        assert!(service().search("nothing").await.is_none());
    }

    #[test]
    fn test_answer_text_is_capped() {
        let answer = DocsAnswer {
            text: "a".repeat(5000),
            references: vec![],
        };
        let text = format_answer(&answer);
        assert!(text.starts_with(&"a".repeat(3800)));
        assert!(!text.starts_with(&"a".repeat(3801)));
    }
}
