//! Keyword-overlap retrieval over policy snippets.
//!
//! Snippets are ranked by the number of distinct lowercase tokens they share with the query.
//! There is no weighting, stemming, or index: every call scores every snippet.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of snippets returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 3;

const STRIP_CHARS: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\''];

/// Errors raised while loading policy snippets from disk.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The policy file could not be read.
    #[error("failed to read policies from {path}: {source}")]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The policy file was not a JSON array of snippets.
    #[error("failed to parse policies in {path}: {source}")]
    Parse {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

/// A titled block of reference text used as retrieval context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicySnippet {
    /// Display title; formats as `Policy` when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Body text scored against the query.
    #[serde(default)]
    pub text: String,
}

impl PolicySnippet {
    /// Build a snippet from a title and body.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            text: text.into(),
        }
    }

    /// Title used when rendering the snippet into a prompt.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Policy")
    }
}

/// Overlap count paired with the snippet it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSnippet<'a> {
    /// Number of distinct tokens shared with the query.
    pub overlap: usize,
    /// Snippet that was scored.
    pub snippet: &'a PolicySnippet,
}

/// Split text on whitespace, strip surrounding punctuation, and lowercase each token.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(STRIP_CHARS).to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Score every snippet against the query, ordered by descending overlap.
///
/// The sort is stable, so snippets with equal overlap keep their input order.
pub fn score_snippets<'a>(query: &str, snippets: &'a [PolicySnippet]) -> Vec<ScoredSnippet<'a>> {
    let query_tokens = tokenize(query);
    let mut scored: Vec<ScoredSnippet<'a>> = snippets
        .iter()
        .map(|snippet| ScoredSnippet {
            overlap: tokenize(&snippet.text)
                .intersection(&query_tokens)
                .count(),
            snippet,
        })
        .collect();
    scored.sort_by(|left, right| right.overlap.cmp(&left.overlap));
    scored
}

/// Return at most `k` snippets most relevant to the query.
pub fn retrieve_relevant(query: &str, snippets: &[PolicySnippet], k: usize) -> Vec<PolicySnippet> {
    let scored = score_snippets(query, snippets);
    tracing::debug!(
        candidates = snippets.len(),
        k,
        best_overlap = scored.first().map(|hit| hit.overlap),
        "Ranked policy snippets"
    );
    scored
        .into_iter()
        .take(k)
        .map(|hit| hit.snippet.clone())
        .collect()
}

/// Render snippets as `title:\ntext` blocks separated by blank lines.
pub fn format_policy_context(snippets: &[PolicySnippet]) -> String {
    snippets
        .iter()
        .map(|snippet| format!("{}:\n{}", snippet.display_title(), snippet.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Load a JSON array of `{title, text}` snippets.
pub fn load_policies(path: &Path) -> Result<Vec<PolicySnippet>, RetrievalError> {
    let content = std::fs::read_to_string(path).map_err(|source| RetrievalError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let policies: Vec<PolicySnippet> =
        serde_json::from_str(&content).map_err(|source| RetrievalError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), count = policies.len(), "Loaded policies");
    Ok(policies)
}
